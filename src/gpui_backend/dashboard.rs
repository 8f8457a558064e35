use gpui::prelude::*;
use gpui::{App, AppContext, Entity, Window, div, relative};

use crate::dashboard::{ChartPlacement, Dashboard};
use crate::render::Color;

use super::config::ChartViewConfig;
use super::paint::to_hsla;
use super::view::GpuiChartView;

/// A GPUI view laying out every chart of a [`Dashboard`] on its grid.
pub struct GpuiDashboardView {
    charts: Vec<(ChartPlacement, Entity<GpuiChartView>)>,
    rows: usize,
    columns: usize,
    background: Color,
}

impl GpuiDashboardView {
    /// Create one chart view per dashboard cell.
    pub fn new(dashboard: &Dashboard, config: ChartViewConfig, cx: &mut App) -> Self {
        let charts = dashboard
            .charts()
            .iter()
            .map(|(placement, handle)| {
                let view = GpuiChartView::with_config(handle.clone(), config.clone());
                (*placement, cx.new(|_| view))
            })
            .collect();
        Self {
            charts,
            rows: dashboard.rows(),
            columns: dashboard.columns(),
            background: dashboard.theme().background,
        }
    }

    /// Chart views, in creation order.
    pub fn chart_views(&self) -> impl Iterator<Item = &Entity<GpuiChartView>> {
        self.charts.iter().map(|(_, view)| view)
    }
}

impl Render for GpuiDashboardView {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        let columns = self.columns as f32;
        let rows = self.rows as f32;
        div()
            .relative()
            .size_full()
            .bg(to_hsla(self.background))
            .children(self.charts.iter().map(|(placement, view)| {
                div()
                    .absolute()
                    .left(relative(placement.column_index as f32 / columns))
                    .top(relative(placement.row_index as f32 / rows))
                    .w(relative(placement.column_span as f32 / columns))
                    .h(relative(placement.row_span as f32 / rows))
                    .child(view.clone())
            }))
    }
}

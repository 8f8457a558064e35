use std::sync::{Arc, RwLock};

use gpui::prelude::*;
use gpui::{
    MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point, ScrollWheelEvent,
    Window, canvas, div, px,
};

use crate::axis::AxisId;
use crate::chart::ChartXY;
use crate::dashboard::ChartHandle;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::interaction::{
    HitRegion, anchor_fractions, pan_fractions, zoom_factor_from_drag, zoom_factor_from_wheel,
};

use super::config::ChartViewConfig;
use super::frame::build_frame;
use super::geometry::distance_sq;
use super::paint::{paint_frame, to_hsla};
use super::state::{ChartUiState, DragMode, DragState};

/// A GPUI view that renders one [`ChartXY`] with interactive controls.
///
/// Dragging the series area pans, dragging an axis zooms along it, the wheel
/// zooms and a double-click resumes automatic scrolling. Data is appended
/// through the shared [`ChartHandle`].
#[derive(Clone)]
pub struct GpuiChartView {
    chart: ChartHandle,
    state: Arc<RwLock<ChartUiState>>,
    config: ChartViewConfig,
}

impl GpuiChartView {
    /// Create a view for a chart using the default [`ChartViewConfig`].
    pub fn new(chart: ChartHandle) -> Self {
        Self::with_config(chart, ChartViewConfig::default())
    }

    /// Create a view with a custom configuration.
    pub fn with_config(chart: ChartHandle, config: ChartViewConfig) -> Self {
        Self {
            chart,
            state: Arc::new(RwLock::new(ChartUiState::default())),
            config,
        }
    }

    /// Handle of the rendered chart.
    pub fn chart_handle(&self) -> ChartHandle {
        self.chart.clone()
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let mut state = self.state.write().expect("chart state lock");
        let region = state.regions.hit_test(pos);

        if ev.click_count > 1 && region == HitRegion::Plot {
            state.clear_interaction();
            self.chart.write(ChartXY::reset_view);
            tracing::debug!("view reset, scrolling resumed");
            cx.notify();
            return;
        }

        let mode = match region {
            HitRegion::Plot => DragMode::Pan,
            HitRegion::XAxis => DragMode::ZoomX,
            HitRegion::YAxis(id) => DragMode::ZoomY(id),
            HitRegion::Outside => return,
        };
        state.drag = Some(DragState::new(mode, pos));
        cx.notify();
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let mut state = self.state.write().expect("chart state lock");
        state.hover = (state.regions.hit_test(pos) == HitRegion::Plot).then_some(pos);

        let Some(mut drag) = state.drag.clone() else {
            cx.notify();
            return;
        };
        if !drag.active && distance_sq(drag.start, pos) > self.config.drag_threshold_px.powi(2) {
            drag.active = true;
        }
        if !drag.active {
            cx.notify();
            return;
        }

        let Some(plot_rect) = state.plot_rect else {
            return;
        };
        let delta = ScreenPoint::new(pos.x - drag.last.x, pos.y - drag.last.y);
        self.chart
            .write(|chart| apply_drag(chart, drag.mode, drag.start, delta, plot_rect));
        drag.last = pos;
        state.drag = Some(drag);
        cx.notify();
    }

    fn on_mouse_up(&mut self, _ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let mut state = self.state.write().expect("chart state lock");
        state.clear_interaction();
        cx.notify();
    }

    fn on_scroll(&mut self, ev: &ScrollWheelEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let state = self.state.read().expect("chart state lock");
        let Some(plot_rect) = state.plot_rect else {
            return;
        };
        let delta = ev.delta.pixel_delta(px(16.0));
        let wheel = -f32::from(delta.y);
        if wheel.abs() < 0.01 {
            return;
        }
        let factor = zoom_factor_from_wheel(wheel);
        let anchor = anchor_fractions(plot_rect, pos);

        let region = state.regions.hit_test(pos);
        self.chart.write(|chart| match region {
            HitRegion::Plot => chart.zoom(anchor, factor, factor),
            HitRegion::XAxis => chart.zoom(anchor, factor, 1.0),
            HitRegion::YAxis(id) => zoom_single_axis(chart, id, anchor.1, factor),
            HitRegion::Outside => {}
        });
        cx.notify();
    }
}

impl Render for GpuiChartView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let chart = self.chart.clone();
        let state = Arc::clone(&self.state);
        let config = self.config.clone();
        let background = chart.read(|chart| chart.theme().background);

        div()
            .size_full()
            .bg(to_hsla(background))
            .child(
                canvas(
                    move |bounds, window, _| {
                        let mut state = state.write().expect("chart state lock");
                        chart.read(|chart| build_frame(chart, &mut state, &config, bounds, window))
                    },
                    move |_, frame, window, cx| {
                        paint_frame(&frame, window, cx);
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, ev, _, cx| {
                this.on_scroll(ev, cx);
            }))
    }
}

fn screen_point(point: Point<Pixels>) -> ScreenPoint {
    ScreenPoint::new(f32::from(point.x), f32::from(point.y))
}

fn apply_drag(
    chart: &mut ChartXY,
    mode: DragMode,
    start: ScreenPoint,
    delta: ScreenPoint,
    plot_rect: ScreenRect,
) {
    let anchor = anchor_fractions(plot_rect, start);
    match mode {
        DragMode::Pan => {
            let (fx, fy) = pan_fractions(plot_rect, delta);
            chart.pan(fx, fy);
        }
        DragMode::ZoomX => {
            let factor = zoom_factor_from_drag(delta.x, plot_rect.width());
            chart.zoom(anchor, factor, 1.0);
        }
        DragMode::ZoomY(id) => {
            let factor = zoom_factor_from_drag(-delta.y, plot_rect.height());
            zoom_single_axis(chart, id, anchor.1, factor);
        }
    }
}

fn zoom_single_axis(chart: &mut ChartXY, id: AxisId, fraction: f64, factor: f64) {
    if let Ok(axis) = chart.axis_mut(id) {
        let interval = axis.interval();
        let center = interval.start + (interval.end - interval.start) * fraction;
        axis.zoom_around(center, factor);
    }
}

//! Two-chart streaming dashboard: one vertically regressive and one vertically
//! progressive line series, each fed by its own function generator.

use crate::axis::{AxisDataState, AxisInterval, ScrollStrategy};
use crate::config::PipelineConfig;
use crate::dashboard::{ChartPlacement, Dashboard, DashboardOptions, SeriesHandle};
use crate::error::{DashboardError, GeneratorError};
use crate::generator::{DataStream, ProgressiveFunctionGenerator, StreamHandle};
use crate::geom::Point;
use crate::series::{CursorSolveBasis, DataCleaning, DataPattern, LineSeriesOptions, PatternKind};
use crate::style::Theme;

/// Title of the left chart.
pub const REGRESSIVE_TITLE: &str = "Vertical regressive";
/// Title of the right chart.
pub const PROGRESSIVE_TITLE: &str = "Vertical progressive";

/// `sin(0.5t) + sin(t) + cos(1.5t) + cos(0.25t)`.
pub fn composite_wave(t: f64) -> f64 {
    (t * 0.5).sin() + t.sin() + (t * 1.5).cos() + (t * 0.25).cos()
}

/// Swap the axes and negate the new Y: `(x, y) -> (y, -x)`.
pub fn regressive_remap(point: Point) -> Point {
    Point::new(point.y, -point.x)
}

/// Swap the axes: `(x, y) -> (y, x)`.
pub fn progressive_remap(point: Point) -> Point {
    Point::new(point.y, point.x)
}

/// The assembled dashboard with handles to both series.
#[derive(Debug)]
pub struct ProgressiveDashboard {
    dashboard: Dashboard,
    regressive: SeriesHandle,
    progressive: SeriesHandle,
    config: PipelineConfig,
}

impl ProgressiveDashboard {
    /// Build a 1x2 dashboard with both charts configured.
    pub fn build(config: &PipelineConfig, theme: Theme) -> Result<Self, DashboardError> {
        let mut dashboard = Dashboard::new(DashboardOptions {
            rows: 1,
            columns: 2,
            theme,
        })?;
        let view_range = config.view_range;

        let chart1 = dashboard.create_chart_xy(ChartPlacement::cell(0, 0))?;
        chart1.write(|chart| -> Result<(), DashboardError> {
            chart.set_title(REGRESSIVE_TITLE);
            chart
                .default_axis_y_mut()?
                .set_interval(AxisInterval::new(view_range, 0.0).stop_axis_after(false))?
                .set_scroll_strategy(ScrollStrategy::Regressive);
            Ok(())
        })?;
        let regressive = chart1.add_line_series(series_options(
            config,
            "Regressive",
            PatternKind::RegressiveY,
        ))?;

        let chart2 = dashboard.create_chart_xy(ChartPlacement::cell(1, 0))?;
        let custom_axis = chart2.write(|chart| {
            chart.set_title(PROGRESSIVE_TITLE);
            chart
                .add_axis_y(true)
                .set_default_interval(move |state: &AxisDataState| {
                    let end = state.data_max.unwrap_or(0.0);
                    AxisInterval::new(end - view_range, end).stop_axis_after(false)
                })
                .set_scroll_strategy(ScrollStrategy::Progressive)
                .id()
        });
        let progressive = chart2.add_line_series(
            series_options(config, "Progressive", PatternKind::ProgressiveY).y_axis(custom_axis),
        )?;
        chart2.write(|chart| -> Result<(), DashboardError> {
            let unused = chart
                .default_axis_y_id()
                .filter(|id| *id != custom_axis);
            if let Some(id) = unused {
                chart.dispose_axis(id)?;
            }
            Ok(())
        })?;

        tracing::info!(
            view_range,
            min_data_point_count = config.min_data_point_count,
            "dashboard assembled"
        );
        Ok(Self {
            dashboard,
            regressive,
            progressive,
            config: config.clone(),
        })
    }

    /// The dashboard.
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Series of the left chart.
    pub fn regressive_series(&self) -> &SeriesHandle {
        &self.regressive
    }

    /// Series of the right chart.
    pub fn progressive_series(&self) -> &SeriesHandle {
        &self.progressive
    }

    /// Stream of `(t, sin t)` over `[0, regressive_end]`.
    pub fn regressive_stream(&self) -> Result<DataStream, GeneratorError> {
        self.stream(
            ProgressiveFunctionGenerator::new()
                .set_sampling_function(f64::sin)
                .set_end(self.config.regressive_end),
        )
    }

    /// Stream of `(t, composite_wave(t))` over `[0, progressive_end]`.
    pub fn progressive_stream(&self) -> Result<DataStream, GeneratorError> {
        self.stream(
            ProgressiveFunctionGenerator::new()
                .set_sampling_function(composite_wave)
                .set_end(self.config.progressive_end),
        )
    }

    fn stream(&self, generator: ProgressiveFunctionGenerator) -> Result<DataStream, GeneratorError> {
        generator
            .set_step(self.config.step)
            .generate()?
            .set_stream_batch_size(self.config.batch_size)
            .set_stream_interval(self.config.interval_ms)
            .set_stream_repeat(self.config.repeat)
            .to_stream()
    }

    /// Start both streams; every generated point is remapped and appended to
    /// its series.
    pub fn start(&self) -> Result<Vec<StreamHandle>, GeneratorError> {
        let regressive = feed(self.regressive_stream()?, self.regressive.clone(), regressive_remap);
        let progressive = feed(
            self.progressive_stream()?,
            self.progressive.clone(),
            progressive_remap,
        );
        Ok(vec![regressive, progressive])
    }
}

fn series_options(config: &PipelineConfig, name: &str, pattern: PatternKind) -> LineSeriesOptions {
    let options = LineSeriesOptions::new()
        .name(name)
        .data_pattern(DataPattern::new(pattern).with_regular_step())
        .data_cleaning(DataCleaning::new(config.min_data_point_count))
        .cursor_solve_basis(CursorSolveBasis::NearestY);
    match config.max_sample_count {
        Some(count) => options.max_sample_count(count),
        None => options,
    }
}

fn feed(stream: DataStream, series: SeriesHandle, remap: fn(Point) -> Point) -> StreamHandle {
    let mut batch = Vec::with_capacity(stream.batch_size());
    stream.for_each_batch(move |points| {
        batch.clear();
        batch.extend(points.iter().copied().map(remap));
        if let Err(error) = series.add_batch(&batch) {
            tracing::error!(%error, "failed to append streamed batch");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Dimension;

    fn assembled() -> ProgressiveDashboard {
        ProgressiveDashboard::build(&PipelineConfig::default(), Theme::default()).unwrap()
    }

    #[test]
    fn charts_are_configured() {
        let pipeline = assembled();
        let charts = pipeline.dashboard().charts();
        assert_eq!(charts.len(), 2);

        charts[0].1.read(|chart| {
            assert_eq!(chart.title(), REGRESSIVE_TITLE);
            let axis = &chart.axes_y()[0];
            assert_eq!(axis.scroll_strategy(), ScrollStrategy::Regressive);
            assert!(axis.interval().is_reversed());
            assert_eq!(chart.series().len(), 1);
        });

        charts[1].1.read(|chart| {
            assert_eq!(chart.title(), PROGRESSIVE_TITLE);
            assert_eq!(chart.axes_y().len(), 1);
            let axis = &chart.axes_y()[0];
            assert_eq!(axis.scroll_strategy(), ScrollStrategy::Progressive);
            assert_eq!(chart.series()[0].y_axis(), axis.id());
        });
    }

    #[test]
    fn progressive_axis_applies_default_interval_on_first_data() {
        let pipeline = assembled();
        let view_range = PipelineConfig::default().view_range;
        pipeline
            .progressive_series()
            .add_batch(&[Point::new(0.0, 5.0), Point::new(0.1, 5.015)])
            .unwrap();
        pipeline.progressive_series().chart().read(|chart| {
            let interval = chart.axes_y()[0].interval();
            assert!((interval.end - 5.015).abs() < 1e-9);
            assert!((interval.span() - view_range).abs() < 1e-9);
        });
    }

    #[test]
    fn regressive_axis_follows_decreasing_y() {
        let pipeline = assembled();
        let stream = pipeline.regressive_stream().unwrap();
        let series = pipeline.regressive_series();
        for batch in stream.batches().take(500) {
            let points: Vec<Point> = batch.into_iter().map(regressive_remap).collect();
            series.add_batch(&points).unwrap();
        }
        assert!(series.pattern_holds());
        series.chart().read(|chart| {
            let interval = chart.axes_y()[0].interval();
            let newest = chart.series()[0].store().last().unwrap();
            assert!((interval.low() - newest.coordinate(Dimension::Y)).abs() < 1e-9);
        });
    }
}

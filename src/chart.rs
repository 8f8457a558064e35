//! XY chart model: axes, line series and view interaction.

use crate::axis::{Axis, AxisId, AxisPosition};
use crate::datasource::AppendError;
use crate::error::DashboardError;
use crate::geom::{Dimension, Point};
use crate::render::LineStyle;
use crate::series::{LineSeries, LineSeriesOptions, SeriesId};
use crate::style::Theme;
use crate::view::Range;

const DEFAULT_STROKE_WIDTH: f32 = 1.5;

/// XY chart with one X axis and any number of Y axes.
#[derive(Debug, Clone)]
pub struct ChartXY {
    title: String,
    theme: Theme,
    x_axis: Axis,
    y_axes: Vec<Axis>,
    default_y: Option<AxisId>,
    series: Vec<LineSeries>,
}

impl ChartXY {
    /// Create an empty chart with a default X and Y axis.
    pub fn new(theme: Theme) -> Self {
        let y_axis = Axis::new(Dimension::Y, AxisPosition::Default);
        let default_y = Some(y_axis.id());
        Self {
            title: String::new(),
            theme,
            x_axis: Axis::new(Dimension::X, AxisPosition::Default),
            y_axes: vec![y_axis],
            default_y,
            series: Vec::new(),
        }
    }

    /// Chart title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the chart title.
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    /// Access the current theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replace the theme.
    pub fn set_theme(&mut self, theme: Theme) -> &mut Self {
        self.theme = theme;
        self
    }

    /// Access the X axis.
    pub fn default_axis_x(&self) -> &Axis {
        &self.x_axis
    }

    /// Access the X axis mutably.
    pub fn default_axis_x_mut(&mut self) -> &mut Axis {
        &mut self.x_axis
    }

    /// Identifier of the Y axis used when series options name none.
    ///
    /// After the default Y axis is disposed this is the first remaining one.
    pub fn default_axis_y_id(&self) -> Option<AxisId> {
        self.default_y
            .or_else(|| self.y_axes.first().map(Axis::id))
    }

    /// Access the default Y axis mutably.
    pub fn default_axis_y_mut(&mut self) -> Result<&mut Axis, DashboardError> {
        let id = self
            .default_axis_y_id()
            .ok_or(DashboardError::UnknownAxis(self.x_axis.id()))?;
        self.axis_mut(id)
    }

    /// All Y axes in creation order.
    pub fn axes_y(&self) -> &[Axis] {
        &self.y_axes
    }

    /// Add a Y axis on the left side or, when `opposite`, the right side.
    pub fn add_axis_y(&mut self, opposite: bool) -> &mut Axis {
        let position = if opposite {
            AxisPosition::Opposite
        } else {
            AxisPosition::Default
        };
        self.y_axes.push(Axis::new(Dimension::Y, position));
        let index = self.y_axes.len() - 1;
        &mut self.y_axes[index]
    }

    /// Look up an axis by id.
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        if self.x_axis.id() == id {
            return Some(&self.x_axis);
        }
        self.y_axes.iter().find(|axis| axis.id() == id)
    }

    /// Look up an axis by id for mutation.
    pub fn axis_mut(&mut self, id: AxisId) -> Result<&mut Axis, DashboardError> {
        if self.x_axis.id() == id {
            return Ok(&mut self.x_axis);
        }
        self.y_axes
            .iter_mut()
            .find(|axis| axis.id() == id)
            .ok_or(DashboardError::UnknownAxis(id))
    }

    /// Remove a Y axis. Fails while a series is bound to it.
    pub fn dispose_axis(&mut self, id: AxisId) -> Result<(), DashboardError> {
        if self.x_axis.id() == id {
            return Err(DashboardError::WrongAxisDimension(id));
        }
        let index = self
            .y_axes
            .iter()
            .position(|axis| axis.id() == id)
            .ok_or(DashboardError::UnknownAxis(id))?;
        if self.series.iter().any(|series| series.y_axis() == id) {
            return Err(DashboardError::AxisInUse(id));
        }
        self.y_axes.remove(index);
        if self.default_y == Some(id) {
            self.default_y = None;
        }
        tracing::debug!(chart = %self.title, axis = ?id, "disposed axis");
        Ok(())
    }

    /// Add a line series bound to the axes named in `options`.
    pub fn add_line_series(
        &mut self,
        options: LineSeriesOptions,
    ) -> Result<SeriesId, DashboardError> {
        let x_axis = options.x_axis.unwrap_or_else(|| self.x_axis.id());
        if x_axis != self.x_axis.id() {
            return Err(match self.axis(x_axis) {
                Some(_) => DashboardError::WrongAxisDimension(x_axis),
                None => DashboardError::UnknownAxis(x_axis),
            });
        }
        let y_axis = match options.y_axis {
            Some(id) => id,
            None => self
                .default_axis_y_id()
                .ok_or(DashboardError::UnknownAxis(x_axis))?,
        };
        match self.axis(y_axis) {
            None => return Err(DashboardError::UnknownAxis(y_axis)),
            Some(axis) if axis.dimension() != Dimension::Y => {
                return Err(DashboardError::WrongAxisDimension(y_axis));
            }
            Some(_) => {}
        }
        let stroke = LineStyle::new(
            self.theme.series_color(self.series.len()),
            DEFAULT_STROKE_WIDTH,
        );
        let series = LineSeries::new(options, x_axis, y_axis, stroke);
        let id = series.id();
        self.series.push(series);
        Ok(id)
    }

    /// All series in creation order.
    pub fn series(&self) -> &[LineSeries] {
        &self.series
    }

    /// Look up a series by id.
    pub fn series_by_id(&self, id: SeriesId) -> Option<&LineSeries> {
        self.series.iter().find(|series| series.id() == id)
    }

    /// Look up a series by id for configuration.
    pub fn series_mut(&mut self, id: SeriesId) -> Result<&mut LineSeries, DashboardError> {
        self.series
            .iter_mut()
            .find(|series| series.id() == id)
            .ok_or(DashboardError::UnknownSeries(id))
    }

    /// Append points to a series and return how many were stored.
    ///
    /// Bound axes scroll after every stored point. Data cleaning runs once the
    /// whole batch is in.
    pub fn append(&mut self, id: SeriesId, points: &[Point]) -> Result<usize, DashboardError> {
        let index = self
            .series
            .iter()
            .position(|series| series.id() == id)
            .ok_or(DashboardError::UnknownSeries(id))?;
        let y_id = self.series[index].y_axis();
        let y_index = self
            .y_axes
            .iter()
            .position(|axis| axis.id() == y_id)
            .ok_or(DashboardError::UnknownAxis(y_id))?;

        let series = &mut self.series[index];
        let mut stored = 0;
        for point in points {
            match series.push(*point) {
                // Pattern violations are logged by the series; the point is kept.
                Ok(()) | Err(AppendError::PatternViolated | AppendError::IrregularStep) => {}
                Err(AppendError::NonFinite) => continue,
            }
            stored += 1;
            self.x_axis.observe(point.x);
            self.y_axes[y_index].observe(point.y);
        }

        let mut evicted = series.enforce_cap();
        if let Some(dimension) = series.pattern_dimension() {
            let visible = match dimension {
                Dimension::X => self.x_axis.interval().range(),
                Dimension::Y => self.y_axes[y_index].interval().range(),
            };
            evicted += series.clean(visible);
        }
        if evicted > 0 {
            self.refresh_axis_extents();
        }
        Ok(stored)
    }

    /// Recompute every axis' data extent from retained data.
    fn refresh_axis_extents(&mut self) {
        let x_id = self.x_axis.id();
        let x_extent = extent_of(&self.series, Dimension::X, |series| series.x_axis() == x_id);
        self.x_axis.set_data_extent(x_extent);
        for axis in &mut self.y_axes {
            let y_id = axis.id();
            let extent = extent_of(&self.series, Dimension::Y, |series| series.y_axis() == y_id);
            axis.set_data_extent(extent);
        }
    }

    fn axes_mut(&mut self) -> impl Iterator<Item = &mut Axis> {
        std::iter::once(&mut self.x_axis).chain(self.y_axes.iter_mut())
    }

    /// Pan every axis by a fraction of its span and stop scrolling.
    ///
    /// Positive fractions move the view towards the interval end.
    pub fn pan(&mut self, fraction_x: f64, fraction_y: f64) {
        for axis in self.axes_mut() {
            let interval = axis.interval();
            let fraction = match axis.dimension() {
                Dimension::X => fraction_x,
                Dimension::Y => fraction_y,
            };
            if fraction != 0.0 {
                axis.pan_by((interval.end - interval.start) * fraction);
            }
        }
    }

    /// Zoom every axis around an anchor given as a fraction from the interval
    /// start. Factors below 1.0 zoom in.
    pub fn zoom(&mut self, anchor: (f64, f64), factor_x: f64, factor_y: f64) {
        for axis in self.axes_mut() {
            let interval = axis.interval();
            let (fraction, factor) = match axis.dimension() {
                Dimension::X => (anchor.0, factor_x),
                Dimension::Y => (anchor.1, factor_y),
            };
            if factor != 1.0 {
                let center = interval.start + (interval.end - interval.start) * fraction;
                axis.zoom_around(center, factor);
            }
        }
    }

    /// Release every axis so automatic scrolling resumes.
    pub fn reset_view(&mut self) {
        for axis in self.axes_mut() {
            axis.release();
        }
    }

    /// Check whether any axis was stopped by interaction.
    pub fn is_view_stopped(&self) -> bool {
        self.x_axis.is_stopped() || self.y_axes.iter().any(Axis::is_stopped)
    }
}

fn extent_of(
    series: &[LineSeries],
    dimension: Dimension,
    bound: impl Fn(&LineSeries) -> bool,
) -> Option<Range> {
    series
        .iter()
        .filter(|series| bound(series))
        .filter_map(|series| series.store().bounds())
        .map(|bounds| bounds.along(dimension))
        .reduce(|a, b| Range::union(a, b).unwrap_or(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisInterval, ScrollStrategy};
    use crate::series::{DataCleaning, DataPattern, PatternKind};

    #[test]
    fn dispose_axis_in_use_fails() {
        let mut chart = ChartXY::new(Theme::default());
        let custom = chart.add_axis_y(true).id();
        let series = chart
            .add_line_series(LineSeriesOptions::new().y_axis(custom))
            .unwrap();
        assert_eq!(
            chart.dispose_axis(custom),
            Err(DashboardError::AxisInUse(custom))
        );
        let default_y = chart.default_axis_y_id().unwrap();
        assert_ne!(default_y, custom);
        chart.dispose_axis(default_y).unwrap();
        assert_eq!(chart.default_axis_y_id(), Some(custom));
        assert_eq!(
            chart.dispose_axis(default_y),
            Err(DashboardError::UnknownAxis(default_y))
        );
        assert_eq!(chart.series_by_id(series).map(LineSeries::y_axis), Some(custom));
    }

    #[test]
    fn series_on_x_axis_as_y_is_rejected() {
        let mut chart = ChartXY::new(Theme::default());
        let x = chart.default_axis_x().id();
        assert_eq!(
            chart.add_line_series(LineSeriesOptions::new().y_axis(x)),
            Err(DashboardError::WrongAxisDimension(x))
        );
    }

    #[test]
    fn append_scrolls_and_cleans() {
        let mut chart = ChartXY::new(Theme::default());
        chart
            .default_axis_y_mut()
            .unwrap()
            .set_interval(AxisInterval::new(0.0, 10.0))
            .unwrap()
            .set_scroll_strategy(ScrollStrategy::Progressive);
        let series = chart
            .add_line_series(
                LineSeriesOptions::new()
                    .data_pattern(DataPattern::new(PatternKind::ProgressiveY))
                    .data_cleaning(DataCleaning::new(5)),
            )
            .unwrap();
        let points: Vec<Point> = (0..=40).map(|i| Point::new(0.0, i as f64)).collect();
        assert_eq!(chart.append(series, &points).unwrap(), 41);

        let y = chart.axes_y()[0].interval();
        assert_eq!(y, AxisInterval::new(30.0, 40.0));
        // Points below 30 are out of view; the ten visible ones remain.
        let retained = chart.series_by_id(series).unwrap();
        assert_eq!(retained.len(), 11);
        assert_eq!(retained.store().point(0), Some(Point::new(0.0, 30.0)));
        assert_eq!(chart.axes_y()[0].data_state().data_min, Some(30.0));
    }

    #[test]
    fn hard_cap_refreshes_axis_extent() {
        let mut chart = ChartXY::new(Theme::default());
        chart
            .default_axis_y_mut()
            .unwrap()
            .set_scroll_strategy(ScrollStrategy::Fitting);
        let series = chart
            .add_line_series(LineSeriesOptions::new().max_sample_count(3))
            .unwrap();
        let points: Vec<Point> = [100.0, 0.0, 1.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, y)| Point::new(i as f64, *y))
            .collect();
        assert_eq!(chart.append(series, &points).unwrap(), 4);

        let retained: Vec<f64> = chart.series_by_id(series).unwrap().store().points()
            .iter()
            .map(|point| point.y)
            .collect();
        assert_eq!(retained, [0.0, 1.0, 2.0]);
        let axis = &chart.axes_y()[0];
        assert_eq!(axis.data_state().data_max, Some(2.0));
        assert_eq!(axis.interval().high(), 2.0);
        assert_eq!(chart.default_axis_x().data_state().data_min, Some(1.0));
    }

    #[test]
    fn non_finite_points_are_not_stored() {
        let mut chart = ChartXY::new(Theme::default());
        let series = chart.add_line_series(LineSeriesOptions::new()).unwrap();
        let stored = chart
            .append(series, &[Point::new(0.0, 1.0), Point::new(f64::NAN, 2.0)])
            .unwrap();
        assert_eq!(stored, 1);
        assert_eq!(chart.axes_y()[0].data_state().data_max, Some(1.0));
    }

    #[test]
    fn pan_stops_and_reset_releases() {
        let mut chart = ChartXY::new(Theme::default());
        chart
            .default_axis_y_mut()
            .unwrap()
            .set_interval(AxisInterval::new(0.0, 10.0))
            .unwrap()
            .set_scroll_strategy(ScrollStrategy::Progressive);
        let series = chart.add_line_series(LineSeriesOptions::new()).unwrap();
        chart.append(series, &[Point::new(0.0, 12.0)]).unwrap();
        chart.pan(0.0, -0.5);
        assert!(chart.is_view_stopped());
        assert_eq!(chart.axes_y()[0].interval(), AxisInterval::new(-3.0, 7.0));
        chart.append(series, &[Point::new(1.0, 20.0)]).unwrap();
        assert_eq!(chart.axes_y()[0].interval(), AxisInterval::new(-3.0, 7.0));
        chart.reset_view();
        assert!(!chart.is_view_stopped());
        assert_eq!(chart.axes_y()[0].interval(), AxisInterval::new(10.0, 20.0));
    }

    #[test]
    fn zoom_uses_anchor_fraction() {
        let mut chart = ChartXY::new(Theme::default());
        chart
            .default_axis_x_mut()
            .set_scroll_strategy(ScrollStrategy::None)
            .set_interval(AxisInterval::new(0.0, 10.0))
            .unwrap();
        chart.zoom((0.5, 0.5), 0.5, 1.0);
        assert_eq!(
            chart.default_axis_x().interval(),
            AxisInterval::new(2.5, 7.5)
        );
    }
}

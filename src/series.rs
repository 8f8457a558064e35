//! Line series configuration and storage.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::axis::AxisId;
use crate::datasource::{AppendError, SampleStore};
use crate::geom::{Dimension, Point};
use crate::render::{Color, LineStyle};
use crate::view::Range;

pub use crate::datasource::{DataPattern, PatternKind};

static SERIES_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(u64);

impl SeriesId {
    fn next() -> Self {
        Self(SERIES_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Automatic removal of data that scrolled out of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataCleaning {
    /// Number of points always kept, even when out of view.
    pub min_data_point_count: usize,
}

impl DataCleaning {
    /// Keep at least `min_data_point_count` points.
    pub fn new(min_data_point_count: usize) -> Self {
        Self {
            min_data_point_count,
        }
    }
}

/// How the auto cursor picks a data point for a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorSolveBasis {
    /// Nearest X coordinate.
    NearestX,
    /// Nearest Y coordinate.
    NearestY,
    /// Nearest point in screen distance.
    #[default]
    Nearest,
}

/// Point fill of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FillStyle {
    /// No point markers.
    #[default]
    Empty,
    /// Square markers filled with a color.
    Solid(Color),
}

/// Options for [`ChartXY::add_line_series`](crate::chart::ChartXY::add_line_series).
#[derive(Debug, Clone, Default)]
pub struct LineSeriesOptions {
    pub(crate) name: Option<String>,
    pub(crate) x_axis: Option<AxisId>,
    pub(crate) y_axis: Option<AxisId>,
    pub(crate) data_pattern: Option<DataPattern>,
    pub(crate) data_cleaning: Option<DataCleaning>,
    pub(crate) max_sample_count: Option<usize>,
    pub(crate) cursor_solve_basis: CursorSolveBasis,
    pub(crate) stroke: Option<LineStyle>,
    pub(crate) fill: FillStyle,
}

impl LineSeriesOptions {
    /// Options binding to the default axes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Series name shown in the cursor readout.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Bind to a specific X axis.
    pub fn x_axis(mut self, axis: AxisId) -> Self {
        self.x_axis = Some(axis);
        self
    }

    /// Bind to a specific Y axis.
    pub fn y_axis(mut self, axis: AxisId) -> Self {
        self.y_axis = Some(axis);
        self
    }

    /// Declare the trend of incoming data.
    pub fn data_pattern(mut self, pattern: DataPattern) -> Self {
        self.data_pattern = Some(pattern);
        self
    }

    /// Enable cleaning of out-scrolled data.
    pub fn data_cleaning(mut self, cleaning: DataCleaning) -> Self {
        self.data_cleaning = Some(cleaning);
        self
    }

    /// Hard cap on retained points; the oldest are evicted first.
    pub fn max_sample_count(mut self, count: usize) -> Self {
        self.max_sample_count = Some(count);
        self
    }

    /// Auto cursor solve basis.
    pub fn cursor_solve_basis(mut self, basis: CursorSolveBasis) -> Self {
        self.cursor_solve_basis = basis;
        self
    }

    /// Stroke style; defaults to the theme palette.
    pub fn stroke(mut self, style: LineStyle) -> Self {
        self.stroke = Some(style);
        self
    }

    /// Point fill style.
    pub fn fill(mut self, fill: FillStyle) -> Self {
        self.fill = fill;
        self
    }
}

/// Line series bound to one X and one Y axis.
#[derive(Debug, Clone)]
pub struct LineSeries {
    id: SeriesId,
    name: String,
    x_axis: AxisId,
    y_axis: AxisId,
    store: SampleStore,
    cleaning: Option<DataCleaning>,
    max_sample_count: Option<usize>,
    cursor_solve_basis: CursorSolveBasis,
    stroke: LineStyle,
    fill: FillStyle,
    visible: bool,
    violation_reported: bool,
}

impl LineSeries {
    pub(crate) fn new(
        options: LineSeriesOptions,
        x_axis: AxisId,
        y_axis: AxisId,
        default_stroke: LineStyle,
    ) -> Self {
        let id = SeriesId::next();
        Self {
            id,
            name: options
                .name
                .unwrap_or_else(|| format!("Series {}", id.0)),
            x_axis,
            y_axis,
            store: SampleStore::new(options.data_pattern),
            cleaning: options.data_cleaning,
            max_sample_count: options.max_sample_count,
            cursor_solve_basis: options.cursor_solve_basis,
            stroke: options.stroke.unwrap_or(default_stroke),
            fill: options.fill,
            visible: true,
            violation_reported: false,
        }
    }

    /// Access the series identifier.
    pub fn id(&self) -> SeriesId {
        self.id
    }

    /// Access the series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound X axis.
    pub fn x_axis(&self) -> AxisId {
        self.x_axis
    }

    /// Bound Y axis.
    pub fn y_axis(&self) -> AxisId {
        self.y_axis
    }

    /// Access the stored samples.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Number of retained points.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if no points are retained.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Declared data pattern.
    pub fn data_pattern(&self) -> Option<DataPattern> {
        self.store.pattern()
    }

    /// Data cleaning configuration.
    pub fn data_cleaning(&self) -> Option<DataCleaning> {
        self.cleaning
    }

    /// Configure data cleaning.
    pub fn set_data_cleaning(&mut self, cleaning: Option<DataCleaning>) -> &mut Self {
        self.cleaning = cleaning;
        self
    }

    /// Hard cap on retained points.
    pub fn max_sample_count(&self) -> Option<usize> {
        self.max_sample_count
    }

    /// Configure the hard cap on retained points.
    pub fn set_max_sample_count(&mut self, count: Option<usize>) -> &mut Self {
        self.max_sample_count = count;
        self.enforce_cap();
        self
    }

    /// Auto cursor solve basis.
    pub fn cursor_solve_basis(&self) -> CursorSolveBasis {
        self.cursor_solve_basis
    }

    /// Configure the auto cursor solve basis.
    pub fn set_cursor_solve_basis(&mut self, basis: CursorSolveBasis) -> &mut Self {
        self.cursor_solve_basis = basis;
        self
    }

    /// Stroke style.
    pub fn stroke(&self) -> LineStyle {
        self.stroke
    }

    /// Replace the stroke style.
    pub fn set_stroke(&mut self, stroke: LineStyle) -> &mut Self {
        self.stroke = stroke;
        self
    }

    /// Point fill style.
    pub fn fill(&self) -> FillStyle {
        self.fill
    }

    /// Replace the point fill style.
    pub fn set_fill(&mut self, fill: FillStyle) -> &mut Self {
        self.fill = fill;
        self
    }

    /// Check whether the series is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the series.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    /// Append a point.
    ///
    /// Pattern violations are reported but the point is kept; non-finite
    /// points are dropped.
    pub fn add(&mut self, point: Point) -> Result<(), AppendError> {
        let result = self.push(point);
        self.enforce_cap();
        result
    }

    /// Append without applying the hard cap; batches cap once at the end.
    pub(crate) fn push(&mut self, point: Point) -> Result<(), AppendError> {
        let result = self.store.push(point).map(|_| ());
        match result {
            Err(error @ (AppendError::PatternViolated | AppendError::IrregularStep))
                if !self.violation_reported =>
            {
                self.violation_reported = true;
                tracing::warn!(
                    series = %self.name,
                    x = point.x,
                    y = point.y,
                    %error,
                    "data does not follow the declared pattern"
                );
            }
            _ => {}
        }
        result
    }

    /// Evict the oldest points above `max_sample_count`; returns how many.
    pub(crate) fn enforce_cap(&mut self) -> usize {
        match self.max_sample_count {
            Some(cap) => {
                let excess = self.store.len().saturating_sub(cap);
                self.store.evict_front(excess)
            }
            None => 0,
        }
    }

    /// Drop data that scrolled out of `visible` along the pattern dimension.
    ///
    /// Keeps at least the configured minimum number of points and returns how
    /// many were dropped.
    pub(crate) fn clean(&mut self, visible: Range) -> usize {
        let Some(cleaning) = self.cleaning else {
            return 0;
        };
        let allowed = self
            .store
            .len()
            .saturating_sub(cleaning.min_data_point_count);
        if allowed == 0 {
            return 0;
        }
        let outscrolled = self.store.outscrolled_prefix(visible);
        let dropped = self.store.evict_front(outscrolled.min(allowed));
        if dropped > 0 {
            tracing::debug!(series = %self.name, dropped, retained = self.store.len(), "cleaned data");
        }
        dropped
    }

    /// Pattern dimension used for cleaning, if a pattern is declared.
    pub(crate) fn pattern_dimension(&self) -> Option<Dimension> {
        self.store.pattern().map(|pattern| pattern.pattern.dimension())
    }

    /// Solve the auto cursor target for a data-space pointer position.
    ///
    /// `pixels_per_unit` converts data distances into screen distances for
    /// [`CursorSolveBasis::Nearest`].
    pub fn solve_cursor(&self, target: Point, pixels_per_unit: (f64, f64)) -> Option<Point> {
        let index = match self.cursor_solve_basis {
            CursorSolveBasis::NearestX => self.store.nearest_index(Dimension::X, target.x),
            CursorSolveBasis::NearestY => self.store.nearest_index(Dimension::Y, target.y),
            CursorSolveBasis::Nearest => {
                self.store
                    .nearest_index_scaled(target, pixels_per_unit.0, pixels_per_unit.1)
            }
        }?;
        self.store.point(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Axis, AxisPosition};

    fn series(options: LineSeriesOptions) -> LineSeries {
        let x = Axis::new(Dimension::X, AxisPosition::Default);
        let y = Axis::new(Dimension::Y, AxisPosition::Default);
        LineSeries::new(options, x.id(), y.id(), LineStyle::default())
    }

    #[test]
    fn hard_cap_evicts_oldest() {
        let mut series = series(LineSeriesOptions::new().max_sample_count(3));
        for i in 0..5 {
            series.add(Point::new(i as f64, 0.0)).unwrap();
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.store().point(0), Some(Point::new(2.0, 0.0)));
    }

    #[test]
    fn cleaning_keeps_minimum_count() {
        let mut series = series(
            LineSeriesOptions::new()
                .data_pattern(DataPattern::new(PatternKind::ProgressiveY))
                .data_cleaning(DataCleaning::new(4)),
        );
        for i in 0..10 {
            series.add(Point::new(0.0, i as f64)).unwrap();
        }
        // Points 0..=7 are out of view, but only six may go.
        assert_eq!(series.clean(Range::new(8.0, 20.0)), 6);
        assert_eq!(series.len(), 4);
        assert_eq!(series.clean(Range::new(100.0, 200.0)), 0);
    }

    #[test]
    fn cleaning_without_pattern_keeps_everything() {
        let mut series = series(LineSeriesOptions::new().data_cleaning(DataCleaning::new(1)));
        for i in 0..10 {
            series.add(Point::new(0.0, i as f64)).unwrap();
        }
        assert_eq!(series.clean(Range::new(8.0, 20.0)), 0);
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn violation_keeps_point() {
        let mut series = series(
            LineSeriesOptions::new().data_pattern(DataPattern::new(PatternKind::RegressiveY)),
        );
        series.add(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(
            series.add(Point::new(0.0, 1.0)),
            Err(AppendError::PatternViolated)
        );
        assert_eq!(
            series.add(Point::new(0.0, 2.0)),
            Err(AppendError::PatternViolated)
        );
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn cursor_solves_by_basis() {
        let mut series = series(
            LineSeriesOptions::new()
                .data_pattern(DataPattern::new(PatternKind::ProgressiveY))
                .cursor_solve_basis(CursorSolveBasis::NearestY),
        );
        for i in 0..5 {
            series.add(Point::new((i as f64).sin(), i as f64)).unwrap();
        }
        let hit = series.solve_cursor(Point::new(100.0, 2.2), (1.0, 1.0));
        assert_eq!(hit, Some(Point::new(2.0_f64.sin(), 2.0)));

        series.set_cursor_solve_basis(CursorSolveBasis::Nearest);
        let hit = series.solve_cursor(Point::new(0.0, 0.1), (1.0, 1.0));
        assert_eq!(hit, Some(Point::new(0.0, 0.0)));
    }
}

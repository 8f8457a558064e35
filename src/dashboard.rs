//! Grid dashboard holding shared chart panes.

use std::sync::{Arc, RwLock};

use crate::chart::ChartXY;
use crate::error::DashboardError;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::series::{LineSeriesOptions, SeriesId};
use crate::style::Theme;

/// Dashboard grid configuration.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Number of grid rows.
    pub rows: usize,
    /// Number of grid columns.
    pub columns: usize,
    /// Theme shared by every chart.
    pub theme: Theme,
}

/// Cell occupied by a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPlacement {
    /// First column.
    pub column_index: usize,
    /// First row.
    pub row_index: usize,
    /// Number of columns covered.
    pub column_span: usize,
    /// Number of rows covered.
    pub row_span: usize,
}

impl ChartPlacement {
    /// Single cell at `(column, row)`.
    pub fn cell(column_index: usize, row_index: usize) -> Self {
        Self {
            column_index,
            row_index,
            column_span: 1,
            row_span: 1,
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.column_index < other.column_index + other.column_span
            && other.column_index < self.column_index + self.column_span
            && self.row_index < other.row_index + other.row_span
            && other.row_index < self.row_index + self.row_span
    }
}

/// Grid of chart panes.
#[derive(Debug)]
pub struct Dashboard {
    rows: usize,
    columns: usize,
    theme: Theme,
    charts: Vec<(ChartPlacement, ChartHandle)>,
}

impl Dashboard {
    /// Create an empty dashboard.
    pub fn new(options: DashboardOptions) -> Result<Self, DashboardError> {
        if options.rows == 0 || options.columns == 0 {
            return Err(DashboardError::EmptyGrid);
        }
        Ok(Self {
            rows: options.rows,
            columns: options.columns,
            theme: options.theme,
            charts: Vec::new(),
        })
    }

    /// Number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Dashboard theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Create a chart in the given grid cells.
    pub fn create_chart_xy(
        &mut self,
        placement: ChartPlacement,
    ) -> Result<ChartHandle, DashboardError> {
        let fits = placement.column_span > 0
            && placement.row_span > 0
            && placement.column_index + placement.column_span <= self.columns
            && placement.row_index + placement.row_span <= self.rows;
        if !fits {
            return Err(DashboardError::CellOutOfGrid {
                row: placement.row_index,
                column: placement.column_index,
                row_span: placement.row_span,
                column_span: placement.column_span,
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self
            .charts
            .iter()
            .any(|(existing, _)| existing.overlaps(&placement))
        {
            return Err(DashboardError::CellOccupied {
                row: placement.row_index,
                column: placement.column_index,
            });
        }
        let handle = ChartHandle::new(ChartXY::new(self.theme.clone()));
        self.charts.push((placement, handle.clone()));
        Ok(handle)
    }

    /// Charts with their placements, in creation order.
    pub fn charts(&self) -> &[(ChartPlacement, ChartHandle)] {
        &self.charts
    }

    /// Screen rectangle of every chart for a dashboard of the given size.
    pub fn cell_rects(&self, width: f32, height: f32) -> Vec<(ScreenRect, ChartHandle)> {
        self.charts
            .iter()
            .map(|(placement, handle)| (self.cell_rect(placement, width, height), handle.clone()))
            .collect()
    }

    /// Screen rectangle covered by a placement.
    pub fn cell_rect(&self, placement: &ChartPlacement, width: f32, height: f32) -> ScreenRect {
        let cell_width = width / self.columns as f32;
        let cell_height = height / self.rows as f32;
        ScreenRect::from_origin_size(
            ScreenPoint::new(
                placement.column_index as f32 * cell_width,
                placement.row_index as f32 * cell_height,
            ),
            placement.column_span as f32 * cell_width,
            placement.row_span as f32 * cell_height,
        )
    }
}

/// Shared handle to a chart.
///
/// Cloning the handle shares the same chart. Data producers on other threads
/// append through it while the UI renders.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    chart: Arc<RwLock<ChartXY>>,
}

impl ChartHandle {
    fn new(chart: ChartXY) -> Self {
        Self {
            chart: Arc::new(RwLock::new(chart)),
        }
    }

    /// Read the chart state.
    ///
    /// The chart is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&ChartXY) -> R) -> R {
        let chart = self.chart.read().expect("chart lock");
        f(&chart)
    }

    /// Mutate the chart state.
    ///
    /// The chart is locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut ChartXY) -> R) -> R {
        let mut chart = self.chart.write().expect("chart lock");
        f(&mut chart)
    }

    /// Add a line series and return a handle for appending to it.
    pub fn add_line_series(
        &self,
        options: LineSeriesOptions,
    ) -> Result<SeriesHandle, DashboardError> {
        let id = self.write(|chart| chart.add_line_series(options))?;
        Ok(SeriesHandle {
            chart: self.clone(),
            id,
        })
    }
}

/// Shared handle to one series of a chart.
#[derive(Debug, Clone)]
pub struct SeriesHandle {
    chart: ChartHandle,
    id: SeriesId,
}

impl SeriesHandle {
    /// Series identifier.
    pub fn id(&self) -> SeriesId {
        self.id
    }

    /// Chart owning the series.
    pub fn chart(&self) -> &ChartHandle {
        &self.chart
    }

    /// Append one point.
    pub fn add(&self, point: Point) -> Result<(), DashboardError> {
        self.add_batch(&[point]).map(|_| ())
    }

    /// Append points under a single chart lock; returns how many were stored.
    pub fn add_batch(&self, points: &[Point]) -> Result<usize, DashboardError> {
        self.chart.write(|chart| chart.append(self.id, points))
    }

    /// Number of retained points.
    pub fn len(&self) -> usize {
        self.chart
            .read(|chart| chart.series_by_id(self.id).map_or(0, |series| series.len()))
    }

    /// Check if no points are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether all data so far followed the declared pattern.
    pub fn pattern_holds(&self) -> bool {
        self.chart.read(|chart| {
            chart
                .series_by_id(self.id)
                .is_some_and(|series| series.store().pattern_holds())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> Dashboard {
        Dashboard::new(DashboardOptions {
            rows: 1,
            columns: 2,
            theme: Theme::default(),
        })
        .unwrap()
    }

    #[test]
    fn empty_grid_is_rejected() {
        let result = Dashboard::new(DashboardOptions {
            rows: 0,
            columns: 2,
            theme: Theme::default(),
        });
        assert!(matches!(result, Err(DashboardError::EmptyGrid)));
    }

    #[test]
    fn placements_must_fit_and_not_overlap() {
        let mut dashboard = dashboard();
        dashboard.create_chart_xy(ChartPlacement::cell(0, 0)).unwrap();
        assert!(matches!(
            dashboard.create_chart_xy(ChartPlacement::cell(2, 0)),
            Err(DashboardError::CellOutOfGrid { column: 2, .. })
        ));
        assert!(matches!(
            dashboard.create_chart_xy(ChartPlacement {
                column_index: 0,
                row_index: 0,
                column_span: 2,
                row_span: 1,
            }),
            Err(DashboardError::CellOccupied { row: 0, column: 0 })
        ));
        dashboard.create_chart_xy(ChartPlacement::cell(1, 0)).unwrap();
        assert_eq!(dashboard.charts().len(), 2);
    }

    #[test]
    fn cell_rects_split_the_surface() {
        let mut dashboard = dashboard();
        dashboard.create_chart_xy(ChartPlacement::cell(0, 0)).unwrap();
        dashboard.create_chart_xy(ChartPlacement::cell(1, 0)).unwrap();
        let rects: Vec<ScreenRect> = dashboard
            .cell_rects(800.0, 400.0)
            .into_iter()
            .map(|(rect, _)| rect)
            .collect();
        assert_eq!(
            rects,
            [
                ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(400.0, 400.0)),
                ScreenRect::new(ScreenPoint::new(400.0, 0.0), ScreenPoint::new(800.0, 400.0)),
            ]
        );
    }

    #[test]
    fn series_handle_appends_across_threads() {
        let mut dashboard = dashboard();
        let chart = dashboard.create_chart_xy(ChartPlacement::cell(0, 0)).unwrap();
        let series = chart.add_line_series(LineSeriesOptions::new()).unwrap();
        let producer = series.clone();
        std::thread::spawn(move || {
            for i in 0..100 {
                producer.add(Point::new(i as f64, 0.0)).unwrap();
            }
        })
        .join()
        .unwrap();
        assert_eq!(series.len(), 100);
    }

    #[test]
    fn single_point_add_updates_axes() {
        let mut dashboard = dashboard();
        let chart = dashboard.create_chart_xy(ChartPlacement::cell(0, 0)).unwrap();
        let series = chart.add_line_series(LineSeriesOptions::new()).unwrap();
        series.add(Point::new(2.0, 7.0)).unwrap();
        series.add(Point::new(3.0, -1.0)).unwrap();
        chart.read(|chart| {
            let y = chart.axes_y()[0].data_state();
            assert_eq!((y.data_min, y.data_max), (Some(-1.0), Some(7.0)));
            assert_eq!(chart.default_axis_x().data_state().data_max, Some(3.0));
        });
    }
}

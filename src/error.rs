//! Error types shared across the crate.

use thiserror::Error;

use crate::axis::AxisId;
use crate::series::SeriesId;

/// Errors raised while assembling or mutating dashboards and charts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The dashboard grid has no rows or no columns.
    #[error("dashboard grid must have at least one row and one column")]
    EmptyGrid,

    /// A chart placement does not fit into the grid.
    #[error(
        "chart cell at row {row}, column {column} with span {row_span}x{column_span} \
         does not fit a {rows}x{columns} grid"
    )]
    CellOutOfGrid {
        row: usize,
        column: usize,
        row_span: usize,
        column_span: usize,
        rows: usize,
        columns: usize,
    },

    /// A chart placement overlaps a chart created earlier.
    #[error("chart cell at row {row}, column {column} overlaps an existing chart")]
    CellOccupied { row: usize, column: usize },

    /// The axis does not exist in the chart (or was disposed).
    #[error("unknown axis {0:?}")]
    UnknownAxis(AxisId),

    /// The axis exists but is not a Y axis.
    #[error("axis {0:?} cannot bind series on the requested dimension")]
    WrongAxisDimension(AxisId),

    /// The axis still has series bound to it.
    #[error("axis {0:?} is still used by a series")]
    AxisInUse(AxisId),

    /// The series does not exist in the chart.
    #[error("unknown series {0:?}")]
    UnknownSeries(SeriesId),

    /// The requested interval is not usable.
    #[error("axis interval [{start}, {end}] must be finite with a non-zero span")]
    InvalidInterval { start: f64, end: f64 },
}

/// Errors raised while configuring sample generators and streams.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    /// Sampling step must be finite and positive.
    #[error("sampling step must be finite and positive, got {0}")]
    InvalidStep(f64),

    /// Sampling domain must be finite with `end >= start`.
    #[error("sampling domain [{start}, {end}] is invalid")]
    InvalidDomain { start: f64, end: f64 },

    /// Streams need at least one sample per batch.
    #[error("stream batch size must be at least 1")]
    InvalidBatchSize,
}

/// Errors raised while loading the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for [`PipelineConfig`](crate::config::PipelineConfig).
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but is outside its allowed domain.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

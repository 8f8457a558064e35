//! gpui_streamdash renders real-time scrolling line charts with GPUI.
//! Charts live on a dashboard grid, and background producers append samples
//! whose declared data pattern lets the axes scroll and old points be cleaned.

#![forbid(unsafe_code)]

pub mod axis;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod datasource;
pub mod error;
pub mod generator;
pub mod geom;
pub mod gpui_backend;
pub(crate) mod interaction;
pub mod pipeline;
pub mod render;
pub mod series;
pub mod style;
pub(crate) mod transform;
pub mod view;

pub use axis::{
    Axis, AxisDataState, AxisFormatter, AxisId, AxisInterval, AxisPosition, ScrollStrategy,
};
pub use chart::ChartXY;
pub use config::PipelineConfig;
pub use dashboard::{ChartHandle, ChartPlacement, Dashboard, DashboardOptions, SeriesHandle};
pub use datasource::{AppendError, DataPattern, PatternKind, SampleStore};
pub use error::{ConfigError, DashboardError, GeneratorError};
pub use generator::{DataStream, GeneratedData, ProgressiveFunctionGenerator, StreamHandle};
pub use geom::{Dimension, Point, ScreenPoint, ScreenRect};
pub use gpui_backend::{ChartViewConfig, GpuiChartView, GpuiDashboardView};
pub use pipeline::ProgressiveDashboard;
pub use render::{Color, LineStyle, MarkerStyle};
pub use series::{
    CursorSolveBasis, DataCleaning, FillStyle, LineSeries, LineSeriesOptions, SeriesId,
};
pub use style::Theme;
pub use view::Range;

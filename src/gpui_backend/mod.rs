//! GPUI integration for gpui_streamdash.
//!
//! This module renders a [`Dashboard`](crate::dashboard::Dashboard) of
//! [`ChartXY`](crate::chart::ChartXY) panes and turns pointer input into
//! pan, zoom and cursor readouts.

#![allow(clippy::collapsible_if)]

mod config;
mod dashboard;
mod frame;
mod geometry;
mod paint;
mod state;
mod text;
mod view;

pub use config::ChartViewConfig;
pub use dashboard::GpuiDashboardView;
pub use view::GpuiChartView;

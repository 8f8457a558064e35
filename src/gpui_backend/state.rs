use std::collections::HashMap;

use crate::axis::AxisId;
use crate::datasource::DecimationScratch;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::interaction::ChartRegions;
use crate::render::RenderCacheKey;
use crate::series::SeriesId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DragMode {
    Pan,
    ZoomX,
    ZoomY(AxisId),
}

#[derive(Debug, Clone)]
pub(crate) struct DragState {
    pub(crate) mode: DragMode,
    pub(crate) start: ScreenPoint,
    pub(crate) last: ScreenPoint,
    pub(crate) active: bool,
}

impl DragState {
    pub(crate) fn new(mode: DragMode, start: ScreenPoint) -> Self {
        Self {
            mode,
            start,
            last: start,
            active: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SeriesCache {
    pub(crate) key: Option<RenderCacheKey>,
    pub(crate) points: Vec<Point>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ChartUiState {
    pub(crate) regions: ChartRegions,
    pub(crate) plot_rect: Option<ScreenRect>,
    pub(crate) drag: Option<DragState>,
    pub(crate) hover: Option<ScreenPoint>,
    pub(crate) decimation_scratch: DecimationScratch,
    pub(crate) series_cache: HashMap<SeriesId, SeriesCache>,
}

impl ChartUiState {
    pub(crate) fn clear_interaction(&mut self) {
        self.drag = None;
    }

    /// Drop caches of series that no longer exist.
    pub(crate) fn retain_series(&mut self, alive: impl Fn(SeriesId) -> bool) {
        self.series_cache.retain(|id, _| alive(*id));
    }
}

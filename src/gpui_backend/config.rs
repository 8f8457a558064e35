/// Configuration for the GPUI chart view.
#[derive(Debug, Clone)]
pub struct ChartViewConfig {
    /// Pixel threshold for starting a drag.
    pub drag_threshold_px: f32,
    /// Desired pixel distance between X ticks.
    pub x_tick_spacing_px: f32,
    /// Desired pixel distance between Y ticks.
    pub y_tick_spacing_px: f32,
    /// Chart title font size.
    pub title_size: f32,
    /// Tick label font size.
    pub label_size: f32,
    /// Show the auto cursor readout.
    pub show_cursor: bool,
}

impl Default for ChartViewConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 4.0,
            x_tick_spacing_px: 90.0,
            y_tick_spacing_px: 48.0,
            title_size: 16.0,
            label_size: 11.0,
            show_cursor: true,
        }
    }
}

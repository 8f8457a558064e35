//! Visual themes.

use crate::render::Color;

/// Name of the theme used when none is requested.
pub const DEFAULT_THEME_NAME: &str = "darkGold";

/// Visual theme for dashboards and charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name as accepted by [`Theme::named`].
    pub name: &'static str,
    /// Dashboard background behind chart panes.
    pub background: Color,
    /// Chart pane fill.
    pub panel: Color,
    /// Series area fill.
    pub plot_area: Color,
    /// Chart title color.
    pub title: Color,
    /// Axis line and tick label color.
    pub axis: Color,
    /// Grid line color.
    pub grid: Color,
    /// Auto cursor line and readout color.
    pub cursor: Color,
    /// Auto cursor readout background.
    pub cursor_fill: Color,
    /// Series stroke colors, assigned in creation order.
    pub palette: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Neutral dark theme.
    pub fn dark() -> Self {
        Self {
            name: "darkTheme",
            background: Color::from_rgb8(0x18, 0x18, 0x1c),
            panel: Color::from_rgb8(0x20, 0x21, 0x26),
            plot_area: Color::from_rgb8(0x1a, 0x1b, 0x20),
            title: Color::from_rgb8(0xe6, 0xe6, 0xe6),
            axis: Color::from_rgb8(0xa8, 0xa8, 0xb0),
            grid: Color::from_rgb8(0x33, 0x35, 0x3d),
            cursor: Color::from_rgb8(0xf2, 0xf2, 0xf2),
            cursor_fill: Color::new(0.08, 0.08, 0.1, 0.85),
            palette: vec![
                Color::from_rgb8(0x4f, 0xa3, 0xff),
                Color::from_rgb8(0xff, 0x8a, 0x3d),
                Color::from_rgb8(0x5c, 0xd6, 0x8a),
                Color::from_rgb8(0xd6, 0x5c, 0xc7),
            ],
        }
    }

    /// Dark theme with gold accents.
    pub fn dark_gold() -> Self {
        Self {
            name: DEFAULT_THEME_NAME,
            background: Color::from_rgb8(0x12, 0x11, 0x0e),
            panel: Color::from_rgb8(0x1c, 0x1a, 0x15),
            plot_area: Color::from_rgb8(0x16, 0x15, 0x11),
            title: Color::from_rgb8(0xf4, 0xd0, 0x6f),
            axis: Color::from_rgb8(0xc9, 0xb2, 0x7c),
            grid: Color::from_rgb8(0x35, 0x30, 0x24),
            cursor: Color::from_rgb8(0xff, 0xe3, 0x9b),
            cursor_fill: Color::new(0.1, 0.09, 0.06, 0.9),
            palette: vec![
                Color::from_rgb8(0xf7, 0xc5, 0x48),
                Color::from_rgb8(0xe0, 0x7b, 0x39),
                Color::from_rgb8(0xb8, 0xd4, 0x6a),
                Color::from_rgb8(0x9d, 0x7b, 0xe0),
            ],
        }
    }

    /// Light theme.
    pub fn light() -> Self {
        Self {
            name: "lightNew",
            background: Color::from_rgb8(0xee, 0xef, 0xf2),
            panel: Color::WHITE,
            plot_area: Color::from_rgb8(0xfb, 0xfb, 0xfc),
            title: Color::from_rgb8(0x20, 0x22, 0x28),
            axis: Color::from_rgb8(0x4a, 0x4d, 0x57),
            grid: Color::from_rgb8(0xdd, 0xdf, 0xe4),
            cursor: Color::from_rgb8(0x20, 0x22, 0x28),
            cursor_fill: Color::new(1.0, 1.0, 1.0, 0.9),
            palette: vec![
                Color::from_rgb8(0x1f, 0x6f, 0xd1),
                Color::from_rgb8(0xd1, 0x4b, 0x1f),
                Color::from_rgb8(0x2c, 0x9c, 0x55),
                Color::from_rgb8(0x8a, 0x3f, 0xb8),
            ],
        }
    }

    /// High-contrast neon theme.
    pub fn cyber_space() -> Self {
        Self {
            name: "cyberSpace",
            background: Color::from_rgb8(0x05, 0x06, 0x14),
            panel: Color::from_rgb8(0x0b, 0x0d, 0x24),
            plot_area: Color::from_rgb8(0x07, 0x09, 0x1b),
            title: Color::from_rgb8(0x7d, 0xf9, 0xff),
            axis: Color::from_rgb8(0x6a, 0x8c, 0xff),
            grid: Color::from_rgb8(0x1b, 0x22, 0x4f),
            cursor: Color::from_rgb8(0xff, 0x4f, 0xd8),
            cursor_fill: Color::new(0.03, 0.04, 0.12, 0.9),
            palette: vec![
                Color::from_rgb8(0x00, 0xf0, 0xff),
                Color::from_rgb8(0xff, 0x3c, 0xac),
                Color::from_rgb8(0xb6, 0xff, 0x3c),
                Color::from_rgb8(0xff, 0xd7, 0x3c),
            ],
        }
    }

    /// Look up a theme by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "darkGold" => Some(Self::dark_gold()),
            "darkTheme" | "dark" => Some(Self::dark()),
            "lightNew" | "light" => Some(Self::light()),
            "cyberSpace" => Some(Self::cyber_space()),
            _ => None,
        }
    }

    /// Resolve a requested theme name.
    ///
    /// No name selects `darkGold`; an unknown name selects the default theme.
    pub fn resolve(name: Option<&str>) -> Self {
        let name = name.unwrap_or(DEFAULT_THEME_NAME);
        Self::named(name).unwrap_or_else(|| {
            tracing::warn!(theme = name, "unknown theme, using default");
            Self::default()
        })
    }

    /// Stroke color for the n-th series of a chart.
    pub fn series_color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return self.axis;
        }
        self.palette[index % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults_to_dark_gold() {
        assert_eq!(Theme::resolve(None).name, "darkGold");
        assert_eq!(Theme::resolve(Some("cyberSpace")).name, "cyberSpace");
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        assert_eq!(Theme::resolve(Some("nope")), Theme::default());
    }

    #[test]
    fn palette_wraps() {
        let theme = Theme::light();
        assert_eq!(theme.series_color(0), theme.series_color(4));
    }
}

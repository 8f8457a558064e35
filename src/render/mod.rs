//! Rendering primitives and clipping helpers.
//!
//! These types are backend-agnostic and are used by render backends (such as the
//! GPUI backend) to describe how charts should be drawn.

use crate::axis::AxisInterval;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::transform::Transform;

/// RGBA color in linear space.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

/// Line stroke styling.
///
/// The width is expressed in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl LineStyle {
    /// Create a stroke style.
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.5,
        }
    }
}

/// Square point marker styling.
///
/// Marker sizes are expressed in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Marker color.
    pub color: Color,
    /// Marker size in pixels.
    pub size: f32,
}

/// Rectangle styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RectStyle {
    /// Fill color.
    pub fill: Color,
    /// Stroke color.
    pub stroke: Color,
    /// Stroke width.
    pub stroke_width: f32,
}

impl RectStyle {
    /// Filled rectangle without a border.
    pub(crate) fn filled(fill: Color) -> Self {
        Self {
            fill,
            stroke: Color::TRANSPARENT,
            stroke_width: 0.0,
        }
    }
}

/// Text styling.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextStyle {
    /// Text color.
    pub color: Color,
    /// Font size in pixels.
    pub size: f32,
}

/// A line segment in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineSegment {
    /// Segment start.
    pub start: ScreenPoint,
    /// Segment end.
    pub end: ScreenPoint,
}

impl LineSegment {
    /// Create a new line segment.
    pub(crate) fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self { start, end }
    }
}

/// Render command list.
#[derive(Debug, Clone)]
pub(crate) enum RenderCommand {
    /// Start clipping to a rectangle.
    ClipRect(ScreenRect),
    /// End clipping.
    ClipEnd,
    /// Draw line segments.
    LineSegments {
        /// Segments to draw.
        segments: Vec<LineSegment>,
        /// Styling for the segments.
        style: LineStyle,
    },
    /// Draw point markers.
    Points {
        /// Marker centers.
        points: Vec<ScreenPoint>,
        /// Marker styling.
        style: MarkerStyle,
    },
    /// Draw a rectangle.
    Rect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Rectangle styling.
        style: RectStyle,
    },
    /// Draw text with its top-left corner at `position`.
    Text {
        /// Text position.
        position: ScreenPoint,
        /// Text content.
        text: String,
        /// Text styling.
        style: TextStyle,
    },
}

/// Aggregated render commands.
#[derive(Debug, Default, Clone)]
pub(crate) struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub(crate) fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Access all render commands.
    pub(crate) fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }
}

/// Cache key for decimated series data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RenderCacheKey {
    /// X interval used for decimation.
    pub x: AxisInterval,
    /// Y interval used for decimation.
    pub y: AxisInterval,
    /// Plot size in pixels.
    pub size: (u32, u32),
    /// Data generation for cache invalidation.
    pub generation: u64,
}

/// Build clipped line segments from data points.
pub(crate) fn build_line_segments(
    points: &[Point],
    transform: &Transform,
    clip: ScreenRect,
    out: &mut Vec<LineSegment>,
) {
    out.clear();
    if points.len() < 2 {
        return;
    }
    for window in points.windows(2) {
        let Some(start) = transform.data_to_screen(window[0]) else {
            continue;
        };
        let Some(end) = transform.data_to_screen(window[1]) else {
            continue;
        };
        if let Some((clipped_start, clipped_end)) = clip_segment(start, end, clip) {
            out.push(LineSegment::new(clipped_start, clipped_end));
        }
    }
}

/// Build screen positions for point markers inside the clip rectangle.
pub(crate) fn build_markers(
    points: &[Point],
    transform: &Transform,
    clip: ScreenRect,
    out: &mut Vec<ScreenPoint>,
) {
    out.clear();
    out.extend(
        points
            .iter()
            .filter_map(|point| transform.data_to_screen(*point))
            .filter(|screen| clip.contains(*screen)),
    );
}

/// Liang-Barsky clipping of a segment against a rectangle (edges included).
fn clip_segment(
    start: ScreenPoint,
    end: ScreenPoint,
    rect: ScreenRect,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    let edges = [
        (-dx, start.x - rect.min.x),
        (dx, rect.max.x - start.x),
        (-dy, start.y - rect.min.y),
        (dy, rect.max.y - start.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }
    let at = |t: f32| ScreenPoint::new(start.x + dx * t, start.y + dy * t);
    Some((
        if t0 > 0.0 { at(t0) } else { start },
        if t1 < 1.0 { at(t1) } else { end },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ScreenRect {
        ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0))
    }

    #[test]
    fn clip_segment_inside() {
        let start = ScreenPoint::new(2.0, 2.0);
        let end = ScreenPoint::new(8.0, 8.0);
        let clipped = clip_segment(start, end, rect()).expect("segment should clip");
        assert_eq!(clipped, (start, end));
    }

    #[test]
    fn clip_segment_crossing_edge() {
        let clipped = clip_segment(ScreenPoint::new(5.0, 5.0), ScreenPoint::new(15.0, 5.0), rect())
            .expect("segment should clip");
        assert_eq!(clipped.1, ScreenPoint::new(10.0, 5.0));
        assert!(
            clip_segment(ScreenPoint::new(11.0, 0.0), ScreenPoint::new(12.0, 9.0), rect())
                .is_none()
        );
    }

    #[test]
    fn build_segments_with_reversed_axis() {
        let transform = Transform::new(
            AxisInterval::new(0.0, 1.0),
            AxisInterval::new(1.0, 0.0),
            rect(),
        )
        .expect("valid transform");
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let mut out = Vec::new();
        build_line_segments(&points, &transform, rect(), &mut out);
        assert_eq!(
            out,
            [LineSegment::new(
                ScreenPoint::new(0.0, 0.0),
                ScreenPoint::new(10.0, 10.0)
            )]
        );
    }
}

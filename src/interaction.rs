//! Interaction helpers for panning and zooming.
//!
//! These helpers are used by render backends to turn pointer input into
//! [`ChartXY::pan`](crate::chart::ChartXY::pan) and
//! [`ChartXY::zoom`](crate::chart::ChartXY::zoom) arguments.

use crate::axis::AxisId;
use crate::geom::{ScreenPoint, ScreenRect};

const WHEEL_ZOOM_SPEED: f64 = 0.002;
const MIN_ZOOM_FACTOR: f64 = 0.1;
const MAX_ZOOM_FACTOR: f64 = 10.0;

/// Interaction hit regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HitRegion {
    /// Series area.
    Plot,
    /// X axis area.
    XAxis,
    /// Area of one Y axis.
    YAxis(AxisId),
    /// Anywhere else (title, margins).
    Outside,
}

/// Screen regions for hit testing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChartRegions {
    /// Series area.
    pub(crate) plot: ScreenRect,
    /// X axis area.
    pub(crate) x_axis: ScreenRect,
    /// Y axis areas, left and right of the series area.
    pub(crate) y_axes: Vec<(AxisId, ScreenRect)>,
}

impl Default for ChartRegions {
    fn default() -> Self {
        let empty = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(0.0, 0.0));
        Self {
            plot: empty,
            x_axis: empty,
            y_axes: Vec::new(),
        }
    }
}

impl ChartRegions {
    /// Determine which region contains the point.
    pub(crate) fn hit_test(&self, point: ScreenPoint) -> HitRegion {
        if self.plot.contains(point) {
            return HitRegion::Plot;
        }
        if self.x_axis.contains(point) {
            return HitRegion::XAxis;
        }
        self.y_axes
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map_or(HitRegion::Outside, |(id, _)| HitRegion::YAxis(*id))
    }
}

/// Pointer position as fractions of the series area, measured from the
/// left and bottom edges (where axis intervals start).
pub(crate) fn anchor_fractions(rect: ScreenRect, point: ScreenPoint) -> (f64, f64) {
    let width = rect.width().max(1.0) as f64;
    let height = rect.height().max(1.0) as f64;
    (
        (point.x - rect.min.x) as f64 / width,
        (rect.max.y - point.y) as f64 / height,
    )
}

/// Pan fractions for a drag by `delta` pixels, so content follows the pointer.
pub(crate) fn pan_fractions(rect: ScreenRect, delta: ScreenPoint) -> (f64, f64) {
    let width = rect.width().max(1.0) as f64;
    let height = rect.height().max(1.0) as f64;
    (-(delta.x as f64) / width, delta.y as f64 / height)
}

/// Compute a zoom factor from a drag delta and axis length.
pub(crate) fn zoom_factor_from_drag(delta_pixels: f32, axis_pixels: f32) -> f64 {
    if axis_pixels <= 0.0 {
        return 1.0;
    }
    let normalized = delta_pixels as f64 / axis_pixels as f64;
    (1.0 - normalized).clamp(MIN_ZOOM_FACTOR, MAX_ZOOM_FACTOR)
}

/// Compute a zoom factor from a wheel delta in pixels; scrolling up zooms in.
pub(crate) fn zoom_factor_from_wheel(delta_pixels: f32) -> f64 {
    (1.0 - (delta_pixels as f64 * WHEEL_ZOOM_SPEED)).clamp(MIN_ZOOM_FACTOR, MAX_ZOOM_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::axis::AxisPosition;
    use crate::geom::Dimension;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> ScreenRect {
        ScreenRect::new(ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1))
    }

    #[test]
    fn hit_test_regions() {
        let axis = Axis::new(Dimension::Y, AxisPosition::Opposite).id();
        let regions = ChartRegions {
            plot: rect(0.0, 0.0, 10.0, 10.0),
            x_axis: rect(0.0, 10.0, 10.0, 12.0),
            y_axes: vec![(axis, rect(10.5, 0.0, 14.0, 10.0))],
        };
        assert_eq!(
            regions.hit_test(ScreenPoint::new(5.0, 5.0)),
            HitRegion::Plot
        );
        assert_eq!(
            regions.hit_test(ScreenPoint::new(5.0, 11.0)),
            HitRegion::XAxis
        );
        assert_eq!(
            regions.hit_test(ScreenPoint::new(12.0, 5.0)),
            HitRegion::YAxis(axis)
        );
        assert_eq!(
            regions.hit_test(ScreenPoint::new(-1.0, 5.0)),
            HitRegion::Outside
        );
    }

    #[test]
    fn fractions_follow_axis_orientation() {
        let plot = rect(0.0, 0.0, 200.0, 100.0);
        assert_eq!(anchor_fractions(plot, ScreenPoint::new(50.0, 25.0)), (0.25, 0.75));
        assert_eq!(pan_fractions(plot, ScreenPoint::new(20.0, 10.0)), (-0.1, 0.1));
    }

    #[test]
    fn zoom_factors_are_clamped() {
        assert_eq!(zoom_factor_from_drag(50.0, 100.0), 0.5);
        assert_eq!(zoom_factor_from_drag(500.0, 100.0), MIN_ZOOM_FACTOR);
        assert!(zoom_factor_from_wheel(100.0) < 1.0);
        assert!(zoom_factor_from_wheel(-100.0) > 1.0);
    }
}

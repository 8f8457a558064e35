//! Coordinate transforms between data and screen space.

use crate::axis::AxisInterval;
use crate::geom::{Point, ScreenPoint, ScreenRect};

const MIN_SPAN: f64 = 1e-12;

/// Transform from data coordinates into screen coordinates.
///
/// The interval start maps to the left (X) or bottom (Y) edge of the screen
/// rectangle, so a reversed interval flips the axis.
#[derive(Debug, Clone)]
pub(crate) struct Transform {
    x: AxisInterval,
    y: AxisInterval,
    screen: ScreenRect,
}

impl Transform {
    /// Create a transform for the given axis intervals and screen rectangle.
    pub(crate) fn new(x: AxisInterval, y: AxisInterval, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() {
            return None;
        }
        if !x.is_valid() || !y.is_valid() || x.span() < MIN_SPAN || y.span() < MIN_SPAN {
            return None;
        }
        Some(Self { x, y, screen })
    }

    /// Access the screen rectangle.
    pub(crate) fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Screen X for a data X value.
    pub(crate) fn x_to_screen(&self, x: f64) -> f32 {
        let norm = (x - self.x.start) / (self.x.end - self.x.start);
        (self.screen.min.x as f64 + norm * self.screen.width() as f64) as f32
    }

    /// Screen Y for a data Y value.
    pub(crate) fn y_to_screen(&self, y: f64) -> f32 {
        let norm = (y - self.y.start) / (self.y.end - self.y.start);
        (self.screen.max.y as f64 - norm * self.screen.height() as f64) as f32
    }

    /// Map a data point into screen space.
    pub(crate) fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        Some(ScreenPoint::new(
            self.x_to_screen(point.x),
            self.y_to_screen(point.y),
        ))
    }

    /// Map a screen point into data space.
    pub(crate) fn screen_to_data(&self, point: ScreenPoint) -> Point {
        let x_norm = (point.x as f64 - self.screen.min.x as f64) / self.screen.width() as f64;
        let y_norm = (self.screen.max.y as f64 - point.y as f64) / self.screen.height() as f64;
        Point::new(
            self.x.start + x_norm * (self.x.end - self.x.start),
            self.y.start + y_norm * (self.y.end - self.y.start),
        )
    }

    /// Data units per screen pixel along X and Y (signed by axis direction).
    pub(crate) fn units_per_pixel(&self) -> (f64, f64) {
        (
            (self.x.end - self.x.start) / self.screen.width() as f64,
            (self.y.end - self.y.start) / self.screen.height() as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenRect {
        ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 100.0))
    }

    #[test]
    fn linear_roundtrip() {
        let transform = Transform::new(
            AxisInterval::new(0.0, 10.0),
            AxisInterval::new(0.0, 10.0),
            screen(),
        )
        .expect("valid transform");
        let point = Point::new(5.0, 7.5);
        let screen_point = transform.data_to_screen(point).unwrap();
        assert_eq!(screen_point, ScreenPoint::new(50.0, 25.0));
        let roundtrip = transform.screen_to_data(screen_point);
        assert!((roundtrip.x - point.x).abs() < 1e-6);
        assert!((roundtrip.y - point.y).abs() < 1e-6);
    }

    #[test]
    fn reversed_interval_flips_axis() {
        let transform = Transform::new(
            AxisInterval::new(0.0, 1.0),
            AxisInterval::new(10.0, 0.0),
            screen(),
        )
        .expect("valid transform");
        // Start of the Y interval sits at the bottom edge.
        assert_eq!(transform.y_to_screen(10.0), 100.0);
        assert_eq!(transform.y_to_screen(0.0), 0.0);
        assert_eq!(transform.y_to_screen(2.5), 25.0);
    }

    #[test]
    fn rejects_degenerate_input() {
        let empty = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(0.0, 10.0));
        assert!(
            Transform::new(AxisInterval::new(0.0, 1.0), AxisInterval::new(0.0, 1.0), empty)
                .is_none()
        );
        assert!(
            Transform::new(AxisInterval::new(1.0, 1.0), AxisInterval::new(0.0, 1.0), screen())
                .is_none()
        );
    }
}

//! Geometric primitives used by the charting pipeline.
//!
//! [`Point`] is a data-space coordinate. Screen-space types are used by render
//! backends and the dashboard layout.

/// One of the two data dimensions of an XY chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Horizontal dimension.
    X,
    /// Vertical dimension.
    Y,
}

impl Dimension {
    /// The other dimension.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }
}

/// A point in data space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// X value in data coordinates.
    pub x: f64,
    /// Y value in data coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new data point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Value of the point along a dimension.
    pub fn coordinate(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::X => self.x,
            Dimension::Y => self.y,
        }
    }

    /// Check whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// X value in screen pixels.
    pub x: f32,
    /// Y value in screen pixels.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin_size(origin: ScreenPoint, width: f32, height: f32) -> Self {
        Self {
            min: origin,
            max: ScreenPoint::new(origin.x + width, origin.y + height),
        }
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Check whether a point lies inside the rectangle (edges included).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_picks_dimension() {
        let point = Point::new(1.5, -2.0);
        assert_eq!(point.coordinate(Dimension::X), 1.5);
        assert_eq!(point.coordinate(Dimension::Y), -2.0);
        assert_eq!(Dimension::X.other(), Dimension::Y);
    }

    #[test]
    fn rect_contains_edges() {
        let rect = ScreenRect::from_origin_size(ScreenPoint::new(10.0, 10.0), 20.0, 5.0);
        assert!(rect.contains(ScreenPoint::new(10.0, 15.0)));
        assert!(rect.contains(ScreenPoint::new(30.0, 10.0)));
        assert!(!rect.contains(ScreenPoint::new(30.5, 12.0)));
    }
}

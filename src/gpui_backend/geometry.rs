use crate::geom::{ScreenPoint, ScreenRect};

pub(crate) fn distance_sq(a: ScreenPoint, b: ScreenPoint) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Move a box of `size` with its top-left at `point` so it stays inside `rect`.
pub(crate) fn clamp_point(point: ScreenPoint, rect: ScreenRect, size: (f32, f32)) -> ScreenPoint {
    let max_x = (rect.max.x - size.0).max(rect.min.x);
    let max_y = (rect.max.y - size.1).max(rect.min.y);
    ScreenPoint::new(
        point.x.clamp(rect.min.x, max_x),
        point.y.clamp(rect.min.y, max_y),
    )
}

/// Shrink a rectangle by `amount` on every side.
pub(crate) fn inset(rect: ScreenRect, amount: f32) -> ScreenRect {
    ScreenRect::new(
        ScreenPoint::new(rect.min.x + amount, rect.min.y + amount),
        ScreenPoint::new(
            (rect.max.x - amount).max(rect.min.x + amount),
            (rect.max.y - amount).max(rect.min.y + amount),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_box_inside() {
        let rect = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 50.0));
        let clamped = clamp_point(ScreenPoint::new(90.0, -5.0), rect, (20.0, 10.0));
        assert_eq!(clamped, ScreenPoint::new(80.0, 0.0));
    }

    #[test]
    fn inset_never_inverts() {
        let rect = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(4.0, 4.0));
        let inner = inset(rect, 3.0);
        assert!(inner.width() >= 0.0 && inner.height() >= 0.0);
    }
}

//! Min/max decimation along the pattern dimension.

use crate::geom::{Dimension, Point};
use crate::view::Range;

/// Scratch buffers for decimation.
#[derive(Debug, Default, Clone)]
pub(crate) struct DecimationScratch {
    buckets: Vec<Bucket>,
    points: Vec<Point>,
}

impl DecimationScratch {
    /// Create an empty scratch buffer.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clear the output points.
    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }

    /// Access the output points.
    pub(crate) fn output(&self) -> &[Point] {
        &self.points
    }

    /// Access the output points mutably.
    pub(crate) fn output_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }
}

/// Extremes of one pixel column, tracked on the value dimension with the
/// insertion index so emission keeps insertion order.
#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    has_data: bool,
    min: (usize, Point),
    max: (usize, Point),
}

impl Bucket {
    fn reset(&mut self) {
        self.has_data = false;
    }

    fn push(&mut self, index: usize, point: Point, value: Dimension) {
        if !self.has_data {
            self.has_data = true;
            self.min = (index, point);
            self.max = (index, point);
            return;
        }
        let v = point.coordinate(value);
        if v < self.min.1.coordinate(value) {
            self.min = (index, point);
        }
        if v > self.max.1.coordinate(value) {
            self.max = (index, point);
        }
    }

    fn push_ordered(&self, out: &mut Vec<Point>) {
        if !self.has_data {
            return;
        }
        if self.min.0 == self.max.0 {
            out.push(self.min.1);
        } else if self.min.0 < self.max.0 {
            out.push(self.min.1);
            out.push(self.max.1);
        } else {
            out.push(self.max.1);
            out.push(self.min.1);
        }
    }
}

/// Decimate points sorted along `dimension` into a min/max envelope with one
/// bucket per pixel.
///
/// `descending` tells whether the points run from high to low values of
/// `dimension`. Output preserves the input order.
pub(crate) fn decimate_minmax<'a>(
    points: &[Point],
    dimension: Dimension,
    descending: bool,
    range: Range,
    pixels: usize,
    scratch: &'a mut DecimationScratch,
) -> &'a [Point] {
    scratch.points.clear();
    if points.is_empty() || pixels == 0 {
        return scratch.output();
    }
    let span = range.span();
    if span <= 0.0 {
        scratch.points.extend_from_slice(points);
        return scratch.output();
    }

    if scratch.buckets.len() < pixels {
        scratch.buckets.resize(pixels, Bucket::default());
    }
    for bucket in scratch.buckets.iter_mut().take(pixels) {
        bucket.reset();
    }

    let value = dimension.other();
    let width = pixels as f64;
    for (index, point) in points.iter().enumerate() {
        let t = (point.coordinate(dimension) - range.min) / span;
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let mut slot = ((t * width) as usize).min(pixels - 1);
        if descending {
            slot = pixels - 1 - slot;
        }
        scratch.buckets[slot].push(index, *point, value);
    }

    for bucket in scratch.buckets.iter().take(pixels) {
        bucket.push_ordered(&mut scratch.points);
    }

    scratch.output()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimate_preserves_extremes() {
        let points = [
            Point::new(0.0, 1.0),
            Point::new(1.0, 5.0),
            Point::new(2.0, 0.5),
            Point::new(3.0, 3.0),
        ];
        let mut scratch = DecimationScratch::new();
        let out = decimate_minmax(
            &points,
            Dimension::X,
            false,
            Range::new(0.0, 3.0),
            1,
            &mut scratch,
        );
        assert_eq!(out, [Point::new(1.0, 5.0), Point::new(2.0, 0.5)]);
    }

    #[test]
    fn descending_y_keeps_insertion_order() {
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let y = -(i as f64) * 0.5;
                Point::new(if i % 2 == 0 { 1.0 } else { -1.0 }, y)
            })
            .collect();
        let mut scratch = DecimationScratch::new();
        let out = decimate_minmax(
            &points,
            Dimension::Y,
            true,
            Range::new(-19.5, 0.0),
            4,
            &mut scratch,
        );
        assert_eq!(out.len(), 8);
        assert!(out.windows(2).all(|pair| pair[0].y > pair[1].y));
        assert!(out.iter().any(|p| p.x == 1.0));
        assert!(out.iter().any(|p| p.x == -1.0));
    }
}

//! Sample storage for streaming series.
//!
//! The store is an insertion-ordered buffer that evicts from the front. A
//! declared [`DataPattern`] enables binary-search slicing along the pattern
//! dimension for as long as the appended data actually follows it.

mod summary;

pub(crate) use summary::DecimationScratch;

use thiserror::Error;

use crate::geom::{Dimension, Point};
use crate::view::Range;

use summary::decimate_minmax;

/// Relative tolerance used when verifying a regular progressive step.
const STEP_TOLERANCE: f64 = 1e-6;
/// Evicted slots kept before compacting the buffer.
const COMPACT_THRESHOLD: usize = 4096;

/// Declared monotonic trend of incoming samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Each point has a greater or equal X than the previous one.
    ProgressiveX,
    /// Each point has a smaller or equal X than the previous one.
    RegressiveX,
    /// Each point has a greater or equal Y than the previous one.
    ProgressiveY,
    /// Each point has a smaller or equal Y than the previous one.
    RegressiveY,
}

impl PatternKind {
    /// Dimension the pattern applies to.
    pub fn dimension(self) -> Dimension {
        match self {
            Self::ProgressiveX | Self::RegressiveX => Dimension::X,
            Self::ProgressiveY | Self::RegressiveY => Dimension::Y,
        }
    }

    /// Check whether values decrease along the pattern dimension.
    pub fn is_regressive(self) -> bool {
        matches!(self, Self::RegressiveX | Self::RegressiveY)
    }

    fn accepts(self, previous: f64, next: f64) -> bool {
        if self.is_regressive() {
            next <= previous
        } else {
            next >= previous
        }
    }
}

/// Data pattern hint declared when creating a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPattern {
    /// Monotonic trend along one dimension.
    pub pattern: PatternKind,
    /// Consecutive points are spaced by a constant step along the pattern
    /// dimension.
    pub regular_progressive_step: bool,
}

impl DataPattern {
    /// Pattern without a regular step guarantee.
    pub fn new(pattern: PatternKind) -> Self {
        Self {
            pattern,
            regular_progressive_step: false,
        }
    }

    /// Declare a regular step between consecutive points.
    pub fn with_regular_step(mut self) -> Self {
        self.regular_progressive_step = true;
        self
    }
}

/// Errors that can occur when appending data.
///
/// Except for [`AppendError::NonFinite`], the point is still stored; the
/// error reports that the store no longer trusts the declared pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppendError {
    /// The point has a NaN or infinite coordinate and was dropped.
    #[error("point has a non-finite coordinate")]
    NonFinite,
    /// The point breaks the declared monotonic pattern.
    #[error("point breaks the declared data pattern")]
    PatternViolated,
    /// The point breaks the declared regular step.
    #[error("point breaks the declared regular step")]
    IrregularStep,
}

/// Bounds of the stored points on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// X extent.
    pub x: Range,
    /// Y extent.
    pub y: Range,
}

impl Bounds {
    fn from_point(point: Point) -> Self {
        Self {
            x: Range::point(point.x),
            y: Range::point(point.y),
        }
    }

    fn include(&mut self, point: Point) {
        self.x.expand_to_include(point.x);
        self.y.expand_to_include(point.y);
    }

    /// Extent along one dimension.
    pub fn along(&self, dimension: Dimension) -> Range {
        match dimension {
            Dimension::X => self.x,
            Dimension::Y => self.y,
        }
    }
}

/// Insertion-ordered point buffer with front eviction.
#[derive(Debug, Clone)]
pub struct SampleStore {
    points: Vec<Point>,
    head: usize,
    pattern: Option<DataPattern>,
    pattern_holds: bool,
    step: Option<f64>,
    step_holds: bool,
    bounds: Option<Bounds>,
    generation: u64,
    evicted: u64,
}

impl SampleStore {
    /// Create an empty store with an optional pattern hint.
    pub fn new(pattern: Option<DataPattern>) -> Self {
        Self {
            points: Vec::new(),
            head: 0,
            pattern,
            pattern_holds: pattern.is_some(),
            step: None,
            step_holds: pattern.is_some_and(|pattern| pattern.regular_progressive_step),
            bounds: None,
            generation: 0,
            evicted: 0,
        }
    }

    /// Append a point and return its index among the live points.
    pub fn push(&mut self, point: Point) -> Result<usize, AppendError> {
        if !point.is_finite() {
            return Err(AppendError::NonFinite);
        }
        let verdict = self.check_pattern(point);
        self.points.push(point);
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(point),
            None => self.bounds = Some(Bounds::from_point(point)),
        }
        self.generation = self.generation.wrapping_add(1);
        verdict.map(|_| self.len() - 1)
    }

    fn check_pattern(&mut self, point: Point) -> Result<(), AppendError> {
        let Some(pattern) = self.pattern else {
            return Ok(());
        };
        let Some(last) = self.last() else {
            return Ok(());
        };
        let dimension = pattern.pattern.dimension();
        let previous = last.coordinate(dimension);
        let next = point.coordinate(dimension);
        if !pattern.pattern.accepts(previous, next) {
            self.pattern_holds = false;
            self.step_holds = false;
            return Err(AppendError::PatternViolated);
        }
        if !self.step_holds {
            return Ok(());
        }
        let delta = (next - previous).abs();
        match self.step {
            None => {
                self.step = Some(delta);
                Ok(())
            }
            Some(step) => {
                let tolerance = STEP_TOLERANCE * step.max(f64::EPSILON);
                if (delta - step).abs() > tolerance {
                    self.step_holds = false;
                    Err(AppendError::IrregularStep)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Drop up to `count` of the oldest points; returns how many were dropped.
    pub fn evict_front(&mut self, count: usize) -> usize {
        let count = count.min(self.len());
        if count == 0 {
            return 0;
        }
        let stale = self.bounds.map(|bounds| {
            let evicted = &self.points[self.head..self.head + count];
            [Dimension::X, Dimension::Y].map(|dimension| {
                let range = bounds.along(dimension);
                evicted.iter().any(|point| {
                    let value = point.coordinate(dimension);
                    value <= range.min || value >= range.max
                })
            })
        });
        self.head += count;
        self.evicted += count as u64;
        if self.head >= COMPACT_THRESHOLD && self.head * 2 >= self.points.len() {
            self.points.drain(..self.head);
            self.head = 0;
        }
        match (self.bounds, stale) {
            (Some(mut bounds), Some([stale_x, stale_y])) if !self.is_empty() => {
                if stale_x {
                    bounds.x = self.live_extent(Dimension::X);
                }
                if stale_y {
                    bounds.y = self.live_extent(Dimension::Y);
                }
                self.bounds = Some(bounds);
            }
            _ => self.bounds = None,
        }
        self.generation = self.generation.wrapping_add(1);
        count
    }

    /// Extent of the live points along one dimension; the store must not be
    /// empty.
    fn live_extent(&self, dimension: Dimension) -> Range {
        let points = self.points();
        let first = points[0].coordinate(dimension);
        if self.trusted_pattern().map(PatternKind::dimension) == Some(dimension) {
            let last = points[points.len() - 1].coordinate(dimension);
            return Range::new(first, last);
        }
        points[1..]
            .iter()
            .fold(Range::point(first), |mut range, point| {
                range.expand_to_include(point.coordinate(dimension));
                range
            })
    }

    /// Live points, oldest first.
    pub fn points(&self) -> &[Point] {
        &self.points[self.head..]
    }

    /// Access a live point by index.
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points().get(index).copied()
    }

    /// Most recently appended point.
    pub fn last(&self) -> Option<Point> {
        self.points().last().copied()
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.points.len() - self.head
    }

    /// Check if there are no live points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of points evicted since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Bounds of the live points.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Generation counter, bumped on every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Declared pattern.
    pub fn pattern(&self) -> Option<DataPattern> {
        self.pattern
    }

    /// Check whether all appended data followed the declared pattern.
    pub fn pattern_holds(&self) -> bool {
        self.pattern_holds
    }

    /// Check whether all appended data followed the declared regular step.
    pub fn regular_step_holds(&self) -> bool {
        self.step_holds
    }

    /// Pattern that can currently be trusted for searching.
    fn trusted_pattern(&self) -> Option<PatternKind> {
        self.pattern
            .filter(|_| self.pattern_holds)
            .map(|pattern| pattern.pattern)
    }

    /// Index range of live points whose `dimension` coordinate lies in `range`.
    ///
    /// Falls back to the full range when the data cannot be searched.
    pub fn range_by(&self, dimension: Dimension, range: Range) -> std::ops::Range<usize> {
        let points = self.points();
        match self.trusted_pattern() {
            Some(kind) if kind.dimension() == dimension => {
                if kind.is_regressive() {
                    let start = points.partition_point(|p| p.coordinate(dimension) > range.max);
                    let end = points.partition_point(|p| p.coordinate(dimension) >= range.min);
                    start..end.max(start)
                } else {
                    let start = points.partition_point(|p| p.coordinate(dimension) < range.min);
                    let end = points.partition_point(|p| p.coordinate(dimension) <= range.max);
                    start..end.max(start)
                }
            }
            _ => 0..points.len(),
        }
    }

    /// Number of leading points that lie behind `visible` in the pattern
    /// direction (scrolled out of view).
    ///
    /// Returns 0 when the pattern is absent or no longer holds.
    pub fn outscrolled_prefix(&self, visible: Range) -> usize {
        let Some(kind) = self.trusted_pattern() else {
            return 0;
        };
        let dimension = kind.dimension();
        let points = self.points();
        if kind.is_regressive() {
            points.partition_point(|p| p.coordinate(dimension) > visible.max)
        } else {
            points.partition_point(|p| p.coordinate(dimension) < visible.min)
        }
    }

    /// Index of the live point whose `dimension` coordinate is nearest `value`.
    pub fn nearest_index(&self, dimension: Dimension, value: f64) -> Option<usize> {
        let points = self.points();
        if points.is_empty() || !value.is_finite() {
            return None;
        }
        let kind = match self.trusted_pattern() {
            Some(kind) if kind.dimension() == dimension => kind,
            _ => return nearest_linear(points, |p| (p.coordinate(dimension) - value).abs()),
        };
        let split = if kind.is_regressive() {
            points.partition_point(|p| p.coordinate(dimension) > value)
        } else {
            points.partition_point(|p| p.coordinate(dimension) < value)
        };
        if split == 0 {
            return Some(0);
        }
        if split >= points.len() {
            return Some(points.len() - 1);
        }
        let before = (points[split - 1].coordinate(dimension) - value).abs();
        let after = (points[split].coordinate(dimension) - value).abs();
        if before <= after {
            Some(split - 1)
        } else {
            Some(split)
        }
    }

    /// Index of the live point nearest `target` using per-axis scale factors
    /// (for example pixels per data unit).
    pub fn nearest_index_scaled(&self, target: Point, scale_x: f64, scale_y: f64) -> Option<usize> {
        nearest_linear(self.points(), |p| {
            let dx = (p.x - target.x) * scale_x;
            let dy = (p.y - target.y) * scale_y;
            dx * dx + dy * dy
        })
    }

    /// Reduce the points visible in `range` along the pattern dimension to at
    /// most two points per pixel.
    pub(crate) fn decimate<'a>(
        &'a self,
        range: Range,
        pixels: usize,
        scratch: &'a mut DecimationScratch,
    ) -> &'a [Point] {
        scratch.clear();
        if pixels == 0 || self.is_empty() {
            return scratch.output();
        }
        let Some(kind) = self.trusted_pattern() else {
            scratch.output_mut().extend_from_slice(self.points());
            return scratch.output();
        };
        let dimension = kind.dimension();
        let slice = &self.points()[self.range_by(dimension, range)];
        if slice.len() <= pixels.saturating_mul(2) {
            scratch.output_mut().extend_from_slice(slice);
            return scratch.output();
        }
        decimate_minmax(slice, dimension, kind.is_regressive(), range, pixels, scratch)
    }
}

fn nearest_linear(points: &[Point], distance: impl Fn(&Point) -> f64) -> Option<usize> {
    let mut best_index = None;
    let mut best_distance = f64::INFINITY;
    for (index, point) in points.iter().enumerate() {
        let d = distance(point);
        if d < best_distance {
            best_distance = d;
            best_index = Some(index);
        }
    }
    best_index
}

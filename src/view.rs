//! Numeric data ranges.

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Degenerate range covering a single value.
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether the value lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Expand the range to include a value.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Union two ranges if both are finite.
    pub fn union(a: Self, b: Self) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        Some(Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_bounds() {
        let range = Range::new(3.0, -1.0);
        assert_eq!(range.min, -1.0);
        assert_eq!(range.max, 3.0);
        assert_eq!(range.span(), 4.0);
    }

    #[test]
    fn expand_ignores_non_finite() {
        let mut range = Range::point(1.0);
        range.expand_to_include(f64::NAN);
        range.expand_to_include(-2.0);
        assert_eq!(range, Range::new(-2.0, 1.0));
    }

    #[test]
    fn union_rejects_infinite() {
        let a = Range::new(0.0, 1.0);
        let b = Range::new(f64::NEG_INFINITY, 1.0);
        assert!(Range::union(a, b).is_none());
        assert_eq!(Range::union(a, Range::new(2.0, 3.0)), Some(Range::new(0.0, 3.0)));
    }
}

//! Axes: visible intervals, scroll strategies, and tick formatting.
//!
//! An axis owns the interval that is visible along one dimension of a chart.
//! Every value appended to a series bound to the axis is reported through
//! [`Axis::observe`], which re-applies the axis [`ScrollStrategy`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DashboardError;
use crate::geom::Dimension;
use crate::view::Range;

static AXIS_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

const DEFAULT_INTERVAL_END: f64 = 10.0;
const FIT_MIN_SPAN: f64 = 1.0;
const MAX_LABEL_DECIMALS: usize = 12;

/// Unique identifier for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisId(u64);

impl AxisId {
    fn next() -> Self {
        Self(AXIS_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Side of the chart an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    /// Left for Y axes, bottom for X axes.
    Default,
    /// Right for Y axes, top for X axes.
    Opposite,
}

/// Visible interval of an axis.
///
/// `start` is drawn at the bottom (Y) or left (X) edge. An interval with
/// `start > end` is a reversed axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisInterval {
    /// Value at the bottom/left edge.
    pub start: f64,
    /// Value at the top/right edge.
    pub end: f64,
    /// Stop automatic scrolling once this interval is applied.
    pub stop_axis_after: bool,
}

impl AxisInterval {
    /// Create an interval that keeps the axis scrolling.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            stop_axis_after: false,
        }
    }

    /// Set whether applying the interval stops automatic scrolling.
    pub fn stop_axis_after(mut self, stop: bool) -> Self {
        self.stop_axis_after = stop;
        self
    }

    /// Smaller of the two bounds.
    pub fn low(&self) -> f64 {
        self.start.min(self.end)
    }

    /// Larger of the two bounds.
    pub fn high(&self) -> f64 {
        self.start.max(self.end)
    }

    /// Absolute span of the interval.
    pub fn span(&self) -> f64 {
        (self.end - self.start).abs()
    }

    /// Check whether the axis is drawn reversed.
    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    /// Bounds as a normalized range.
    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }

    /// Check whether both bounds are finite and distinct.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start != self.end
    }

    /// Interval moved by `delta` with the same span and orientation.
    pub fn shifted(&self, delta: f64) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
            ..*self
        }
    }

    /// Interval with new low/high bounds and the same orientation.
    pub fn with_bounds(&self, low: f64, high: f64) -> Self {
        let (start, end) = if self.is_reversed() {
            (high, low)
        } else {
            (low, high)
        };
        Self { start, end, ..*self }
    }
}

/// Policy that moves an axis interval as new data arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollStrategy {
    /// Never move automatically.
    None,
    /// Keep the maximum seen value at the high edge, preserving the span.
    Progressive,
    /// Keep the minimum seen value at the low edge, preserving the span.
    Regressive,
    /// Follow data leaving the interval on either side, preserving the span.
    Scrolling,
    /// Grow the interval to include all data, never shrink.
    Expansion,
    /// Match the current data extent.
    #[default]
    Fitting,
}

/// Data extent seen by an axis, passed to default-interval callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisDataState {
    /// Minimum data value, if any data is bound.
    pub data_min: Option<f64>,
    /// Maximum data value, if any data is bound.
    pub data_max: Option<f64>,
}

impl AxisDataState {
    fn include(&mut self, value: f64) {
        self.data_min = Some(self.data_min.map_or(value, |min| min.min(value)));
        self.data_max = Some(self.data_max.map_or(value, |max| max.max(value)));
    }

    fn extent(&self) -> Option<(f64, f64)> {
        Some((self.data_min?, self.data_max?))
    }
}

/// Callback computing the interval an axis returns to when released.
pub type DefaultInterval = Arc<dyn Fn(&AxisDataState) -> AxisInterval + Send + Sync>;

/// Formatter for axis tick labels and cursor readouts.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Numeric formatter with precision derived from the tick step.
    #[default]
    Default,
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Format a value; `step` is the resolution the label must distinguish.
    pub fn format(&self, value: f64, step: f64) -> String {
        match self {
            Self::Default => {
                let decimals = decimals_for_step(step);
                let value = if value.abs() < step.abs() * 1e-9 {
                    0.0
                } else {
                    value
                };
                format!("{value:.decimals$}")
            }
            Self::Custom(formatter) => formatter(value),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "AxisFormatter::Default"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

/// A chart axis.
#[derive(Clone)]
pub struct Axis {
    id: AxisId,
    dimension: Dimension,
    position: AxisPosition,
    title: Option<String>,
    interval: AxisInterval,
    home: AxisInterval,
    strategy: ScrollStrategy,
    default_interval: Option<DefaultInterval>,
    data: AxisDataState,
    stopped: bool,
    formatter: AxisFormatter,
}

impl Axis {
    /// Create an axis with a fitting strategy and a `[0, 10]` interval.
    pub(crate) fn new(dimension: Dimension, position: AxisPosition) -> Self {
        let interval = AxisInterval::new(0.0, DEFAULT_INTERVAL_END);
        Self {
            id: AxisId::next(),
            dimension,
            position,
            title: None,
            interval,
            home: interval,
            strategy: ScrollStrategy::default(),
            default_interval: None,
            data: AxisDataState::default(),
            stopped: false,
            formatter: AxisFormatter::default(),
        }
    }

    /// Access the axis identifier.
    pub fn id(&self) -> AxisId {
        self.id
    }

    /// Dimension the axis measures.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Side of the chart the axis is drawn on.
    pub fn position(&self) -> AxisPosition {
        self.position
    }

    /// Access the axis title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Currently visible interval.
    pub fn interval(&self) -> AxisInterval {
        self.interval
    }

    /// Active scroll strategy.
    pub fn scroll_strategy(&self) -> ScrollStrategy {
        self.strategy
    }

    /// Data extent observed so far.
    pub fn data_state(&self) -> AxisDataState {
        self.data
    }

    /// Check whether automatic scrolling is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Access the label formatter.
    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }

    /// Set the axis title.
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Set the label formatter.
    pub fn set_formatter(&mut self, formatter: AxisFormatter) -> &mut Self {
        self.formatter = formatter;
        self
    }

    /// Apply an explicit interval.
    ///
    /// With `stop_axis_after` set, automatic scrolling halts until
    /// [`Axis::release`] is called.
    pub fn set_interval(&mut self, interval: AxisInterval) -> Result<&mut Self, DashboardError> {
        if !interval.is_valid() {
            return Err(DashboardError::InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }
        self.interval = interval;
        self.home = interval;
        self.stopped = interval.stop_axis_after;
        self.catch_up();
        Ok(self)
    }

    /// Install a callback computing the interval used when data first
    /// arrives and whenever the axis is released.
    pub fn set_default_interval(
        &mut self,
        callback: impl Fn(&AxisDataState) -> AxisInterval + Send + Sync + 'static,
    ) -> &mut Self {
        self.default_interval = Some(Arc::new(callback));
        if self.data.extent().is_some() {
            self.apply_default_interval();
        }
        self
    }

    /// Select the scroll strategy.
    pub fn set_scroll_strategy(&mut self, strategy: ScrollStrategy) -> &mut Self {
        self.strategy = strategy;
        self.catch_up();
        self
    }

    /// Record an appended data value and scroll accordingly.
    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let first = self.data.extent().is_none();
        self.data.include(value);
        if first && self.default_interval.is_some() && !self.stopped {
            self.apply_default_interval();
        }
        self.catch_up();
    }

    /// Replace the data extent, for example after old data was cleaned.
    pub(crate) fn set_data_extent(&mut self, extent: Option<Range>) {
        self.data = match extent {
            Some(range) => AxisDataState {
                data_min: Some(range.min),
                data_max: Some(range.max),
            },
            None => AxisDataState::default(),
        };
        self.catch_up();
    }

    /// Move the interval by a data delta and stop scrolling.
    pub fn pan_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.interval = self.interval.shifted(delta);
        self.stopped = true;
    }

    /// Scale the interval around `center` and stop scrolling.
    ///
    /// Factors below 1.0 zoom in.
    pub fn zoom_around(&mut self, center: f64, factor: f64) {
        if !center.is_finite() || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let next = AxisInterval {
            start: center + (self.interval.start - center) * factor,
            end: center + (self.interval.end - center) * factor,
            ..self.interval
        };
        if next.is_valid() {
            self.interval = next;
            self.stopped = true;
        }
    }

    /// Resume automatic scrolling from the default interval.
    pub fn release(&mut self) {
        self.stopped = false;
        self.interval = self.home;
        if self.data.extent().is_some() {
            self.apply_default_interval();
        }
        self.catch_up();
    }

    fn apply_default_interval(&mut self) {
        let Some(callback) = self.default_interval.as_ref() else {
            return;
        };
        let next = callback(&self.data);
        if next.is_valid() {
            self.interval = next;
        }
    }

    fn catch_up(&mut self) {
        if self.stopped {
            return;
        }
        let Some((min, max)) = self.data.extent() else {
            return;
        };
        let interval = self.interval;
        self.interval = match self.strategy {
            ScrollStrategy::None => interval,
            ScrollStrategy::Progressive => follow_high(interval, max),
            ScrollStrategy::Regressive => follow_low(interval, min),
            ScrollStrategy::Scrolling => follow_low(follow_high(interval, max), min),
            ScrollStrategy::Expansion => {
                interval.with_bounds(interval.low().min(min), interval.high().max(max))
            }
            ScrollStrategy::Fitting => {
                if max > min {
                    interval.with_bounds(min, max)
                } else {
                    interval.with_bounds(min - FIT_MIN_SPAN * 0.5, max + FIT_MIN_SPAN * 0.5)
                }
            }
        };
    }
}

impl std::fmt::Debug for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Axis")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("position", &self.position)
            .field("interval", &self.interval)
            .field("strategy", &self.strategy)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

fn follow_high(interval: AxisInterval, max: f64) -> AxisInterval {
    let high = interval.high();
    if max > high {
        interval.shifted(max - high)
    } else {
        interval
    }
}

fn follow_low(interval: AxisInterval, min: f64) -> AxisInterval {
    let low = interval.low();
    if min < low {
        interval.shifted(min - low)
    } else {
        interval
    }
}

/// Text measurement used to size axis label areas.
pub trait TextMeasurer {
    /// Measure text and return `(width, height)` in pixels.
    fn measure(&self, text: &str, size: f32) -> (f32, f32);
}

/// A labelled tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Tick value in data coordinates.
    pub value: f64,
    /// Formatted label.
    pub label: String,
}

/// Compute ticks for an axis drawn across `pixels` pixels.
///
/// `spacing_px` is the desired distance between neighbouring ticks.
pub fn compute_ticks(axis: &Axis, pixels: f32, spacing_px: f32) -> Vec<Tick> {
    let interval = axis.interval();
    if !interval.is_valid() || pixels <= 0.0 {
        return Vec::new();
    }
    let count = (pixels / spacing_px.max(1.0)).floor().max(1.0) as f64;
    let step = nice_step(interval.span() / count);
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let low = interval.low();
    let high = interval.high();
    let first = (low / step).ceil() as i64;
    let last = (high / step).floor() as i64;
    (first..=last)
        .map(|index| {
            let value = index as f64 * step;
            Tick {
                value,
                label: axis.formatter().format(value, step),
            }
        })
        .collect()
}

/// Round a raw step to 1, 2 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let exponent = raw.log10().floor();
    let magnitude = 10_f64.powf(exponent);
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 2;
    }
    let decimals = -step.log10().floor();
    if decimals <= 0.0 {
        0
    } else {
        (decimals as usize).min(MAX_LABEL_DECIMALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn y_axis() -> Axis {
        Axis::new(Dimension::Y, AxisPosition::Default)
    }

    #[test]
    fn progressive_keeps_span_and_tracks_max() {
        let mut axis = y_axis();
        axis.set_interval(AxisInterval::new(0.0, 10.0))
            .unwrap()
            .set_scroll_strategy(ScrollStrategy::Progressive);
        for value in [1.0, 5.0, 12.0, 11.0, 15.5] {
            axis.observe(value);
        }
        let interval = axis.interval();
        assert_eq!(interval.high(), 15.5);
        assert!((interval.span() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn regressive_on_reversed_interval_keeps_orientation() {
        let mut axis = y_axis();
        axis.set_interval(AxisInterval::new(20.0, 0.0))
            .unwrap()
            .set_scroll_strategy(ScrollStrategy::Regressive);
        axis.observe(0.0);
        axis.observe(-3.0);
        let interval = axis.interval();
        assert!(interval.is_reversed());
        assert_eq!(interval.low(), -3.0);
        assert_eq!(interval.high(), 17.0);
    }

    #[test]
    fn regressive_ignores_values_above_low_edge() {
        let mut axis = y_axis();
        axis.set_interval(AxisInterval::new(0.0, 10.0))
            .unwrap()
            .set_scroll_strategy(ScrollStrategy::Regressive);
        axis.observe(25.0);
        assert_eq!(axis.interval(), AxisInterval::new(0.0, 10.0));
    }

    #[test]
    fn stop_axis_after_halts_scrolling_until_release() {
        let mut axis = y_axis();
        axis.set_scroll_strategy(ScrollStrategy::Progressive);
        axis.set_interval(AxisInterval::new(0.0, 10.0).stop_axis_after(true))
            .unwrap();
        axis.observe(50.0);
        assert!(axis.is_stopped());
        assert_eq!(axis.interval().high(), 10.0);

        axis.release();
        assert!(!axis.is_stopped());
        assert_eq!(axis.interval().high(), 50.0);
    }

    #[test]
    fn default_interval_applies_on_first_data_and_release() {
        let mut axis = y_axis();
        axis.set_scroll_strategy(ScrollStrategy::Progressive)
            .set_default_interval(|state| {
                let end = state.data_max.unwrap_or(0.0);
                AxisInterval::new(end - 100.0, end)
            });
        axis.observe(3.0);
        assert_eq!(axis.interval(), AxisInterval::new(-97.0, 3.0));

        axis.observe(8.0);
        axis.pan_by(-40.0);
        assert!(axis.is_stopped());
        axis.release();
        assert_eq!(axis.interval(), AxisInterval::new(-92.0, 8.0));
    }

    #[test]
    fn fitting_tracks_extent_and_pads_single_value() {
        let mut axis = y_axis();
        axis.observe(2.0);
        assert_eq!(axis.interval().range(), Range::new(1.5, 2.5));
        axis.observe(-1.0);
        assert_eq!(axis.interval().range(), Range::new(-1.0, 2.0));
        axis.set_data_extent(Some(Range::new(0.0, 1.0)));
        assert_eq!(axis.interval().range(), Range::new(0.0, 1.0));
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let mut axis = y_axis();
        let result = axis.set_interval(AxisInterval::new(1.0, 1.0)).map(|_| ());
        assert_eq!(
            result,
            Err(DashboardError::InvalidInterval {
                start: 1.0,
                end: 1.0
            })
        );
    }

    #[test]
    fn zoom_stops_and_scales_interval() {
        let mut axis = y_axis();
        axis.set_scroll_strategy(ScrollStrategy::None);
        axis.zoom_around(5.0, 0.5);
        assert_eq!(axis.interval().range(), Range::new(2.5, 7.5));
        assert!(axis.is_stopped());
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(13.0), 20.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert!((nice_step(0.012) - 0.02).abs() < 1e-15);
    }

    #[test]
    fn ticks_cover_interval_with_formatted_labels() {
        let mut axis = y_axis();
        axis.set_scroll_strategy(ScrollStrategy::None);
        axis.set_interval(AxisInterval::new(0.0, 1.0)).unwrap();
        let ticks = compute_ticks(&axis, 500.0, 100.0);
        let labels: Vec<&str> = ticks.iter().map(|tick| tick.label.as_str()).collect();
        assert_eq!(labels, ["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);
    }
}

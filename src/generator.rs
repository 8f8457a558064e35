//! Progressive function sampling and timed batch streaming.
//!
//! A [`ProgressiveFunctionGenerator`] samples a one-dimensional function at
//! evenly spaced X values. The generated data is replayed as a [`DataStream`]
//! that hands out fixed-size batches, optionally forever.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::GeneratorError;
use crate::geom::Point;

const DEFAULT_END: f64 = 100.0;
const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);
/// Slack allowed when deciding whether the last sample still lies on `end`.
const END_EPSILON: f64 = 1e-9;

/// Function sampled by the generator.
pub type SamplingFunction = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Samples `y = f(x)` for `x = start, start + step, ..` while `x <= end`.
#[derive(Clone)]
pub struct ProgressiveFunctionGenerator {
    sampling: SamplingFunction,
    start: f64,
    end: f64,
    step: f64,
}

impl Default for ProgressiveFunctionGenerator {
    fn default() -> Self {
        Self {
            sampling: Arc::new(|x| x),
            start: 0.0,
            end: DEFAULT_END,
            step: 1.0,
        }
    }
}

impl std::fmt::Debug for ProgressiveFunctionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressiveFunctionGenerator")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl ProgressiveFunctionGenerator {
    /// Identity function over `[0, 100]` with step 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampled function.
    pub fn set_sampling_function(
        mut self,
        function: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.sampling = Arc::new(function);
        self
    }

    /// Set the first sampled X value.
    pub fn set_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    /// Set the last X value that may be sampled.
    pub fn set_end(mut self, end: f64) -> Self {
        self.end = end;
        self
    }

    /// Set the X distance between samples.
    pub fn set_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Sample the function.
    pub fn generate(&self) -> Result<GeneratedData, GeneratorError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(GeneratorError::InvalidStep(self.step));
        }
        if !self.start.is_finite() || !self.end.is_finite() || self.end < self.start {
            return Err(GeneratorError::InvalidDomain {
                start: self.start,
                end: self.end,
            });
        }
        let count = ((self.end - self.start) / self.step + END_EPSILON).floor() as usize + 1;
        let points: Vec<Point> = (0..count)
            .map(|i| {
                let x = self.start + i as f64 * self.step;
                Point::new(x, (self.sampling)(x))
            })
            .collect();
        Ok(GeneratedData {
            points: points.into(),
            step: self.step,
            batch_size: DEFAULT_BATCH_SIZE,
            interval: DEFAULT_INTERVAL,
            repeat: false,
        })
    }
}

/// Sampled data plus stream settings.
#[derive(Debug, Clone)]
pub struct GeneratedData {
    points: Arc<[Point]>,
    step: f64,
    batch_size: usize,
    interval: Duration,
    repeat: bool,
}

impl GeneratedData {
    /// Sampled points of one pass.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of sampled points in one pass.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether no point was sampled.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points per streamed batch.
    pub fn set_stream_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Delay between streamed batches in milliseconds.
    pub fn set_stream_interval(mut self, millis: u64) -> Self {
        self.interval = Duration::from_millis(millis);
        self
    }

    /// Restart from the beginning after the last batch.
    pub fn set_stream_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Build the stream.
    pub fn to_stream(self) -> Result<DataStream, GeneratorError> {
        if self.batch_size == 0 {
            return Err(GeneratorError::InvalidBatchSize);
        }
        let pass_offset = self.points.len() as f64 * self.step;
        Ok(DataStream {
            points: self.points,
            pass_offset,
            batch_size: self.batch_size,
            interval: self.interval,
            repeat: self.repeat,
        })
    }
}

/// Replayable stream of generated batches.
///
/// Each repeated pass continues X where the previous pass ended, so data that
/// was progressive along X stays progressive.
#[derive(Debug, Clone)]
pub struct DataStream {
    points: Arc<[Point]>,
    pass_offset: f64,
    batch_size: usize,
    interval: Duration,
    repeat: bool,
}

impl DataStream {
    /// Points per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Delay between batches.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check whether the stream repeats forever.
    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Iterate the batches from the beginning without waiting.
    ///
    /// The iterator is infinite when the stream repeats.
    pub fn batches(&self) -> Batches {
        Batches {
            points: Arc::clone(&self.points),
            pass_offset: self.pass_offset,
            batch_size: self.batch_size,
            repeat: self.repeat,
            pass: 0,
            index: 0,
        }
    }

    /// Deliver every point to `callback` on a background thread, one batch per
    /// interval.
    pub fn for_each(&self, mut callback: impl FnMut(Point) + Send + 'static) -> StreamHandle {
        self.for_each_batch(move |batch| batch.iter().copied().for_each(&mut callback))
    }

    /// Deliver whole batches to `callback` on a background thread, one batch
    /// per interval.
    pub fn for_each_batch(
        &self,
        mut callback: impl FnMut(&[Point]) + Send + 'static,
    ) -> StreamHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&cancel);
        let batches = self.batches();
        let interval = self.interval;
        tracing::info!(
            points = self.points.len(),
            batch_size = self.batch_size,
            interval_ms = interval.as_millis() as u64,
            repeat = self.repeat,
            "stream started"
        );
        let thread = std::thread::spawn(move || {
            for batch in batches {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                callback(&batch);
                sleep_unless_stopped(interval, &stop);
            }
            tracing::debug!("stream finished");
        });
        StreamHandle {
            cancel,
            thread: Some(thread),
        }
    }
}

/// Park until `interval` has elapsed or `stop` is set; parking may wake early.
fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::park_timeout(deadline - now);
    }
}

/// Iterator over stream batches.
#[derive(Debug, Clone)]
pub struct Batches {
    points: Arc<[Point]>,
    pass_offset: f64,
    batch_size: usize,
    repeat: bool,
    pass: u64,
    index: usize,
}

impl Iterator for Batches {
    type Item = Vec<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            if self.index >= self.points.len() {
                if !self.repeat || self.points.is_empty() {
                    break;
                }
                self.pass += 1;
                self.index = 0;
            }
            let point = self.points[self.index];
            let offset = self.pass as f64 * self.pass_offset;
            batch.push(Point::new(point.x + offset, point.y));
            self.index += 1;
        }
        (!batch.is_empty()).then_some(batch)
    }
}

/// Control over a running stream thread.
///
/// Dropping the handle stops the stream.
#[derive(Debug)]
pub struct StreamHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// Ask the stream to stop after the current batch.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(thread) = self.thread.as_ref() {
            thread.thread().unpark();
        }
    }

    /// Check whether the stream thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the stream thread to exit.
    pub fn join(mut self) -> std::thread::Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn generate_includes_end() {
        let data = ProgressiveFunctionGenerator::new()
            .set_end(1.0)
            .set_step(0.25)
            .generate()
            .unwrap();
        let xs: Vec<f64> = data.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, [0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn sin_over_full_turn() {
        let data = ProgressiveFunctionGenerator::new()
            .set_sampling_function(f64::sin)
            .set_end(std::f64::consts::TAU)
            .set_step(0.015)
            .generate()
            .unwrap();
        assert_eq!(data.len(), 419);
        assert!(data.points().iter().all(|p| (p.y - p.x.sin()).abs() < 1e-12));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let step = ProgressiveFunctionGenerator::new().set_step(0.0).generate();
        assert_eq!(step.map(|_| ()), Err(GeneratorError::InvalidStep(0.0)));
        let domain = ProgressiveFunctionGenerator::new()
            .set_start(5.0)
            .set_end(1.0)
            .generate();
        assert_eq!(
            domain.map(|_| ()),
            Err(GeneratorError::InvalidDomain {
                start: 5.0,
                end: 1.0
            })
        );
        let batch = ProgressiveFunctionGenerator::new()
            .generate()
            .unwrap()
            .set_stream_batch_size(0)
            .to_stream();
        assert_eq!(batch.map(|_| ()), Err(GeneratorError::InvalidBatchSize));
    }

    #[test]
    fn finite_stream_ends_with_short_batch() {
        let stream = ProgressiveFunctionGenerator::new()
            .set_end(9.0)
            .generate()
            .unwrap()
            .set_stream_batch_size(4)
            .to_stream()
            .unwrap();
        let sizes: Vec<usize> = stream.batches().map(|batch| batch.len()).collect();
        assert_eq!(sizes, [4, 4, 2]);
        // Restartable.
        assert_eq!(stream.batches().count(), 3);
    }

    #[test]
    fn repeat_continues_x_progressively() {
        let stream = ProgressiveFunctionGenerator::new()
            .set_end(2.0)
            .generate()
            .unwrap()
            .set_stream_batch_size(2)
            .set_stream_repeat(true)
            .to_stream()
            .unwrap();
        let points: Vec<Point> = stream.batches().take(4).flatten().collect();
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        assert_eq!(ys, [0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn for_each_delivers_every_point_and_finishes() {
        let stream = ProgressiveFunctionGenerator::new()
            .set_end(49.0)
            .generate()
            .unwrap()
            .set_stream_batch_size(10)
            .set_stream_interval(1)
            .to_stream()
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = stream.for_each(move |point| sink.lock().unwrap().push(point.x));
        handle.join().unwrap();
        assert_eq!(seen.lock().unwrap().len(), 50);
    }

    #[test]
    fn stop_ends_repeating_stream() {
        let stream = ProgressiveFunctionGenerator::new()
            .generate()
            .unwrap()
            .set_stream_interval(1)
            .set_stream_repeat(true)
            .to_stream()
            .unwrap();
        let handle = stream.for_each_batch(|_| {});
        handle.stop();
        handle.join().unwrap();
    }

    #[test]
    fn batches_are_spaced_by_the_interval() {
        let stream = ProgressiveFunctionGenerator::new()
            .set_end(29.0)
            .generate()
            .unwrap()
            .set_stream_batch_size(10)
            .set_stream_interval(20)
            .to_stream()
            .unwrap();
        let started = Instant::now();
        let handle = stream.for_each_batch(|_| {});
        handle.join().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn unpark_without_stop_keeps_waiting() {
        let stop = AtomicBool::new(false);
        let current = std::thread::current();
        let waker = std::thread::spawn(move || current.unpark());
        let started = Instant::now();
        sleep_unless_stopped(Duration::from_millis(30), &stop);
        waker.join().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}

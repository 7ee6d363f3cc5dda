// src/printer/sampler.rs

//! Implements [`TimelineSampler`], equal-width time buckets of counts.

use crate::common::Count;
use crate::data::datetime::{DateTimeL, TimeInterval};

/// `n` counters splitting `[start, end)` of a [`TimeInterval`] into equal
/// spans.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelineSampler {
    interval: TimeInterval,
    samples: Vec<Count>,
}

impl TimelineSampler {
    pub fn new(interval: TimeInterval, n: usize) -> TimelineSampler {
        TimelineSampler {
            interval,
            samples: vec![0; n],
        }
    }

    pub const fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn samples(&self) -> &[Count] {
        self.samples.as_slice()
    }

    /// Bucket of `dt`, `None` if outside `[start, end)`.
    pub fn bucket(&self, dt: &DateTimeL) -> Option<usize> {
        if self.samples.is_empty() {
            return None;
        }
        let span: i128 = self
            .interval
            .end()
            .signed_duration_since(*self.interval.start())
            .num_nanoseconds()? as i128;
        let pos: i128 = dt
            .signed_duration_since(*self.interval.start())
            .num_nanoseconds()? as i128;
        if pos < 0 || pos >= span {
            return None;
        }

        Some((pos * self.samples.len() as i128 / span) as usize)
    }

    /// Add `increment` to the bucket of `dt`. Ignored if `dt` is outside.
    pub fn inc(&mut self, dt: &DateTimeL, increment: Count) {
        if let Some(at) = self.bucket(dt) {
            self.samples[at] += increment;
        }
    }
}

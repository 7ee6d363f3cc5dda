// src/filter/mod.rs

//! The `filter` module decides which [`LogLine`]s pass through the pipeline.
//!
//! Every filter implements [`Filter`]. The pipeline always runs a
//! [`TimeFilter`] first and then one [`ColumnFilter`] per user expression,
//! each in its own stage.
//!
//! [`LogLine`]: crate::data::logline::LogLine
//! [`ColumnFilter`]: crate::filter::columnfilter::ColumnFilter

use crate::data::datetime::{dt_pass_filters, TimeInterval};
use crate::data::logline::LogLine;

use std::fmt;

pub mod columnfilter;

/// A pure predicate over [`LogLine`]s. Implementations hold only immutable
/// state so one instance may be shared by threads.
pub trait Filter: fmt::Display + Send + Sync {
    fn match_line(&self, logline: &LogLine) -> bool;
}

/// Passes lines whose datetime is within a [`TimeInterval`], inclusive.
/// A line without a datetime never passes.
#[derive(Clone, Copy, Debug)]
pub struct TimeFilter {
    interval: TimeInterval,
}

impl TimeFilter {
    pub fn new(interval: TimeInterval) -> TimeFilter {
        TimeFilter { interval }
    }

    pub const fn interval(&self) -> &TimeInterval {
        &self.interval
    }
}

impl Filter for TimeFilter {
    fn match_line(&self, logline: &LogLine) -> bool {
        match logline.dt() {
            Some(dt) => dt_pass_filters(dt, &self.interval).is_pass(),
            None => false,
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "time {}", self.interval)
    }
}

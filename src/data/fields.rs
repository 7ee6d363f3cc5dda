// src/data/fields.rs

//! Field-range selection: parse `1-3,5` style selectors into
//! [`FieldInterval`]s and project [`Columns`] through them.

use crate::common::ColumnIndex;
use crate::data::logline::Columns;

use std::fmt;

use ::thiserror::Error;

/// A closed, 1-based range of columns. An open end is [`FIELD_END_OPEN`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldInterval {
    start: ColumnIndex,
    end: ColumnIndex,
}

pub type FieldIntervals = Vec<FieldInterval>;

/// `end` of a range like `3-`.
pub const FIELD_END_OPEN: ColumnIndex = ColumnIndex::MAX;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum FieldSpecError {
    #[error("invalid field range {0:?}")]
    Invalid(String),
    #[error("field numbers start at 1, got {0:?}")]
    Zero(String),
    #[error("field range {0:?} ends before it starts")]
    Reversed(String),
}

impl FieldInterval {
    /// `None` if `start` is 0 or `end` is before `start`.
    pub const fn new(start: ColumnIndex, end: ColumnIndex) -> Option<FieldInterval> {
        if start == 0 || end < start {
            return None;
        }

        Some(FieldInterval { start, end })
    }

    /// `1-`
    pub const fn all() -> FieldInterval {
        FieldInterval {
            start: 1,
            end: FIELD_END_OPEN,
        }
    }

    pub const fn start(&self) -> ColumnIndex {
        self.start
    }

    pub const fn end(&self) -> ColumnIndex {
        self.end
    }

    pub const fn contains(&self, index: ColumnIndex) -> bool {
        self.start <= index && index <= self.end
    }
}

impl fmt::Display for FieldInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.start == self.end, self.end == FIELD_END_OPEN) {
            (true, _) => write!(f, "{}", self.start),
            (false, true) => write!(f, "{}-", self.start),
            (false, false) => write!(f, "{}-{}", self.start, self.end),
        }
    }
}

fn parse_index(value: &str, item: &str) -> Result<ColumnIndex, FieldSpecError> {
    let index: ColumnIndex = match value.trim().parse::<ColumnIndex>() {
        Ok(index) => index,
        Err(_) => return Err(FieldSpecError::Invalid(item.to_string())),
    };
    if index == 0 {
        return Err(FieldSpecError::Zero(item.to_string()));
    }

    Ok(index)
}

/// Parse comma-separated items `N`, `N-M`, `N-`, `-M`. An empty `spec`
/// selects all fields.
pub fn parse_field_intervals(spec: &str) -> Result<FieldIntervals, FieldSpecError> {
    if spec.trim().is_empty() {
        return Ok(vec![FieldInterval::all()]);
    }
    let mut intervals = FieldIntervals::new();
    for item in spec.split(',') {
        let item_t = item.trim();
        if item_t.is_empty() {
            return Err(FieldSpecError::Invalid(item.to_string()));
        }
        let (start, end): (ColumnIndex, ColumnIndex) = match item_t.split_once('-') {
            None => {
                let index = parse_index(item_t, item_t)?;
                (index, index)
            }
            Some(("", "")) => return Err(FieldSpecError::Invalid(item_t.to_string())),
            Some(("", end)) => (1, parse_index(end, item_t)?),
            Some((start, "")) => (parse_index(start, item_t)?, FIELD_END_OPEN),
            Some((start, end)) => (parse_index(start, item_t)?, parse_index(end, item_t)?),
        };
        let interval = match FieldInterval::new(start, end) {
            Some(interval) => interval,
            None => return Err(FieldSpecError::Reversed(item_t.to_string())),
        };
        intervals.push(interval);
    }

    Ok(intervals)
}

/// Does `intervals` select every column in its natural order?
pub fn is_select_all(intervals: &[FieldInterval]) -> bool {
    matches!(intervals, [only] if only.start == 1 && only.end == FIELD_END_OPEN)
}

/// Select columns of `columns` in the order given by `intervals`,
/// renumbering them densely from 1. Columns beyond the last are skipped.
pub fn project(columns: Columns, intervals: &[FieldInterval]) -> Columns {
    if is_select_all(intervals) {
        return columns;
    }
    let mut projected = Columns::with_capacity(columns.len());
    for interval in intervals.iter() {
        let last: ColumnIndex = std::cmp::min(interval.end, columns.len());
        for index in interval.start..=last {
            projected.push(columns[index - 1].clone());
        }
    }

    projected
}

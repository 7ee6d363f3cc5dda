// src/printer/counter.rs

//! Implements [`LogLineCounter`], the frequency table behind `uniq`.

use crate::common::Count;
use crate::data::logline::{Columns, LogLine};

use std::collections::HashMap;

/// One distinct column content and how many times it was seen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UniqueLineCount {
    pub columns: Columns,
    pub count: Count,
}

/// Counts [`LogLine`]s by their column content ([`LogLine::key`]).
///
/// Unique lines are remembered in first-seen order.
#[derive(Debug, Default)]
pub struct LogLineCounter {
    /// key to index into `counts`
    index: HashMap<String, usize>,
    counts: Vec<UniqueLineCount>,
    total: Count,
}

impl LogLineCounter {
    pub fn new() -> LogLineCounter {
        LogLineCounter::default()
    }

    pub fn add(&mut self, logline: LogLine) {
        self.total += 1;
        let key: String = logline.key();
        match self.index.get(&key) {
            Some(at) => self.counts[*at].count += 1,
            None => {
                self.index.insert(key, self.counts.len());
                self.counts.push(UniqueLineCount {
                    columns: logline.into_columns(),
                    count: 1,
                });
            }
        }
    }

    /// Count of distinct column contents.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count of all lines added.
    pub const fn total(&self) -> Count {
        self.total
    }

    /// The highest count, `0` if empty.
    pub fn max(&self) -> Count {
        self.counts.iter().map(|c| c.count).max().unwrap_or(0)
    }

    /// Unique lines by descending count. Equal counts keep first-seen order.
    pub fn unique_lines(&self) -> Vec<&UniqueLineCount> {
        let mut lines: Vec<&UniqueLineCount> = self.counts.iter().collect();
        // stable
        lines.sort_by(|a, b| b.count.cmp(&a.count));

        lines
    }
}

// src/data/logline.rs

//! Implements a [`LogLine`], one unit of input flowing through the pipeline:
//! the raw line, its datetime (once recognized), and its [`Columns`] (once
//! tokenized).

use crate::common::ColumnIndex;
use crate::data::datetime::{DateTimeL, DateTimeLOpt};
use crate::debug::printers::str_to_String_noraw;

use std::fmt;

/// Ordered column values of a [`LogLine`]. Column `n` (1-based) is stored at
/// `columns[n - 1]`.
pub type Columns = Vec<String>;

/// Terminates each column value in a [`LogLine::key`].
pub const KEY_SEPARATOR: char = '\0';

/// A single log line and what the pipeline has learned about it.
///
/// Owned by exactly one pipeline stage at a time; passing a `LogLine` to the
/// next stage moves it.
#[derive(Clone, Default, PartialEq)]
pub struct LogLine {
    line: String,
    dt: DateTimeLOpt,
    columns: Columns,
}

impl fmt::Debug for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LogLine")
            .field("line", &str_to_String_noraw(&self.line))
            .field("dt", &self.dt)
            .field("columns", &self.columns)
            .finish()
    }
}

impl LogLine {
    /// Create a `LogLine` with no datetime and no columns.
    pub fn new(line: String) -> LogLine {
        LogLine {
            line,
            dt: None,
            columns: Columns::new(),
        }
    }

    pub fn new_with(line: String, dt: DateTimeLOpt, columns: Columns) -> LogLine {
        LogLine { line, dt, columns }
    }

    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub const fn dt(&self) -> &DateTimeLOpt {
        &self.dt
    }

    pub fn set_dt(&mut self, dt: DateTimeLOpt) {
        self.dt = dt;
    }

    /// Does this `LogLine` have a datetime at or before `dt`?
    pub fn dt_le(&self, dt: &DateTimeL) -> bool {
        match &self.dt {
            Some(dt_self) => dt_self <= dt,
            None => false,
        }
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn set_columns(&mut self, columns: Columns) {
        self.columns = columns;
    }

    pub fn count_columns(&self) -> usize {
        self.columns.len()
    }

    /// Value of 1-based column `index`. Out of range (including `0`) is `""`.
    pub fn column(&self, index: ColumnIndex) -> &str {
        if index == 0 {
            return "";
        }
        match self.columns.get(index - 1) {
            Some(value) => value.as_str(),
            None => "",
        }
    }

    /// Column values joined by one space.
    pub fn columns_joined(&self) -> String {
        self.columns.join(" ")
    }

    /// Identity of the column content: each value followed by
    /// [`KEY_SEPARATOR`].
    pub fn key(&self) -> String {
        let mut key = String::with_capacity(self.columns.iter().map(|c| c.len() + 1).sum());
        for column in self.columns.iter() {
            key.push_str(column);
            key.push(KEY_SEPARATOR);
        }

        key
    }

    /// Remove and return the column values, leaving none.
    pub fn take_columns(&mut self) -> Columns {
        std::mem::take(&mut self.columns)
    }

    /// Consume and return the column values.
    pub fn into_columns(self) -> Columns {
        self.columns
    }
}

// src/tests/common.rs

//! Common data and helpers shared by tests.

#![allow(non_upper_case_globals)]
#![allow(dead_code)]

use crate::data::datetime::{
    ymdhms,
    DateRecognizer,
    DateTimeL,
    Duration,
    FixedOffset,
    TimeInterval,
};
use crate::data::logline::{Columns, LogLine};

use std::io::{Result, Write};
use std::sync::{Arc, Mutex};

use ::lazy_static::lazy_static;
use ::termcolor::WriteColor;

lazy_static! {
    pub static ref FO_0: FixedOffset = FixedOffset::east_opt(0).unwrap();
    pub static ref FO_P1: FixedOffset = FixedOffset::east_opt(3600).unwrap();
    pub static ref FO_M8: FixedOffset = FixedOffset::west_opt(3600 * 8).unwrap();

    /// "now" for tests that resolve relative times: 2016-11-03 13:05:12.000001234 UTC
    pub static ref NOW_2016: DateTimeL = ymdhms(&FO_0, 2016, 11, 3, 13, 5, 12).unwrap()
        + Duration::nanoseconds(1_234);

    /// "now" for tests of year-less datetimes: 2017-01-10 12:00:00 UTC
    pub static ref NOW_2017: DateTimeL = ymdhms(&FO_0, 2017, 1, 10, 12, 0, 0).unwrap();
}

/// Shorthand for a UTC datetime.
pub fn dt_utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTimeL {
    ymdhms(&FO_0, year, month, day, hour, min, sec).unwrap()
}

/// A recognizer in UTC with "now" at [`NOW_2016`].
pub fn recognizer_utc() -> DateRecognizer {
    DateRecognizer::new(*FO_0, *NOW_2016)
}

/// A recognizer in UTC with the passed "now".
pub fn recognizer_utc_now(now: DateTimeL) -> DateRecognizer {
    DateRecognizer::new(*FO_0, now)
}

/// An interval between two UTC datetimes on 2016-12-05.
pub fn interval_hms(start: (u32, u32, u32), end: (u32, u32, u32)) -> TimeInterval {
    TimeInterval::new(
        dt_utc(2016, 12, 5, start.0, start.1, start.2),
        dt_utc(2016, 12, 5, end.0, end.1, end.2),
    )
}

/// A `LogLine` holding `columns` and no datetime.
pub fn logline_columns(columns: &[&str]) -> LogLine {
    let columns: Columns = columns.iter().map(|c| c.to_string()).collect();

    LogLine::new_with(columns.join(" "), None, columns)
}

/// A thread-safe `Write` capturing output for later inspection. Clones
/// share the buffer.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> SharedBuffer {
        SharedBuffer::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Without color support, like output to a pipe.
impl WriteColor for SharedBuffer {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, _spec: &::termcolor::ColorSpec) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

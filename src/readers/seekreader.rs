// src/readers/seekreader.rs

//! Implements [`TimeSeekReader`], a [`Read`] adapter that fast-forwards a
//! byte stream to a [`TimeInterval`] and ends it after the interval.
//!
//! The wrapped stream is only ever read forward so it may be a pipe or a
//! decompressor.
//!
//! Seeking reads one block at a time. A block is kept if the last
//! datetime-bearing complete line in it is at or after the interval start.
//! Otherwise its complete lines are discarded and its trailing partial line
//! is carried into the next block. At the end of the stream the final line
//! counts as complete even without a newline.
//!
//! While serving bytes, lines are examined once for a datetime after the
//! interval end. Serving stops at the start of the first such line.
//! Input is assumed to be in datetime order; a region whose last datetime is
//! within the interval is served without examining each line.
//!
//! [`Read`]: std::io::Read
//! [`TimeInterval`]: crate::data::datetime::TimeInterval

use crate::common::{Bytes, Count, NLu8};
use crate::data::datetime::{DateRecognizer, DateTimeLOpt, TimeInterval};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::fmt;
use std::io::prelude::Read;
use std::io::{Error, ErrorKind, Result};

use ::memchr::{memchr, memrchr};
#[allow(unused_imports)]
use ::more_asserts::{debug_assert_ge, debug_assert_le};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Block Size in bytes
pub type BlockSz = usize;

/// Default size of one block read while seeking, 1 MiB.
pub const BLOCKSZ_DEF: BlockSz = 1024 * 1024;

/// Minimum block size.
pub const BLOCKSZ_MIN: BlockSz = 1;

/// The datetime of the last line in `region` that has one.
/// `region` must end at a line boundary.
pub(crate) fn last_date(recognizer: &DateRecognizer, region: &[u8]) -> DateTimeLOpt {
    let mut end: usize = region.len();
    while end > 0 {
        let line_end: usize = match region[end - 1] == NLu8 {
            true => end - 1,
            false => end,
        };
        let line_start: usize = match memrchr(NLu8, &region[..line_end]) {
            Some(at) => at + 1,
            None => 0,
        };
        if let Some(dt) = recognizer.parse_date_bytes(&region[line_start..line_end]) {
            return Some(dt);
        }
        end = line_start;
    }

    None
}

/// A [`Read`] that serves only the part of the wrapped stream that covers a
/// [`TimeInterval`].
///
/// Served bytes may still include lines from before the interval start
/// (within the first kept block) and undated lines; later filtering removes
/// those.
///
/// A read error from the wrapped stream is returned once, after all bytes
/// buffered before it were served.
///
/// [`Read`]: std::io::Read
pub struct TimeSeekReader<R: Read> {
    reader: R,
    interval: TimeInterval,
    recognizer: DateRecognizer,
    blocksz: BlockSz,
    /// bytes read from `reader` and not yet served or discarded
    buffer: Bytes,
    /// `buffer[..pos]` has been served
    pos: usize,
    /// `buffer[..checked]` has been examined for datetimes after the interval
    checked: usize,
    start_reached: bool,
    end_reached: bool,
    eof: bool,
    error: Option<Error>,
    bytes_read: Count,
    bytes_skipped: Count,
}

impl<R: Read> fmt::Debug for TimeSeekReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TimeSeekReader")
            .field("interval", &self.interval)
            .field("blocksz", &self.blocksz)
            .field("buffer.len()", &self.buffer.len())
            .field("pos", &self.pos)
            .field("checked", &self.checked)
            .field("start_reached", &self.start_reached)
            .field("end_reached", &self.end_reached)
            .field("eof", &self.eof)
            .field("error", &self.error)
            .finish()
    }
}

impl<R: Read> TimeSeekReader<R> {
    pub fn new(reader: R, interval: TimeInterval, recognizer: DateRecognizer) -> TimeSeekReader<R> {
        TimeSeekReader::new_blocksz(reader, interval, recognizer, BLOCKSZ_DEF)
    }

    /// Create with a block size other than [`BLOCKSZ_DEF`].
    pub fn new_blocksz(
        reader: R,
        interval: TimeInterval,
        recognizer: DateRecognizer,
        blocksz: BlockSz,
    ) -> TimeSeekReader<R> {
        TimeSeekReader {
            reader,
            interval,
            recognizer,
            blocksz: std::cmp::max(blocksz, BLOCKSZ_MIN),
            buffer: Bytes::new(),
            pos: 0,
            checked: 0,
            start_reached: false,
            end_reached: false,
            eof: false,
            error: None,
            bytes_read: 0,
            bytes_skipped: 0,
        }
    }

    /// Bytes read from the wrapped stream so far.
    pub const fn bytes_read(&self) -> Count {
        self.bytes_read
    }

    /// Bytes discarded while seeking the interval start.
    pub const fn bytes_skipped(&self) -> Count {
        self.bytes_skipped
    }

    /// Consume and return the wrapped stream.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Has a datetime after the interval end been found?
    pub const fn end_reached(&self) -> bool {
        self.end_reached
    }

    /// The wrapped stream is exhausted or failed.
    #[inline(always)]
    fn at_end(&self) -> bool {
        self.eof || self.error.is_some()
    }

    /// Append up to one block from the wrapped stream to `buffer`.
    fn fill_block(&mut self) {
        let len_prior: usize = self.buffer.len();
        self.buffer.resize(len_prior + self.blocksz, 0);
        let mut filled: usize = len_prior;
        while filled < self.buffer.len() {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(len) => filled += len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    de_err!("read error {}", err);
                    self.error = Some(err);
                    break;
                }
            }
        }
        self.buffer.truncate(filled);
        self.bytes_read += (filled - len_prior) as Count;
        defo!("read {} bytes, buffer {} bytes, eof {}", filled - len_prior, filled, self.eof);
    }

    /// Offset just past the last complete line in `buffer[from..]`, or `from`
    /// if there is none. At the end of the stream the whole buffer is
    /// complete.
    ///
    /// `buffer[from..scanned]` must hold no newline; only the bytes after
    /// `scanned` are searched so a line spanning many blocks is scanned once.
    fn complete_end(&self, from: usize, scanned: usize) -> usize {
        debug_assert_le!(from, scanned);
        if self.at_end() {
            return self.buffer.len();
        }
        match memrchr(NLu8, &self.buffer[scanned..]) {
            Some(at) => scanned + at + 1,
            None => from,
        }
    }

    /// Discard blocks before the interval start.
    fn seek(&mut self) {
        defn!("start {}", self.interval.start());
        loop {
            // what remains is a partial line
            let scanned: usize = self.buffer.len();
            self.fill_block();
            let complete_end: usize = self.complete_end(0, scanned);
            match last_date(&self.recognizer, &self.buffer[..complete_end]) {
                Some(dt) if &dt >= self.interval.start() => {
                    defo!("block kept, last datetime {}", dt);
                    break;
                }
                _ => {}
            }
            if self.at_end() {
                defo!("stream ended before interval start");
                self.bytes_skipped += self.buffer.len() as Count;
                self.buffer.clear();
                break;
            }
            // keep the trailing partial line
            self.buffer.drain(..complete_end);
            self.bytes_skipped += complete_end as Count;
        }
        self.start_reached = true;
        self.pos = 0;
        self.checked = 0;
        self.check_end(0);
        defx!("skipped {} bytes", self.bytes_skipped);
    }

    /// Advance `checked` over complete lines not after the interval end.
    /// `buffer[checked..scanned]` holds no newline.
    fn check_end(&mut self, scanned: usize) {
        if self.end_reached {
            return;
        }
        let complete_end: usize = self.complete_end(self.checked, scanned);
        if complete_end == self.checked {
            return;
        }
        // usually the whole region is within the interval
        match last_date(&self.recognizer, &self.buffer[self.checked..complete_end]) {
            Some(dt) if &dt > self.interval.end() => {}
            _ => {
                self.checked = complete_end;
                return;
            }
        }
        while self.checked < complete_end {
            let region = &self.buffer[self.checked..complete_end];
            let line_len: usize = match memchr(NLu8, region) {
                Some(at) => at + 1,
                None => region.len(),
            };
            if let Some(dt) = self.recognizer.parse_date_bytes(&region[..line_len]) {
                if &dt > self.interval.end() {
                    defo!("datetime {} after interval end at offset {}", dt, self.checked);
                    self.end_reached = true;
                    return;
                }
            }
            self.checked += line_len;
        }
    }

    /// Drop served bytes from the front of `buffer`.
    fn compact(&mut self) {
        debug_assert_le!(self.pos, self.checked);
        self.buffer.drain(..self.pos);
        self.checked -= self.pos;
        self.pos = 0;
    }
}

impl<R: Read> Read for TimeSeekReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !self.start_reached {
            self.seek();
        }
        loop {
            if self.pos < self.checked {
                let len: usize = std::cmp::min(buf.len(), self.checked - self.pos);
                buf[..len].copy_from_slice(&self.buffer[self.pos..self.pos + len]);
                self.pos += len;
                return Ok(len);
            }
            if self.end_reached {
                return Ok(0);
            }
            if self.at_end() {
                debug_assert_ge!(self.checked, self.buffer.len());
                return match self.error.take() {
                    Some(err) => {
                        // later calls report end of stream
                        self.eof = true;
                        Err(err)
                    }
                    None => Ok(0),
                };
            }
            self.compact();
            // `buffer[checked..]` is a partial line
            let scanned: usize = self.buffer.len();
            self.fill_block();
            self.check_end(scanned);
        }
    }
}

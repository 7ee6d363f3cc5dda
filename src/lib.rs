// src/lib.rs

//! _loganlib_ is the library behind the `logan` log analysis tool.
//!
//! A query names a log category and a time window. The category's files are
//! chained into one byte stream, fast-forwarded to the window by a
//! [`TimeSeekReader`], split into [`LogLine`]s, tagged with datetimes,
//! tokenized into columns, filtered, projected, and finally delivered to one
//! output sink.
//!
//! Each step runs on its own thread connected by bounded channels; see
//! [`pipeline`].
//!
//! [`TimeSeekReader`]: crate::readers::seekreader::TimeSeekReader
//! [`LogLine`]: crate::data::logline::LogLine
//! [`pipeline`]: crate::pipeline

pub mod common;
pub mod config;
pub mod data;
pub mod debug;
pub mod filter;
pub mod pipeline;
pub mod printer;
pub mod readers;
pub mod source;
#[cfg(test)]
pub mod tests;

// src/data/mod.rs

//! The `data` module is specialized data containers and the parsers that
//! build them.
//!
//! ## Definitions of data
//!
//! ### LogLine
//!
//! A "log line" is a sequence of bytes from a log source that:
//!
//! * begins after a prior newline or the beginning of the stream.
//! * ends before a newline `'\n'` or at the end of the stream.
//!
//! A "log line" is represented by a [`LogLine`]. The pipeline adds its
//! datetime (see [`DateRecognizer`]) and its columns (see
//! [`parse_columns`]) as it passes through.
//!
//! ### Time window
//!
//! A [`TimeInterval`] bounds a query, inclusive at both ends. It is usually
//! parsed from a specification like `-1h+5m` by [`parse_time_interval`].
//!
//! ### Field ranges
//!
//! [`FieldInterval`]s select and reorder columns for output.
//!
//! [`LogLine`]: crate::data::logline::LogLine
//! [`DateRecognizer`]: crate::data::datetime::DateRecognizer
//! [`parse_columns`]: crate::readers::columnparser::parse_columns
//! [`TimeInterval`]: crate::data::datetime::TimeInterval
//! [`parse_time_interval`]: crate::data::timespec::parse_time_interval
//! [`FieldInterval`]: crate::data::fields::FieldInterval

pub mod datetime;
pub mod fields;
pub mod logline;
pub mod timespec;

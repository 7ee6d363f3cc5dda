// src/common.rs
//
// common imports, type aliases, and other globals (avoids circular imports)

//! Common type aliases and constants shared across _loganlib_.

#![allow(non_upper_case_globals)]

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling, counts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;

/// A general-purpose counter.
pub type Count = u64;

/// A sequence of raw bytes, typically one log line before decoding.
pub type Bytes = Vec<u8>;

/// 1-based index of a [`Column`] within a [`LogLine`].
///
/// [`Column`]: crate::data::logline::Columns
/// [`LogLine`]: crate::data::logline::LogLine
pub type ColumnIndex = usize;

/// Newline byte; the only line delimiter recognized.
pub const NLu8: u8 = b'\n';

/// Carriage return byte, stripped from the end of lines.
pub const CRu8: u8 = b'\r';

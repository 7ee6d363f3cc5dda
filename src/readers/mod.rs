// src/readers/mod.rs

//! "Readers" for _loganlib_.
//!
//! ## Overview of readers
//!
//! * A [`TimeSeekReader`] wraps the byte stream of a log chain and serves
//!   only the bytes covering the requested time window.
//! * The pipeline splits those bytes into lines and hands each line to
//!   [`parse_columns`] to derive its columns.
//!
//! [`TimeSeekReader`]: crate::readers::seekreader::TimeSeekReader
//! [`parse_columns`]: crate::readers::columnparser::parse_columns

pub mod columnparser;
pub mod seekreader;

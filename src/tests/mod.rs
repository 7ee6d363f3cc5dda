// src/tests/mod.rs

//! Tests for _loganlib_.
//!
//! Tests are placed at `src/tests/`, inside the `loganlib`, so they can reach
//! crate-internal functions.
//!
//! Tests placed at top-level path `tests/` do not have crate-internal
//! visibility. While it is recommended to not require internal visibility for
//! testing, in practice that often makes tests difficult or impossible to
//! implement.

pub mod common;
pub mod config_tests;
pub mod datetime_tests;
pub mod pipeline_tests;

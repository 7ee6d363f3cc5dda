// src/source/stdin.rs

//! Implements [`StdinSource`], the single category `-` reading standard
//! input.

use crate::data::datetime::TimeInterval;
use crate::source::{LogChain, LogSource};

use std::io::{self, Read};

/// The category name of standard input.
pub const STDIN_CATEGORY: &str = "-";

#[derive(Debug, Default)]
pub struct StdinSource {}

impl StdinSource {
    pub fn new() -> StdinSource {
        StdinSource {}
    }
}

impl LogSource for StdinSource {
    fn name(&self) -> &'static str {
        "stdin"
    }

    fn categories(&self) -> Vec<String> {
        vec![STDIN_CATEGORY.to_string()]
    }

    fn contains_category(&self, category: &str) -> bool {
        category == STDIN_CATEGORY
    }

    fn chain(&self, category: &str) -> Option<Box<dyn LogChain>> {
        match self.contains_category(category) {
            true => Some(Box::new(StdinChain {})),
            false => None,
        }
    }
}

#[derive(Debug)]
pub struct StdinChain {}

impl LogChain for StdinChain {
    fn between(&self, _interval: &TimeInterval) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(io::stdin()))
    }
}

// src/source/mod.rs

//! The `source` module finds log files by category and chains them into one
//! byte stream.
//!
//! A [`LogSource`] is a family of log categories (e.g. `generic`, the files
//! of `/var/log`). A category is named on the command-line as
//! `source/category`, or as a bare `category` if only one source has it.
//! Each category yields a [`LogChain`], which opens the byte stream covering
//! a [`TimeInterval`].

use crate::config::Configuration;
use crate::data::datetime::TimeInterval;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::io::{self, Read};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

pub mod generic;
pub mod scribe;
pub mod stdin;

pub use generic::GenericLogSource;
pub use scribe::ScribeLogSource;
pub use stdin::StdinSource;

/// Separates the source name from the category name.
pub const SOURCE_SEPARATOR: char = '/';

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("log source must be in the format source/category, got {0:?}")]
    BadCategoryFormat(String),
    #[error("log source {0:?} not found")]
    SourceNotFound(String),
    #[error("category {0:?} not found")]
    CategoryNotFound(String),
    #[error("category {category:?} is ambiguous, use one of {}", .candidates.join(", "))]
    AmbiguousCategory {
        category: String,
        candidates: Vec<String>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The files of one category.
pub trait LogChain: Send {
    /// Open the byte stream covering `interval`. The stream may also cover
    /// time outside `interval`.
    fn between(&self, interval: &TimeInterval) -> io::Result<Box<dyn Read + Send>>;
}

/// A family of log categories.
pub trait LogSource {
    fn name(&self) -> &'static str;

    /// Category names, sorted.
    fn categories(&self) -> Vec<String>;

    fn contains_category(&self, category: &str) -> bool {
        self.categories().iter().any(|c| c == category)
    }

    /// The chain of `category`, `None` if there is no such category.
    fn chain(&self, category: &str) -> Option<Box<dyn LogChain>>;
}

pub type LogSources = Vec<Box<dyn LogSource>>;

/// All log sources, configured by `config`.
pub fn log_sources(config: &Configuration) -> LogSources {
    vec![
        Box::new(GenericLogSource::new(config.generic.dirs.clone(), config.generic.recursion)),
        Box::new(ScribeLogSource::new(config.scribe.dirs.clone())),
        Box::new(StdinSource::new()),
    ]
}

/// Every category of `sources` as `source/category`, sorted, restricted to
/// those containing `filter` if given.
pub fn list_categories(sources: &[Box<dyn LogSource>], filter: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = sources
        .iter()
        .flat_map(|source| {
            source
                .categories()
                .into_iter()
                .map(move |category| format!("{}{}{}", source.name(), SOURCE_SEPARATOR, category))
        })
        .filter(|name| match filter {
            Some(filter) => name.contains(filter),
            None => true,
        })
        .collect();
    names.sort();

    names
}

/// Find the chain named by `spec`, either `source/category` or a bare
/// `category` that only one source has.
pub fn resolve_category(
    sources: &[Box<dyn LogSource>],
    spec: &str,
) -> Result<Box<dyn LogChain>, SourceError> {
    defn!("{:?}", spec);
    if spec.is_empty() {
        return Err(SourceError::BadCategoryFormat(spec.to_string()));
    }
    if let Some((source_name, category)) = spec.split_once(SOURCE_SEPARATOR) {
        if let Some(source) = sources.iter().find(|s| s.name() == source_name) {
            if category.is_empty() {
                defx!("no category");
                return Err(SourceError::BadCategoryFormat(spec.to_string()));
            }
            defx!("source {:?} category {:?}", source_name, category);
            return source
                .chain(category)
                .ok_or_else(|| SourceError::CategoryNotFound(spec.to_string()));
        }
    }
    // a bare category, which may itself contain the separator
    let matching: Vec<&Box<dyn LogSource>> = sources
        .iter()
        .filter(|s| s.contains_category(spec))
        .collect();
    match matching.len() {
        0 => {
            defx!("not found");
            match spec.split_once(SOURCE_SEPARATOR) {
                Some((source_name, _)) => Err(SourceError::SourceNotFound(source_name.to_string())),
                None => Err(SourceError::CategoryNotFound(spec.to_string())),
            }
        }
        1 => {
            defx!("found in {:?}", matching[0].name());
            matching[0]
                .chain(spec)
                .ok_or_else(|| SourceError::CategoryNotFound(spec.to_string()))
        }
        _ => {
            defx!("ambiguous");
            Err(SourceError::AmbiguousCategory {
                category: spec.to_string(),
                candidates: matching
                    .iter()
                    .map(|s| format!("{}{}{}", s.name(), SOURCE_SEPARATOR, spec))
                    .collect(),
            })
        }
    }
}

/// Reads each reader to its end, in order.
pub struct MultiReader {
    readers: Vec<Box<dyn Read + Send>>,
    index: usize,
}

impl MultiReader {
    pub fn new(readers: Vec<Box<dyn Read + Send>>) -> MultiReader {
        MultiReader { readers, index: 0 }
    }
}

impl Read for MultiReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.index < self.readers.len() {
            match self.readers[self.index].read(buf)? {
                0 => self.index += 1,
                n => return Ok(n),
            }
        }

        Ok(0)
    }
}

// src/source/scribe.rs

//! Implements [`ScribeLogSource`], logs written by a Scribe server: one
//! directory per category holding one file per hour, e.g.
//! `/mnt/scribe/www/www-2016-11-03_00013` (maybe gzipped).

use crate::common::FPath;
use crate::data::datetime::{DateTimeL, Duration, TimeInterval, Timelike};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::source::{LogChain, LogSource, MultiReader};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

use ::flate2::read::MultiGzDecoder;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Category directories under the Scribe directories.
pub struct ScribeLogSource {
    dirs: Vec<FPath>,
}

impl ScribeLogSource {
    pub fn new(dirs: Vec<FPath>) -> ScribeLogSource {
        ScribeLogSource { dirs }
    }

    /// Each category and the Scribe directory it is in. A category found in
    /// more than one directory is taken from the last. Missing directories
    /// are skipped.
    fn category_dirs(&self) -> BTreeMap<String, FPath> {
        let mut categories = BTreeMap::new();
        for dir in self.dirs.iter() {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    defo!("read_dir({:?}) {}", dir, err);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let is_dir: bool = match entry.file_type() {
                    Ok(file_type) => file_type.is_dir(),
                    Err(_) => false,
                };
                if is_dir {
                    categories.insert(entry.file_name().to_string_lossy().to_string(), dir.clone());
                }
            }
        }

        categories
    }
}

impl LogSource for ScribeLogSource {
    fn name(&self) -> &'static str {
        "scribe"
    }

    fn categories(&self) -> Vec<String> {
        self.category_dirs().into_keys().collect()
    }

    fn contains_category(&self, category: &str) -> bool {
        self.category_dirs().contains_key(category)
    }

    fn chain(&self, category: &str) -> Option<Box<dyn LogChain>> {
        let dir: FPath = self.category_dirs().remove(category)?;

        Some(Box::new(ScribeLogChain::new(dir, category.to_string())))
    }
}

/// Path of the hourly file of `category` in `dir` for the hour of `dt`.
pub fn hourly_file_path(dir: &str, category: &str, dt: &DateTimeL) -> PathBuf {
    let name: String = format!("{}-{}_000{}", category, dt.format("%Y-%m-%d"), dt.format("%H"));

    Path::new(dir).join(category).join(name)
}

/// `dt` with minutes, seconds and fractions zeroed.
fn hour_floor(dt: &DateTimeL) -> DateTimeL {
    dt.with_nanosecond(0)
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_minute(0))
        .unwrap_or(*dt)
}

/// The hours whose files cover `interval`: from the hour of the start up
/// to the end rounded up to a whole hour.
pub fn hours_between(interval: &TimeInterval) -> Vec<DateTimeL> {
    let mut end: DateTimeL = hour_floor(interval.end());
    if end != *interval.end() {
        end += Duration::hours(1);
    }
    let mut hours: Vec<DateTimeL> = Vec::new();
    let mut hour: DateTimeL = hour_floor(interval.start());
    while hour < end {
        hours.push(hour);
        hour += Duration::hours(1);
    }

    hours
}

/// Concatenation of the hourly files of a category.
#[derive(Debug)]
pub struct ScribeLogChain {
    dir: FPath,
    category: String,
}

impl ScribeLogChain {
    pub fn new(dir: FPath, category: String) -> ScribeLogChain {
        ScribeLogChain { dir, category }
    }
}

impl LogChain for ScribeLogChain {
    /// A missing hourly file is skipped with a warning.
    fn between(&self, interval: &TimeInterval) -> io::Result<Box<dyn Read + Send>> {
        defn!("{:?} {}", self.category, interval);
        let mut readers: Vec<Box<dyn Read + Send>> = Vec::new();
        for hour in hours_between(interval).iter() {
            let path: PathBuf = hourly_file_path(&self.dir, &self.category, hour);
            match File::open(&path) {
                Ok(file) => {
                    defo!("open {:?}", path);
                    readers.push(Box::new(file));
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(io::Error::new(err.kind(), format!("{}: {:?}", err, path))),
            }
            let mut path_gz: PathBuf = path.clone();
            path_gz.as_mut_os_string().push(".gz");
            match File::open(&path_gz) {
                Ok(file) => {
                    defo!("open {:?}", path_gz);
                    readers.push(Box::new(MultiGzDecoder::new(file)));
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    e_wrn!("log file not found {:?}", path);
                }
                Err(err) => return Err(io::Error::new(err.kind(), format!("{}: {:?}", err, path_gz))),
            }
        }
        defx!("{} files", readers.len());

        Ok(Box::new(MultiReader::new(readers)))
    }
}

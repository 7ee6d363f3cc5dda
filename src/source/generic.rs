// src/source/generic.rs

//! Implements [`GenericLogSource`], plain and rotated log files found under
//! configured directories, e.g. `/var/log/syslog`, `/var/log/syslog.1`,
//! `/var/log/syslog.2.gz`.

use crate::common::FPath;
use crate::data::datetime::TimeInterval;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::source::{LogChain, LogSource, MultiReader, SOURCE_SEPARATOR};

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use ::bzip2_rs::DecoderReader as Bz2DecoderReader;
use ::flate2::read::MultiGzDecoder;
use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::walkdir::WalkDir;

lazy_static! {
    /// `name`, `name.log`, `name.N`, `name.log.N`, `name.N.gz`, … with
    /// capture groups name, rotation number, compression suffix.
    static ref GENERIC_FILE_NAME: Regex =
        Regex::new(r"^([A-Za-z0-9_-]+)(?:\.log)?(?:\.([0-9]+)(\.gz|\.bz2)?)?$").unwrap();
}

/// Compression of a log file, by its name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Compression {
    None,
    Gz,
    Bz2,
}

/// A file of a generic category.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RotatedFile {
    pub path: FPath,
    /// `None` for the live file
    pub rotation: Option<u64>,
    pub compression: Compression,
}

/// Category name, rotation, and compression for the file named `file_name`,
/// or `None` if the name is not a log file name.
pub fn parse_file_name(file_name: &str) -> Option<(&str, Option<u64>, Compression)> {
    let captures = GENERIC_FILE_NAME.captures(file_name)?;
    let name: &str = captures.get(1)?.as_str();
    let rotation: Option<u64> = match captures.get(2) {
        Some(m) => Some(m.as_str().parse::<u64>().ok()?),
        None => None,
    };
    let compression = match captures.get(3).map(|m| m.as_str()) {
        Some(".gz") => Compression::Gz,
        Some(".bz2") => Compression::Bz2,
        _ => Compression::None,
    };

    Some((name, rotation, compression))
}

/// Oldest first: highest rotation first, the live file last.
fn sort_rotated(files: &mut [RotatedFile]) {
    files.sort_by(|a, b| match (a.rotation, b.rotation) {
        (Some(ra), Some(rb)) => rb.cmp(&ra).then_with(|| a.path.cmp(&b.path)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.path.cmp(&b.path),
    });
}

type CategoryMap = BTreeMap<String, Vec<RotatedFile>>;

/// Collect the categories under `dir`, searching `recursion` levels of
/// subdirectories. Categories in subdirectories are prefixed by their
/// relative path.
pub fn collect_categories(dir: &Path, recursion: usize) -> CategoryMap {
    defn!("{:?}, {}", dir, recursion);
    let mut categories = CategoryMap::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(recursion.saturating_add(1))
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                defo!("{}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name: &str = match entry.file_name().to_str() {
            Some(file_name) => file_name,
            None => continue,
        };
        let (name, rotation, compression) = match parse_file_name(file_name) {
            Some(parsed) => parsed,
            None => continue,
        };
        let mut category = String::new();
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            if let Some(parent) = relative.parent() {
                for component in parent.components() {
                    category.push_str(&component.as_os_str().to_string_lossy());
                    category.push(SOURCE_SEPARATOR);
                }
            }
        }
        category.push_str(name);
        defo!("{:?} in category {:?}", entry.path(), category);
        categories.entry(category).or_default().push(RotatedFile {
            path: entry.path().to_string_lossy().to_string(),
            rotation,
            compression,
        });
    }
    for files in categories.values_mut() {
        sort_rotated(files);
    }
    defx!("{} categories", categories.len());

    categories
}

/// Log files under directories, grouped by name into categories.
pub struct GenericLogSource {
    dirs: Vec<FPath>,
    recursion: usize,
    categories: OnceCell<CategoryMap>,
}

impl GenericLogSource {
    pub fn new(dirs: Vec<FPath>, recursion: usize) -> GenericLogSource {
        GenericLogSource {
            dirs,
            recursion,
            categories: OnceCell::new(),
        }
    }

    /// A category found in more than one directory is taken from the last.
    fn category_map(&self) -> &CategoryMap {
        self.categories.get_or_init(|| {
            let mut categories = CategoryMap::new();
            for dir in self.dirs.iter() {
                categories.extend(collect_categories(Path::new(dir), self.recursion));
            }
            categories
        })
    }

    /// Files of `category`, oldest first.
    pub fn files(&self, category: &str) -> Option<&[RotatedFile]> {
        self.category_map().get(category).map(|files| files.as_slice())
    }
}

impl LogSource for GenericLogSource {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn categories(&self) -> Vec<String> {
        self.category_map().keys().cloned().collect()
    }

    fn contains_category(&self, category: &str) -> bool {
        self.category_map().contains_key(category)
    }

    fn chain(&self, category: &str) -> Option<Box<dyn LogChain>> {
        let files: Vec<RotatedFile> = self.files(category)?.to_vec();

        Some(Box::new(GenericLogChain { files }))
    }
}

/// Concatenation of a category's files, decompressed.
#[derive(Debug)]
pub struct GenericLogChain {
    files: Vec<RotatedFile>,
}

impl GenericLogChain {
    pub fn new(files: Vec<RotatedFile>) -> GenericLogChain {
        GenericLogChain { files }
    }
}

/// Open `file`, decompressing it if needed.
pub fn open_rotated(file: &RotatedFile) -> io::Result<Box<dyn Read + Send>> {
    let handle: File = match File::open(&file.path) {
        Ok(handle) => handle,
        Err(err) => {
            return Err(io::Error::new(err.kind(), format!("{}: {:?}", err, file.path)));
        }
    };

    Ok(match file.compression {
        Compression::None => Box::new(handle),
        Compression::Gz => Box::new(MultiGzDecoder::new(handle)),
        Compression::Bz2 => Box::new(Bz2DecoderReader::new(handle)),
    })
}

impl LogChain for GenericLogChain {
    /// All files are opened; the time window is found by reading.
    fn between(&self, _interval: &TimeInterval) -> io::Result<Box<dyn Read + Send>> {
        defn!("{} files", self.files.len());
        let mut readers: Vec<Box<dyn Read + Send>> = Vec::with_capacity(self.files.len());
        for file in self.files.iter() {
            readers.push(open_rotated(file)?);
        }
        defx!();

        Ok(Box::new(MultiReader::new(readers)))
    }
}

// src/debug/helpers.rs

//! Miscellaneous helper functions for testing: temporary log files and
//! directories.

use crate::common::FPath;

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

use ::flate2::write::GzEncoder;
use ::flate2::Compression;
use ::lazy_static::lazy_static;

#[doc(hidden)]
pub use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// NamedTempFile and TempDir instances default to this name prefix.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-logan-test-";

lazy_static! {
    pub static ref STRING_TEMPFILE_PREFIX: String = String::from(STR_TEMPFILE_PREFIX);
}

/// Small helper function for copying a `Path` to a `FPath`.
pub fn path_to_fpath(path: &Path) -> FPath {
    FPath::from(path.to_string_lossy())
}

/// Create a new empty temporary directory.
pub fn create_temp_dir() -> TempDir {
    match ::tempfile::Builder::new()
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .tempdir()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::tempdir() return Err {}", err);
        }
    }
}

/// Write `data` to file `name` under `dir`, creating intermediate
/// directories as needed. A `name` ending in `.gz` is gzip compressed.
pub fn write_log_file(dir: &Path, name: &str, data: &str) -> FPath {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        if let Err(err) = create_dir_all(parent) {
            panic!("create_dir_all({:?}) return Err {}", parent, err);
        }
    }
    let file = match File::create(&path) {
        Ok(val) => val,
        Err(err) => {
            panic!("File::create({:?}) return Err {}", path, err);
        }
    };
    let result = if name.ends_with(".gz") {
        let mut encoder = GzEncoder::new(file, Compression::default());
        match encoder.write_all(data.as_bytes()) {
            Ok(_) => encoder.finish().map(|_| ()),
            Err(err) => Err(err),
        }
    } else {
        let mut file = file;
        file.write_all(data.as_bytes())
    };
    if let Err(err) = result {
        panic!("write to {:?} return Err {}", path, err);
    }

    path_to_fpath(&path)
}

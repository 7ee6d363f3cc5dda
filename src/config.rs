// src/config.rs

//! Loads the [`Configuration`]: where the log sources keep their files.
//!
//! Configuration files are TOML, for example
//!
//! ```toml
//! [scribe]
//! dirs = ["/mnt/scribe"]
//!
//! [generic]
//! dirs = "/var/log:/opt/app/log"
//! recursion = 2
//! ```
//!
//! `dirs` is a list or a single `:`-separated string. Files are layered,
//! each key of a later file replacing the same key of an earlier one.

use crate::common::FPath;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ::serde::Deserialize;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

/// System-wide configuration file.
pub const CONFIG_PATH_SYSTEM: &str = "/etc/logan.toml";

/// Per-user configuration file name, under the home directory.
pub const CONFIG_NAME_USER: &str = ".logan.toml";

pub const SCRIBE_DIRS_DEF: [&str; 2] = ["/mnt/scribe", "/var/log/scribe"];
pub const GENERIC_DIRS_DEF: [&str; 1] = ["/var/log"];
pub const GENERIC_RECURSION_DEF: usize = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path:?}: {source}")]
    Io {
        path: FPath,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path:?}: {source}")]
    Toml {
        path: FPath,
        #[source]
        source: ::toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScribeConfig {
    pub dirs: Vec<FPath>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenericConfig {
    pub dirs: Vec<FPath>,
    /// depth of subdirectories searched below each of `dirs`
    pub recursion: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    pub scribe: ScribeConfig,
    pub generic: GenericConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            scribe: ScribeConfig {
                dirs: SCRIBE_DIRS_DEF.iter().map(|d| d.to_string()).collect(),
            },
            generic: GenericConfig {
                dirs: GENERIC_DIRS_DEF.iter().map(|d| d.to_string()).collect(),
                recursion: GENERIC_RECURSION_DEF,
            },
        }
    }
}

// one configuration file; every key is optional

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DirsToml {
    List(Vec<FPath>),
    Joined(String),
}

impl DirsToml {
    fn into_dirs(self) -> Vec<FPath> {
        match self {
            DirsToml::List(dirs) => dirs,
            DirsToml::Joined(dirs) => dirs
                .split(':')
                .filter(|d| !d.is_empty())
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScribeToml {
    dirs: Option<DirsToml>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenericToml {
    dirs: Option<DirsToml>,
    recursion: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    scribe: Option<ScribeToml>,
    generic: Option<GenericToml>,
}

impl Configuration {
    /// Apply the keys set in `text`, TOML read from `path`.
    pub fn merge_str(&mut self, text: &str, path: &Path) -> Result<(), ConfigError> {
        let layer: ConfigToml = ::toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        if let Some(scribe) = layer.scribe {
            if let Some(dirs) = scribe.dirs {
                self.scribe.dirs = dirs.into_dirs();
            }
        }
        if let Some(generic) = layer.generic {
            if let Some(dirs) = generic.dirs {
                self.generic.dirs = dirs.into_dirs();
            }
            if let Some(recursion) = generic.recursion {
                self.generic.recursion = recursion;
            }
        }

        Ok(())
    }

    /// Apply the keys set in the file at `path`. Returns `false` if the
    /// file does not exist.
    pub fn merge_file(&mut self, path: &Path) -> Result<bool, ConfigError> {
        defn!("{:?}", path);
        let text: String = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                defx!("not found");
                return Ok(false);
            }
            Err(source) => {
                defx!("{}", source);
                return Err(ConfigError::Io {
                    path: path.to_string_lossy().to_string(),
                    source,
                });
            }
        };
        self.merge_str(&text, path)?;
        defx!("merged");

        Ok(true)
    }

    /// Load the defaults layered with the system file, the user file, and
    /// `extra` (if given), in that order.
    pub fn load(extra: Option<&Path>) -> Result<Configuration, ConfigError> {
        let mut paths: Vec<PathBuf> = vec![PathBuf::from(CONFIG_PATH_SYSTEM)];
        if let Some(home) = ::dirs::home_dir() {
            paths.push(home.join(CONFIG_NAME_USER));
        }
        if let Some(extra) = extra {
            paths.push(extra.to_path_buf());
        }

        Configuration::load_paths(&paths)
    }

    /// Load the defaults layered with each of `paths`. Missing files are
    /// skipped.
    pub fn load_paths(paths: &[PathBuf]) -> Result<Configuration, ConfigError> {
        let mut config = Configuration::default();
        for path in paths.iter() {
            config.merge_file(path)?;
        }

        Ok(config)
    }
}

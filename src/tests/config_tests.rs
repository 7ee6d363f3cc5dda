// src/tests/config_tests.rs

//! tests for `config.rs`

#![allow(non_snake_case)]

use crate::config::{
    ConfigError,
    Configuration,
    GENERIC_DIRS_DEF,
    GENERIC_RECURSION_DEF,
    SCRIBE_DIRS_DEF,
};
use crate::debug::helpers::{create_temp_dir, write_log_file};

use std::path::{Path, PathBuf};

use ::test_case::test_case;

fn merged(text: &str) -> Configuration {
    let mut config = Configuration::default();
    config.merge_str(text, Path::new("test.toml")).unwrap();

    config
}

#[test]
fn test_Configuration_default() {
    let config = Configuration::default();
    assert_eq!(config.scribe.dirs, SCRIBE_DIRS_DEF);
    assert_eq!(config.generic.dirs, GENERIC_DIRS_DEF);
    assert_eq!(config.generic.recursion, GENERIC_RECURSION_DEF);
}

#[test_case(r#"generic = { dirs = ["/a", "/b"] }"#, &["/a", "/b"]; "list")]
#[test_case(r#"generic = { dirs = "/a:/b" }"#, &["/a", "/b"]; "joined")]
#[test_case(r#"generic = { dirs = "/a::/b:" }"#, &["/a", "/b"]; "joined with empties")]
#[test_case(r#"generic = { dirs = [] }"#, &[]; "empty list")]
fn test_merge_str_generic_dirs(text: &str, expect: &[&str]) {
    let config = merged(text);
    assert_eq!(config.generic.dirs, expect);
    assert_eq!(config.generic.recursion, GENERIC_RECURSION_DEF);
    assert_eq!(config.scribe.dirs, SCRIBE_DIRS_DEF);
}

#[test]
fn test_merge_str_sections() {
    let config = merged(
        r#"
[scribe]
dirs = "/scribe"

[generic]
recursion = 3
"#,
    );
    assert_eq!(config.scribe.dirs, ["/scribe"]);
    assert_eq!(config.generic.dirs, GENERIC_DIRS_DEF);
    assert_eq!(config.generic.recursion, 3);
}

#[test]
fn test_merge_str_empty() {
    assert_eq!(merged(""), Configuration::default());
}

#[test_case("[generic]\nnope = 1"; "unknown key")]
#[test_case("[other]"; "unknown table")]
#[test_case("[generic]\nrecursion = -1"; "negative recursion")]
#[test_case("[generic]\ndirs = 5"; "dirs not a string")]
#[test_case("[generic"; "syntax")]
fn test_merge_str_err(text: &str) {
    let mut config = Configuration::default();
    let err = config.merge_str(text, Path::new("bad.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { ref path, .. } if path == "bad.toml"));
    assert!(err.to_string().starts_with(r#"parsing config "bad.toml": "#), "{}", err);
}

#[test]
fn test_merge_file_missing() {
    let mut config = Configuration::default();
    assert!(!config.merge_file(Path::new("/nonexistent/logan.toml")).unwrap());
    assert_eq!(config, Configuration::default());
}

#[test]
fn test_merge_file_directory() {
    let dir = create_temp_dir();
    let mut config = Configuration::default();
    assert!(matches!(config.merge_file(dir.path()), Err(ConfigError::Io { .. })));
}

#[test]
fn test_load_paths_layers() {
    let dir = create_temp_dir();
    let first = write_log_file(
        dir.path(),
        "first.toml",
        "[generic]\ndirs = [\"/first\"]\nrecursion = 4\n[scribe]\ndirs = \"/s1\"\n",
    );
    let second = write_log_file(dir.path(), "second.toml", "[generic]\ndirs = \"/second\"\n");
    let paths: Vec<PathBuf> = vec![
        PathBuf::from(first),
        dir.path().join("missing.toml"),
        PathBuf::from(second),
    ];
    let config = Configuration::load_paths(&paths).unwrap();
    assert_eq!(config.generic.dirs, ["/second"]);
    assert_eq!(config.generic.recursion, 4);
    assert_eq!(config.scribe.dirs, ["/s1"]);
}

#[test]
fn test_load_paths_error_stops() {
    let dir = create_temp_dir();
    let bad = write_log_file(dir.path(), "bad.toml", "generic = 1\n");
    let result = Configuration::load_paths(&[PathBuf::from(bad)]);
    assert!(matches!(result, Err(ConfigError::Toml { .. })));
}

//! Settings load error messages and header rewrite file round trips.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use stockdrop_core::{config, headers, ConfigError, HeaderError};

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "must name the file, got: {err}");
}

#[test]
fn wrong_type_yaml_returns_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str("debounce_ms: soon\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn empty_file_yields_defaults() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.touch().expect("touch");

    let settings = config::load_at(file.path()).expect("load");
    assert_eq!(settings.temp_prefix, ".in.");
}

#[test]
fn rewrite_file_writes_processed_sibling() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let input = dir.child("export.csv");
    input
        .write_str("\"Title\",\"Variant SKU\",\"Variant Metafield: custom._7_10_day_dispatch_stock [number_integer]\"\nShirt,SKU-1,4\n")
        .expect("write");

    let out = headers::rewrite_file(input.path(), &headers::default_header_mapping())
        .expect("rewrite");

    assert_eq!(out, dir.path().join("export_processed.csv"));
    dir.child("export_processed.csv")
        .assert(predicate::str::starts_with("Title,Variant SKU,7-10 Day Stock\n"));
    dir.child("export_processed.csv")
        .assert(predicate::str::ends_with("Shirt,SKU-1,4\n"));
    input.assert(predicate::str::starts_with("\"Title\""));
}

#[test]
fn rewrite_missing_file_reports_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = headers::rewrite_file(&dir.path().join("nope.csv"), &headers::default_header_mapping())
        .unwrap_err();
    assert!(matches!(err, HeaderError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.csv"));
}

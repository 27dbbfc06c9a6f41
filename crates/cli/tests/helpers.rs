use std::fs;

use tempfile::tempdir;

use unflex::{canonicalize_or_current, parse_offset_value, sha256_file};

#[test]
fn parse_offset_value_accepts_decimal_and_hex() {
    assert_eq!(parse_offset_value("0").expect("zero"), 0);
    assert_eq!(parse_offset_value("4096").expect("decimal"), 4096);
    assert_eq!(parse_offset_value("0x41b0").expect("hex"), 0x41b0);
    assert_eq!(parse_offset_value("0X41B0").expect("upper hex"), 0x41b0);
}

#[test]
fn parse_offset_value_rejects_garbage() {
    for input in ["", "abc", "0x", "-3", "12.5"] {
        assert!(parse_offset_value(input).is_err(), "`{input}` should not parse");
    }
}

// Single test so the process-wide working directory is only changed from
// one place.
#[test]
fn canonicalize_or_current_resolves_relative_paths() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    // Existing relative paths canonicalize fully.
    let result = canonicalize_or_current("nested").expect("canonicalize nested");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));

    // Paths that do not exist yet are joined with the current directory.
    let result = canonicalize_or_current("not-created-yet").expect("canonicalize");
    assert!(result.is_absolute());
    assert!(result.ends_with("not-created-yet"));

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn sha256_file_hashes_known_content() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("empty.bin");
    fs::write(&path, b"").expect("write empty");

    // SHA-256 of the empty input.
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

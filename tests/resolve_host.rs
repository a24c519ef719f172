use std::fs;
use tempfile::tempdir;

use mtp_move::errors::MtpMoveError;
use mtp_move::resolve::resolve;
use mtp_move::store::Location;

fn code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<MtpMoveError>()
        .map(MtpMoveError::code)
        .unwrap_or("not-a-taxonomy-error")
}

#[test]
fn empty_input_is_invalid() {
    let err = resolve("   ", None, &[], false).unwrap_err();
    assert_eq!(code(&err), "invalid_argument");
}

#[test]
fn existing_directory_matches_as_directory() {
    let td = tempdir().unwrap();
    let raw = td.path().to_string_lossy().into_owned();

    let resolved = resolve(&raw, None, &[], false).unwrap();
    assert_eq!(resolved.directory, Location::Host(td.path().to_path_buf()));
    assert_eq!(resolved.file_pattern, "*");
    assert!(resolved.is_directory_match);
}

#[test]
fn existing_file_splits_into_parent_and_leaf() {
    let td = tempdir().unwrap();
    let file = td.path().join("report.pdf");
    fs::write(&file, b"pdf").unwrap();

    let resolved = resolve(&file.to_string_lossy(), None, &[], false).unwrap();
    assert_eq!(resolved.directory, Location::Host(td.path().to_path_buf()));
    assert_eq!(resolved.file_pattern, "report.pdf");
    assert!(resolved.is_file_match);
}

#[test]
fn wildcard_leaf_needs_an_existing_parent() {
    let td = tempdir().unwrap();

    let raw = td.path().join("*.jpg");
    let resolved = resolve(&raw.to_string_lossy(), None, &[], false).unwrap();
    assert_eq!(resolved.directory, Location::Host(td.path().to_path_buf()));
    assert_eq!(resolved.file_pattern, "*.jpg");
    assert!(resolved.is_file_match);

    let missing = td.path().join("nope").join("*.jpg");
    let err = resolve(&missing.to_string_lossy(), None, &[], false).unwrap_err();
    assert_eq!(code(&err), "not_found");
}

#[test]
fn missing_concrete_path_is_not_found() {
    let td = tempdir().unwrap();
    let raw = td.path().join("absent.bin");
    let err = resolve(&raw.to_string_lossy(), None, &[], false).unwrap_err();
    assert_eq!(code(&err), "not_found");
}

#[test]
fn trailing_separator_on_a_file_is_rejected() {
    let td = tempdir().unwrap();
    let file = td.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    let raw = format!("{}/", file.display());
    let err = resolve(&raw, None, &[], false).unwrap_err();
    assert_eq!(code(&err), "not_found");
}

#[test]
fn wildcard_in_intermediate_segment_is_rejected() {
    let td = tempdir().unwrap();
    let raw = td.path().join("ph*tos").join("a.jpg");
    let err = resolve(&raw.to_string_lossy(), None, &[], false).unwrap_err();
    assert_eq!(code(&err), "wildcard_in_directory");
}

#[test]
fn explicit_patterns_conflict_with_a_concrete_file() {
    let td = tempdir().unwrap();
    let file = td.path().join("one.txt");
    fs::write(&file, b"x").unwrap();

    let err = resolve(
        &file.to_string_lossy(),
        None,
        &["*.log".to_string()],
        false,
    )
    .unwrap_err();
    assert_eq!(code(&err), "pattern_conflict");
}

#[test]
fn bare_star_resolves_to_current_directory() {
    // "*" is rewritten to "." before resolution.
    let resolved = resolve("*", None, &[], false).unwrap();
    assert!(resolved.is_directory_match);
    assert_eq!(resolved.file_pattern, "*");
    assert_eq!(resolved.directory, Location::Host(".".into()));
}

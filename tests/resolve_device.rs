use std::fs;
use std::path::Path;
use tempfile::tempdir;

use mtp_move::errors::MtpMoveError;
use mtp_move::resolve::resolve_in;
use mtp_move::store::{DeviceHandle, Location};

fn fake_device(root: &Path) -> DeviceHandle {
    fs::create_dir_all(root.join("Internal storage/Download")).unwrap();
    fs::create_dir_all(root.join("Internal storage/DCIM/Camera")).unwrap();
    fs::create_dir_all(root.join("SD card")).unwrap();
    fs::write(root.join("Internal storage/Download/photo.jpg"), b"jpeg").unwrap();
    DeviceHandle::open("phone", root).unwrap()
}

fn code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<MtpMoveError>()
        .map(MtpMoveError::code)
        .unwrap_or("not-a-taxonomy-error")
}

#[test]
fn file_leaf_splits_into_directory_and_pattern() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let resolved = resolve_in(
        "Internal storage/Download/photo.jpg",
        Some(&dev),
        &["*".to_string()],
        true,
        host_td.path(),
    )
    .unwrap();

    assert_eq!(
        resolved.directory,
        Location::Device("Internal storage/Download".into())
    );
    assert_eq!(resolved.file_pattern, "photo.jpg");
    assert!(resolved.is_file_match);
    assert!(!resolved.is_directory_match);
}

#[test]
fn trailing_separator_is_a_directory_match() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let resolved = resolve_in("Internal storage/", Some(&dev), &[], true, host_td.path()).unwrap();

    assert_eq!(resolved.directory, Location::Device("Internal storage".into()));
    assert_eq!(resolved.file_pattern, "*");
    assert!(resolved.is_directory_match);
    assert!(!resolved.is_file_match);
}

#[test]
fn directory_match_round_trips_segments() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let input = "Internal storage/DCIM/Camera";
    let resolved = resolve_in(input, Some(&dev), &[], true, host_td.path()).unwrap();
    let Location::Device(dir) = &resolved.directory else {
        panic!("expected a device directory");
    };
    assert_eq!(
        dir.split('/').collect::<Vec<_>>(),
        input.split('/').collect::<Vec<_>>()
    );
}

#[test]
fn backslash_in_device_path_is_rejected() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let err = resolve_in(
        "Internal storage\\Download",
        Some(&dev),
        &[],
        true,
        host_td.path(),
    )
    .unwrap_err();
    assert_eq!(code(&err), "invalid_path_separator");
}

#[test]
fn wildcard_in_directory_segment_is_rejected() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let err = resolve_in(
        "Internal storage/D*/photo.jpg",
        Some(&dev),
        &[],
        true,
        host_td.path(),
    )
    .unwrap_err();
    assert_eq!(code(&err), "wildcard_in_directory");
}

#[test]
fn missing_intermediate_segment_is_not_found() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let err = resolve_in(
        "Internal storage/Nope/photo.jpg",
        Some(&dev),
        &[],
        true,
        host_td.path(),
    )
    .unwrap_err();
    assert_eq!(code(&err), "not_found");
}

#[test]
fn unresolved_final_segment_becomes_a_pattern() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let resolved = resolve_in(
        "Internal storage/Download/missing.gif",
        Some(&dev),
        &[],
        true,
        host_td.path(),
    )
    .unwrap();
    assert!(resolved.is_file_match);
    assert_eq!(resolved.file_pattern, "missing.gif");
}

#[test]
fn explicit_patterns_conflict_with_a_concrete_file() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let err = resolve_in(
        "Internal storage/Download/photo.jpg",
        Some(&dev),
        &["*.png".to_string()],
        true,
        host_td.path(),
    )
    .unwrap_err();
    assert_eq!(code(&err), "pattern_conflict");
}

#[test]
fn wildcard_final_segment_is_a_pattern() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());

    let resolved = resolve_in(
        "Internal storage/Download/*.jpg",
        Some(&dev),
        &[],
        true,
        host_td.path(),
    )
    .unwrap();
    assert_eq!(
        resolved.directory,
        Location::Device("Internal storage/Download".into())
    );
    assert_eq!(resolved.file_pattern, "*.jpg");
    assert!(resolved.is_file_match);
}

#[test]
fn ambiguous_path_fails_unless_skipped() {
    let dev_td = tempdir().unwrap();
    let host_td = tempdir().unwrap();
    let dev = fake_device(dev_td.path());
    fs::create_dir(host_td.path().join("Internal storage")).unwrap();

    let err = resolve_in("Internal storage/Download", Some(&dev), &[], false, host_td.path())
        .unwrap_err();
    assert_eq!(code(&err), "ambiguous_path");

    // With the override, the device interpretation wins.
    let resolved =
        resolve_in("Internal storage/Download", Some(&dev), &[], true, host_td.path()).unwrap();
    assert_eq!(
        resolved.directory,
        Location::Device("Internal storage/Download".into())
    );
    assert!(resolved.is_directory_match);
}

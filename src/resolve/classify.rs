//! Path classification: host filesystem vs. device store.
//!
//! Device matching is case-sensitive against the device's top-level folder
//! names; host subdirectory matching is case-insensitive. The asymmetry is
//! deliberate: device namespaces are exact, host filesystems historically are
//! not.

use std::fs;
use std::path::{Path, PathBuf};

use crate::store::{DeviceHandle, Location};

/// Classify a raw path against an optional attached device.
///
/// - Device when the first segment case-sensitively matches one of the
///   device's top-level folder names.
/// - Host when the path starts with a root indicator (leading slash, drive
///   letter) or `.`, or when no device is attached.
/// - Ambiguous when a relative path's leading segment matches both a device
///   top-level folder and an existing host subdirectory; never guessed at.
pub fn classify(path: &str, device: Option<&DeviceHandle>) -> Location {
    classify_in(path, device, Path::new("."))
}

/// Classification against an explicit host base directory (the working
/// directory in production; injectable for tests).
pub fn classify_in(path: &str, device: Option<&DeviceHandle>, host_base: &Path) -> Location {
    let trimmed = path.trim();

    let Some(device) = device else {
        return Location::Host(PathBuf::from(trimmed));
    };

    if has_host_root_indicator(trimmed) {
        return Location::Host(PathBuf::from(trimmed));
    }

    let first = leading_segment(trimmed);
    let device_match = device.top_level_folders().iter().any(|f| f == first);
    if !device_match {
        return Location::Host(PathBuf::from(trimmed));
    }

    if host_subdir_exists_ci(host_base, first) {
        return Location::Ambiguous(trimmed.to_string());
    }

    Location::Device(trimmed.to_string())
}

/// Leading slash, explicit current/parent dir, or a drive letter all pin the
/// path to the host.
fn has_host_root_indicator(path: &str) -> bool {
    if path.starts_with(['/', '\\', '.']) {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn leading_segment(path: &str) -> &str {
    path.split(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(path)
}

/// Case-insensitive "does a subdirectory of this name exist" probe.
fn host_subdir_exists_ci(base: &Path, name: &str) -> bool {
    let Ok(entries) = fs::read_dir(base) else {
        return false;
    };
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fake_device(root: &Path) -> DeviceHandle {
        fs::create_dir_all(root.join("Internal storage")).unwrap();
        fs::create_dir_all(root.join("SD card")).unwrap();
        DeviceHandle::open("phone", root).unwrap()
    }

    #[test]
    fn no_device_is_always_host() {
        let loc = classify("Internal storage/Download", None);
        assert!(matches!(loc, Location::Host(_)));
    }

    #[test]
    fn device_top_level_match_is_device() {
        let dev_td = tempdir().unwrap();
        let host_td = tempdir().unwrap();
        let dev = fake_device(dev_td.path());

        let loc = classify_in("Internal storage/Download", Some(&dev), host_td.path());
        assert_eq!(loc, Location::Device("Internal storage/Download".into()));
    }

    #[test]
    fn device_match_is_case_sensitive() {
        let dev_td = tempdir().unwrap();
        let host_td = tempdir().unwrap();
        let dev = fake_device(dev_td.path());

        let loc = classify_in("internal STORAGE/Download", Some(&dev), host_td.path());
        assert!(matches!(loc, Location::Host(_)));
    }

    #[test]
    fn root_indicator_pins_to_host() {
        let dev_td = tempdir().unwrap();
        let host_td = tempdir().unwrap();
        let dev = fake_device(dev_td.path());

        for p in ["/Internal storage", "./Internal storage", "C:/Internal storage"] {
            let loc = classify_in(p, Some(&dev), host_td.path());
            assert!(matches!(loc, Location::Host(_)), "{p} should be host");
        }
    }

    #[test]
    fn collision_with_host_subdir_is_ambiguous() {
        let dev_td = tempdir().unwrap();
        let host_td = tempdir().unwrap();
        let dev = fake_device(dev_td.path());
        // Host subdir matching is case-insensitive.
        fs::create_dir(host_td.path().join("internal storage")).unwrap();

        let loc = classify_in("Internal storage/Download", Some(&dev), host_td.path());
        assert_eq!(loc, Location::Ambiguous("Internal storage/Download".into()));
    }

    #[test]
    fn classify_is_idempotent() {
        let dev_td = tempdir().unwrap();
        let host_td = tempdir().unwrap();
        let dev = fake_device(dev_td.path());

        let a = classify_in("SD card/music", Some(&dev), host_td.path());
        let b = classify_in("SD card/music", Some(&dev), host_td.path());
        assert_eq!(a, b);
    }
}

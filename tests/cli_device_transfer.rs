use assert_cmd::Command;
use assert_fs::prelude::*;
use serial_test::serial;
use std::fs;

/// End-to-end run against a fake mounted device: one mount under the mounts
/// root, addressed by its top-level folder name.
#[test]
#[serial]
fn moves_from_device_storage_to_host() {
    let temp = assert_fs::TempDir::new().unwrap();
    let cfg = temp.child("config.xml");
    cfg.write_str("<config>\n  <log_level>quiet</log_level>\n</config>\n")
        .unwrap();

    let mounts = temp.child("mounts");
    let download = mounts.child("phone/Internal storage/Download");
    download.create_dir_all().unwrap();
    download.child("photo.jpg").write_str("jpeg").unwrap();
    download.child("clip.mp4").write_str("mp4").unwrap();

    let dest = temp.child("pulled");
    dest.create_dir_all().unwrap();

    Command::cargo_bin("mtp_move")
        .unwrap()
        .env("MTP_MOVE_CONFIG", cfg.path())
        .env("HOME", temp.path())
        .current_dir(temp.path())
        .arg("--mounts-root")
        .arg(mounts.path())
        .arg("Internal storage/Download/*.jpg")
        .arg(dest.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dest.child("photo.jpg").path()).unwrap(),
        "jpeg"
    );
    // The move released the device-side original, the non-matching file stays.
    assert!(!download.child("photo.jpg").path().exists());
    assert!(download.child("clip.mp4").path().exists());
}

/// Pushing into a device path creates missing destination folders through the
/// store's create-folder capability.
#[test]
#[serial]
fn copies_to_a_new_device_folder() {
    let temp = assert_fs::TempDir::new().unwrap();
    let cfg = temp.child("config.xml");
    cfg.write_str("<config>\n  <log_level>quiet</log_level>\n</config>\n")
        .unwrap();

    let mounts = temp.child("mounts");
    mounts.child("phone/Internal storage").create_dir_all().unwrap();

    let src = temp.child("music");
    src.create_dir_all().unwrap();
    src.child("song.mp3").write_str("mp3").unwrap();

    Command::cargo_bin("mtp_move")
        .unwrap()
        .env("MTP_MOVE_CONFIG", cfg.path())
        .env("HOME", temp.path())
        .current_dir(temp.path())
        .arg("--mounts-root")
        .arg(mounts.path())
        .arg("--copy")
        .arg(src.path())
        .arg("Internal storage/Music")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(
            mounts
                .child("phone/Internal storage/Music/song.mp3")
                .path()
        )
        .unwrap(),
        "mp3"
    );
    assert!(src.child("song.mp3").path().exists());
}

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

use mtp_move::config::{load_config_from_xml_path, LogLevel};

#[test]
fn full_config_round_trips() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(
        &path,
        "<config>\n\
         \x20 <mounts_root>/run/user/1000/gvfs</mounts_root>\n\
         \x20 <staging_root>/var/tmp/mtp_move</staging_root>\n\
         \x20 <log_level>debug</log_level>\n\
         \x20 <log_file>/var/log/mtp_move.log</log_file>\n\
         \x20 <skip_ambiguity_check>true</skip_ambiguity_check>\n\
         \x20 <retry_interval_ms> 250 </retry_interval_ms>\n\
         \x20 <cleanup_timeout_seconds>60</cleanup_timeout_seconds>\n\
         </config>\n",
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&path).unwrap();
    assert_eq!(cfg.mounts_root, Some(PathBuf::from("/run/user/1000/gvfs")));
    assert_eq!(cfg.staging_root, Some(PathBuf::from("/var/tmp/mtp_move")));
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file, Some(PathBuf::from("/var/log/mtp_move.log")));
    assert!(cfg.skip_ambiguity_check);
    assert_eq!(cfg.retry_interval, Duration::from_millis(250));
    assert_eq!(cfg.cleanup_timeout, Duration::from_secs(60));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(&path, "<config>\n  <log_level>info</log_level>\n</config>\n").unwrap();

    let cfg = load_config_from_xml_path(&path).unwrap();
    assert_eq!(cfg.mounts_root, None);
    assert_eq!(cfg.staging_root, None);
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert!(!cfg.skip_ambiguity_check);
    assert_eq!(cfg.retry_interval, Duration::from_millis(500));
    assert_eq!(cfg.cleanup_timeout, Duration::from_secs(300));
}

#[test]
fn unknown_fields_are_rejected() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(
        &path,
        "<config>\n  <download_base>/mnt/World</download_base>\n</config>\n",
    )
    .unwrap();

    assert!(load_config_from_xml_path(&path).is_err());
}

#[test]
fn malformed_xml_is_an_error() {
    let td = tempdir().unwrap();
    let path = td.path().join("config.xml");
    fs::write(&path, "<config><log_level>info").unwrap();
    assert!(load_config_from_xml_path(&path).is_err());
}

use instalock::{Config, Error};
use std::fs;
use std::path::PathBuf;

#[test]
fn save_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/config.toml");

    let mut config = Config::default();
    config.assets.dir = PathBuf::from("/opt/instalock/assets");
    config.matching.confidence = 0.85;
    config.timing.poll_interval_ms = 5;
    config.save_to(&path).expect("save");

    assert_eq!(Config::read(&path).expect("read"), config);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(Config::load_from(dir.path().join("absent.toml")), Config::default());
}

#[test]
fn broken_file_loads_defaults_but_read_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[matching\nconfidence = ").unwrap();

    assert_eq!(Config::load_from(&path), Config::default());
    assert!(matches!(Config::read(&path), Err(Error::Config(_))));
}

#[test]
fn invalid_confidence_is_rejected_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[matching]\nconfidence = 2.0\n").unwrap();

    assert!(matches!(Config::read(&path), Err(Error::Config(_))));
}

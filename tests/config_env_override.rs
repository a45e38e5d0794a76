//! SHUTTER_MOVE_CONFIG points the loader at an explicit config file.

use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use shutter_move::config::{load_or_init, LoadOutcome, CONFIG_ENV};

#[test]
#[serial]
fn env_config_is_loaded() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    fs::write(
        &cfg,
        r#"<config>
  <library_root>/data/photos</library_root>
  <template>{{y}}/{{filename}}</template>
  <log_level>quiet</log_level>
</config>"#,
    )
    .unwrap();

    std::env::set_var(CONFIG_ENV, &cfg);
    let outcome = load_or_init();
    std::env::remove_var(CONFIG_ENV);

    match outcome.unwrap() {
        LoadOutcome::Loaded(settings) => {
            assert_eq!(settings.library_root, PathBuf::from("/data/photos"));
            assert_eq!(settings.template, "{{y}}/{{filename}}");
        }
        other => panic!("expected loaded settings, got {other:?}"),
    }
}

#[test]
#[serial]
fn env_config_pointing_nowhere_is_an_error() {
    let td = tempdir().unwrap();
    std::env::set_var(CONFIG_ENV, td.path().join("absent.xml"));
    let outcome = load_or_init();
    std::env::remove_var(CONFIG_ENV);
    assert!(outcome.is_err());
}

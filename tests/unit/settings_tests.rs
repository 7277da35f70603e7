//! Unit tests for settings loading

use crate::common::TestFixture;
use std::path::PathBuf;
use tabrecon::engine::{CompareMode, MismatchPolicy};
use tabrecon::error::SettingError;
use tabrecon::settings::{Settings, SettingsProvider};
use tabrecon::stats::ColumnSelection;

#[test]
fn test_settings_from_fixture_config() {
    let fixture = TestFixture::new().unwrap();
    let source = fixture.root().join("s.csv");
    let target = fixture.root().join("t.csv");
    let config = fixture
        .write_config(&source, &target, "[VALIDATION]\nMISMATCH_POLICY = lenient\n")
        .unwrap();

    let settings = Settings::load(&config).unwrap();
    assert_eq!(settings.source_file, Some(source));
    assert_eq!(settings.target_file, Some(target));
    assert!(!settings.logging.to_file);
    assert_eq!(settings.options.policy, MismatchPolicy::Lenient);
    assert_eq!(settings.options.mode, CompareMode::Aligned);
    assert_eq!(settings.options.numeric, Ok(ColumnSelection::AutoDiscover));
    assert_eq!(settings.options.report.html_path, fixture.report_path());
}

#[test]
fn test_defaults_for_optional_keys() {
    let provider = SettingsProvider::from_ini_str("[LOGGING]\nLOG_LEVEL = ERROR\n").unwrap();
    let settings = Settings::from_provider(&provider).unwrap();

    assert!(settings.logging.to_file);
    assert!(settings.logging.overwrite);
    assert_eq!(settings.logging.file, PathBuf::from("app.log"));
    assert_eq!(
        settings.options.report.html_path,
        PathBuf::from("assets/outputs/diff.html")
    );
    assert!(matches!(
        settings.options.numeric,
        Err(SettingError::MissingSection { .. })
    ));
}

#[test]
fn test_lookup_is_case_insensitive() {
    let provider =
        SettingsProvider::from_ini_str("[Column_Types]\nNumeric = a, b\n").unwrap();
    assert_eq!(provider.get("COLUMN_TYPES", "NUMERIC").unwrap(), "a, b");
}

#[test]
fn test_environment_overrides_file() {
    let fixture = TestFixture::new().unwrap();
    let config = fixture
        .write_config_raw("[LOGGING]\nLOG_LEVEL = INFO\n[EXTRA]\nMARKER = from-file\n")
        .unwrap();

    std::env::set_var("TABRECON_EXTRA__MARKER", "from-env");
    let provider = SettingsProvider::load(&config).unwrap();
    std::env::remove_var("TABRECON_EXTRA__MARKER");

    assert_eq!(provider.get("EXTRA", "MARKER").unwrap(), "from-env");
}

#[test]
fn test_bad_flag_value() {
    let provider = SettingsProvider::from_ini_str(
        "[LOGGING]\nLOG_LEVEL = INFO\nLOG_TO_FILE = yes\n",
    )
    .unwrap();
    let err = Settings::from_provider(&provider).unwrap_err();
    assert!(err.to_string().contains("LOG_TO_FILE"));
}

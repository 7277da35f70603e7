//! Edge case tests for configuration handling

use crate::common::{sample_data, CliTestRunner};
use tabrecon::ReconError;

#[test]
fn test_missing_config_file() {
    let runner = CliTestRunner::new().unwrap();
    let missing = runner.fixture().root().join("nope.ini");
    let missing_arg = missing.to_string_lossy().to_string();

    let error = runner.expect_failure(&["--config", missing_arg.as_str(), "run"]);
    assert!(matches!(error, ReconError::Config { .. }));
    assert!(error.to_string().contains("Config file not found"));
}

#[test]
fn test_missing_logging_section() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .write_config_raw("[INPUTS]\nSOURCE_FILE = a.csv\nTARGET_FILE = b.csv\n")
        .unwrap();

    let error = runner.run_with_config(&[]).unwrap_err();
    assert_eq!(
        error.to_string(),
        "The section, 'LOGGING', does not exist in the config file."
    );
}

#[test]
fn test_missing_inputs_without_cli_paths() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .write_config_raw("[LOGGING]\nLOG_LEVEL = INFO\nLOG_TO_FILE = 0\n")
        .unwrap();

    let error = runner.run_with_config(&[]).unwrap_err();
    assert!(error.to_string().contains("SOURCE_FILE"));
}

#[test]
fn test_cli_paths_replace_missing_inputs() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let source = fixture
        .create_csv("a.csv", &sample_data::simple_csv_data())
        .unwrap();
    let target = fixture
        .create_csv("b.csv", &sample_data::simple_csv_data())
        .unwrap();
    let report = fixture.report_path();
    fixture
        .write_config_raw(&format!(
            "[LOGGING]\nLOG_LEVEL = INFO\nLOG_TO_FILE = 0\n[OUTPUTS]\nREPORT_FILE = {}\n",
            report.display()
        ))
        .unwrap();

    let source_arg = source.to_string_lossy().to_string();
    let target_arg = target.to_string_lossy().to_string();
    let code = runner
        .run_with_config(&["--source", source_arg.as_str(), "--target", target_arg.as_str()])
        .unwrap();
    assert_eq!(code, tabrecon::EXIT_SUCCESS);
}

#[test]
fn test_invalid_log_level() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .write_config_raw("[LOGGING]\nLOG_LEVEL = CHATTY\n")
        .unwrap();

    let error = runner.run_with_config(&[]).unwrap_err();
    assert!(error.to_string().contains("LOG_LEVEL"));
}

#[test]
fn test_invalid_compare_mode_in_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let source = fixture.create_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    fixture
        .write_config(&source, &source, "[VALIDATION]\nCOMPARE_MODE = fuzzy\n")
        .unwrap();

    let error = runner.run_with_config(&[]).unwrap_err();
    assert!(error.to_string().contains("COMPARE_MODE"));
}

#[test]
fn test_family_setting_errors_do_not_fail_the_run() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let source = fixture.create_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    let target = fixture.create_csv("b.csv", &sample_data::simple_csv_data()).unwrap();
    fixture
        .write_config_raw(&format!(
            "[INPUTS]\nSOURCE_FILE = {}\nTARGET_FILE = {}\n\
             [LOGGING]\nLOG_LEVEL = INFO\nLOG_TO_FILE = 0\n\
             [COLUMN_TYPES]\nAUTO_NUMERIC_DISCOVER = 0\nAUTO_DATE_DISCOVER = 2\n\
             [OUTPUTS]\nREPORT_FILE = {}\n",
            source.display(),
            target.display(),
            fixture.report_path().display()
        ))
        .unwrap();

    assert_eq!(runner.run_with_config(&[]).unwrap(), tabrecon::EXIT_SUCCESS);
}

//! End-to-end runs through the command layer

use crate::common::{assertions, sample_data, CliTestRunner};
use std::fs;
use tabrecon::{EXIT_HALT, EXIT_SUCCESS};

fn setup(runner: &CliTestRunner, source: &[Vec<&str>], target: &[Vec<&str>], extra: &str) {
    let fixture = runner.fixture();
    let source = fixture.create_csv("source.csv", source).unwrap();
    let target = fixture.create_csv("target.csv", target).unwrap();
    fixture.write_config(&source, &target, extra).unwrap();
}

#[test]
fn test_identical_files_exit_cleanly_without_report() {
    let runner = CliTestRunner::new().unwrap();
    let data = sample_data::simple_csv_data();
    setup(&runner, &data, &data, "");

    runner.expect_exit(&[], EXIT_SUCCESS);
    assert!(!runner.fixture().report_path().exists());
}

#[test]
fn test_changed_value_writes_highlighted_report() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::price_changed_csv_data(),
        "",
    );

    runner.expect_exit(&[], EXIT_SUCCESS);

    let report = runner.fixture().report_path();
    assertions::assert_file_exists_and_not_empty(&report);
    assert_eq!(assertions::highlighted_cells(&report), 2);

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("price_source"));
    assert!(html.contains("price_target"));
    assert!(html.contains("<th class=\"row_heading\">1</th>"));
}

#[test]
fn test_row_count_mismatch_halts_by_default() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::shorter_csv_data(),
        "",
    );

    runner.expect_exit(&[], EXIT_HALT);
    assert!(!runner.fixture().report_path().exists());
}

#[test]
fn test_row_count_mismatch_continues_when_lenient() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::shorter_csv_data(),
        "",
    );

    runner.expect_exit(&["--policy", "lenient"], EXIT_SUCCESS);
}

#[test]
fn test_extra_column_halts() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::extra_column_csv_data(),
        "",
    );

    runner.expect_exit(&[], EXIT_HALT);
    assert!(!runner.fixture().report_path().exists());
}

#[test]
fn test_policy_from_config_file() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::extra_column_csv_data(),
        "[VALIDATION]\nMISMATCH_POLICY = lenient\n",
    );

    runner.expect_exit(&[], EXIT_SUCCESS);
    assert!(!runner.fixture().report_path().exists());
}

#[test]
fn test_row_set_mode_accepts_shuffled_rows() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::shuffled_csv_data(),
        "[VALIDATION]\nCOMPARE_MODE = row_set\n",
    );

    runner.expect_exit(&[], EXIT_SUCCESS);
    assert!(!runner.fixture().report_path().exists());
}

#[test]
fn test_aligned_mode_flags_shuffled_rows() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::shuffled_csv_data(),
        "",
    );

    runner.expect_exit(&[], EXIT_SUCCESS);
    assertions::assert_file_exists_and_not_empty(&runner.fixture().report_path());
}

#[test]
fn test_cli_output_overrides_and_json_report() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::price_changed_csv_data(),
        "",
    );

    let html = runner.fixture().root().join("custom").join("report.html");
    let json = runner.fixture().root().join("custom").join("report.json");
    let html_arg = html.to_string_lossy().to_string();
    let json_arg = json.to_string_lossy().to_string();

    runner.expect_exit(
        &["--output", html_arg.as_str(), "--json-output", json_arg.as_str()],
        EXIT_SUCCESS,
    );

    assertions::assert_file_exists_and_not_empty(&html);
    assert!(!runner.fixture().report_path().exists());

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    let record = &value["records"][0];
    assert_eq!(record["row"], 1);
    let price = record["cells"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["column"] == "price")
        .unwrap();
    assert_eq!(price["differs"], true);
    assert_eq!(price["source"], 0.75);
    assert_eq!(price["target"], 0.95);
}

#[test]
fn test_report_is_overwritten_between_runs() {
    let runner = CliTestRunner::new().unwrap();
    setup(
        &runner,
        &sample_data::simple_csv_data(),
        &sample_data::price_changed_csv_data(),
        "",
    );

    runner.expect_exit(&[], EXIT_SUCCESS);
    let first = fs::read_to_string(runner.fixture().report_path()).unwrap();
    runner.expect_exit(&[], EXIT_SUCCESS);
    let second = fs::read_to_string(runner.fixture().report_path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_inspect_command() {
    let runner = CliTestRunner::new().unwrap();
    let csv = runner
        .fixture()
        .create_csv("inspect.csv", &sample_data::simple_csv_data())
        .unwrap();
    let csv_arg = csv.to_string_lossy().to_string();

    let code = runner
        .run_command(&["inspect", csv_arg.as_str(), "--format", "json"])
        .unwrap();
    assert_eq!(code, EXIT_SUCCESS);
}

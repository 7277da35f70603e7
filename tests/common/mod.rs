//! Common test utilities and helpers

use std::fs;
use std::path::{Path, PathBuf};
use tabrecon::Result;
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a test CSV file with sample data
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut content = String::new();

        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test CSV file with raw string content
    pub fn create_csv_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Where runs in this fixture write their HTML report
    pub fn report_path(&self) -> PathBuf {
        self.root().join("assets").join("outputs").join("diff.html")
    }

    /// Write a settings file pointing at the given inputs, with logging to
    /// stderr only. `extra` is appended verbatim.
    pub fn write_config(&self, source: &Path, target: &Path, extra: &str) -> Result<PathBuf> {
        let content = format!(
            "[INPUTS]\nSOURCE_FILE = {}\nTARGET_FILE = {}\n\n\
             [LOGGING]\nLOG_LEVEL = INFO\nLOG_TO_FILE = 0\n\n\
             [COLUMN_TYPES]\nAUTO_NUMERIC_DISCOVER = 1\nAUTO_DATE_DISCOVER = 1\n\n\
             [OUTPUTS]\nREPORT_FILE = {}\n\n{}",
            source.display(),
            target.display(),
            self.report_path().display(),
            extra
        );
        self.write_config_raw(&content)
    }

    pub fn write_config_raw(&self, content: &str) -> Result<PathBuf> {
        let path = self.root().join("config.ini");
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a tabrecon command and return its exit code
    pub fn run_command(&self, args: &[&str]) -> Result<i32> {
        use clap::Parser;
        use tabrecon::cli::Cli;
        use tabrecon::commands::execute_command;

        let mut cmd_args = vec!["tabrecon"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| tabrecon::ReconError::invalid_input(e.to_string()))?;

        execute_command(cli.command, &cli.config, cli.verbose)
    }

    /// Run `run` against the fixture's config.ini
    pub fn run_with_config(&self, extra_args: &[&str]) -> Result<i32> {
        let config = self.fixture.root().join("config.ini");
        let config = config.to_string_lossy().to_string();
        let mut args = vec!["--config", config.as_str(), "run", "--format", "json"];
        args.extend(extra_args);
        self.run_command(&args)
    }

    /// Run a command and expect the given exit code
    pub fn expect_exit(&self, extra_args: &[&str], code: i32) {
        let actual = self.run_with_config(extra_args).expect("Command should run");
        assert_eq!(actual, code, "unexpected exit code");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> tabrecon::ReconError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Sample data generators for testing
pub mod sample_data {
    pub fn simple_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "sold_on"],
            vec!["1", "Apple", "1.50", "2024-01-01"],
            vec!["2", "Banana", "0.75", "2024-01-02"],
            vec!["3", "Cherry", "2.00", "2024-01-03"],
        ]
    }

    pub fn price_changed_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "sold_on"],
            vec!["1", "Apple", "1.50", "2024-01-01"],
            vec!["2", "Banana", "0.95", "2024-01-02"], // Price changed
            vec!["3", "Cherry", "2.00", "2024-01-03"],
        ]
    }

    pub fn extra_column_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "sold_on", "category"], // New column
            vec!["1", "Apple", "1.50", "2024-01-01", "Fruit"],
            vec!["2", "Banana", "0.75", "2024-01-02", "Fruit"],
            vec!["3", "Cherry", "2.00", "2024-01-03", "Fruit"],
        ]
    }

    pub fn shorter_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "sold_on"],
            vec!["1", "Apple", "1.50", "2024-01-01"],
            vec!["2", "Banana", "0.75", "2024-01-02"],
        ]
    }

    pub fn shuffled_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "sold_on"],
            vec!["3", "Cherry", "2.00", "2024-01-03"],
            vec!["1", "Apple", "1.50", "2024-01-01"],
            vec!["2", "Banana", "0.75", "2024-01-02"],
        ]
    }
}

/// Assertion helpers for test validation
pub mod assertions {
    use std::path::Path;

    /// Assert that a file exists and is not empty
    pub fn assert_file_exists_and_not_empty(path: &Path) {
        assert!(path.exists(), "File should exist: {}", path.display());
        let metadata = std::fs::metadata(path).expect("Should be able to read file metadata");
        assert!(metadata.len() > 0, "File should not be empty: {}", path.display());
    }

    /// Count highlighted cells in a rendered report
    pub fn highlighted_cells(path: &Path) -> usize {
        let html = std::fs::read_to_string(path).expect("Should be able to read report");
        html.matches("background-color: yellow").count()
    }
}

//! # tabrecon
//!
//! Reconciles two tabular datasets: row counts, column sets, cell-level
//! differences (with a highlighted HTML report), and min/max/median checks
//! over numeric and date columns.

pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod html;
pub mod loader;
pub mod logging;
pub mod output;
pub mod progress;
pub mod report;
pub mod runlog;
pub mod settings;
pub mod stats;
pub mod table;

pub use engine::{ProcessOutcome, ReconcileOptions, Reconciler};
pub use error::{ReconError, Result};
pub use runlog::RunLog;
pub use table::{CellValue, Column, ColumnType, Table};

/// Settings file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Difference report written when `OUTPUTS.REPORT_FILE` is not set
pub const DEFAULT_REPORT_PATH: &str = "assets/outputs/diff.html";

/// Log file used when `LOGGING.LOG_FILE` is not set
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Exit code of a run that completed, with or without warnings
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code of a run stopped by a halting check
pub const EXIT_HALT: i32 = 1;

/// Exit code for configuration, I/O and parse errors
pub const EXIT_ERROR: i32 = 2;

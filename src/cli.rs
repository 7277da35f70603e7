//! Command-line interface for tabrecon

use crate::engine::{CompareMode, MismatchPolicy};
use crate::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Reconcile two tabular datasets and report their differences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (INI)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a source dataset against a target dataset
    Run {
        /// Source file (overrides INPUTS.SOURCE_FILE)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Target file (overrides INPUTS.TARGET_FILE)
        #[arg(long)]
        target: Option<PathBuf>,

        /// HTML difference report path (overrides OUTPUTS.REPORT_FILE)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write the differences as JSON
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Mismatch policy: "strict" or "lenient"
        #[arg(long, value_parser = MismatchPolicy::parse)]
        policy: Option<MismatchPolicy>,

        /// Compare mode: "aligned" or "row_set"
        #[arg(long, value_parser = CompareMode::parse)]
        mode: Option<CompareMode>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show the row count and detected column types of a file
    Inspect {
        /// Input file path
        input: PathBuf,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

//! Output formatting utilities

use crate::engine::{ProcessOutcome, StageStatus, StatisticKind};
use crate::error::Result;
use crate::loader::ColumnInfo;
use serde::Serialize;
use std::path::Path;

/// Pretty printer for tabrecon output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the stage-by-stage result of a run
    pub fn print_outcome(outcome: &ProcessOutcome) {
        println!("📊 tabrecon run {}", outcome.run_id);
        println!(
            "├─ Policy: {}, mode: {}",
            outcome.policy.as_str(),
            outcome.mode.as_str()
        );
        println!(
            "├─ Rows: source {}, target {}",
            outcome.row_counts.source, outcome.row_counts.target
        );

        for stage in &outcome.stages {
            println!(
                "├─ {} {}: {}",
                status_marker(stage.status),
                stage.stage,
                stage.message
            );
        }

        if !outcome.column_diff.missing_in_target.is_empty() {
            println!(
                "│  └─ Missing from target: {}",
                join(&outcome.column_diff.missing_in_target)
            );
        }
        if !outcome.column_diff.missing_in_source.is_empty() {
            println!(
                "│  └─ Missing from source: {}",
                join(&outcome.column_diff.missing_in_source)
            );
        }

        let mismatched: Vec<_> = outcome.statistics.iter().filter(|s| !s.matched).collect();
        if !mismatched.is_empty() {
            println!("├─ Statistic mismatches: {}", mismatched.len());
            for (i, check) in mismatched.iter().enumerate() {
                let prefix = if i == mismatched.len() - 1 { "│  └─" } else { "│  ├─" };
                let kind = match check.kind {
                    StatisticKind::Range => "range",
                    StatisticKind::Median => "median",
                };
                println!(
                    "{} {} {}: {} → {}",
                    prefix, check.column, kind, check.source, check.target
                );
            }
        }

        if let Some(path) = &outcome.report_path {
            println!("├─ 💾 Report: {}", path.display());
        }
        if let Some(path) = &outcome.json_report_path {
            println!("├─ 💾 JSON report: {}", path.display());
        }

        let verdict = match outcome.status() {
            StageStatus::Pass => "✅ Datasets reconcile",
            StageStatus::Warn => "🟡 Completed with warnings",
            StageStatus::Halt => "❌ Halted",
        };
        println!("└─ {}", verdict);
    }

    /// Print the detected layout of a single file
    pub fn print_inspection(path: &Path, row_count: usize, columns: &[ColumnInfo]) {
        println!("📄 {}", path.display());
        println!("├─ Rows: {}", row_count);
        println!("└─ Columns: {}", columns.len());
        for (i, column) in columns.iter().enumerate() {
            let prefix = if i == columns.len() - 1 { "   └─" } else { "   ├─" };
            println!(
                "{} {}: {} ({})",
                prefix, column.name, column.column_type, column.data_type
            );
        }
    }
}

fn status_marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pass => "✅",
        StageStatus::Warn => "🟡",
        StageStatus::Halt => "❌",
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    pub fn format_inspection(
        path: &Path,
        row_count: usize,
        columns: &[ColumnInfo],
    ) -> Result<String> {
        let json = serde_json::json!({
            "file": path.display().to_string(),
            "row_count": row_count,
            "columns": columns,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

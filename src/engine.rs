//! Reconciliation engine: the ordered validation pipeline.
//!
//! Stages run in a fixed order (row counts, column sets, cell-level data,
//! numeric statistics, date statistics). Each stage records a
//! [`StageOutcome`]; a halting stage stops the pipeline and the accumulated
//! [`ProcessOutcome`] is returned to the caller, which decides the exit code.

use crate::error::{ReconError, Result};
use crate::html::ReportTable;
use crate::report::{build_report, compare_row_sets, DiffMask, MergeSide};
use crate::runlog::RunLog;
use crate::stats::{
    format_median, median, min_max, require_column, ColumnFamily, ColumnSelection,
    FamilySelection,
};
use crate::table::Table;
use crate::{DEFAULT_REPORT_PATH, EXIT_HALT, EXIT_SUCCESS};
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What to do when the structural checks find a mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Stop the pipeline
    #[default]
    Strict,
    /// Warn and keep going
    Lenient,
}

impl MismatchPolicy {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            _ => Err(format!(
                "Invalid mismatch policy: {}. Use 'strict' or 'lenient'",
                s
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    fn on_mismatch(self) -> StageStatus {
        match self {
            Self::Strict => StageStatus::Halt,
            Self::Lenient => StageStatus::Warn,
        }
    }
}

/// How the data stage compares rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Cell by cell, rows aligned by label
    #[default]
    Aligned,
    /// Rows matched by content regardless of position
    RowSet,
}

impl CompareMode {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "aligned" => Ok(Self::Aligned),
            "row_set" | "rowset" => Ok(Self::RowSet),
            _ => Err(format!(
                "Invalid compare mode: {}. Use 'aligned' or 'row_set'",
                s
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aligned => "aligned",
            Self::RowSet => "row_set",
        }
    }
}

/// Where difference reports are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub html_path: PathBuf,
    pub json_path: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            html_path: PathBuf::from(DEFAULT_REPORT_PATH),
            json_path: None,
        }
    }
}

/// Everything the engine needs besides the two tables
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOptions {
    pub policy: MismatchPolicy,
    pub mode: CompareMode,
    pub numeric: FamilySelection,
    pub date: FamilySelection,
    pub report: ReportOptions,
}

impl ReconcileOptions {
    pub fn selection(&self, family: ColumnFamily) -> &FamilySelection {
        match family {
            ColumnFamily::Numeric => &self.numeric,
            ColumnFamily::Date => &self.date,
        }
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            policy: MismatchPolicy::default(),
            mode: CompareMode::default(),
            numeric: Ok(ColumnSelection::AutoDiscover),
            date: Ok(ColumnSelection::AutoDiscover),
            report: ReportOptions::default(),
        }
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RowCount,
    Columns,
    Data,
    NumericStats,
    DateStats,
}

impl Stage {
    fn for_family(family: ColumnFamily) -> Self {
        match family {
            ColumnFamily::Numeric => Self::NumericStats,
            ColumnFamily::Date => Self::DateStats,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RowCount => "Row count",
            Self::Columns => "Columns",
            Self::Data => "Data",
            Self::NumericStats => "Numeric statistics",
            Self::DateStats => "Date statistics",
        };
        f.write_str(name)
    }
}

/// Result of one stage. Ordered so the worst status wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pass,
    Warn,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub source: usize,
    pub target: usize,
}

/// Column names present on one side only, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnDiff {
    pub missing_in_target: BTreeSet<String>,
    pub missing_in_source: BTreeSet<String>,
}

impl ColumnDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_in_target.is_empty() && self.missing_in_source.is_empty()
    }
}

/// Size of the data-stage findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DifferenceSummary {
    /// Rows with at least one differing cell (aligned mode)
    pub rows: usize,
    /// Differing cells (aligned mode)
    pub cells: usize,
    /// Rows found only in the source (row-set mode)
    pub source_only: usize,
    /// Rows found only in the target (row-set mode)
    pub target_only: usize,
    /// Row labels of the reported rows
    pub row_labels: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    Range,
    Median,
}

/// One source/target statistic comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticCheck {
    pub family: ColumnFamily,
    pub kind: StatisticKind,
    pub column: String,
    pub source: String,
    pub target: String,
    pub matched: bool,
}

/// Accumulated result of a reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub run_id: Uuid,
    pub policy: MismatchPolicy,
    pub mode: CompareMode,
    pub stages: Vec<StageOutcome>,
    pub row_counts: RowCounts,
    pub column_diff: ColumnDiff,
    pub differences: Option<DifferenceSummary>,
    pub report_path: Option<PathBuf>,
    pub json_report_path: Option<PathBuf>,
    pub statistics: Vec<StatisticCheck>,
}

impl ProcessOutcome {
    fn new(policy: MismatchPolicy, mode: CompareMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            policy,
            mode,
            stages: Vec::new(),
            row_counts: RowCounts::default(),
            column_diff: ColumnDiff::default(),
            differences: None,
            report_path: None,
            json_report_path: None,
            statistics: Vec::new(),
        }
    }

    fn push(
        &mut self,
        stage: Stage,
        status: StageStatus,
        message: impl Into<String>,
    ) -> StageStatus {
        self.stages.push(StageOutcome {
            stage,
            status,
            message: message.into(),
        });
        status
    }

    /// Worst status over all stages that ran
    pub fn status(&self) -> StageStatus {
        self.stages
            .iter()
            .map(|s| s.status)
            .max()
            .unwrap_or(StageStatus::Pass)
    }

    pub fn halted(&self) -> bool {
        self.status() == StageStatus::Halt
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn exit_code(&self) -> i32 {
        if self.halted() {
            EXIT_HALT
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Holds the two tables and runs the validation pipeline over them
#[derive(Debug)]
pub struct Reconciler {
    source: Table,
    target: Table,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(source: Table, target: Table, options: ReconcileOptions) -> Self {
        Self {
            source,
            target,
            options,
        }
    }

    pub fn source(&self) -> &Table {
        &self.source
    }

    pub fn target(&self) -> &Table {
        &self.target
    }

    /// Run every stage in order, stopping at the first halt.
    ///
    /// Halts are part of the returned outcome. `Err` is reserved for
    /// failures outside the checks themselves, such as an unwritable report.
    pub fn reconcile(&mut self, log: &mut RunLog) -> Result<ProcessOutcome> {
        let mut outcome = ProcessOutcome::new(self.options.policy, self.options.mode);
        log.debug(format!(
            "Reconciling with policy '{}' in '{}' mode",
            self.options.policy.as_str(),
            self.options.mode.as_str()
        ));

        if self.check_row_counts(log, &mut outcome) == StageStatus::Halt {
            return Ok(outcome);
        }

        if self.check_columns(log, &mut outcome) == StageStatus::Halt {
            return Ok(outcome);
        }

        match self.options.mode {
            CompareMode::Aligned => self.check_data(log, &mut outcome)?,
            CompareMode::RowSet => self.check_row_set(log, &mut outcome)?,
        };

        for family in [ColumnFamily::Numeric, ColumnFamily::Date] {
            if self.check_family(family, log, &mut outcome) == StageStatus::Halt {
                break;
            }
        }

        Ok(outcome)
    }

    fn check_row_counts(&self, log: &mut RunLog, outcome: &mut ProcessOutcome) -> StageStatus {
        let counts = RowCounts {
            source: self.source.row_count(),
            target: self.target.row_count(),
        };
        outcome.row_counts = counts;

        log.info(format!("Source record count: {}", counts.source));
        log.info(format!("Target record count: {}", counts.target));

        if counts.source == counts.target {
            log.info("Row counts are the same.");
            return outcome.push(
                Stage::RowCount,
                StageStatus::Pass,
                format!("{} rows on both sides", counts.source),
            );
        }

        log.error("Row counts are different.");
        let status = self.options.policy.on_mismatch();
        if status == StageStatus::Warn {
            log.warning("Continuing despite the row count mismatch.");
        }
        outcome.push(
            Stage::RowCount,
            status,
            format!("source has {} rows, target has {}", counts.source, counts.target),
        )
    }

    fn check_columns(&self, log: &mut RunLog, outcome: &mut ProcessOutcome) -> StageStatus {
        log.info(format!("Source columns: {}.", self.source.column_count()));
        log.info(format!("Target columns: {}.", self.target.column_count()));

        if self.source.column_count() == self.target.column_count() {
            log.info("Column counts are the same.");
        } else {
            log.error("Column counts are different.");
        }

        let source_set = self.source.column_set();
        let target_set = self.target.column_set();
        let diff = ColumnDiff {
            missing_in_target: source_set.difference(&target_set).cloned().collect(),
            missing_in_source: target_set.difference(&source_set).cloned().collect(),
        };

        if !diff.missing_in_target.is_empty() {
            log.error(format!(
                "Columns in the source dataset that are missing from the target dataset: {:?}",
                diff.missing_in_target
            ));
        }
        if !diff.missing_in_source.is_empty() {
            log.error(format!(
                "Columns in the target dataset that are missing from the source dataset: {:?}",
                diff.missing_in_source
            ));
        }

        let status = if diff.is_empty() {
            log.info("All column names match and there are no missing columns.");
            outcome.push(
                Stage::Columns,
                StageStatus::Pass,
                format!("{} shared columns", source_set.len()),
            )
        } else {
            let status = self.options.policy.on_mismatch();
            if status == StageStatus::Warn {
                log.warning("Continuing despite the column mismatch.");
            }
            outcome.push(
                Stage::Columns,
                status,
                format!(
                    "{} missing from target, {} missing from source",
                    diff.missing_in_target.len(),
                    diff.missing_in_source.len()
                ),
            )
        };

        outcome.column_diff = diff;
        status
    }

    /// Guard shared by both data-stage modes
    fn same_columns(&self, log: &mut RunLog, outcome: &mut ProcessOutcome) -> bool {
        if self.source.column_set() == self.target.column_set() {
            return true;
        }
        log.warning("Datasets do not have the same columns.");
        outcome.push(
            Stage::Data,
            StageStatus::Warn,
            "skipped: column sets differ",
        );
        false
    }

    fn check_data(&mut self, log: &mut RunLog, outcome: &mut ProcessOutcome) -> Result<()> {
        if !self.same_columns(log, outcome) {
            return Ok(());
        }

        let orphans = self.source.labels_missing_from(&self.target);
        if !orphans.is_empty() {
            log.warning(format!(
                "Source rows with no target counterpart are excluded from the comparison: {:?}",
                orphans
            ));
        }

        self.source = self.source.reindex_like(&self.target);
        let mask = DiffMask::compute(&self.source, &self.target)?;
        let rows = mask.rows_with_differences();

        if rows.is_empty() {
            log.info("There are no differences between the datasets.");
            outcome.push(Stage::Data, StageStatus::Pass, "no differences");
            return Ok(());
        }

        log.warning("There are differences between the datasets.");
        let report = build_report(&self.source, &self.target, &mask, &rows);
        log.debug(format!(
            "{} rows and {} cells differ",
            rows.len(),
            mask.cell_count()
        ));

        self.write_reports(&report.to_table(), &report, log, outcome)?;

        outcome.differences = Some(DifferenceSummary {
            rows: rows.len(),
            cells: mask.cell_count(),
            row_labels: report.row_labels(),
            ..DifferenceSummary::default()
        });
        outcome.push(
            Stage::Data,
            StageStatus::Warn,
            format!("{} rows with differences", rows.len()),
        );
        Ok(())
    }

    fn check_row_set(&mut self, log: &mut RunLog, outcome: &mut ProcessOutcome) -> Result<()> {
        if !self.same_columns(log, outcome) {
            return Ok(());
        }

        let unmatched = compare_row_sets(&self.source, &self.target);
        if unmatched.is_empty() {
            log.info("There are no differences between the datasets.");
            outcome.push(Stage::Data, StageStatus::Pass, "no differences");
            return Ok(());
        }

        let source_only = unmatched.count(MergeSide::LeftOnly);
        let target_only = unmatched.count(MergeSide::RightOnly);
        log.warning("There are differences between the datasets.");
        log.info(format!(
            "Rows only in the source: {}. Rows only in the target: {}.",
            source_only, target_only
        ));

        self.write_reports(&unmatched.to_table(), &unmatched, log, outcome)?;

        outcome.differences = Some(DifferenceSummary {
            source_only,
            target_only,
            row_labels: unmatched.rows.iter().map(|r| r.row).collect(),
            ..DifferenceSummary::default()
        });
        outcome.push(
            Stage::Data,
            StageStatus::Warn,
            format!(
                "{} rows only in source, {} rows only in target",
                source_only, target_only
            ),
        );
        Ok(())
    }

    fn write_reports<T: Serialize>(
        &self,
        table: &ReportTable,
        findings: &T,
        log: &mut RunLog,
        outcome: &mut ProcessOutcome,
    ) -> Result<()> {
        let html_path = &self.options.report.html_path;
        table.write_html(html_path)?;
        log.info(format!(
            "Differences highlighted and saved to {}",
            html_path.display()
        ));
        outcome.report_path = Some(html_path.clone());

        if let Some(json_path) = &self.options.report.json_path {
            write_json(json_path, findings)?;
            log.info(format!("Difference report saved as JSON to {}", json_path.display()));
            outcome.json_report_path = Some(json_path.clone());
        }
        Ok(())
    }

    fn check_family(
        &self,
        family: ColumnFamily,
        log: &mut RunLog,
        outcome: &mut ProcessOutcome,
    ) -> StageStatus {
        let stage = Stage::for_family(family);
        let noun = family.to_string().to_lowercase();

        let selection = match self.options.selection(family) {
            Ok(selection) => selection,
            Err(e) => {
                log.error(format!("Error while retrieving the {}-type columns: {}", noun, e));
                return outcome.push(stage, StageStatus::Warn, format!("skipped: {}", e));
            }
        };

        let columns = selection.resolve(family, &self.source);
        if columns.is_empty() {
            log.info(format!("There are no {} columns to check.", noun));
            return outcome.push(stage, StageStatus::Pass, "no columns selected");
        }

        log.info(format!(
            "Checking the MIN and MAX values for these {} columns: {:?}",
            family, columns
        ));
        let mut mismatches = match self.check_ranges(family, &columns, log, outcome) {
            Ok(count) => count,
            Err(e) => {
                log.error(format!("Error while checking the {} value ranges: {}", noun, e));
                return outcome.push(stage, StageStatus::Warn, format!("skipped: {}", e));
            }
        };

        if family == ColumnFamily::Numeric {
            log.info(format!(
                "Checking the median values for these columns: {:?}",
                columns
            ));
            match self.check_medians(&columns, log, outcome) {
                Ok(count) => mismatches += count,
                Err(e) => {
                    log.critical(format!("Error during median check: {}", e));
                    let message = format!("median failed: {}", e);
                    return outcome.push(stage, StageStatus::Halt, message);
                }
            }
        }

        if mismatches == 0 {
            outcome.push(
                stage,
                StageStatus::Pass,
                format!("{} columns checked", columns.len()),
            )
        } else {
            outcome.push(
                stage,
                StageStatus::Warn,
                format!("{} mismatches across {} columns", mismatches, columns.len()),
            )
        }
    }

    /// Compare min/max per column; returns the number of mismatches
    fn check_ranges(
        &self,
        family: ColumnFamily,
        columns: &[String],
        log: &mut RunLog,
        outcome: &mut ProcessOutcome,
    ) -> Result<usize> {
        let mut mismatches = 0;
        for name in columns {
            let source = min_max(require_column(&self.source, "source", name)?)?;
            let target = min_max(require_column(&self.target, "target", name)?)?;
            let matched = source == target;

            if matched {
                log.info(format!(
                    "The min and max values match for column {}: Source: {}, Target: {}",
                    name, source, target
                ));
            } else {
                mismatches += 1;
                log.warning(format!(
                    "Value range mismatch in column {}: Source: {}, Target: {}",
                    name, source, target
                ));
            }

            outcome.statistics.push(StatisticCheck {
                family,
                kind: StatisticKind::Range,
                column: name.clone(),
                source: source.to_string(),
                target: target.to_string(),
                matched,
            });
        }
        Ok(mismatches)
    }

    fn check_medians(
        &self,
        columns: &[String],
        log: &mut RunLog,
        outcome: &mut ProcessOutcome,
    ) -> Result<usize> {
        let mut mismatches = 0;
        for name in columns {
            let source = median(require_column(&self.source, "source", name)?)?;
            let target = median(require_column(&self.target, "target", name)?)?;
            let matched = source == target;
            let (source_text, target_text) = (format_median(source), format_median(target));

            if matched {
                log.info(format!(
                    "The median values matched for column {}: Source: {}, Target: {}",
                    name, source_text, target_text
                ));
            } else {
                mismatches += 1;
                log.warning(format!(
                    "Median mismatch in column {}: Source: {}, Target: {}",
                    name, source_text, target_text
                ));
            }

            outcome.statistics.push(StatisticCheck {
                family: ColumnFamily::Numeric,
                kind: StatisticKind::Median,
                column: name.clone(),
                source: source_text,
                target: target_text,
                matched,
            });
        }
        Ok(mismatches)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| ReconError::Report {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

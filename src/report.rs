//! Difference detection and side-by-side difference reports

use crate::error::{ReconError, Result};
use crate::html::ReportTable;
use crate::table::{CellValue, Table};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Suffix of the source half of a column pair
pub const SOURCE_SUFFIX: &str = "_source";
/// Suffix of the target half of a column pair
pub const TARGET_SUFFIX: &str = "_target";
/// Indicator column of a row-set report
pub const MERGE_COLUMN: &str = "_merge";

/// Elementwise inequality mask between two aligned tables
#[derive(Debug, Clone, PartialEq)]
pub struct DiffMask {
    index: Vec<usize>,
    columns: IndexMap<String, Vec<bool>>,
}

impl DiffMask {
    /// Compare two tables that share row labels and column order
    pub fn compute(source: &Table, target: &Table) -> Result<Self> {
        if source.index() != target.index() || source.column_names() != target.column_names() {
            return Err(ReconError::data_processing(
                "Tables must be aligned before computing differences",
            ));
        }

        let mut columns = IndexMap::with_capacity(target.column_count());
        for target_column in target.columns() {
            // presence checked by the alignment test above
            let source_column = source
                .column(&target_column.name)
                .ok_or_else(|| ReconError::column_not_found("source", &target_column.name))?;
            let flags = source_column
                .values
                .iter()
                .zip(&target_column.values)
                .map(|(a, b)| a != b)
                .collect();
            columns.insert(target_column.name.clone(), flags);
        }

        Ok(Self {
            index: target.index().to_vec(),
            columns,
        })
    }

    /// Whether the cell at a row position differs
    pub fn is_set(&self, row: usize, column: &str) -> bool {
        self.columns
            .get(column)
            .and_then(|flags| flags.get(row).copied())
            .unwrap_or(false)
    }

    /// Positions of rows where any column differs, in table order
    pub fn rows_with_differences(&self) -> Vec<usize> {
        (0..self.index.len())
            .filter(|row| self.columns.values().any(|flags| flags[*row]))
            .collect()
    }

    /// Number of differing cells
    pub fn cell_count(&self) -> usize {
        self.columns
            .values()
            .map(|flags| flags.iter().filter(|f| **f).count())
            .sum()
    }
}

/// Source and target value of one column within a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPair {
    pub column: String,
    pub source: CellValue,
    pub target: CellValue,
    pub differs: bool,
}

/// One row that has at least one differing column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceRecord {
    pub row: usize,
    pub cells: Vec<CellPair>,
}

impl DifferenceRecord {
    pub fn cell(&self, column: &str) -> Option<&CellPair> {
        self.cells.iter().find(|c| c.column == column)
    }
}

/// Side-by-side report of differing rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceReport {
    pub columns: Vec<String>,
    pub records: Vec<DifferenceRecord>,
}

/// Build the difference report for the given row positions.
///
/// Rows follow the target order; every shared column expands into an
/// adjacent `_source`/`_target` pair.
pub fn build_report(
    aligned_source: &Table,
    aligned_target: &Table,
    mask: &DiffMask,
    rows_with_diff: &[usize],
) -> DifferenceReport {
    let columns: Vec<String> = aligned_target
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let records = rows_with_diff
        .iter()
        .map(|&row| DifferenceRecord {
            row: aligned_target.index()[row],
            cells: columns
                .iter()
                .map(|column| CellPair {
                    column: column.clone(),
                    source: aligned_source
                        .value(row, column)
                        .cloned()
                        .unwrap_or(CellValue::Null),
                    target: aligned_target
                        .value(row, column)
                        .cloned()
                        .unwrap_or(CellValue::Null),
                    differs: mask.is_set(row, column),
                })
                .collect(),
        })
        .collect();

    DifferenceReport { columns, records }
}

impl DifferenceReport {
    /// Output column headers, each column doubled
    pub fn headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| [format!("{}{}", c, SOURCE_SUFFIX), format!("{}{}", c, TARGET_SUFFIX)])
            .collect()
    }

    /// Highlight flags aligned with `headers()`, one row per record
    pub fn highlight_mask(&self) -> Vec<Vec<bool>> {
        self.records
            .iter()
            .map(|r| r.cells.iter().flat_map(|c| [c.differs, c.differs]).collect())
            .collect()
    }

    pub fn row_labels(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.row).collect()
    }

    pub fn to_table(&self) -> ReportTable {
        ReportTable {
            title: "Dataset differences".to_string(),
            headers: self.headers(),
            index: self.row_labels(),
            cells: self
                .records
                .iter()
                .map(|r| {
                    r.cells
                        .iter()
                        .flat_map(|c| [c.source.to_string(), c.target.to_string()])
                        .collect()
                })
                .collect(),
            highlights: self.highlight_mask(),
        }
    }
}

/// Which table an unmatched row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeSide {
    LeftOnly,
    RightOnly,
}

impl MergeSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftOnly => "left_only",
            Self::RightOnly => "right_only",
        }
    }
}

/// A row with no content match on the other side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRow {
    pub side: MergeSide,
    pub row: usize,
    pub values: Vec<CellValue>,
}

/// Rows present in only one table, matched on all shared columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRows {
    pub columns: Vec<String>,
    pub rows: Vec<UnmatchedRow>,
}

/// Compare two tables as sets of rows. Position is ignored; a row matches if
/// any row on the other side has equal values in every shared column.
/// Source-only rows come first in source order, then target-only rows.
pub fn compare_row_sets(source: &Table, target: &Table) -> UnmatchedRows {
    let columns: Vec<String> = target
        .column_names()
        .into_iter()
        .filter(|name| source.column(name).is_some())
        .map(str::to_string)
        .collect();

    let row_values = |table: &Table, row: usize| -> Vec<CellValue> {
        columns
            .iter()
            .map(|c| table.value(row, c).cloned().unwrap_or(CellValue::Null))
            .collect()
    };
    let row_key = |values: &[CellValue]| -> Vec<String> {
        values.iter().map(CellValue::canonical_key).collect()
    };

    let source_rows: Vec<Vec<CellValue>> = (0..source.row_count())
        .map(|r| row_values(source, r))
        .collect();
    let target_rows: Vec<Vec<CellValue>> = (0..target.row_count())
        .map(|r| row_values(target, r))
        .collect();

    let source_keys: HashSet<Vec<String>> =
        source_rows.iter().map(|v| row_key(v.as_slice())).collect();
    let target_keys: HashSet<Vec<String>> =
        target_rows.iter().map(|v| row_key(v.as_slice())).collect();

    let mut rows = Vec::new();
    for (pos, values) in source_rows.into_iter().enumerate() {
        if !target_keys.contains(&row_key(values.as_slice())) {
            rows.push(UnmatchedRow {
                side: MergeSide::LeftOnly,
                row: source.index()[pos],
                values,
            });
        }
    }
    for (pos, values) in target_rows.into_iter().enumerate() {
        if !source_keys.contains(&row_key(values.as_slice())) {
            rows.push(UnmatchedRow {
                side: MergeSide::RightOnly,
                row: target.index()[pos],
                values,
            });
        }
    }

    UnmatchedRows { columns, rows }
}

impl UnmatchedRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, side: MergeSide) -> usize {
        self.rows.iter().filter(|r| r.side == side).count()
    }

    pub fn to_table(&self) -> ReportTable {
        let mut headers = self.columns.clone();
        headers.push(MERGE_COLUMN.to_string());

        ReportTable {
            title: "Unmatched rows".to_string(),
            index: self.rows.iter().map(|r| r.row).collect(),
            cells: self
                .rows
                .iter()
                .map(|r| {
                    r.values
                        .iter()
                        .map(CellValue::to_string)
                        .chain(std::iter::once(r.side.as_str().to_string()))
                        .collect()
                })
                .collect(),
            highlights: self.rows.iter().map(|_| vec![false; headers.len()]).collect(),
            headers,
        }
    }
}

//! Column-family statistics: discovery, min/max and median

use crate::error::{ReconError, Result, SettingError};
use crate::table::{CellValue, Column, ColumnType, Table};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Families of columns that get statistical sanity checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnFamily {
    Numeric,
    Date,
}

impl ColumnFamily {
    /// Whether a declared column type belongs to this family
    pub fn accepts(self, dtype: ColumnType) -> bool {
        match self {
            Self::Numeric => dtype.is_numeric(),
            Self::Date => dtype.is_temporal(),
        }
    }
}

impl fmt::Display for ColumnFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("Numeric"),
            Self::Date => f.write_str("Date"),
        }
    }
}

/// How the columns of a family are chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Infer from the declared types of the source table
    AutoDiscover,
    /// Use exactly these column names
    ExplicitList(Vec<String>),
}

/// A family's selection as resolved from configuration. An invalid or
/// missing setting is kept so the statistics stage can report it.
pub type FamilySelection = std::result::Result<ColumnSelection, SettingError>;

impl ColumnSelection {
    /// Build a selection from a discovery flag ("0"/"1") and an optional list
    /// lookup. The list is only consulted when discovery is off.
    pub fn from_flag<F>(section: &str, flag_key: &str, flag: &str, list: F) -> FamilySelection
    where
        F: FnOnce() -> std::result::Result<String, SettingError>,
    {
        match flag.trim() {
            "1" => Ok(Self::AutoDiscover),
            "0" => Ok(Self::ExplicitList(parse_column_list(&list()?))),
            other => Err(SettingError::invalid_value(section, flag_key, other)),
        }
    }

    /// Resolve the concrete column names for a family
    pub fn resolve(&self, family: ColumnFamily, source: &Table) -> Vec<String> {
        match self {
            Self::AutoDiscover => source
                .columns()
                .filter(|c| family.accepts(c.dtype))
                .map(|c| c.name.clone())
                .collect(),
            Self::ExplicitList(names) => names.clone(),
        }
    }
}

/// Split a comma-separated list of column names, trimming whitespace and
/// dropping empty items
pub fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Minimum and maximum of a column, nulls skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: CellValue,
    pub max: CellValue,
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(min: {}, max: {})", self.min, self.max)
    }
}

/// Look up a column or fail naming the side it was expected on
pub fn require_column<'a>(table: &'a Table, side: &str, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .ok_or_else(|| ReconError::column_not_found(side, name))
}

/// Min and max of the non-null values, NaN skipped. An all-null column
/// yields nulls.
pub fn min_max(column: &Column) -> Result<ValueRange> {
    let mut min: Option<&CellValue> = None;
    let mut max: Option<&CellValue> = None;

    for value in column.values.iter().filter(|v| !is_missing(v)) {
        min = Some(pick(min, value, Ordering::Less, &column.name)?);
        max = Some(pick(max, value, Ordering::Greater, &column.name)?);
    }

    Ok(ValueRange {
        min: min.cloned().unwrap_or(CellValue::Null),
        max: max.cloned().unwrap_or(CellValue::Null),
    })
}

fn is_missing(value: &CellValue) -> bool {
    match value {
        CellValue::Null => true,
        CellValue::Float(f) => f.is_nan(),
        _ => false,
    }
}

fn pick<'a>(
    current: Option<&'a CellValue>,
    candidate: &'a CellValue,
    wanted: Ordering,
    column: &str,
) -> Result<&'a CellValue> {
    let Some(current) = current else {
        return Ok(candidate);
    };
    match candidate.compare(current) {
        Some(ordering) if ordering == wanted => Ok(candidate),
        Some(_) => Ok(current),
        None => Err(ReconError::computation(
            column,
            format!("cannot compare '{}' with '{}'", candidate, current),
        )),
    }
}

/// Median of a numeric column, nulls and NaN skipped. `None` when there is
/// nothing to take the median of.
pub fn median(column: &Column) -> Result<Option<f64>> {
    if !column.dtype.is_numeric() {
        return Err(ReconError::computation(
            &column.name,
            format!("median requires a numeric column, found {}", column.dtype),
        ));
    }

    let mut numbers: Vec<f64> = column
        .values
        .iter()
        .filter_map(CellValue::as_f64)
        .filter(|v| !v.is_nan())
        .collect();

    if numbers.is_empty() {
        return Ok(None);
    }

    numbers.sort_by(f64::total_cmp);
    let mid = numbers.len() / 2;
    let value = if numbers.len() % 2 == 0 {
        (numbers[mid - 1] + numbers[mid]) / 2.0
    } else {
        numbers[mid]
    };
    Ok(Some(value))
}

/// Render an optional median the way it is logged
pub fn format_median(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => "NaN".to_string(),
    }
}

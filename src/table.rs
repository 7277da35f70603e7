//! In-memory typed tables and cell values

use crate::error::{ReconError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,
    Text,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Timestamp)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell value.
///
/// Equality follows the reconciliation policy: null equals null, integers and
/// floats compare numerically and NaN equals NaN.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Order two values of compatible kinds. Returns `None` for nulls and
    /// for values that have no common ordering.
    pub fn compare(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Key used to match whole rows by content. An integral float shares the
    /// integer's key, so `1` and `1.0` match while large integers stay exact.
    pub fn canonical_key(&self) -> String {
        match self {
            Self::Null => "\u{0}null".to_string(),
            Self::Integer(i) => format!("n:{}", i),
            Self::Float(f) if f.is_nan() => "f:NaN".to_string(),
            Self::Float(f) => match exact_integer(*f) {
                Some(i) => format!("n:{}", i),
                None => format!("f:{:?}", f),
            },
            Self::Boolean(b) => format!("b:{}", b),
            Self::Date(d) => format!("d:{}", d),
            Self::Timestamp(ts) => format!("t:{}", ts),
            Self::Text(s) => format!("s:{}", s),
        }
    }
}

/// The integer a float holds exactly, if any
fn exact_integer(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                exact_integer(*f) == Some(*i)
            }
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
                _ => false,
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Build a column from anything convertible into cell values
    pub fn from_values<T: Into<CellValue>>(
        name: impl Into<String>,
        dtype: ColumnType,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::new(name, dtype, values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of equally long columns plus a row index
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index: Vec<usize>,
    columns: IndexMap<String, Column>,
}

impl Table {
    /// Create a table with the default `0..n` row index
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        Self::with_index((0..row_count).collect(), columns)
    }

    /// Create a table with explicit row labels
    pub fn with_index(index: Vec<usize>, columns: Vec<Column>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(columns.len());
        for column in columns {
            if column.len() != index.len() {
                return Err(ReconError::invalid_input(format!(
                    "Column '{}' has {} values but the table has {} rows",
                    column.name,
                    column.len(),
                    index.len()
                )));
            }
            if map.contains_key(&column.name) {
                return Err(ReconError::invalid_input(format!(
                    "Duplicate column name: {}",
                    column.name
                )));
            }
            map.insert(column.name.clone(), column);
        }

        Ok(Self {
            index,
            columns: map,
        })
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Column names as a set; order is irrelevant for identity
    pub fn column_set(&self) -> BTreeSet<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Value at a row position (not label) in a named column
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.columns.get(column).and_then(|c| c.values.get(row))
    }

    /// Conform this table to the shape of `other`: same row labels, same
    /// column order. Labels or columns missing here are filled with nulls;
    /// rows whose label does not exist in `other` are left out.
    pub fn reindex_like(&self, other: &Table) -> Table {
        let positions: HashMap<usize, usize> = self
            .index
            .iter()
            .enumerate()
            .map(|(pos, label)| (*label, pos))
            .collect();

        let columns = other
            .columns
            .values()
            .map(|template| match self.columns.get(&template.name) {
                Some(column) => {
                    let values = other
                        .index
                        .iter()
                        .map(|label| {
                            positions
                                .get(label)
                                .map(|pos| column.values[*pos].clone())
                                .unwrap_or(CellValue::Null)
                        })
                        .collect();
                    Column::new(column.name.clone(), column.dtype, values)
                }
                None => Column::new(
                    template.name.clone(),
                    template.dtype,
                    vec![CellValue::Null; other.index.len()],
                ),
            })
            .map(|column| (column.name.clone(), column))
            .collect();

        Table {
            index: other.index.clone(),
            columns,
        }
    }

    /// Row labels present here but absent from `other`
    pub fn labels_missing_from(&self, other: &Table) -> Vec<usize> {
        let other_labels: std::collections::HashSet<usize> = other.index.iter().copied().collect();
        self.index
            .iter()
            .copied()
            .filter(|label| !other_labels.contains(label))
            .collect()
    }
}

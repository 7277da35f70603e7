//! Table loading using DuckDB's automatic type detection

use crate::error::{ReconError, Result};
use crate::table::{CellValue, Column, ColumnType, Table};
use chrono::{NaiveDate, NaiveDateTime};
use duckdb::Connection;
use serde::Serialize;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Column as reported by DuckDB's DESCRIBE
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub column_type: ColumnType,
}

/// Loads delimited (and Parquet/JSON) files into typed tables
pub struct TableLoader {
    connection: Connection,
}

impl TableLoader {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;

        // Row order is significant for positional comparison
        connection.execute("SET preserve_insertion_order=true", [])?;
        connection.execute("SET enable_progress_bar=false", [])?;

        Ok(Self { connection })
    }

    /// Load a file into a table with the default `0..n` row index
    pub fn load(&self, file_path: &Path) -> Result<Table> {
        self.load_with_schema(file_path).map(|(table, _)| table)
    }

    /// Load a file and also return the raw column descriptions
    pub fn load_with_schema(&self, file_path: &Path) -> Result<(Table, Vec<ColumnInfo>)> {
        if !file_path.exists() {
            return Err(ReconError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        if !file_path.is_file() {
            return Err(ReconError::invalid_input(format!(
                "Path is not a file: {}",
                file_path.display()
            )));
        }

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW data_view AS SELECT * FROM {}",
            scan_expression(file_path)
        );
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| self.convert_duckdb_error(e, file_path))?;

        let columns = self.describe()?;
        let table = self.extract_table(&columns)?;

        log::debug!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            file_path.display()
        );

        Ok((table, columns))
    }

    /// Convert DuckDB errors to appropriate ReconError types
    fn convert_duckdb_error(&self, error: duckdb::Error, file_path: &Path) -> ReconError {
        let error_msg = error.to_string();

        if error_msg.contains("CSV Error")
            || error_msg.contains("Could not convert")
            || error_msg.contains("Invalid CSV")
            || error_msg.contains("Unterminated quoted field")
        {
            ReconError::invalid_input(format!(
                "Malformed CSV file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("JSON") {
            ReconError::invalid_input(format!(
                "Malformed JSON file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
            ReconError::invalid_input(format!("File not found: {}", file_path.display()))
        } else if error_msg.contains("Permission denied") {
            ReconError::invalid_input(format!(
                "Permission denied accessing file: {}",
                file_path.display()
            ))
        } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
            ReconError::invalid_input(format!(
                "File encoding error '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else {
            ReconError::DuckDb(error)
        }
    }

    /// Column names and types of the current view, in file order
    fn describe(&self) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.connection.prepare("DESCRIBE data_view").map_err(|e| {
            ReconError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let data_type: String = row.get(1)?;
                Ok((name, data_type))
            })
            .map_err(|e| {
                ReconError::data_processing(format!("Failed to query column info: {}", e))
            })?;

        let mut columns = Vec::new();
        for row in rows {
            let (name, data_type) = row.map_err(|e| {
                ReconError::data_processing(format!("Failed to process column info row: {}", e))
            })?;
            let column_type = column_type_for(&data_type);
            columns.push(ColumnInfo {
                name,
                data_type,
                column_type,
            });
        }

        Ok(columns)
    }

    /// Read every row of the view, casting each column to its mapped type
    fn extract_table(&self, columns: &[ColumnInfo]) -> Result<Table> {
        if columns.is_empty() {
            return Table::new(Vec::new());
        }

        let select_list = columns
            .iter()
            .map(|c| select_expression(&c.name, c.column_type))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM data_view", select_list);

        let mut stmt = self.connection.prepare(&sql).map_err(|e| {
            ReconError::data_processing(format!("Failed to prepare data extraction query: {}", e))
        })?;

        let types: Vec<ColumnType> = columns.iter().map(|c| c.column_type).collect();
        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(types.len());
                for (i, column_type) in types.iter().enumerate() {
                    let value: CellValue = match column_type {
                        ColumnType::Integer => row.get::<_, Option<i64>>(i)?.into(),
                        ColumnType::Float => row.get::<_, Option<f64>>(i)?.into(),
                        ColumnType::Boolean => row.get::<_, Option<bool>>(i)?.into(),
                        // temporal values arrive as text and are parsed below
                        ColumnType::Date | ColumnType::Timestamp | ColumnType::Text => {
                            row.get::<_, Option<String>>(i)?.into()
                        }
                    };
                    values.push(value);
                }
                Ok(values)
            })
            .map_err(|e| {
                ReconError::data_processing(format!("Failed to extract data rows: {}", e))
            })?;

        let mut column_values: Vec<Vec<CellValue>> = vec![Vec::new(); columns.len()];
        for row in rows {
            let values = row.map_err(|e| {
                ReconError::data_processing(format!("Failed to process data row: {}", e))
            })?;
            for (slot, value) in column_values.iter_mut().zip(values) {
                slot.push(value);
            }
        }

        let mut built = Vec::with_capacity(columns.len());
        for (info, values) in columns.iter().zip(column_values) {
            let values = match info.column_type {
                ColumnType::Date => parse_temporal(&info.name, values, parse_date)?,
                ColumnType::Timestamp => parse_temporal(&info.name, values, parse_timestamp)?,
                _ => values,
            };
            built.push(Column::new(info.name.clone(), info.column_type, values));
        }

        Table::new(built)
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        if let Some(extension) = file_path.extension().and_then(|s| s.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "csv" | "tsv" | "txt" | "parquet" | "json" | "jsonl" | "ndjson"
            )
        } else {
            false
        }
    }
}

/// Table function used to scan a file, chosen by extension
fn scan_expression(file_path: &Path) -> String {
    let quoted = quote_literal(&file_path.to_string_lossy());
    let extension = file_path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "parquet" => format!("read_parquet({})", quoted),
        "json" | "jsonl" | "ndjson" => format!("read_json_auto({})", quoted),
        _ => format!("read_csv_auto({}, header=true)", quoted),
    }
}

fn select_expression(name: &str, column_type: ColumnType) -> String {
    let ident = quote_identifier(name);
    match column_type {
        ColumnType::Integer => format!("CAST({} AS BIGINT)", ident),
        ColumnType::Float => format!("CAST({} AS DOUBLE)", ident),
        ColumnType::Boolean => format!("CAST({} AS BOOLEAN)", ident),
        ColumnType::Date => format!("strftime({}, '%Y-%m-%d')", ident),
        ColumnType::Timestamp => format!("strftime({}, '%Y-%m-%d %H:%M:%S.%f')", ident),
        ColumnType::Text => format!("CAST({} AS VARCHAR)", ident),
    }
}

/// Map a DuckDB type name onto a declared column type
pub fn column_type_for(data_type: &str) -> ColumnType {
    let upper = data_type.trim().to_uppercase();
    match upper.as_str() {
        "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "UTINYINT" | "USMALLINT" | "UINTEGER" => {
            ColumnType::Integer
        }
        // wider than i64
        "UBIGINT" | "HUGEINT" | "UHUGEINT" => ColumnType::Float,
        "FLOAT" | "REAL" | "DOUBLE" => ColumnType::Float,
        "BOOLEAN" => ColumnType::Boolean,
        "DATE" => ColumnType::Date,
        "TIMESTAMP" | "DATETIME" | "TIMESTAMP_S" | "TIMESTAMP_MS" | "TIMESTAMP_NS" => {
            ColumnType::Timestamp
        }
        s if s.starts_with("DECIMAL") || s.starts_with("NUMERIC") => ColumnType::Float,
        _ => ColumnType::Text,
    }
}

fn parse_temporal(
    column: &str,
    values: Vec<CellValue>,
    parse: fn(&str) -> Option<CellValue>,
) -> Result<Vec<CellValue>> {
    values
        .into_iter()
        .map(|value| match value {
            CellValue::Text(raw) => parse(&raw).ok_or_else(|| {
                ReconError::data_processing(format!(
                    "Column '{}': cannot parse temporal value '{}'",
                    column, raw
                ))
            }),
            other => Ok(other),
        })
        .collect()
}

fn parse_date(raw: &str) -> Option<CellValue> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().map(CellValue::Date)
}

fn parse_timestamp(raw: &str) -> Option<CellValue> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .map(CellValue::Timestamp)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

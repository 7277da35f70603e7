//! Error types for tabrecon operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error(transparent)]
    Setting(#[from] SettingError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Column '{column}' not found in the {side} table")]
    ColumnNotFound { side: String, column: String },

    #[error("Computation error in column '{column}': {message}")]
    Computation { column: String, message: String },

    #[error("Failed to write report {path}: {message}")]
    Report { path: PathBuf, message: String },

    #[error("{0:#}")]
    Generic(#[from] anyhow::Error),
}

impl ReconError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn column_not_found(side: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            side: side.into(),
            column: column.into(),
        }
    }

    pub fn computation(column: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Computation {
            column: column.into(),
            message: msg.into(),
        }
    }
}

/// Lookup and value errors raised by the settings provider.
///
/// Kept `Clone` so a column-family selection can carry its load-time error
/// until the statistics stage reports it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    #[error("The section, '{section}', does not exist in the config file.")]
    MissingSection { section: String },

    #[error("The option, '{key}', does not exist in the section, '{section}'.")]
    MissingKey { section: String, key: String },

    #[error("Invalid value for '{key}' in section '{section}': {value}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

impl SettingError {
    pub fn invalid_value(
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

//! INI settings with environment overrides
//!
//! Lookups go through [`SettingsProvider::get`], which names the missing
//! section or key on failure. [`Settings`] is the typed view the driver
//! works with.

use crate::engine::{CompareMode, MismatchPolicy, ReconcileOptions, ReportOptions};
use crate::error::{ReconError, Result, SettingError};
use crate::logging::{parse_level, LogSettings};
use crate::stats::ColumnSelection;
use crate::{DEFAULT_LOG_FILE, DEFAULT_REPORT_PATH};
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `TABRECON_INPUTS__SOURCE_FILE`
pub const ENV_PREFIX: &str = "TABRECON";

const INPUTS: &str = "INPUTS";
const LOGGING: &str = "LOGGING";
const COLUMN_TYPES: &str = "COLUMN_TYPES";
const VALIDATION: &str = "VALIDATION";
const OUTPUTS: &str = "OUTPUTS";

/// Named configuration values backed by the `config` crate
#[derive(Debug, Clone)]
pub struct SettingsProvider {
    config: Config,
}

impl SettingsProvider {
    /// Read an INI file, layering `TABRECON_*` environment variables on top
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReconError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        log::debug!("Loaded settings from {}", path.display());
        Ok(Self { config })
    }

    /// Parse INI text directly, without environment overrides
    pub fn from_ini_str(ini: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(ini, FileFormat::Ini))
            .build()?;
        Ok(Self { config })
    }

    /// Look up a value. Section and key names are case-insensitive.
    pub fn get(&self, section: &str, key: &str) -> std::result::Result<String, SettingError> {
        let section_path = section.to_lowercase();
        if matches!(
            self.config.get_table(&section_path),
            Err(ConfigError::NotFound(_))
        ) {
            return Err(SettingError::MissingSection {
                section: section.to_string(),
            });
        }

        match self
            .config
            .get_string(&format!("{}.{}", section_path, key.to_lowercase()))
        {
            Ok(value) => Ok(value.trim().to_string()),
            Err(ConfigError::NotFound(_)) => Err(SettingError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(SettingError::invalid_value(section, key, e.to_string())),
        }
    }

    /// Look up an optional value; absent sections and keys yield `None`
    pub fn get_optional(
        &self,
        section: &str,
        key: &str,
    ) -> std::result::Result<Option<String>, SettingError> {
        match self.get(section, key) {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(SettingError::MissingSection { .. } | SettingError::MissingKey { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_or(
        &self,
        section: &str,
        key: &str,
        default: &str,
    ) -> std::result::Result<String, SettingError> {
        Ok(self
            .get_optional(section, key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// A "0"/"1" switch with a default
    pub fn get_flag(
        &self,
        section: &str,
        key: &str,
        default: bool,
    ) -> std::result::Result<bool, SettingError> {
        match self.get_optional(section, key)? {
            None => Ok(default),
            Some(value) => parse_flag(&value)
                .ok_or_else(|| SettingError::invalid_value(section, key, value)),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub json_report: Option<PathBuf>,
    pub policy: Option<MismatchPolicy>,
    pub mode: Option<CompareMode>,
}

/// Typed view of everything a run is configured with
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LogSettings,
    pub source_file: Option<PathBuf>,
    pub target_file: Option<PathBuf>,
    pub options: ReconcileOptions,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_provider(&SettingsProvider::load(path)?)
    }

    /// Resolve the typed settings. Startup keys fail here; column-family
    /// selections keep their error for the statistics stage to report.
    pub fn from_provider(provider: &SettingsProvider) -> Result<Self> {
        let level_name = provider.get(LOGGING, "LOG_LEVEL")?;
        let level = parse_level(&level_name)
            .ok_or_else(|| SettingError::invalid_value(LOGGING, "LOG_LEVEL", &level_name))?;

        let logging = LogSettings {
            level,
            to_file: provider.get_flag(LOGGING, "LOG_TO_FILE", true)?,
            file: PathBuf::from(provider.get_or(LOGGING, "LOG_FILE", DEFAULT_LOG_FILE)?),
            overwrite: provider.get_flag(LOGGING, "LOG_OVERWRITE", true)?,
        };

        let policy = match provider.get_optional(VALIDATION, "MISMATCH_POLICY")? {
            Some(value) => MismatchPolicy::parse(&value)
                .map_err(|_| SettingError::invalid_value(VALIDATION, "MISMATCH_POLICY", value))?,
            None => MismatchPolicy::default(),
        };
        let mode = match provider.get_optional(VALIDATION, "COMPARE_MODE")? {
            Some(value) => CompareMode::parse(&value)
                .map_err(|_| SettingError::invalid_value(VALIDATION, "COMPARE_MODE", value))?,
            None => CompareMode::default(),
        };

        let report = ReportOptions {
            html_path: PathBuf::from(provider.get_or(OUTPUTS, "REPORT_FILE", DEFAULT_REPORT_PATH)?),
            json_path: provider.get_optional(OUTPUTS, "JSON_REPORT")?.map(PathBuf::from),
        };

        let options = ReconcileOptions {
            policy,
            mode,
            numeric: family_selection(provider, "AUTO_NUMERIC_DISCOVER", "NUMERIC"),
            date: family_selection(provider, "AUTO_DATE_DISCOVER", "DATE"),
            report,
        };

        Ok(Self {
            logging,
            source_file: provider.get_optional(INPUTS, "SOURCE_FILE")?.map(PathBuf::from),
            target_file: provider.get_optional(INPUTS, "TARGET_FILE")?.map(PathBuf::from),
            options,
        })
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(source) = overrides.source {
            self.source_file = Some(source);
        }
        if let Some(target) = overrides.target {
            self.target_file = Some(target);
        }
        if let Some(report) = overrides.report {
            self.options.report.html_path = report;
        }
        if let Some(json_report) = overrides.json_report {
            self.options.report.json_path = Some(json_report);
        }
        if let Some(policy) = overrides.policy {
            self.options.policy = policy;
        }
        if let Some(mode) = overrides.mode {
            self.options.mode = mode;
        }
    }

    /// Source and target paths, failing on whichever is unset
    pub fn input_paths(&self) -> std::result::Result<(PathBuf, PathBuf), SettingError> {
        let missing = |key: &str| SettingError::MissingKey {
            section: INPUTS.to_string(),
            key: key.to_string(),
        };
        let source = self.source_file.clone().ok_or_else(|| missing("SOURCE_FILE"))?;
        let target = self.target_file.clone().ok_or_else(|| missing("TARGET_FILE"))?;
        Ok((source, target))
    }
}

fn family_selection(
    provider: &SettingsProvider,
    flag_key: &str,
    list_key: &str,
) -> crate::stats::FamilySelection {
    let flag = provider.get(COLUMN_TYPES, flag_key)?;
    ColumnSelection::from_flag(COLUMN_TYPES, flag_key, &flag, || {
        provider.get(COLUMN_TYPES, list_key)
    })
}

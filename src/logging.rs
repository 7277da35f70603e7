//! Logger setup: `env_logger` with an optional copy to a log file

use crate::error::Result;
use crate::DEFAULT_LOG_FILE;
use anyhow::Context;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Logging configuration as read from the `LOGGING` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub to_file: bool,
    pub file: PathBuf,
    /// Truncate the log file instead of appending to it
    pub overwrite: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            to_file: true,
            file: PathBuf::from(DEFAULT_LOG_FILE),
            overwrite: true,
        }
    }
}

/// Map a configured level name onto a filter
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_uppercase().as_str() {
        "DEBUG" => Some(LevelFilter::Debug),
        "INFO" => Some(LevelFilter::Info),
        "WARNING" | "WARN" => Some(LevelFilter::Warn),
        // critical entries are emitted at error level
        "ERROR" | "CRITICAL" => Some(LevelFilter::Error),
        _ => None,
    }
}

pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Writes every line to stderr and to a file
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn open_log_file(settings: &LogSettings) -> Result<File> {
    if let Some(parent) = settings.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(!settings.overwrite)
        .truncate(settings.overwrite)
        .open(&settings.file)
        .with_context(|| format!("opening log file {}", settings.file.display()))?;
    Ok(file)
}

/// Level names are colored only when output goes to stderr alone, so the
/// log file never receives escape codes.
fn colors_levels(settings: &LogSettings) -> bool {
    !settings.to_file
}

/// Install the global logger. `verbose` forces debug output.
///
/// A logger that is already installed is left in place.
pub fn init(settings: &LogSettings, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        settings.level
    };

    let colored = colors_levels(settings);
    let mut builder = Builder::from_default_env();
    builder.filter_level(level).format(move |buf, record| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        let name = level_name(record.level());
        if colored {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{} - {} - {} - {}",
                timestamp,
                record.target(),
                style.value(name),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                timestamp,
                record.target(),
                name,
                record.args()
            )
        }
    });

    if settings.to_file {
        let file = open_log_file(settings)?;
        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized; keeping the existing one");
    }
    Ok(())
}

//! Command implementations for tabrecon CLI

use crate::cli::{Commands, OutputFormat};
use crate::engine::Reconciler;
use crate::error::{ReconError, Result};
use crate::loader::TableLoader;
use crate::logging::{self, LogSettings};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::runlog::RunLog;
use crate::settings::{Overrides, Settings};
use std::path::Path;

/// Execute a command, returning the process exit code
pub fn execute_command(command: Commands, config_path: &Path, verbose: bool) -> Result<i32> {
    match command {
        Commands::Run {
            source,
            target,
            output,
            json_output,
            policy,
            mode,
            format,
        } => {
            let overrides = Overrides {
                source,
                target,
                report: output,
                json_report: json_output,
                policy,
                mode,
            };
            run_command(config_path, overrides, &format, verbose)
        }
        Commands::Inspect { input, format } => inspect_command(&input, &format, verbose),
    }
}

/// Load both inputs and reconcile them
fn run_command(
    config_path: &Path,
    overrides: Overrides,
    format: &str,
    verbose: bool,
) -> Result<i32> {
    let output_format = OutputFormat::parse(format).map_err(ReconError::invalid_input)?;

    let mut settings = Settings::load(config_path)?;
    settings.apply(overrides);
    logging::init(&settings.logging, verbose)?;

    let (source_path, target_path) = settings.input_paths()?;
    for path in [&source_path, &target_path] {
        if !TableLoader::is_supported_format(path) {
            return Err(ReconError::invalid_input(format!(
                "Unsupported file format: {}",
                path.display()
            )));
        }
    }

    let mut progress = match output_format {
        OutputFormat::Pretty => ProgressReporter::new_for_run(),
        OutputFormat::Json => ProgressReporter::new_minimal(),
    };

    let loader = TableLoader::new()?;
    progress.start_loading(&format!("Loading source {}...", source_path.display()));
    let source = loader.load(&source_path)?;
    progress.start_loading(&format!("Loading target {}...", target_path.display()));
    let target = loader.load(&target_path)?;
    progress.finish_loading(&format!(
        "Loaded {} source rows and {} target rows",
        source.row_count(),
        target.row_count()
    ));

    let mut reconciler = Reconciler::new(source, target, settings.options.clone());
    let mut run_log = RunLog::new();

    progress.start_compare();
    let outcome = reconciler.reconcile(&mut run_log)?;
    progress.finish_compare();

    log::info!(
        "Run {} finished with status {:?}",
        outcome.run_id,
        outcome.status()
    );

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_outcome(&outcome),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&outcome)?),
    }

    Ok(outcome.exit_code())
}

/// Show what the loader detects in a single file
fn inspect_command(input: &Path, format: &str, verbose: bool) -> Result<i32> {
    let output_format = OutputFormat::parse(format).map_err(ReconError::invalid_input)?;

    let log_settings = LogSettings {
        to_file: false,
        ..LogSettings::default()
    };
    logging::init(&log_settings, verbose)?;

    if !TableLoader::is_supported_format(input) {
        return Err(ReconError::invalid_input(format!(
            "Unsupported file format: {}",
            input.display()
        )));
    }

    let loader = TableLoader::new()?;
    let (table, columns) = loader.load_with_schema(input)?;

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_inspection(input, table.row_count(), &columns),
        OutputFormat::Json => println!(
            "{}",
            JsonFormatter::format_inspection(input, table.row_count(), &columns)?
        ),
    }

    Ok(crate::EXIT_SUCCESS)
}

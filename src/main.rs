//! Main entry point for tabrecon CLI

use clap::Parser;
use tabrecon::cli::Cli;
use tabrecon::commands::execute_command;
use tabrecon::EXIT_ERROR;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Execute the command; logging is configured from the settings file
    let code = match execute_command(cli.command, &cli.config, cli.verbose) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    log::logger().flush();
    std::process::exit(code);
}

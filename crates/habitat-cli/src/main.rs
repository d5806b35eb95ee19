//! Housing-aid report generator CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use habitat_cli::logging::{LogConfig, LogFormat, init_logging};
use habitat_cli::settings::{Settings, load_settings};
use habitat_cli::summary::{assignment_table, print_outcome, validation_details};
use habitat_core::GenerationError;
use tracing::level_filters::LevelFilter;
use tracing::warn;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_generate, run_inspect, run_reports, run_validate};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let (settings, settings_error) = match load_settings(cli.config.as_deref()) {
        Ok(settings) => (settings, None),
        Err(error) => (Settings::default(), Some(error)),
    };
    let log_config = log_config_from_cli(&cli, &settings);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Some(error) = settings_error {
        warn!(%error, "ignoring settings file");
    }

    let exit_code = match &cli.command {
        Command::Reports => match run_reports() {
            Ok(()) => 0,
            Err(error) => report_error(&error),
        },
        Command::Validate(args) => match run_validate(args) {
            Ok(assignment) => {
                println!("{}", assignment_table(&assignment));
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Inspect(args) => match run_inspect(args) {
            Ok(()) => 0,
            Err(error) => report_error(&error),
        },
        Command::Generate(args) => match run_generate(args, &settings) {
            Ok(outcome) => {
                print_outcome(&outcome);
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error}");
    if let Some(GenerationError::Validation(validation)) = error.downcast_ref::<GenerationError>()
    {
        for line in validation_details(validation) {
            eprintln!("{line}");
        }
    }
    1
}

/// Build logging configuration from CLI flags, falling back to the settings
/// file for the format.
fn log_config_from_cli(cli: &Cli, settings: &Settings) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        Some(LogFormatArg::Pretty) => LogFormat::Pretty,
        Some(LogFormatArg::Compact) => LogFormat::Compact,
        Some(LogFormatArg::Json) => LogFormat::Json,
        None => settings.log_format.unwrap_or_default(),
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "habitat",
    version,
    about = "Housing-aid report generator",
    long_about = "Generate housing-aid follow-up reports from payment and decision journals.\n\n\
                  Journals are matched to a report by file name, loaded into an in-process\n\
                  SQL engine and rendered as an Excel workbook."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format [default: pretty, or the settings file's log_format].
    #[arg(long = "log-format", value_enum, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file [default: the platform config directory's habitat/settings.toml].
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the available reports.
    Reports,

    /// Check input files against a report without loading them.
    Validate(ValidateArgs),

    /// Show the schema and first rows of one journal export.
    Inspect(InspectArgs),

    /// Generate a report.
    Generate(GenerateArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Report name, as listed by `habitat reports`.
    #[arg(value_name = "REPORT")]
    pub report: String,

    /// Candidate input files.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Journal export (.csv, .xlsx, .xls, .ods).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of sample rows to show.
    #[arg(long = "rows", value_name = "N", default_value_t = 5)]
    pub rows: usize,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Report name, as listed by `habitat reports`.
    #[arg(value_name = "REPORT")]
    pub report: String,

    /// Input files, matched to the report's required files by name.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Region (wilaya) the report covers [default: the settings file's default_region].
    #[arg(long = "region", value_name = "NAME")]
    pub region: Option<String>,

    /// Reporting year.
    #[arg(long = "year", value_name = "YEAR")]
    pub year: i32,

    /// Reporting month, for monthly reports.
    #[arg(long = "month", value_name = "M", conflicts_with = "semester")]
    pub month: Option<u32>,

    /// Reporting semester (1 or 2), for semester reports.
    #[arg(long = "semester", value_name = "S")]
    pub semester: Option<u8>,

    /// Programme code, for programme reports.
    #[arg(long = "programme", value_name = "CODE", group = "target")]
    pub programme: Option<String>,

    /// Sub-programme code.
    #[arg(long = "subprogram", value_name = "CODE", group = "target")]
    pub subprogram: Option<String>,

    /// Notification reference, for notification reports.
    #[arg(long = "notification", value_name = "REF", group = "target")]
    pub notification: Option<String>,

    /// Date printed on the report and used in the file name [default: today].
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Output directory [default: the settings file's default_output_dir, or
    /// the current directory].
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("habitat").chain(args.iter().copied()))
    }

    #[test]
    fn test_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = parse(&[
            "generate",
            "situation_programme",
            "Journal_paiements_2024.csv",
            "Journal_decisions_2024.csv",
            "--region",
            "Tlemcen",
            "--year",
            "2024",
            "--programme",
            "RUR-2020",
            "--date",
            "2024-04-02",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.programme.as_deref(), Some("RUR-2020"));
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 4, 2));
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_month_and_semester_conflict() {
        assert!(
            parse(&[
                "generate", "bilan_semestriel", "a.csv", "--year", "2024", "--month", "3",
                "--semester", "1",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_only_one_target() {
        assert!(
            parse(&[
                "generate", "situation_programme", "a.csv", "--year", "2024", "--programme",
                "RUR-2020", "--notification", "N-01",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["reports", "--log-format", "json", "-q"]).unwrap();
        assert!(matches!(cli.log_format, Some(LogFormatArg::Json)));
        assert!(cli.verbosity.is_present());
    }
}

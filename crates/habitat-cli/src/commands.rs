use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use habitat_catalog::{ReferenceData, ReportCatalog};
use habitat_core::{GenerationOutcome, GenerationRequest, ReportGenerator, spawn_generation};
use habitat_ingest::{FileAssignment, load_table};
use habitat_model::ReportContext;
use habitat_query::QueryEngine;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span};

use habitat_cli::settings::Settings;
use habitat_cli::summary::{reports_table, sample_table, schema_table};

use crate::cli::{GenerateArgs, InspectArgs, ValidateArgs};

/// Name the inspected file is registered under.
const INSPECT_TABLE: &str = "fichier";

fn builtin_generator() -> Result<ReportGenerator> {
    let catalog = ReportCatalog::builtin()?;
    let reference = ReferenceData::builtin()?;
    Ok(ReportGenerator::new(catalog, reference))
}

pub fn run_reports() -> Result<()> {
    let catalog = ReportCatalog::builtin()?;
    println!("{}", reports_table(&catalog));
    Ok(())
}

pub fn run_validate(args: &ValidateArgs) -> Result<FileAssignment> {
    let span = info_span!("validate", report = %args.report);
    let _guard = span.enter();
    let generator = builtin_generator()?;
    let assignment = generator.validate_inputs(&args.report, &args.files)?;
    info!(tables = assignment.len(), "input files validated");
    Ok(assignment)
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let span = info_span!("inspect", path = %args.file.display());
    let _guard = span.enter();
    let frame = load_table(&args.file)?;

    let mut engine = QueryEngine::new();
    engine.create_table(INSPECT_TABLE, frame)?;
    let records = engine.count_records(INSPECT_TABLE)?;
    let description = engine.describe(INSPECT_TABLE)?;
    let sample = engine.sample(INSPECT_TABLE, args.rows)?;
    engine.close();

    println!("File: {}", args.file.display());
    println!("Records: {records}");
    println!("{}", schema_table(&description));
    if sample.height() > 0 {
        println!("{}", sample_table(&sample));
    }
    Ok(())
}

pub fn run_generate(args: &GenerateArgs, settings: &Settings) -> Result<GenerationOutcome> {
    let span = info_span!("cli_generate", report = %args.report);
    let _guard = span.enter();
    let generator = builtin_generator()?;
    let context = build_context(args, settings, generator.reference())?;
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| settings.default_output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(output_dir = %output_dir.display(), period = %context.period_label(), "request ready");

    let request = GenerationRequest::new(&args.report, args.files.clone(), output_dir, context);
    let spinner = stage_spinner();
    let handle = spawn_generation(&generator, request);
    let result = handle.wait_with(|stage| spinner.set_message(stage.as_str()));
    spinner.finish_and_clear();
    Ok(result?)
}

fn build_context(
    args: &GenerateArgs,
    settings: &Settings,
    reference: &ReferenceData,
) -> Result<ReportContext> {
    let Some(region) = args
        .region
        .as_deref()
        .or(settings.default_region.as_deref())
    else {
        bail!("no region given: pass --region or set default_region in the settings file");
    };

    let mut builder = ReportContext::builder(region, args.year);
    if let Some(month) = args.month {
        builder = builder.month(month);
    }
    if let Some(semester) = args.semester {
        builder = builder.semester(semester);
    }
    if let Some(date) = args.date {
        builder = builder.report_date(date);
    }
    let target = if let Some(code) = &args.programme {
        Some(reference.resolve_programme(code)?)
    } else if let Some(code) = &args.subprogram {
        Some(reference.resolve_subprogram(code)?)
    } else if let Some(reference_code) = &args.notification {
        Some(reference.resolve_notification(reference_code)?)
    } else {
        None
    };
    if let Some(target) = target {
        builder = builder.target(target);
    }
    Ok(builder.build()?)
}

/// Spinner on stderr showing the current pipeline stage. Hidden when stderr
/// is not a terminal.
fn stage_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message("starting");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

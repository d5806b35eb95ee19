//! The generation orchestrator.
//!
//! A run goes `Idle -> FilesValidated -> DataLoaded -> ReferenceTablesCreated
//! -> QueriesExecuted -> DocumentBuilt -> Saved -> Done`, or to `Failed` from
//! any of these. Each run owns its query engine, which is closed before the
//! run reaches `Done` or `Failed`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use habitat_catalog::{ReferenceData, ReportCatalog, ReportSpec};
use habitat_ingest::{FileAssignment, ValidationError, load_table, validate_against};
use habitat_model::ReportContext;
use habitat_query::{QueryEngine, render_query};
use habitat_report::{
    DocumentSink, QueryResults, ReportDocument, XlsxSink, build_document, output_path,
};
use tracing::{debug, error, info, info_span};

use crate::error::{GenerationError, Result};
use crate::stage::{PipelineStage, ProgressObserver};

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub report: String,
    /// Input files, validated against the report's required files.
    pub candidates: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub context: ReportContext,
}

impl GenerationRequest {
    pub fn new(
        report: impl Into<String>,
        candidates: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
        context: ReportContext,
    ) -> Self {
        Self {
            report: report.into(),
            candidates,
            output_dir: output_dir.into(),
            context,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub report: String,
    pub output_path: PathBuf,
    /// Loaded input tables and their row counts.
    pub tables: Vec<(String, usize)>,
    /// Row count of every query result, in execution order.
    pub queries: Vec<(String, usize)>,
    pub duration: Duration,
}

/// Runs report generations against an injected catalogue and reference
/// data set. Cloning is cheap; clones share the catalogue, reference data,
/// sink and observers.
#[derive(Clone)]
pub struct ReportGenerator {
    catalog: Arc<ReportCatalog>,
    reference: Arc<ReferenceData>,
    sink: Arc<dyn DocumentSink>,
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl ReportGenerator {
    /// Creates a generator writing Excel workbooks.
    pub fn new(catalog: ReportCatalog, reference: ReferenceData) -> Self {
        Self {
            catalog: Arc::new(catalog),
            reference: Arc::new(reference),
            sink: Arc::new(XlsxSink),
            observers: Vec::new(),
        }
    }

    /// Replaces the output sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DocumentSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Adds an observer notified of every stage transition.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Runs the validator only.
    pub fn validate_inputs(&self, report: &str, candidates: &[PathBuf]) -> Result<FileAssignment> {
        let spec = self.catalog.get(report).map_err(ValidationError::from)?;
        Ok(validate_against(spec, candidates)?)
    }

    /// Runs a generation with a fresh query engine.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let mut engine = QueryEngine::new();
        self.generate_with_engine(&mut engine, request)
    }

    /// Runs a generation on `engine`. The engine is closed when this
    /// returns, whatever the outcome.
    pub fn generate_with_engine(
        &self,
        engine: &mut QueryEngine,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome> {
        let span = info_span!("generate", report = %request.report);
        let _guard = span.enter();
        let started = Instant::now();

        let mut run = Run {
            stage: PipelineStage::Idle,
            observers: &self.observers,
        };
        let result = self.run_pipeline(engine, request, &mut run);
        engine.close();

        match result {
            Ok(mut outcome) => {
                outcome.duration = started.elapsed();
                run.advance(PipelineStage::Done);
                info!(
                    path = %outcome.output_path.display(),
                    duration_ms = outcome.duration.as_millis(),
                    "report generated"
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(stage = %run.stage, error = %err, "report generation failed");
                run.enter(PipelineStage::Failed);
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &self,
        engine: &mut QueryEngine,
        request: &GenerationRequest,
        run: &mut Run<'_>,
    ) -> Result<GenerationOutcome> {
        let context = &request.context;
        let spec = self
            .catalog
            .get(&request.report)
            .map_err(ValidationError::from)?;
        context.check_scope(spec.period, spec.target)?;

        let assignment = validate_against(spec, &request.candidates)?;
        run.advance(PipelineStage::FilesValidated);

        let tables = load_inputs(engine, &assignment)?;
        engine.log_summary();
        run.advance(PipelineStage::DataLoaded);

        self.register_reference_tables(engine, spec, context)?;
        run.advance(PipelineStage::ReferenceTablesCreated);

        let results = execute_queries(engine, spec, context)?;
        run.advance(PipelineStage::QueriesExecuted);

        let document = build_document(spec, context, &results)?;
        run.advance(PipelineStage::DocumentBuilt);

        let path = output_path(&request.output_dir, spec, context);
        save(self.sink.as_ref(), &document, &path)?;
        run.advance(PipelineStage::Saved);

        Ok(GenerationOutcome {
            report: spec.name.clone(),
            output_path: path,
            tables,
            queries: results.row_counts(),
            duration: Duration::ZERO,
        })
    }

    fn register_reference_tables(
        &self,
        engine: &mut QueryEngine,
        spec: &ReportSpec,
        context: &ReportContext,
    ) -> Result<()> {
        for &table in &spec.reference_tables {
            let frame = self
                .reference
                .frame(table, context.region())
                .map_err(|source| GenerationError::Reference { table, source })?;
            let rows = frame.height();
            engine
                .create_table(table.name(), frame)
                .map_err(|source| GenerationError::Registration {
                    table: table.name().to_string(),
                    source,
                })?;
            debug!(table = table.name(), rows, "reference table registered");
        }
        Ok(())
    }
}

/// Loads every assigned file and registers it under its logical name. The
/// first failure aborts the run.
fn load_inputs(
    engine: &mut QueryEngine,
    assignment: &FileAssignment,
) -> Result<Vec<(String, usize)>> {
    let mut tables = Vec::with_capacity(assignment.len());
    for (table, path) in assignment {
        let frame = load_table(path).map_err(|source| GenerationError::Load {
            table: table.clone(),
            path: path.clone(),
            source,
        })?;
        let rows = frame.height();
        engine
            .create_table(table, frame)
            .map_err(|source| GenerationError::Registration {
                table: table.clone(),
                source,
            })?;
        info!(table = %table, path = %path.display(), rows, "input table loaded");
        tables.push((table.clone(), rows));
    }
    Ok(tables)
}

/// Renders and runs every query in declaration order, stopping at the first
/// failure.
fn execute_queries(
    engine: &mut QueryEngine,
    spec: &ReportSpec,
    context: &ReportContext,
) -> Result<QueryResults> {
    let mut results = QueryResults::new();
    for query in &spec.queries {
        let sql = render_query(&query.sql, context).map_err(|source| GenerationError::Template {
            query: query.name.clone(),
            source,
        })?;
        let frame = engine
            .execute(&sql)
            .map_err(|source| GenerationError::Query {
                query: query.name.clone(),
                source,
            })?;
        debug!(query = %query.name, rows = frame.height(), "query executed");
        results.insert(query.name.clone(), frame);
    }
    Ok(results)
}

fn save(sink: &dyn DocumentSink, document: &ReportDocument, path: &Path) -> Result<()> {
    sink.save(document, path)
        .map_err(|source| GenerationError::Save {
            path: path.to_path_buf(),
            source,
        })
}

/// Current stage of one run.
struct Run<'a> {
    stage: PipelineStage,
    observers: &'a [Arc<dyn ProgressObserver>],
}

impl Run<'_> {
    /// Moves to the next stage on the success path.
    fn advance(&mut self, next: PipelineStage) {
        debug_assert_eq!(self.stage.next(), Some(next));
        info!(stage = %next, "pipeline stage");
        self.enter(next);
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.stage = stage;
        for observer in self.observers {
            observer.on_stage(stage);
        }
    }
}

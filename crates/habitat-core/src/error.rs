//! Generation errors.

use std::path::PathBuf;

use habitat_catalog::{ReferenceError, ReferenceTable};
use habitat_ingest::{IngestError, ValidationError};
use habitat_model::ContextError;
use habitat_query::{QueryError, TemplateError};
use habitat_report::{DocumentError, SinkError};
use thiserror::Error;

use crate::stage::PipelineStage;

/// How an interactive caller should present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user can fix the request: wrong report name, period or input set.
    Validation,
    /// Anything else; details belong in the logs.
    Unexpected,
}

/// A failed generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The context does not carry what the report needs.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Unknown report, or input files rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to load {table} from {path}: {source}")]
    Load {
        table: String,
        path: PathBuf,
        #[source]
        source: IngestError,
    },

    #[error("failed to prepare reference table {table}: {source}")]
    Reference {
        table: ReferenceTable,
        #[source]
        source: ReferenceError,
    },

    #[error("failed to register table {table}: {source}")]
    Registration {
        table: String,
        #[source]
        source: QueryError,
    },

    #[error("failed to render query '{query}': {source}")]
    Template {
        query: String,
        #[source]
        source: TemplateError,
    },

    /// The first failing query; later queries were not run.
    #[error("query '{query}' failed: {source}")]
    Query {
        query: String,
        #[source]
        source: QueryError,
    },

    #[error("failed to build document: {0}")]
    Document(#[from] DocumentError),

    #[error("failed to save report to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: SinkError,
    },

    /// The background worker stopped without reporting a result.
    #[error("generation worker stopped during {stage}")]
    WorkerLost { stage: PipelineStage },
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Context(_) | Self::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// Result type for generation.
pub type Result<T> = std::result::Result<T, GenerationError>;

//! Error types for query rendering and execution.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the query engine.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A query was issued before any table was registered in this run.
    #[error("no table has been loaded into the query engine")]
    NoDataLoaded,

    /// The engine has been closed; its tables are gone.
    #[error("query engine is closed")]
    Closed,

    #[error("table '{table}' is not registered")]
    UnknownTable { table: String },

    #[error("failed to register table '{table}': {source}")]
    Registration {
        table: String,
        #[source]
        source: PolarsError,
    },

    /// Execution failed; the offending query text is kept for diagnostics.
    #[error("query execution failed: {source}\nquery: {query}")]
    Execution {
        query: String,
        #[source]
        source: PolarsError,
    },
}

/// Errors raised while rendering a query template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder {placeholder}")]
    UnknownPlaceholder { placeholder: String },

    #[error("placeholder {placeholder} has no value in this report context")]
    MissingValue { placeholder: String },

    #[error("placeholder {placeholder} does not accept a width")]
    InvalidFormat { placeholder: String },
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

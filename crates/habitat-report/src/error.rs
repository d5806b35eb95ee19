//! Error types for document building and output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning query results into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The layout references a query with no result.
    #[error("no result for query '{query}'")]
    MissingQuery { query: String },

    #[error("result of query '{query}' has no column '{column}'")]
    MissingColumn { query: String, column: String },

    #[error("layout of report '{report}' has no {section} section")]
    MissingSection {
        report: String,
        section: &'static str,
    },
}

/// Errors raised while writing a document.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write workbook {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// Result type for document building.
pub type Result<T> = std::result::Result<T, DocumentError>;

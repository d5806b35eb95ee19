//! Error types for input validation and loading.

use std::fmt;
use std::path::PathBuf;

use habitat_catalog::CatalogError;
use thiserror::Error;

/// A required input no candidate file matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    /// Human-readable pattern, e.g. `Journal_decisions_*.xlsx`.
    pub display: String,
    /// Logical table the file would have been loaded as.
    pub table: String,
}

impl fmt::Display for MissingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display, self.table)
    }
}

/// Errors raised while matching candidate files against a report's
/// required inputs. None of these touch file contents.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    UnknownReport(#[from] CatalogError),

    /// A candidate path does not exist. Raised on the first such path.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("report '{report}' is missing required files: {}", join(.missing))]
    MissingFiles {
        report: String,
        missing: Vec<MissingFile>,
    },

    #[error("files do not match any input of report '{report}': {}", join_paths(.unmatched))]
    UnmatchedFiles {
        report: String,
        unmatched: Vec<PathBuf>,
    },

    #[error("several files match {display} ({table}): {}", join_paths(.files))]
    AmbiguousFiles {
        display: String,
        table: String,
        files: Vec<PathBuf>,
    },
}

fn join(missing: &[MissingFile]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| {
            path.file_name()
                .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while reading a spreadsheet into a frame.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("unsupported file type '{extension}': {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("workbook has no worksheet: {path}")]
    NoWorksheet { path: PathBuf },

    /// No header marker in the first rows of the file.
    #[error("no header row found in the first {scanned} rows of {path} (expected one of: {expected})")]
    HeaderNotFound {
        path: PathBuf,
        scanned: usize,
        expected: String,
    },

    #[error("failed to build table from {path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_lists_every_pattern() {
        let error = ValidationError::MissingFiles {
            report: "bilan_semestriel".to_string(),
            missing: vec![
                MissingFile {
                    display: "Journal_paiements_*.xlsx".to_string(),
                    table: "paiements".to_string(),
                },
                MissingFile {
                    display: "Journal_decisions_*.xlsx".to_string(),
                    table: "decisions".to_string(),
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "report 'bilan_semestriel' is missing required files: \
             Journal_paiements_*.xlsx (paiements), Journal_decisions_*.xlsx (decisions)"
        );
    }

    #[test]
    fn test_unmatched_files_shows_file_names() {
        let error = ValidationError::UnmatchedFiles {
            report: "situation_mensuelle".to_string(),
            unmatched: vec![PathBuf::from("/tmp/in/notes.txt")],
        };
        assert!(error.to_string().ends_with(": notes.txt"));
    }
}

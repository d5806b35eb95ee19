//! Error types for the report catalogue and reference data.

use thiserror::Error;

/// Errors raised while building or querying the report catalogue.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to parse report catalogue: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("report '{name}' is defined more than once")]
    DuplicateReport { name: String },

    #[error("report '{report}': invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        report: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("report '{report}' requires no input file")]
    NoRequiredFiles { report: String },

    #[error("report '{report}': logical table '{table}' is required more than once")]
    DuplicateTable { report: String, table: String },

    #[error("report '{report}': logical table '{table}' would replace a reference table")]
    ReferenceTableClash { report: String, table: String },

    #[error("report '{report}': query '{query}' is defined more than once")]
    DuplicateQuery { report: String, query: String },

    #[error("report '{report}' has no '{query}' query")]
    MissingQuery { report: String, query: String },

    #[error("report '{report}', query '{query}': unknown placeholder {placeholder}")]
    UnknownPlaceholder {
        report: String,
        query: String,
        placeholder: String,
    },

    #[error(
        "report '{report}', query '{query}': placeholder {placeholder} has no value for a {period} report"
    )]
    UnavailablePlaceholder {
        report: String,
        query: String,
        placeholder: String,
        period: String,
    },

    #[error("report '{report}': layout column '{column}' references undeclared query '{query}'")]
    UnboundColumn {
        report: String,
        column: String,
        query: String,
    },

    #[error("report '{report}': {generator} layout requires {requirement}")]
    IncompleteLayout {
        report: String,
        generator: String,
        requirement: &'static str,
    },

    /// Requested report name is not in the catalogue.
    #[error("unknown report '{name}' (known reports: {})", .known.join(", "))]
    UnknownReport { name: String, known: Vec<String> },
}

/// Errors raised while loading or resolving reference data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReferenceError {
    #[error("failed to read reference table {table}: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("failed to build reference table {table}: {source}")]
    Frame {
        table: &'static str,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("region '{region}' has no communes in the reference data (known regions: {})", .known.join(", "))]
    UnknownRegion { region: String, known: Vec<String> },

    #[error("unknown programme '{code}'")]
    UnknownProgramme { code: String },

    #[error("unknown subprogram '{code}'")]
    UnknownSubprogram { code: String },

    #[error("unknown notification '{reference}'")]
    UnknownNotification { reference: String },

    #[error("sub-programme '{code}' refers to unknown programme '{programme}'")]
    DanglingProgramme { code: String, programme: String },
}

/// Result type for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

//! Report catalogue and reference data.
//!
//! - [`ReportCatalog`] maps a report name to its [`ReportSpec`]: required
//!   input files, SQL templates, output file name and generator.
//! - [`ReferenceData`] holds the static programme, tranche and commune
//!   tables registered next to the journals on every run.
//!
//! Both are built from data compiled into the binary and checked at
//! construction.

pub mod embedded;
mod error;
mod reference;
mod registry;
mod spec;

pub use error::{CatalogError, ReferenceError, Result};
pub use reference::{Commune, Programme, ReferenceData, SousProgramme, Tranche};
pub use registry::ReportCatalog;
pub use spec::{
    ColumnSpec, CommitmentSpec, DIMENSIONS_QUERY, FilePattern, GeneratorKind, KEY_COLUMN,
    KeyColumn, Layout, MatrixSpec, NamedQuery, ReferenceTable, ReportSpec,
};

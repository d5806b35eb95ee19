//! Report documents and their output.
//!
//! Query results are turned into a format-independent [`ReportDocument`]
//! by the generator matching the report's layout, then written by a
//! [`DocumentSink`].

pub mod document;
mod error;
pub mod generators;
pub mod output;
mod results;
pub mod sink;

pub use document::{Cell, DASH, DataTable, ReportDocument, TableRow, format_amount, sheet_name};
pub use error::{DocumentError, Result, SinkError};
pub use generators::build_document;
pub use output::{OUTPUT_EXTENSION, output_file_name, output_path};
pub use results::QueryResults;
pub use sink::{DocumentSink, XlsxSink};

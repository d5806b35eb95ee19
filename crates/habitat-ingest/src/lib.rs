//! Input handling for report generation.
//!
//! - [`validate_files`] matches candidate paths against a report's required
//!   inputs and returns the logical table assignment.
//! - [`load_table`] reads one journal export (CSV or workbook) into a
//!   Polars frame, locating the header row below any title lines.

mod error;
mod loader;
mod validator;

// === Error Types ===
pub use error::{IngestError, MissingFile, Result, ValidationError};

// === Validation ===
pub use validator::{FileAssignment, validate_against, validate_files};

// === Loading ===
pub use loader::{
    HEADER_MARKERS, HEADER_SCAN_ROWS, MAX_FILE_SIZE, check_file_size, find_header_row, load_table,
    normalize_headers, read_rows,
};

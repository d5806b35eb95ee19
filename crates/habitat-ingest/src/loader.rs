//! Spreadsheet loading.
//!
//! Journal exports carry a few title lines above the table. The header row
//! is the first row, within the first [`HEADER_SCAN_ROWS`] non-empty rows,
//! holding one of the [`HEADER_MARKERS`]; data starts on the next row.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use habitat_common::{fold_label, format_numeric, parse_amount};
use polars::prelude::*;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Maximum input file size (200 MB).
pub const MAX_FILE_SIZE: u64 = 200 * 1024 * 1024;

/// Number of non-empty rows searched for the header marker.
pub const HEADER_SCAN_ROWS: usize = 30;

/// Column headers identifying the header row of a journal export.
pub const HEADER_MARKERS: [&str; 4] = ["N° Ordre", "Numéro d'ordre", "Code décision", "Code decision"];

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Loads the first table of a journal export.
///
/// Empty cells become nulls. A column whose non-empty cells all parse as
/// amounts is `Float64`, any other column is `String`.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    check_file_size(path)?;
    let rows = read_rows(path)?;
    let header_index = find_header_row(&rows).ok_or_else(|| IngestError::HeaderNotFound {
        path: path.to_path_buf(),
        scanned: HEADER_SCAN_ROWS,
        expected: HEADER_MARKERS.join(", "),
    })?;

    let headers = normalize_headers(&rows[header_index]);
    let data: Vec<&Vec<String>> = rows
        .iter()
        .skip(header_index + 1)
        .filter(|row| !is_blank(row))
        .collect();

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<Option<&str>> = data
                .iter()
                .map(|row| {
                    row.get(idx)
                        .map(String::as_str)
                        .filter(|value| !value.is_empty())
                })
                .collect();
            build_column(name, &values)
        })
        .collect();

    let frame = DataFrame::new(columns).map_err(|source| IngestError::Frame {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        header_row = header_index + 1,
        rows = frame.height(),
        columns = frame.width(),
        "spreadsheet loaded"
    );
    Ok(frame)
}

/// Checks the file exists and is below [`MAX_FILE_SIZE`].
pub fn check_file_size(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Reads every row of the file as trimmed text cells.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension == "csv" {
        read_csv_rows(path)
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook_rows(path)
    } else {
        Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }
}

/// Index of the header row in `rows`, if a marker appears early enough.
pub fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    let markers: Vec<String> = HEADER_MARKERS.iter().map(|m| fold_label(m)).collect();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !is_blank(row))
        .take(HEADER_SCAN_ROWS)
        .find(|(_, row)| row.iter().any(|cell| markers.contains(&fold_label(cell))))
        .map(|(idx, _)| idx)
}

/// Trims header cells, names blank ones `colonne_<n>` and suffixes
/// duplicates with `_<n>`.
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, cell) in raw.iter().enumerate() {
        let trimmed = cell.trim();
        let base = if trimmed.is_empty() {
            format!("colonne_{}", idx + 1)
        } else {
            trimmed.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while headers.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        headers.push(name);
    }
    headers
}

fn build_column(name: &str, values: &[Option<&str>]) -> Column {
    let non_empty = values.iter().flatten().count();
    let amounts: Vec<Option<f64>> = values
        .iter()
        .map(|value| value.and_then(parse_amount))
        .collect();
    if non_empty > 0 && amounts.iter().flatten().count() == non_empty {
        Series::new(name.into(), amounts).into_column()
    } else {
        let text: Vec<Option<String>> = values
            .iter()
            .map(|value| value.map(str::to_string))
            .collect();
        Series::new(name.into(), text).into_column()
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 BE",
        });
    }
    let text = decode_text(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record.iter().map(normalize_cell).collect());
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| workbook_error(e.to_string()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Renders a workbook cell the way the journals print it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) | Data::DurationIso(value) => normalize_cell(value),
        Data::Float(value) => format_numeric(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value.as_datetime().map_or_else(
            || format_numeric(value.as_f64()),
            |datetime| datetime.format("%d/%m/%Y").to_string(),
        ),
        Data::DateTimeIso(value) => value
            .get(..10)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map_or_else(
                || normalize_cell(value),
                |date| date.format("%d/%m/%Y").to_string(),
            ),
    }
}

/// UTF-8 when valid, otherwise Latin-1 (the legacy export encoding).
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => error.into_bytes().into_iter().map(char::from).collect(),
    }
}

const DELIMITERS: [u8; 3] = [b';', b'\t', b','];

/// Picks `;`, tab or `,`. The first scanned line holding a header marker as
/// a whole cell decides; without one, the candidate seen most often over the
/// scanned lines wins.
fn sniff_delimiter(text: &str) -> u8 {
    let markers: Vec<String> = HEADER_MARKERS.iter().map(|m| fold_label(m)).collect();
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(HEADER_SCAN_ROWS)
        .collect();
    let holds_marker = |line: &str, delimiter: u8| {
        line.split(char::from(delimiter))
            .map(|cell| normalize_cell(cell.trim().trim_matches('"')))
            .any(|cell| markers.contains(&fold_label(&cell)))
    };

    for line in &lines {
        let candidates: Vec<u8> = DELIMITERS
            .into_iter()
            .filter(|&delimiter| holds_marker(line, delimiter))
            .collect();
        if !candidates.is_empty() {
            return most_frequent(&candidates, &[line]);
        }
    }
    most_frequent(&DELIMITERS, &lines)
}

fn most_frequent(candidates: &[u8], lines: &[&str]) -> u8 {
    candidates
        .iter()
        .copied()
        .max_by_key(|&delimiter| {
            let count: usize = lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .sum();
            // ties go to comma
            (count, delimiter == b',')
        })
        .unwrap_or(b',')
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn io_error(path: &Path, error: std::io::Error) -> IngestError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

//! Document output.
//!
//! [`DocumentSink`] is the seam between the orchestrator and the file
//! system; [`XlsxSink`] writes a [`ReportDocument`] as a single-sheet
//! workbook.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::document::{Cell, DASH, DataTable, ReportDocument, format_amount};
use crate::error::SinkError;

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 60;

/// Writes a finished document to `path`.
pub trait DocumentSink: Send + Sync {
    fn save(&self, document: &ReportDocument, path: &Path) -> Result<(), SinkError>;
}

/// Excel output through `rust_xlsxwriter`.
///
/// Layout, top to bottom: merged header lines, then per table an optional
/// title, the column headers, the data rows and a bold totals row, then the
/// footer lines. An existing file at the target path is overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSink;

impl DocumentSink for XlsxSink {
    fn save(&self, document: &ReportDocument, path: &Path) -> Result<(), SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SinkError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let xlsx_error = |source| SinkError::Xlsx {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let rows = write_document(sheet, document).map_err(xlsx_error)?;
        workbook.save(path).map_err(xlsx_error)?;
        debug!(path = %path.display(), sheet = %document.sheet_name, rows, "workbook written");
        Ok(())
    }
}

struct Formats {
    title: Format,
    subtitle: Format,
    table_title: Format,
    header: Format,
    label: Format,
    integer: Format,
    decimal: Format,
    dash: Format,
    total_label: Format,
    total_integer: Format,
    total_decimal: Format,
    total_dash: Format,
    footer: Format,
}

impl Formats {
    fn new() -> Self {
        let cell = Format::new().set_border(FormatBorder::Thin);
        let total = cell.clone().set_bold().set_background_color(0xE2EFDA);
        Self {
            title: Format::new().set_bold().set_align(FormatAlign::Center),
            subtitle: Format::new().set_align(FormatAlign::Center),
            table_title: Format::new().set_bold().set_italic(),
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0xD9E1F2)
                .set_border(FormatBorder::Thin)
                .set_text_wrap(),
            label: cell.clone(),
            integer: cell.clone().set_num_format("#,##0"),
            decimal: cell.clone().set_num_format("#,##0.00"),
            dash: cell.set_align(FormatAlign::Center),
            total_label: total.clone(),
            total_integer: total.clone().set_num_format("#,##0"),
            total_decimal: total.clone().set_num_format("#,##0.00"),
            total_dash: total.set_align(FormatAlign::Center),
            footer: Format::new().set_italic(),
        }
    }
}

/// Writes the document and returns the number of rows used.
fn write_document(sheet: &mut Worksheet, document: &ReportDocument) -> Result<u32, XlsxError> {
    sheet.set_name(&document.sheet_name)?;
    let formats = Formats::new();
    let last_col = col(document.width().saturating_sub(1));
    let mut widths = vec![MIN_COLUMN_WIDTH; document.width()];
    let mut row: u32 = 0;

    for (idx, line) in document.header.iter().enumerate() {
        let format = if idx < 2 { &formats.title } else { &formats.subtitle };
        write_merged(sheet, row, last_col, line, format)?;
        row += 1;
    }
    row += 1;

    for table in &document.tables {
        row = write_table(sheet, row, table, &formats, &mut widths)?;
        row += 1;
    }

    for line in &document.footer {
        sheet.write_with_format(row, 0, line.as_str(), &formats.footer)?;
        row += 1;
    }

    for (idx, width) in widths.iter().enumerate() {
        sheet.set_column_width(col(idx), (*width).min(MAX_COLUMN_WIDTH) as f64)?;
    }
    Ok(row)
}

fn write_table(
    sheet: &mut Worksheet,
    mut row: u32,
    table: &DataTable,
    formats: &Formats,
    widths: &mut [usize],
) -> Result<u32, XlsxError> {
    let labels = table.key_headers.len();
    if let Some(title) = &table.title {
        sheet.write_with_format(row, 0, title.as_str(), &formats.table_title)?;
        row += 1;
    }

    for (idx, header) in table.key_headers.iter().chain(&table.columns).enumerate() {
        sheet.write_with_format(row, col(idx), header.as_str(), &formats.header)?;
        fit(widths, idx, header);
    }
    row += 1;

    for data in table.rows() {
        for idx in 0..labels {
            let label = data.labels.get(idx).map_or("", String::as_str);
            sheet.write_with_format(row, col(idx), label, &formats.label)?;
            fit(widths, idx, label);
        }
        for (offset, cell) in data.cells.iter().enumerate() {
            let idx = labels + offset;
            write_cell(sheet, row, col(idx), cell, formats, false)?;
            fit(widths, idx, &cell.display());
        }
        row += 1;
    }

    if labels > 1 {
        sheet.merge_range(row, 0, row, col(labels - 1), "Total", &formats.total_label)?;
    } else {
        sheet.write_with_format(row, 0, "Total", &formats.total_label)?;
    }
    for (offset, total) in table.totals().iter().enumerate() {
        let idx = labels + offset;
        let cell = Cell::Number(*total);
        write_cell(sheet, row, col(idx), &cell, formats, true)?;
        fit(widths, idx, &format_amount(*total));
    }
    Ok(row + 1)
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    column: u16,
    cell: &Cell,
    formats: &Formats,
    total: bool,
) -> Result<(), XlsxError> {
    let (label, integer, decimal, dash) = if total {
        (
            &formats.total_label,
            &formats.total_integer,
            &formats.total_decimal,
            &formats.total_dash,
        )
    } else {
        (&formats.label, &formats.integer, &formats.decimal, &formats.dash)
    };
    match cell {
        Cell::Text(text) => {
            sheet.write_with_format(row, column, text.as_str(), label)?;
        }
        _ if cell.is_dash() => {
            sheet.write_with_format(row, column, DASH, dash)?;
        }
        Cell::Number(value) if value.fract() == 0.0 => {
            sheet.write_with_format(row, column, *value, integer)?;
        }
        Cell::Number(value) => {
            sheet.write_with_format(row, column, *value, decimal)?;
        }
        Cell::Missing => {
            sheet.write_with_format(row, column, DASH, dash)?;
        }
    }
    Ok(())
}

/// Writes `text` across columns `0..=last_col`; a single column is written
/// as a plain cell since a merge needs at least two cells.
fn write_merged(
    sheet: &mut Worksheet,
    row: u32,
    last_col: u16,
    text: &str,
    format: &Format,
) -> Result<(), XlsxError> {
    if last_col == 0 {
        sheet.write_with_format(row, 0, text, format)?;
    } else {
        sheet.merge_range(row, 0, row, last_col, text, format)?;
    }
    Ok(())
}

fn fit(widths: &mut [usize], idx: usize, text: &str) {
    if let Some(width) = widths.get_mut(idx) {
        *width = (*width).max(text.chars().count() + 2);
    }
}

fn col(idx: usize) -> u16 {
    u16::try_from(idx).unwrap_or(u16::MAX)
}

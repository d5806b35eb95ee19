//! Terminal tables for command output.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use habitat_catalog::{FilePattern, ReportCatalog};
use habitat_common::any_to_string;
use habitat_core::GenerationOutcome;
use habitat_ingest::{FileAssignment, ValidationError};
use habitat_query::TableDescription;
use polars::prelude::DataFrame;

/// One row per report, by category then name.
pub fn reports_table(catalog: &ReportCatalog) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Report"),
        header_cell("Title"),
        header_cell("Category"),
        header_cell("Period"),
        header_cell("Target"),
        header_cell("Required files"),
    ]);
    apply_table_style(&mut table);
    for spec in catalog.list() {
        let files = spec
            .required_files
            .iter()
            .map(FilePattern::display)
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(&spec.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&spec.display_name),
            Cell::new(&spec.category),
            Cell::new(spec.period.as_str()),
            spec.target
                .map_or_else(|| dim_cell("-"), |target| Cell::new(target.as_str())),
            Cell::new(files),
        ]);
    }
    table
}

/// Logical table to file, as chosen by the validator.
pub fn assignment_table(assignment: &FileAssignment) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("File")]);
    apply_table_style(&mut table);
    for (name, path) in assignment {
        table.add_row(vec![Cell::new(name), Cell::new(path.display())]);
    }
    table
}

/// Column names and types of an inspected file.
pub fn schema_table(description: &TableDescription) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Type"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, (name, dtype)) in description.columns.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(name),
            Cell::new(dtype),
        ]);
    }
    table
}

pub fn sample_table(frame: &DataFrame) -> Table {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in 0..frame.height() {
        let cells = frame
            .get_columns()
            .iter()
            .map(|column| match column.get(row) {
                Ok(value) => sample_cell(any_to_string(value)),
                Err(_) => dim_cell("?"),
            })
            .collect::<Vec<_>>();
        table.add_row(cells);
    }
    table
}

/// Loaded tables and query row counts of a finished run.
pub fn outcome_table(outcome: &GenerationOutcome) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Name"),
        header_cell("Rows"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (name, rows) in &outcome.tables {
        table.add_row(vec![dim_cell("table"), Cell::new(name), Cell::new(rows)]);
    }
    for (name, rows) in &outcome.queries {
        table.add_row(vec![dim_cell("query"), Cell::new(name), Cell::new(rows)]);
    }
    table
}

pub fn print_outcome(outcome: &GenerationOutcome) {
    println!("Report: {}", outcome.report);
    println!("{}", outcome_table(outcome));
    println!(
        "Output: {} ({} ms)",
        outcome.output_path.display(),
        outcome.duration.as_millis()
    );
}

/// Extra lines printed under a validation failure: one per missing,
/// unmatched or ambiguous file. Empty for other failures.
pub fn validation_details(error: &ValidationError) -> Vec<String> {
    match error {
        ValidationError::MissingFiles { missing, .. } => missing
            .iter()
            .map(|file| format!("  missing:   {} (loaded as {})", file.display, file.table))
            .collect(),
        ValidationError::UnmatchedFiles { unmatched, .. } => unmatched
            .iter()
            .map(|path| format!("  unmatched: {}", file_name(path)))
            .collect(),
        ValidationError::AmbiguousFiles { table, files, .. } => files
            .iter()
            .map(|path| format!("  ambiguous: {} (all match {table})", file_name(path)))
            .collect(),
        ValidationError::UnknownReport(_) | ValidationError::FileNotFound { .. } => Vec::new(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn sample_cell(value: String) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

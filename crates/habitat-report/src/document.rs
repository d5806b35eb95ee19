//! Structured report document, independent of the output format.

/// Rendered text for a zero or missing amount.
pub const DASH: &str = "-";

const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn amount(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }

    /// Numeric value as rendered, rounded to cents: text, missing and dash
    /// cells count as zero.
    pub fn rendered_value(&self) -> f64 {
        match self {
            Self::Number(value) => round_cents(*value),
            Self::Text(_) | Self::Missing => 0.0,
        }
    }

    /// Whether the cell renders as a dash.
    pub fn is_dash(&self) -> bool {
        match self {
            Self::Number(value) => round_cents(*value) == 0.0,
            Self::Missing => true,
            Self::Text(_) => false,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            _ if self.is_dash() => DASH.to_string(),
            Self::Number(value) => format_amount(*value),
            Self::Missing => DASH.to_string(),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats an amount with a space as thousands separator and at most two
/// decimals, e.g. `1 234 567,5`.
pub fn format_amount(value: f64) -> String {
    let rounded = round_cents(value);
    let negative = rounded < 0.0;
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    let fraction = fraction.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{fraction}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub labels: Vec<String>,
    pub cells: Vec<Cell>,
}

/// A data table: label columns on the left, amount columns on the right and
/// a totals line.
///
/// Totals are accumulated from the rendered value of every pushed cell, so
/// each total equals the sum of its column as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub title: Option<String>,
    pub key_headers: Vec<String>,
    pub columns: Vec<String>,
    rows: Vec<TableRow>,
    totals: Vec<f64>,
}

impl DataTable {
    pub fn new(title: Option<String>, key_headers: Vec<String>, columns: Vec<String>) -> Self {
        let totals = vec![0.0; columns.len()];
        Self {
            title,
            key_headers,
            columns,
            rows: Vec::new(),
            totals,
        }
    }

    /// Appends a row. Missing trailing cells are padded as [`Cell::Missing`],
    /// extra cells are dropped.
    pub fn push_row(&mut self, labels: Vec<String>, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Missing);
        for (total, cell) in self.totals.iter_mut().zip(&cells) {
            *total = round_cents(*total + cell.rendered_value());
        }
        self.rows.push(TableRow { labels, cells });
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    /// Total number of columns, labels included.
    pub fn width(&self) -> usize {
        self.key_headers.len() + self.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub sheet_name: String,
    pub header: Vec<String>,
    pub tables: Vec<DataTable>,
    pub footer: Vec<String>,
}

impl ReportDocument {
    /// Widest table, or 1 for a document without tables.
    pub fn width(&self) -> usize {
        self.tables
            .iter()
            .map(DataTable::width)
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

/// Makes a valid worksheet name: no `[]:*?/\` and at most 31 characters.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| match ch {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Rapport".to_string()
    } else {
        cleaned
    }
}

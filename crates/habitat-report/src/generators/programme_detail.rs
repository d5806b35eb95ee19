use habitat_catalog::ReportSpec;
use habitat_common::parse_amount;
use habitat_model::ReportContext;

use super::{BoundColumn, bound_columns, dimension_rows, document, header_lines, key_headers};
use crate::document::{Cell, DataTable, ReportDocument, format_amount};
use crate::error::{DocumentError, Result};
use crate::results::QueryResults;

/// Dimension table followed by the committed amount (decisions x unit aid)
/// and what remains to be paid on it.
pub(super) fn build(
    spec: &ReportSpec,
    context: &ReportContext,
    results: &QueryResults,
) -> Result<ReportDocument> {
    let commitment = spec
        .layout
        .commitment
        .as_ref()
        .ok_or_else(|| DocumentError::MissingSection {
            report: spec.name.clone(),
            section: "commitment",
        })?;
    let dimensions = dimension_rows(spec, results, &[commitment.unit_amount.as_str()])?;
    let columns = bound_columns(spec, results)?;
    let decisions = find_column(spec, &columns, &commitment.decisions)?;
    let paid = find_column(spec, &columns, &commitment.paid)?;

    let mut headers: Vec<String> = columns.iter().map(|column| column.header.clone()).collect();
    headers.push(commitment.committed_header.clone());
    headers.push(commitment.remaining_header.clone());

    let mut table = DataTable::new(spec.layout.title.clone(), key_headers(spec), headers);
    for row in dimensions {
        let unit = parse_amount(row.field(&commitment.unit_amount)).unwrap_or(0.0);
        let committed = decisions.value(&row.key) * unit;
        let remaining = committed - paid.value(&row.key);

        let labels = spec
            .layout
            .keys
            .iter()
            .zip(row.labels.iter())
            .map(|(key, label)| {
                if key.column == commitment.unit_amount {
                    parse_amount(label).map_or_else(|| label.clone(), format_amount)
                } else {
                    label.clone()
                }
            })
            .collect();
        let mut cells: Vec<Cell> = columns.iter().map(|column| column.cell(&row.key)).collect();
        cells.push(Cell::Number(committed));
        cells.push(Cell::Number(remaining));
        table.push_row(labels, cells);
    }

    Ok(document(spec, context, header_lines(spec, context), vec![table]))
}

fn find_column<'a>(
    spec: &ReportSpec,
    columns: &'a [BoundColumn],
    key: &str,
) -> Result<&'a BoundColumn> {
    columns
        .iter()
        .find(|column| column.key == key)
        .ok_or_else(|| DocumentError::MissingColumn {
            query: spec.name.clone(),
            column: key.to_string(),
        })
}

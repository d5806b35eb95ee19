use habitat_catalog::{KEY_COLUMN, ReportSpec};
use habitat_model::ReportContext;

use super::{bound_columns, dimension_rows, document, header_lines, key_headers};
use crate::document::{Cell, DataTable, ReportDocument};
use crate::error::{DocumentError, Result};
use crate::results::QueryResults;

/// Dimensions as rows, one column per row of the matrix column query, then
/// the plain layout columns.
pub(super) fn build(
    spec: &ReportSpec,
    context: &ReportContext,
    results: &QueryResults,
) -> Result<ReportDocument> {
    let matrix = spec
        .layout
        .matrix
        .as_ref()
        .ok_or_else(|| DocumentError::MissingSection {
            report: spec.name.clone(),
            section: "matrix",
        })?;
    let tranches = results.text_rows(&matrix.columns_query, &[KEY_COLUMN, &matrix.label])?;
    let values = results.pair_values(&matrix.query, &matrix.column_key, &matrix.value)?;
    let dimensions = dimension_rows(spec, results, &[])?;
    let columns = bound_columns(spec, results)?;

    let mut headers: Vec<String> = tranches
        .iter()
        .map(|tranche| tranche.get(1).cloned().unwrap_or_default())
        .collect();
    headers.extend(columns.iter().map(|column| column.header.clone()));

    let mut table = DataTable::new(spec.layout.title.clone(), key_headers(spec), headers);
    for row in dimensions {
        let mut cells: Vec<Cell> = tranches
            .iter()
            .map(|tranche| {
                let code = tranche.first().cloned().unwrap_or_default();
                Cell::amount(values.get(&(row.key.clone(), code)).copied())
            })
            .collect();
        cells.extend(columns.iter().map(|column| column.cell(&row.key)));
        table.push_row(row.labels, cells);
    }

    Ok(document(spec, context, header_lines(spec, context), vec![table]))
}

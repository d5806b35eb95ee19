use habitat_catalog::ReportSpec;
use habitat_model::ReportContext;

use super::{bound_columns, dimension_rows, document, header_lines, key_headers};
use crate::document::{Cell, DataTable, ReportDocument, format_amount};
use crate::error::Result;
use crate::results::QueryResults;

/// One line per commune of the region, then a recap table with one line per
/// value of the layout's `group_by` column.
pub(super) fn build(
    spec: &ReportSpec,
    context: &ReportContext,
    results: &QueryResults,
) -> Result<ReportDocument> {
    let group_by = spec.layout.group_by.as_deref();
    let extra: Vec<&str> = group_by.into_iter().collect();
    let dimensions = dimension_rows(spec, results, &extra)?;
    let columns = bound_columns(spec, results)?;
    let headers: Vec<String> = columns.iter().map(|column| column.header.clone()).collect();

    let mut detail = DataTable::new(spec.layout.title.clone(), key_headers(spec), headers.clone());
    // (group, summed cells) in first-seen order
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for row in dimensions {
        let cells: Vec<Cell> = columns.iter().map(|column| column.cell(&row.key)).collect();
        if let Some(group_column) = group_by {
            let group = row.field(group_column).to_string();
            let index = match groups.iter().position(|(name, _)| *name == group) {
                Some(index) => index,
                None => {
                    groups.push((group, vec![0.0; cells.len()]));
                    groups.len() - 1
                }
            };
            for (sum, cell) in groups[index].1.iter_mut().zip(&cells) {
                *sum += cell.rendered_value();
            }
        }
        detail.push_row(row.labels, cells);
    }

    let mut tables = vec![detail];
    if let Some(group_column) = group_by {
        let header = spec
            .layout
            .keys
            .iter()
            .find(|key| key.column == group_column)
            .map_or_else(|| group_column.to_string(), |key| key.header.clone());
        let title = format!("Récapitulatif par {}", header.to_lowercase());
        let mut recap = DataTable::new(Some(title), vec![header], headers);
        for (group, sums) in groups {
            recap.push_row(vec![group], sums.into_iter().map(Cell::Number).collect());
        }
        tables.push(recap);
    }

    let mut header = header_lines(spec, context);
    if let Some(amount) = context.target().and_then(|target| target.aid_amount()) {
        header.push(format!("Aide unitaire : {} DA", format_amount(amount)));
    }
    Ok(document(spec, context, header, tables))
}

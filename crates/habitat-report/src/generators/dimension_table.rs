use habitat_catalog::ReportSpec;
use habitat_model::ReportContext;

use super::{bound_columns, dimension_rows, document, header_lines, key_headers};
use crate::document::{DataTable, ReportDocument};
use crate::error::Result;
use crate::results::QueryResults;

pub(super) fn build(
    spec: &ReportSpec,
    context: &ReportContext,
    results: &QueryResults,
) -> Result<ReportDocument> {
    let dimensions = dimension_rows(spec, results, &[])?;
    let columns = bound_columns(spec, results)?;

    let mut table = DataTable::new(
        spec.layout.title.clone(),
        key_headers(spec),
        columns.iter().map(|column| column.header.clone()).collect(),
    );
    for row in dimensions {
        let cells = columns.iter().map(|column| column.cell(&row.key)).collect();
        table.push_row(row.labels, cells);
    }

    Ok(document(spec, context, header_lines(spec, context), vec![table]))
}

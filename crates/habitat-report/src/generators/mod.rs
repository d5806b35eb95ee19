//! Layout generators.
//!
//! Each [`GeneratorKind`] variant has one function turning the catalogued
//! layout and the query results into a [`ReportDocument`]. Every generator
//! renders exactly one line per row of the `dimensions` result; values are
//! looked up by key and default to zero when a query has no row for it.

mod commune_distribution;
mod dimension_table;
mod programme_detail;
mod tranche_matrix;

use std::collections::{BTreeMap, HashMap};

use habitat_catalog::{DIMENSIONS_QUERY, GeneratorKind, KEY_COLUMN, ReportSpec};
use habitat_model::ReportContext;
use tracing::debug;

use crate::document::{Cell, DataTable, ReportDocument, sheet_name};
use crate::error::Result;
use crate::results::QueryResults;

const AGENCY_LINES: [&str; 2] = [
    "République algérienne démocratique et populaire",
    "Ministère de l'Habitat, de l'Urbanisme et de la Ville",
];

/// Builds the document for `spec` from the results of its queries.
pub fn build_document(
    spec: &ReportSpec,
    context: &ReportContext,
    results: &QueryResults,
) -> Result<ReportDocument> {
    let document = match spec.generator {
        GeneratorKind::DimensionTable => dimension_table::build(spec, context, results)?,
        GeneratorKind::TrancheMatrix => tranche_matrix::build(spec, context, results)?,
        GeneratorKind::ProgrammeDetail => programme_detail::build(spec, context, results)?,
        GeneratorKind::CommuneDistribution => {
            commune_distribution::build(spec, context, results)?
        }
    };
    debug!(
        report = %spec.name,
        generator = %spec.generator,
        tables = document.tables.len(),
        rows = document.tables.iter().map(|t| t.rows().len()).sum::<usize>(),
        "document built"
    );
    Ok(document)
}

/// One row of the `dimensions` result.
struct DimensionRow {
    key: String,
    labels: Vec<String>,
    fields: BTreeMap<String, String>,
}

impl DimensionRow {
    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

/// Reads the `dimensions` result: key, label columns from the layout and
/// any extra columns the generator asks for.
fn dimension_rows(
    spec: &ReportSpec,
    results: &QueryResults,
    extra: &[&str],
) -> Result<Vec<DimensionRow>> {
    let mut columns: Vec<&str> = vec![KEY_COLUMN];
    columns.extend(spec.layout.keys.iter().map(|key| key.column.as_str()));
    columns.extend(extra.iter().copied());

    let rows = results.text_rows(DIMENSIONS_QUERY, &columns)?;
    let label_count = spec.layout.keys.len();
    Ok(rows
        .into_iter()
        .map(|values| {
            let fields: BTreeMap<String, String> = columns
                .iter()
                .map(|name| (*name).to_string())
                .zip(values.iter().cloned())
                .collect();
            DimensionRow {
                key: values.first().cloned().unwrap_or_default(),
                labels: values.iter().skip(1).take(label_count).cloned().collect(),
                fields,
            }
        })
        .collect())
}

/// A layout column with its values keyed by dimension.
struct BoundColumn {
    key: String,
    header: String,
    values: HashMap<String, f64>,
}

impl BoundColumn {
    fn value(&self, key: &str) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    fn cell(&self, key: &str) -> Cell {
        Cell::amount(self.values.get(key).copied())
    }
}

fn bound_columns(spec: &ReportSpec, results: &QueryResults) -> Result<Vec<BoundColumn>> {
    spec.layout
        .columns
        .iter()
        .map(|column| {
            Ok(BoundColumn {
                key: column.key.clone(),
                header: column.header.clone(),
                values: results.keyed_values(&column.query, &column.value)?,
            })
        })
        .collect()
}

fn key_headers(spec: &ReportSpec) -> Vec<String> {
    spec.layout.keys.iter().map(|key| key.header.clone()).collect()
}

/// Title block shared by every report.
fn header_lines(spec: &ReportSpec, context: &ReportContext) -> Vec<String> {
    let mut lines: Vec<String> = AGENCY_LINES.iter().map(|line| (*line).to_string()).collect();
    lines.push(format!("Direction du logement de la wilaya de {}", context.region()));
    lines.push(spec.display_name.clone());
    lines.push(context.period_label());
    if let Some(target) = context.target() {
        lines.push(target.describe());
    }
    lines
}

fn footer_lines(context: &ReportContext) -> Vec<String> {
    vec![
        "Montants exprimés en dinars algériens (DA).".to_string(),
        format!(
            "Arrêté à la date du {}",
            context.report_date().format("%d/%m/%Y")
        ),
    ]
}

fn document(
    spec: &ReportSpec,
    context: &ReportContext,
    header: Vec<String>,
    tables: Vec<DataTable>,
) -> ReportDocument {
    ReportDocument {
        sheet_name: sheet_name(&spec.display_name),
        header,
        tables,
        footer: footer_lines(context),
    }
}

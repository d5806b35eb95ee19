//! Tests for the command output tables.

use std::path::PathBuf;
use std::time::Duration;

use comfy_table::Table;
use habitat_catalog::ReportCatalog;
use habitat_cli::summary::{
    assignment_table, outcome_table, reports_table, sample_table, schema_table,
    validation_details,
};
use habitat_core::GenerationOutcome;
use habitat_ingest::{FileAssignment, MissingFile, ValidationError};
use habitat_query::TableDescription;
use polars::prelude::*;

/// Cell contents only, one line per row, so snapshots do not depend on
/// terminal width or styling.
fn plain(table: &Table) -> String {
    let mut lines = Vec::new();
    if let Some(header) = table.header() {
        lines.push(row_text(header.cell_iter()));
    }
    for row in table.row_iter() {
        lines.push(row_text(row.cell_iter()));
    }
    lines.join("\n")
}

fn row_text<'a>(cells: impl Iterator<Item = &'a comfy_table::Cell>) -> String {
    cells
        .map(|cell| cell.content().replace('\n', ", "))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[test]
fn test_reports_table_lists_builtin_catalogue() {
    let catalog = ReportCatalog::builtin().unwrap();
    insta::assert_snapshot!(plain(&reports_table(&catalog)), @r"
    Report | Title | Category | Period | Target | Required files
    bilan_semestriel | Bilan semestriel des aides | Bilans | semester | - | Journal_paiements_*.xlsx, Journal_decisions_*.xlsx
    consommation_tranches | Consommation par tranche | Paiements | monthly | - | Journal_paiements_*.xlsx
    situation_mensuelle | Situation mensuelle des paiements | Paiements | monthly | - | Journal_paiements_*.xlsx
    situation_notification | Répartition d'une notification par commune | Programmes | annual | notification | Journal_paiements_*.xlsx, Journal_decisions_*.xlsx
    situation_programme | Situation physique et financière d'un programme | Programmes | annual | programme | Journal_paiements_*.xlsx, Journal_decisions_*.xlsx
    ");
}

#[test]
fn test_reports_table_renders_with_rounded_corners() {
    let catalog = ReportCatalog::builtin().unwrap();
    let rendered = reports_table(&catalog).to_string();
    assert!(rendered.starts_with('╭'));
    assert!(rendered.contains("situation_programme"));
}

#[test]
fn test_assignment_table_is_sorted_by_table_name() {
    let mut assignment = FileAssignment::new();
    assignment.insert(
        "paiements".to_string(),
        PathBuf::from("in/Journal_paiements_2024.csv"),
    );
    assignment.insert(
        "decisions".to_string(),
        PathBuf::from("in/Journal_decisions_2024.xlsx"),
    );
    insta::assert_snapshot!(plain(&assignment_table(&assignment)), @r"
    Table | File
    decisions | in/Journal_decisions_2024.xlsx
    paiements | in/Journal_paiements_2024.csv
    ");
}

#[test]
fn test_validation_details_for_missing_files() {
    let error = ValidationError::MissingFiles {
        report: "bilan_semestriel".to_string(),
        missing: vec![
            MissingFile {
                display: "Journal_paiements_*.xlsx".to_string(),
                table: "paiements".to_string(),
            },
            MissingFile {
                display: "Journal_decisions_*.xlsx".to_string(),
                table: "decisions".to_string(),
            },
        ],
    };
    let lines = validation_details(&error)
        .iter()
        .map(|line| line.trim().to_string())
        .collect::<Vec<_>>();
    insta::assert_snapshot!(lines.join("\n"), @r"
    missing:   Journal_paiements_*.xlsx (loaded as paiements)
    missing:   Journal_decisions_*.xlsx (loaded as decisions)
    ");
}

#[test]
fn test_validation_details_for_unmatched_and_ambiguous_files() {
    let unmatched = ValidationError::UnmatchedFiles {
        report: "situation_mensuelle".to_string(),
        unmatched: vec![PathBuf::from("/tmp/in/notes.txt")],
    };
    assert_eq!(validation_details(&unmatched), vec!["  unmatched: notes.txt"]);

    let ambiguous = ValidationError::AmbiguousFiles {
        display: "Journal_paiements_*.xlsx".to_string(),
        table: "paiements".to_string(),
        files: vec![
            PathBuf::from("/tmp/in/Journal_paiements_a.csv"),
            PathBuf::from("/tmp/in/Journal_paiements_b.csv"),
        ],
    };
    assert_eq!(validation_details(&ambiguous).len(), 2);
    assert!(validation_details(&ambiguous)[0].ends_with("(all match paiements)"));

    let not_found = ValidationError::FileNotFound {
        path: PathBuf::from("/tmp/in/absent.csv"),
    };
    assert!(validation_details(&not_found).is_empty());
}

#[test]
fn test_outcome_table_lists_tables_then_queries() {
    let outcome = GenerationOutcome {
        report: "situation_mensuelle".to_string(),
        output_path: PathBuf::from("out/Situation_mensuelle_Tlemcen_02-04-2024.xlsx"),
        tables: vec![("paiements".to_string(), 5)],
        queries: vec![
            ("dimensions".to_string(), 8),
            ("paiements_mois".to_string(), 1),
            ("paiements_cumul".to_string(), 2),
        ],
        duration: Duration::from_millis(42),
    };
    insta::assert_snapshot!(plain(&outcome_table(&outcome)), @r"
    Step | Name | Rows
    table | paiements | 5
    query | dimensions | 8
    query | paiements_mois | 1
    query | paiements_cumul | 2
    ");
}

#[test]
fn test_schema_table_numbers_columns() {
    let description = TableDescription {
        table: "fichier".to_string(),
        columns: vec![
            ("N° Ordre".to_string(), "str".to_string()),
            ("Montant".to_string(), "f64".to_string()),
        ],
    };
    insta::assert_snapshot!(plain(&schema_table(&description)), @r"
    # | Column | Type
    1 | N° Ordre | str
    2 | Montant | f64
    ");
}

#[test]
fn test_sample_table_shows_missing_values_as_dash() {
    let frame = df!(
        "Commune" => ["Tlemcen", "Mansourah"],
        "Montant" => [Some(350000.0), None],
    )
    .unwrap();
    insta::assert_snapshot!(plain(&sample_table(&frame)), @r"
    Commune | Montant
    Tlemcen | 350000
    Mansourah | -
    ");
}

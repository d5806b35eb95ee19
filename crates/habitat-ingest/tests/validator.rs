use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tempfile::TempDir;

use habitat_catalog::ReportCatalog;
use habitat_ingest::{ValidationError, validate_files};

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "N° Ordre;Montant\n").unwrap();
    path
}

fn catalog() -> ReportCatalog {
    ReportCatalog::builtin().unwrap()
}

#[test]
fn test_single_file_report_is_assigned() {
    let dir = TempDir::new().unwrap();
    let payments = touch(dir.path(), "Journal_Paiements_Mars_2024.xlsx");

    let assignment =
        validate_files(&catalog(), "situation_mensuelle", std::slice::from_ref(&payments)).unwrap();
    assert_eq!(assignment.len(), 1);
    assert_eq!(assignment.get("paiements"), Some(&payments));
}

#[test]
fn test_unrelated_file_is_reported_as_unmatched() {
    let dir = TempDir::new().unwrap();
    let payments = touch(dir.path(), "Journal_paiements_2024.xlsx");
    let notes = touch(dir.path(), "notes.txt");

    let error = validate_files(&catalog(), "situation_mensuelle", &[payments, notes.clone()])
        .unwrap_err();
    match &error {
        ValidationError::UnmatchedFiles { unmatched, .. } => assert_eq!(unmatched, &vec![notes]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.to_string().contains("notes.txt"));
}

#[test]
fn test_missing_pattern_is_listed_by_display_form() {
    let dir = TempDir::new().unwrap();
    let payments = touch(dir.path(), "journal_paiements_s1.csv");

    let error = validate_files(&catalog(), "bilan_semestriel", &[payments]).unwrap_err();
    match &error {
        ValidationError::MissingFiles { missing, .. } => {
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].display, "Journal_decisions_*.xlsx");
            assert_eq!(missing[0].table, "decisions");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.to_string().contains("Journal_decisions_*.xlsx"));
}

#[test]
fn test_missing_inputs_are_reported_before_unmatched_files() {
    let dir = TempDir::new().unwrap();
    let notes = touch(dir.path(), "notes.txt");

    let error = validate_files(&catalog(), "bilan_semestriel", &[notes]).unwrap_err();
    match error {
        ValidationError::MissingFiles { missing, .. } => assert_eq!(missing.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nonexistent_path_fails_fast() {
    let dir = TempDir::new().unwrap();
    let payments = touch(dir.path(), "Journal_paiements_2024.xlsx");
    let ghost = dir.path().join("Journal_decisions_2024.xlsx");
    let other_ghost = dir.path().join("absent.xlsx");

    let error = validate_files(
        &catalog(),
        "bilan_semestriel",
        &[payments, ghost.clone(), other_ghost],
    )
    .unwrap_err();
    match error {
        ValidationError::FileNotFound { path } => assert_eq!(path, ghost),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_two_files_for_one_input_are_ambiguous() {
    let dir = TempDir::new().unwrap();
    let first = touch(dir.path(), "Journal_paiements_janvier.xlsx");
    let second = touch(dir.path(), "Journal_paiements_fevrier.xlsx");

    let error = validate_files(&catalog(), "situation_mensuelle", &[first, second]).unwrap_err();
    assert!(matches!(error, ValidationError::AmbiguousFiles { ref files, .. } if files.len() == 2));
}

#[test]
fn test_unknown_report() {
    let error = validate_files(&catalog(), "inconnu", &[]).unwrap_err();
    assert!(matches!(error, ValidationError::UnknownReport(_)));
    assert!(error.to_string().contains("bilan_semestriel"));
}

fn pool(dir: &Path) -> Vec<PathBuf> {
    [
        "Journal_paiements_2024.xlsx",
        "Journal_decisions_2024.xlsx",
        "JOURNAL_DECISIONS_S1.CSV",
        "notes.txt",
        "Journal_engagements_2024.xlsx",
    ]
    .iter()
    .map(|name| touch(dir, name))
    .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn validation_never_returns_a_partial_mapping(picks in proptest::sample::subsequence((0..5usize).collect::<Vec<_>>(), 0..=5)) {
        let dir = TempDir::new().unwrap();
        let files = pool(dir.path());
        let candidates: Vec<PathBuf> = picks.iter().map(|&idx| files[idx].clone()).collect();

        if let Ok(assignment) = validate_files(&catalog(), "bilan_semestriel", &candidates) {
            let keys: BTreeSet<&str> = assignment.keys().map(String::as_str).collect();
            prop_assert_eq!(keys, BTreeSet::from(["decisions", "paiements"]));
        }
    }

    #[test]
    fn validation_ignores_candidate_order(
        valid in Just(vec![0usize, 1]).prop_shuffle(),
        with_extra in Just(vec![0usize, 1, 3]).prop_shuffle(),
    ) {
        let dir = TempDir::new().unwrap();
        let files = pool(dir.path());
        let pick = |indices: &[usize]| -> Vec<PathBuf> {
            indices.iter().map(|&idx| files[idx].clone()).collect()
        };

        let assignment = validate_files(&catalog(), "bilan_semestriel", &pick(&valid)).unwrap();
        prop_assert_eq!(assignment.get("paiements"), Some(&files[0]));
        prop_assert_eq!(assignment.get("decisions"), Some(&files[1]));

        let error = validate_files(&catalog(), "bilan_semestriel", &pick(&with_extra)).unwrap_err();
        let names_notes = matches!(
            error,
            ValidationError::UnmatchedFiles { ref unmatched, .. } if unmatched == &vec![files[3].clone()]
        );
        prop_assert!(names_notes);
    }
}

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use habitat_common::{any_to_f64, any_to_i64};
use habitat_query::{QueryEngine, QueryError};

fn payments() -> DataFrame {
    let cols: Vec<Column> = vec![
        Series::new(
            " Date OV ".into(),
            vec!["04/03/2024", "18/03/2024", "02/04/2024"],
        )
        .into_column(),
        Series::new("Programme".into(), vec!["RURAL", "RURAL", "LPA"]).into_column(),
        Series::new("Montant".into(), vec![350_000.0, 300_000.0, 500_000.0]).into_column(),
    ];
    DataFrame::new(cols).unwrap()
}

fn scalar_f64(frame: &DataFrame) -> Option<f64> {
    frame.get_columns()[0].get(0).ok().and_then(any_to_f64)
}

#[test]
fn test_execute_before_any_table_fails() {
    let mut engine = QueryEngine::new();
    assert!(matches!(
        engine.execute("SELECT 1 AS one"),
        Err(QueryError::NoDataLoaded)
    ));
}

#[test]
fn test_column_names_are_trimmed() {
    let mut engine = QueryEngine::new();
    engine.create_table("paiements", payments()).unwrap();

    let description = engine.describe("paiements").unwrap();
    let names: Vec<&str> = description
        .columns
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, vec!["Date OV", "Programme", "Montant"]);
}

#[test]
fn test_execute_filters_by_month() {
    let mut engine = QueryEngine::new();
    engine.create_table("paiements", payments()).unwrap();

    let frame = engine
        .execute(
            r#"SELECT SUM("Montant") AS total FROM paiements WHERE "Date OV" LIKE '%/03/2024'"#,
        )
        .unwrap();
    assert_eq!(scalar_f64(&frame), Some(650_000.0));
}

#[test]
fn test_execution_error_keeps_query_text() {
    let mut engine = QueryEngine::new();
    engine.create_table("paiements", payments()).unwrap();

    let query = "SELECT * FROM decisions";
    match engine.execute(query) {
        Err(QueryError::Execution { query: failed, .. }) => assert_eq!(failed, query),
        other => panic!("expected execution error, got {other:?}"),
    }
}

#[test]
fn test_create_table_overwrites_previous_registration() {
    let mut engine = QueryEngine::new();
    engine.create_table("paiements", payments()).unwrap();
    let single = DataFrame::new(vec![
        Series::new("Montant".into(), vec![1.0]).into_column(),
    ])
    .unwrap();
    engine.create_table("paiements", single).unwrap();

    assert_eq!(engine.count_records("paiements").unwrap(), 1);
    assert_eq!(engine.table_names(), vec!["paiements".to_string()]);
}

#[test]
fn test_conveniences_on_registered_tables() {
    let mut engine = QueryEngine::new();
    engine.create_table("paiements", payments()).unwrap();

    assert_eq!(engine.count_records("paiements").unwrap(), 3);
    assert_eq!(engine.sample("paiements", 2).unwrap().height(), 2);
    assert!(matches!(
        engine.count_records("decisions"),
        Err(QueryError::UnknownTable { .. })
    ));

    let counted = engine
        .execute("SELECT COUNT(*) AS n FROM paiements WHERE \"Programme\" = 'RURAL'")
        .unwrap();
    assert_eq!(
        counted.get_columns()[0].get(0).ok().and_then(any_to_i64),
        Some(2)
    );
}

#[test]
fn test_close_is_idempotent_and_final() {
    let mut engine = QueryEngine::new();
    engine.create_table("paiements", payments()).unwrap();
    engine.close();
    engine.close();

    assert!(engine.is_closed());
    assert!(!engine.has_table("paiements"));
    assert!(matches!(
        engine.execute("SELECT * FROM paiements"),
        Err(QueryError::Closed)
    ));
    assert!(matches!(
        engine.create_table("paiements", payments()),
        Err(QueryError::Closed)
    ));
}

use chrono::NaiveDate;
use proptest::prelude::*;

use habitat_model::{ReportContext, TargetDimension};
use habitat_query::{TemplateError, Token, placeholders, render_query};

const PAYMENTS_BY_MONTH: &str = r#"SELECT * FROM paiements WHERE "Date OV" LIKE '%/{month}/{year}'"#;
const PAYMENTS_BY_PADDED_MONTH: &str =
    r#"SELECT * FROM paiements WHERE "Date OV" LIKE '%/{month:02}/{year}'"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn march_2024() -> ReportContext {
    ReportContext::builder("Tlemcen", 2024)
        .month(3)
        .build_as_of(today())
        .unwrap()
}

fn notification_context() -> ReportContext {
    ReportContext::builder("Aïn Témouchent", 2024)
        .target(TargetDimension::Notification {
            reference: "N-2020-007".to_string(),
            subprogram: "RUR-2020".to_string(),
            programme: "RURAL".to_string(),
            aid_amount: 1_000_000.0,
        })
        .build_as_of(today())
        .unwrap()
}

#[test]
fn test_unpadded_month() {
    let rendered = render_query(PAYMENTS_BY_MONTH, &march_2024()).unwrap();
    assert!(rendered.ends_with("LIKE '%/3/2024'"));
}

#[test]
fn test_padded_month() {
    let rendered = render_query(PAYMENTS_BY_PADDED_MONTH, &march_2024()).unwrap();
    insta::assert_snapshot!(rendered, @r#"SELECT * FROM paiements WHERE "Date OV" LIKE '%/03/2024'"#);
}

#[test]
fn test_target_tokens() {
    let template = "SELECT '{region}' AS wilaya, {aid_amount} AS aide \
                    FROM decisions WHERE \"Notification\" = '{notification}' \
                    AND \"Sous-programme\" = '{subprogram}' AND \"Programme\" = '{programme}'";
    let rendered = render_query(template, &notification_context()).unwrap();
    insta::assert_snapshot!(rendered, @r#"SELECT 'Aïn Témouchent' AS wilaya, 1000000 AS aide FROM decisions WHERE "Notification" = 'N-2020-007' AND "Sous-programme" = 'RUR-2020' AND "Programme" = 'RURAL'"#);
}

#[test]
fn test_semester_tokens() {
    let context = ReportContext::builder("Oran", 2025)
        .semester(2)
        .build_as_of(today())
        .unwrap();
    let rendered = render_query(
        "BETWEEN '{semester_start:02}' AND '{semester_end:02}' -- S{semester}",
        &context,
    )
    .unwrap();
    assert_eq!(rendered, "BETWEEN '07' AND '12' -- S2");
}

#[test]
fn test_region_quotes_are_escaped() {
    let context = ReportContext::builder("Aïn M'lila", 2024)
        .build_as_of(today())
        .unwrap();
    let rendered = render_query("WHERE wilaya = '{region}'", &context).unwrap();
    assert_eq!(rendered, "WHERE wilaya = 'Aïn M''lila'");
}

#[test]
fn test_unknown_placeholder_is_an_error() {
    let error = render_query("WHERE m = {mois}", &march_2024()).unwrap_err();
    assert_eq!(
        error,
        TemplateError::UnknownPlaceholder {
            placeholder: "{mois}".to_string()
        }
    );
}

#[test]
fn test_missing_value_is_an_error() {
    let annual = ReportContext::builder("Tlemcen", 2024)
        .build_as_of(today())
        .unwrap();
    assert_eq!(
        render_query(PAYMENTS_BY_MONTH, &annual).unwrap_err(),
        TemplateError::MissingValue {
            placeholder: "{month}".to_string()
        }
    );
    assert!(matches!(
        render_query("'{programme}'", &annual),
        Err(TemplateError::MissingValue { .. })
    ));
}

#[test]
fn test_width_on_text_token_is_rejected() {
    assert_eq!(
        render_query("'{region:02}'", &march_2024()).unwrap_err(),
        TemplateError::InvalidFormat {
            placeholder: "{region:02}".to_string()
        }
    );
}

#[test]
fn test_placeholders_resolve_to_tokens() {
    let tokens: Vec<Option<Token>> = placeholders(PAYMENTS_BY_PADDED_MONTH)
        .iter()
        .map(|placeholder| placeholder.token())
        .collect();
    assert_eq!(tokens, vec![Some(Token::Month), Some(Token::Year)]);
}

proptest! {
    #[test]
    fn month_and_year_substitute_in_any_order(year in 2000i32..=2025, month in 1u32..=12) {
        let context = ReportContext::builder("Oran", year)
            .month(month)
            .build_as_of(today())
            .unwrap();
        let rendered = render_query("{year}-{month:02}|{month}/{year}", &context).unwrap();
        prop_assert_eq!(rendered, format!("{year}-{month:02}|{month}/{year}"));
    }

    #[test]
    fn text_without_placeholders_is_unchanged(text in "[A-Za-z0-9 ,.*=<>'\"%/()-]{0,80}") {
        let rendered = render_query(&text, &march_2024()).unwrap();
        prop_assert_eq!(rendered, text);
    }
}

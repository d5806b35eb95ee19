use std::path::PathBuf;

use polars::prelude::DataType;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::TempDir;

use habitat_common::{any_to_f64, any_to_string};
use habitat_ingest::{IngestError, load_table};

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const PAYMENTS_CSV: &str = "\
Direction du logement de la wilaya de Tlemcen;;;
Journal des paiements - Mars 2024;;;
;;;
N° Ordre ; Date OV ;Sous-programme;Montant;
1;04/03/2024;RUR-2020;700 000,00;
2;18/03/2024;RUR-2020;300000;
;;;
3;02/04/2024;LPA-2022;;
";

#[test]
fn test_csv_below_title_rows() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "Journal_paiements_2024.csv", PAYMENTS_CSV.as_bytes());

    let frame = load_table(&path).unwrap();
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(
        names,
        vec!["N° Ordre", "Date OV", "Sous-programme", "Montant", "colonne_5"]
    );
    assert_eq!(frame.height(), 3);

    let amounts = frame.column("Montant").unwrap();
    assert_eq!(amounts.dtype(), &DataType::Float64);
    assert_eq!(amounts.get(0).ok().and_then(any_to_f64), Some(700_000.0));
    assert_eq!(amounts.null_count(), 1);

    let dates = frame.column("Date OV").unwrap();
    assert_eq!(dates.dtype(), &DataType::String);
    assert_eq!(any_to_string(dates.get(2).unwrap()), "02/04/2024");

    assert_eq!(frame.column("colonne_5").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_semicolon_csv_with_unpadded_title_line() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "Journal_paiements_2024.csv",
        "Journal des paiements\nN° Ordre;Date OV;Sous-programme;Montant\n1;04/03/2024;RUR-2020;700000\n"
            .as_bytes(),
    );

    let frame = load_table(&path).unwrap();
    assert_eq!(frame.width(), 4);
    assert_eq!(frame.height(), 1);
    let amounts = frame.column("Montant").unwrap();
    assert_eq!(amounts.get(0).ok().and_then(any_to_f64), Some(700_000.0));
}

#[test]
fn test_latin1_csv_with_decision_marker() {
    let dir = TempDir::new().unwrap();
    let mut content = b"Code d\xe9cision,Commune,Montant aide\n".to_vec();
    content.extend_from_slice(b"D-001,B\xe9ja\xefa,700000\n");
    let path = write(&dir, "journal_decisions.csv", &content);

    let frame = load_table(&path).unwrap();
    assert_eq!(frame.height(), 1);
    let commune = frame.column("Commune").unwrap().get(0).unwrap();
    assert_eq!(any_to_string(commune), "Béjaïa");
}

#[test]
fn test_header_only_loads_empty_table() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "Journal_paiements_vide.csv", "N° Ordre;Montant\n".as_bytes());

    let frame = load_table(&path).unwrap();
    assert_eq!(frame.height(), 0);
    assert_eq!(frame.width(), 2);
}

#[test]
fn test_missing_marker_fails() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "Journal_paiements_x.csv", "Numero;Montant\n1;2\n".as_bytes());

    let error = load_table(&path).unwrap_err();
    assert!(matches!(error, IngestError::HeaderNotFound { .. }));
}

#[test]
fn test_unsupported_extension_and_encoding() {
    let dir = TempDir::new().unwrap();
    let text = write(&dir, "notes.txt", b"N\xc2\xb0 Ordre\n");
    assert!(matches!(
        load_table(&text),
        Err(IngestError::UnsupportedFormat { .. })
    ));

    let utf16 = write(&dir, "journal.csv", &[0xFF, 0xFE, b'N', 0]);
    assert!(matches!(
        load_table(&utf16),
        Err(IngestError::UnsupportedEncoding { .. })
    ));

    assert!(matches!(
        load_table(&dir.path().join("absent.csv")),
        Err(IngestError::FileNotFound { .. })
    ));
}

#[test]
fn test_xlsx_with_dates_and_numbers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Journal_paiements_2024.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Journal des paiements").unwrap();
    sheet.write_string(2, 0, "N° Ordre").unwrap();
    sheet.write_string(2, 1, "Date OV").unwrap();
    sheet.write_string(2, 2, "Montant").unwrap();
    sheet.write_number(3, 0, 1.0).unwrap();
    sheet
        .write_datetime_with_format(
            3,
            1,
            &ExcelDateTime::from_ymd(2024, 3, 4).unwrap(),
            &date_format,
        )
        .unwrap();
    sheet.write_number(3, 2, 700_000.0).unwrap();
    workbook.save(&path).unwrap();

    let frame = load_table(&path).unwrap();
    assert_eq!(frame.height(), 1);
    let date = frame.column("Date OV").unwrap().get(0).unwrap();
    assert_eq!(any_to_string(date), "04/03/2024");
    let amount = frame.column("Montant").unwrap().get(0).ok();
    assert_eq!(amount.and_then(any_to_f64), Some(700_000.0));
}

use std::io::{Cursor, Read};

use chrono::{NaiveDate, Utc};
use ocx_model::Model;
use ocx_workbook::{write_workbook, ReportSettings};
use serde_json::json;

fn model() -> Model {
    let mut model = Model::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), Utc::now());
    let records = [
        json!({ "object_type": "ISSUER", "legal_name": "Fred Inc." }),
        json!({ "object_type": "STAKEHOLDER", "id": "joe", "name": { "legal_name": "Joe" } }),
        json!({
            "object_type": "STOCK_CLASS", "id": "common", "name": "Common",
            "class_type": "COMMON",
        }),
        json!({
            "object_type": "TX_STOCK_ISSUANCE", "security_id": "s1",
            "stakeholder_id": "joe", "stock_class_id": "common", "quantity": "100",
        }),
    ];
    for record in records {
        model.consume_value(record).unwrap();
    }
    model
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn workbook_is_an_xlsx_package() {
    let bytes = write_workbook(&model(), &ReportSettings::default()).unwrap();
    assert!(bytes.starts_with(b"PK"));

    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("Stakeholder Ledger"));
}

#[test]
fn formulas_are_stored_without_leading_equals() {
    let bytes = write_workbook(&model(), &ReportSettings::default()).unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<f>SUM(C6)</f>"), "{sheet}");
}

#[test]
fn sheet_name_comes_from_settings() {
    let settings = ReportSettings::from_json_str(r#"{"sheet_name": "Cap Table"}"#).unwrap();
    let bytes = write_workbook(&model(), &settings).unwrap();
    assert!(read_part(&bytes, "xl/workbook.xml").contains("Cap Table"));
}

#[test]
fn invalid_sheet_name_is_an_error() {
    let settings = ReportSettings {
        sheet_name: "bad/name".to_string(),
        ..ReportSettings::default()
    };
    assert!(write_workbook(&model(), &settings).is_err());
}

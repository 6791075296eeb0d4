//! End-to-end: files -> normalization -> typed records -> export
//!
//! Covers:
//! - Structural equality properties the diff relies on
//! - Spreadsheet headers matched exactly, fuzzily and via configured aliases
//! - Required-key validation
//! - Export output reading back in unchanged

use serde_json::{json, Value};
use std::fs;
use tapp_common::config::TomlConfig;
use tapp_import::cli::{configured_schema, run_diff, run_normalize};
use tapp_import::export::{json_payload, spreadsheet_rows};
use tapp_import::files::{read_import_file, write_csv, write_json};
use tapp_import::models::{Instructor, MinimalPosition, Position};
use tapp_import::normalize::{normalize_import, parse_records};
use tapp_import::{is_same, DataContext, Entity, ImportData, RowNormalizer};
use tempfile::TempDir;

#[test]
fn test_is_same_properties() {
    let record = json!({"utorid": "smithh", "hours": 70.5, "tags": ["a", "b"], "x": null});
    assert!(is_same(&record, &record));

    assert!(is_same(&Value::Null, &json!("")));
    assert!(!is_same(&json!(0), &json!("")));
    assert!(!is_same(&json!(false), &Value::Null));

    // Array order is not significant
    assert!(is_same(&json!([1, 2]), &json!([2, 1])));
    assert!(!is_same(&json!([1, 2]), &json!([1, 2, 2])));

    assert!(is_same(&json!(70), &json!(70.0)));
    assert!(!is_same(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
}

#[test]
fn test_spreadsheet_import_with_fuzzy_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("instructors.csv");
    fs::write(
        &path,
        "Family Names,Given Name,UTORID,E-mail Address,Office\n\
         Smith,Henry,smithh,henry@x.ca,BA1234\n\
         Doe,Jane,doej,,BA4321\n",
    )
    .unwrap();

    let data = read_import_file(&path).unwrap();
    let ImportData::Spreadsheet(rows) = &data else {
        panic!("expected spreadsheet rows");
    };

    let schema = Instructor::schema();
    let mut normalizer = RowNormalizer::new(&schema);
    let first = normalizer.normalize_row(&rows[0]).unwrap();
    let second = normalizer.normalize_row(&rows[1]).unwrap();

    assert_eq!(
        Value::Object(first),
        json!({"last_name": "Smith", "first_name": "Henry", "utorid": "smithh", "email": "henry@x.ca"})
    );
    assert_eq!(
        Value::Object(second),
        json!({"last_name": "Doe", "first_name": "Jane", "utorid": "doej"})
    );
    assert_eq!(
        normalizer.empirical_key_map().get("Family Names").map(String::as_str),
        Some("last_name")
    );
    assert!(normalizer.unknown_columns().contains("Office"));
}

#[test]
fn test_configured_alias_maps_header() {
    let mut config = TomlConfig::default();
    config
        .import
        .key_aliases
        .entry("instructors".to_string())
        .or_default()
        .insert("Nom".to_string(), "last_name".to_string());

    let data = ImportData::Spreadsheet(vec![json!({"Nom": "Smith", "UTORid": "smithh"})
        .as_object()
        .unwrap()
        .clone()]);
    let rows = normalize_import(&data, &configured_schema::<Instructor>(&config), 0.7).unwrap();
    assert_eq!(rows[0]["last_name"], "Smith");
}

#[test]
fn test_surname_header_with_default_schema() {
    let data = ImportData::Spreadsheet(vec![
        json!({"Surname": "Smith", "UTORid": "smithh"}).as_object().unwrap().clone(),
        json!({"Surname": "Doe", "UTORid": "doej"}).as_object().unwrap().clone(),
    ]);
    let rows = normalize_import(&data, &Instructor::schema(), 0.7).unwrap();
    assert_eq!(rows[0]["last_name"], "Smith");
    assert_eq!(rows[1]["last_name"], "Doe");
}

#[test]
fn test_missing_required_key_is_reported() {
    let data = ImportData::Json(json!({"instructors": [
        {"utorid": "smithh"},
        {"last_name": "Nobody", "utorid": "  "}
    ]}));
    let err = normalize_import(&data, &Instructor::schema(), 0.7).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("utorid"), "{}", message);
    assert!(message.contains("Nobody"), "{}", message);
}

#[test]
fn test_spreadsheet_dates_and_numbers() {
    let data = ImportData::Spreadsheet(vec![json!({
        "Course Code": "CSC100H1F",
        "Hours per Assignment": "70",
        "Start Date": 44440,
        "End Date": "December 31, 2021",
        "Instructors": "smithh; Doe, Jane"
    })
    .as_object()
    .unwrap()
    .clone()]);

    let rows = normalize_import(&data, &Position::schema(), 0.7).unwrap();
    let positions: Vec<MinimalPosition> = parse_records(rows).unwrap();
    assert_eq!(positions[0].hours_per_assignment, Some(70.0));
    // Excel serial 44440 is 2021-09-01
    assert_eq!(positions[0].start_date.as_deref(), Some("2021-09-01"));
    assert_eq!(positions[0].end_date.as_deref(), Some("2021-12-31"));
    assert_eq!(positions[0].instructors, vec!["smithh", "Doe, Jane"]);
}

#[test]
fn test_float_count_cells_parse_as_integers() {
    let data = ImportData::Spreadsheet(vec![json!({
        "Course Code": "CSC100H1F",
        "Desired Number of Assignments": "3.0",
        "Current Enrollment": "250"
    })
    .as_object()
    .unwrap()
    .clone()]);

    let rows = normalize_import(&data, &Position::schema(), 0.7).unwrap();
    let positions: Vec<MinimalPosition> = parse_records(rows).unwrap();
    assert_eq!(positions[0].desired_num_assignments, Some(3));
    assert_eq!(positions[0].current_enrollment, Some(250));
}

#[test]
fn test_exported_csv_reads_back_unchanged() {
    let store: DataContext = serde_json::from_value(json!({
        "instructors": [
            {"id": 1, "utorid": "smithh", "first_name": "Henry", "last_name": "Smith"},
            {"id": 2, "utorid": "doej", "first_name": "Jane", "last_name": "Doe", "email": "jane@x.ca"}
        ],
        "positions": [{
            "id": 10,
            "position_code": "CSC100H1F",
            "hours_per_assignment": 70.0,
            "start_date": "2021-09-01T00:00:00.000Z",
            "end_date": "2021-12-31T00:00:00.000Z",
            "instructors": [
                {"id": 1, "utorid": "smithh", "first_name": "Henry", "last_name": "Smith"},
                {"id": 2, "utorid": "doej", "first_name": "Jane", "last_name": "Doe"}
            ]
        }]
    }))
    .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("positions.csv");
    write_csv(&path, &spreadsheet_rows(&store.positions).unwrap()).unwrap();

    let rows = normalize_import(&read_import_file(&path).unwrap(), &Position::schema(), 0.7).unwrap();
    let reread: Vec<MinimalPosition> = parse_records(rows).unwrap();
    assert_eq!(reread, vec![store.positions[0].to_minimal()]);
}

#[test]
fn test_cli_normalize_and_diff_json() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store.json");
    let store = json!({
        "instructors": [
            {"id": 1, "utorid": "smithh", "first_name": "Henry", "last_name": "Smith", "email": "new@x.ca"}
        ]
    });
    write_json(&store_path, &store).unwrap();

    let store: DataContext = serde_json::from_value(store).unwrap();
    let export_path = dir.path().join("instructors.json");
    write_json(&export_path, &json_payload(&store.instructors).unwrap()).unwrap();

    let config = TomlConfig::default();
    let normalized = run_normalize::<Instructor>(&export_path, &config).unwrap();
    assert_eq!(normalized["instructors"][0]["email"], "new@x.ca");

    let import_path = dir.path().join("import.csv");
    fs::write(&import_path, "First Name,UTORid,Email\nHenry,smithh,OLD@utoronto.ca\nAda,leea,\n").unwrap();

    let diffs = run_diff::<Instructor>(&import_path, &store_path, false, &config).unwrap();
    assert_eq!(diffs[0]["status"], "modified");
    assert_eq!(diffs[0]["changes"]["email"], "\"new@x.ca\" → \"OLD@utoronto.ca\"");
    assert_eq!(diffs[0]["obj"]["id"], 1);
    assert_eq!(diffs[1]["status"], "new");
    assert!(diffs[1]["obj"].get("id").is_none());

    let changed = run_diff::<Instructor>(&import_path, &store_path, true, &config).unwrap();
    assert_eq!(changed.as_array().unwrap().len(), 2);
}

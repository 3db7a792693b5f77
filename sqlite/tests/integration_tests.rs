//! Integration tests for the shp-meta-sqlite crate.

use chrono::NaiveDate;
use shp_meta_core::{FieldType, FieldValue, MetadataRecord, parse_filter};
use shp_meta_sqlite::{DISTINCT_VALUE_LIMIT, IndexError, MetadataIndex};

fn date(text: &str) -> FieldValue {
    FieldValue::Date(NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap())
}

/// Builds a record with the shared test field set.
fn scene(path: &str, satellite: &str, cloud: i64, acquired: &str, scale: Option<f64>) -> MetadataRecord {
    let mut record = MetadataRecord::new();
    record
        .try_push("source_path", FieldType::Text, FieldValue::from(path))
        .unwrap();
    record
        .try_push("satellite", FieldType::Text, FieldValue::from(satellite))
        .unwrap();
    record
        .try_push("cloudperce", FieldType::Integer, FieldValue::Int(cloud))
        .unwrap();
    record
        .try_push("acquisitio", FieldType::Date, date(acquired))
        .unwrap();
    record
        .try_push(
            "scale_x",
            FieldType::Real,
            scale.map_or(FieldValue::Null, FieldValue::Float),
        )
        .unwrap();
    record
}

fn sample_records() -> Vec<MetadataRecord> {
    vec![
        scene("a.zip", "Landsat-8", 12, "2024-03-17", Some(30.0)),
        scene("b.zip", "Landsat-8", 44, "2024-02-01", Some(30.0)),
        scene("c.zip", "SAOCOM-1A", 3, "2024-03-18", None),
    ]
}

fn built_index() -> MetadataIndex {
    let mut index = MetadataIndex::open_in_memory().unwrap();
    index.rebuild(&sample_records()).unwrap();
    index
}

#[test]
fn rebuild_inserts_one_row_per_record() {
    let index = built_index();
    assert_eq!(index.row_count().unwrap(), 3);
}

#[test]
fn rebuild_replaces_rather_than_merges() {
    let mut index = MetadataIndex::open_in_memory().unwrap();
    index.rebuild(&sample_records()).unwrap();
    let report = index
        .rebuild(&[scene("only.zip", "Landsat-8", 1, "2024-01-01", None)])
        .unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(index.row_count().unwrap(), 1);
}

#[test]
fn rebuild_is_idempotent() {
    let mut index = MetadataIndex::open_in_memory().unwrap();
    let first = index.rebuild(&sample_records()).unwrap();
    let second = index.rebuild(&sample_records()).unwrap();
    assert_eq!(first.inserted, second.inserted);
    assert_eq!(index.row_count().unwrap(), 3);
}

#[test]
fn rebuild_skips_mismatched_records() {
    let mut other = MetadataRecord::new();
    other
        .try_push("source_path", FieldType::Text, FieldValue::from("odd.zip"))
        .unwrap();
    other
        .try_push("unrelated", FieldType::Text, FieldValue::from("x"))
        .unwrap();

    let mut records = sample_records();
    records.push(other);

    let mut index = MetadataIndex::open_in_memory().unwrap();
    let report = index.rebuild(&records).unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.mismatched, 1);
    assert_eq!(index.row_count().unwrap(), 3);
}

#[test]
fn rebuild_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scenes.db");
    {
        let mut index = MetadataIndex::open(&db_path).unwrap();
        index.rebuild(&sample_records()).unwrap();
    }
    let reopened = MetadataIndex::open(&db_path).unwrap();
    assert_eq!(reopened.row_count().unwrap(), 3);
}

#[test]
fn catalog_preserves_names_and_types() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    assert_eq!(
        catalog.names().collect::<Vec<_>>(),
        vec!["source_path", "satellite", "cloudperce", "acquisitio", "scale_x"]
    );
    assert_eq!(catalog.field_type("acquisitio"), Some(FieldType::Date));
    assert_eq!(catalog.field_type("scale_x"), Some(FieldType::Real));
}

#[test]
fn field_info_reports_distinct_values() {
    let index = built_index();
    let info = index.field_info("satellite").unwrap();
    assert_eq!(info.ty, FieldType::Text);
    assert_eq!(info.distinct_count, 2);
    assert_eq!(
        info.values.unwrap(),
        vec![FieldValue::from("Landsat-8"), FieldValue::from("SAOCOM-1A")]
    );
}

#[test]
fn field_info_omits_values_above_cardinality_limit() {
    let records: Vec<MetadataRecord> = (0..(DISTINCT_VALUE_LIMIT + 5))
        .map(|i| {
            scene(
                &format!("{i}.zip"),
                &format!("sat-{i}"),
                i as i64,
                "2024-01-01",
                None,
            )
        })
        .collect();
    let mut index = MetadataIndex::open_in_memory().unwrap();
    index.rebuild(&records).unwrap();

    let info = index.field_info("satellite").unwrap();
    assert_eq!(info.distinct_count, DISTINCT_VALUE_LIMIT + 5);
    assert!(info.values.is_none());
}

#[test]
fn field_info_ignores_nulls() {
    let index = built_index();
    let info = index.field_info("scale_x").unwrap();
    assert_eq!(info.distinct_count, 1);
    assert_eq!(info.values.unwrap(), vec![FieldValue::Float(30.0)]);
}

#[test]
fn field_info_unknown_field_fails() {
    let index = built_index();
    assert!(matches!(
        index.field_info("orbit"),
        Err(IndexError::UnknownField(_))
    ));
}

#[test]
fn search_equality() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    let filter = parse_filter("satellite = 'SAOCOM-1A'", &catalog).unwrap();
    let rows = index.search(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("source_path"), Some(&FieldValue::from("c.zip")));
}

#[test]
fn search_conjunction_applies_every_condition() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    let filter = parse_filter("satellite = 'Landsat-8' & cloudperce < 40", &catalog).unwrap();
    let rows = index.search(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("cloudperce"), Some(&FieldValue::Int(12)));
}

#[test]
fn search_date_range() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    let filter = parse_filter("acquisitio >= 2024-03-01", &catalog).unwrap();
    let rows = index.search(&filter).unwrap();
    let paths: Vec<_> = rows
        .iter()
        .map(|r| r.get("source_path").unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["a.zip", "c.zip"]);
}

#[test]
fn search_membership() {
    let index = built_index();
    let catalog = index.catalog().unwrap();

    let filter = parse_filter("satellite in ['SAOCOM-1A', 'SAC-D']", &catalog).unwrap();
    assert_eq!(index.search(&filter).unwrap().len(), 1);

    let filter = parse_filter("satellite not in ['SAOCOM-1A']", &catalog).unwrap();
    assert_eq!(index.search(&filter).unwrap().len(), 2);
}

#[test]
fn search_null_never_matches_comparisons() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    // c.zip has a null scale_x; neither = nor != can match it.
    let filter = parse_filter("scale_x != 99.0", &catalog).unwrap();
    let rows = index.search(&filter).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn search_returns_typed_values() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    let filter = parse_filter("source_path = 'a.zip'", &catalog).unwrap();
    let rows = index.search(&filter).unwrap();
    assert_eq!(rows[0].get("acquisitio"), Some(&date("2024-03-17")));
    assert_eq!(rows[0].get("scale_x"), Some(&FieldValue::Float(30.0)));
}

#[test]
fn search_rows_are_ordered_by_identity() {
    let index = built_index();
    let catalog = index.catalog().unwrap();
    let filter = parse_filter("cloudperce >= 0", &catalog).unwrap();
    let rows = index.search(&filter).unwrap();
    let paths: Vec<_> = rows
        .iter()
        .map(|r| r.get("source_path").unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["a.zip", "b.zip", "c.zip"]);
}

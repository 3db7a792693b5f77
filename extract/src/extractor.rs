//! Assembles a [`MetadataRecord`] from one zipped shapefile.
//!
//! The record field set is identical for every archive: derived fields
//! first (source path, layer, feature count, CRS identification,
//! world-file georeferencing), then the DBF attribute fields in column
//! order. Components that are absent from a given archive contribute
//! null values rather than shrinking the field set, which keeps one
//! catalog valid across a whole directory scan.

use std::path::Path;

use tracing::debug;

use shp_meta_core::{FieldType, FieldValue, MetadataRecord};

use crate::archive;
use crate::dbf::DbfTable;
use crate::error::Result;
use crate::prj;
use crate::worldfile;

/// DBF attribute dropped from records, mirroring the upstream data
/// pipeline which strips it before indexing.
const DROPPED_ATTRIBUTE: &str = "filename";

/// Extracts the metadata record for one zipped shapefile.
///
/// # Errors
///
/// Propagates [`ExtractError::NotFound`](crate::ExtractError::NotFound),
/// [`ExtractError::MalformedArchive`](crate::ExtractError::MalformedArchive),
/// and component parse failures. No partial record is ever produced.
pub fn extract_metadata(path: &Path) -> Result<MetadataRecord> {
    let archive = archive::open(path)?;
    let table = DbfTable::parse(&archive.dbf)?;

    let crs = match &archive.prj {
        Some(bytes) => Some(prj::parse_wkt(&String::from_utf8_lossy(bytes))?),
        None => None,
    };
    let world = match &archive.worldfile {
        Some((name, bytes)) => Some(worldfile::parse(name, bytes)?),
        None => None,
    };

    debug!(
        path = %path.display(),
        layer = %archive.layer,
        features = table.records.len(),
        "extracted shapefile metadata"
    );

    let mut record = MetadataRecord::new();
    record.try_push(
        "source_path",
        FieldType::Text,
        FieldValue::Str(path.display().to_string()),
    )?;
    record.try_push("layer", FieldType::Text, FieldValue::Str(archive.layer))?;
    record.try_push(
        "feature_count",
        FieldType::Integer,
        FieldValue::Int(table.records.len() as i64),
    )?;

    let text_or_null = |v: Option<String>| v.map_or(FieldValue::Null, FieldValue::Str);
    record.try_push(
        "crs_name",
        FieldType::Text,
        text_or_null(crs.as_ref().map(|c| c.name.clone())),
    )?;
    record.try_push(
        "datum",
        FieldType::Text,
        text_or_null(crs.as_ref().and_then(|c| c.datum.clone())),
    )?;
    record.try_push(
        "crs_authority",
        FieldType::Text,
        text_or_null(crs.as_ref().and_then(|c| c.authority.clone())),
    )?;
    record.try_push(
        "crs_code",
        FieldType::Integer,
        crs.as_ref()
            .and_then(|c| c.code)
            .map_or(FieldValue::Null, FieldValue::Int),
    )?;

    let world_field = |v: Option<f64>| v.map_or(FieldValue::Null, FieldValue::Float);
    record.try_push(
        "scale_x",
        FieldType::Real,
        world_field(world.map(|w| w.scale_x)),
    )?;
    record.try_push(
        "rotation_x",
        FieldType::Real,
        world_field(world.map(|w| w.rotation_x)),
    )?;
    record.try_push(
        "rotation_y",
        FieldType::Real,
        world_field(world.map(|w| w.rotation_y)),
    )?;
    record.try_push(
        "scale_y",
        FieldType::Real,
        world_field(world.map(|w| w.scale_y)),
    )?;
    record.try_push(
        "upper_left_x",
        FieldType::Real,
        world_field(world.map(|w| w.upper_left_x)),
    )?;
    record.try_push(
        "upper_left_y",
        FieldType::Real,
        world_field(world.map(|w| w.upper_left_y)),
    )?;

    let first_row = table.records.first();
    for (index, field) in table.fields.iter().enumerate() {
        if field.name == DROPPED_ATTRIBUTE {
            continue;
        }
        let name = if record.contains(&field.name) {
            format!("dbf_{}", field.name)
        } else {
            field.name.clone()
        };
        let value = first_row
            .map(|row| row[index].clone())
            .unwrap_or(FieldValue::Null);
        record.try_push(name, field.field_type(), value)?;
    }

    Ok(record)
}

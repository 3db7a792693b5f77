//! SQL generation for the single metadata table.
//!
//! Columns are derived from a [`FieldCatalog`]; every identifier is
//! validated before it reaches an SQL string, so interpolated statements
//! cannot be hijacked by a hostile field name.

use shp_meta_core::{FieldCatalog, FieldType};

use crate::error::{IndexError, Result};

/// Name of the single metadata table.
pub const TABLE: &str = "shapefiles";

/// Column carrying the unique identity of an index row.
pub const IDENTITY_FIELD: &str = "source_path";

/// Validates that a field name is usable as a column identifier.
pub(crate) fn validate_field_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_lowercase() || first == '_')
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(IndexError::InvalidFieldName(name.to_string()))
    }
}

/// SQLite declared type for a field type.
pub(crate) fn declared_type(ty: FieldType) -> &'static str {
    match ty {
        FieldType::Text => "TEXT",
        FieldType::Integer => "INTEGER",
        FieldType::Real => "REAL",
        FieldType::Date => "DATE",
    }
}

/// Maps a stored declared type back to a field type.
///
/// Returns `None` for declarations this crate never writes; callers fall
/// back to [`FieldType::Text`] for forward compatibility.
pub(crate) fn type_from_declaration(decl: &str) -> Option<FieldType> {
    match decl.to_ascii_uppercase().as_str() {
        "TEXT" => Some(FieldType::Text),
        "INTEGER" | "INT" => Some(FieldType::Integer),
        "REAL" | "FLOAT" | "DOUBLE" => Some(FieldType::Real),
        "DATE" => Some(FieldType::Date),
        _ => None,
    }
}

/// Generates the `CREATE TABLE` statement for the given catalog.
///
/// The identity column gets `NOT NULL UNIQUE`; everything else is
/// nullable.
///
/// # Errors
///
/// Returns [`IndexError::InvalidFieldName`] when a catalog name cannot
/// be used as a column identifier, and [`IndexError::EmptyScan`] for an
/// empty catalog.
pub fn create_table_sql(catalog: &FieldCatalog) -> Result<String> {
    if catalog.is_empty() {
        return Err(IndexError::EmptyScan);
    }

    let mut columns = Vec::with_capacity(catalog.len());
    for spec in catalog.iter() {
        validate_field_name(&spec.name)?;
        let constraint = if spec.name == IDENTITY_FIELD {
            " NOT NULL UNIQUE"
        } else {
            ""
        };
        columns.push(format!(
            "    \"{}\" {}{}",
            spec.name,
            declared_type(spec.ty),
            constraint
        ));
    }

    Ok(format!(
        "CREATE TABLE {TABLE} (\n{}\n);",
        columns.join(",\n")
    ))
}

/// Generates the statement that removes a prior index table.
pub fn drop_table_sql() -> String {
    format!("DROP TABLE IF EXISTS {TABLE};")
}

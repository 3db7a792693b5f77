//! The flat metadata record model.
//!
//! A [`MetadataRecord`] is an ordered mapping from field name to scalar
//! value, produced once per zipped shapefile and immutable after
//! construction. Each entry also carries its declared [`FieldType`] so a
//! [`FieldCatalog`](crate::FieldCatalog) can be derived from a record even
//! when individual values are null.

use std::fmt;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::catalog::{FieldCatalog, FieldSpec};

/// Declared scalar type of a metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Real,
    /// Calendar date (no time component).
    Date,
}

impl FieldType {
    /// Lowercase name used in user-facing output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scalar value in a metadata record.
///
/// `Null` marks a field that is structurally present but empty in the
/// source data (a blank DBF cell, a missing `.prj`, an absent world
/// file). Keeping such fields in the record preserves an identical field
/// set across every record of a scan.
///
/// # Examples
///
/// ```
/// use shp_meta_core::{FieldType, FieldValue};
///
/// let v = FieldValue::from("Landsat-8");
/// assert!(v.matches(FieldType::Text));
/// assert!(!v.matches(FieldType::Integer));
/// assert!(FieldValue::Null.matches(FieldType::Date));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Date value.
    Date(NaiveDate),
    /// Structurally present but empty.
    Null,
}

impl FieldValue {
    /// Returns true for [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Checks whether this value is acceptable for a field of the given
    /// declared type. Null matches every type; integers are accepted into
    /// real fields.
    pub fn matches(&self, ty: FieldType) -> bool {
        match self {
            Self::Null => true,
            Self::Str(_) => ty == FieldType::Text,
            Self::Int(_) => ty == FieldType::Integer || ty == FieldType::Real,
            Self::Float(_) => ty == FieldType::Real,
            Self::Date(_) => ty == FieldType::Date,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Null => Ok(()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Self::Null => serializer.serialize_none(),
        }
    }
}

/// Errors raised while assembling a [`MetadataRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record already contains a field with this name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// The value does not fit the field's declared type.
    #[error("value for field '{field}' does not match declared type {ty}")]
    TypeMismatch {
        /// Offending field name.
        field: String,
        /// Declared type of the field.
        ty: FieldType,
    },
}

/// One named, typed entry of a [`MetadataRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// Field name (lowercase).
    pub name: String,
    /// Declared scalar type.
    pub ty: FieldType,
    /// The value (possibly [`FieldValue::Null`]).
    pub value: FieldValue,
}

/// An ordered field-to-value mapping extracted from one shapefile.
///
/// Serializes as a map in insertion order, values only; the declared
/// types are a construction-time concern used to derive the
/// [`FieldCatalog`](crate::FieldCatalog).
///
/// # Examples
///
/// ```
/// use shp_meta_core::{FieldType, FieldValue, MetadataRecord};
///
/// let mut record = MetadataRecord::new();
/// record.try_push("layer", FieldType::Text, FieldValue::from("scene")).unwrap();
/// record.try_push("cloudperce", FieldType::Integer, FieldValue::Int(7)).unwrap();
///
/// assert_eq!(record.get("cloudperce"), Some(&FieldValue::Int(7)));
/// assert!(record.try_push("layer", FieldType::Text, FieldValue::Null).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    entries: Vec<FieldEntry>,
}

impl MetadataRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, rejecting duplicate names and type-incompatible
    /// values.
    pub fn try_push(
        &mut self,
        name: impl Into<String>,
        ty: FieldType,
        value: FieldValue,
    ) -> Result<(), RecordError> {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            return Err(RecordError::DuplicateField(name));
        }
        if !value.matches(ty) {
            return Err(RecordError::TypeMismatch { field: name, ty });
        }
        self.entries.push(FieldEntry { name, ty, value });
        Ok(())
    }

    /// Looks up a value by field name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.value)
    }

    /// Returns true if the record contains the named field.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    /// Iterates field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derives the catalog (names and declared types) for this record.
    pub fn catalog(&self) -> FieldCatalog {
        FieldCatalog::new(
            self.entries
                .iter()
                .map(|e| FieldSpec {
                    name: e.name.clone(),
                    ty: e.ty,
                })
                .collect(),
        )
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

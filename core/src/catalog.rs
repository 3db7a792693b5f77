//! The field catalog: an ordered schema view over a record set.

use crate::record::FieldType;

/// Name and declared type of one catalog field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name (lowercase).
    pub name: String,
    /// Declared scalar type.
    pub ty: FieldType,
}

/// Ordered list of every known field with its declared type.
///
/// Derived from a [`MetadataRecord`](crate::MetadataRecord) at scan time
/// and from the stored table schema at query time. Filter parsing
/// consults the catalog to reject unknown fields and to coerce literals.
///
/// # Examples
///
/// ```
/// use shp_meta_core::{FieldCatalog, FieldSpec, FieldType};
///
/// let catalog = FieldCatalog::new(vec![
///     FieldSpec { name: "satellite".into(), ty: FieldType::Text },
///     FieldSpec { name: "cloudperce".into(), ty: FieldType::Integer },
/// ]);
/// assert_eq!(catalog.field_type("cloudperce"), Some(FieldType::Integer));
/// assert!(catalog.field_type("orbit").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
}

impl FieldCatalog {
    /// Creates a catalog from an ordered field list.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Declared type of the named field, if present.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.ty)
    }

    /// True when the catalog contains the named field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Iterates field names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Iterates the full field specs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the catalog has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldSpec {
                name: "source_path".into(),
                ty: FieldType::Text,
            },
            FieldSpec {
                name: "acquisitio".into(),
                ty: FieldType::Date,
            },
        ])
    }

    #[test]
    fn test_lookup_and_order() {
        let catalog = sample();
        assert_eq!(catalog.field_type("acquisitio"), Some(FieldType::Date));
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["source_path", "acquisitio"]
        );
    }

    #[test]
    fn test_unknown_field_is_none() {
        assert!(sample().field_type("nope").is_none());
        assert!(!sample().contains("nope"));
    }
}

//! Core types for shapefile metadata tooling.
//!
//! This crate defines the foundational types shared by the extraction,
//! storage, and CLI crates:
//!
//! - [`MetadataRecord`] — the ordered field-to-value mapping extracted from
//!   one zipped shapefile.
//! - [`FieldValue`] / [`FieldType`] — the scalar value model (text, integer,
//!   real, date, plus a null marker for structurally-present-but-empty
//!   attributes).
//! - [`FieldCatalog`] — the schema view over a record set (field names and
//!   declared types, in order).
//! - [`Filter`] / [`parse_filter`] — the conjunctive filter-expression
//!   language used to search an indexed database.
//!
//! The crate is I/O free; reading archives and talking to storage live in
//! `shp-meta-extract` and `shp-meta-sqlite`.
//!
//! # Example
//!
//! ```
//! use shp_meta_core::*;
//!
//! let mut record = MetadataRecord::new();
//! record.try_push("source_path", FieldType::Text, FieldValue::from("a.zip")).unwrap();
//! record.try_push("satellite", FieldType::Text, FieldValue::from("Landsat-8")).unwrap();
//! record.try_push("cloudperce", FieldType::Integer, FieldValue::Int(12)).unwrap();
//!
//! let catalog = record.catalog();
//! let filter = parse_filter("satellite = 'Landsat-8' & cloudperce < 40", &catalog).unwrap();
//! assert_eq!(filter.conditions.len(), 2);
//! ```

mod catalog;
mod filter;
mod record;

pub use catalog::{FieldCatalog, FieldSpec};
pub use filter::{Condition, Filter, FilterError, Operand, Operator, parse_filter};
pub use record::{FieldEntry, FieldType, FieldValue, MetadataRecord, RecordError};

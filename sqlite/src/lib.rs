//! SQLite storage backend for shapefile metadata records.
//!
//! One indexing run produces one database file holding a single table,
//! `shapefiles`, whose columns are exactly the field catalog of the scan
//! that built it. Rebuilding replaces the table wholesale; rows are never
//! updated in place.
//!
//! # Architecture
//!
//! - **`schema`** — SQL generation from a [`FieldCatalog`] with
//!   identifier validation
//! - **`convert`** — `FieldValue` ↔ SQL value transformations and
//!   operator translation
//! - **`index`** — the [`MetadataIndex`] handle (rebuild, catalog
//!   introspection, field info, search)
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use shp_meta_core::parse_filter;
//! use shp_meta_sqlite::MetadataIndex;
//!
//! let index = MetadataIndex::open(Path::new("scenes.db")).unwrap();
//! let catalog = index.catalog().unwrap();
//! let filter = parse_filter("satellite = 'Landsat-8'", &catalog).unwrap();
//! for row in index.search(&filter).unwrap() {
//!     println!("{:?}", row.get("source_path"));
//! }
//! ```
//!
//! [`FieldCatalog`]: shp_meta_core::FieldCatalog

mod convert;
mod error;
mod index;
mod schema;

pub use error::{IndexError, Result};
pub use index::{DISTINCT_VALUE_LIMIT, FieldInfo, MetadataIndex, RebuildReport};

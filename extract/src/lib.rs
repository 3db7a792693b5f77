//! Metadata extraction from zipped shapefiles.
//!
//! A "zipped shapefile" is a zip archive carrying the conventional
//! shapefile component set: `.shp` (geometry), `.shx` (geometry index),
//! `.dbf` (attribute table), usually a `.prj` (projection definition) and
//! sometimes `.jgw` world files for companion imagery. This crate opens
//! such archives in memory, reads the attribute and projection components,
//! and assembles a flat [`MetadataRecord`] per file.
//!
//! # Main entry points
//!
//! - [`extractor::extract_metadata`] — one zip in, one record out.
//! - [`scan::scan_directory`] — walk a directory tree and extract every
//!   candidate in parallel, collecting per-file failures instead of
//!   aborting.
//! - [`output`] — pure serializers from records to TOML/XML/YAML/JSON
//!   (single record) and YAML/CSV/XML/JSON (row sets).
//!
//! Geometry is never parsed: the `.shp`/`.shx` components are only checked
//! for presence.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use shp_meta_extract::extractor::extract_metadata;
//! use shp_meta_extract::output::{ExportFormat, format_record};
//!
//! let record = extract_metadata(Path::new("scene_20240317.zip")).unwrap();
//! println!("{}", format_record(&record, ExportFormat::Yaml).unwrap());
//! ```
//!
//! [`MetadataRecord`]: shp_meta_core::MetadataRecord

pub mod archive;
pub mod dbf;
pub mod error;
pub mod extractor;
pub mod output;
pub mod prj;
pub mod scan;
pub mod worldfile;

pub use error::{ExtractError, Result};

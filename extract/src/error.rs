//! Error types for metadata extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting metadata from a zipped
/// shapefile or formatting the result.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// I/O failure while reading an archive or walking a directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip is unreadable or lacks the required shapefile components.
    #[error("malformed archive '{path}': {reason}")]
    MalformedArchive {
        /// Path of the offending archive.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The `.dbf` attribute table could not be parsed.
    #[error("attribute table error: {0}")]
    AttributeTable(String),

    /// The `.prj` projection definition could not be parsed.
    #[error("projection definition error: {0}")]
    Projection(String),

    /// A `.jgw` world file could not be parsed.
    #[error("world file error: {0}")]
    WorldFile(String),

    /// Output extension outside the single-record export set.
    #[error("unsupported export format '{0}': expected toml, xml, yaml, or json")]
    UnsupportedFormat(String),

    /// Output extension outside the query-result export set.
    #[error("unsupported query output format '{0}': expected yml, yaml, csv, xml, or json")]
    UnsupportedRowsFormat(String),

    /// Serialization of a fully-built record failed.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// Record assembly failed (duplicate or mistyped field).
    #[error("record error: {0}")]
    Record(#[from] shp_meta_core::RecordError),
}

impl ExtractError {
    /// Creates a [`ExtractError::MalformedArchive`] with context.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;

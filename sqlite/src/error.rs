//! Error types for the metadata index.

use thiserror::Error;

/// Errors that can occur during index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// SQLite operation failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Requested field is not part of the stored schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A field name is not usable as a column identifier.
    #[error("invalid field name '{0}': must be lowercase alphanumerics and underscores")]
    InvalidFieldName(String),

    /// Rebuild was invoked with no records to derive a schema from.
    #[error("no records to index; database not created")]
    EmptyScan,

    /// The database has no metadata table (not built yet, or wrong file).
    #[error("no metadata table in database; run mkdb first")]
    MissingTable,

    /// Row reassembly failed (should not happen for a consistent table).
    #[error("record error: {0}")]
    Record(#[from] shp_meta_core::RecordError),
}

/// Convenience alias for results with [`IndexError`].
pub type Result<T> = std::result::Result<T, IndexError>;

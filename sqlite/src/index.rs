//! The metadata index: rebuild, introspection, and search.

use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use rusqlite::types::Value;
use tracing::{debug, warn};

use shp_meta_core::{
    FieldCatalog, FieldSpec, FieldType, FieldValue, Filter, MetadataRecord, Operand,
};

use crate::convert::{from_sql_ref, operator_sql, to_sql_value};
use crate::error::{IndexError, Result};
use crate::schema::{
    IDENTITY_FIELD, TABLE, create_table_sql, drop_table_sql, type_from_declaration,
    validate_field_name,
};

/// Fields with at most this many distinct non-null values report their
/// observed value set in [`MetadataIndex::field_info`].
pub const DISTINCT_VALUE_LIMIT: usize = 32;

/// Outcome of a rebuild: rows written and records rejected for not
/// matching the scan's catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildReport {
    /// Rows inserted into the fresh table.
    pub inserted: usize,
    /// Records skipped because their field set differed from the catalog.
    pub mismatched: usize,
}

/// Declared type and observed values of one catalog field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Declared scalar type.
    pub ty: FieldType,
    /// Number of distinct non-null values stored.
    pub distinct_count: usize,
    /// The distinct values, when `distinct_count` is within
    /// [`DISTINCT_VALUE_LIMIT`].
    pub values: Option<Vec<FieldValue>>,
}

/// Handle over one metadata database.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use shp_meta_sqlite::MetadataIndex;
///
/// let index = MetadataIndex::open(Path::new("scenes.db")).unwrap();
/// for name in index.catalog().unwrap().names() {
///     println!("{name}");
/// }
/// ```
pub struct MetadataIndex {
    conn: Connection,
}

impl MetadataIndex {
    /// Opens (or creates) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Opens a transient in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Replaces the index with the given record set.
    ///
    /// The catalog is derived from the first record; any prior table is
    /// dropped, so a rebuild never merges with stale rows. Records whose
    /// field set differs from the catalog are skipped and counted. The
    /// whole operation is one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyScan`] for an empty record set, and
    /// database errors otherwise (including a duplicate identity value).
    pub fn rebuild(&mut self, records: &[MetadataRecord]) -> Result<RebuildReport> {
        let first = records.first().ok_or(IndexError::EmptyScan)?;
        let catalog = first.catalog();
        let create_sql = create_table_sql(&catalog)?;

        let columns: Vec<String> = catalog.names().map(|n| format!("\"{n}\"")).collect();
        let placeholders: Vec<String> =
            (1..=catalog.len()).map(|i| format!("?{i}")).collect();
        let insert_sql = format!(
            "INSERT INTO {TABLE} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        tx.execute_batch(&drop_table_sql())?;
        tx.execute_batch(&create_sql)?;

        let mut report = RebuildReport::default();
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for record in records {
                if record.catalog() != catalog {
                    warn!(
                        source = ?record.get(IDENTITY_FIELD),
                        "record field set differs from scan catalog; skipping"
                    );
                    report.mismatched += 1;
                    continue;
                }
                let values = record.iter().map(|entry| to_sql_value(&entry.value));
                stmt.execute(params_from_iter(values))?;
                report.inserted += 1;
            }
        }
        tx.commit()?;

        debug!(
            inserted = report.inserted,
            mismatched = report.mismatched,
            "rebuilt metadata index"
        );
        Ok(report)
    }

    /// Loads the field catalog from the stored table schema.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingTable`] when the database has no
    /// metadata table.
    pub fn catalog(&self) -> Result<FieldCatalog> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({TABLE})"))?;
        let specs: Vec<FieldSpec> = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let decl: String = row.get(2)?;
                Ok(FieldSpec {
                    name,
                    ty: type_from_declaration(&decl).unwrap_or(FieldType::Text),
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        if specs.is_empty() {
            return Err(IndexError::MissingTable);
        }
        Ok(FieldCatalog::new(specs))
    }

    /// Number of rows in the index.
    pub fn row_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    /// Declared type and (for low-cardinality fields) the distinct value
    /// set of one catalog field.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownField`] when the name is not in the
    /// stored schema.
    pub fn field_info(&self, name: &str) -> Result<FieldInfo> {
        let catalog = self.catalog()?;
        let ty = catalog
            .field_type(name)
            .ok_or_else(|| IndexError::UnknownField(name.to_string()))?;
        validate_field_name(name)?;

        let distinct_count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(DISTINCT \"{name}\") FROM {TABLE} WHERE \"{name}\" IS NOT NULL"
            ),
            [],
            |row| row.get(0),
        )?;
        let distinct_count = distinct_count as usize;

        let values = if distinct_count <= DISTINCT_VALUE_LIMIT {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT DISTINCT \"{name}\" FROM {TABLE} WHERE \"{name}\" IS NOT NULL ORDER BY 1"
            ))?;
            let mut rows = stmt.query([])?;
            let mut collected = Vec::with_capacity(distinct_count);
            while let Some(row) = rows.next()? {
                collected.push(from_sql_ref(row.get_ref(0)?, ty));
            }
            Some(collected)
        } else {
            None
        };

        Ok(FieldInfo {
            name: name.to_string(),
            ty,
            distinct_count,
            values,
        })
    }

    /// Executes a filter and returns the matching rows, ordered by the
    /// identity field.
    ///
    /// The filter is assumed to have been parsed against this database's
    /// catalog; fields are still re-validated here so a hand-built
    /// filter cannot inject identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownField`] for a condition on a field
    /// outside the stored schema.
    pub fn search(&self, filter: &Filter) -> Result<Vec<MetadataRecord>> {
        let catalog = self.catalog()?;

        let mut fragments = Vec::with_capacity(filter.len());
        let mut params: Vec<Value> = Vec::new();
        for condition in &filter.conditions {
            if !catalog.contains(&condition.field) {
                return Err(IndexError::UnknownField(condition.field.clone()));
            }
            validate_field_name(&condition.field)?;

            let op = operator_sql(condition.operator);
            match &condition.operand {
                Operand::Scalar(value) => {
                    params.push(to_sql_value(value));
                    fragments.push(format!(
                        "\"{}\" {op} ?{}",
                        condition.field,
                        params.len()
                    ));
                }
                Operand::List(values) => {
                    let mut holes = Vec::with_capacity(values.len());
                    for value in values {
                        params.push(to_sql_value(value));
                        holes.push(format!("?{}", params.len()));
                    }
                    fragments.push(format!(
                        "\"{}\" {op} ({})",
                        condition.field,
                        holes.join(", ")
                    ));
                }
            }
        }

        let columns: Vec<String> = catalog.names().map(|n| format!("\"{n}\"")).collect();
        let order_field = if catalog.contains(IDENTITY_FIELD) {
            IDENTITY_FIELD.to_string()
        } else {
            catalog
                .names()
                .next()
                .map(String::from)
                .unwrap_or_default()
        };
        let mut sql = format!("SELECT {} FROM {TABLE}", columns.join(", "));
        if !fragments.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&fragments.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY \"{order_field}\""));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut matches = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = MetadataRecord::new();
            for (idx, spec) in catalog.iter().enumerate() {
                let value = from_sql_ref(row.get_ref(idx)?, spec.ty);
                record.try_push(spec.name.clone(), spec.ty, coerce_for_type(value, spec.ty))?;
            }
            matches.push(record);
        }
        Ok(matches)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Bridges SQLite's numeric affinity back to the declared field type
/// (e.g. an integer stored in a REAL column reads back as an integer
/// value, which the record model accepts for real fields).
fn coerce_for_type(value: FieldValue, ty: FieldType) -> FieldValue {
    match (value, ty) {
        (FieldValue::Int(i), FieldType::Real) => FieldValue::Float(i as f64),
        (other, _) => other,
    }
}

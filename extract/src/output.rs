//! Output formatting for metadata records and query result rows.
//!
//! Two format sets exist by design: single-record export recognizes
//! `{toml, xml, yaml, json}` while query-result export recognizes
//! `{yml, yaml, csv, xml, json}`. JSON, YAML, and TOML go through their
//! serde crates; the flat XML and CSV shapes are emitted by small
//! hand-written formatters. All functions are pure: a record is fully
//! built before any serialization starts, so no partial output can ever
//! be written.

use std::path::Path;

use shp_meta_core::{FieldValue, MetadataRecord};

use crate::error::{ExtractError, Result};

/// Formats accepted for single-record export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Toml,
    Xml,
    Yaml,
    Json,
}

impl ExportFormat {
    /// Derives the format from an output path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedFormat`] for anything outside
    /// `{toml, xml, yaml, json}` (note: `yml` is not accepted here).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = extension_of(path);
        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "xml" => Ok(Self::Xml),
            "yaml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }
}

/// Formats accepted for query-result (row set) export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsFormat {
    Yaml,
    Csv,
    Xml,
    Json,
}

impl RowsFormat {
    /// Derives the format from an output path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedRowsFormat`] for anything
    /// outside `{yml, yaml, csv, xml, json}` (note: `toml` is not
    /// accepted here).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = extension_of(path);
        match ext.as_str() {
            "yml" | "yaml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            _ => Err(ExtractError::UnsupportedRowsFormat(ext)),
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Serializes one record in the requested format.
pub fn format_record(record: &MetadataRecord, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(record)
            .map_err(|e| ExtractError::Serialize(format!("JSON serialization failed: {e}"))),
        ExportFormat::Yaml => serde_yaml::to_string(record)
            .map_err(|e| ExtractError::Serialize(format!("YAML serialization failed: {e}"))),
        ExportFormat::Toml => record_to_toml(record),
        ExportFormat::Xml => Ok(record_to_xml(record)),
    }
}

/// Serializes a row set in the requested format, applied row-wise.
pub fn format_rows(rows: &[MetadataRecord], format: RowsFormat) -> Result<String> {
    match format {
        RowsFormat::Json => serde_json::to_string_pretty(rows)
            .map_err(|e| ExtractError::Serialize(format!("JSON serialization failed: {e}"))),
        RowsFormat::Yaml => serde_yaml::to_string(rows)
            .map_err(|e| ExtractError::Serialize(format!("YAML serialization failed: {e}"))),
        RowsFormat::Csv => Ok(rows_to_csv(rows)),
        RowsFormat::Xml => Ok(rows_to_xml(rows)),
    }
}

/// TOML has no null; empty values render as empty strings.
fn record_to_toml(record: &MetadataRecord) -> Result<String> {
    let mut table = toml::value::Table::new();
    for entry in record.iter() {
        let value = match &entry.value {
            FieldValue::Str(s) => toml::Value::String(s.clone()),
            FieldValue::Int(i) => toml::Value::Integer(*i),
            FieldValue::Float(x) => toml::Value::Float(*x),
            FieldValue::Date(d) => toml::Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Null => toml::Value::String(String::new()),
        };
        table.insert(entry.name.clone(), value);
    }
    toml::to_string(&toml::Value::Table(table))
        .map_err(|e| ExtractError::Serialize(format!("TOML serialization failed: {e}")))
}

fn record_to_xml(record: &MetadataRecord) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>\n");
    push_xml_fields(&mut out, record, "  ");
    out.push_str("</data>\n");
    out
}

fn rows_to_xml(rows: &[MetadataRecord]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>\n");
    for row in rows {
        out.push_str("  <row>\n");
        push_xml_fields(&mut out, row, "    ");
        out.push_str("  </row>\n");
    }
    out.push_str("</data>\n");
    out
}

fn push_xml_fields(out: &mut String, record: &MetadataRecord, indent: &str) {
    for entry in record.iter() {
        if entry.value.is_null() {
            out.push_str(&format!("{indent}<{name}/>\n", name = entry.name));
        } else {
            out.push_str(&format!(
                "{indent}<{name}>{value}</{name}>\n",
                name = entry.name,
                value = xml_escape(&entry.value.to_string()),
            ));
        }
    }
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Header comes from the first row's field order; nulls render empty.
fn rows_to_csv(rows: &[MetadataRecord]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let mut out = String::new();
    let header: Vec<String> = first.field_names().map(csv_escape).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|entry| csv_escape(&entry.value.to_string()))
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

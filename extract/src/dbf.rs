//! Reader for dBase (`.dbf`) attribute tables.
//!
//! Shapefile attribute tables use the dBase III/IV layout: a 32-byte
//! header, one 32-byte descriptor per field terminated by `0x0D`, then
//! fixed-width records each prefixed with a deletion flag. Only the
//! subset of the format that shapefile writers actually emit is handled
//! here; memo files are not supported.
//!
//! Field kinds map onto the scalar model as follows: `C` text, `N`
//! integer (or real when the descriptor declares decimals), `F` real,
//! `D` date, `L` text (`true`/`false`), anything else raw text. Blank
//! cells decode to [`FieldValue::Null`]; deleted records are skipped.

use chrono::NaiveDate;
use shp_meta_core::{FieldType, FieldValue};

use crate::error::{ExtractError, Result};

const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const DESCRIPTOR_TERMINATOR: u8 = 0x0D;
const DELETED_FLAG: u8 = 0x2A;

/// One field descriptor from the table header.
#[derive(Debug, Clone)]
pub struct DbfField {
    /// Field name, lowercased.
    pub name: String,
    /// Raw dBase kind byte (`C`, `N`, `F`, `D`, `L`, ...).
    pub kind: u8,
    /// Stored cell width in bytes.
    pub length: usize,
    /// Declared decimal count (numeric kinds).
    pub decimals: u8,
}

impl DbfField {
    /// Scalar type this field maps to.
    pub fn field_type(&self) -> FieldType {
        match self.kind {
            b'N' if self.decimals == 0 => FieldType::Integer,
            b'N' | b'F' => FieldType::Real,
            b'D' => FieldType::Date,
            _ => FieldType::Text,
        }
    }
}

/// A parsed attribute table: field descriptors plus the active records.
#[derive(Debug)]
pub struct DbfTable {
    /// Field descriptors in file order.
    pub fields: Vec<DbfField>,
    /// One value per field per active (non-deleted) record.
    pub records: Vec<Vec<FieldValue>>,
}

impl DbfTable {
    /// Parses a complete `.dbf` byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::AttributeTable`] on truncated headers,
    /// malformed descriptors, or cells that cannot be decoded as their
    /// declared kind.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(table_error("truncated header"));
        }

        let record_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let header_size = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        let record_size = u16::from_le_bytes([bytes[10], bytes[11]]) as usize;

        if header_size < HEADER_LEN + 1 || header_size > bytes.len() {
            return Err(table_error("invalid header size"));
        }
        if record_size == 0 {
            return Err(table_error("invalid record size"));
        }

        let fields = parse_descriptors(&bytes[..header_size])?;
        let expected_width: usize = 1 + fields.iter().map(|f| f.length).sum::<usize>();
        if expected_width != record_size {
            return Err(table_error(format!(
                "record size {record_size} does not match field widths {expected_width}"
            )));
        }

        let mut records = Vec::new();
        for index in 0..record_count {
            let start = header_size + index * record_size;
            let end = start + record_size;
            if end > bytes.len() {
                return Err(table_error("truncated record data"));
            }
            let row = &bytes[start..end];
            if row[0] == DELETED_FLAG {
                continue;
            }

            let mut values = Vec::with_capacity(fields.len());
            let mut offset = 1;
            for field in &fields {
                let cell = &row[offset..offset + field.length];
                values.push(decode_cell(field, cell)?);
                offset += field.length;
            }
            records.push(values);
        }

        Ok(Self { fields, records })
    }
}

fn table_error(reason: impl Into<String>) -> ExtractError {
    ExtractError::AttributeTable(reason.into())
}

fn parse_descriptors(header: &[u8]) -> Result<Vec<DbfField>> {
    let mut fields = Vec::new();
    let mut offset = HEADER_LEN;
    loop {
        if offset >= header.len() {
            return Err(table_error("missing field descriptor terminator"));
        }
        if header[offset] == DESCRIPTOR_TERMINATOR {
            break;
        }
        if offset + DESCRIPTOR_LEN > header.len() {
            return Err(table_error("truncated field descriptor"));
        }

        let descriptor = &header[offset..offset + DESCRIPTOR_LEN];
        let name_bytes = &descriptor[..11];
        let name_end = name_bytes.iter().position(|b| *b == 0).unwrap_or(11);
        let name = sanitize_field_name(decode_text(&name_bytes[..name_end]).trim());
        if name.is_empty() {
            return Err(table_error("empty field name in descriptor"));
        }

        fields.push(DbfField {
            name,
            kind: descriptor[11],
            length: descriptor[16] as usize,
            decimals: descriptor[17],
        });
        offset += DESCRIPTOR_LEN;
    }

    if fields.is_empty() {
        return Err(table_error("no field descriptors"));
    }
    Ok(fields)
}

fn decode_text(bytes: &[u8]) -> String {
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// Lowercases a descriptor name and folds anything outside
/// `[a-z0-9_]` to `_` so names are always usable as column identifiers.
fn sanitize_field_name(raw: &str) -> String {
    let mut name: String = raw
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn decode_cell(field: &DbfField, cell: &[u8]) -> Result<FieldValue> {
    let text = decode_text(cell);
    let trimmed = text.trim();

    match field.kind {
        b'C' => Ok(if trimmed.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Str(trimmed.to_string())
        }),
        b'N' | b'F' => {
            if trimmed.is_empty() || trimmed.chars().all(|c| c == '*') {
                return Ok(FieldValue::Null);
            }
            if field.kind == b'N' && field.decimals == 0 {
                trimmed.parse::<i64>().map(FieldValue::Int).map_err(|_| {
                    table_error(format!(
                        "invalid integer '{trimmed}' in field '{}'",
                        field.name
                    ))
                })
            } else {
                trimmed.parse::<f64>().map(FieldValue::Float).map_err(|_| {
                    table_error(format!(
                        "invalid number '{trimmed}' in field '{}'",
                        field.name
                    ))
                })
            }
        }
        b'D' => {
            if trimmed.is_empty() {
                return Ok(FieldValue::Null);
            }
            NaiveDate::parse_from_str(trimmed, "%Y%m%d")
                .map(FieldValue::Date)
                .map_err(|_| {
                    table_error(format!("invalid date '{trimmed}' in field '{}'", field.name))
                })
        }
        b'L' => Ok(match trimmed.chars().next() {
            Some('T' | 't' | 'Y' | 'y') => FieldValue::Str("true".to_string()),
            Some('F' | 'f' | 'N' | 'n') => FieldValue::Str("false".to_string()),
            _ => FieldValue::Null,
        }),
        _ => Ok(if trimmed.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Str(trimmed.to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal dBase III buffer from field specs and text rows.
    fn build_dbf(fields: &[(&str, u8, usize, u8)], rows: &[(&[&str], bool)]) -> Vec<u8> {
        let header_size = HEADER_LEN + fields.len() * DESCRIPTOR_LEN + 1;
        let record_size: usize = 1 + fields.iter().map(|(_, _, len, _)| *len).sum::<usize>();

        let mut out = vec![0u8; HEADER_LEN];
        out[0] = 0x03;
        out[1] = 24;
        out[2] = 1;
        out[3] = 1;
        out[4..8].copy_from_slice(&(rows.len() as u32).to_le_bytes());
        out[8..10].copy_from_slice(&(header_size as u16).to_le_bytes());
        out[10..12].copy_from_slice(&(record_size as u16).to_le_bytes());

        for (name, kind, length, decimals) in fields {
            let mut descriptor = [0u8; DESCRIPTOR_LEN];
            descriptor[..name.len()].copy_from_slice(name.as_bytes());
            descriptor[11] = *kind;
            descriptor[16] = *length as u8;
            descriptor[17] = *decimals;
            out.extend_from_slice(&descriptor);
        }
        out.push(DESCRIPTOR_TERMINATOR);

        for (cells, deleted) in rows {
            out.push(if *deleted { DELETED_FLAG } else { 0x20 });
            for ((_, _, length, _), cell) in fields.iter().zip(cells.iter()) {
                let mut bytes = cell.as_bytes().to_vec();
                bytes.resize(*length, b' ');
                out.extend_from_slice(&bytes);
            }
        }
        out.push(0x1A);
        out
    }

    fn scene_fields() -> Vec<(&'static str, u8, usize, u8)> {
        vec![
            ("SATELLITE", b'C', 12, 0),
            ("CLOUDPERCE", b'N', 4, 0),
            ("ACQUISITIO", b'D', 8, 0),
            ("RESOLUTION", b'N', 8, 2),
        ]
    }

    #[test]
    fn test_parses_fields_and_records() {
        let bytes = build_dbf(
            &scene_fields(),
            &[(&["Landsat-8", "12", "20240317", "30.00"], false)],
        );
        let table = DbfTable::parse(&bytes).unwrap();

        let names: Vec<&str> = table.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["satellite", "cloudperce", "acquisitio", "resolution"]);
        assert_eq!(table.fields[0].field_type(), FieldType::Text);
        assert_eq!(table.fields[1].field_type(), FieldType::Integer);
        assert_eq!(table.fields[2].field_type(), FieldType::Date);
        assert_eq!(table.fields[3].field_type(), FieldType::Real);

        let row = &table.records[0];
        assert_eq!(row[0], FieldValue::Str("Landsat-8".to_string()));
        assert_eq!(row[1], FieldValue::Int(12));
        assert_eq!(
            row[2],
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap())
        );
        assert_eq!(row[3], FieldValue::Float(30.0));
    }

    #[test]
    fn test_blank_cells_decode_to_null() {
        let bytes = build_dbf(&scene_fields(), &[(&["", "", "", ""], false)]);
        let table = DbfTable::parse(&bytes).unwrap();
        assert!(table.records[0].iter().all(FieldValue::is_null));
    }

    #[test]
    fn test_deleted_records_are_skipped() {
        let bytes = build_dbf(
            &scene_fields(),
            &[
                (&["Landsat-8", "12", "20240317", "30.00"], true),
                (&["SAOCOM-1A", "3", "20240318", "10.00"], false),
            ],
        );
        let table = DbfTable::parse(&bytes).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0][0], FieldValue::Str("SAOCOM-1A".to_string()));
    }

    #[test]
    fn test_field_names_are_sanitized() {
        let bytes = build_dbf(&[("AREA M2", b'C', 4, 0)], &[(&["x"], false)]);
        let table = DbfTable::parse(&bytes).unwrap();
        assert_eq!(table.fields[0].name, "area_m2");
    }

    #[test]
    fn test_logical_field_decodes_to_text() {
        let bytes = build_dbf(&[("ONLINE", b'L', 1, 0)], &[(&["T"], false), (&["?"], false)]);
        let table = DbfTable::parse(&bytes).unwrap();
        assert_eq!(table.records[0][0], FieldValue::Str("true".to_string()));
        assert!(table.records[1][0].is_null());
    }

    #[test]
    fn test_invalid_integer_is_an_error() {
        let bytes = build_dbf(&[("ORBITID", b'N', 6, 0)], &[(&["abc"], false)]);
        let err = DbfTable::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("invalid integer"));
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        let err = DbfTable::parse(&[0x03, 0x00]).unwrap_err();
        assert!(err.to_string().contains("truncated header"));
    }

    #[test]
    fn test_truncated_records_are_an_error() {
        let mut bytes = build_dbf(&scene_fields(), &[(&["x", "1", "20240101", "1.00"], false)]);
        bytes.truncate(bytes.len() - 10);
        let err = DbfTable::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated record"));
    }

    #[test]
    fn test_windows_1252_text_decodes() {
        let header_size = HEADER_LEN + DESCRIPTOR_LEN + 1;
        let mut out = vec![0u8; HEADER_LEN];
        out[0] = 0x03;
        out[4..8].copy_from_slice(&1u32.to_le_bytes());
        out[8..10].copy_from_slice(&(header_size as u16).to_le_bytes());
        out[10..12].copy_from_slice(&11u16.to_le_bytes());
        let mut descriptor = [0u8; DESCRIPTOR_LEN];
        descriptor[..6].copy_from_slice(b"REGION");
        descriptor[11] = b'C';
        descriptor[16] = 10;
        out.extend_from_slice(&descriptor);
        out.push(DESCRIPTOR_TERMINATOR);
        out.push(0x20);
        // "Córdoba" in Windows-1252 (0xF3 = ó)
        let mut cell = vec![b'C', 0xF3, b'r', b'd', b'o', b'b', b'a'];
        cell.resize(10, b' ');
        out.extend_from_slice(&cell);

        let table = DbfTable::parse(&out).unwrap();
        assert_eq!(table.records[0][0], FieldValue::Str("Córdoba".to_string()));
    }
}

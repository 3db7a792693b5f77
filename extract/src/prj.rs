//! Reader for `.prj` projection definitions.
//!
//! A `.prj` component holds a WKT coordinate reference system string,
//! e.g. `PROJCS["WGS 84 / UTM zone 20S",GEOGCS[...],AUTHORITY["EPSG","32720"]]`.
//! Only identification metadata is extracted: the CRS name, the datum
//! name, and the root-level authority/code. No coordinate transformation
//! is performed. Both WKT 1 (`AUTHORITY["EPSG","32720"]`) and WKT 2
//! (`ID["EPSG",32720]`) identifier nodes are recognized.

use serde::Serialize;

use crate::error::{ExtractError, Result};

/// Identification metadata of a coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrsInfo {
    /// CRS name, e.g. `WGS 84 / UTM zone 20S`.
    pub name: String,
    /// Datum name, when the definition carries one.
    pub datum: Option<String>,
    /// Identifier authority, e.g. `EPSG`.
    pub authority: Option<String>,
    /// Identifier code within the authority, e.g. `32720`.
    pub code: Option<i64>,
}

/// Parses a WKT CRS string into its identification metadata.
///
/// # Errors
///
/// Returns [`ExtractError::Projection`] when the text does not look like
/// a WKT node or carries no CRS name.
pub fn parse_wkt(text: &str) -> Result<CrsInfo> {
    let mut stack: Vec<String> = Vec::new();
    let mut keyword = String::new();
    let mut strings_in_node = 0usize;

    let mut name: Option<String> = None;
    let mut datum: Option<String> = None;
    let mut authority: Option<String> = None;
    let mut code: Option<i64> = None;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '[' | '(' => {
                if keyword.is_empty() {
                    return Err(projection_error("bracket without a keyword"));
                }
                stack.push(keyword.to_ascii_uppercase());
                keyword.clear();
                strings_in_node = 0;
            }
            ']' | ')' => {
                if stack.pop().is_none() {
                    return Err(projection_error("unbalanced brackets"));
                }
                strings_in_node = 0;
            }
            '"' => {
                let mut value = String::new();
                for inner in chars.by_ref() {
                    if inner == '"' {
                        break;
                    }
                    value.push(inner);
                }
                strings_in_node += 1;
                dispatch_string(
                    &stack,
                    strings_in_node,
                    value,
                    &mut name,
                    &mut datum,
                    &mut authority,
                    &mut code,
                );
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                keyword.clear();
                keyword.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        keyword.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let mut number = String::new();
                number.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || matches!(next, '.' | 'e' | 'E' | '-' | '+') {
                        number.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // WKT 2 identifier codes are bare integers: ID["EPSG",32720]
                if is_root_identifier(&stack) && authority.is_some() && code.is_none() {
                    code = number.parse::<i64>().ok();
                }
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(projection_error("unbalanced brackets"));
    }

    let name = name.ok_or_else(|| projection_error("missing coordinate system name"))?;
    Ok(CrsInfo {
        name,
        datum,
        authority,
        code,
    })
}

fn projection_error(reason: &str) -> ExtractError {
    ExtractError::Projection(reason.to_string())
}

fn is_root_identifier(stack: &[String]) -> bool {
    stack.len() == 2 && matches!(stack[1].as_str(), "AUTHORITY" | "ID")
}

fn dispatch_string(
    stack: &[String],
    index_in_node: usize,
    value: String,
    name: &mut Option<String>,
    datum: &mut Option<String>,
    authority: &mut Option<String>,
    code: &mut Option<i64>,
) {
    if stack.len() == 1 && index_in_node == 1 && name.is_none() {
        *name = Some(value);
        return;
    }

    if stack.last().is_some_and(|node| node == "DATUM") && index_in_node == 1 && datum.is_none() {
        *datum = Some(value);
        return;
    }

    if is_root_identifier(stack) {
        if index_in_node == 1 {
            *authority = Some(value);
        } else if index_in_node == 2 && code.is_none() {
            *code = value.parse::<i64>().ok();
        }
    }
}

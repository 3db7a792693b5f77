//! Filter-expression parsing.
//!
//! The query language is a conjunction of simple conditions separated by
//! `&`. Each condition is `<field> <operator> <literal>`, where the
//! operator is one of `=, !=, <, <=, >, >=, in, not in`. Membership
//! literals are `[a, b, c]` or a bare comma list; scalar literals are
//! quoted strings, bare numbers, or ISO dates. There is no `or`, no
//! grouping, and no nesting.
//!
//! Parsing is catalog-checked: every field must exist in the
//! [`FieldCatalog`] and every literal must coerce to the field's declared
//! type, so a successfully parsed [`Filter`] can be translated to a
//! storage predicate without further validation.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::catalog::FieldCatalog;
use crate::record::{FieldType, FieldValue};

/// Comparison and membership operators supported by the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `in`
    In,
    /// `not in`
    NotIn,
}

impl Operator {
    /// True for the membership operators (`in`, `not in`).
    pub fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
        };
        f.write_str(s)
    }
}

/// Right-hand side of a condition: a scalar for comparisons, a non-empty
/// list for membership tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Single literal.
    Scalar(FieldValue),
    /// Literal list for `in` / `not in`.
    List(Vec<FieldValue>),
}

/// One `<field> <operator> <literal>` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Catalog field the condition applies to.
    pub field: String,
    /// Comparison or membership operator.
    pub operator: Operator,
    /// Coerced literal(s).
    pub operand: Operand,
}

/// A conjunction of conditions built from one query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Conditions, all of which must hold.
    pub conditions: Vec<Condition>,
}

impl Filter {
    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True when the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Errors raised while parsing a query string.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The query string is empty or blank.
    #[error("invalid query: empty query string")]
    Empty,

    /// A condition failed to parse or type-check.
    #[error("invalid query: {reason} (in condition '{condition}')")]
    InvalidQuery {
        /// The offending condition text.
        condition: String,
        /// What went wrong.
        reason: String,
    },
}

fn invalid(condition: &str, reason: impl Into<String>) -> FilterError {
    FilterError::InvalidQuery {
        condition: condition.to_string(),
        reason: reason.into(),
    }
}

fn condition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Longest operators first so `<=` never parses as `<`.
        Regex::new(
            r"^(?P<field>[A-Za-z][A-Za-z0-9_]*)\s*(?P<op>!=|<=|>=|<|>|=|not\s+in\b|in\b)\s*(?P<value>\S.*)$",
        )
        .expect("condition pattern is valid")
    })
}

/// Parses a query string into a [`Filter`] against the given catalog.
///
/// # Errors
///
/// Returns [`FilterError::Empty`] for a blank query and
/// [`FilterError::InvalidQuery`] when a condition does not match the
/// grammar, references an unknown field, uses an empty membership list,
/// or carries a literal that cannot be coerced to the field's declared
/// type.
///
/// # Examples
///
/// ```
/// use shp_meta_core::*;
///
/// let catalog = FieldCatalog::new(vec![
///     FieldSpec { name: "satellite".into(), ty: FieldType::Text },
///     FieldSpec { name: "cloudperce".into(), ty: FieldType::Integer },
/// ]);
///
/// let filter = parse_filter("satellite in ['Landsat-8', 'SAOCOM-1A'] & cloudperce <= 20", &catalog).unwrap();
/// assert_eq!(filter.conditions[0].operator, Operator::In);
/// assert_eq!(filter.conditions[1].operator, Operator::Le);
/// ```
pub fn parse_filter(query: &str, catalog: &FieldCatalog) -> Result<Filter, FilterError> {
    if query.trim().is_empty() {
        return Err(FilterError::Empty);
    }

    let mut conditions = Vec::new();
    for raw in query.split('&') {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid(raw, "empty condition"));
        }

        let captures = condition_pattern()
            .captures(raw)
            .ok_or_else(|| invalid(raw, "expected '<field> <operator> <value>'"))?;

        let field = captures["field"].to_string();
        let ty = catalog
            .field_type(&field)
            .ok_or_else(|| invalid(raw, format!("unknown field '{field}'")))?;

        let operator = match captures["op"].split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            other => return Err(invalid(raw, format!("unsupported operator '{other}'"))),
        };

        let value_text = captures["value"].trim();
        let operand = if operator.is_membership() {
            let items = split_list(value_text);
            if items.is_empty() {
                return Err(invalid(raw, "empty membership list"));
            }
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(coerce_literal(&item, ty, &field).map_err(|r| invalid(raw, r))?);
            }
            Operand::List(values)
        } else {
            Operand::Scalar(coerce_literal(value_text, ty, &field).map_err(|r| invalid(raw, r))?)
        };

        conditions.push(Condition {
            field,
            operator,
            operand,
        });
    }

    Ok(Filter { conditions })
}

/// Splits a membership literal into items, honoring quotes and an
/// optional surrounding `[...]`.
fn split_list(raw: &str) -> Vec<String> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(raw);

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in inner.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                ',' => {
                    items.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }
    let last = current.trim().to_string();
    if !last.is_empty() {
        items.push(last);
    }
    items.retain(|item| !item.is_empty());
    items
}

/// Strips one pair of matching single or double quotes, if present.
fn unquote(raw: &str) -> (&str, bool) {
    let bytes = raw.as_bytes();
    if raw.len() >= 2 {
        let first = bytes[0];
        let last = bytes[raw.len() - 1];
        if first == last && (first == b'\'' || first == b'"') {
            return (&raw[1..raw.len() - 1], true);
        }
    }
    (raw, false)
}

/// Coerces a raw literal into a [`FieldValue`] of the declared type.
fn coerce_literal(raw: &str, ty: FieldType, field: &str) -> Result<FieldValue, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("missing value for field '{field}'"));
    }
    let (text, _quoted) = unquote(raw);

    match ty {
        FieldType::Text => Ok(FieldValue::Str(text.to_string())),
        FieldType::Integer => text
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| format!("expected an integer for field '{field}', got '{text}'")),
        FieldType::Real => text
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| format!("expected a number for field '{field}', got '{text}'")),
        FieldType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(FieldValue::Date)
            .map_err(|_| {
                format!("expected a date (YYYY-MM-DD) for field '{field}', got '{text}'")
            }),
    }
}

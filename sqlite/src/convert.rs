//! Value and operator translation between the core model and SQLite.

use chrono::NaiveDate;
use rusqlite::types::{Value, ValueRef};
use shp_meta_core::{FieldType, FieldValue, Operator};

/// Converts a field value into an owned SQL value for binding.
///
/// Dates are stored as ISO-8601 text, which keeps SQL ordering
/// comparisons consistent with date ordering.
pub(crate) fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Str(s) => Value::Text(s.clone()),
        FieldValue::Int(i) => Value::Integer(*i),
        FieldValue::Float(x) => Value::Real(*x),
        FieldValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        FieldValue::Null => Value::Null,
    }
}

/// Reads a stored SQL value back into a field value, guided by the
/// column's declared type.
pub(crate) fn from_sql_ref(value: ValueRef<'_>, ty: FieldType) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(i) => FieldValue::Int(i),
        ValueRef::Real(x) => FieldValue::Float(x),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if ty == FieldType::Date {
                match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                    Ok(date) => FieldValue::Date(date),
                    Err(_) => FieldValue::Str(text),
                }
            } else {
                FieldValue::Str(text)
            }
        }
        ValueRef::Blob(bytes) => FieldValue::Str(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// SQL spelling of a filter operator.
pub(crate) fn operator_sql(operator: Operator) -> &'static str {
    match operator {
        Operator::Eq => "=",
        Operator::Ne => "<>",
        Operator::Lt => "<",
        Operator::Le => "<=",
        Operator::Gt => ">",
        Operator::Ge => ">=",
        Operator::In => "IN",
        Operator::NotIn => "NOT IN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_round_trips_through_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let sql = to_sql_value(&FieldValue::Date(date));
        assert_eq!(sql, Value::Text("2024-03-17".to_string()));

        let back = from_sql_ref(ValueRef::Text(b"2024-03-17"), FieldType::Date);
        assert_eq!(back, FieldValue::Date(date));
    }

    #[test]
    fn test_null_round_trips() {
        assert_eq!(to_sql_value(&FieldValue::Null), Value::Null);
        assert_eq!(from_sql_ref(ValueRef::Null, FieldType::Real), FieldValue::Null);
    }

    #[test]
    fn test_unparseable_date_text_falls_back_to_str() {
        let back = from_sql_ref(ValueRef::Text(b"not-a-date"), FieldType::Date);
        assert_eq!(back, FieldValue::Str("not-a-date".to_string()));
    }

    #[test]
    fn test_operator_spelling() {
        assert_eq!(operator_sql(Operator::Ne), "<>");
        assert_eq!(operator_sql(Operator::NotIn), "NOT IN");
    }
}

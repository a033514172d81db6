use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed value crossing the query/datastore boundary: SQL parameters,
/// decoded row cells, and parsed cursor keys all use this representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    /// Exact decimal, used for money and score columns. Kept out of `f64`
    /// so cursor round-trips never lose precision.
    Decimal(BigDecimal),
    String(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    StringArray(Vec<String>),
    Null,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Decimal(v) => v.to_i64(),
            Value::String(v) => v.parse::<i64>().ok(),
            Value::Boolean(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            Value::String(v) => v.parse::<f64>().ok(),
            Value::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Plain string form, without SQL quoting. `None` for values that have
    /// no sensible scalar string rendering.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Decimal(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Boolean(v) => Some(v.to_string()),
            Value::Timestamp(v) => Some(v.to_rfc3339()),
            Value::StringArray(_) | Value::Null => None,
        }
    }

    pub fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            Value::Decimal(v) => Some(v.clone()),
            Value::Int(v) => Some(BigDecimal::from(*v)),
            Value::String(v) => v.parse::<BigDecimal>().ok(),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// SQL-literal rendering, used for log output only. Query construction goes
/// through parameter binding, never through this.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "'{v}'"),
            Value::StringArray(v) => {
                let items = v
                    .iter()
                    .map(|s| format!("\"{}\"", s.replace('"', "\\\"")))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "'{{{items}}}'")
            }
            Value::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decimal_string_roundtrip_is_exact() {
        let v = Value::Decimal(BigDecimal::from_str("85.123456789").unwrap());
        assert_eq!(v.as_string().unwrap(), "85.123456789");
    }

    #[test]
    fn test_as_i64_coercions() {
        assert_eq!(Value::Int(5).as_i64(), Some(5));
        assert_eq!(Value::String("12".into()).as_i64(), Some(12));
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_display_quotes_strings() {
        let v = Value::String("it's".into());
        assert_eq!(v.to_string(), "'it''s'");
    }
}

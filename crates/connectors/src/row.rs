use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use model::core::value::Value;
use serde::{Deserialize, Serialize};

/// One named cell of a decoded result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Option<Value>,
}

/// A decoded result row. Lookup is case-insensitive on the column name,
/// matching how identifiers come back from the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn get_string(&self, field: &str) -> Option<String> {
        self.get(field).and_then(|f| f.value.as_ref())?.as_string()
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(|f| f.value.as_ref())?.as_i64()
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|f| f.value.as_ref())?.as_f64()
    }

    pub fn get_decimal(&self, field: &str) -> Option<BigDecimal> {
        self.get(field).and_then(|f| f.value.as_ref())?.as_decimal()
    }

    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field)
            .and_then(|f| f.value.as_ref())?
            .as_timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RowData {
        RowData::new(vec![
            FieldValue {
                name: "id".into(),
                value: Some(Value::String("listing-1".into())),
            },
            FieldValue {
                name: "review_count".into(),
                value: Some(Value::Int(12)),
            },
            FieldValue {
                name: "avg_rating".into(),
                value: None,
            },
        ])
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(row().get_string("ID"), Some("listing-1".into()));
    }

    #[test]
    fn test_missing_and_null_fields_read_as_null() {
        let r = row();
        assert_eq!(r.get_value("avg_rating"), Value::Null);
        assert_eq!(r.get_value("no_such_column"), Value::Null);
        assert_eq!(r.get_decimal("avg_rating"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let r = row();
        assert_eq!(r.get_i64("review_count"), Some(12));
        assert_eq!(r.get_f64("review_count"), Some(12.0));
    }
}

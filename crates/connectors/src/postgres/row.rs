use crate::{
    error::DbError,
    row::{FieldValue, RowData},
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use model::core::value::Value;
use rust_decimal::Decimal as RustDecimal;
use std::str::FromStr;
use tokio_postgres::{Row, types::Type};

/// Decodes a driver row into the domain row representation, cell by cell.
pub fn to_row_data(row: &Row) -> Result<RowData, DbError> {
    let mut field_values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_cell(row, idx, column.type_())?;
        field_values.push(FieldValue {
            name: column.name().to_string(),
            value,
        });
    }
    Ok(RowData::new(field_values))
}

fn decode_cell(row: &Row, idx: usize, ty: &Type) -> Result<Option<Value>, DbError> {
    let value = if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::Int)
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?
            .map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?
            .map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Value::Float)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::Float(f64::from(v)))
    } else if *ty == Type::NUMERIC {
        match row.try_get::<_, Option<RustDecimal>>(idx)? {
            Some(v) => Some(Value::Decimal(
                BigDecimal::from_str(&v.to_string())
                    .map_err(|err| DbError::Decode(format!("numeric cell: {err}")))?,
            )),
            None => None,
        }
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)?.map(Value::String)
    } else if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Value::Boolean)
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(Value::Timestamp)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| Value::Timestamp(v.and_utc()))
    } else if *ty == Type::TEXT_ARRAY || *ty == Type::VARCHAR_ARRAY {
        row.try_get::<_, Option<Vec<String>>>(idx)?
            .map(Value::StringArray)
    } else {
        return Err(DbError::Decode(format!(
            "unsupported column type {ty} at index {idx}"
        )));
    };
    Ok(value)
}

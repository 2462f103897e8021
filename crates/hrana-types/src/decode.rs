//! Mapping from protocol values to host values.

use hrana_protocol::Value;

use crate::error::TypeError;
use crate::from_sql::FromSql;
use crate::value::SqlValue;

/// Trait for decoding host types from protocol values.
pub trait HranaDecode: Sized {
    /// Decode a protocol value into this type.
    fn decode(value: &Value) -> Result<Self, TypeError>;
}

impl<T: FromSql> HranaDecode for T {
    fn decode(value: &Value) -> Result<Self, TypeError> {
        T::from_sql(&decode_value(value.clone()))
    }
}

/// Decode a protocol value into a host value. The mapping is total.
#[must_use]
pub fn decode_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(v),
        Value::Float(v) => SqlValue::Float(v),
        Value::Text(v) => SqlValue::Text(v),
        Value::Blob(v) => SqlValue::Blob(v),
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        decode_value(value)
    }
}

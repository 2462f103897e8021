//! Wire representation of SQL values.

use bytes::Bytes;

use crate::codec::{WireMessage, required};
use crate::error::ProtocolError;
use crate::proto;

/// A value as carried by the protocol: the `Value` oneof.
///
/// SQLite storage classes map one-to-one onto these variants. There is no
/// boolean on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null = 1`
    #[default]
    Null,
    /// `sint64 integer = 2`
    Integer(i64),
    /// `double float = 3`
    Float(f64),
    /// `string text = 4`
    Text(String),
    /// `bytes blob = 5`
    Blob(Bytes),
}

impl Value {
    /// Name of the oneof variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Check if the value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl WireMessage for Value {
    type Proto = proto::Value;

    fn to_proto(&self) -> proto::Value {
        use proto::value::Value as Wire;

        let value = match self {
            Self::Null => Wire::Null(proto::Empty {}),
            Self::Integer(v) => Wire::Integer(*v),
            Self::Float(v) => Wire::Float(*v),
            Self::Text(v) => Wire::Text(v.clone()),
            Self::Blob(v) => Wire::Blob(v.clone()),
        };
        proto::Value { value: Some(value) }
    }

    fn from_proto(proto: proto::Value) -> Result<Self, ProtocolError> {
        use proto::value::Value as Wire;

        Ok(match required(proto.value, "Value.value")? {
            Wire::Null(_) => Self::Null,
            Wire::Integer(v) => Self::Integer(v),
            Wire::Float(v) => Self::Float(v),
            Wire::Text(v) => Self::Text(v),
            Wire::Blob(v) => Self::Blob(v),
        })
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Self::Blob(v)
    }
}

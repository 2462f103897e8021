//! Mapping from host values to protocol values.

use std::any::{Any, type_name};

use bytes::Bytes;
use hrana_protocol::Value;

use crate::error::TypeError;
use crate::to_sql::ToSql;
use crate::value::SqlValue;

/// Trait for encoding values into the protocol value union.
pub trait HranaEncode {
    /// Encode this value as a protocol value.
    fn encode(&self) -> Result<Value, TypeError>;
}

impl<T: ToSql + ?Sized> HranaEncode for T {
    fn encode(&self) -> Result<Value, TypeError> {
        self.to_sql().map(Value::from)
    }
}

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(v) => Value::Integer(v),
            SqlValue::Float(v) => Value::Float(v),
            SqlValue::Text(v) => Value::Text(v),
            SqlValue::Blob(v) => Value::Blob(v),
        }
    }
}

/// Encode a value whose concrete type is only known at runtime.
///
/// Accepts the closed set of host types with a protocol mapping; anything
/// else fails with [`TypeError::UnsupportedValueType`] naming the type.
pub fn encode_any<T: Any>(value: &T) -> Result<Value, TypeError> {
    let any = value as &dyn Any;

    macro_rules! try_encode {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = any.downcast_ref::<$ty>() {
                    return v.encode();
                }
                if let Some(v) = any.downcast_ref::<Option<$ty>>() {
                    return v.encode();
                }
            )*
        };
    }

    try_encode!(
        SqlValue, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
        String, &'static str, Vec<u8>, Bytes
    );

    Err(TypeError::UnsupportedValueType {
        type_name: type_name::<T>(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(42i32.encode().unwrap(), Value::Integer(42));
        assert_eq!(true.encode().unwrap(), Value::Integer(1));
        assert_eq!(1.5f64.encode().unwrap(), Value::Float(1.5));
        assert_eq!("x".encode().unwrap(), Value::Text("x".into()));
        assert_eq!(None::<i64>.encode().unwrap(), Value::Null);
    }

    #[test]
    fn test_encode_u64_out_of_range() {
        assert!(matches!(
            u64::MAX.encode(),
            Err(TypeError::ValueOutOfRange { target_type: "INTEGER", .. })
        ));
    }

    #[test]
    fn test_encode_any_known_types() {
        assert_eq!(encode_any(&7u16).unwrap(), Value::Integer(7));
        assert_eq!(
            encode_any(&String::from("a")).unwrap(),
            Value::Text("a".into())
        );
        assert_eq!(encode_any(&Some(false)).unwrap(), Value::Integer(0));
        assert_eq!(encode_any(&None::<String>).unwrap(), Value::Null);
    }

    #[test]
    fn test_encode_any_unsupported() {
        struct Opaque;

        let err = encode_any(&Opaque).unwrap_err();
        assert!(matches!(
            err,
            TypeError::UnsupportedValueType { type_name } if type_name.ends_with("Opaque")
        ));
        let message = encode_any(&vec![1i64, 2]).unwrap_err().to_string();
        assert!(message.starts_with("unsupported value type: "));
        assert!(message.contains("Vec<i64>"));
    }

    #[test]
    fn test_encode_any_wide_integers() {
        assert_eq!(encode_any(&-5i128).unwrap(), Value::Integer(-5));
        assert_eq!(encode_any(&Some(9u128)).unwrap(), Value::Integer(9));
        assert!(matches!(
            encode_any(&i128::MIN),
            Err(TypeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            encode_any(&(u128::from(u64::MAX) + 1)),
            Err(TypeError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_encode_any_rejects_unsigned_overflow() {
        assert!(matches!(
            encode_any(&u64::MAX),
            Err(TypeError::ValueOutOfRange { .. })
        ));
    }
}

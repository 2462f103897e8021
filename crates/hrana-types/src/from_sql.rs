//! Trait for converting from SQL values to Rust types.
//!
//! Integers and floats are both accepted wherever a numeric type is
//! requested. Floats narrow to integers by truncation toward zero; any value
//! that does not fit the requested type is rejected rather than wrapped or
//! saturated.

use bytes::Bytes;

use crate::error::TypeError;
use crate::value::SqlValue;

/// Trait for types that can be converted from SQL values.
///
/// This trait is implemented for common Rust types to enable
/// type-safe extraction of values from query results.
pub trait FromSql: Sized {
    /// Convert from a SQL value to this type.
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError>;

    /// Convert from an optional SQL value.
    ///
    /// Returns `None` if the value is NULL.
    fn from_sql_nullable(value: &SqlValue) -> Result<Option<Self>, TypeError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::from_sql(value).map(Some)
        }
    }
}

fn mismatch(expected: &'static str, value: &SqlValue) -> TypeError {
    match value {
        SqlValue::Null => TypeError::UnexpectedNull,
        _ => TypeError::TypeMismatch {
            expected,
            actual: value.type_name(),
        },
    }
}

impl FromSql for SqlValue {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        Ok(value.clone())
    }
}

impl FromSql for bool {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

macro_rules! impl_from_sql_int {
    ($($ty:ty),*) => {
        $(
            impl FromSql for $ty {
                fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
                    match value {
                        SqlValue::Integer(v) => <$ty>::try_from(*v)
                            .map_err(|_| TypeError::out_of_range(v, stringify!($ty))),
                        SqlValue::Float(v) => {
                            let truncated = v.trunc();
                            // MAX + 1 is a power of two and exact in f64.
                            if truncated >= <$ty>::MIN as f64
                                && truncated < <$ty>::MAX as f64 + 1.0
                            {
                                Ok(truncated as $ty)
                            } else {
                                Err(TypeError::out_of_range(v, stringify!($ty)))
                            }
                        }
                        _ => Err(mismatch(stringify!($ty), value)),
                    }
                }
            }
        )*
    };
}

impl_from_sql_int!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl FromSql for f64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value.as_f64().ok_or_else(|| mismatch("f64", value))
    }
}

impl FromSql for f32 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        let v = value.as_f64().ok_or_else(|| mismatch("f32", value))?;
        if v.is_finite() && v.abs() > f64::from(f32::MAX) {
            return Err(TypeError::out_of_range(v, "f32"));
        }
        Ok(v as f32)
    }
}

impl FromSql for String {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| mismatch("String", value))
    }
}

impl FromSql for Vec<u8> {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch("Vec<u8>", value))
    }
}

impl FromSql for Bytes {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Blob(v) => Ok(v.clone()),
            _ => Err(mismatch("Bytes", value)),
        }
    }
}

impl<T: FromSql> FromSql for Option<T> {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        T::from_sql_nullable(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sql_i32() {
        let value = SqlValue::Integer(42);
        assert_eq!(i32::from_sql(&value).unwrap(), 42);
    }

    #[test]
    fn test_integer_out_of_range() {
        let value = SqlValue::Integer(300);
        assert_eq!(
            u8::from_sql(&value),
            Err(TypeError::ValueOutOfRange {
                value: "300".into(),
                target_type: "u8",
            })
        );
        assert_eq!(
            u64::from_sql(&SqlValue::Integer(-1)),
            Err(TypeError::ValueOutOfRange {
                value: "-1".into(),
                target_type: "u64",
            })
        );
    }

    #[test]
    fn test_float_truncates_toward_zero() {
        assert_eq!(i64::from_sql(&SqlValue::Float(2.9)).unwrap(), 2);
        assert_eq!(i64::from_sql(&SqlValue::Float(-2.9)).unwrap(), -2);
        assert_eq!(u8::from_sql(&SqlValue::Float(-0.5)).unwrap(), 0);
    }

    #[test]
    fn test_float_out_of_range() {
        assert!(matches!(
            i32::from_sql(&SqlValue::Float(3e10)),
            Err(TypeError::ValueOutOfRange { target_type: "i32", .. })
        ));
        assert!(matches!(
            i64::from_sql(&SqlValue::Float(2f64.powi(63))),
            Err(TypeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            i64::from_sql(&SqlValue::Float(f64::NAN)),
            Err(TypeError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_from_sql_bool() {
        assert!(bool::from_sql(&SqlValue::Integer(1)).unwrap());
        assert!(bool::from_sql(&SqlValue::Integer(-7)).unwrap());
        assert!(!bool::from_sql(&SqlValue::Integer(0)).unwrap());
        assert!(!bool::from_sql(&SqlValue::Float(0.0)).unwrap());
    }

    #[test]
    fn test_integer_to_f64() {
        assert_eq!(f64::from_sql(&SqlValue::Integer(3)).unwrap(), 3.0);
    }

    #[test]
    fn test_f32_overflow() {
        assert!(matches!(
            f32::from_sql(&SqlValue::Float(1e300)),
            Err(TypeError::ValueOutOfRange { target_type: "f32", .. })
        ));
    }

    #[test]
    fn test_from_sql_string() {
        let value = SqlValue::Text("hello".to_string());
        assert_eq!(String::from_sql(&value).unwrap(), "hello");
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(
            i64::from_sql(&SqlValue::Text("1".into())),
            Err(TypeError::TypeMismatch {
                expected: "i64",
                actual: "TEXT",
            })
        );
        assert_eq!(
            Vec::<u8>::from_sql(&SqlValue::Integer(1)),
            Err(TypeError::TypeMismatch {
                expected: "Vec<u8>",
                actual: "INTEGER",
            })
        );
    }

    #[test]
    fn test_from_sql_option() {
        let value = SqlValue::Null;
        assert_eq!(Option::<i32>::from_sql(&value).unwrap(), None);

        let value = SqlValue::Integer(42);
        assert_eq!(Option::<i32>::from_sql(&value).unwrap(), Some(42));
    }

    #[test]
    fn test_null_to_non_option() {
        assert_eq!(String::from_sql(&SqlValue::Null), Err(TypeError::UnexpectedNull));
    }
}

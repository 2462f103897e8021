//! Trait for converting Rust types to SQL values.

use bytes::Bytes;

use crate::error::TypeError;
use crate::value::SqlValue;

/// Trait for types that can be converted to SQL values.
///
/// This trait is implemented for common Rust types to enable
/// type-safe parameter binding in statements. Conversion happens before
/// anything is sent, so a failure never reaches the server.
pub trait ToSql {
    /// Convert this value to a SQL value.
    fn to_sql(&self) -> Result<SqlValue, TypeError>;

    /// Get the storage class this value is sent as.
    fn sql_type(&self) -> &'static str;
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(self.clone())
    }

    fn sql_type(&self) -> &'static str {
        self.type_name()
    }
}

impl ToSql for bool {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Integer(i64::from(*self)))
    }

    fn sql_type(&self) -> &'static str {
        "INTEGER"
    }
}

macro_rules! impl_to_sql_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> Result<SqlValue, TypeError> {
                    Ok(SqlValue::Integer(i64::from(*self)))
                }

                fn sql_type(&self) -> &'static str {
                    "INTEGER"
                }
            }
        )*
    };
}

impl_to_sql_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_to_sql_checked_int {
    ($($ty:ty),*) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> Result<SqlValue, TypeError> {
                    i64::try_from(*self)
                        .map(SqlValue::Integer)
                        .map_err(|_| TypeError::out_of_range(self, "INTEGER"))
                }

                fn sql_type(&self) -> &'static str {
                    "INTEGER"
                }
            }
        )*
    };
}

impl_to_sql_checked_int!(u64, usize, isize, i128, u128);

impl ToSql for f32 {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Float(f64::from(*self)))
    }

    fn sql_type(&self) -> &'static str {
        "REAL"
    }
}

impl ToSql for f64 {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Float(*self))
    }

    fn sql_type(&self) -> &'static str {
        "REAL"
    }
}

impl ToSql for str {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Text(self.to_owned()))
    }

    fn sql_type(&self) -> &'static str {
        "TEXT"
    }
}

impl ToSql for String {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Text(self.clone()))
    }

    fn sql_type(&self) -> &'static str {
        "TEXT"
    }
}

impl ToSql for [u8] {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Blob(Bytes::copy_from_slice(self)))
    }

    fn sql_type(&self) -> &'static str {
        "BLOB"
    }
}

impl ToSql for Vec<u8> {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Blob(Bytes::copy_from_slice(self)))
    }

    fn sql_type(&self) -> &'static str {
        "BLOB"
    }
}

impl ToSql for Bytes {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        Ok(SqlValue::Blob(self.clone()))
    }

    fn sql_type(&self) -> &'static str {
        "BLOB"
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        match self {
            Some(v) => v.to_sql(),
            None => Ok(SqlValue::Null),
        }
    }

    fn sql_type(&self) -> &'static str {
        match self {
            Some(v) => v.sql_type(),
            None => "NULL",
        }
    }
}

impl<T: ToSql + ?Sized> ToSql for &T {
    fn to_sql(&self) -> Result<SqlValue, TypeError> {
        (*self).to_sql()
    }

    fn sql_type(&self) -> &'static str {
        (*self).sql_type()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_i32() {
        let value: i32 = 42;
        assert_eq!(value.to_sql().unwrap(), SqlValue::Integer(42));
        assert_eq!(value.sql_type(), "INTEGER");
    }

    #[test]
    fn test_to_sql_bool() {
        assert_eq!(true.to_sql().unwrap(), SqlValue::Integer(1));
        assert_eq!(false.to_sql().unwrap(), SqlValue::Integer(0));
    }

    #[test]
    fn test_to_sql_u64_range() {
        assert_eq!(
            (i64::MAX as u64).to_sql().unwrap(),
            SqlValue::Integer(i64::MAX)
        );
        assert_eq!(
            u64::MAX.to_sql(),
            Err(TypeError::ValueOutOfRange {
                value: u64::MAX.to_string(),
                target_type: "INTEGER",
            })
        );
    }

    #[test]
    fn test_to_sql_string() {
        let value = "hello".to_string();
        assert_eq!(value.to_sql().unwrap(), SqlValue::Text("hello".to_string()));
        assert_eq!(value.sql_type(), "TEXT");
    }

    #[test]
    fn test_to_sql_blob() {
        let value: &[u8] = &[1, 2, 3];
        assert_eq!(
            value.to_sql().unwrap(),
            SqlValue::Blob(Bytes::from_static(&[1, 2, 3]))
        );
    }

    #[test]
    fn test_to_sql_option() {
        let some: Option<i32> = Some(42);
        assert_eq!(some.to_sql().unwrap(), SqlValue::Integer(42));

        let none: Option<i32> = None;
        assert_eq!(none.to_sql().unwrap(), SqlValue::Null);
        assert_eq!(none.sql_type(), "NULL");
    }
}

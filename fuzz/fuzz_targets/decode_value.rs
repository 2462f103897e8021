#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use hrana_protocol::Value;
use hrana_types::{FromSql, decode::decode_value};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

fuzz_target!(|input: FuzzValue| {
    let value = match input {
        FuzzValue::Null => Value::Null,
        FuzzValue::Integer(v) => Value::Integer(v),
        FuzzValue::Float(v) => Value::Float(v),
        FuzzValue::Text(v) => Value::Text(v),
        FuzzValue::Blob(v) => Value::Blob(Bytes::from(v)),
    };

    let sql = decode_value(value);
    let _ = i8::from_sql(&sql);
    let _ = u32::from_sql(&sql);
    let _ = i64::from_sql(&sql);
    let _ = f32::from_sql(&sql);
    let _ = bool::from_sql(&sql);
    let _ = String::from_sql(&sql);
    let _ = Vec::<u8>::from_sql(&sql);
    let _ = i64::from_sql_nullable(&sql);
});

//! # hrana-types
//!
//! Rust type mappings and value conversions for Hrana streams.
//!
//! This crate provides bidirectional mapping between Rust types and the
//! SQLite storage classes carried by the protocol's value union.
//!
//! ## Type Mappings
//!
//! | Storage class | Rust Type |
//! |---------------|-----------|
//! | `NULL` | `Option<T>` (`None`) |
//! | `INTEGER` | `i8`..`i64`, `u8`..`u64`, `isize`, `usize`, `bool` |
//! | `REAL` | `f32`, `f64` |
//! | `TEXT` | `String`, `&str` |
//! | `BLOB` | `Vec<u8>`, `&[u8]`, `bytes::Bytes` |
//!
//! Booleans are stored as the integers 0 and 1. Unsigned values above
//! `i64::MAX` cannot be stored and are rejected on encode.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod from_sql;
pub mod to_sql;
pub mod value;

pub use decode::{HranaDecode, decode_value};
pub use encode::{HranaEncode, encode_any};
pub use error::TypeError;
pub use from_sql::FromSql;
pub use to_sql::ToSql;
pub use value::SqlValue;

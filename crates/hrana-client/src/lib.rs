//! # hrana-client
//!
//! Async client for libSQL remote databases speaking the Hrana v3 stream
//! protocol over HTTP.
//!
//! This is the primary public API surface of the workspace. Statements are
//! sent as protobuf pipeline requests; the server-side session is carried
//! from one request to the next by an opaque baton.
//!
//! ## Features
//!
//! - **Streams**: baton chaining and `base_url` redirects handled per stream
//! - **Async/await**: built on Tokio, one round trip per operation
//! - **Transactions**: JDBC-style autocommit emulated with `BEGIN`/`COMMIT`
//! - **Typed values**: checked conversion between Rust types and SQLite
//!   storage classes, failing locally before anything is sent
//! - **Deadlines**: a default request timeout plus per-call overrides
//!
//! ## Stream Lifecycle
//!
//! ```text
//! Fresh -> Active (first successful exchange)
//! Fresh -> Closed (close(), no network call)
//! Active -> Closed (close(), one close request)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use hrana_client::{Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_url("libsql://my-db.example.com?jwt=TOKEN")?;
//!     let client = Client::new(config)?;
//!     let mut conn = client.connect();
//!
//!     conn.set_autocommit(false).await?;
//!     conn.execute("INSERT INTO users (name) VALUES (?)", &[&"Alice"]).await?;
//!     conn.commit().await?;
//!
//!     let mut rs = conn.query("SELECT id, name FROM users", &[]).await?;
//!     while rs.next() {
//!         let id: i64 = rs.get(0)?;
//!         let name: String = rs.get_by_name("name")?;
//!         println!("{id}: {name}");
//!     }
//!
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod result;
pub mod row;
pub mod state;
pub mod statement;
pub mod stream;
pub mod to_params;
pub mod transport;

// Re-export commonly used types
pub use client::Client;
pub use config::{Config, TOKEN_ENV_VAR, TimeoutConfig};
pub use connection::Connection;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use hrana_types::{FromSql, SqlValue, ToSql, TypeError};
pub use result::{ResultSet, StatementResult};
pub use row::{ColMetaData, Column, Row};
pub use state::StreamState;
pub use statement::Statement;
pub use stream::Stream;
pub use to_params::{NamedParam, ParamList, ToParams};
pub use transport::{HttpTransport, Transport};

//! Basic stream and query example.
//!
//! This example opens a stream against a libSQL server and runs a few
//! statements, including one with positional parameters.
//!
//! # Running
//!
//! ```bash
//! export HRANA_URL=libsql://my-db.example.turso.io
//! export HRANA_JWT=eyJhbGciOi...
//!
//! cargo run --example basic
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use hrana_client::{Client, Config, Error, Statement};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let url = std::env::var("HRANA_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".into());
    let config = Config::from_url(&url)?.with_env_token();

    println!("Connecting to {}...", config.base_url);
    let client = Client::new(config)?;
    let mut stream = client.open_stream();

    stream
        .execute_batch(&[
            "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            "DELETE FROM users",
        ])
        .await?;

    for name in ["Alice", "Bob"] {
        let result = stream
            .execute(Statement::command("INSERT INTO users (name) VALUES (?)").bind(name)?)
            .await?;
        println!("Inserted {name} with rowid {:?}", result.last_insert_rowid());
    }

    let result = stream.execute("SELECT id, name FROM users ORDER BY id").await?;
    for row in result.rows() {
        let id: i64 = row.get(0)?;
        let name: String = row.get_by_name("name")?;
        println!("  {id}: {name}");
    }

    stream.close().await?;
    println!("Stream closed");

    Ok(())
}

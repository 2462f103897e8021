//! Transaction example.
//!
//! Turning autocommit off opens a transaction on the remote stream. Each
//! `commit` or `rollback` immediately begins the next one.
//!
//! # Running
//!
//! ```bash
//! export HRANA_URL=http://127.0.0.1:8080
//! cargo run --example transactions
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hrana_client::{Client, Config, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let url = std::env::var("HRANA_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".into());
    let client = Client::new(Config::from_url(&url)?.with_env_token())?;
    let mut conn = client.connect();

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (id INTEGER PRIMARY KEY, balance INTEGER NOT NULL)",
        &[],
    )
    .await?;
    conn.execute("INSERT OR REPLACE INTO accounts VALUES (1, 100), (2, 0)", &[])
        .await?;

    conn.set_autocommit(false).await?;
    println!("Server autocommit: {}", conn.autocommit().await?);

    // Transfer 40 and keep it.
    conn.execute("UPDATE accounts SET balance = balance - ? WHERE id = 1", &[&40i64])
        .await?;
    conn.execute("UPDATE accounts SET balance = balance + ? WHERE id = 2", &[&40i64])
        .await?;
    conn.commit().await?;

    // Transfer everything, then change our mind.
    conn.execute("UPDATE accounts SET balance = 0 WHERE id = 1", &[])
        .await?;
    conn.rollback().await?;

    conn.set_autocommit(true).await?;

    let mut rs = conn
        .query("SELECT id, balance FROM accounts ORDER BY id", &[])
        .await?;
    while rs.next() {
        let id: i64 = rs.get(0)?;
        let balance: i64 = rs.get_by_name("balance")?;
        println!("account {id}: {balance}");
    }

    conn.close().await?;
    Ok(())
}

//! Connection facade with emulated transactions.
//!
//! The protocol has no transaction primitive of its own. A [`Connection`]
//! tracks an autocommit flag locally and drives transactions with plain
//! `BEGIN`, `COMMIT` and `ROLLBACK` statements on its stream.
//!
//! ## Transaction Emulation
//!
//! ```text
//! set_autocommit(false)  ->  BEGIN
//! commit()               ->  COMMIT, then BEGIN
//! rollback()             ->  ROLLBACK, then BEGIN
//! set_autocommit(true)   ->  COMMIT
//! ```
//!
//! `commit()` and `rollback()` are two separate exchanges and therefore not
//! atomic: if the second one fails the stream is left outside a transaction
//! while the flag still reads `false`.

use hrana_types::ToSql;

use crate::error::{Error, Result};
use crate::result::ResultSet;
use crate::statement::Statement;
use crate::stream::Stream;
use crate::to_params::ToParams;

/// A database connection over one stream.
#[derive(Debug)]
pub struct Connection {
    stream: Stream,
    autocommit: bool,
    closed: bool,
}

impl Connection {
    /// Wrap a stream. The connection starts in autocommit mode.
    pub fn new(stream: Stream) -> Self {
        Self {
            stream,
            autocommit: true,
            closed: false,
        }
    }

    /// Local autocommit flag.
    #[must_use]
    pub fn get_autocommit(&self) -> bool {
        self.autocommit
    }

    /// Switch autocommit mode.
    ///
    /// Turning autocommit off starts a transaction; turning it back on
    /// commits it. Setting the current value does nothing.
    pub async fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        self.ensure_open()?;
        if autocommit == self.autocommit {
            return Ok(());
        }

        if autocommit {
            tracing::debug!("enabling autocommit");
            self.run("COMMIT").await?;
        } else {
            tracing::debug!("disabling autocommit");
            self.run("BEGIN").await?;
        }
        self.autocommit = autocommit;
        Ok(())
    }

    /// Commit the current transaction and start a new one.
    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.autocommit {
            return Err(Error::InvalidState(
                "commit not allowed in autocommit mode".into(),
            ));
        }
        tracing::debug!("committing transaction");
        self.run("COMMIT").await?;
        self.run("BEGIN").await
    }

    /// Roll back the current transaction and start a new one.
    pub async fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.autocommit {
            return Err(Error::InvalidState(
                "rollback not allowed in autocommit mode".into(),
            ));
        }
        tracing::debug!("rolling back transaction");
        self.run("ROLLBACK").await?;
        self.run("BEGIN").await
    }

    /// Ask the server for the autocommit state and refresh the local flag.
    pub async fn autocommit(&mut self) -> Result<bool> {
        self.ensure_open()?;
        let autocommit = self.stream.get_autocommit().await?;
        if autocommit != self.autocommit {
            tracing::debug!(
                local = self.autocommit,
                server = autocommit,
                "autocommit flag out of sync"
            );
        }
        self.autocommit = autocommit;
        Ok(autocommit)
    }

    /// Execute a statement that doesn't return rows.
    ///
    /// Returns the number of affected rows.
    pub async fn execute(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        tracing::debug!(sql = sql, params_count = params.len(), "executing statement");
        self.ensure_open()?;
        let statement = bind_all(Statement::command(sql), params)?;
        let result = self.stream.execute(statement).await?;
        Ok(result.rows_affected())
    }

    /// Execute a statement with named parameters.
    pub async fn execute_named<P: ToParams + ?Sized>(&mut self, sql: &str, params: &P) -> Result<u64> {
        tracing::debug!(sql = sql, "executing statement with named parameters");
        self.ensure_open()?;
        let statement = Statement::command(sql).bind_params(params)?;
        let result = self.stream.execute(statement).await?;
        Ok(result.rows_affected())
    }

    /// Execute a query and return its rows.
    ///
    /// Fails with [`Error::Query`] if the statement produced no result set.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut rs = conn.query("SELECT id FROM t WHERE id = ?", &[&10]).await?;
    /// while rs.next() {
    ///     let id: i64 = rs.get(0)?;
    /// }
    /// ```
    pub async fn query(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<ResultSet> {
        tracing::debug!(sql = sql, params_count = params.len(), "executing query");
        self.ensure_open()?;
        let statement = bind_all(Statement::query(sql), params)?;
        let result = self.stream.execute(statement).await?;
        if !result.has_columns() {
            return Err(Error::Query("statement did not return a result set".into()));
        }
        Ok(result.into_result_set())
    }

    /// Execute SQL statements as one batch.
    pub async fn execute_batch<S: AsRef<str>>(&mut self, statements: &[S]) -> Result<()> {
        self.ensure_open()?;
        self.stream.execute_batch(statements).await
    }

    /// Check if the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the connection and its stream.
    ///
    /// The connection counts as closed even if closing the stream fails.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream.close().await
    }

    /// The underlying stream, for inspecting its state and baton.
    ///
    /// Statements must go through the connection so that the autocommit
    /// flag stays in step with the server.
    #[must_use]
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    async fn run(&mut self, sql: &str) -> Result<()> {
        self.stream.execute(Statement::command(sql)).await?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::ConnectionClosed)
        } else {
            Ok(())
        }
    }
}

fn bind_all(statement: Statement, params: &[&(dyn ToSql + Sync)]) -> Result<Statement> {
    params
        .iter()
        .try_fold(statement, |stmt, param| stmt.bind(*param))
        .map_err(Error::from)
}

//! Statement builder.
//!
//! Values are converted when they are bound, so a value that cannot be
//! represented on the wire is rejected before any request is made.

use hrana_protocol::{NamedArg, Stmt};
use hrana_types::{SqlValue, ToSql, TypeError};

use crate::to_params::{NamedParam, ToParams};

/// A single SQL statement with bound parameters.
///
/// The SQL text must contain exactly one statement; splitting
/// multi-statement scripts is the caller's responsibility.
///
/// # Example
///
/// ```rust
/// use hrana_client::Statement;
///
/// let stmt = Statement::new("INSERT INTO users (id, name) VALUES (?, :name)")
///     .bind(&1i64)?
///     .bind_named("name", "Alice")?
///     .want_rows(false);
/// assert_eq!(stmt.args().len(), 1);
/// # Ok::<(), hrana_types::TypeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    args: Vec<SqlValue>,
    named_args: Vec<NamedParam>,
    want_rows: bool,
}

impl Statement {
    /// Create a statement that returns rows.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
            named_args: Vec::new(),
            want_rows: true,
        }
    }

    /// Create a statement whose rows are wanted.
    pub fn query(sql: impl Into<String>) -> Self {
        Self::new(sql)
    }

    /// Create a statement whose rows are not wanted.
    pub fn command(sql: impl Into<String>) -> Self {
        Self::new(sql).want_rows(false)
    }

    /// Bind the next positional parameter.
    pub fn bind<T: ToSql + ?Sized>(mut self, value: &T) -> Result<Self, TypeError> {
        self.args.push(value.to_sql()?);
        Ok(self)
    }

    /// Bind the next positional parameter from an already converted value.
    #[must_use]
    pub fn bind_value(mut self, value: SqlValue) -> Self {
        self.args.push(value);
        self
    }

    /// Bind a named parameter.
    pub fn bind_named<T: ToSql + ?Sized>(
        mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, TypeError> {
        self.named_args.push(NamedParam::from_value(name, value)?);
        Ok(self)
    }

    /// Bind every parameter produced by `params`.
    pub fn bind_params<P: ToParams + ?Sized>(mut self, params: &P) -> Result<Self, TypeError> {
        self.named_args.extend(params.to_params()?);
        Ok(self)
    }

    /// Set whether the server should return rows.
    #[must_use]
    pub fn want_rows(mut self, want_rows: bool) -> Self {
        self.want_rows = want_rows;
        self
    }

    /// Get the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the positional parameters.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Get the named parameters.
    #[must_use]
    pub fn named_args(&self) -> &[NamedParam] {
        &self.named_args
    }

    /// Check if rows are requested.
    #[must_use]
    pub fn wants_rows(&self) -> bool {
        self.want_rows
    }

    pub(crate) fn into_stmt(self) -> Stmt {
        Stmt {
            sql: self.sql,
            args: self.args.into_iter().map(Into::into).collect(),
            named_args: self
                .named_args
                .into_iter()
                .map(|p| NamedArg {
                    name: p.name,
                    value: p.value.into(),
                })
                .collect(),
            want_rows: self.want_rows,
        }
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

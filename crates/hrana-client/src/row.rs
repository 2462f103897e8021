//! Row representation for query results.
//!
//! Rows from one result share their column metadata through an `Arc`, and
//! each row holds its values as `Arc<[SqlValue]>` so that cloning a row is
//! cheap.
//!
//! ## Access Patterns
//!
//! - `get<T>()` / `get_by_name<T>()` - type-converting accessors; fail on NULL
//! - `try_get<T>()` - `None` for NULL, a bad index or a failed conversion
//! - `get_raw()` - the untyped value

use std::sync::Arc;

use hrana_protocol::Col;
use hrana_types::{FromSql, SqlValue, TypeError};

/// Column metadata describing a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Column {
    /// Column name; empty when the server did not provide one.
    pub name: String,
    /// Column index (0-based).
    pub index: usize,
    /// Declared type from the table schema (e.g. "INTEGER", "TEXT").
    ///
    /// Expressions and aggregates have no declared type.
    pub decltype: Option<String>,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            decltype: None,
        }
    }

    /// Set the declared type.
    #[must_use]
    pub fn with_decltype(mut self, decltype: impl Into<String>) -> Self {
        self.decltype = Some(decltype.into());
        self
    }

    pub(crate) fn from_col(col: Col, index: usize) -> Self {
        Self {
            name: col.name.unwrap_or_default(),
            index,
            decltype: col.decltype,
        }
    }
}

/// Shared column metadata for a result.
///
/// This is shared across all rows in the result to avoid
/// duplicating metadata per row.
#[derive(Debug, Clone, Default)]
pub struct ColMetaData {
    /// Column definitions.
    pub columns: Arc<[Column]>,
}

impl ColMetaData {
    /// Create new column metadata from a list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: columns.into(),
        }
    }

    /// Get the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a column by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find a column index by name (case-insensitive).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// A row from a query result.
#[derive(Clone)]
pub struct Row {
    values: Arc<[SqlValue]>,
    metadata: Arc<ColMetaData>,
}

impl Row {
    /// Create a row from decoded values and shared metadata.
    pub fn new(values: Vec<SqlValue>, metadata: Arc<ColMetaData>) -> Self {
        Self {
            values: values.into(),
            metadata,
        }
    }

    /// Create a row from columns and values, without shared metadata.
    pub fn from_values(columns: Vec<Column>, values: Vec<SqlValue>) -> Self {
        Self::new(values, Arc::new(ColMetaData::new(columns)))
    }

    /// Get a value by column index with type conversion.
    ///
    /// Fails with [`TypeError::UnexpectedNull`] when the value is NULL; use
    /// `Option<T>` as the target type to accept NULLs.
    pub fn get<T: FromSql>(&self, index: usize) -> Result<T, TypeError> {
        let value = self
            .values
            .get(index)
            .ok_or(TypeError::InvalidColumnIndex {
                index,
                len: self.values.len(),
            })?;
        T::from_sql(value)
    }

    /// Get a value by column name with type conversion.
    ///
    /// Column lookup is case-insensitive.
    pub fn get_by_name<T: FromSql>(&self, name: &str) -> Result<T, TypeError> {
        let index = self
            .metadata
            .find_by_name(name)
            .ok_or_else(|| TypeError::ColumnNotFound(name.to_string()))?;
        self.get(index)
    }

    /// Try to get a value by column index, returning None if NULL or not found.
    pub fn try_get<T: FromSql>(&self, index: usize) -> Option<T> {
        self.values
            .get(index)
            .and_then(|v| T::from_sql_nullable(v).ok().flatten())
    }

    /// Try to get a value by column name, returning None if NULL or not found.
    pub fn try_get_by_name<T: FromSql>(&self, name: &str) -> Option<T> {
        let index = self.metadata.find_by_name(name)?;
        self.try_get(index)
    }

    /// Get the raw SQL value by index.
    #[must_use]
    pub fn get_raw(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Check if a column value is NULL.
    ///
    /// Out-of-range indexes report NULL.
    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).is_none_or(SqlValue::is_null)
    }

    /// Get the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the column metadata.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.metadata.columns
    }

    /// Get the shared column metadata.
    #[must_use]
    pub fn metadata(&self) -> &Arc<ColMetaData> {
        &self.metadata
    }

    /// Iterate over the raw values.
    pub fn iter(&self) -> std::slice::Iter<'_, SqlValue> {
        self.values.iter()
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("columns", &self.metadata.columns.len())
            .field("values", &self.values)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a SqlValue;
    type IntoIter = std::slice::Iter<'a, SqlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

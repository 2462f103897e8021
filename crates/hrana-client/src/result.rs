//! Statement results and the result-set cursor.

use std::sync::Arc;

use hrana_protocol::StmtResult;
use hrana_types::{FromSql, SqlValue, TypeError};

use crate::row::{ColMetaData, Column, Row};

/// Result of executing one statement.
///
/// Columns are present whenever the statement produces them, even if no
/// rows were returned; `rows` is empty when rows were not requested.
#[derive(Debug, Clone, Default)]
pub struct StatementResult {
    metadata: Arc<ColMetaData>,
    rows: Vec<Row>,
    rows_affected: u64,
    last_insert_rowid: Option<i64>,
}

impl StatementResult {
    /// Column metadata.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.metadata.columns
    }

    /// Returned rows, in server order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the result and return its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows changed by the statement.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Rowid of the last inserted row, if the server reported one.
    #[must_use]
    pub fn last_insert_rowid(&self) -> Option<i64> {
        self.last_insert_rowid
    }

    /// Check whether the statement produced a result set.
    #[must_use]
    pub fn has_columns(&self) -> bool {
        !self.metadata.is_empty()
    }

    /// Turn this result into a forward-only cursor.
    #[must_use]
    pub fn into_result_set(self) -> ResultSet {
        ResultSet::new(self.metadata, self.rows)
    }
}

impl From<StmtResult> for StatementResult {
    fn from(result: StmtResult) -> Self {
        let columns = result
            .cols
            .into_iter()
            .enumerate()
            .map(|(index, col)| Column::from_col(col, index))
            .collect();
        let metadata = Arc::new(ColMetaData::new(columns));

        let rows = result
            .rows
            .into_iter()
            .map(|row| {
                let values = row.values.into_iter().map(SqlValue::from).collect();
                Row::new(values, Arc::clone(&metadata))
            })
            .collect();

        Self {
            metadata,
            rows,
            rows_affected: result.affected_row_count,
            last_insert_rowid: result.last_insert_rowid,
        }
    }
}

/// Forward-only cursor over buffered rows.
///
/// The cursor starts before the first row; call [`ResultSet::next`] to
/// advance. Column indexes are 0-based.
///
/// ```rust,ignore
/// let mut rs = conn.query("SELECT id, name FROM users", &[]).await?;
/// while rs.next() {
///     let id: i64 = rs.get(0)?;
///     let name: Option<String> = rs.get_by_name("name")?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ResultSet {
    metadata: Arc<ColMetaData>,
    rows: std::vec::IntoIter<Row>,
    current: Option<Row>,
    last_was_null: bool,
}

impl ResultSet {
    fn new(metadata: Arc<ColMetaData>, rows: Vec<Row>) -> Self {
        Self {
            metadata,
            rows: rows.into_iter(),
            current: None,
            last_was_null: false,
        }
    }

    /// Advance to the next row. Returns `false` once the rows are exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.current = self.rows.next();
        self.last_was_null = false;
        self.current.is_some()
    }

    /// Column metadata.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.metadata.columns
    }

    /// Number of rows not yet visited.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// The row under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// Find the index of a column by label (case-insensitive).
    pub fn find_column(&self, label: &str) -> Result<usize, TypeError> {
        self.metadata
            .find_by_name(label)
            .ok_or_else(|| TypeError::ColumnNotFound(label.to_string()))
    }

    /// Read a column of the current row.
    ///
    /// Fails with [`TypeError::NoCurrentRow`] before the first call to
    /// [`next`](Self::next) or after the rows run out, and with
    /// [`TypeError::InvalidColumnIndex`] when the index is out of range.
    pub fn get<T: FromSql>(&mut self, index: usize) -> Result<T, TypeError> {
        let row = self.current.as_ref().ok_or(TypeError::NoCurrentRow)?;
        let value = row.get_raw(index).ok_or(TypeError::InvalidColumnIndex {
            index,
            len: row.len(),
        })?;
        self.last_was_null = value.is_null();
        T::from_sql(value)
    }

    /// Read a column of the current row by label.
    pub fn get_by_name<T: FromSql>(&mut self, label: &str) -> Result<T, TypeError> {
        let index = self.find_column(label)?;
        self.get(index)
    }

    /// Check whether the last value read was NULL.
    #[must_use]
    pub fn was_null(&self) -> bool {
        self.last_was_null
    }
}

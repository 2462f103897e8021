//! Statement and statement-result messages.

use crate::codec::{WireMessage, from_protos, required, to_protos};
use crate::error::ProtocolError;
use crate::proto;
use crate::value::Value;

/// An error reported by the server for one request or batch step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerError {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code (e.g. `SQLITE_CONSTRAINT`), if any.
    pub code: Option<String>,
}

impl ServerError {
    /// Create an error with a message and no code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attach an error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl WireMessage for ServerError {
    type Proto = proto::Error;

    fn to_proto(&self) -> proto::Error {
        proto::Error {
            message: self.message.clone(),
            code: self.code.clone(),
        }
    }

    fn from_proto(proto: proto::Error) -> Result<Self, ProtocolError> {
        Ok(Self {
            message: proto.message,
            code: proto.code,
        })
    }
}

/// A named argument. The name includes its SQLite prefix (`:`, `@` or `$`).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    /// Parameter name, prefix included.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

impl WireMessage for NamedArg {
    type Proto = proto::NamedArg;

    fn to_proto(&self) -> proto::NamedArg {
        proto::NamedArg {
            name: self.name.clone(),
            value: Some(self.value.to_proto()),
        }
    }

    fn from_proto(proto: proto::NamedArg) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: proto.name,
            value: Value::from_proto(required(proto.value, "NamedArg.value")?)?,
        })
    }
}

/// A single SQL statement with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// SQL text. Must hold exactly one statement.
    pub sql: String,
    /// Positional arguments, bound to `?` / `?NNN`.
    pub args: Vec<Value>,
    /// Named arguments.
    pub named_args: Vec<NamedArg>,
    /// Whether the server should return rows.
    pub want_rows: bool,
}

impl Stmt {
    /// Create a statement without arguments.
    pub fn new(sql: impl Into<String>, want_rows: bool) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
            named_args: Vec::new(),
            want_rows,
        }
    }
}

impl WireMessage for Stmt {
    type Proto = proto::Stmt;

    fn to_proto(&self) -> proto::Stmt {
        proto::Stmt {
            sql: Some(self.sql.clone()),
            sql_id: None,
            args: to_protos(&self.args),
            named_args: to_protos(&self.named_args),
            want_rows: Some(self.want_rows),
        }
    }

    /// Statements referring to stored SQL by `sql_id` are not supported and
    /// decode as missing `sql`.
    fn from_proto(proto: proto::Stmt) -> Result<Self, ProtocolError> {
        Ok(Self {
            sql: required(proto.sql, "Stmt.sql")?,
            args: from_protos(proto.args)?,
            named_args: from_protos(proto.named_args)?,
            want_rows: proto.want_rows.unwrap_or(true),
        })
    }
}

/// Column description in a statement result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Col {
    /// Column name, absent for unnamed expressions on some servers.
    pub name: Option<String>,
    /// Declared type from the table schema, if any.
    pub decltype: Option<String>,
}

impl WireMessage for Col {
    type Proto = proto::Col;

    fn to_proto(&self) -> proto::Col {
        proto::Col {
            name: self.name.clone(),
            decltype: self.decltype.clone(),
        }
    }

    fn from_proto(proto: proto::Col) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: proto.name,
            decltype: proto.decltype,
        })
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Values in column order.
    pub values: Vec<Value>,
}

impl WireMessage for Row {
    type Proto = proto::Row;

    fn to_proto(&self) -> proto::Row {
        proto::Row {
            values: to_protos(&self.values),
        }
    }

    fn from_proto(proto: proto::Row) -> Result<Self, ProtocolError> {
        Ok(Self {
            values: from_protos(proto.values)?,
        })
    }
}

/// Result of executing one statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StmtResult {
    /// Result columns.
    pub cols: Vec<Col>,
    /// Result rows; empty when rows were not requested.
    pub rows: Vec<Row>,
    /// Number of rows changed by the statement.
    pub affected_row_count: u64,
    /// Rowid of the last inserted row, if the statement inserted one.
    pub last_insert_rowid: Option<i64>,
}

impl WireMessage for StmtResult {
    type Proto = proto::StmtResult;

    fn to_proto(&self) -> proto::StmtResult {
        proto::StmtResult {
            cols: to_protos(&self.cols),
            rows: to_protos(&self.rows),
            affected_row_count: self.affected_row_count,
            last_insert_rowid: self.last_insert_rowid,
        }
    }

    fn from_proto(proto: proto::StmtResult) -> Result<Self, ProtocolError> {
        Ok(Self {
            cols: from_protos(proto.cols)?,
            rows: from_protos(proto.rows)?,
            affected_row_count: proto.affected_row_count,
            last_insert_rowid: proto.last_insert_rowid,
        })
    }
}

//! Type conversion error types.

use thiserror::Error;

/// Errors that can occur during type conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TypeError {
    /// Value is null when non-null was expected.
    #[error("unexpected null value")]
    UnexpectedNull,

    /// Type mismatch during conversion.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Storage class actually received.
        actual: &'static str,
    },

    /// Value does not fit the target type.
    #[error("value {value} out of range for {target_type}")]
    ValueOutOfRange {
        /// The offending value, rendered for diagnostics.
        value: String,
        /// Target type name.
        target_type: &'static str,
    },

    /// Column index past the end of the row.
    #[error("column index {index} out of bounds for row of {len} columns")]
    InvalidColumnIndex {
        /// Requested index.
        index: usize,
        /// Number of columns in the row.
        len: usize,
    },

    /// A column was read while the cursor was not on a row.
    #[error("no current row")]
    NoCurrentRow,

    /// No column with the requested label.
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// The host value has no mapping onto a protocol value.
    #[error("unsupported value type: {type_name}")]
    UnsupportedValueType {
        /// Rust type name of the value.
        type_name: &'static str,
    },
}

impl TypeError {
    pub(crate) fn out_of_range(value: impl ToString, target_type: &'static str) -> Self {
        Self::ValueOutOfRange {
            value: value.to_string(),
            target_type,
        }
    }
}

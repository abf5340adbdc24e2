//! Error types for pgb

use thiserror::Error;

/// Result type alias for pgb operations
pub type PgbResult<T> = Result<T, PgbError>;

/// Errors surfaced while generating a statement.
///
/// The error is `Clone` because a failed build is cached just like a
/// successful one and handed back to every later caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgbError {
    /// No records were supplied, so there is no row to discover columns from.
    #[error("Empty insert into {table}: at least one row is required")]
    EmptyRows { table: String },

    /// A record's field map does not have the same keys as the first record.
    #[error("Column mismatch in row {row}: expected [{}], found [{}]", .expected.join(", "), .found.join(", "))]
    ColumnMismatch {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// An `EXCLUDED` reference was used as a row value.
    #[error("EXCLUDED reference in VALUES for column '{column}' (only valid in ON CONFLICT DO UPDATE)")]
    ExcludedInValues { column: String },
}

impl PgbError {
    /// Check if this error was caused by an empty record collection
    pub fn is_empty_rows(&self) -> bool {
        matches!(self, Self::EmptyRows { .. })
    }

    /// Check if this error was caused by heterogeneous field maps
    pub fn is_column_mismatch(&self) -> bool {
        matches!(self, Self::ColumnMismatch { .. })
    }
}

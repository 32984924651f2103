//! Error types for alteration planning and replay.

/// Errors that can occur while planning or replaying an alteration.
#[derive(Debug, thiserror::Error)]
pub enum AlterError {
    /// A referenced table is not part of the structure.
    #[error("Table '{table}' not found")]
    TableNotFound {
        /// Qualified table name.
        table: String,
    },

    /// A referenced column is not part of its table.
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// Qualified table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// A referenced constraint is not part of its table.
    #[error("Constraint '{constraint}' not found in table '{table}'")]
    ConstraintNotFound {
        /// Qualified table name.
        table: String,
        /// Constraint name.
        constraint: String,
    },

    /// A table with the same identity already exists.
    #[error("Table '{0}' already exists")]
    TableExists(String),

    /// A constraint kind outside primary key, foreign key, index, unique and check.
    #[error("Unsupported constraint kind '{0}'")]
    UnsupportedConstraintKind(String),

    /// The processor cannot perform the operation for this dialect.
    #[error("Operation '{operation}' is not supported by the {dialect} dialect")]
    UnsupportedOperation {
        /// Dialect name.
        dialect: &'static str,
        /// Operation type.
        operation: String,
    },

    /// Failure reported by a caller-supplied processor.
    #[error("Processor error: {0}")]
    Processor(String),

    /// Invalid capability profile or structure document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AlterError {
    /// Returns whether this error reports a missing table, column or constraint.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TableNotFound { .. }
                | Self::ColumnNotFound { .. }
                | Self::ConstraintNotFound { .. }
        )
    }
}

/// Result type for alteration planning.
pub type Result<T> = std::result::Result<T, AlterError>;

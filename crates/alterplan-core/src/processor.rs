//! Processor contract.
//!
//! A processor is whatever consumes a finished plan: a DDL renderer, a
//! live connection, or an in-memory structure (see
//! [`StructureAlterProcessor`](crate::state::StructureAlterProcessor)).

use crate::error::Result;
use crate::structure::{ColumnInfo, ConstraintInfo, TableInfo};

/// Receives the operations of a plan, one call per operation.
pub trait AlterProcessor {
    /// Creates a table.
    fn create_table(&mut self, table: &TableInfo) -> Result<()>;

    /// Drops a table.
    fn drop_table(&mut self, table: &TableInfo) -> Result<()>;

    /// Renames a table to `new_name`, keeping its schema.
    fn rename_table(&mut self, table: &TableInfo, new_name: &str) -> Result<()>;

    /// Adds a column. `constraints` lists constraints to declare alongside it.
    fn create_column(&mut self, column: &ColumnInfo, constraints: &[ConstraintInfo]) -> Result<()>;

    /// Changes a column definition.
    fn change_column(&mut self, old_column: &ColumnInfo, new_column: &ColumnInfo) -> Result<()>;

    /// Renames a column.
    fn rename_column(&mut self, column: &ColumnInfo, new_name: &str) -> Result<()>;

    /// Drops a column.
    fn drop_column(&mut self, column: &ColumnInfo) -> Result<()>;

    /// Adds a constraint or index.
    fn create_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()>;

    /// Changes a constraint or index.
    fn change_constraint(
        &mut self,
        old_constraint: &ConstraintInfo,
        new_constraint: &ConstraintInfo,
    ) -> Result<()>;

    /// Renames a constraint or index.
    fn rename_constraint(&mut self, constraint: &ConstraintInfo, new_name: &str) -> Result<()>;

    /// Drops a constraint or index.
    fn drop_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()>;

    /// Rebuilds `old_table` so that it matches `new_table`.
    fn recreate_table(&mut self, old_table: &TableInfo, new_table: &TableInfo) -> Result<()>;
}

//! Alteration plans.
//!
//! A plan collects primitive operations and turns them into a list an
//! engine can execute:
//!
//! 1. [`add_logical_dependencies`] unwinds constraints that depend on
//!    dropped or changed columns and on dropped tables;
//! 2. [`transform_to_implemented_ops`] wraps every operation the dialect
//!    cannot perform into a table rebuild;
//! 3. [`group_table_recreations`] merges all rebuilds of one table.
//!
//! # Example
//!
//! ```rust
//! use alterplan_core::prelude::*;
//!
//! let orders = TableInfo::new("orders")
//!     .column(ColumnInfo::new("id", DataType::Integer).not_null())
//!     .column(ColumnInfo::new("note", DataType::Text));
//! let note = orders.get_column("note").cloned().unwrap();
//! let db = StructureDescriptor::single(orders);
//!
//! let dialect = DialectCapabilities {
//!     drop_column: false.into(),
//!     ..DialectCapabilities::default()
//! };
//!
//! let mut plan = AlterPlan::new(db, dialect);
//! plan.drop_column(note);
//! let plan = plan.transform_plan().unwrap();
//!
//! assert_eq!(plan.operations().len(), 1);
//! assert!(plan.operations()[0].is_recreate());
//! ```

mod capability;
mod dependencies;
mod grouping;

pub use capability::{is_directly_supported, transform_to_implemented_ops};
pub use dependencies::{add_logical_dependencies, dependent_column_constraints};
pub use grouping::group_table_recreations;

use tracing::{debug, info};

use crate::dialect::DialectCapabilities;
use crate::error::Result;
use crate::executor::run_tracked_alter_operations;
use crate::operation::AlterOperation;
use crate::processor::AlterProcessor;
use crate::structure::{ColumnInfo, ConstraintInfo, StructureDescriptor, TableInfo};

/// Accumulates the operations of one change set.
#[derive(Debug)]
pub struct AlterPlan {
    db: StructureDescriptor,
    dialect: DialectCapabilities,
    operations: Vec<AlterOperation>,
}

impl AlterPlan {
    /// Creates an empty plan over the current structure.
    #[must_use]
    pub fn new(db: StructureDescriptor, dialect: DialectCapabilities) -> Self {
        Self {
            db,
            dialect,
            operations: Vec::new(),
        }
    }

    /// Returns the structure the plan was built against.
    #[must_use]
    pub fn structure(&self) -> &StructureDescriptor {
        &self.db
    }

    /// Returns the dialect capabilities.
    #[must_use]
    pub fn dialect(&self) -> &DialectCapabilities {
        &self.dialect
    }

    /// Returns the operations appended so far.
    #[must_use]
    pub fn operations(&self) -> &[AlterOperation] {
        &self.operations
    }

    /// Appends an already built operation.
    pub fn push(&mut self, operation: AlterOperation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    /// Appends a table creation.
    pub fn create_table(&mut self, table: TableInfo) -> &mut Self {
        self.push(AlterOperation::create_table(table))
    }

    /// Appends a table drop.
    pub fn drop_table(&mut self, table: TableInfo) -> &mut Self {
        self.push(AlterOperation::drop_table(table))
    }

    /// Appends a table rename.
    pub fn rename_table(&mut self, table: TableInfo, new_name: impl Into<String>) -> &mut Self {
        self.push(AlterOperation::rename_table(table, new_name))
    }

    /// Appends a column creation.
    pub fn create_column(&mut self, column: ColumnInfo) -> &mut Self {
        self.push(AlterOperation::create_column(column))
    }

    /// Appends a column change.
    pub fn change_column(&mut self, old_column: ColumnInfo, new_column: ColumnInfo) -> &mut Self {
        self.push(AlterOperation::change_column(old_column, new_column))
    }

    /// Appends a column rename.
    pub fn rename_column(&mut self, column: ColumnInfo, new_name: impl Into<String>) -> &mut Self {
        self.push(AlterOperation::rename_column(column, new_name))
    }

    /// Appends a column drop.
    pub fn drop_column(&mut self, column: ColumnInfo) -> &mut Self {
        self.push(AlterOperation::drop_column(column))
    }

    /// Appends a constraint creation.
    pub fn create_constraint(&mut self, constraint: ConstraintInfo) -> &mut Self {
        self.push(AlterOperation::create_constraint(constraint))
    }

    /// Appends a constraint change.
    pub fn change_constraint(
        &mut self,
        old_constraint: ConstraintInfo,
        new_constraint: ConstraintInfo,
    ) -> &mut Self {
        self.push(AlterOperation::change_constraint(old_constraint, new_constraint))
    }

    /// Appends a constraint drop.
    pub fn drop_constraint(&mut self, constraint: ConstraintInfo) -> &mut Self {
        self.push(AlterOperation::drop_constraint(constraint))
    }

    /// Appends a constraint rename.
    pub fn rename_constraint(
        &mut self,
        constraint: ConstraintInfo,
        new_name: impl Into<String>,
    ) -> &mut Self {
        self.push(AlterOperation::rename_constraint(constraint, new_name))
    }

    /// Appends an explicit table rebuild.
    pub fn recreate_table(
        &mut self,
        table: TableInfo,
        operations: Vec<AlterOperation>,
    ) -> &mut Self {
        self.push(AlterOperation::recreate_table(table, operations))
    }

    /// Runs the three passes in order and freezes the plan.
    pub fn transform_plan(self) -> Result<TransformedPlan> {
        let Self {
            db,
            dialect,
            operations,
        } = self;
        let requested = operations.len();

        let operations = add_logical_dependencies(operations, &db, &dialect)?;
        debug!(count = operations.len(), "Added logical dependencies");

        let operations = transform_to_implemented_ops(operations, &db, &dialect)?;
        debug!(count = operations.len(), "Transformed to implemented operations");

        let operations = group_table_recreations(operations);
        info!(
            requested,
            planned = operations.len(),
            recreates = operations.iter().filter(|op| op.is_recreate()).count(),
            "Alter plan transformed"
        );

        Ok(TransformedPlan {
            db,
            dialect,
            operations,
        })
    }
}

/// A plan whose passes have run. Read-only.
#[derive(Debug)]
pub struct TransformedPlan {
    db: StructureDescriptor,
    dialect: DialectCapabilities,
    operations: Vec<AlterOperation>,
}

impl TransformedPlan {
    /// Returns the structure the plan was built against.
    #[must_use]
    pub fn structure(&self) -> &StructureDescriptor {
        &self.db
    }

    /// Returns the dialect capabilities.
    #[must_use]
    pub fn dialect(&self) -> &DialectCapabilities {
        &self.dialect
    }

    /// Returns the final operations.
    #[must_use]
    pub fn operations(&self) -> &[AlterOperation] {
        &self.operations
    }

    /// Consumes the plan, returning the final operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<AlterOperation> {
        self.operations
    }

    /// Replays the plan against `processor`, tracking the structure so that
    /// every rebuild starts from the table as the earlier operations left it.
    ///
    /// # Errors
    ///
    /// Returns the first error of the processor or of the structure
    /// tracking.
    pub fn run<P: AlterProcessor + ?Sized>(&self, processor: &mut P) -> Result<()> {
        run_tracked_alter_operations(&self.operations, self.db.clone(), processor).map(drop)
    }
}

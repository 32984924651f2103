//! Dialect-aware planning of database structure alterations.
//!
//! `alterplan-core` turns a list of primitive structure changes into an
//! ordered list of operations a specific engine can actually run:
//!
//! - Constraints that depend on a dropped or changed column are dropped
//!   first and, for changes, recreated afterwards
//! - Operations the engine cannot issue directly become table rebuilds
//! - All rebuilds of one table collapse into a single rebuild
//!
//! # Architecture
//!
//! - **Structure** - Tables, columns and constraints ([`structure`])
//! - **Dialect** - What an engine can do directly ([`dialect`])
//! - **Operations** - The closed set of alterations ([`operation`])
//! - **Plan** - Collects operations and runs the passes ([`plan`])
//! - **Executor** - Replays a finished plan against a processor ([`executor`])
//! - **Processor** - The consumer contract ([`processor`]), with an
//!   in-memory implementation ([`state`])
//!
//! # Example
//!
//! ```rust
//! use alterplan_core::prelude::*;
//!
//! let orders = TableInfo::new("orders")
//!     .column(ColumnInfo::new("id", DataType::Integer).not_null())
//!     .column(ColumnInfo::new("note", DataType::Text))
//!     .index(ConstraintInfo::index("ix_note", &["note"]));
//! let note = orders.get_column("note").cloned().unwrap();
//! let db = StructureDescriptor::single(orders);
//!
//! let dialect = DialectCapabilities {
//!     drop_column_dependencies: DependencyPolicy::of(&[DependencyKind::Indexes]),
//!     ..DialectCapabilities::default()
//! };
//!
//! let mut plan = AlterPlan::new(db.clone(), dialect);
//! plan.drop_column(note);
//! let plan = plan.transform_plan().unwrap();
//!
//! let mut state = StructureAlterProcessor::new(db);
//! plan.run(&mut state).unwrap();
//!
//! let orders = state.structure().get_table(&"orders".into()).unwrap();
//! assert!(orders.indexes.is_empty());
//! assert_eq!(orders.columns.len(), 1);
//! ```

pub mod dialect;
pub mod error;
pub mod executor;
pub mod operation;
pub mod plan;
pub mod processor;
pub mod state;
pub mod structure;

pub use dialect::{
    Capability, DependencyKind, DependencyPolicy, DialectCapabilities, DialectProfile,
};
pub use error::{AlterError, Result};
pub use executor::{run_alter_operation, run_alter_operations, run_tracked_alter_operations};
pub use operation::AlterOperation;
pub use plan::{AlterPlan, TransformedPlan};
pub use processor::AlterProcessor;
pub use state::StructureAlterProcessor;
pub use structure::{
    ColumnInfo, ColumnReference, ConstraintInfo, ConstraintKind, DataType, DefaultValue,
    ForeignKeyAction, StructureDescriptor, TableInfo, TableName,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{
        Capability, DependencyKind, DependencyPolicy, DialectCapabilities, DialectProfile,
    };
    pub use crate::error::{AlterError, Result};
    pub use crate::executor::{run_alter_operations, run_tracked_alter_operations};
    pub use crate::operation::AlterOperation;
    pub use crate::plan::{AlterPlan, TransformedPlan};
    pub use crate::processor::AlterProcessor;
    pub use crate::state::StructureAlterProcessor;
    pub use crate::structure::{
        ColumnInfo, ColumnReference, ConstraintInfo, ConstraintKind, DataType, DefaultValue,
        ForeignKeyAction, StructureDescriptor, TableInfo, TableName,
    };
}

//! SQL DDL rendering for alteration plans.
//!
//! `alterplan-sql` implements the [`AlterProcessor`] contract of
//! `alterplan-core` by rendering each operation as SQL for a concrete
//! engine. Each [`SqlDialect`] also publishes the capabilities the planner
//! must respect, so a plan built with `dialect.capabilities()` only ever
//! asks the dialect for statements it can produce.
//!
//! # Example
//!
//! ```rust
//! use alterplan_core::prelude::*;
//! use alterplan_sql::prelude::*;
//!
//! let users = TableInfo::new("users")
//!     .column(ColumnInfo::new("id", DataType::Integer).not_null())
//!     .column(ColumnInfo::new("email", DataType::Text))
//!     .unique(ConstraintInfo::unique("uq_email", &["email"]));
//! let uq = users.uniques[0].clone();
//! let db = StructureDescriptor::single(users);
//!
//! let dialect = SqliteDialect::new();
//! let mut plan = AlterPlan::new(db, dialect.capabilities());
//! plan.drop_constraint(uq);
//! let plan = plan.transform_plan().unwrap();
//!
//! let mut processor = SqlAlterProcessor::new(dialect);
//! plan.run(&mut processor).unwrap();
//! assert_eq!(
//!     processor.statements().last().map(String::as_str),
//!     Some("ALTER TABLE \"_users_new\" RENAME TO \"users\"")
//! );
//! ```
//!
//! [`AlterProcessor`]: alterplan_core::AlterProcessor

pub mod dialect;
pub mod processor;

pub use dialect::{paired_columns, PostgresDialect, SqlDialect, SqliteDialect};
pub use processor::SqlAlterProcessor;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{PostgresDialect, SqlDialect, SqliteDialect};
    pub use crate::processor::SqlAlterProcessor;
}

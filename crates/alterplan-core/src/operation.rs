//! Alteration operations.
//!
//! Defines the closed set of primitive structure changes a plan is made of.

use serde::{Deserialize, Serialize};

use crate::structure::{ColumnInfo, ConstraintInfo, TableInfo, TableName};

/// A single structure alteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "operationType",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum AlterOperation {
    /// Create a new table.
    CreateTable {
        /// Table to create.
        new_object: TableInfo,
    },

    /// Drop a table.
    DropTable {
        /// Table to drop.
        old_object: TableInfo,
    },

    /// Rename a table.
    RenameTable {
        /// Table to rename.
        object: TableInfo,
        /// New pure name.
        new_name: String,
    },

    /// Add a column.
    CreateColumn {
        /// Column to add.
        new_object: ColumnInfo,
    },

    /// Change a column definition.
    ChangeColumn {
        /// Current definition.
        old_object: ColumnInfo,
        /// Desired definition.
        new_object: ColumnInfo,
    },

    /// Rename a column.
    RenameColumn {
        /// Column to rename.
        object: ColumnInfo,
        /// New column name.
        new_name: String,
    },

    /// Drop a column.
    DropColumn {
        /// Column to drop.
        old_object: ColumnInfo,
    },

    /// Add a constraint or index.
    CreateConstraint {
        /// Constraint to add.
        new_object: ConstraintInfo,
    },

    /// Change a constraint or index.
    ChangeConstraint {
        /// Current definition.
        old_object: ConstraintInfo,
        /// Desired definition.
        new_object: ConstraintInfo,
    },

    /// Drop a constraint or index.
    DropConstraint {
        /// Constraint to drop.
        old_object: ConstraintInfo,
    },

    /// Rename a constraint or index.
    RenameConstraint {
        /// Constraint to rename.
        object: ConstraintInfo,
        /// New constraint name.
        new_name: String,
    },

    /// Rebuild a table, replaying `operations` against a copy of it.
    RecreateTable {
        /// Table as it exists before the rebuild.
        table: TableInfo,
        /// Operations applied to the copy, in order.
        operations: Vec<AlterOperation>,
    },
}

impl AlterOperation {
    /// Creates a CreateTable operation.
    #[must_use]
    pub fn create_table(table: TableInfo) -> Self {
        Self::CreateTable { new_object: table }
    }

    /// Creates a DropTable operation.
    #[must_use]
    pub fn drop_table(table: TableInfo) -> Self {
        Self::DropTable { old_object: table }
    }

    /// Creates a RenameTable operation.
    #[must_use]
    pub fn rename_table(table: TableInfo, new_name: impl Into<String>) -> Self {
        Self::RenameTable {
            object: table,
            new_name: new_name.into(),
        }
    }

    /// Creates a CreateColumn operation.
    #[must_use]
    pub fn create_column(column: ColumnInfo) -> Self {
        Self::CreateColumn { new_object: column }
    }

    /// Creates a ChangeColumn operation.
    #[must_use]
    pub fn change_column(old_column: ColumnInfo, new_column: ColumnInfo) -> Self {
        Self::ChangeColumn {
            old_object: old_column,
            new_object: new_column,
        }
    }

    /// Creates a RenameColumn operation.
    #[must_use]
    pub fn rename_column(column: ColumnInfo, new_name: impl Into<String>) -> Self {
        Self::RenameColumn {
            object: column,
            new_name: new_name.into(),
        }
    }

    /// Creates a DropColumn operation.
    #[must_use]
    pub fn drop_column(column: ColumnInfo) -> Self {
        Self::DropColumn { old_object: column }
    }

    /// Creates a CreateConstraint operation.
    #[must_use]
    pub fn create_constraint(constraint: ConstraintInfo) -> Self {
        Self::CreateConstraint {
            new_object: constraint,
        }
    }

    /// Creates a ChangeConstraint operation.
    #[must_use]
    pub fn change_constraint(
        old_constraint: ConstraintInfo,
        new_constraint: ConstraintInfo,
    ) -> Self {
        Self::ChangeConstraint {
            old_object: old_constraint,
            new_object: new_constraint,
        }
    }

    /// Creates a DropConstraint operation.
    #[must_use]
    pub fn drop_constraint(constraint: ConstraintInfo) -> Self {
        Self::DropConstraint {
            old_object: constraint,
        }
    }

    /// Creates a RenameConstraint operation.
    #[must_use]
    pub fn rename_constraint(constraint: ConstraintInfo, new_name: impl Into<String>) -> Self {
        Self::RenameConstraint {
            object: constraint,
            new_name: new_name.into(),
        }
    }

    /// Creates a RecreateTable operation.
    #[must_use]
    pub fn recreate_table(table: TableInfo, operations: Vec<AlterOperation>) -> Self {
        Self::RecreateTable { table, operations }
    }

    /// Returns the camelCase operation type.
    #[must_use]
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "createTable",
            Self::DropTable { .. } => "dropTable",
            Self::RenameTable { .. } => "renameTable",
            Self::CreateColumn { .. } => "createColumn",
            Self::ChangeColumn { .. } => "changeColumn",
            Self::RenameColumn { .. } => "renameColumn",
            Self::DropColumn { .. } => "dropColumn",
            Self::CreateConstraint { .. } => "createConstraint",
            Self::ChangeConstraint { .. } => "changeConstraint",
            Self::DropConstraint { .. } => "dropConstraint",
            Self::RenameConstraint { .. } => "renameConstraint",
            Self::RecreateTable { .. } => "recreateTable",
        }
    }

    /// Returns the table the affected object belongs to.
    #[must_use]
    pub fn table_name(&self) -> &TableName {
        match self {
            Self::CreateTable { new_object } => &new_object.name,
            Self::DropTable { old_object } => &old_object.name,
            Self::RenameTable { object, .. } => &object.name,
            Self::CreateColumn { new_object } => &new_object.table,
            Self::ChangeColumn { old_object, .. } | Self::DropColumn { old_object } => {
                &old_object.table
            }
            Self::RenameColumn { object, .. } => &object.table,
            Self::CreateConstraint { new_object } => &new_object.table,
            Self::ChangeConstraint { old_object, .. } | Self::DropConstraint { old_object } => {
                &old_object.table
            }
            Self::RenameConstraint { object, .. } => &object.table,
            Self::RecreateTable { table, .. } => &table.name,
        }
    }

    /// Returns the owning table of the operation's old object, for
    /// operations that alter an existing column or constraint.
    #[must_use]
    pub fn old_object_table(&self) -> Option<&TableName> {
        match self {
            Self::ChangeColumn { old_object, .. } | Self::DropColumn { old_object } => {
                Some(&old_object.table)
            }
            Self::ChangeConstraint { old_object, .. } | Self::DropConstraint { old_object } => {
                Some(&old_object.table)
            }
            _ => None,
        }
    }

    /// Returns whether this is a table rebuild.
    #[must_use]
    pub fn is_recreate(&self) -> bool {
        matches!(self, Self::RecreateTable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::DataType;

    fn email() -> ColumnInfo {
        ColumnInfo::new("email", DataType::Text).in_table("users")
    }

    #[test]
    fn test_operation_type_names() {
        assert_eq!(AlterOperation::drop_column(email()).operation_type(), "dropColumn");
        assert_eq!(
            AlterOperation::recreate_table(TableInfo::new("users"), vec![]).operation_type(),
            "recreateTable"
        );
    }

    #[test]
    fn test_table_name() {
        let op = AlterOperation::rename_column(email(), "mail");
        assert_eq!(op.table_name(), &TableName::new("users"));

        let fk =
            ConstraintInfo::foreign_key("fk", &["team_id"], "teams", &["id"]).in_table("users");
        let op = AlterOperation::create_constraint(fk);
        assert_eq!(op.table_name().pure_name, "users");
    }

    #[test]
    fn test_old_object_table() {
        assert_eq!(
            AlterOperation::drop_column(email()).old_object_table(),
            Some(&TableName::new("users"))
        );
        assert!(AlterOperation::create_column(email()).old_object_table().is_none());
        assert!(AlterOperation::rename_column(email(), "mail")
            .old_object_table()
            .is_none());
        assert!(AlterOperation::drop_table(TableInfo::new("users"))
            .old_object_table()
            .is_none());
    }

    #[test]
    fn test_operation_json_shape() {
        let op = AlterOperation::rename_column(email(), "mail");
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["operationType"], "renameColumn");
        assert_eq!(json["newName"], "mail");
        assert_eq!(json["object"]["columnName"], "email");
        assert_eq!(json["object"]["pureName"], "users");

        let back: AlterOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_nested_recreate_json() {
        let op = AlterOperation::recreate_table(
            TableInfo::new("users").column(email()),
            vec![AlterOperation::drop_column(email())],
        );
        let json = serde_json::to_string(&op).unwrap();
        let back: AlterOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}

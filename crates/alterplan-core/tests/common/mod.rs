#![allow(dead_code)]

use alterplan_core::prelude::*;

/// Routes planner logs to the test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// `customers(id pk, email unique)`.
pub fn customers() -> TableInfo {
    TableInfo::new("customers")
        .column(ColumnInfo::new("id", DataType::Integer).not_null())
        .column(ColumnInfo::new("email", DataType::Varchar(255)))
        .primary_key(ConstraintInfo::primary_key("pk_customers", &["id"]))
        .unique(ConstraintInfo::unique("uq_customers_email", &["email"]))
}

/// `orders(id pk, customer_id fk -> customers.id, note indexed)`.
pub fn orders() -> TableInfo {
    TableInfo::new("orders")
        .column(ColumnInfo::new("id", DataType::Integer).not_null())
        .column(ColumnInfo::new("customer_id", DataType::Integer))
        .column(ColumnInfo::new("note", DataType::Text))
        .primary_key(ConstraintInfo::primary_key("pk_orders", &["id"]))
        .foreign_key(ConstraintInfo::foreign_key(
            "fk_orders_customer",
            &["customer_id"],
            "customers",
            &["id"],
        ))
        .index(ConstraintInfo::index("ix_orders_note", &["note"]))
}

/// Both tables with reverse references linked.
pub fn shop() -> StructureDescriptor {
    let mut db = StructureDescriptor::new().table(customers()).table(orders());
    db.link_dependencies();
    db
}

pub fn table(db: &StructureDescriptor, name: &str) -> TableInfo {
    db.get_table(&name.into())
        .cloned()
        .unwrap_or_else(|| panic!("Missing table {name}"))
}

pub fn column(db: &StructureDescriptor, table_name: &str, column_name: &str) -> ColumnInfo {
    table(db, table_name)
        .get_column(column_name)
        .cloned()
        .unwrap_or_else(|| panic!("Missing column {table_name}.{column_name}"))
}

pub fn constraint(db: &StructureDescriptor, table_name: &str, name: &str) -> ConstraintInfo {
    table(db, table_name)
        .get_constraint(name)
        .cloned()
        .unwrap_or_else(|| panic!("Missing constraint {table_name}.{name}"))
}

/// Counts every leaf operation, descending into rebuilds.
pub fn leaf_count(operations: &[AlterOperation]) -> usize {
    operations
        .iter()
        .map(|op| match op {
            AlterOperation::RecreateTable { operations, .. } => leaf_count(operations),
            _ => 1,
        })
        .sum()
}

/// Records every processor call as a line of text.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<String>,
}

impl AlterProcessor for Recorder {
    fn create_table(&mut self, table: &TableInfo) -> Result<()> {
        self.calls.push(format!("createTable {}", table.name));
        Ok(())
    }

    fn drop_table(&mut self, table: &TableInfo) -> Result<()> {
        self.calls.push(format!("dropTable {}", table.name));
        Ok(())
    }

    fn rename_table(&mut self, table: &TableInfo, new_name: &str) -> Result<()> {
        self.calls.push(format!("renameTable {} {new_name}", table.name));
        Ok(())
    }

    fn create_column(
        &mut self,
        column: &ColumnInfo,
        _constraints: &[ConstraintInfo],
    ) -> Result<()> {
        self.calls
            .push(format!("createColumn {}.{}", column.table, column.column_name));
        Ok(())
    }

    fn change_column(&mut self, old_column: &ColumnInfo, _new_column: &ColumnInfo) -> Result<()> {
        self.calls
            .push(format!("changeColumn {}.{}", old_column.table, old_column.column_name));
        Ok(())
    }

    fn rename_column(&mut self, column: &ColumnInfo, new_name: &str) -> Result<()> {
        self.calls.push(format!(
            "renameColumn {}.{} {new_name}",
            column.table, column.column_name
        ));
        Ok(())
    }

    fn drop_column(&mut self, column: &ColumnInfo) -> Result<()> {
        self.calls
            .push(format!("dropColumn {}.{}", column.table, column.column_name));
        Ok(())
    }

    fn create_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()> {
        self.calls
            .push(format!("createConstraint {}", constraint.constraint_name));
        Ok(())
    }

    fn change_constraint(&mut self, old: &ConstraintInfo, _new: &ConstraintInfo) -> Result<()> {
        self.calls
            .push(format!("changeConstraint {}", old.constraint_name));
        Ok(())
    }

    fn rename_constraint(&mut self, constraint: &ConstraintInfo, new_name: &str) -> Result<()> {
        self.calls.push(format!(
            "renameConstraint {} {new_name}",
            constraint.constraint_name
        ));
        Ok(())
    }

    fn drop_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()> {
        self.calls
            .push(format!("dropConstraint {}", constraint.constraint_name));
        Ok(())
    }

    fn recreate_table(&mut self, old_table: &TableInfo, new_table: &TableInfo) -> Result<()> {
        let columns: Vec<&str> = new_table
            .columns
            .iter()
            .map(|c| c.column_name.as_str())
            .collect();
        self.calls
            .push(format!("recreateTable {} [{}]", old_table.name, columns.join(", ")));
        Ok(())
    }
}

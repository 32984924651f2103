//! In-memory structure processor.
//!
//! Applies operations to an owned [`StructureDescriptor`] instead of a
//! database. The executor binds one to a scratch copy of a table while
//! replaying a rebuild; callers can use one to compute the structure a
//! plan will produce.
//!
//! Foreign keys of other tables and the `dependencies` lists follow every
//! rename and drop, so later operations see current references.

use crate::error::{AlterError, Result};
use crate::processor::AlterProcessor;
use crate::structure::{ColumnInfo, ConstraintInfo, StructureDescriptor, TableInfo, TableName};

/// Mutates an in-memory structure.
#[derive(Debug, Default)]
pub struct StructureAlterProcessor {
    db: StructureDescriptor,
}

impl StructureAlterProcessor {
    /// Creates a processor over `db`.
    #[must_use]
    pub fn new(db: StructureDescriptor) -> Self {
        Self { db }
    }

    /// Returns the current structure.
    #[must_use]
    pub fn structure(&self) -> &StructureDescriptor {
        &self.db
    }

    /// Consumes and returns the structure.
    #[must_use]
    pub fn into_structure(self) -> StructureDescriptor {
        self.db
    }

    fn column_mut(&mut self, column: &ColumnInfo) -> Result<&mut ColumnInfo> {
        let table = self.db.require_table_mut(&column.table)?;
        table
            .get_column_mut(&column.column_name)
            .ok_or_else(|| AlterError::ColumnNotFound {
                table: column.table.to_string(),
                column: column.column_name.clone(),
            })
    }
}

impl AlterProcessor for StructureAlterProcessor {
    fn create_table(&mut self, table: &TableInfo) -> Result<()> {
        self.db.insert_table(table.clone())
    }

    fn drop_table(&mut self, table: &TableInfo) -> Result<()> {
        self.db.remove_table(&table.name)?;
        self.db.forget_dependencies_of(&table.name);
        Ok(())
    }

    fn rename_table(&mut self, table: &TableInfo, new_name: &str) -> Result<()> {
        let new_identity = TableName {
            schema_name: table.name.schema_name.clone(),
            pure_name: new_name.to_string(),
        };
        if self.db.get_table(&new_identity).is_some() {
            return Err(AlterError::TableExists(new_identity.to_string()));
        }

        let t = self.db.require_table_mut(&table.name)?;
        t.name = new_identity.clone();
        for column in &mut t.columns {
            column.table = new_identity.clone();
        }
        let constraints = t
            .primary_key
            .iter_mut()
            .chain(&mut t.foreign_keys)
            .chain(&mut t.indexes)
            .chain(&mut t.uniques)
            .chain(&mut t.checks);
        for constraint in constraints {
            constraint.table = new_identity.clone();
        }
        self.db.rename_table_references(&table.name, &new_identity);
        Ok(())
    }

    fn create_column(&mut self, column: &ColumnInfo, constraints: &[ConstraintInfo]) -> Result<()> {
        let t = self.db.require_table_mut(&column.table)?;
        if t.get_column(&column.column_name).is_some() {
            return Err(AlterError::Processor(format!(
                "Column '{}' already exists in table '{}'",
                column.column_name, column.table
            )));
        }
        t.columns.push(column.clone());
        for constraint in constraints {
            t.add_constraint(constraint.clone())?;
        }
        Ok(())
    }

    fn change_column(&mut self, old_column: &ColumnInfo, new_column: &ColumnInfo) -> Result<()> {
        let col = self.column_mut(old_column)?;
        *col = new_column.clone();
        if old_column.column_name != new_column.column_name {
            let (old_name, new_name) = (&old_column.column_name, &new_column.column_name);
            let t = self.db.require_table_mut(&old_column.table)?;
            t.rename_column_references(old_name, new_name);
            self.db.rename_foreign_key_column(&old_column.table, old_name, new_name);
        }
        Ok(())
    }

    fn rename_column(&mut self, column: &ColumnInfo, new_name: &str) -> Result<()> {
        let col = self.column_mut(column)?;
        col.column_name = new_name.to_string();
        let t = self.db.require_table_mut(&column.table)?;
        t.rename_column_references(&column.column_name, new_name);
        self.db.rename_foreign_key_column(&column.table, &column.column_name, new_name);
        Ok(())
    }

    fn drop_column(&mut self, column: &ColumnInfo) -> Result<()> {
        let t = self.db.require_table_mut(&column.table)?;
        let idx = t
            .columns
            .iter()
            .position(|c| c.column_name == column.column_name)
            .ok_or_else(|| AlterError::ColumnNotFound {
                table: column.table.to_string(),
                column: column.column_name.clone(),
            })?;
        t.columns.remove(idx);

        // Engines discard the table's own constraints over a dropped column.
        let name = column.column_name.as_str();
        if t.primary_key.as_ref().is_some_and(|pk| pk.contains_column(name)) {
            t.primary_key = None;
        }
        let (dropped_keys, kept_keys): (Vec<ConstraintInfo>, _) =
            std::mem::take(&mut t.foreign_keys)
                .into_iter()
                .partition(|fk| fk.contains_column(name));
        t.foreign_keys = kept_keys;
        for list in [&mut t.indexes, &mut t.uniques] {
            list.retain(|c| !c.contains_column(name));
        }
        for fk in &dropped_keys {
            self.db.remove_dependency(fk);
        }
        Ok(())
    }

    fn create_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()> {
        self.db
            .require_table_mut(&constraint.table)?
            .add_constraint(constraint.clone())?;
        self.db.add_dependency(constraint);
        Ok(())
    }

    fn change_constraint(
        &mut self,
        old_constraint: &ConstraintInfo,
        new_constraint: &ConstraintInfo,
    ) -> Result<()> {
        let t = self.db.require_table_mut(&old_constraint.table)?;
        let old = t.remove_constraint(
            &old_constraint.constraint_type,
            &old_constraint.constraint_name,
        )?;
        t.add_constraint(new_constraint.clone())?;
        self.db.remove_dependency(&old);
        self.db.add_dependency(new_constraint);
        Ok(())
    }

    fn rename_constraint(&mut self, constraint: &ConstraintInfo, new_name: &str) -> Result<()> {
        let t = self.db.require_table_mut(&constraint.table)?;
        let old = t.remove_constraint(&constraint.constraint_type, &constraint.constraint_name)?;
        let mut renamed = old.clone();
        renamed.constraint_name = new_name.to_string();
        t.add_constraint(renamed.clone())?;
        self.db.remove_dependency(&old);
        self.db.add_dependency(&renamed);
        Ok(())
    }

    fn drop_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()> {
        let dropped = self
            .db
            .require_table_mut(&constraint.table)?
            .remove_constraint(&constraint.constraint_type, &constraint.constraint_name)?;
        self.db.remove_dependency(&dropped);
        Ok(())
    }

    fn recreate_table(&mut self, old_table: &TableInfo, new_table: &TableInfo) -> Result<()> {
        let t = self.db.require_table_mut(&old_table.name)?;
        let replaced = std::mem::replace(t, new_table.clone());
        for fk in &replaced.foreign_keys {
            self.db.remove_dependency(fk);
        }
        for fk in &new_table.foreign_keys {
            self.db.add_dependency(fk);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{ConstraintKind, DataType};

    fn users() -> TableInfo {
        TableInfo::new("users")
            .column(ColumnInfo::new("id", DataType::BigInt).not_null().auto_increment())
            .column(ColumnInfo::new("username", DataType::Varchar(255)).not_null())
            .primary_key(ConstraintInfo::primary_key("pk_users", &["id"]))
            .unique(ConstraintInfo::unique("uq_users_username", &["username"]))
    }

    fn processor() -> StructureAlterProcessor {
        StructureAlterProcessor::new(StructureDescriptor::single(users()))
    }

    fn get<'a>(p: &'a StructureAlterProcessor, name: &str) -> &'a TableInfo {
        p.structure().get_table(&name.into()).unwrap()
    }

    #[test]
    fn test_create_table() {
        let mut p = StructureAlterProcessor::default();
        p.create_table(&users()).unwrap();
        assert_eq!(p.structure().tables.len(), 1);
        assert_eq!(get(&p, "users").columns.len(), 2);
    }

    #[test]
    fn test_duplicate_table_error() {
        let mut p = processor();
        let result = p.create_table(&users());
        assert!(matches!(result, Err(AlterError::TableExists(_))));
    }

    #[test]
    fn test_add_and_drop_column() {
        let mut p = processor();
        let email = ColumnInfo::new("email", DataType::Varchar(255)).in_table("users");
        p.create_column(&email, &[]).unwrap();
        assert!(get(&p, "users").get_column("email").is_some());

        p.drop_column(&email).unwrap();
        assert!(get(&p, "users").get_column("email").is_none());
        assert_eq!(get(&p, "users").columns.len(), 2);
    }

    #[test]
    fn test_drop_column_discards_its_constraints() {
        let mut p = processor();
        let username = get(&p, "users").columns[1].clone();
        p.drop_column(&username).unwrap();
        assert!(get(&p, "users").uniques.is_empty());
        assert!(get(&p, "users").primary_key.is_some());
    }

    #[test]
    fn test_create_column_with_constraints() {
        let mut p = processor();
        let email = ColumnInfo::new("email", DataType::Text).in_table("users");
        let uq = ConstraintInfo::unique("uq_email", &["email"]).in_table("users");
        p.create_column(&email, std::slice::from_ref(&uq)).unwrap();
        assert_eq!(get(&p, "users").uniques.len(), 2);
    }

    #[test]
    fn test_rename_column_updates_constraints() {
        let mut p = processor();
        let username = get(&p, "users").columns[1].clone();
        p.rename_column(&username, "login").unwrap();

        let users = get(&p, "users");
        assert!(users.get_column("username").is_none());
        assert!(users.get_column("login").is_some());
        assert!(users.uniques[0].contains_column("login"));
    }

    #[test]
    fn test_change_column() {
        let mut p = processor();
        let username = get(&p, "users").columns[1].clone();
        let wider = username.clone().data_type(DataType::Text);
        p.change_column(&username, &wider).unwrap();
        assert_eq!(get(&p, "users").columns[1].data_type, DataType::Text);
    }

    #[test]
    fn test_rename_table_restamps_children() {
        let mut p = processor();
        p.rename_table(&users(), "accounts").unwrap();
        assert!(p.structure().get_table(&"users".into()).is_none());
        let accounts = get(&p, "accounts");
        assert!(accounts.columns.iter().all(|c| c.table.pure_name == "accounts"));
        assert!(accounts.constraints().all(|c| c.table.pure_name == "accounts"));
    }

    #[test]
    fn test_constraint_lifecycle() {
        let mut p = processor();
        let ix = ConstraintInfo::index("ix_username", &["username"]).in_table("users");
        p.create_constraint(&ix).unwrap();
        assert_eq!(get(&p, "users").indexes.len(), 1);

        p.rename_constraint(&ix, "ix_login").unwrap();
        assert_eq!(get(&p, "users").indexes[0].constraint_name, "ix_login");

        let renamed = get(&p, "users").indexes[0].clone();
        p.drop_constraint(&renamed).unwrap();
        assert!(get(&p, "users").indexes.is_empty());

        let pk = get(&p, "users").primary_key.clone().unwrap();
        p.drop_constraint(&pk).unwrap();
        assert!(get(&p, "users").primary_key.is_none());
    }

    #[test]
    fn test_change_constraint() {
        let mut p = processor();
        let old = get(&p, "users").uniques[0].clone();
        let mut new = old.clone();
        new.columns.push(crate::structure::ColumnReference::new("id"));
        p.change_constraint(&old, &new).unwrap();
        assert_eq!(get(&p, "users").uniques[0].columns.len(), 2);
    }

    #[test]
    fn test_missing_objects() {
        let mut p = processor();
        let ghost = ColumnInfo::new("ghost", DataType::Text).in_table("users");
        assert!(p.drop_column(&ghost).unwrap_err().is_not_found());

        let elsewhere = ColumnInfo::new("id", DataType::Text).in_table("nowhere");
        assert!(p.create_column(&elsewhere, &[]).unwrap_err().is_not_found());

        let fk = ConstraintInfo::foreign_key("fk_x", &["id"], "x", &["id"]).in_table("users");
        assert!(p.drop_constraint(&fk).unwrap_err().is_not_found());

        let odd = ConstraintInfo::new(ConstraintKind::Other("sortingKey".into()), "sk", &[])
            .in_table("users");
        assert!(matches!(
            p.create_constraint(&odd),
            Err(AlterError::UnsupportedConstraintKind(_))
        ));
    }

    fn shop() -> StructureAlterProcessor {
        let orders = TableInfo::new("orders")
            .column(ColumnInfo::new("id", DataType::BigInt).not_null())
            .column(ColumnInfo::new("user_id", DataType::BigInt))
            .foreign_key(ConstraintInfo::foreign_key(
                "fk_orders_user",
                &["user_id"],
                "users",
                &["id"],
            ));
        let mut db = StructureDescriptor::new().table(users()).table(orders);
        db.link_dependencies();
        StructureAlterProcessor::new(db)
    }

    #[test]
    fn test_rename_table_updates_references() {
        let mut p = shop();
        p.rename_table(&users(), "accounts").unwrap();

        let fk = &get(&p, "orders").foreign_keys[0];
        assert_eq!(fk.ref_table, Some("accounts".into()));
        assert_eq!(get(&p, "accounts").dependencies, [fk.clone()]);

        let orders = get(&p, "orders").clone();
        p.rename_table(&orders, "purchases").unwrap();
        assert_eq!(get(&p, "accounts").dependencies[0].table.pure_name, "purchases");
    }

    #[test]
    fn test_rename_referenced_column() {
        let mut p = shop();
        let id = get(&p, "users").columns[0].clone();
        p.rename_column(&id, "user_no").unwrap();
        assert!(get(&p, "orders").foreign_keys[0].references_column("user_no"));
        assert!(get(&p, "users").dependencies[0].references_column("user_no"));

        let user_no = get(&p, "users").columns[0].clone();
        let mut renamed = user_no.clone().data_type(DataType::Integer);
        renamed.column_name = "uid".to_string();
        p.change_column(&user_no, &renamed).unwrap();
        assert!(get(&p, "orders").foreign_keys[0].references_column("uid"));
    }

    #[test]
    fn test_drop_table_forgets_its_references() {
        let mut p = shop();
        let orders = get(&p, "orders").clone();
        p.drop_table(&orders).unwrap();
        assert!(get(&p, "users").dependencies.is_empty());
    }

    #[test]
    fn test_foreign_key_changes_update_dependencies() {
        let mut p = shop();
        let fk = get(&p, "orders").foreign_keys[0].clone();

        p.rename_constraint(&fk, "orders_user_fkey").unwrap();
        assert_eq!(get(&p, "users").dependencies[0].constraint_name, "orders_user_fkey");

        let renamed = get(&p, "orders").foreign_keys[0].clone();
        p.drop_constraint(&renamed).unwrap();
        assert!(get(&p, "users").dependencies.is_empty());

        p.create_constraint(&fk).unwrap();
        assert_eq!(get(&p, "users").dependencies, [fk.clone()]);

        let cascading = fk.clone().on_delete(crate::structure::ForeignKeyAction::Cascade);
        p.change_constraint(&fk, &cascading).unwrap();
        assert_eq!(get(&p, "users").dependencies, [cascading]);

        let user_id = get(&p, "orders").columns[1].clone();
        p.drop_column(&user_id).unwrap();
        assert!(get(&p, "users").dependencies.is_empty());
    }

    #[test]
    fn test_recreate_relinks_foreign_keys() {
        let mut p = shop();
        let old = get(&p, "orders").clone();
        let mut rebuilt = old.clone();
        rebuilt.foreign_keys.clear();
        p.recreate_table(&old, &rebuilt).unwrap();
        assert!(get(&p, "users").dependencies.is_empty());

        p.recreate_table(&rebuilt, &old).unwrap();
        assert_eq!(get(&p, "users").dependencies, old.foreign_keys);
    }

    #[test]
    fn test_recreate_replaces_table() {
        let mut p = processor();
        let rebuilt = TableInfo::new("users").column(ColumnInfo::new("id", DataType::BigInt));
        p.recreate_table(&users(), &rebuilt).unwrap();
        assert_eq!(get(&p, "users"), &rebuilt);
    }
}

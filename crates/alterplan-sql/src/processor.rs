//! Statement-collecting processor.

use alterplan_core::{AlterProcessor, ColumnInfo, ConstraintInfo, Result, TableInfo};
use tracing::{debug, trace};

use crate::dialect::{paired_columns, SqlDialect};

/// Renders every operation it receives as SQL and keeps the statements in
/// order.
#[derive(Debug)]
pub struct SqlAlterProcessor<D> {
    dialect: D,
    statements: Vec<String>,
}

impl<D: SqlDialect> SqlAlterProcessor<D> {
    /// Creates a processor for `dialect`.
    #[must_use]
    pub const fn new(dialect: D) -> Self {
        Self {
            dialect,
            statements: Vec::new(),
        }
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Returns the statements rendered so far.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Consumes the processor, returning the rendered statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }

    /// Returns the statements as one script, each terminated by `;`.
    #[must_use]
    pub fn script(&self) -> String {
        self.statements.iter().map(|s| format!("{s};\n")).collect()
    }

    fn emit(&mut self, sql: impl IntoIterator<Item = String>) {
        for statement in sql {
            trace!(dialect = self.dialect.name(), sql = %statement, "Rendered statement");
            self.statements.push(statement);
        }
    }
}

impl<D: SqlDialect> AlterProcessor for SqlAlterProcessor<D> {
    fn create_table(&mut self, table: &TableInfo) -> Result<()> {
        let mut sql = vec![self.dialect.create_table(table)?];
        sql.extend(table.indexes.iter().map(|ix| self.dialect.create_index(ix)));
        self.emit(sql);
        Ok(())
    }

    fn drop_table(&mut self, table: &TableInfo) -> Result<()> {
        let sql = self.dialect.drop_table(table);
        self.emit([sql]);
        Ok(())
    }

    fn rename_table(&mut self, table: &TableInfo, new_name: &str) -> Result<()> {
        let sql = self.dialect.rename_table(table, new_name);
        self.emit([sql]);
        Ok(())
    }

    fn create_column(&mut self, column: &ColumnInfo, constraints: &[ConstraintInfo]) -> Result<()> {
        let mut sql = vec![self.dialect.add_column(column)];
        for constraint in constraints {
            sql.extend(self.dialect.create_constraint(constraint)?);
        }
        self.emit(sql);
        Ok(())
    }

    fn change_column(&mut self, old_column: &ColumnInfo, new_column: &ColumnInfo) -> Result<()> {
        let sql = self.dialect.change_column(old_column, new_column)?;
        self.emit(sql);
        Ok(())
    }

    fn rename_column(&mut self, column: &ColumnInfo, new_name: &str) -> Result<()> {
        let sql = self.dialect.rename_column(column, new_name);
        self.emit([sql]);
        Ok(())
    }

    fn drop_column(&mut self, column: &ColumnInfo) -> Result<()> {
        let sql = self.dialect.drop_column(column);
        self.emit([sql]);
        Ok(())
    }

    fn create_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()> {
        let sql = self.dialect.create_constraint(constraint)?;
        self.emit(sql);
        Ok(())
    }

    fn change_constraint(
        &mut self,
        old_constraint: &ConstraintInfo,
        new_constraint: &ConstraintInfo,
    ) -> Result<()> {
        let mut sql = self.dialect.drop_constraint(old_constraint)?;
        sql.extend(self.dialect.create_constraint(new_constraint)?);
        self.emit(sql);
        Ok(())
    }

    fn rename_constraint(&mut self, constraint: &ConstraintInfo, new_name: &str) -> Result<()> {
        let sql = self.dialect.rename_constraint(constraint, new_name)?;
        self.emit(sql);
        Ok(())
    }

    fn drop_constraint(&mut self, constraint: &ConstraintInfo) -> Result<()> {
        let sql = self.dialect.drop_constraint(constraint)?;
        self.emit(sql);
        Ok(())
    }

    /// Creates the new table under a staging name, copies the paired
    /// columns, drops the old table, renames the staging table into place
    /// and recreates the indexes.
    ///
    /// The old table keeps its name until it is dropped, so foreign keys of
    /// other tables never get rewritten to point at a temporary name.
    fn recreate_table(&mut self, old_table: &TableInfo, new_table: &TableInfo) -> Result<()> {
        let mut staging = new_table.clone();
        staging.name.pure_name = self.dialect.rebuild_temp_name(&new_table.name);
        let pairs = paired_columns(old_table, new_table);
        debug!(
            dialect = self.dialect.name(),
            table = %old_table.name,
            staging = %staging.name,
            copied_columns = pairs.len(),
            "Rebuilding table"
        );

        let mut sql = vec![self.dialect.create_table(&staging)?];
        if !pairs.is_empty() {
            let targets: Vec<&str> = pairs
                .iter()
                .map(|(_, new)| new.column_name.as_str())
                .collect();
            let sources: Vec<&str> = pairs
                .iter()
                .map(|(old, _)| old.column_name.as_str())
                .collect();
            sql.push(format!(
                "INSERT INTO {} ({}) SELECT {} FROM {}",
                self.dialect.table_name(&staging.name),
                self.dialect.column_list(&targets),
                self.dialect.column_list(&sources),
                self.dialect.table_name(&old_table.name)
            ));
        }
        sql.push(self.dialect.drop_table(old_table));
        sql.push(self.dialect.rename_table(&staging, &new_table.name.pure_name));
        sql.extend(new_table.indexes.iter().map(|ix| self.dialect.create_index(ix)));

        self.emit(sql);
        Ok(())
    }
}

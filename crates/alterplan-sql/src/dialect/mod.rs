//! Dialect-specific DDL rendering.
//!
//! A dialect renders each alteration as one or more SQL statements and
//! publishes the capabilities the planner needs to keep plans within what
//! it can render.

mod postgres;
mod sqlite;

pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use alterplan_core::{
    AlterError, ColumnInfo, ConstraintInfo, ConstraintKind, DataType, DefaultValue,
    DialectCapabilities, Result, TableInfo, TableName,
};

/// Trait for dialect-specific DDL generation.
pub trait SqlDialect {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns what the planner may hand to this dialect directly.
    fn capabilities(&self) -> DialectCapabilities;

    /// Returns the SQL type name for the given type.
    fn type_name(&self, data_type: &DataType) -> String;

    /// Quotes an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quotes a possibly schema-qualified table name.
    fn table_name(&self, name: &TableName) -> String {
        match &name.schema_name {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&name.pure_name)
            ),
            None => self.quote_identifier(&name.pure_name),
        }
    }

    /// Renders a default value.
    fn render_default(&self, default: &DefaultValue) -> String {
        default.to_sql()
    }

    /// Builds the error for an operation this dialect cannot render.
    fn unsupported(&self, operation: &str) -> AlterError {
        AlterError::UnsupportedOperation {
            dialect: self.name(),
            operation: operation.to_string(),
        }
    }

    /// Generates column definition SQL.
    fn column_definition(&self, column: &ColumnInfo) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(&column.column_name),
            self.type_name(&column.data_type)
        );
        if column.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(ref default) = column.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.render_default(default));
        }
        sql
    }

    /// Generates a column definition inside `CREATE TABLE`.
    fn table_column_definition(&self, _table: &TableInfo, column: &ColumnInfo) -> String {
        self.column_definition(column)
    }

    /// Returns whether the primary key is declared on its column instead of
    /// as a table constraint.
    fn primary_key_is_inline(&self, _table: &TableInfo) -> bool {
        false
    }

    /// Returns the quoted, comma separated constrained columns.
    fn column_list(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generates a table-level constraint clause.
    fn table_constraint(&self, constraint: &ConstraintInfo) -> Result<String> {
        let name = self.quote_identifier(&constraint.constraint_name);
        let columns = self.column_list(&constraint.column_names().collect::<Vec<_>>());
        let sql = match &constraint.constraint_type {
            ConstraintKind::PrimaryKey => format!("CONSTRAINT {name} PRIMARY KEY ({columns})"),
            ConstraintKind::Unique => format!("CONSTRAINT {name} UNIQUE ({columns})"),
            ConstraintKind::Check => format!(
                "CONSTRAINT {name} CHECK ({})",
                constraint.definition.as_deref().unwrap_or_default()
            ),
            ConstraintKind::ForeignKey => {
                let ref_table = constraint.ref_table.as_ref().ok_or_else(|| {
                    AlterError::Processor(format!(
                        "Foreign key '{}' has no referenced table",
                        constraint.constraint_name
                    ))
                })?;
                let ref_columns: Vec<&str> = constraint
                    .columns
                    .iter()
                    .filter_map(|c| c.ref_column_name.as_deref())
                    .collect();
                let ref_columns = self.column_list(&ref_columns);
                let mut sql = format!(
                    "CONSTRAINT {name} FOREIGN KEY ({columns}) REFERENCES {} ({ref_columns})",
                    self.table_name(ref_table)
                );
                if let Some(action) = constraint.on_delete {
                    sql.push_str(" ON DELETE ");
                    sql.push_str(action.to_sql());
                }
                if let Some(action) = constraint.on_update {
                    sql.push_str(" ON UPDATE ");
                    sql.push_str(action.to_sql());
                }
                sql
            }
            ConstraintKind::Index => return Err(self.unsupported("inline index")),
            ConstraintKind::Other(kind) => {
                return Err(AlterError::UnsupportedConstraintKind(kind.clone()));
            }
        };
        Ok(sql)
    }

    /// Generates SQL for CREATE TABLE.
    fn create_table(&self, table: &TableInfo) -> Result<String> {
        let mut defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("    {}", self.table_column_definition(table, c)))
            .collect();

        let primary_key = table
            .primary_key
            .iter()
            .filter(|_| !self.primary_key_is_inline(table));
        let constraints = primary_key
            .chain(&table.foreign_keys)
            .chain(&table.uniques)
            .chain(&table.checks);
        for constraint in constraints {
            defs.push(format!("    {}", self.table_constraint(constraint)?));
        }

        Ok(format!(
            "CREATE TABLE {} (\n{}\n)",
            self.table_name(&table.name),
            defs.join(",\n")
        ))
    }

    /// Generates SQL for DROP TABLE.
    fn drop_table(&self, table: &TableInfo) -> String {
        format!("DROP TABLE {}", self.table_name(&table.name))
    }

    /// Generates SQL for renaming a table.
    fn rename_table(&self, table: &TableInfo, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.table_name(&table.name),
            self.quote_identifier(new_name)
        )
    }

    /// Generates SQL for ADD COLUMN.
    fn add_column(&self, column: &ColumnInfo) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.table_name(&column.table),
            self.column_definition(column)
        )
    }

    /// Generates SQL for DROP COLUMN.
    fn drop_column(&self, column: &ColumnInfo) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.table_name(&column.table),
            self.quote_identifier(&column.column_name)
        )
    }

    /// Generates SQL for RENAME COLUMN.
    fn rename_column(&self, column: &ColumnInfo, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.table_name(&column.table),
            self.quote_identifier(&column.column_name),
            self.quote_identifier(new_name)
        )
    }

    /// Generates SQL changing a column in place.
    fn change_column(
        &self,
        _old_column: &ColumnInfo,
        _new_column: &ColumnInfo,
    ) -> Result<Vec<String>> {
        Err(self.unsupported("changeColumn"))
    }

    /// Generates SQL for CREATE INDEX.
    fn create_index(&self, index: &ConstraintInfo) -> String {
        let mut sql = format!(
            "CREATE INDEX {} ON {} ({})",
            self.quote_identifier(&index.constraint_name),
            self.table_name(&index.table),
            self.column_list(&index.column_names().collect::<Vec<_>>())
        );
        if let Some(ref condition) = index.definition {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        sql
    }

    /// Generates SQL for DROP INDEX.
    fn drop_index(&self, index: &ConstraintInfo) -> String {
        let name = match &index.table.schema_name {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&index.constraint_name)
            ),
            None => self.quote_identifier(&index.constraint_name),
        };
        format!("DROP INDEX {name}")
    }

    /// Generates SQL adding a constraint or index to an existing table.
    fn create_constraint(&self, constraint: &ConstraintInfo) -> Result<Vec<String>> {
        if constraint.constraint_type == ConstraintKind::Index {
            return Ok(vec![self.create_index(constraint)]);
        }
        Ok(vec![format!(
            "ALTER TABLE {} ADD {}",
            self.table_name(&constraint.table),
            self.table_constraint(constraint)?
        )])
    }

    /// Generates SQL removing a constraint or index.
    fn drop_constraint(&self, constraint: &ConstraintInfo) -> Result<Vec<String>> {
        match &constraint.constraint_type {
            ConstraintKind::Index => Ok(vec![self.drop_index(constraint)]),
            ConstraintKind::Other(kind) => Err(AlterError::UnsupportedConstraintKind(kind.clone())),
            _ => Ok(vec![format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.table_name(&constraint.table),
                self.quote_identifier(&constraint.constraint_name)
            )]),
        }
    }

    /// Generates SQL renaming a constraint or index.
    fn rename_constraint(&self, constraint: &ConstraintInfo, new_name: &str) -> Result<Vec<String>>;

    /// Name a rebuilt table is created under before it replaces `table`.
    fn rebuild_temp_name(&self, table: &TableName) -> String {
        format!("_{}_new", table.pure_name)
    }
}

/// Pairs each column of `new_table` with its source column in `old_table`.
///
/// Columns are matched by pairing id when both carry one, otherwise by
/// name. Columns without a source are left out of the copy.
pub fn paired_columns<'a>(
    old_table: &'a TableInfo,
    new_table: &'a TableInfo,
) -> Vec<(&'a ColumnInfo, &'a ColumnInfo)> {
    new_table
        .columns
        .iter()
        .filter_map(|new| {
            let by_pairing = new.pairing_id.as_ref().and_then(|id| {
                old_table
                    .columns
                    .iter()
                    .find(|old| old.pairing_id.as_ref() == Some(id))
            });
            by_pairing
                .or_else(|| old_table.get_column(&new.column_name))
                .map(|old| (old, new))
        })
        .collect()
}

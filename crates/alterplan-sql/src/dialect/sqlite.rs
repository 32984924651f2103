//! SQLite dialect.
//!
//! SQLite has limited ALTER TABLE support: it can add, drop and rename
//! columns and manage indexes, but keys, uniques and checks only exist as
//! part of `CREATE TABLE`. Everything else goes through a table rebuild.

use alterplan_core::{
    Capability, ColumnInfo, ConstraintInfo, ConstraintKind, DataType, DependencyKind,
    DependencyPolicy, DialectCapabilities, Result, TableInfo,
};

use super::SqlDialect;

/// SQLite DDL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn inline_primary_key_column<'a>(&self, table: &'a TableInfo) -> Option<&'a ColumnInfo> {
        let pk = table.primary_key.as_ref()?;
        let [only] = pk.columns.as_slice() else {
            return None;
        };
        table.get_column(&only.column_name).filter(|c| {
            c.auto_increment
                && matches!(
                    c.data_type,
                    DataType::Integer | DataType::BigInt | DataType::SmallInt
                )
        })
    }
}

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn capabilities(&self) -> DialectCapabilities {
        DialectCapabilities {
            // ADD COLUMN cannot fill existing rows of a NOT NULL column
            create_column: Capability::when(|c: &ColumnInfo| {
                (!c.not_null || c.default_value.is_some()) && !c.auto_increment
            }),
            change_column: Capability::unsupported(),
            create_primary_key: Capability::unsupported(),
            create_foreign_key: Capability::unsupported(),
            create_unique: Capability::unsupported(),
            create_check: Capability::unsupported(),
            drop_primary_key: Capability::unsupported(),
            drop_foreign_key: Capability::unsupported(),
            drop_unique: Capability::unsupported(),
            drop_check: Capability::unsupported(),
            drop_column_dependencies: DependencyPolicy::of(&[
                DependencyKind::PrimaryKey,
                DependencyKind::ForeignKeys,
                DependencyKind::Indexes,
                DependencyKind::Uniques,
            ]),
            change_column_dependencies: DependencyPolicy::of(&[
                DependencyKind::PrimaryKey,
                DependencyKind::Indexes,
                DependencyKind::Uniques,
            ]),
            ..DialectCapabilities::default()
        }
    }

    fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Integer | DataType::SmallInt | DataType::BigInt | DataType::Boolean => {
                "INTEGER".to_string()
            }
            DataType::Text
            | DataType::Varchar(_)
            | DataType::Char(_)
            | DataType::Date
            | DataType::Time
            | DataType::Timestamp
            | DataType::Json
            | DataType::Uuid => "TEXT".to_string(),
            DataType::Real | DataType::Double => "REAL".to_string(),
            DataType::Decimal(_, _) => "NUMERIC".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Custom(name) => name.clone(),
        }
    }

    fn table_column_definition(&self, table: &TableInfo, column: &ColumnInfo) -> String {
        let inline = self
            .inline_primary_key_column(table)
            .is_some_and(|pk| pk.column_name == column.column_name);
        if inline {
            format!(
                "{} INTEGER PRIMARY KEY AUTOINCREMENT",
                self.quote_identifier(&column.column_name)
            )
        } else {
            self.column_definition(column)
        }
    }

    fn primary_key_is_inline(&self, table: &TableInfo) -> bool {
        self.inline_primary_key_column(table).is_some()
    }

    fn create_constraint(&self, constraint: &ConstraintInfo) -> Result<Vec<String>> {
        match constraint.constraint_type {
            ConstraintKind::Index => Ok(vec![self.create_index(constraint)]),
            _ => Err(self.unsupported(&format!("create {}", constraint.constraint_type))),
        }
    }

    fn drop_constraint(&self, constraint: &ConstraintInfo) -> Result<Vec<String>> {
        match constraint.constraint_type {
            ConstraintKind::Index => Ok(vec![self.drop_index(constraint)]),
            _ => Err(self.unsupported(&format!("drop {}", constraint.constraint_type))),
        }
    }

    fn rename_constraint(
        &self,
        constraint: &ConstraintInfo,
        new_name: &str,
    ) -> Result<Vec<String>> {
        // No ALTER INDEX; an index is renamed by recreating it
        if constraint.constraint_type != ConstraintKind::Index {
            return Err(self.unsupported(&format!("rename {}", constraint.constraint_type)));
        }
        let mut renamed = constraint.clone();
        renamed.constraint_name = new_name.to_string();
        Ok(vec![self.drop_index(constraint), self.create_index(&renamed)])
    }
}

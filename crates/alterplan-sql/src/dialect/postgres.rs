//! PostgreSQL dialect.

use alterplan_core::{
    ColumnInfo, ConstraintInfo, ConstraintKind, DataType, DefaultValue, DependencyKind,
    DependencyPolicy, DialectCapabilities, Result,
};

use super::SqlDialect;

/// PostgreSQL DDL dialect. Every alteration is available in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn capabilities(&self) -> DialectCapabilities {
        DialectCapabilities {
            drop_column_dependencies: DependencyPolicy::of(&[DependencyKind::Dependencies]),
            change_column_dependencies: DependencyPolicy::of(&[DependencyKind::Dependencies]),
            ..DialectCapabilities::default()
        }
    }

    fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::SmallInt => "SMALLINT".to_string(),
            DataType::Integer => "INTEGER".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::Real => "REAL".to_string(),
            DataType::Double => "DOUBLE PRECISION".to_string(),
            DataType::Decimal(p, s) => format!("DECIMAL({p}, {s})"),
            DataType::Char(n) => format!("CHAR({n})"),
            DataType::Varchar(n) => format!("VARCHAR({n})"),
            DataType::Text => "TEXT".to_string(),
            DataType::Blob => "BYTEA".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Time => "TIME".to_string(),
            DataType::Timestamp => "TIMESTAMP".to_string(),
            DataType::Boolean => "BOOLEAN".to_string(),
            DataType::Json => "JSONB".to_string(),
            DataType::Uuid => "UUID".to_string(),
            DataType::Custom(name) => name.clone(),
        }
    }

    fn render_default(&self, default: &DefaultValue) -> String {
        match default {
            DefaultValue::Bool(true) => "TRUE".to_string(),
            DefaultValue::Bool(false) => "FALSE".to_string(),
            _ => default.to_sql(),
        }
    }

    fn column_definition(&self, column: &ColumnInfo) -> String {
        // PostgreSQL uses SERIAL/BIGSERIAL for auto-increment
        let data_type = if column.auto_increment {
            match column.data_type {
                DataType::Integer | DataType::SmallInt => "SERIAL".to_string(),
                DataType::BigInt => "BIGSERIAL".to_string(),
                _ => self.type_name(&column.data_type),
            }
        } else {
            self.type_name(&column.data_type)
        };

        let mut sql = format!("{} {}", self.quote_identifier(&column.column_name), data_type);
        if column.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(ref default) = column.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.render_default(default));
        }
        sql
    }

    fn change_column(
        &self,
        old_column: &ColumnInfo,
        new_column: &ColumnInfo,
    ) -> Result<Vec<String>> {
        let table = self.table_name(&old_column.table);
        let mut column = self.quote_identifier(&old_column.column_name);
        let mut sql = Vec::new();

        if old_column.column_name != new_column.column_name {
            sql.push(self.rename_column(old_column, &new_column.column_name));
            column = self.quote_identifier(&new_column.column_name);
        }
        if old_column.data_type != new_column.data_type {
            sql.push(format!(
                "ALTER TABLE {table} ALTER COLUMN {column} TYPE {}",
                self.type_name(&new_column.data_type)
            ));
        }
        if old_column.not_null != new_column.not_null {
            let action = if new_column.not_null { "SET" } else { "DROP" };
            sql.push(format!("ALTER TABLE {table} ALTER COLUMN {column} {action} NOT NULL"));
        }
        if old_column.default_value != new_column.default_value {
            sql.push(match &new_column.default_value {
                Some(default) => format!(
                    "ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {}",
                    self.render_default(default)
                ),
                None => format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT"),
            });
        }
        Ok(sql)
    }

    fn rename_constraint(
        &self,
        constraint: &ConstraintInfo,
        new_name: &str,
    ) -> Result<Vec<String>> {
        let sql = if constraint.constraint_type == ConstraintKind::Index {
            format!(
                "ALTER INDEX {} RENAME TO {}",
                self.quote_identifier(&constraint.constraint_name),
                self.quote_identifier(new_name)
            )
        } else {
            format!(
                "ALTER TABLE {} RENAME CONSTRAINT {} TO {}",
                self.table_name(&constraint.table),
                self.quote_identifier(&constraint.constraint_name),
                self.quote_identifier(new_name)
            )
        };
        Ok(vec![sql])
    }
}

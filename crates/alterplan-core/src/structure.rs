//! Structure representation types.
//!
//! These types describe tables, columns and constraints of a database as
//! supplied by an introspection or diff component. Every column and
//! constraint carries the identity of the table that owns it, so an
//! operation on a single object can always be traced back to its table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AlterError, Result};

/// Schema-qualified table identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableName {
    /// Schema name, `None` for the default schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Table name without schema.
    pub pure_name: String,
}

impl TableName {
    /// Creates a table name in the default schema.
    #[must_use]
    pub fn new(pure_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            pure_name: pure_name.into(),
        }
    }

    /// Creates a schema-qualified table name.
    #[must_use]
    pub fn with_schema(schema_name: impl Into<String>, pure_name: impl Into<String>) -> Self {
        Self {
            schema_name: Some(schema_name.into()),
            pure_name: pure_name.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema_name {
            Some(schema) => write!(f, "{}.{}", schema, self.pure_name),
            None => f.write_str(&self.pure_name),
        }
    }
}

impl From<&str> for TableName {
    fn from(pure_name: &str) -> Self {
        Self::new(pure_name)
    }
}

impl From<String> for TableName {
    fn from(pure_name: String) -> Self {
        Self::new(pure_name)
    }
}

/// Column data types.
///
/// Serialized as the type string an introspection provider reports, such as
/// `"integer"`, `"varchar(40)"` or `"decimal(10,2)"`. Names the planner does
/// not know become [`DataType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Unbounded text.
    Text,
    /// Variable-length character string.
    Varchar(usize),
    /// Fixed-length character string.
    Char(usize),
    /// Boolean.
    Boolean,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Floating point (single precision).
    Real,
    /// Floating point (double precision).
    Double,
    /// Decimal with precision and scale.
    Decimal(u8, u8),
    /// Binary large object.
    Blob,
    /// JSON document.
    Json,
    /// UUID.
    Uuid,
    /// Engine-specific type, rendered verbatim.
    Custom(String),
}

impl DataType {
    fn parse_sized(name: &str) -> Option<Self> {
        let (base, args) = name.strip_suffix(')')?.split_once('(')?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();
        match (base.trim(), args.as_slice()) {
            ("varchar" | "character varying" | "nvarchar", [len]) => {
                len.parse().ok().map(Self::Varchar)
            }
            ("char" | "character" | "nchar", [len]) => len.parse().ok().map(Self::Char),
            ("decimal" | "numeric", [precision, scale]) => {
                Some(Self::Decimal(precision.parse().ok()?, scale.parse().ok()?))
            }
            _ => None,
        }
    }
}

impl From<String> for DataType {
    fn from(name: String) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        let known = match lower.as_str() {
            "integer" | "int" | "int4" => Some(Self::Integer),
            "bigint" | "int8" => Some(Self::BigInt),
            "smallint" | "int2" => Some(Self::SmallInt),
            "text" => Some(Self::Text),
            "boolean" | "bool" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "timestamp" | "datetime" => Some(Self::Timestamp),
            "real" | "float4" => Some(Self::Real),
            "double" | "double precision" | "float8" => Some(Self::Double),
            "blob" | "bytea" => Some(Self::Blob),
            "json" => Some(Self::Json),
            "uuid" => Some(Self::Uuid),
            other => Self::parse_sized(other),
        };
        known.unwrap_or(Self::Custom(name))
    }
}

impl From<&str> for DataType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::BigInt => f.write_str("bigint"),
            Self::SmallInt => f.write_str("smallint"),
            Self::Text => f.write_str("text"),
            Self::Varchar(len) => write!(f, "varchar({len})"),
            Self::Char(len) => write!(f, "char({len})"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::Time => f.write_str("time"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Real => f.write_str("real"),
            Self::Double => f.write_str("double"),
            Self::Decimal(precision, scale) => write!(f, "decimal({precision},{scale})"),
            Self::Blob => f.write_str("blob"),
            Self::Json => f.write_str("json"),
            Self::Uuid => f.write_str("uuid"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// SQL expression (e.g., "CURRENT_TIMESTAMP").
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ForeignKeyAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Owning table.
    #[serde(flatten)]
    pub table: TableName,
    /// Column name.
    pub column_name: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether the column rejects NULL values.
    #[serde(default)]
    pub not_null: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    /// Whether this column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
    /// Identity that is kept across renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_id: Option<String>,
}

impl ColumnInfo {
    /// Creates a nullable column. The owning table is set when the column is
    /// added to a [`TableInfo`] or through [`ColumnInfo::in_table`].
    #[must_use]
    pub fn new(column_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            table: TableName::default(),
            column_name: column_name.into(),
            data_type,
            not_null: false,
            default_value: None,
            auto_increment: false,
            pairing_id: None,
        }
    }

    /// Sets the owning table.
    #[must_use]
    pub fn in_table(mut self, table: impl Into<TableName>) -> Self {
        self.table = table.into();
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the pairing id.
    #[must_use]
    pub fn pairing_id(mut self, id: impl Into<String>) -> Self {
        self.pairing_id = Some(id.into());
        self
    }

    /// Sets the data type.
    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

/// A column participating in a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReference {
    /// Column of the owning table.
    pub column_name: String,
    /// Referenced column, for foreign keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_column_name: Option<String>,
}

impl ColumnReference {
    /// Creates a reference to a column of the owning table.
    #[must_use]
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            ref_column_name: None,
        }
    }
}

/// Kind of a table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConstraintKind {
    /// Primary key.
    PrimaryKey,
    /// Foreign key.
    ForeignKey,
    /// Index (unique or not).
    Index,
    /// Unique constraint.
    Unique,
    /// Check constraint.
    Check,
    /// Any kind reported by an engine that the planner does not know.
    Other(String),
}

impl ConstraintKind {
    /// Returns the camelCase name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PrimaryKey => "primaryKey",
            Self::ForeignKey => "foreignKey",
            Self::Index => "index",
            Self::Unique => "unique",
            Self::Check => "check",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ConstraintKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "primaryKey" => Self::PrimaryKey,
            "foreignKey" => Self::ForeignKey,
            "index" => Self::Index,
            "unique" => Self::Unique,
            "check" => Self::Check,
            _ => Self::Other(name),
        }
    }
}

impl From<ConstraintKind> for String {
    fn from(kind: ConstraintKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint or index of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintInfo {
    /// Owning table.
    #[serde(flatten)]
    pub table: TableName,
    /// Constraint name.
    pub constraint_name: String,
    /// Constraint kind.
    pub constraint_type: ConstraintKind,
    /// Participating columns, in order.
    #[serde(default)]
    pub columns: Vec<ColumnReference>,
    /// Referenced table, for foreign keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_table: Option<TableName>,
    /// ON DELETE action, for foreign keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action, for foreign keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
    /// Check expression, or the condition of a partial index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl ConstraintInfo {
    /// Creates a constraint of the given kind over `columns`.
    #[must_use]
    pub fn new(
        constraint_type: ConstraintKind,
        constraint_name: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        Self {
            table: TableName::default(),
            constraint_name: constraint_name.into(),
            constraint_type,
            columns: columns.iter().map(|c| ColumnReference::new(*c)).collect(),
            ref_table: None,
            on_delete: None,
            on_update: None,
            definition: None,
        }
    }

    /// Creates a primary key.
    #[must_use]
    pub fn primary_key(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(ConstraintKind::PrimaryKey, name, columns)
    }

    /// Creates a foreign key; `columns` and `ref_columns` are paired by position.
    #[must_use]
    pub fn foreign_key(
        name: impl Into<String>,
        columns: &[&str],
        ref_table: impl Into<TableName>,
        ref_columns: &[&str],
    ) -> Self {
        let mut fk = Self::new(ConstraintKind::ForeignKey, name, columns);
        for (column, ref_column) in fk.columns.iter_mut().zip(ref_columns) {
            column.ref_column_name = Some((*ref_column).to_string());
        }
        fk.ref_table = Some(ref_table.into());
        fk
    }

    /// Creates an index.
    #[must_use]
    pub fn index(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(ConstraintKind::Index, name, columns)
    }

    /// Creates a unique constraint.
    #[must_use]
    pub fn unique(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(ConstraintKind::Unique, name, columns)
    }

    /// Creates a check constraint.
    #[must_use]
    pub fn check(name: impl Into<String>, expression: impl Into<String>) -> Self {
        let mut check = Self::new(ConstraintKind::Check, name, &[]);
        check.definition = Some(expression.into());
        check
    }

    /// Sets the owning table.
    #[must_use]
    pub fn in_table(mut self, table: impl Into<TableName>) -> Self {
        self.table = table.into();
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the partial index condition.
    #[must_use]
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.definition = Some(condition.into());
        self
    }

    /// Returns whether `column` is one of the constrained columns.
    #[must_use]
    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.column_name == column)
    }

    /// Returns whether this foreign key points at `column` of the referenced table.
    #[must_use]
    pub fn references_column(&self, column: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.ref_column_name.as_deref() == Some(column))
    }

    /// Returns the constrained column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.column_name.as_str())
    }
}

/// A table with its columns, constraints and incoming foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    /// Table identity.
    #[serde(flatten)]
    pub name: TableName,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    /// Primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<ConstraintInfo>,
    /// Foreign keys declared on this table.
    #[serde(default)]
    pub foreign_keys: Vec<ConstraintInfo>,
    /// Indexes.
    #[serde(default)]
    pub indexes: Vec<ConstraintInfo>,
    /// Unique constraints.
    #[serde(default)]
    pub uniques: Vec<ConstraintInfo>,
    /// Check constraints.
    #[serde(default)]
    pub checks: Vec<ConstraintInfo>,
    /// Foreign keys of other tables referencing this table.
    #[serde(default)]
    pub dependencies: Vec<ConstraintInfo>,
}

impl TableInfo {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<TableName>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            uniques: Vec::new(),
            checks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Adds a column owned by this table.
    #[must_use]
    pub fn column(mut self, column: ColumnInfo) -> Self {
        self.columns.push(column.in_table(self.name.clone()));
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, pk: ConstraintInfo) -> Self {
        self.primary_key = Some(pk.in_table(self.name.clone()));
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ConstraintInfo) -> Self {
        self.foreign_keys.push(fk.in_table(self.name.clone()));
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: ConstraintInfo) -> Self {
        self.indexes.push(index.in_table(self.name.clone()));
        self
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique(mut self, unique: ConstraintInfo) -> Self {
        self.uniques.push(unique.in_table(self.name.clone()));
        self
    }

    /// Adds a check constraint.
    #[must_use]
    pub fn check(mut self, check: ConstraintInfo) -> Self {
        self.checks.push(check.in_table(self.name.clone()));
        self
    }

    /// Records a foreign key of another table that references this one.
    #[must_use]
    pub fn dependency(mut self, fk: ConstraintInfo) -> Self {
        self.dependencies.push(fk);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    /// Gets a mutable column by name.
    #[must_use]
    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut ColumnInfo> {
        self.columns.iter_mut().find(|c| c.column_name == name)
    }

    /// Gets a column by name, failing if it is missing.
    pub fn require_column(&self, name: &str) -> Result<&ColumnInfo> {
        self.get_column(name)
            .ok_or_else(|| AlterError::ColumnNotFound {
                table: self.name.to_string(),
                column: name.to_string(),
            })
    }

    /// Iterates over the table's own constraints: primary key, foreign keys,
    /// indexes, uniques, checks.
    pub fn constraints(&self) -> impl Iterator<Item = &ConstraintInfo> {
        self.primary_key
            .iter()
            .chain(&self.foreign_keys)
            .chain(&self.indexes)
            .chain(&self.uniques)
            .chain(&self.checks)
    }

    /// Gets one of the table's own constraints by name.
    #[must_use]
    pub fn get_constraint(&self, name: &str) -> Option<&ConstraintInfo> {
        self.constraints().find(|c| c.constraint_name == name)
    }

    /// Adds a constraint to the list matching its kind. A primary key
    /// replaces the existing one.
    pub fn add_constraint(&mut self, constraint: ConstraintInfo) -> Result<()> {
        match constraint.constraint_type {
            ConstraintKind::PrimaryKey => self.primary_key = Some(constraint),
            ConstraintKind::ForeignKey => self.foreign_keys.push(constraint),
            ConstraintKind::Index => self.indexes.push(constraint),
            ConstraintKind::Unique => self.uniques.push(constraint),
            ConstraintKind::Check => self.checks.push(constraint),
            ConstraintKind::Other(ref kind) => {
                return Err(AlterError::UnsupportedConstraintKind(kind.clone()));
            }
        }
        Ok(())
    }

    /// Removes a constraint by kind and name.
    pub fn remove_constraint(
        &mut self,
        kind: &ConstraintKind,
        name: &str,
    ) -> Result<ConstraintInfo> {
        let not_found = || AlterError::ConstraintNotFound {
            table: self.name.to_string(),
            constraint: name.to_string(),
        };
        let list = match kind {
            ConstraintKind::PrimaryKey => {
                let found = self
                    .primary_key
                    .as_ref()
                    .is_some_and(|pk| pk.constraint_name == name);
                return if found {
                    self.primary_key.take().ok_or_else(not_found)
                } else {
                    Err(not_found())
                };
            }
            ConstraintKind::ForeignKey => &mut self.foreign_keys,
            ConstraintKind::Index => &mut self.indexes,
            ConstraintKind::Unique => &mut self.uniques,
            ConstraintKind::Check => &mut self.checks,
            ConstraintKind::Other(kind) => {
                return Err(AlterError::UnsupportedConstraintKind(kind.clone()));
            }
        };
        let idx = list
            .iter()
            .position(|c| c.constraint_name == name)
            .ok_or_else(not_found)?;
        Ok(list.remove(idx))
    }

    /// Renames a column inside the column lists of the table's own constraints.
    pub fn rename_column_references(&mut self, old_name: &str, new_name: &str) {
        let constraints = self
            .primary_key
            .iter_mut()
            .chain(&mut self.foreign_keys)
            .chain(&mut self.indexes)
            .chain(&mut self.uniques)
            .chain(&mut self.checks);
        for constraint in constraints {
            for column in &mut constraint.columns {
                if column.column_name == old_name {
                    column.column_name = new_name.to_string();
                }
            }
        }
    }
}

/// The complete structure of a database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureDescriptor {
    /// All tables, in provider order.
    #[serde(default)]
    pub tables: Vec<TableInfo>,
}

impl StructureDescriptor {
    /// Creates an empty structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a structure holding a single table.
    #[must_use]
    pub fn single(table: TableInfo) -> Self {
        Self {
            tables: vec![table],
        }
    }

    /// Parses a structure from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds a table to the structure.
    #[must_use]
    pub fn table(mut self, table: TableInfo) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a table, failing if its identity is already taken.
    pub fn insert_table(&mut self, table: TableInfo) -> Result<()> {
        if self.get_table(&table.name).is_some() {
            return Err(AlterError::TableExists(table.name.to_string()));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Gets a table by identity.
    #[must_use]
    pub fn get_table(&self, name: &TableName) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == *name)
    }

    /// Gets a mutable table by identity.
    #[must_use]
    pub fn get_table_mut(&mut self, name: &TableName) -> Option<&mut TableInfo> {
        self.tables.iter_mut().find(|t| t.name == *name)
    }

    /// Gets a table by identity, failing if it is missing.
    pub fn require_table(&self, name: &TableName) -> Result<&TableInfo> {
        self.get_table(name).ok_or_else(|| AlterError::TableNotFound {
            table: name.to_string(),
        })
    }

    /// Gets a mutable table by identity, failing if it is missing.
    pub fn require_table_mut(&mut self, name: &TableName) -> Result<&mut TableInfo> {
        self.get_table_mut(name)
            .ok_or_else(|| AlterError::TableNotFound {
                table: name.to_string(),
            })
    }

    /// Removes a table by identity.
    pub fn remove_table(&mut self, name: &TableName) -> Result<TableInfo> {
        let idx = self
            .tables
            .iter()
            .position(|t| t.name == *name)
            .ok_or_else(|| AlterError::TableNotFound {
                table: name.to_string(),
            })?;
        Ok(self.tables.remove(idx))
    }

    /// Returns table identities in order.
    pub fn table_names(&self) -> impl Iterator<Item = &TableName> {
        self.tables.iter().map(|t| &t.name)
    }

    /// Rebuilds every table's `dependencies` from the foreign keys of all
    /// tables, in structure order.
    pub fn link_dependencies(&mut self) {
        let foreign_keys: Vec<ConstraintInfo> = self
            .tables
            .iter()
            .flat_map(|t| t.foreign_keys.iter().cloned())
            .collect();
        for table in &mut self.tables {
            table.dependencies = foreign_keys
                .iter()
                .filter(|fk| fk.ref_table.as_ref() == Some(&table.name))
                .cloned()
                .collect();
        }
    }

    /// Points foreign keys owned by or referencing `old` at `new`, including
    /// the copies kept in `dependencies`.
    pub fn rename_table_references(&mut self, old: &TableName, new: &TableName) {
        for fk in self.foreign_keys_mut() {
            if fk.table == *old {
                fk.table = new.clone();
            }
            if fk.ref_table.as_ref() == Some(old) {
                fk.ref_table = Some(new.clone());
            }
        }
    }

    /// Renames column `old` of `table` wherever a foreign key names it, on
    /// either side of the reference.
    pub fn rename_foreign_key_column(&mut self, table: &TableName, old: &str, new: &str) {
        for fk in self.foreign_keys_mut() {
            let owned = fk.table == *table;
            let referenced = fk.ref_table.as_ref() == Some(table);
            for column in &mut fk.columns {
                if owned && column.column_name == old {
                    column.column_name = new.to_string();
                }
                if referenced && column.ref_column_name.as_deref() == Some(old) {
                    column.ref_column_name = Some(new.to_string());
                }
            }
        }
    }

    /// Records `fk` on the table it references. Other constraint kinds and
    /// references to tables outside the structure are ignored.
    pub fn add_dependency(&mut self, fk: &ConstraintInfo) {
        if fk.constraint_type != ConstraintKind::ForeignKey {
            return;
        }
        self.remove_dependency(fk);
        let target = fk.ref_table.as_ref().and_then(|name| self.get_table_mut(name));
        if let Some(target) = target {
            target.dependencies.push(fk.clone());
        }
    }

    /// Forgets `fk` on the table it references.
    pub fn remove_dependency(&mut self, fk: &ConstraintInfo) {
        if fk.constraint_type != ConstraintKind::ForeignKey {
            return;
        }
        let Some(name) = fk.ref_table.as_ref() else {
            return;
        };
        if let Some(target) = self.get_table_mut(name) {
            target.dependencies.retain(|d| {
                d.table != fk.table || d.constraint_name != fk.constraint_name
            });
        }
    }

    /// Forgets every incoming foreign key owned by `table`.
    pub fn forget_dependencies_of(&mut self, table: &TableName) {
        for t in &mut self.tables {
            t.dependencies.retain(|d| d.table != *table);
        }
    }

    fn foreign_keys_mut(&mut self) -> impl Iterator<Item = &mut ConstraintInfo> {
        self.tables
            .iter_mut()
            .flat_map(|t| t.foreign_keys.iter_mut().chain(t.dependencies.iter_mut()))
    }
}

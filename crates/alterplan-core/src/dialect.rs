//! Dialect capabilities.
//!
//! A dialect describes which structural operations an engine can issue
//! directly. Anything it cannot issue is rebuilt by recreating the whole
//! table. Every capability is a predicate over the affected object; a plain
//! flag is the constant predicate.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AlterError, Result};
use crate::structure::{ColumnInfo, ConstraintInfo, ConstraintKind};

/// Predicate deciding whether an engine can handle an object directly.
pub struct Capability<T> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: 'static> Capability<T> {
    /// Always supported.
    #[must_use]
    pub fn supported() -> Self {
        Self::when(|_| true)
    }

    /// Never supported.
    #[must_use]
    pub fn unsupported() -> Self {
        Self::when(|_| false)
    }

    /// Supported whenever `predicate` holds for the affected object.
    #[must_use]
    pub fn when(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Returns whether the engine can handle `object` directly.
    #[must_use]
    pub fn allows(&self, object: &T) -> bool {
        (self.predicate)(object)
    }
}

impl<T> Clone for Capability<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T: 'static> Default for Capability<T> {
    fn default() -> Self {
        Self::supported()
    }
}

impl<T: 'static> From<bool> for Capability<T> {
    fn from(supported: bool) -> Self {
        if supported {
            Self::supported()
        } else {
            Self::unsupported()
        }
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability").finish_non_exhaustive()
    }
}

/// Category of objects that must be unwound around a column change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    /// The table's primary key.
    PrimaryKey,
    /// Foreign keys declared on the table.
    ForeignKeys,
    /// Indexes of the table.
    Indexes,
    /// Unique constraints of the table.
    Uniques,
    /// Foreign keys of other tables referencing the column.
    Dependencies,
}

/// Set of dependency categories selected by a dialect for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyPolicy(BTreeSet<DependencyKind>);

impl DependencyPolicy {
    /// Creates an empty policy.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a policy from a list of categories.
    #[must_use]
    pub fn of(kinds: &[DependencyKind]) -> Self {
        kinds.iter().copied().collect()
    }

    /// Returns whether `kind` is selected.
    #[must_use]
    pub fn includes(&self, kind: DependencyKind) -> bool {
        self.0.contains(&kind)
    }

    /// Returns whether no category is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DependencyKind> for DependencyPolicy {
    fn from_iter<I: IntoIterator<Item = DependencyKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What an engine can alter in place.
///
/// The default is a fully capable engine with empty dependency policies.
/// Individual fields are usually overridden with struct update syntax:
///
/// ```rust
/// use alterplan_core::dialect::{Capability, DialectCapabilities};
///
/// let dialect = DialectCapabilities {
///     change_column: false.into(),
///     create_column: Capability::when(|col: &alterplan_core::ColumnInfo| !col.not_null),
///     ..DialectCapabilities::default()
/// };
/// # let _ = dialect;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DialectCapabilities {
    /// ADD COLUMN, tested against the new column.
    pub create_column: Capability<ColumnInfo>,
    /// DROP COLUMN, tested against the dropped column.
    pub drop_column: Capability<ColumnInfo>,
    /// ALTER COLUMN, tested against the new column.
    pub change_column: Capability<ColumnInfo>,
    /// ADD PRIMARY KEY.
    pub create_primary_key: Capability<ConstraintInfo>,
    /// ADD FOREIGN KEY.
    pub create_foreign_key: Capability<ConstraintInfo>,
    /// CREATE INDEX.
    pub create_index: Capability<ConstraintInfo>,
    /// ADD UNIQUE.
    pub create_unique: Capability<ConstraintInfo>,
    /// ADD CHECK.
    pub create_check: Capability<ConstraintInfo>,
    /// DROP PRIMARY KEY.
    pub drop_primary_key: Capability<ConstraintInfo>,
    /// DROP FOREIGN KEY.
    pub drop_foreign_key: Capability<ConstraintInfo>,
    /// DROP INDEX.
    pub drop_index: Capability<ConstraintInfo>,
    /// DROP UNIQUE.
    pub drop_unique: Capability<ConstraintInfo>,
    /// DROP CHECK.
    pub drop_check: Capability<ConstraintInfo>,
    /// Objects unwound before a column is dropped.
    pub drop_column_dependencies: DependencyPolicy,
    /// Objects unwound around a column change.
    pub change_column_dependencies: DependencyPolicy,
}

impl DialectCapabilities {
    /// An engine that can only create and drop whole tables.
    #[must_use]
    pub fn none_supported() -> Self {
        DialectProfile::none_supported().into_capabilities()
    }

    /// Returns whether `constraint` can be created in place.
    pub fn can_create_constraint(&self, constraint: &ConstraintInfo) -> Result<bool> {
        let capability = match &constraint.constraint_type {
            ConstraintKind::PrimaryKey => &self.create_primary_key,
            ConstraintKind::ForeignKey => &self.create_foreign_key,
            ConstraintKind::Index => &self.create_index,
            ConstraintKind::Unique => &self.create_unique,
            ConstraintKind::Check => &self.create_check,
            ConstraintKind::Other(kind) => {
                return Err(AlterError::UnsupportedConstraintKind(kind.clone()));
            }
        };
        Ok(capability.allows(constraint))
    }

    /// Returns whether `constraint` can be dropped in place.
    pub fn can_drop_constraint(&self, constraint: &ConstraintInfo) -> Result<bool> {
        let capability = match &constraint.constraint_type {
            ConstraintKind::PrimaryKey => &self.drop_primary_key,
            ConstraintKind::ForeignKey => &self.drop_foreign_key,
            ConstraintKind::Index => &self.drop_index,
            ConstraintKind::Unique => &self.drop_unique,
            ConstraintKind::Check => &self.drop_check,
            ConstraintKind::Other(kind) => {
                return Err(AlterError::UnsupportedConstraintKind(kind.clone()));
            }
        };
        Ok(capability.allows(constraint))
    }
}

/// Flag-only capability description, loadable from JSON.
///
/// Missing flags default to `true` and missing policies to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialectProfile {
    /// `ADD COLUMN` works in place.
    pub create_column: bool,
    /// `DROP COLUMN` works in place.
    pub drop_column: bool,
    /// Column definitions can be altered in place.
    pub change_column: bool,
    /// A primary key can be added to an existing table.
    pub create_primary_key: bool,
    /// A foreign key can be added to an existing table.
    pub create_foreign_key: bool,
    /// `CREATE INDEX` works on an existing table.
    pub create_index: bool,
    /// A unique constraint can be added to an existing table.
    pub create_unique: bool,
    /// A check constraint can be added to an existing table.
    pub create_check: bool,
    /// The primary key can be dropped in place.
    pub drop_primary_key: bool,
    /// Foreign keys can be dropped in place.
    pub drop_foreign_key: bool,
    /// Indexes can be dropped in place.
    pub drop_index: bool,
    /// Unique constraints can be dropped in place.
    pub drop_unique: bool,
    /// Check constraints can be dropped in place.
    pub drop_check: bool,
    /// Constraints dropped ahead of a column drop.
    pub drop_column_dependencies: DependencyPolicy,
    /// Constraints dropped ahead of a column change and recreated after it.
    pub change_column_dependencies: DependencyPolicy,
}

impl Default for DialectProfile {
    fn default() -> Self {
        Self::with_all(true)
    }
}

impl DialectProfile {
    fn with_all(flag: bool) -> Self {
        Self {
            create_column: flag,
            drop_column: flag,
            change_column: flag,
            create_primary_key: flag,
            create_foreign_key: flag,
            create_index: flag,
            create_unique: flag,
            create_check: flag,
            drop_primary_key: flag,
            drop_foreign_key: flag,
            drop_index: flag,
            drop_unique: flag,
            drop_check: flag,
            drop_column_dependencies: DependencyPolicy::none(),
            change_column_dependencies: DependencyPolicy::none(),
        }
    }

    /// Every flag cleared, empty policies.
    #[must_use]
    pub fn none_supported() -> Self {
        Self::with_all(false)
    }

    /// Parses a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts the flags into constant predicates.
    #[must_use]
    pub fn into_capabilities(self) -> DialectCapabilities {
        DialectCapabilities {
            create_column: self.create_column.into(),
            drop_column: self.drop_column.into(),
            change_column: self.change_column.into(),
            create_primary_key: self.create_primary_key.into(),
            create_foreign_key: self.create_foreign_key.into(),
            create_index: self.create_index.into(),
            create_unique: self.create_unique.into(),
            create_check: self.create_check.into(),
            drop_primary_key: self.drop_primary_key.into(),
            drop_foreign_key: self.drop_foreign_key.into(),
            drop_index: self.drop_index.into(),
            drop_unique: self.drop_unique.into(),
            drop_check: self.drop_check.into(),
            drop_column_dependencies: self.drop_column_dependencies,
            change_column_dependencies: self.change_column_dependencies,
        }
    }
}

impl From<DialectProfile> for DialectCapabilities {
    fn from(profile: DialectProfile) -> Self {
        profile.into_capabilities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::DataType;

    #[test]
    fn test_bool_is_constant_predicate() {
        let yes: Capability<ColumnInfo> = true.into();
        let no: Capability<ColumnInfo> = false.into();
        let col = ColumnInfo::new("a", DataType::Text);
        assert!(yes.allows(&col));
        assert!(!no.allows(&col));
    }

    #[test]
    fn test_predicate_capability() {
        let cap = Capability::when(|col: &ColumnInfo| !col.not_null || col.default_value.is_some());
        assert!(cap.allows(&ColumnInfo::new("a", DataType::Text)));
        assert!(!cap.allows(&ColumnInfo::new("a", DataType::Text).not_null()));
    }

    #[test]
    fn test_constraint_dispatch() {
        let dialect = DialectCapabilities {
            create_unique: false.into(),
            drop_foreign_key: false.into(),
            ..DialectCapabilities::default()
        };
        let uq = ConstraintInfo::unique("uq", &["a"]);
        let fk = ConstraintInfo::foreign_key("fk", &["a"], "t", &["id"]);
        assert!(!dialect.can_create_constraint(&uq).unwrap());
        assert!(dialect.can_drop_constraint(&uq).unwrap());
        assert!(dialect.can_create_constraint(&fk).unwrap());
        assert!(!dialect.can_drop_constraint(&fk).unwrap());
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let dialect = DialectCapabilities::default();
        let odd = ConstraintInfo::new(ConstraintKind::Other("sortingKey".into()), "sk", &["a"]);
        assert!(matches!(
            dialect.can_create_constraint(&odd),
            Err(AlterError::UnsupportedConstraintKind(_))
        ));
        assert!(matches!(
            dialect.can_drop_constraint(&odd),
            Err(AlterError::UnsupportedConstraintKind(_))
        ));
    }

    #[test]
    fn test_profile_from_json() {
        let profile = DialectProfile::from_json(
            r#"{
                "changeColumn": false,
                "dropPrimaryKey": false,
                "dropColumnDependencies": ["indexes", "primaryKey"],
                "changeColumnDependencies": ["dependencies"]
            }"#,
        )
        .unwrap();
        assert!(profile.create_column);
        assert!(!profile.change_column);
        assert!(profile.drop_column_dependencies.includes(DependencyKind::Indexes));
        assert!(profile.drop_column_dependencies.includes(DependencyKind::PrimaryKey));
        assert!(!profile.drop_column_dependencies.includes(DependencyKind::Uniques));

        let caps = profile.into_capabilities();
        let col = ColumnInfo::new("a", DataType::Text);
        assert!(!caps.change_column.allows(&col));
        assert!(caps.drop_column.allows(&col));
        assert!(caps
            .change_column_dependencies
            .includes(DependencyKind::Dependencies));
    }

    #[test]
    fn test_profile_rejects_unknown_policy() {
        let err = DialectProfile::from_json(r#"{"dropColumnDependencies": ["triggers"]}"#);
        assert!(matches!(err, Err(AlterError::Serialization(_))));
    }

    #[test]
    fn test_none_supported() {
        let caps = DialectCapabilities::none_supported();
        let pk = ConstraintInfo::primary_key("pk", &["id"]);
        assert!(!caps.can_create_constraint(&pk).unwrap());
        assert!(!caps.create_column.allows(&ColumnInfo::new("a", DataType::Text)));
        assert!(caps.drop_column_dependencies.is_empty());
    }
}

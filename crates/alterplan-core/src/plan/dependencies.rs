//! Dependency expansion pass.

use tracing::trace;

use crate::dialect::{DependencyKind, DependencyPolicy, DialectCapabilities};
use crate::error::Result;
use crate::operation::AlterOperation;
use crate::structure::{ColumnInfo, ConstraintInfo, StructureDescriptor};

/// Collects the constraints that depend on `column` under `policy`.
///
/// Foreign keys of other tables referencing the column come first, then the
/// table's own primary key, foreign keys, indexes and uniques containing it.
pub fn dependent_column_constraints(
    db: &StructureDescriptor,
    column: &ColumnInfo,
    policy: &DependencyPolicy,
) -> Result<Vec<ConstraintInfo>> {
    let table = db.require_table(&column.table)?;
    table.require_column(&column.column_name)?;
    let name = column.column_name.as_str();

    let mut constraints: Vec<ConstraintInfo> = Vec::new();
    if policy.includes(DependencyKind::Dependencies) {
        constraints.extend(
            table
                .dependencies
                .iter()
                .filter(|fk| fk.references_column(name))
                .cloned(),
        );
    }

    let mut own: Vec<&ConstraintInfo> = Vec::new();
    if policy.includes(DependencyKind::PrimaryKey) {
        own.extend(table.primary_key.iter());
    }
    if policy.includes(DependencyKind::ForeignKeys) {
        own.extend(&table.foreign_keys);
    }
    if policy.includes(DependencyKind::Indexes) {
        own.extend(&table.indexes);
    }
    if policy.includes(DependencyKind::Uniques) {
        own.extend(&table.uniques);
    }
    constraints.extend(
        own.into_iter()
            .filter(|c| c.contains_column(name))
            .cloned(),
    );

    Ok(constraints)
}

/// Surrounds column drops, column changes and table drops with the drops
/// (and, for changes, recreations) of the constraints depending on them.
pub fn add_logical_dependencies(
    operations: Vec<AlterOperation>,
    db: &StructureDescriptor,
    dialect: &DialectCapabilities,
) -> Result<Vec<AlterOperation>> {
    let mut res = Vec::with_capacity(operations.len());

    for op in operations {
        match &op {
            AlterOperation::DropColumn { old_object } => {
                let constraints = dependent_column_constraints(
                    db,
                    old_object,
                    &dialect.drop_column_dependencies,
                )?;
                trace!(
                    column = %old_object.column_name,
                    table = %old_object.table,
                    dependents = constraints.len(),
                    "Unwinding constraints before column drop"
                );
                res.extend(constraints.into_iter().map(AlterOperation::drop_constraint));
                res.push(op);
            }

            AlterOperation::ChangeColumn { old_object, .. } => {
                let constraints = dependent_column_constraints(
                    db,
                    old_object,
                    &dialect.change_column_dependencies,
                )?;
                trace!(
                    column = %old_object.column_name,
                    table = %old_object.table,
                    dependents = constraints.len(),
                    "Unwinding constraints around column change"
                );
                res.extend(constraints.iter().cloned().map(AlterOperation::drop_constraint));
                res.push(op);
                res.extend(
                    constraints
                        .into_iter()
                        .rev()
                        .map(AlterOperation::create_constraint),
                );
            }

            AlterOperation::DropTable { old_object } => {
                trace!(
                    table = %old_object.name,
                    dependents = old_object.dependencies.len(),
                    "Unwinding references before table drop"
                );
                res.extend(
                    old_object
                        .dependencies
                        .iter()
                        .cloned()
                        .map(AlterOperation::drop_constraint),
                );
                res.push(op);
            }

            _ => res.push(op),
        }
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{DataType, TableInfo};

    fn structure() -> StructureDescriptor {
        let customers = TableInfo::new("customers")
            .column(ColumnInfo::new("id", DataType::Integer).not_null())
            .column(ColumnInfo::new("email", DataType::Text))
            .primary_key(ConstraintInfo::primary_key("pk_customers", &["id"]))
            .index(ConstraintInfo::index("ix_customers_email", &["email"]))
            .unique(ConstraintInfo::unique("uq_customers_email_id", &["email", "id"]));
        let orders = TableInfo::new("orders")
            .column(ColumnInfo::new("id", DataType::Integer).not_null())
            .column(ColumnInfo::new("customer_id", DataType::Integer))
            .foreign_key(ConstraintInfo::foreign_key(
                "fk_orders_customer",
                &["customer_id"],
                "customers",
                &["id"],
            ));
        let mut db = StructureDescriptor::new().table(customers).table(orders);
        db.link_dependencies();
        db
    }

    fn column(db: &StructureDescriptor, table: &str, name: &str) -> ColumnInfo {
        db.get_table(&table.into())
            .and_then(|t| t.get_column(name))
            .cloned()
            .unwrap()
    }

    fn names(constraints: &[ConstraintInfo]) -> Vec<&str> {
        constraints.iter().map(|c| c.constraint_name.as_str()).collect()
    }

    #[test]
    fn test_dependents_follow_policy_order() {
        let db = structure();
        let id = column(&db, "customers", "id");
        let policy = DependencyPolicy::of(&[
            DependencyKind::Uniques,
            DependencyKind::Dependencies,
            DependencyKind::PrimaryKey,
            DependencyKind::Indexes,
        ]);
        let deps = dependent_column_constraints(&db, &id, &policy).unwrap();
        assert_eq!(
            names(&deps),
            ["fk_orders_customer", "pk_customers", "uq_customers_email_id"]
        );
    }

    #[test]
    fn test_dependents_empty_policy() {
        let db = structure();
        let id = column(&db, "customers", "id");
        let deps = dependent_column_constraints(&db, &id, &DependencyPolicy::none()).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_unknown_column_is_error() {
        let db = structure();
        let ghost = ColumnInfo::new("ghost", DataType::Text).in_table("customers");
        let err = dependent_column_constraints(&db, &ghost, &DependencyPolicy::none()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_drop_column_unwinds_first() {
        let db = structure();
        let dialect = DialectCapabilities {
            drop_column_dependencies: DependencyPolicy::of(&[
                DependencyKind::Indexes,
                DependencyKind::Uniques,
            ]),
            ..DialectCapabilities::default()
        };
        let email = column(&db, "customers", "email");
        let ops = add_logical_dependencies(
            vec![AlterOperation::drop_column(email.clone())],
            &db,
            &dialect,
        )
        .unwrap();

        assert_eq!(ops.len(), 3);
        assert!(matches!(
            &ops[0],
            AlterOperation::DropConstraint { old_object }
                if old_object.constraint_name == "ix_customers_email"
        ));
        assert!(matches!(
            &ops[1],
            AlterOperation::DropConstraint { old_object }
                if old_object.constraint_name == "uq_customers_email_id"
        ));
        assert_eq!(ops[2], AlterOperation::drop_column(email));
    }

    #[test]
    fn test_change_column_restores_in_reverse() {
        let db = structure();
        let dialect = DialectCapabilities {
            change_column_dependencies: DependencyPolicy::of(&[
                DependencyKind::Dependencies,
                DependencyKind::PrimaryKey,
            ]),
            ..DialectCapabilities::default()
        };
        let id = column(&db, "customers", "id");
        let wider = id.clone().data_type(DataType::BigInt);
        let ops = add_logical_dependencies(
            vec![AlterOperation::change_column(id.clone(), wider.clone())],
            &db,
            &dialect,
        )
        .unwrap();

        let customers = db.get_table(&"customers".into()).unwrap();
        let fk = customers.dependencies[0].clone();
        let pk = customers.primary_key.clone().unwrap();
        assert_eq!(
            ops,
            vec![
                AlterOperation::drop_constraint(fk.clone()),
                AlterOperation::drop_constraint(pk.clone()),
                AlterOperation::change_column(id, wider),
                AlterOperation::create_constraint(pk),
                AlterOperation::create_constraint(fk),
            ]
        );
    }

    #[test]
    fn test_drop_table_drops_references_in_listed_order() {
        let mut db = structure();
        let extra = ConstraintInfo::foreign_key(
            "fk_invoices_customer",
            &["customer_id"],
            "customers",
            &["id"],
        )
        .in_table("invoices");
        if let Some(customers) = db.get_table_mut(&"customers".into()) {
            customers.dependencies.insert(0, extra);
        }
        let customers = db.get_table(&"customers".into()).cloned().unwrap();

        let ops = add_logical_dependencies(
            vec![AlterOperation::drop_table(customers.clone())],
            &db,
            &DialectCapabilities::default(),
        )
        .unwrap();

        let dropped: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                AlterOperation::DropConstraint { old_object } => {
                    Some(old_object.constraint_name.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(dropped, ["fk_invoices_customer", "fk_orders_customer"]);
        assert_eq!(ops.last(), Some(&AlterOperation::drop_table(customers)));
    }

    #[test]
    fn test_other_operations_untouched() {
        let db = structure();
        let dialect = DialectCapabilities {
            drop_column_dependencies: DependencyPolicy::of(&[DependencyKind::PrimaryKey]),
            ..DialectCapabilities::default()
        };
        let email = column(&db, "customers", "email");
        let ops = vec![
            AlterOperation::rename_column(email.clone(), "mail"),
            AlterOperation::create_column(ColumnInfo::new("x", DataType::Text).in_table("orders")),
            AlterOperation::drop_column(email),
        ];
        let res = add_logical_dependencies(ops.clone(), &db, &dialect).unwrap();
        assert_eq!(res, ops);
    }
}

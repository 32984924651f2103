//! Recreation grouping pass.

use std::collections::HashMap;

use tracing::trace;

use crate::operation::AlterOperation;
use crate::structure::{TableInfo, TableName};

enum Slot {
    Single(AlterOperation),
    Recreate {
        table: TableInfo,
        operations: Vec<AlterOperation>,
    },
}

/// Merges every rebuild of a table into the first rebuild of that table.
///
/// Operations on an existing column or constraint of a table that is
/// already being rebuilt join that rebuild as well. Everything else keeps
/// its position.
#[must_use]
pub fn group_table_recreations(operations: Vec<AlterOperation>) -> Vec<AlterOperation> {
    let mut slots: Vec<Slot> = Vec::with_capacity(operations.len());
    let mut recreates: HashMap<TableName, usize> = HashMap::new();

    for op in operations {
        let (target, ops) = match op {
            AlterOperation::RecreateTable { table, operations } => {
                if let Some(&idx) = recreates.get(&table.name) {
                    (idx, operations)
                } else {
                    recreates.insert(table.name.clone(), slots.len());
                    slots.push(Slot::Recreate { table, operations });
                    continue;
                }
            }
            other => match other.old_object_table().and_then(|t| recreates.get(t)).copied() {
                Some(idx) => (idx, vec![other]),
                None => {
                    slots.push(Slot::Single(other));
                    continue;
                }
            },
        };

        if let Slot::Recreate { table, operations } = &mut slots[target] {
            trace!(table = %table.name, added = ops.len(), "Grouping into table recreation");
            operations.extend(ops);
        }
    }

    slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Single(op) => op,
            Slot::Recreate { table, operations } => {
                AlterOperation::recreate_table(table, operations)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{ColumnInfo, ConstraintInfo, DataType};

    fn t() -> TableInfo {
        TableInfo::new("t")
            .column(ColumnInfo::new("a", DataType::Text))
            .unique(ConstraintInfo::unique("uq1", &["a"]))
    }

    fn u() -> TableInfo {
        TableInfo::new("u").column(ColumnInfo::new("b", DataType::Text))
    }

    #[test]
    fn test_second_recreate_merges_into_first() {
        let x = AlterOperation::create_column(ColumnInfo::new("x", DataType::Text).in_table("t"));
        let drop_uq = AlterOperation::drop_constraint(t().uniques[0].clone());
        let ops = vec![
            AlterOperation::recreate_table(t(), vec![x.clone()]),
            AlterOperation::recreate_table(t(), vec![drop_uq.clone()]),
        ];
        assert_eq!(
            group_table_recreations(ops),
            vec![AlterOperation::recreate_table(t(), vec![x, drop_uq])]
        );
    }

    #[test]
    fn test_later_op_on_old_object_joins_group() {
        let a = t().columns[0].clone();
        let rename = AlterOperation::rename_table(u(), "v");
        let drop_a = AlterOperation::drop_column(a);
        let ops = vec![
            AlterOperation::recreate_table(t(), vec![]),
            rename.clone(),
            drop_a.clone(),
        ];
        assert_eq!(
            group_table_recreations(ops),
            vec![AlterOperation::recreate_table(t(), vec![drop_a]), rename]
        );
    }

    #[test]
    fn test_ops_before_recreate_keep_position() {
        let drop_uq = AlterOperation::drop_constraint(t().uniques[0].clone());
        let x = AlterOperation::create_column(ColumnInfo::new("x", DataType::Text).in_table("t"));
        let ops = vec![
            drop_uq.clone(),
            AlterOperation::recreate_table(t(), vec![x.clone()]),
        ];
        assert_eq!(group_table_recreations(ops.clone()), ops);
    }

    #[test]
    fn test_new_objects_and_renames_are_not_grouped() {
        let a = t().columns[0].clone();
        let ops = vec![
            AlterOperation::recreate_table(t(), vec![]),
            AlterOperation::create_column(ColumnInfo::new("y", DataType::Text).in_table("t")),
            AlterOperation::rename_column(a, "aa"),
            AlterOperation::drop_table(t()),
        ];
        assert_eq!(group_table_recreations(ops.clone()), ops);
    }

    #[test]
    fn test_tables_are_grouped_independently() {
        let b = u().columns[0].clone();
        let a = t().columns[0].clone();
        let ops = vec![
            AlterOperation::recreate_table(t(), vec![AlterOperation::drop_column(a.clone())]),
            AlterOperation::recreate_table(u(), vec![AlterOperation::drop_column(b.clone())]),
            AlterOperation::recreate_table(t(), vec![AlterOperation::create_column(a.clone())]),
        ];
        let grouped = group_table_recreations(ops);
        assert_eq!(
            grouped,
            vec![
                AlterOperation::recreate_table(
                    t(),
                    vec![AlterOperation::drop_column(a.clone()), AlterOperation::create_column(a)]
                ),
                AlterOperation::recreate_table(u(), vec![AlterOperation::drop_column(b)]),
            ]
        );
    }
}

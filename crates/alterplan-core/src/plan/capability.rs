//! Capability enforcement pass.

use tracing::trace;

use crate::dialect::DialectCapabilities;
use crate::error::Result;
use crate::operation::AlterOperation;
use crate::structure::StructureDescriptor;

/// Returns whether the dialect can perform `op` without rebuilding its table.
///
/// Table-level operations, renames, constraint changes and rebuilds are
/// never checked.
pub fn is_directly_supported(op: &AlterOperation, dialect: &DialectCapabilities) -> Result<bool> {
    let supported = match op {
        AlterOperation::CreateColumn { new_object } => dialect.create_column.allows(new_object),
        AlterOperation::DropColumn { old_object } => dialect.drop_column.allows(old_object),
        AlterOperation::ChangeColumn { new_object, .. } => dialect.change_column.allows(new_object),
        AlterOperation::CreateConstraint { new_object } => {
            dialect.can_create_constraint(new_object)?
        }
        AlterOperation::DropConstraint { old_object } => dialect.can_drop_constraint(old_object)?,
        AlterOperation::CreateTable { .. }
        | AlterOperation::DropTable { .. }
        | AlterOperation::RenameTable { .. }
        | AlterOperation::RenameColumn { .. }
        | AlterOperation::ChangeConstraint { .. }
        | AlterOperation::RenameConstraint { .. }
        | AlterOperation::RecreateTable { .. } => true,
    };
    Ok(supported)
}

/// Wraps each operation the dialect cannot perform into a one-operation
/// rebuild of its owning table. Never merges.
pub fn transform_to_implemented_ops(
    operations: Vec<AlterOperation>,
    db: &StructureDescriptor,
    dialect: &DialectCapabilities,
) -> Result<Vec<AlterOperation>> {
    operations
        .into_iter()
        .map(|op| {
            if is_directly_supported(&op, dialect)? {
                return Ok(op);
            }
            let table = db.require_table(op.table_name())?.clone();
            trace!(
                operation = op.operation_type(),
                table = %table.name,
                "Operation requires table recreation"
            );
            Ok(AlterOperation::recreate_table(table, vec![op]))
        })
        .collect()
}

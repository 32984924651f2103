//! Plan executor.
//!
//! Replays operations against an [`AlterProcessor`]. A table rebuild is
//! replayed against a scratch structure holding only a copy of the table;
//! the processor then receives both the original and the mutated table.
//!
//! [`run_alter_operations`] takes every rebuild's table image as recorded in
//! the plan. [`run_tracked_alter_operations`] keeps a structure in step with
//! the processor instead, so a rebuild starts from the table as the earlier
//! operations left it.

use tracing::debug;

use crate::error::Result;
use crate::operation::AlterOperation;
use crate::processor::AlterProcessor;
use crate::state::StructureAlterProcessor;
use crate::structure::{StructureDescriptor, TableInfo};

/// Replays `operations` in order.
///
/// # Errors
///
/// Returns the first error raised by the processor or by a scratch replay.
pub fn run_alter_operations<P: AlterProcessor + ?Sized>(
    operations: &[AlterOperation],
    processor: &mut P,
) -> Result<()> {
    for op in operations {
        run_alter_operation(op, processor)?;
    }
    Ok(())
}

/// Replays `operations` against `processor` and applies them to `structure`
/// as well, returning the structure after the last operation.
///
/// A rebuild hands the processor the table as it exists at that point of
/// the run, so columns, constraints and renames applied in place earlier
/// carry over into the rebuilt table.
///
/// # Errors
///
/// Returns the first error raised by the processor, or a not-found error
/// when an operation refers to an object missing from `structure`.
pub fn run_tracked_alter_operations<P: AlterProcessor + ?Sized>(
    operations: &[AlterOperation],
    structure: StructureDescriptor,
    processor: &mut P,
) -> Result<StructureDescriptor> {
    let mut current = StructureAlterProcessor::new(structure);

    for op in operations {
        if let AlterOperation::RecreateTable { table, operations } = op {
            let live = current.structure().require_table(&table.name)?.clone();
            debug!(
                operation = op.operation_type(),
                table = %table.name,
                columns = live.columns.len(),
                "Running alter operation"
            );
            let rebuilt = replay_on_copy(&live, operations)?;
            processor.recreate_table(&live, &rebuilt)?;
            current.recreate_table(&live, &rebuilt)?;
        } else {
            run_alter_operation(op, processor)?;
            dispatch(op, &mut current)?;
        }
    }

    Ok(current.into_structure())
}

/// Dispatches a single operation to the matching processor method.
///
/// # Errors
///
/// Returns the processor's error, or the error of a scratch replay.
pub fn run_alter_operation<P: AlterProcessor + ?Sized>(
    op: &AlterOperation,
    processor: &mut P,
) -> Result<()> {
    debug!(
        operation = op.operation_type(),
        table = %op.table_name(),
        "Running alter operation"
    );
    dispatch(op, processor)
}

fn dispatch<P: AlterProcessor + ?Sized>(op: &AlterOperation, processor: &mut P) -> Result<()> {
    match op {
        AlterOperation::CreateTable { new_object } => processor.create_table(new_object),
        AlterOperation::DropTable { old_object } => processor.drop_table(old_object),
        AlterOperation::RenameTable { object, new_name } => {
            processor.rename_table(object, new_name)
        }
        AlterOperation::CreateColumn { new_object } => processor.create_column(new_object, &[]),
        AlterOperation::ChangeColumn {
            old_object,
            new_object,
        } => processor.change_column(old_object, new_object),
        AlterOperation::RenameColumn { object, new_name } => {
            processor.rename_column(object, new_name)
        }
        AlterOperation::DropColumn { old_object } => processor.drop_column(old_object),
        AlterOperation::CreateConstraint { new_object } => processor.create_constraint(new_object),
        AlterOperation::ChangeConstraint {
            old_object,
            new_object,
        } => processor.change_constraint(old_object, new_object),
        AlterOperation::DropConstraint { old_object } => processor.drop_constraint(old_object),
        AlterOperation::RenameConstraint { object, new_name } => {
            processor.rename_constraint(object, new_name)
        }
        AlterOperation::RecreateTable { table, operations } => {
            let new_table = replay_on_copy(table, operations)?;
            processor.recreate_table(table, &new_table)
        }
    }
}

/// Applies `operations` to a copy of `table` inside an otherwise empty
/// structure and returns the mutated copy.
///
/// # Errors
///
/// Returns the first error of the in-memory replay.
pub fn replay_on_copy(table: &TableInfo, operations: &[AlterOperation]) -> Result<TableInfo> {
    let mut scratch = StructureAlterProcessor::new(StructureDescriptor::single(table.clone()));
    run_alter_operations(operations, &mut scratch)?;
    scratch.into_structure().remove_table(&table.name)
}

//! Runtime intrinsics called by generated code
//!
//! Every entry point resolves the active [`ExecutionContext`](crate::context::ExecutionContext)
//! and forwards to it. These calls have no error channel: a missing context, a
//! backend failure or a reference-counting contract violation is fatal.

use crate::context::{self, ExecutionContext};
use crate::error::Error;
use crate::handle::{OutcomeHandle, QubitHandle};

#[cold]
#[track_caller]
fn fatal(error: Error) -> ! {
    if error.is_contract_violation() {
        log::error!("contract violation: {}", error);
    } else {
        log::error!("runtime failure: {}", error);
    }
    panic!("{}", error)
}

#[track_caller]
fn active<T>(f: impl FnOnce(&mut ExecutionContext) -> crate::error::Result<T>) -> T {
    match context::with_active(f) {
        Ok(Ok(value)) => value,
        Ok(Err(error)) | Err(error) => fatal(error),
    }
}

pub fn result_get_zero() -> OutcomeHandle {
    active(|ctx| Ok(ctx.result_get_zero()))
}

pub fn result_get_one() -> OutcomeHandle {
    active(|ctx| Ok(ctx.result_get_one()))
}

pub fn qubit_allocate() -> QubitHandle {
    active(|ctx| ctx.qubit_allocate())
}

pub fn qubit_release(qubit: QubitHandle) {
    active(|ctx| ctx.qubit_release(qubit))
}

/// Borrowing is implemented as allocation
pub fn qubit_borrow() -> QubitHandle {
    qubit_allocate()
}

pub fn qubit_return(qubit: QubitHandle) {
    qubit_release(qubit)
}

pub fn qubit_restricted_reuse_area_start() {
    active(|ctx| ctx.restricted_reuse_area_start())
}

pub fn qubit_restricted_reuse_segment_next() {
    active(|ctx| ctx.restricted_reuse_segment_next())
}

pub fn qubit_restricted_reuse_area_end() {
    active(|ctx| ctx.restricted_reuse_area_end())
}

/// Adjust the logical reference count of `result` by `increment`.
///
/// The backend releases the result once its count reaches zero.
pub fn result_update_reference_count(result: OutcomeHandle, increment: i32) {
    active(|ctx| ctx.result_update_reference_count(result, increment).map(|_| ()))
}

pub fn result_equal(left: OutcomeHandle, right: OutcomeHandle) -> bool {
    active(|ctx| Ok(ctx.result_equal(left, right)))
}

pub fn result_to_string(result: OutcomeHandle) -> String {
    active(|ctx| ctx.result_to_string(result))
}

pub fn qubit_to_string(qubit: QubitHandle) -> String {
    active(|ctx| Ok(ctx.qubit_to_string(qubit)))
}

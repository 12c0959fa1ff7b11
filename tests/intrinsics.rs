use qir_rt::backend::ClassicalBackend;
use qir_rt::context::{self, ContextOptions, ContextScope};
use qir_rt::intrinsics::*;
use qir_rt::RuntimeError;

fn enter() -> ContextScope {
    ContextScope::enter(Box::new(ClassicalBackend::new()), ContextOptions::default()).unwrap()
}

/// Measure a qubit prepared in `bit` through the active context
fn measure_bit(bit: bool) -> qir_rt::OutcomeHandle {
    let q = qubit_allocate();
    let r = context::with_active(|ctx| {
        let gates = ctx.gate_set().unwrap();
        if bit {
            gates.x(q).unwrap();
        }
        gates.measure(q).unwrap()
    })
    .unwrap();
    qubit_release(q);
    r
}

#[test]
fn test_canonical_results() {
    let _scope = enter();
    let zero = result_get_zero();
    let one = result_get_one();

    assert_eq!(zero, result_get_zero());
    assert!(!result_equal(zero, one));
    assert_eq!(result_to_string(zero), "Zero");
    assert_eq!(result_to_string(one), "One");
}

#[test]
fn test_measured_results_compare_by_value() {
    let _scope = enter();
    let a = measure_bit(true);
    let b = measure_bit(true);

    assert_ne!(a, b);
    assert!(result_equal(a, b));
    assert!(result_equal(a, result_get_one()));
    assert!(!result_equal(a, result_get_zero()));
}

#[test]
fn test_reference_counting_through_intrinsics() {
    let _scope = enter();
    let r = measure_bit(false);

    result_update_reference_count(r, 1);
    result_update_reference_count(r, 0);
    result_update_reference_count(r, -1);
    let tracked = context::with_active(|ctx| ctx.tracker().count(r)).unwrap();
    assert_eq!(tracked, Some(1));

    result_update_reference_count(r, -1);
    let (tracked, live) =
        context::with_active(|ctx| (ctx.tracker().count(r), ctx.tracker().len())).unwrap();
    assert_eq!(tracked, None);
    assert_eq!(live, 0);
}

#[test]
#[should_panic(expected = "expected -1")]
fn test_untracked_over_release_is_fatal() {
    let _scope = enter();
    let r = measure_bit(false);
    result_update_reference_count(r, -2);
}

#[test]
#[should_panic(expected = "below zero")]
fn test_tracked_over_release_is_fatal() {
    let _scope = enter();
    let r = measure_bit(false);
    result_update_reference_count(r, 1);
    result_update_reference_count(r, -3);
}

#[test]
#[should_panic(expected = "already released")]
fn test_release_after_count_reached_zero_is_fatal() {
    let _scope = enter();
    let r = measure_bit(true);
    result_update_reference_count(r, -1);
    // The table no longer knows r, so this is treated as a first release
    // and the backend rejects it.
    result_update_reference_count(r, -1);
}

#[test]
#[should_panic(expected = "pending")]
fn test_pending_result_to_string_is_fatal() {
    let mut backend = ClassicalBackend::new();
    let r = backend.mint_pending();
    let _scope = ContextScope::enter(Box::new(backend), ContextOptions::default()).unwrap();
    result_to_string(r);
}

#[test]
fn test_qubit_intrinsics() {
    let _scope = enter();
    let q = qubit_borrow();
    assert_eq!(qubit_to_string(q), "q0");
    qubit_return(q);

    let q = qubit_allocate();
    assert_eq!(qubit_to_string(q), "q0");
    qubit_release(q);
}

#[test]
fn test_restricted_reuse_area() {
    let _scope = enter();
    qubit_restricted_reuse_area_start();
    let q0 = qubit_allocate();
    qubit_release(q0);
    qubit_restricted_reuse_segment_next();
    let q1 = qubit_allocate();
    assert_eq!(q0, q1);
    qubit_release(q1);
    qubit_restricted_reuse_area_end();
}

#[test]
#[should_panic(expected = "without a matching start")]
fn test_unbalanced_area_end_is_fatal() {
    let _scope = enter();
    qubit_restricted_reuse_area_end();
}

#[test]
#[should_panic(expected = "No execution context")]
fn test_intrinsics_require_active_context() {
    result_get_zero();
}

#[test]
fn test_single_active_context() {
    let scope = enter();
    let second = ContextScope::enter(Box::new(ClassicalBackend::new()), ContextOptions::default());
    assert!(matches!(second, Err(RuntimeError::ContextAlreadyActive)));

    scope.finish().unwrap();
    assert!(!context::has_active_context());
    let _again = enter();
    assert!(context::has_active_context());
}

#[test]
fn test_scope_teardown_reports_leaks() {
    let scope = ContextScope::enter(
        Box::new(ClassicalBackend::new()),
        ContextOptions {
            track_allocated_objects: true,
        },
    )
    .unwrap();
    let r = measure_bit(false);
    result_update_reference_count(r, 2);

    let report = scope.finish().unwrap();
    assert_eq!(report.backend, "classical");
    assert_eq!(report.leaked_results, vec![(r, 3)]);
}

#[test]
fn test_scope_leaves_foreign_context_installed() {
    let scope = enter();
    context::release_context().unwrap();

    let mut backend = ClassicalBackend::new();
    let settled = backend.mint_pending();
    backend.settle(settled, true).unwrap();
    context::initialize_context(qir_rt::ExecutionContext::new(
        Box::new(backend),
        ContextOptions::default(),
    ))
    .unwrap();

    drop(scope);
    assert!(context::has_active_context());
    // Still the context installed above, not a fresh one
    let value = context::with_active(|ctx| ctx.backend().result_value(settled)).unwrap();
    assert_eq!(value, qir_rt::ResultValue::One);

    context::release_context().unwrap();
    assert!(!context::has_active_context());
}

#[test]
fn test_finish_after_foreign_release_fails() {
    let scope = enter();
    context::release_context().unwrap();
    context::initialize_context(qir_rt::ExecutionContext::new(
        Box::new(ClassicalBackend::new()),
        ContextOptions::default(),
    ))
    .unwrap();

    assert_eq!(scope.finish().unwrap_err(), RuntimeError::NoActiveContext);
    assert!(context::has_active_context());
    context::release_context().unwrap();
}

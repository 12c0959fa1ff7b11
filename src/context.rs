//! Execution context: the active backend plus its result reference counts
//!
//! The runtime assumes a single global execution context. [`ExecutionContext`]
//! can be used directly and passed around explicitly; [`ContextScope`] installs
//! one as the active context for the intrinsic entry points.

use crate::backend::{Backend, QuantumGateSet, RestrictedAreaManagement};
use crate::error::{Error, Result};
use crate::handle::{OutcomeHandle, QubitHandle, ResultValue};
use crate::tracker::{RefCountTracker, RefCountUpdate};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

/// Options fixed when a context is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Report results whose count never reached zero when the context is torn down
    #[serde(default)]
    pub track_allocated_objects: bool,
}

/// Summary produced when a context is torn down
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub backend: String,
    /// Shared results still alive at teardown, with their logical count.
    /// Only filled when `track_allocated_objects` is set.
    pub leaked_results: Vec<(OutcomeHandle, i32)>,
}

impl TeardownReport {
    pub fn has_leaks(&self) -> bool {
        !self.leaked_results.is_empty()
    }
}

/// The backend and reference-count table for one execution
pub struct ExecutionContext {
    backend: Box<dyn Backend>,
    tracker: RefCountTracker,
    options: ContextOptions,
}

impl ExecutionContext {
    pub fn new(backend: Box<dyn Backend>, options: ContextOptions) -> Self {
        log::debug!(
            "creating execution context on backend {} (track allocated objects: {})",
            backend.name(),
            options.track_allocated_objects
        );
        Self {
            backend,
            tracker: RefCountTracker::new(),
            options,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn tracker(&self) -> &RefCountTracker {
        &self.tracker
    }

    pub fn result_get_zero(&self) -> OutcomeHandle {
        self.backend.use_zero()
    }

    pub fn result_get_one(&self) -> OutcomeHandle {
        self.backend.use_one()
    }

    pub fn qubit_allocate(&mut self) -> Result<QubitHandle> {
        self.backend.allocate_qubit()
    }

    pub fn qubit_release(&mut self, qubit: QubitHandle) -> Result<()> {
        self.backend.release_qubit(qubit)
    }

    /// Borrowing is implemented as allocation
    pub fn qubit_borrow(&mut self) -> Result<QubitHandle> {
        self.qubit_allocate()
    }

    pub fn qubit_return(&mut self, qubit: QubitHandle) -> Result<()> {
        self.qubit_release(qubit)
    }

    fn restricted_area(&mut self) -> Result<&mut dyn RestrictedAreaManagement> {
        self.backend
            .restricted_area_management()
            .ok_or(Error::RestrictedAreaUnsupported)
    }

    pub fn restricted_reuse_area_start(&mut self) -> Result<()> {
        self.restricted_area()?.start_area()
    }

    pub fn restricted_reuse_segment_next(&mut self) -> Result<()> {
        self.restricted_area()?.next_segment()
    }

    pub fn restricted_reuse_area_end(&mut self) -> Result<()> {
        self.restricted_area()?.end_area()
    }

    /// Apply a reference-count increment coming from generated code
    pub fn result_update_reference_count(
        &mut self,
        result: OutcomeHandle,
        increment: i32,
    ) -> Result<RefCountUpdate> {
        self.tracker
            .update(result, increment, self.backend.as_mut())
    }

    /// Identity first, then the backend's value comparison
    pub fn result_equal(&self, left: OutcomeHandle, right: OutcomeHandle) -> bool {
        if left == right {
            return true;
        }
        self.backend.are_equal_results(left, right)
    }

    /// `"Zero"` or `"One"`; a pending result is a contract violation
    pub fn result_to_string(&self, result: OutcomeHandle) -> Result<String> {
        match self.backend.result_value(result) {
            ResultValue::Pending => Err(Error::PendingResult { handle: result }),
            value => Ok(value.display_name().unwrap_or_default().to_string()),
        }
    }

    pub fn qubit_to_string(&self, qubit: QubitHandle) -> String {
        self.backend.qubit_to_string(qubit)
    }

    /// Gate surface of the backend, if it has one
    pub fn gate_set(&mut self) -> Option<&mut dyn QuantumGateSet> {
        self.backend.gate_set()
    }

    /// Tear the context down, discarding the reference-count table
    pub fn teardown(mut self) -> TeardownReport {
        let remaining = self.tracker.clear();
        let mut report = TeardownReport {
            backend: self.backend.name().to_string(),
            leaked_results: Vec::new(),
        };
        if self.options.track_allocated_objects {
            for (handle, count) in &remaining {
                log::warn!("result {} still has {} reference(s) at teardown", handle, count);
            }
            report.leaked_results = remaining;
        }
        log::debug!("execution context on backend {} torn down", report.backend);
        report
    }
}

/// The installed context and the generation it was installed under
struct ActiveContext {
    generation: u64,
    context: ExecutionContext,
}

thread_local! {
    static ACTIVE_CONTEXT: RefCell<Option<ActiveContext>> = const { RefCell::new(None) };
    static NEXT_GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn install(context: ExecutionContext) -> Result<u64> {
    ACTIVE_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(Error::ContextAlreadyActive);
        }
        let generation = NEXT_GENERATION.with(|next| {
            let generation = next.get();
            next.set(generation + 1);
            generation
        });
        *slot = Some(ActiveContext {
            generation,
            context,
        });
        Ok(generation)
    })
}

/// Remove the active context if `owner` accepts its generation
fn take_active(owner: impl FnOnce(u64) -> bool) -> Option<ExecutionContext> {
    ACTIVE_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        let owned = slot
            .as_ref()
            .map_or(false, |active| owner(active.generation));
        if owned {
            slot.take().map(|active| active.context)
        } else {
            None
        }
    })
}

/// Install `context` as the active context
pub fn initialize_context(context: ExecutionContext) -> Result<()> {
    install(context).map(|_| ())
}

/// Remove and tear down the active context
pub fn release_context() -> Result<TeardownReport> {
    let context = take_active(|_| true).ok_or(Error::NoActiveContext)?;
    Ok(context.teardown())
}

pub fn has_active_context() -> bool {
    ACTIVE_CONTEXT.with(|slot| slot.borrow().is_some())
}

/// Run `f` against the active context.
///
/// Calls must not nest: the context is borrowed for the duration of `f`.
pub fn with_active<T>(f: impl FnOnce(&mut ExecutionContext) -> T) -> Result<T> {
    ACTIVE_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        let active = slot.as_mut().ok_or(Error::NoActiveContext)?;
        Ok(f(&mut active.context))
    })
}

/// Keeps a context active for its lifetime.
///
/// The scope only releases the context it installed; if that context was
/// already released and another one installed, the newer one is left alone.
#[must_use = "the context is released when the scope is dropped"]
pub struct ContextScope {
    generation: u64,
    released: bool,
}

impl ContextScope {
    pub fn enter(backend: Box<dyn Backend>, options: ContextOptions) -> Result<Self> {
        let generation = install(ExecutionContext::new(backend, options))?;
        Ok(Self {
            generation,
            released: false,
        })
    }

    fn release_own(&mut self) -> Option<ExecutionContext> {
        self.released = true;
        let generation = self.generation;
        take_active(|active| active == generation)
    }

    /// Release the context now and return its teardown report
    pub fn finish(mut self) -> Result<TeardownReport> {
        let context = self.release_own().ok_or(Error::NoActiveContext)?;
        Ok(context.teardown())
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        if !self.released && self.release_own().map(ExecutionContext::teardown).is_none() {
            log::warn!(
                "context scope {} dropped after its context was released",
                self.generation
            );
        }
    }
}

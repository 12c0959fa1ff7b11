//! Backend capability interfaces
//!
//! A backend (simulator or device driver) owns every qubit and result handle.
//! The runtime only forwards to it; the single exception is result release,
//! which is driven exclusively by the reference-count tracker.

use crate::error::Result;
use crate::handle::{OutcomeHandle, QubitHandle, ResultValue};

pub mod classical;

pub use classical::ClassicalBackend;

/// Capabilities every execution backend provides
pub trait Backend {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// The canonical `Zero` result. Repeated calls may return the same handle.
    fn use_zero(&self) -> OutcomeHandle;

    /// The canonical `One` result. Repeated calls may return the same handle.
    fn use_one(&self) -> OutcomeHandle;

    fn allocate_qubit(&mut self) -> Result<QubitHandle>;

    fn release_qubit(&mut self, qubit: QubitHandle) -> Result<()>;

    /// Release a result whose logical reference count reached zero.
    ///
    /// Only the reference-count tracker calls this.
    fn release_result(&mut self, result: OutcomeHandle) -> Result<()>;

    /// Value equality for two results with distinct identities
    fn are_equal_results(&self, left: OutcomeHandle, right: OutcomeHandle) -> bool;

    fn result_value(&self, result: OutcomeHandle) -> ResultValue;

    fn qubit_to_string(&self, qubit: QubitHandle) -> String;

    /// Restricted reuse area control, if the backend supports it
    fn restricted_area_management(&mut self) -> Option<&mut dyn RestrictedAreaManagement> {
        None
    }

    /// Gate application, if the backend supports it
    fn gate_set(&mut self) -> Option<&mut dyn QuantumGateSet> {
        None
    }
}

/// Scoped qubit recycling managed entirely by the backend.
///
/// The runtime does not validate call order; malformed sequences are reported
/// by the backend.
pub trait RestrictedAreaManagement {
    fn start_area(&mut self) -> Result<()>;
    fn next_segment(&mut self) -> Result<()>;
    fn end_area(&mut self) -> Result<()>;
}

/// Minimal gate surface used by trace replay
pub trait QuantumGateSet {
    /// Pauli X
    fn x(&mut self, qubit: QubitHandle) -> Result<()>;

    /// Measure in the computational basis, minting a fresh result handle
    fn measure(&mut self, qubit: QubitHandle) -> Result<OutcomeHandle>;
}

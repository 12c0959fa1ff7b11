//! qir-rt: runtime support for QIR programs on a pluggable backend
//!
//! Generated QIR treats measurement results as reference-counted values, while
//! backends only know how to release a result once. This crate tracks the
//! logical reference counts on the backend's behalf and exposes the runtime
//! intrinsics that forward to the active backend.

pub mod backend;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod handle;
pub mod intrinsics;
pub mod script;
pub mod tracker;

pub use error::{Error as RuntimeError, Result as RuntimeResult};

// Re-export commonly used types
pub use backend::{Backend, ClassicalBackend, QuantumGateSet, RestrictedAreaManagement};
pub use config::{LeakPolicy, RuntimeConfig};
pub use context::{ContextOptions, ContextScope, ExecutionContext, TeardownReport};
pub use handle::{OutcomeHandle, QubitHandle, ResultValue};
pub use tracker::{RefCountTracker, RefCountUpdate};

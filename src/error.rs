use miette::Diagnostic;
use thiserror::Error;

use crate::handle::{OutcomeHandle, QubitHandle};

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised by the outcome runtime
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Untracked result {handle} released with increment {delta}, expected -1")]
    #[diagnostic(
        code(qir_rt::untracked_over_release),
        help("an unshared result has an implicit reference count of 1")
    )]
    UntrackedOverRelease { handle: OutcomeHandle, delta: i32 },

    #[error("Reference count of result {handle} would drop below zero (count {count}, increment {delta})")]
    #[diagnostic(code(qir_rt::negative_ref_count))]
    NegativeRefCount {
        handle: OutcomeHandle,
        count: i32,
        delta: i32,
    },

    #[error("Reference count of result {handle} would overflow (count {count}, increment {delta})")]
    #[diagnostic(code(qir_rt::ref_count_overflow))]
    RefCountOverflow {
        handle: OutcomeHandle,
        count: i32,
        delta: i32,
    },

    #[error("Result {handle} is still pending and has no value to display")]
    #[diagnostic(code(qir_rt::pending_result))]
    PendingResult { handle: OutcomeHandle },

    #[error("No execution context is active")]
    #[diagnostic(
        code(qir_rt::no_active_context),
        help("install one with ContextScope::enter or initialize_context")
    )]
    NoActiveContext,

    #[error("An execution context is already active; only one global context is supported")]
    #[diagnostic(code(qir_rt::context_already_active))]
    ContextAlreadyActive,

    #[error("Backend does not support restricted reuse areas")]
    #[diagnostic(code(qir_rt::restricted_area_unsupported))]
    RestrictedAreaUnsupported,

    #[error("Unknown qubit {handle}")]
    #[diagnostic(code(qir_rt::unknown_qubit))]
    UnknownQubit { handle: QubitHandle },

    #[error("Backend error: {message}")]
    #[diagnostic(code(qir_rt::backend_error))]
    Backend { message: String },

    #[error("I/O error: {0}")]
    #[diagnostic(code(qir_rt::io_error))]
    Io(String),

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(qir_rt::config_error))]
    Config { message: String },

    #[error("Invalid script: {message}")]
    #[diagnostic(code(qir_rt::script_parse_error))]
    ScriptParse { message: String },

    #[error("Failed to serialize report: {message}")]
    #[diagnostic(code(qir_rt::serialization_error))]
    Serialization { message: String },

    #[error("{count} result(s) still referenced at teardown")]
    #[diagnostic(
        code(qir_rt::leaked_results),
        help("set leak_policy to \"warn\" or \"ignore\" to accept leaks")
    )]
    Leaks { count: usize },

    #[error("Script step {step} failed: {message}")]
    #[diagnostic(code(qir_rt::script_error))]
    Script { step: usize, message: String },
}

impl Error {
    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend {
            message: message.into(),
        }
    }

    /// Create a script error for the given step
    pub fn script(step: usize, message: impl Into<String>) -> Self {
        Error::Script {
            step,
            message: message.into(),
        }
    }

    /// Whether this error is a calling-convention violation.
    ///
    /// These indicate a defect in the generated code or the backend and are
    /// never retried; the intrinsic layer treats them as fatal.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::UntrackedOverRelease { .. }
                | Error::NegativeRefCount { .. }
                | Error::RefCountOverflow { .. }
                | Error::PendingResult { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config {
            message: err.to_string(),
        }
    }
}

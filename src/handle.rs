//! Opaque handles minted by the backend
//!
//! The runtime never interprets these tokens. They are only compared by identity
//! and used as table keys; the backend decides what the raw token means.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a single measurement result owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeHandle(u64);

impl OutcomeHandle {
    /// Wrap a backend token
    pub const fn from_raw(token: u64) -> Self {
        Self(token)
    }

    /// The backend token behind this handle
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OutcomeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r#{:x}", self.0)
    }
}

/// Identifies an allocated qubit owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitHandle(u64);

impl QubitHandle {
    /// Wrap a backend token
    pub const fn from_raw(token: u64) -> Self {
        Self(token)
    }

    /// The backend token behind this handle
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QubitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q#{:x}", self.0)
    }
}

/// Realized value of a measurement result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultValue {
    Zero,
    One,
    /// The backend has not settled the value yet
    Pending,
}

impl ResultValue {
    /// Display text for a settled value, `None` while pending
    pub fn display_name(self) -> Option<&'static str> {
        match self {
            ResultValue::Zero => Some("Zero"),
            ResultValue::One => Some("One"),
            ResultValue::Pending => None,
        }
    }
}

impl From<bool> for ResultValue {
    fn from(bit: bool) -> Self {
        if bit {
            ResultValue::One
        } else {
            ResultValue::Zero
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(ResultValue::Zero.display_name(), Some("Zero"));
        assert_eq!(ResultValue::One.display_name(), Some("One"));
        assert_eq!(ResultValue::Pending.display_name(), None);
        assert_eq!(ResultValue::from(true), ResultValue::One);
    }

    #[test]
    fn test_handles_serialize_as_raw_token() {
        let json = serde_json::to_string(&OutcomeHandle::from_raw(7)).unwrap();
        assert_eq!(json, "7");
        let qubit: QubitHandle = serde_json::from_str("12").unwrap();
        assert_eq!(qubit.into_raw(), 12);
    }
}

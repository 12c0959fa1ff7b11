//! Deterministic classical backend
//!
//! Qubits hold plain bits, so only X and computational-basis measurement are
//! supported. Used for trace replay and for exercising the runtime in tests.

use super::{Backend, QuantumGateSet, RestrictedAreaManagement};
use crate::error::{Error, Result};
use crate::handle::{OutcomeHandle, QubitHandle, ResultValue};
use std::collections::HashMap;

const ZERO_TOKEN: u64 = 0;
const ONE_TOKEN: u64 = 1;
const FIRST_MEASURED_TOKEN: u64 = 2;

/// One open restricted reuse area
#[derive(Debug, Default)]
struct ReuseArea {
    /// Qubits released during the current segment
    parked: Vec<QubitHandle>,
    /// Qubits released in earlier segments, available for reuse
    reusable: Vec<QubitHandle>,
}

/// Classical (Toffoli-style) backend with release bookkeeping
#[derive(Debug)]
pub struct ClassicalBackend {
    /// Live qubits and their current bit
    qubits: HashMap<QubitHandle, bool>,
    /// Released qubits outside any area
    free_qubits: Vec<QubitHandle>,
    next_qubit: u64,
    /// Live measured results
    results: HashMap<OutcomeHandle, ResultValue>,
    next_result: u64,
    /// Release calls received per result
    release_counts: HashMap<OutcomeHandle, usize>,
    areas: Vec<ReuseArea>,
}

impl ClassicalBackend {
    pub fn new() -> Self {
        Self {
            qubits: HashMap::new(),
            free_qubits: Vec::new(),
            next_qubit: 0,
            results: HashMap::new(),
            next_result: FIRST_MEASURED_TOKEN,
            release_counts: HashMap::new(),
            areas: Vec::new(),
        }
    }

    fn is_canonical(result: OutcomeHandle) -> bool {
        matches!(result.into_raw(), ZERO_TOKEN | ONE_TOKEN)
    }

    fn mint_result(&mut self, value: ResultValue) -> OutcomeHandle {
        let handle = OutcomeHandle::from_raw(self.next_result);
        self.next_result += 1;
        self.results.insert(handle, value);
        handle
    }

    /// Mint a result whose value is not settled yet
    pub fn mint_pending(&mut self) -> OutcomeHandle {
        self.mint_result(ResultValue::Pending)
    }

    /// Settle a pending result
    pub fn settle(&mut self, result: OutcomeHandle, bit: bool) -> Result<()> {
        match self.results.get_mut(&result) {
            Some(value) => {
                *value = ResultValue::from(bit);
                Ok(())
            }
            None => Err(Error::backend(format!("cannot settle unknown result {}", result))),
        }
    }

    /// Number of release calls received for a result
    pub fn release_count(&self, result: OutcomeHandle) -> usize {
        self.release_counts.get(&result).copied().unwrap_or(0)
    }

    /// Total release calls received
    pub fn total_releases(&self) -> usize {
        self.release_counts.values().sum()
    }

    /// Measured results that have not been released
    pub fn live_results(&self) -> usize {
        self.results.len()
    }

    pub fn live_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Depth of nested restricted reuse areas
    pub fn area_depth(&self) -> usize {
        self.areas.len()
    }

    fn take_free_qubit(&mut self) -> Option<QubitHandle> {
        match self.areas.last_mut() {
            Some(area) => area.reusable.pop(),
            None => self.free_qubits.pop(),
        }
    }
}

impl Default for ClassicalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ClassicalBackend {
    fn name(&self) -> &str {
        "classical"
    }

    fn use_zero(&self) -> OutcomeHandle {
        OutcomeHandle::from_raw(ZERO_TOKEN)
    }

    fn use_one(&self) -> OutcomeHandle {
        OutcomeHandle::from_raw(ONE_TOKEN)
    }

    fn allocate_qubit(&mut self) -> Result<QubitHandle> {
        let qubit = match self.take_free_qubit() {
            Some(qubit) => qubit,
            None => {
                let qubit = QubitHandle::from_raw(self.next_qubit);
                self.next_qubit += 1;
                qubit
            }
        };
        self.qubits.insert(qubit, false);
        Ok(qubit)
    }

    fn release_qubit(&mut self, qubit: QubitHandle) -> Result<()> {
        if self.qubits.remove(&qubit).is_none() {
            return Err(Error::UnknownQubit { handle: qubit });
        }
        match self.areas.last_mut() {
            Some(area) => area.parked.push(qubit),
            None => self.free_qubits.push(qubit),
        }
        Ok(())
    }

    fn release_result(&mut self, result: OutcomeHandle) -> Result<()> {
        if !Self::is_canonical(result) && self.results.remove(&result).is_none() {
            return Err(Error::backend(format!(
                "result {} is unknown or already released",
                result
            )));
        }
        *self.release_counts.entry(result).or_insert(0) += 1;
        Ok(())
    }

    fn are_equal_results(&self, left: OutcomeHandle, right: OutcomeHandle) -> bool {
        let (left, right) = (self.result_value(left), self.result_value(right));
        left != ResultValue::Pending && left == right
    }

    fn result_value(&self, result: OutcomeHandle) -> ResultValue {
        match result.into_raw() {
            ZERO_TOKEN => ResultValue::Zero,
            ONE_TOKEN => ResultValue::One,
            _ => match self.results.get(&result) {
                Some(value) => *value,
                None => {
                    log::warn!("value requested for unknown result {}", result);
                    ResultValue::Pending
                }
            },
        }
    }

    fn qubit_to_string(&self, qubit: QubitHandle) -> String {
        format!("q{}", qubit.into_raw())
    }

    fn restricted_area_management(&mut self) -> Option<&mut dyn RestrictedAreaManagement> {
        Some(self)
    }

    fn gate_set(&mut self) -> Option<&mut dyn QuantumGateSet> {
        Some(self)
    }
}

impl RestrictedAreaManagement for ClassicalBackend {
    fn start_area(&mut self) -> Result<()> {
        self.areas.push(ReuseArea::default());
        Ok(())
    }

    fn next_segment(&mut self) -> Result<()> {
        let area = self
            .areas
            .last_mut()
            .ok_or_else(|| Error::backend("next segment requested outside a reuse area"))?;
        let parked = std::mem::take(&mut area.parked);
        area.reusable.extend(parked);
        Ok(())
    }

    fn end_area(&mut self) -> Result<()> {
        let area = self
            .areas
            .pop()
            .ok_or_else(|| Error::backend("end of reuse area without a matching start"))?;
        let released = area.parked.into_iter().chain(area.reusable);
        match self.areas.last_mut() {
            Some(outer) => outer.parked.extend(released),
            None => self.free_qubits.extend(released),
        }
        Ok(())
    }
}

impl QuantumGateSet for ClassicalBackend {
    fn x(&mut self, qubit: QubitHandle) -> Result<()> {
        let bit = self
            .qubits
            .get_mut(&qubit)
            .ok_or(Error::UnknownQubit { handle: qubit })?;
        *bit = !*bit;
        Ok(())
    }

    fn measure(&mut self, qubit: QubitHandle) -> Result<OutcomeHandle> {
        let bit = *self
            .qubits
            .get(&qubit)
            .ok_or(Error::UnknownQubit { handle: qubit })?;
        Ok(self.mint_result(ResultValue::from(bit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_mints_fresh_results() {
        let mut backend = ClassicalBackend::new();
        let q = backend.allocate_qubit().unwrap();
        let r0 = backend.measure(q).unwrap();
        backend.x(q).unwrap();
        let r1 = backend.measure(q).unwrap();

        assert_ne!(r0, r1);
        assert_eq!(backend.result_value(r0), ResultValue::Zero);
        assert_eq!(backend.result_value(r1), ResultValue::One);
        assert!(backend.are_equal_results(r0, backend.use_zero()));
        assert!(!backend.are_equal_results(r0, r1));
        assert_eq!(backend.live_results(), 2);
    }

    #[test]
    fn test_double_release_is_reported() {
        let mut backend = ClassicalBackend::new();
        let q = backend.allocate_qubit().unwrap();
        let r = backend.measure(q).unwrap();

        assert!(backend.release_result(r).is_ok());
        assert!(backend.release_result(r).is_err());
        assert_eq!(backend.release_count(r), 1);
    }

    #[test]
    fn test_canonical_results_survive_release() {
        let mut backend = ClassicalBackend::new();
        let zero = backend.use_zero();

        backend.release_result(zero).unwrap();
        backend.release_result(zero).unwrap();
        assert_eq!(backend.result_value(zero), ResultValue::Zero);
        assert_eq!(backend.release_count(zero), 2);
    }

    #[test]
    fn test_pending_results_are_never_equal() {
        let mut backend = ClassicalBackend::new();
        let a = backend.mint_pending();
        let b = backend.mint_pending();
        assert!(!backend.are_equal_results(a, b));

        backend.settle(a, true).unwrap();
        backend.settle(b, true).unwrap();
        assert!(backend.are_equal_results(a, b));
    }

    #[test]
    fn test_reuse_area_recycles_qubits_in_next_segment() {
        let mut backend = ClassicalBackend::new();
        backend.start_area().unwrap();
        let q0 = backend.allocate_qubit().unwrap();
        backend.release_qubit(q0).unwrap();

        // Parked until the segment ends
        let q1 = backend.allocate_qubit().unwrap();
        assert_ne!(q0, q1);

        backend.next_segment().unwrap();
        let q2 = backend.allocate_qubit().unwrap();
        assert_eq!(q0, q2);

        backend.release_qubit(q1).unwrap();
        backend.release_qubit(q2).unwrap();
        backend.end_area().unwrap();
        assert_eq!(backend.area_depth(), 0);
        assert_eq!(backend.live_qubits(), 0);
    }

    #[test]
    fn test_malformed_area_sequences_fail() {
        let mut backend = ClassicalBackend::new();
        assert!(backend.next_segment().is_err());
        assert!(backend.end_area().is_err());
    }

    #[test]
    fn test_release_unknown_qubit() {
        let mut backend = ClassicalBackend::new();
        let err = backend.release_qubit(QubitHandle::from_raw(9)).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownQubit {
                handle: QubitHandle::from_raw(9)
            }
        );
    }
}

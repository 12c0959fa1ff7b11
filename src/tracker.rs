//! Reference-count tracker for backend-owned results
//!
//! Generated code treats results as reference-counted values, but backends
//! only know how to release a result once. The tracker keeps the logical count
//! for every result that has been shared and calls the backend's release when
//! that count reaches zero.
//!
//! A result without a table entry has an implicit count of 1: it was produced
//! by a measurement and has not been shared yet. That default is never stored.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::handle::OutcomeHandle;
use serde::Serialize;
use std::collections::HashMap;

/// What a single count update did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefCountUpdate {
    /// Zero increment, nothing changed
    Unchanged,
    /// The result is tracked with the given count
    Tracked { count: i32 },
    /// The count reached zero and the backend released the result
    Released,
}

/// Table of logical reference counts, keyed by result handle.
///
/// Invariant: every stored count is at least 1.
#[derive(Debug, Default)]
pub struct RefCountTracker {
    counts: HashMap<OutcomeHandle, i32>,
}

impl RefCountTracker {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Apply `delta` to the logical count of `handle`.
    ///
    /// Releases the result through `backend` exactly when the count reaches
    /// zero. On a contract violation the table is left untouched and the
    /// backend is not called.
    pub fn update(
        &mut self,
        handle: OutcomeHandle,
        delta: i32,
        backend: &mut dyn Backend,
    ) -> Result<RefCountUpdate> {
        if delta == 0 {
            return Ok(RefCountUpdate::Unchanged);
        }

        if delta > 0 {
            let count = self.count(handle).unwrap_or(1);
            let new_count = count
                .checked_add(delta)
                .ok_or(Error::RefCountOverflow {
                    handle,
                    count,
                    delta,
                })?;
            self.counts.insert(handle, new_count);
            log::trace!("result {} shared, count now {}", handle, new_count);
            return Ok(RefCountUpdate::Tracked { count: new_count });
        }

        let Some(&count) = self.counts.get(&handle) else {
            // First release of a result that was never shared
            if delta != -1 {
                return Err(Error::UntrackedOverRelease { handle, delta });
            }
            return Self::release(handle, backend);
        };

        let new_count = count + delta;
        if new_count < 0 {
            return Err(Error::NegativeRefCount {
                handle,
                count,
                delta,
            });
        }
        if new_count == 0 {
            self.counts.remove(&handle);
            return Self::release(handle, backend);
        }

        self.counts.insert(handle, new_count);
        log::trace!("result {} unshared, count now {}", handle, new_count);
        Ok(RefCountUpdate::Tracked { count: new_count })
    }

    fn release(handle: OutcomeHandle, backend: &mut dyn Backend) -> Result<RefCountUpdate> {
        log::debug!("releasing result {} on backend {}", handle, backend.name());
        backend.release_result(handle)?;
        Ok(RefCountUpdate::Released)
    }

    /// Stored count for `handle`, `None` if it has never been shared
    pub fn count(&self, handle: OutcomeHandle) -> Option<i32> {
        self.counts.get(&handle).copied()
    }

    pub fn is_tracked(&self, handle: OutcomeHandle) -> bool {
        self.counts.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Tracked entries sorted by handle
    pub fn entries(&self) -> Vec<(OutcomeHandle, i32)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(h, c)| (*h, *c)).collect();
        entries.sort();
        entries
    }

    /// Drop every entry, returning what was still tracked
    pub fn clear(&mut self) -> Vec<(OutcomeHandle, i32)> {
        let entries = self.entries();
        self.counts.clear();
        entries
    }
}

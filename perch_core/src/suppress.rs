// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted document-wide markings.
//!
//! Several behaviors want to mark the document while they are active:
//! safe-polygon tracking disables pointer events under the cursor, and
//! modal focus traps mark everything outside the trap inert. Multiple
//! floating elements can be active at once, so these markings are
//! reference counted: a marking is applied on the first acquire and
//! removed only when the last holder releases it.

use hashbrown::HashMap;
use core::hash::Hash;

/// Per-key reference counts with edge reporting.
///
/// `acquire` and `release` report the 0→1 and 1→0 edges so callers apply
/// and remove the underlying marking exactly once.
#[derive(Clone, Debug)]
pub struct RefCounts<T> {
    counts: HashMap<T, u32>,
}

impl<T: Copy + Eq + Hash> Default for RefCounts<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq + Hash> RefCounts<T> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { counts: HashMap::new() }
    }

    /// Increment the count for `key`. Returns `true` when the count was
    /// zero, i.e. the marking must now be applied.
    pub fn acquire(&mut self, key: T) -> bool {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Decrement the count for `key`. Returns `true` when the count hit
    /// zero, i.e. the marking must now be removed. A release without a
    /// matching acquire is a no-op.
    pub fn release(&mut self, key: T) -> bool {
        match self.counts.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.counts.remove(&key);
                true
            }
            None => false,
        }
    }

    /// The current count for `key`.
    #[must_use]
    pub fn count(&self, key: T) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Whether any count is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Drop all counts. Used when the owning subsystem fully deactivates
    /// and the markings were removed wholesale.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Document-wide pointer-events suppression counter.
///
/// Safe-polygon tracking disables pointer events on content between the
/// reference and the floating element. Overlapping trackers share one
/// document, so the suppression is a single counted resource; the host
/// applies or clears the actual style when `acquire`/`release` report an
/// edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerSuppression {
    count: u32,
}

impl PointerSuppression {
    /// An inactive suppression.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Take a ticket. Returns `true` when suppression must be applied.
    pub fn acquire(&mut self) -> bool {
        self.count += 1;
        self.count == 1
    }

    /// Return a ticket. Returns `true` when suppression must be cleared.
    pub fn release(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        self.count == 0
    }

    /// Whether any ticket is outstanding.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_reports_first_edge_only() {
        let mut counts: RefCounts<u32> = RefCounts::new();
        assert!(counts.acquire(7));
        assert!(!counts.acquire(7));
        assert_eq!(counts.count(7), 2);
    }

    #[test]
    fn release_reports_last_edge_only() {
        let mut counts: RefCounts<u32> = RefCounts::new();
        counts.acquire(7);
        counts.acquire(7);
        assert!(!counts.release(7));
        assert!(counts.release(7));
        assert!(counts.is_empty());
    }

    #[test]
    fn unmatched_release_is_a_no_op() {
        let mut counts: RefCounts<u32> = RefCounts::new();
        assert!(!counts.release(7));
    }

    #[test]
    fn overlapping_holders_keep_marking_alive() {
        // Two traps marking the same node: the second release removes it.
        let mut counts: RefCounts<u32> = RefCounts::new();
        assert!(counts.acquire(1));
        assert!(!counts.acquire(1));
        assert!(!counts.release(1));
        assert_eq!(counts.count(1), 1);
        assert!(counts.release(1));
        assert_eq!(counts.count(1), 0);
    }

    #[test]
    fn pointer_suppression_counts_tickets() {
        let mut suppression = PointerSuppression::new();
        assert!(suppression.acquire());
        assert!(!suppression.acquire());
        assert!(suppression.is_active());
        assert!(!suppression.release());
        assert!(suppression.release());
        assert!(!suppression.is_active());
        assert!(!suppression.release());
    }
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside-content marking for modal traps.
//!
//! While a modal trap is engaged, everything outside the trapped subtree is
//! marked non-interactive. The host applies the actual mutation (the native
//! inert mechanism when supported, else `aria-hidden` plus guard sentinels);
//! this module decides which nodes to mark and reference-counts the marks so
//! overlapping traps compose.

use alloc::vec::Vec;
use core::hash::Hash;

use perch_core::{DomView, Marker, RefCounts};
use smallvec::SmallVec;

/// Reference-counted registry of outside marks.
///
/// One registry is shared by every trap on a document. A node's mark is
/// applied on the first acquiring trap and removed only when the last trap
/// holding it releases.
#[derive(Clone, Debug)]
pub struct MarkRegistry<K> {
    counts: RefCounts<K>,
}

impl<K: Copy + Eq + Hash> Default for MarkRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> MarkRegistry<K> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { counts: RefCounts::new() }
    }

    /// Count a mark on `node`. Returns `true` when the host must apply it.
    pub fn mark(&mut self, node: K) -> bool {
        self.counts.acquire(node)
    }

    /// Release a mark on `node`. Returns `true` when the host must remove it.
    pub fn unmark(&mut self, node: K) -> bool {
        self.counts.release(node)
    }

    /// Whether `node` currently carries any mark.
    #[must_use]
    pub fn is_marked(&self, node: K) -> bool {
        self.counts.count(node) > 0
    }

    /// Whether no marks are outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// The nodes outside the kept subtrees, shallowest cover first.
///
/// Walks up from each kept node and collects the siblings met along the way,
/// so the result is the smallest set of subtree roots that together cover
/// everything except the kept nodes and their ancestor chains. ARIA live
/// regions are never included; announcements must keep flowing while a trap
/// is up.
pub fn outside_nodes<K: Copy + Eq, D: DomView<K> + ?Sized>(dom: &D, keep: &[K]) -> Vec<K> {
    // Kept nodes plus every ancestor of a kept node stay unmarked; marking
    // an ancestor would take the kept subtree down with it.
    let mut spine: SmallVec<[K; 8]> = SmallVec::new();
    for &node in keep {
        if !spine.contains(&node) {
            spine.push(node);
        }
        let mut cursor = dom.parent_of(node);
        while let Some(parent) = cursor {
            if !spine.contains(&parent) {
                spine.push(parent);
            }
            cursor = dom.parent_of(parent);
        }
    }

    let mut out = Vec::new();
    for &node in keep {
        let mut cursor = dom.parent_of(node);
        while let Some(parent) = cursor {
            for child in dom.children_of(parent) {
                if spine.contains(&child)
                    || out.contains(&child)
                    || dom.has_marker(child, Marker::LiveRegion)
                {
                    continue;
                }
                out.push(child);
            }
            cursor = dom.parent_of(parent);
        }
    }
    out
}

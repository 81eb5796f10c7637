// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view of the host's element tree.
//!
//! Perch never holds element references. Everything it needs to know
//! about the host's tree is pulled on demand through [`DomView`], keyed
//! by the host's node key `K`. Hosts implement the methods their
//! features need; the defaults are the conservative answer for the rest.
//!
//! Several behaviors key off markers the host places on elements (focus
//! guard sentinels, the inert marking applied by focus traps, live
//! regions). The host reports them through [`DomView::has_marker`].

use alloc::vec::Vec;
use kurbo::{Point, Rect};

/// Scroll-related box metrics for the scrollbar-press heuristic.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Inner width excluding scrollbars.
    pub client_width: f64,
    /// Inner height excluding scrollbars.
    pub client_height: f64,
    /// Total scrollable width.
    pub scroll_width: f64,
    /// Total scrollable height.
    pub scroll_height: f64,
    /// Whether the element actually scrolls horizontally.
    pub scrollable_x: bool,
    /// Whether the element actually scrolls vertically.
    pub scrollable_y: bool,
}

impl ScrollMetrics {
    /// Whether a press at `offset` (relative to the padding box) landed
    /// on a scrollbar. Best effort: compares the offset against the
    /// client box on the scrollable axes, with the horizontal test
    /// mirrored under right-to-left direction.
    #[must_use]
    pub fn hit_scrollbar(&self, offset: Point, rtl: bool) -> bool {
        let can_x = self.scrollable_x && self.scroll_width > self.client_width;
        let can_y = self.scrollable_y && self.scroll_height > self.client_height;
        let x_hit = can_y
            && if rtl {
                offset.x <= self.scroll_width - self.client_width
            } else {
                offset.x > self.client_width
            };
        let y_hit = can_x && offset.y > self.client_height;
        x_hit || y_hit
    }
}

/// Markers the host places on elements for Perch to observe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// The element is (or is inside) content marked inert/hidden by a
    /// focus trap.
    Inert,
    /// A focus-guard sentinel before or after a trapped subtree.
    FocusGuard,
    /// The root of a floating element (set from the seeded prop bundle).
    FloatingRoot,
    /// An ARIA live region; never marked hidden by focus traps.
    LiveRegion,
}

/// Facts Perch pulls from the host's element tree.
///
/// All answers describe the tree *now*; nothing is cached across calls.
/// Stale keys (elements already unmounted) must answer as disconnected
/// rather than panic.
pub trait DomView<K: Copy + Eq> {
    /// The parent of `node`, `None` at the root.
    fn parent_of(&self, node: K) -> Option<K>;

    /// The children of `node`, in tree order. Only needed by focus traps
    /// computing outside content.
    fn children_of(&self, _node: K) -> Vec<K> {
        Vec::new()
    }

    /// Whether `node` is still attached to the tree.
    fn is_connected(&self, _node: K) -> bool {
        true
    }

    /// Whether `ancestor` contains `node` (inclusive).
    fn contains(&self, ancestor: K, node: K) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    /// The currently focused node, if any.
    fn active_element(&self) -> Option<K> {
        None
    }

    /// The viewport bounds of `node`.
    fn bounds(&self, _node: K) -> Option<Rect> {
        None
    }

    /// Scroll metrics of `node`, for the scrollbar-press heuristic.
    /// `None` opts out of the heuristic for this node.
    fn scroll_metrics(&self, _node: K) -> Option<ScrollMetrics> {
        None
    }

    /// Whether `node` lays out right-to-left.
    fn is_rtl(&self, _node: K) -> bool {
        false
    }

    /// Whether `node` is disabled for interaction purposes.
    fn is_disabled(&self, _node: K) -> bool {
        false
    }

    /// Whether `node` accepts text input (inputs, textareas,
    /// contenteditable). Gates Space-key click handling.
    fn is_typeable(&self, _node: K) -> bool {
        false
    }

    /// Whether the host marked `node` with `marker`.
    fn has_marker(&self, _node: K, _marker: Marker) -> bool {
        false
    }

    /// All nodes currently carrying `marker`. Used by outside-press
    /// detection to recognize elements injected next to a trapped
    /// subtree after render.
    fn marked_nodes(&self, _marker: Marker) -> Vec<K> {
        Vec::new()
    }

    /// The last ancestor of `node` before the tree root (the "top layer"
    /// container the node lives in).
    fn root_ancestor(&self, node: K) -> K {
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            if self.parent_of(parent).is_none() {
                return current;
            }
            current = parent;
        }
        current
    }
}

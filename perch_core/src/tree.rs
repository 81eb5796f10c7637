// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of nested floating elements.
//!
//! Menus-in-menus, popovers opened from dialogs, and similar stacks form a
//! tree. The tree is an explicit arena keyed by [`NodeId`]; parenthood is a
//! plain id pointer, so dismissal and focus logic can walk ancestors and
//! descendants without holding references into sessions. Each node carries
//! the snapshots those walks need: the open flag, the per-node dismissal
//! bubbling policy, and the reference/floating element handles.
//!
//! Readers must tolerate structural change between calls; nothing here
//! hands out a snapshot that survives a mutation.

use alloc::vec::Vec;
use hashbrown::HashMap;

/// Identifier of a node in a [`FloatingTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Per-node record in the floating tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeNode<K> {
    /// Parent node, `None` for roots.
    pub parent: Option<NodeId>,
    /// Whether this node's floating element is open.
    pub open: bool,
    /// Whether an Escape press may also dismiss this node's ancestors.
    pub escape_bubbles: bool,
    /// Whether an outside press may also dismiss this node's ancestors.
    pub outside_press_bubbles: bool,
    /// The node's reference element, once mounted.
    pub reference: Option<K>,
    /// The node's floating element, once mounted.
    pub floating: Option<K>,
}

/// Arena of floating-element nodes with id parent pointers.
#[derive(Clone, Debug)]
pub struct FloatingTree<K> {
    nodes: HashMap<NodeId, TreeNode<K>>,
    next: u64,
}

impl<K> Default for FloatingTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FloatingTree<K> {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: HashMap::new(), next: 0 }
    }

    /// Insert a new node under `parent` (`None` for a root).
    ///
    /// A dangling `parent` id is accepted; the node simply behaves as a
    /// root until its parent is (re)inserted, matching the tolerance
    /// required of readers.
    pub fn insert(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        self.nodes.insert(
            id,
            TreeNode {
                parent,
                open: false,
                escape_bubbles: false,
                outside_press_bubbles: true,
                reference: None,
                floating: None,
            },
        );
        id
    }

    /// Remove a node. Children keep their (now dangling) parent pointer.
    pub fn remove(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set a node's open flag.
    pub fn set_open(&mut self, id: NodeId, open: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.open = open;
        }
    }

    /// Set a node's dismissal bubbling policy.
    pub fn set_bubbles(&mut self, id: NodeId, escape: bool, outside_press: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.escape_bubbles = escape;
            node.outside_press_bubbles = outside_press;
        }
    }

    /// Set a node's element handles.
    pub fn set_handles(&mut self, id: NodeId, reference: Option<K>, floating: Option<K>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.reference = reference;
            node.floating = floating;
        }
    }

    /// The record for `id`, if it is live.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode<K>> {
        self.nodes.get(&id)
    }

    /// The parent of `id`.
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Ancestors of `id`, nearest first. Stops at a dangling parent.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(parent) = cursor {
            if !self.nodes.contains_key(&parent) {
                break;
            }
            out.push(parent);
            cursor = self.parent_of(parent);
            // A reparenting cycle would loop forever; bail once we have
            // seen more nodes than exist.
            if out.len() > self.nodes.len() {
                debug_assert!(false, "cycle in floating tree parents");
                break;
            }
        }
        out
    }

    /// All transitive children of `id`, in breadth-first order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut frontier = alloc::vec![id];
        while let Some(current) = frontier.pop() {
            for (&candidate, node) in &self.nodes {
                if node.parent == Some(current) && !out.contains(&candidate) {
                    out.push(candidate);
                    frontier.push(candidate);
                }
            }
        }
        out
    }

    /// Whether `id` is a transitive child of `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }
}

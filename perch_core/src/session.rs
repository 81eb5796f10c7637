// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The open/close state of one floating element.
//!
//! A [`Session`] owns the single `open` flag for a floating element, the
//! snapshot of the event that opened it, and a typed event queue through
//! which behaviors coordinate. Every transition goes through
//! [`Session::apply_open_change`]; there is no other way to flip `open`,
//! so every subscriber observes every transition exactly once and in
//! order.

use alloc::collections::VecDeque;

use crate::input::OpenEvent;
use crate::tree::NodeId;

/// Why the open state changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenChangeReason {
    /// Hover open/close (delays, rest detection).
    Hover,
    /// Cursor left the safe polygon.
    SafePolygon,
    /// Reference focus gained/lost.
    Focus,
    /// Focus moved to an unrelated element.
    FocusOut,
    /// Click/press toggle on the reference.
    Click,
    /// Escape key dismissal.
    EscapeKey,
    /// Press outside the floating element.
    OutsidePress,
    /// Press on the reference while open.
    ReferencePress,
    /// A scroll ancestor scrolled.
    AncestorScroll,
    /// List navigation opened or closed a nested node.
    ListNavigation,
    /// A delay group closed a sibling.
    DelayGroup,
}

/// What dismissed the floating element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DismissKind {
    /// Press outside the floating element and its tree.
    OutsidePress,
    /// Press on the reference.
    ReferencePress,
    /// Escape key.
    EscapeKey,
    /// Cursor left the floating element.
    MouseLeave,
}

/// What the focus manager should do with focus after a dismissal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReturnFocus {
    /// Leave focus where it is.
    Suppress,
    /// Restore focus to the previously focused element.
    Restore,
    /// Restore focus without scrolling it into view.
    RestorePreventScroll,
}

/// A dismissal, published on the session channel before the close itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DismissEvent {
    /// What dismissed the element.
    pub kind: DismissKind,
    /// Focus policy for the dismissal.
    pub return_focus: ReturnFocus,
}

/// Events published on a session's typed channel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A dismissal is about to close the element.
    Dismiss(DismissEvent),
    /// The open state changed.
    OpenChange {
        /// The new state.
        open: bool,
        /// Why it changed.
        reason: OpenChangeReason,
    },
    /// The typeahead typing flag changed.
    TypingChange(bool),
}

/// Open/close state and coordination channel for one floating element.
///
/// Generic over the host's node key `K`. The host sets the reference and
/// floating handles as its view layer mounts them; behaviors read them and
/// tolerate `None` (not yet mounted).
#[derive(Clone, Debug)]
pub struct Session<K> {
    open: bool,
    open_event: Option<OpenEvent>,
    reference: Option<K>,
    floating: Option<K>,
    node_id: Option<NodeId>,
    parent_id: Option<NodeId>,
    typing: bool,
    queue: VecDeque<SessionEvent>,
}

impl<K> Default for Session<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Session<K> {
    /// A closed session with no handles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: false,
            open_event: None,
            reference: None,
            floating: None,
            node_id: None,
            parent_id: None,
            typing: false,
            queue: VecDeque::new(),
        }
    }

    /// Whether the floating element is open.
    #[must_use]
    pub fn open(&self) -> bool {
        self.open
    }

    /// Snapshot of the event that opened the element, if it is open and
    /// the opener recorded one.
    #[must_use]
    pub fn open_event(&self) -> Option<OpenEvent> {
        self.open_event
    }

    /// Whether typeahead is mid-word. While set, Space and Enter belong to
    /// the typeahead, and Escape is ignored by dismissal.
    #[must_use]
    pub fn typing(&self) -> bool {
        self.typing
    }

    /// Position of this session in the floating tree, if it is part of one.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }

    /// The parent node in the floating tree, fixed at creation.
    #[must_use]
    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    /// Attach this session to a floating-tree node.
    pub fn set_tree_position(&mut self, node_id: NodeId, parent_id: Option<NodeId>) {
        self.node_id = Some(node_id);
        self.parent_id = parent_id;
    }

    /// Set the reference and floating element handles.
    pub fn set_handles(&mut self, reference: Option<K>, floating: Option<K>) {
        self.reference = reference;
        self.floating = floating;
    }

    /// The single entry point for open/close transitions.
    ///
    /// A no-op when `next` equals the current state. Publishes exactly one
    /// [`SessionEvent::OpenChange`] per transition. `open_event` is the
    /// trigger snapshot for opens; it is cleared on close.
    pub fn apply_open_change(
        &mut self,
        next: bool,
        reason: OpenChangeReason,
        open_event: Option<OpenEvent>,
    ) {
        if self.open == next {
            return;
        }
        self.open = next;
        self.open_event = if next { open_event } else { None };
        self.queue.push_back(SessionEvent::OpenChange { open: next, reason });
    }

    /// Replace the trigger snapshot without changing open state. Used
    /// when a second trigger re-seats an already open element, e.g. a
    /// click landing on a hover-opened element.
    pub fn refresh_open_event(&mut self, open_event: Option<OpenEvent>) {
        if self.open {
            self.open_event = open_event;
        }
    }

    /// Publish a dismissal. Callers publish this *before* the
    /// corresponding close so subscribers see the dismissal first.
    pub fn publish_dismiss(&mut self, event: DismissEvent) {
        self.queue.push_back(SessionEvent::Dismiss(event));
    }

    /// Set the typing flag, publishing a change event on transitions.
    pub fn set_typing(&mut self, typing: bool) {
        if self.typing != typing {
            self.typing = typing;
            self.queue.push_back(SessionEvent::TypingChange(typing));
        }
    }

    /// Pop the next queued session event, oldest first.
    pub fn pop_event(&mut self) -> Option<SessionEvent> {
        self.queue.pop_front()
    }
}

impl<K: Copy> Session<K> {
    /// The reference (anchor) element handle.
    #[must_use]
    pub fn reference(&self) -> Option<K> {
        self.reference
    }

    /// The floating element handle.
    #[must_use]
    pub fn floating(&self) -> Option<K> {
        self.floating
    }
}

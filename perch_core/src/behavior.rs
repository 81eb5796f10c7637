// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The behavior seam.
//!
//! Interaction behaviors (hover, click, dismiss, list navigation, ...)
//! implement [`Behavior`] and are driven by a composer that fans each
//! input to every enabled behavior in registration order, then to the
//! caller's own handler last. Behaviors never touch the host's element
//! tree: they read it through [`DomView`] and emit [`Action`] values for
//! the host to apply.

use kurbo::Point;

use alloc::vec::Vec;

use crate::dom::DomView;
use crate::input::Input;
use crate::props::Contribution;
use crate::session::{DismissEvent, OpenChangeReason, Session, SessionEvent};
use crate::tree::FloatingTree;

/// Which target an input was observed on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventScope {
    /// The reference (anchor) element.
    Reference,
    /// The floating element.
    Floating,
    /// A list item, by index.
    Item(usize),
    /// A document-level listener (outside presses, global key handling,
    /// safe-polygon tracking).
    Document,
}

/// A side effect for the host to apply.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action<K> {
    /// The session's open state changed.
    OpenChanged {
        /// The new state.
        open: bool,
        /// Why it changed.
        reason: OpenChangeReason,
    },
    /// A dismissal occurred (published before the matching close).
    Dismissed(DismissEvent),
    /// The typeahead typing flag changed.
    TypingChanged(bool),
    /// Move real focus to `node`.
    Focus {
        /// Node to focus.
        node: K,
        /// Skip scrolling it into view.
        prevent_scroll: bool,
    },
    /// The active list index changed (`None` clears it).
    Navigate {
        /// The new active index.
        index: Option<usize>,
    },
    /// Scroll the item at `index` into view.
    ScrollItemIntoView {
        /// Item index.
        index: usize,
    },
    /// Acquire (`active: true`) or release one document-wide
    /// pointer-events suppression ticket. The host counts tickets across
    /// sessions, e.g. with [`crate::PointerSuppression`], and applies the
    /// style only on 0↔1 edges.
    PointerSuppression {
        /// True to acquire a ticket, false to release it.
        active: bool,
    },
    /// The anchor point for the positioning engine changed (client-point
    /// tracking).
    AnchorPoint {
        /// New anchor in viewport coordinates.
        point: Point,
    },
    /// Cancel the input's default effect.
    PreventDefault,
    /// Stop the input from propagating past the host's listener.
    StopPropagation,
}

/// Ordered side effects accumulated during one dispatch.
#[derive(Clone, Debug, Default)]
pub struct Actions<K> {
    items: Vec<Action<K>>,
}

impl<K> Actions<K> {
    /// An empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an action.
    pub fn push(&mut self, action: Action<K>) {
        self.items.push(action);
    }

    /// The accumulated actions, in emission order.
    #[must_use]
    pub fn as_slice(&self) -> &[Action<K>] {
        &self.items
    }

    /// Drain the accumulated actions.
    pub fn drain(&mut self) -> impl Iterator<Item = Action<K>> + '_ {
        self.items.drain(..)
    }

    /// Whether nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Marker result for a handler that claimed an input.
///
/// All handlers run regardless; the composer reports the first claim to
/// the caller, mirroring a composed-handler return value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Handled;

/// A configuration combination that silently misbehaves.
///
/// Misconfiguration never fails an operation; the feature simply does not
/// engage. Configurable components report these from their `validate`
/// methods so hosts can surface them during development.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigIssue {
    /// `allow_escape` steps past the list ends, which needs looping.
    AllowEscapeRequiresLooping,
    /// `allow_escape` clears the active item; real focus has nowhere to
    /// go, so virtual focus is required.
    AllowEscapeRequiresVirtual,
    /// Rest detection only runs when the open delay is zero.
    RestIgnoredWithOpenDelay,
}

/// Shared read/write context for one dispatch.
#[derive(Debug)]
pub struct Ctx<'a, K: Copy + Eq, D: DomView<K> + ?Sized> {
    /// The host's element tree.
    pub dom: &'a D,
    /// The floating tree this session belongs to, if nested.
    pub tree: Option<&'a FloatingTree<K>>,
}

impl<'a, K: Copy + Eq, D: DomView<K> + ?Sized> Ctx<'a, K, D> {
    /// A context without a floating tree.
    pub fn new(dom: &'a D) -> Self {
        Self { dom, tree: None }
    }

    /// A context for a session nested in `tree`.
    pub fn with_tree(dom: &'a D, tree: &'a FloatingTree<K>) -> Self {
        Self { dom, tree: Some(tree) }
    }
}

/// One interaction behavior.
///
/// Behaviors are plain state machines: events in, actions out, deadlines
/// polled by the host. A disabled behavior contributes nothing and sees
/// no events, but still receives session events so it can reset itself.
pub trait Behavior<K: Copy + Eq, D: DomView<K> + ?Sized> {
    /// Whether the behavior participates in dispatch and contribution.
    fn is_enabled(&self) -> bool {
        true
    }

    /// This behavior's props for the current session state.
    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        Contribution::default()
    }

    /// Handle one input. Return [`Handled`] to claim it.
    fn on_event(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        _session: &mut Session<K>,
        _scope: EventScope,
        _input: &Input<K>,
        _now: u64,
        _out: &mut Actions<K>,
    ) -> Option<Handled> {
        None
    }

    /// Observe a session event (dismiss, open change, typing change).
    /// Called for every behavior, enabled or not, in registration order.
    fn on_session_event(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        _session: &mut Session<K>,
        _event: &SessionEvent,
        _now: u64,
        _out: &mut Actions<K>,
    ) {
    }

    /// The earliest pending deadline, if any.
    fn next_deadline(&self) -> Option<u64> {
        None
    }

    /// Run work due at `now`. Only called when a deadline is pending.
    fn on_deadline(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        _session: &mut Session<K>,
        _now: u64,
        _out: &mut Actions<K>,
    ) {
    }
}

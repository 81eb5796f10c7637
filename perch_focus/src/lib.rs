// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch Focus: the focus-trap state machine for floating elements.
//!
//! A [`FocusManager`] tracks one floating element's trap through the phases
//! `Inactive → Activating → Trapped → Releasing → Inactive`. The host drives
//! it: it reports open/close transitions, Tab presses, guard-sentinel focus,
//! and focus-out events, and applies the [`FocusCommand`] values the manager
//! emits (focus moves, tab-index updates, outside-content marks). DOM facts
//! come from [`DomView`](perch_core::DomView) and the ordered-tabbable query
//! from a host-supplied [`TabbableQuery`]; the manager caches neither.
//!
//! Initial focus placement is deferred: opening only records a snapshot, and
//! the host calls [`FocusManager::flush`] once layout has settled so
//! tab-index assignment is visible to the tabbable query. Closing before the
//! flush cancels the placement.
//!
//! Modal traps mark everything outside the trapped subtree non-interactive
//! through a shared, reference-counted [`MarkRegistry`], so overlapping
//! traps compose and a mark is removed only when its last holder releases.
//!
//! ```
//! use perch_core::Session;
//! use perch_focus::{FocusCommand, FocusManager, MarkRegistry, TabbableQuery, TrapConfig};
//!
//! struct Dom;
//! impl perch_core::DomView<u32> for Dom {
//!     fn parent_of(&self, node: u32) -> Option<u32> {
//!         (node != 0).then_some(0)
//!     }
//!     fn active_element(&self) -> Option<u32> {
//!         Some(1)
//!     }
//! }
//! impl TabbableQuery<u32> for Dom {
//!     fn tabbable(&self, container: u32) -> Vec<u32> {
//!         (container == 2).then(|| vec![3, 4]).unwrap_or_default()
//!     }
//! }
//!
//! let mut session: Session<u32> = Session::new();
//! session.set_handles(Some(1), Some(2));
//! let dom = Dom;
//! let mut manager = FocusManager::new(TrapConfig::default());
//! let mut registry = MarkRegistry::new();
//! let mut out = Vec::new();
//!
//! manager.on_open(&dom);
//! manager.flush(&session, &dom, &dom, &mut registry, &mut out);
//! assert!(out.contains(&FocusCommand::Focus { node: 3, prevent_scroll: false }));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

use alloc::vec::Vec;
use core::hash::Hash;

use perch_core::{
    DismissKind, DomView, Marker, OpenChangeReason, ReturnFocus, Session, SessionEvent,
};

mod hidden;

pub use hidden::{MarkRegistry, outside_nodes};

/// The ordered tabbable-elements query, supplied by the host.
///
/// Results must reflect the current element tree at call time; the manager
/// re-queries on every decision and never caches across calls.
pub trait TabbableQuery<K: Copy + Eq> {
    /// The ordered tabbable descendants of `container`.
    fn tabbable(&self, container: K) -> Vec<K>;

    /// The descendant of `container` marked for autofocus, if any.
    fn autofocus(&self, _container: K) -> Option<K> {
        None
    }
}

/// A slot in the modal tab cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderTarget {
    /// The reference element.
    Reference,
    /// The floating root itself.
    Floating,
    /// The tabbable content inside the floating element.
    Content,
}

/// Where initial focus goes when the trap activates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InitialFocus<K> {
    /// The nth tabbable content element (autofocus-marked content wins for
    /// index zero), falling back to the floating root.
    Index(usize),
    /// A specific node.
    Node(K),
    /// Leave focus alone; a companion list-navigation behavior owns it.
    Ignore,
}

/// Which guard sentinel received focus.
///
/// Guards sit immediately before and after the trapped content so Tab at the
/// very edges re-enters the trap instead of escaping to browser UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GuardSide {
    /// The sentinel before the trap; reached by Shift+Tab past the start.
    Before,
    /// The sentinel after the trap; reached by Tab past the end.
    After,
}

/// Trap lifecycle phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Disabled or closed.
    Inactive,
    /// Open, initial focus placement pending a [`FocusManager::flush`].
    Activating,
    /// Containment engaged.
    Trapped,
    /// Close in progress, focus being restored.
    Releasing,
}

/// Trap configuration.
#[derive(Clone, Debug)]
pub struct TrapConfig<K> {
    /// Whether the trap engages at all.
    pub enabled: bool,
    /// Modal containment: Tab wraps inside the trap and outside content is
    /// marked non-interactive. Non-modal traps dismiss on focus-out instead.
    pub modal: bool,
    /// The modal tab cycle.
    pub order: Vec<OrderTarget>,
    /// Initial focus placement.
    pub initial_focus: InitialFocus<K>,
    /// Whether guard sentinels surround the trapped content.
    pub guards: bool,
    /// Whether focus returns to the previously focused element on release.
    pub return_focus: bool,
    /// Non-modal only: when focus falls to the document body, re-focus the
    /// last tabbable content index instead of dismissing.
    pub restore_focus: bool,
}

impl<K> Default for TrapConfig<K> {
    fn default() -> Self {
        Self {
            enabled: true,
            modal: true,
            order: alloc::vec![OrderTarget::Content],
            initial_focus: InitialFocus::Index(0),
            guards: true,
            return_focus: true,
            restore_focus: false,
        }
    }
}

/// A side effect for the host to apply.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusCommand<K> {
    /// Move real focus to `node`.
    Focus {
        /// The node to focus.
        node: K,
        /// Suppress scrolling the node into view.
        prevent_scroll: bool,
    },
    /// Set the tab index on `node`.
    SetTabIndex {
        /// The node to update.
        node: K,
        /// The tab-index value.
        value: i8,
    },
    /// Consume the platform event being translated.
    PreventDefault,
    /// Mark the subtree at `node` non-interactive (native inert when
    /// supported, else `aria-hidden` plus guards).
    MarkOutside(K),
    /// Remove the outside mark from `node`.
    UnmarkOutside(K),
}

/// The focus-trap state machine for one floating element.
///
/// See the crate docs for the host protocol.
#[derive(Clone, Debug)]
pub struct FocusManager<K> {
    config: TrapConfig<K>,
    phase: Phase,
    previously_focused: Option<K>,
    pointer_down: bool,
    return_override: Option<ReturnFocus>,
    retarget_reference: bool,
    last_content_index: Option<usize>,
    marked: Vec<K>,
}

impl<K: Copy + Eq + Hash> FocusManager<K> {
    /// Creates an inactive manager.
    #[must_use]
    pub fn new(config: TrapConfig<K>) -> Self {
        Self {
            config,
            phase: Phase::Inactive,
            previously_focused: None,
            pointer_down: false,
            return_override: None,
            retarget_reference: false,
            last_content_index: None,
            marked: Vec::new(),
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The element focus will be restored to on release, as captured at
    /// activation.
    #[must_use]
    pub fn previously_focused(&self) -> Option<K> {
        self.previously_focused
    }

    /// Reports that the session opened. Snapshots the focused element and
    /// defers placement to [`flush`](Self::flush).
    pub fn on_open<D: DomView<K> + ?Sized>(&mut self, dom: &D) {
        if !self.config.enabled {
            return;
        }
        self.phase = Phase::Activating;
        self.previously_focused = dom.active_element();
        self.return_override = None;
        self.retarget_reference = false;
        self.last_content_index = None;
    }

    /// Places initial focus and engages containment. The host calls this
    /// after layout settles so tab-index assignment is visible to `tabbable`.
    pub fn flush<D, Q>(
        &mut self,
        session: &Session<K>,
        dom: &D,
        tabbable: &Q,
        registry: &mut MarkRegistry<K>,
        out: &mut Vec<FocusCommand<K>>,
    ) where
        D: DomView<K> + ?Sized,
        Q: TabbableQuery<K> + ?Sized,
    {
        if self.phase != Phase::Activating {
            return;
        }
        let Some(floating) = session.floating() else {
            return;
        };
        let content = tabbable.tabbable(floating);

        let already_inside = dom
            .active_element()
            .is_some_and(|active| dom.contains(floating, active));
        if !already_inside {
            let target = match self.config.initial_focus {
                InitialFocus::Ignore => None,
                InitialFocus::Node(node) if dom.is_connected(node) => Some(node),
                InitialFocus::Node(_) => Some(floating),
                InitialFocus::Index(0) => Some(
                    tabbable
                        .autofocus(floating)
                        .or_else(|| content.first().copied())
                        .unwrap_or(floating),
                ),
                InitialFocus::Index(i) => {
                    Some(content.get(i).copied().unwrap_or(floating))
                }
            };
            if let Some(node) = target {
                out.push(FocusCommand::Focus { node, prevent_scroll: false });
            }
        }

        self.phase = Phase::Trapped;
        self.sync_root_tab_index(session, tabbable, out);

        if self.config.modal {
            let mut keep = alloc::vec![floating];
            if self.config.order.contains(&OrderTarget::Reference)
                && let Some(reference) = session.reference()
            {
                keep.push(reference);
            }
            for node in outside_nodes(dom, &keep) {
                if registry.mark(node) {
                    out.push(FocusCommand::MarkOutside(node));
                }
                self.marked.push(node);
            }
        }
    }

    /// Handles a Tab press while trapped. Returns `true` when the press was
    /// consumed (the manager wrapped focus and emitted [`PreventDefault`]).
    ///
    /// [`PreventDefault`]: FocusCommand::PreventDefault
    pub fn on_tab<D, Q>(
        &mut self,
        session: &Session<K>,
        dom: &D,
        tabbable: &Q,
        shift: bool,
        out: &mut Vec<FocusCommand<K>>,
    ) -> bool
    where
        D: DomView<K> + ?Sized,
        Q: TabbableQuery<K> + ?Sized,
    {
        if !self.config.modal || self.phase != Phase::Trapped {
            return false;
        }
        let Some(floating) = session.floating() else {
            return false;
        };
        let cycle = self.tab_cycle(session, tabbable);
        if cycle.is_empty() {
            out.push(FocusCommand::PreventDefault);
            out.push(FocusCommand::Focus { node: floating, prevent_scroll: false });
            return true;
        }
        let Some(active) = dom.active_element() else {
            return false;
        };
        let first = cycle[0];
        let last = cycle[cycle.len() - 1];
        if !shift && active == last {
            out.push(FocusCommand::PreventDefault);
            out.push(FocusCommand::Focus { node: first, prevent_scroll: false });
            return true;
        }
        if shift && active == first {
            out.push(FocusCommand::PreventDefault);
            out.push(FocusCommand::Focus { node: last, prevent_scroll: false });
            return true;
        }
        false
    }

    /// Handles focus landing on a guard sentinel by re-entering the trap at
    /// the opposite edge.
    pub fn on_guard<Q>(
        &mut self,
        session: &Session<K>,
        tabbable: &Q,
        side: GuardSide,
        out: &mut Vec<FocusCommand<K>>,
    ) where
        Q: TabbableQuery<K> + ?Sized,
    {
        if !self.config.guards || self.phase != Phase::Trapped {
            return;
        }
        let cycle = self.tab_cycle(session, tabbable);
        let target = match side {
            GuardSide::Before => cycle.last().copied(),
            GuardSide::After => cycle.first().copied(),
        };
        let node = target.or_else(|| session.floating());
        if let Some(node) = node {
            out.push(FocusCommand::Focus { node, prevent_scroll: false });
        }
    }

    /// Notes a pointer-down anywhere in the document. The next focus-out
    /// check is suppressed; platform focus churn from a press must not
    /// dismiss a non-modal trap.
    pub fn note_pointer_down(&mut self) {
        self.pointer_down = true;
    }

    /// Notes that tabbable content index `index` gained focus, for
    /// [`TrapConfig::restore_focus`].
    pub fn note_content_focus(&mut self, index: usize) {
        self.last_content_index = Some(index);
    }

    /// Handles a non-modal focus-out. `related` is the node gaining focus,
    /// when known. Dismisses the session when focus moved to a node
    /// unrelated to the trap or its floating-tree chain.
    pub fn on_focus_out<D, Q>(
        &mut self,
        ctx: &perch_core::Ctx<'_, K, D>,
        session: &mut Session<K>,
        tabbable: &Q,
        related: Option<K>,
        out: &mut Vec<FocusCommand<K>>,
    ) where
        D: DomView<K> + ?Sized,
        Q: TabbableQuery<K> + ?Sized,
    {
        if !self.config.enabled || self.config.modal || self.phase != Phase::Trapped {
            self.pointer_down = false;
            return;
        }
        if core::mem::take(&mut self.pointer_down) {
            return;
        }
        let Some(node) = related else {
            // Focus fell to the document body.
            if self.config.restore_focus
                && let Some(floating) = session.floating()
            {
                let content = tabbable.tabbable(floating);
                let target = self
                    .last_content_index
                    .and_then(|i| content.get(i.min(content.len().saturating_sub(1))))
                    .copied()
                    .unwrap_or(floating);
                out.push(FocusCommand::Focus { node: target, prevent_scroll: false });
            }
            return;
        };
        if self.is_related(ctx, session, node) {
            return;
        }
        session.apply_open_change(false, OpenChangeReason::FocusOut, None);
    }

    /// Observes the session channel. Dismissals override the release-time
    /// return-focus policy; an escape-key dismissal retargets restoration to
    /// the reference.
    pub fn on_session_event(&mut self, event: &SessionEvent) {
        if let SessionEvent::Dismiss(dismiss) = event {
            self.return_override = Some(dismiss.return_focus);
            if dismiss.kind == DismissKind::EscapeKey {
                self.retarget_reference = true;
            }
        }
    }

    /// Releases the trap: removes outside marks and restores focus.
    ///
    /// The host calls this after the session closed. Restoration is skipped
    /// when the dismissal suppressed it or when focus already moved outside
    /// the trap intentionally.
    pub fn release<D>(
        &mut self,
        session: &Session<K>,
        dom: &D,
        registry: &mut MarkRegistry<K>,
        out: &mut Vec<FocusCommand<K>>,
    ) where
        D: DomView<K> + ?Sized,
    {
        if self.phase == Phase::Inactive {
            return;
        }
        self.phase = Phase::Releasing;

        for node in self.marked.drain(..) {
            if registry.unmark(node) {
                out.push(FocusCommand::UnmarkOutside(node));
            }
        }

        if self.config.return_focus {
            let policy = self.return_override.unwrap_or(ReturnFocus::Restore);
            if policy != ReturnFocus::Suppress {
                let press_open =
                    session.open_event().is_some_and(|event| event.is_press_like());
                let target = if self.retarget_reference || press_open {
                    session.reference()
                } else {
                    self.previously_focused
                };
                let moved_away = dom.active_element().is_some_and(|active| {
                    Some(active) != self.previously_focused
                        && !session.floating().is_some_and(|f| dom.contains(f, active))
                        && !session.reference().is_some_and(|r| dom.contains(r, active))
                });
                if !moved_away
                    && let Some(node) = target
                    && dom.is_connected(node)
                {
                    out.push(FocusCommand::Focus {
                        node,
                        prevent_scroll: policy == ReturnFocus::RestorePreventScroll,
                    });
                }
            }
        }

        self.phase = Phase::Inactive;
        self.previously_focused = None;
        self.return_override = None;
        self.retarget_reference = false;
        self.last_content_index = None;
        self.pointer_down = false;
    }

    /// Re-emits the floating root's tab index. The host calls this whenever
    /// the floating subtree mutates: the root must stay reachable (0) when
    /// it has no tabbable content or sits in the configured order, else -1.
    pub fn sync_root_tab_index<Q>(
        &self,
        session: &Session<K>,
        tabbable: &Q,
        out: &mut Vec<FocusCommand<K>>,
    ) where
        Q: TabbableQuery<K> + ?Sized,
    {
        let Some(floating) = session.floating() else {
            return;
        };
        let reachable = self.config.order.contains(&OrderTarget::Floating)
            || tabbable.tabbable(floating).is_empty();
        out.push(FocusCommand::SetTabIndex {
            node: floating,
            value: if reachable { 0 } else { -1 },
        });
    }

    fn tab_cycle<Q>(&self, session: &Session<K>, tabbable: &Q) -> Vec<K>
    where
        Q: TabbableQuery<K> + ?Sized,
    {
        let mut cycle = Vec::new();
        for target in &self.config.order {
            match target {
                OrderTarget::Reference => {
                    if let Some(reference) = session.reference() {
                        cycle.push(reference);
                    }
                }
                OrderTarget::Floating => {
                    if let Some(floating) = session.floating() {
                        cycle.push(floating);
                    }
                }
                OrderTarget::Content => {
                    if let Some(floating) = session.floating() {
                        cycle.extend(tabbable.tabbable(floating));
                    }
                }
            }
        }
        cycle
    }

    fn is_related<D>(
        &self,
        ctx: &perch_core::Ctx<'_, K, D>,
        session: &Session<K>,
        node: K,
    ) -> bool
    where
        D: DomView<K> + ?Sized,
    {
        if ctx.dom.has_marker(node, Marker::FocusGuard) {
            return true;
        }
        if session.reference().is_some_and(|r| ctx.dom.contains(r, node))
            || session.floating().is_some_and(|f| ctx.dom.contains(f, node))
        {
            return true;
        }
        // Nested floating elements: focus moving along the open
        // ancestor/descendant chain stays inside the interaction.
        if let (Some(tree), Some(id)) = (ctx.tree, session.node_id()) {
            let mut chain = tree.ancestors(id);
            chain.extend(tree.descendants(id));
            for other in chain {
                let Some(entry) = tree.node(other) else {
                    continue;
                };
                if entry.reference.is_some_and(|r| ctx.dom.contains(r, node))
                    || entry.floating.is_some_and(|f| ctx.dom.contains(f, node))
                {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use perch_core::{Ctx, DismissEvent, FloatingTree, OpenEvent, PointerType, TriggerKind};

    // 0
    // ├── 1 (reference)
    // ├── 2 (floating) ── 3, 4 (tabbable content)
    // └── 5 (sibling)
    struct Dom {
        active: Option<u32>,
        content: Vec<u32>,
        autofocus: Option<u32>,
        guards: Vec<u32>,
    }

    impl Dom {
        fn new() -> Self {
            Self { active: Some(1), content: vec![3, 4], autofocus: None, guards: Vec::new() }
        }
    }

    impl DomView<u32> for Dom {
        fn parent_of(&self, node: u32) -> Option<u32> {
            match node {
                1 | 2 | 5 => Some(0),
                3 | 4 => Some(2),
                _ => None,
            }
        }

        fn children_of(&self, node: u32) -> Vec<u32> {
            match node {
                0 => vec![1, 2, 5],
                2 => self.content.clone(),
                _ => Vec::new(),
            }
        }

        fn active_element(&self) -> Option<u32> {
            self.active
        }

        fn has_marker(&self, node: u32, marker: Marker) -> bool {
            marker == Marker::FocusGuard && self.guards.contains(&node)
        }
    }

    impl TabbableQuery<u32> for Dom {
        fn tabbable(&self, container: u32) -> Vec<u32> {
            if container == 2 { self.content.clone() } else { Vec::new() }
        }

        fn autofocus(&self, container: u32) -> Option<u32> {
            (container == 2).then_some(self.autofocus).flatten()
        }
    }

    fn session() -> Session<u32> {
        let mut session = Session::new();
        session.set_handles(Some(1), Some(2));
        session
    }

    fn activate(
        manager: &mut FocusManager<u32>,
        session: &Session<u32>,
        dom: &Dom,
        registry: &mut MarkRegistry<u32>,
    ) -> Vec<FocusCommand<u32>> {
        let mut out = Vec::new();
        manager.on_open(dom);
        manager.flush(session, dom, dom, registry, &mut out);
        out
    }

    #[test]
    fn activation_focuses_the_first_tabbable() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let out = activate(&mut manager, &session(), &Dom::new(), &mut MarkRegistry::new());
        assert!(out.contains(&FocusCommand::Focus { node: 3, prevent_scroll: false }));
        assert_eq!(manager.phase(), Phase::Trapped);
        assert_eq!(manager.previously_focused(), Some(1));
    }

    #[test]
    fn autofocus_content_wins_the_default_placement() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let mut dom = Dom::new();
        dom.autofocus = Some(4);
        let out = activate(&mut manager, &session(), &dom, &mut MarkRegistry::new());
        assert!(out.contains(&FocusCommand::Focus { node: 4, prevent_scroll: false }));
    }

    #[test]
    fn placement_is_skipped_when_focus_is_already_inside() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let mut dom = Dom::new();
        dom.active = Some(4);
        let out = activate(&mut manager, &session(), &dom, &mut MarkRegistry::new());
        assert!(!out.iter().any(|c| matches!(c, FocusCommand::Focus { .. })));
        assert_eq!(manager.phase(), Phase::Trapped);
    }

    #[test]
    fn ignore_leaves_placement_to_list_navigation() {
        let mut manager = FocusManager::new(TrapConfig {
            initial_focus: InitialFocus::Ignore,
            ..TrapConfig::default()
        });
        let out = activate(&mut manager, &session(), &Dom::new(), &mut MarkRegistry::new());
        assert!(!out.iter().any(|c| matches!(c, FocusCommand::Focus { .. })));
    }

    #[test]
    fn empty_content_focuses_the_floating_root() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let mut dom = Dom::new();
        dom.content = Vec::new();
        let out = activate(&mut manager, &session(), &dom, &mut MarkRegistry::new());
        assert!(out.contains(&FocusCommand::Focus { node: 2, prevent_scroll: false }));
        // Root must stay keyboard reachable.
        assert!(out.contains(&FocusCommand::SetTabIndex { node: 2, value: 0 }));
    }

    #[test]
    fn modal_activation_marks_outside_content() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let mut registry = MarkRegistry::new();
        let out = activate(&mut manager, &session(), &Dom::new(), &mut registry);
        assert!(out.contains(&FocusCommand::MarkOutside(5)));
        assert!(out.contains(&FocusCommand::MarkOutside(1)));
        assert!(!out.contains(&FocusCommand::MarkOutside(2)));
        assert!(registry.is_marked(5));
    }

    #[test]
    fn reference_in_the_order_stays_unmarked() {
        let mut manager = FocusManager::new(TrapConfig {
            order: vec![OrderTarget::Reference, OrderTarget::Content],
            ..TrapConfig::default()
        });
        let out = activate(&mut manager, &session(), &Dom::new(), &mut MarkRegistry::new());
        assert!(!out.contains(&FocusCommand::MarkOutside(1)));
        assert!(out.contains(&FocusCommand::MarkOutside(5)));
    }

    #[test]
    fn tab_wraps_at_both_edges() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let session = session();
        let mut dom = Dom::new();
        let mut registry = MarkRegistry::new();
        activate(&mut manager, &session, &dom, &mut registry);

        dom.active = Some(4);
        let mut out = Vec::new();
        assert!(manager.on_tab(&session, &dom, &dom, false, &mut out));
        assert!(out.contains(&FocusCommand::PreventDefault));
        assert!(out.contains(&FocusCommand::Focus { node: 3, prevent_scroll: false }));

        dom.active = Some(3);
        let mut out = Vec::new();
        assert!(manager.on_tab(&session, &dom, &dom, true, &mut out));
        assert!(out.contains(&FocusCommand::Focus { node: 4, prevent_scroll: false }));

        // Mid-cycle presses are the platform's to handle.
        dom.active = Some(3);
        let mut out = Vec::new();
        assert!(!manager.on_tab(&session, &dom, &dom, false, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn guards_reenter_at_the_opposite_edge() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let session = session();
        let dom = Dom::new();
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        let mut out = Vec::new();
        manager.on_guard(&session, &dom, GuardSide::Before, &mut out);
        assert!(out.contains(&FocusCommand::Focus { node: 4, prevent_scroll: false }));

        let mut out = Vec::new();
        manager.on_guard(&session, &dom, GuardSide::After, &mut out);
        assert!(out.contains(&FocusCommand::Focus { node: 3, prevent_scroll: false }));
    }

    fn non_modal() -> TrapConfig<u32> {
        TrapConfig { modal: false, ..TrapConfig::default() }
    }

    #[test]
    fn non_modal_focus_out_to_an_unrelated_node_dismisses() {
        let mut manager = FocusManager::new(non_modal());
        let mut session = session();
        session.apply_open_change(true, OpenChangeReason::Click, None);
        let dom = Dom::new();
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        let ctx = Ctx::new(&dom);
        let mut out = Vec::new();
        manager.on_focus_out(&ctx, &mut session, &dom, Some(5), &mut out);
        assert!(!session.open());
    }

    #[test]
    fn focus_out_into_the_floating_element_keeps_it_open() {
        let mut manager = FocusManager::new(non_modal());
        let mut session = session();
        session.apply_open_change(true, OpenChangeReason::Click, None);
        let dom = Dom::new();
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        let ctx = Ctx::new(&dom);
        let mut out = Vec::new();
        manager.on_focus_out(&ctx, &mut session, &dom, Some(4), &mut out);
        assert!(session.open());
    }

    #[test]
    fn focus_out_onto_a_guard_keeps_it_open() {
        let mut manager = FocusManager::new(non_modal());
        let mut session = session();
        session.apply_open_change(true, OpenChangeReason::Click, None);
        let mut dom = Dom::new();
        dom.guards = vec![5];
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        let ctx = Ctx::new(&dom);
        let mut out = Vec::new();
        manager.on_focus_out(&ctx, &mut session, &dom, Some(5), &mut out);
        assert!(session.open());
    }

    #[test]
    fn a_pointer_down_suppresses_the_next_focus_out() {
        let mut manager = FocusManager::new(non_modal());
        let mut session = session();
        session.apply_open_change(true, OpenChangeReason::Click, None);
        let dom = Dom::new();
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        manager.note_pointer_down();
        let ctx = Ctx::new(&dom);
        let mut out = Vec::new();
        manager.on_focus_out(&ctx, &mut session, &dom, Some(5), &mut out);
        assert!(session.open(), "focus churn from the press is not a dismissal");

        manager.on_focus_out(&ctx, &mut session, &dom, Some(5), &mut out);
        assert!(!session.open(), "the suppression lasts one check");
    }

    #[test]
    fn focus_out_along_the_tree_chain_keeps_it_open() {
        let mut manager = FocusManager::new(non_modal());
        let mut session = session();
        session.apply_open_change(true, OpenChangeReason::Click, None);
        let dom = Dom::new();
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        let mut tree = FloatingTree::new();
        let parent = tree.insert(None);
        let child = tree.insert(Some(parent));
        tree.set_handles(child, Some(4), Some(5));
        session.set_tree_position(parent, None);

        let ctx = Ctx::with_tree(&dom, &tree);
        let mut out = Vec::new();
        // Node 5 is the child's floating element here.
        manager.on_focus_out(&ctx, &mut session, &dom, Some(5), &mut out);
        assert!(session.open());
    }

    #[test]
    fn restore_focus_catches_a_fall_to_the_body() {
        let mut manager = FocusManager::new(TrapConfig {
            restore_focus: true,
            ..non_modal()
        });
        let mut session = session();
        session.apply_open_change(true, OpenChangeReason::Click, None);
        let dom = Dom::new();
        activate(&mut manager, &session, &dom, &mut MarkRegistry::new());

        manager.note_content_focus(1);
        let ctx = Ctx::new(&dom);
        let mut out = Vec::new();
        manager.on_focus_out(&ctx, &mut session, &dom, None, &mut out);
        assert!(session.open());
        assert!(out.contains(&FocusCommand::Focus { node: 4, prevent_scroll: false }));
    }

    #[test]
    fn release_restores_the_previously_focused_element() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let mut session = session();
        let mut dom = Dom::new();
        dom.active = Some(5);
        let mut registry = MarkRegistry::new();
        activate(&mut manager, &session, &dom, &mut registry);
        session.apply_open_change(true, OpenChangeReason::Click, None);
        session.apply_open_change(false, OpenChangeReason::OutsidePress, None);

        // Focus is trapped inside while open.
        dom.active = Some(3);
        let mut out = Vec::new();
        manager.release(&session, &dom, &mut registry, &mut out);
        assert!(out.contains(&FocusCommand::Focus { node: 5, prevent_scroll: false }));
        assert!(out.contains(&FocusCommand::UnmarkOutside(5)));
        assert_eq!(manager.phase(), Phase::Inactive);
        assert!(registry.is_empty());
    }

    #[test]
    fn a_suppressing_dismissal_skips_restoration() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let session = session();
        let dom = Dom::new();
        let mut registry = MarkRegistry::new();
        activate(&mut manager, &session, &dom, &mut registry);

        manager.on_session_event(&SessionEvent::Dismiss(DismissEvent {
            kind: DismissKind::ReferencePress,
            return_focus: ReturnFocus::Suppress,
        }));
        let mut out = Vec::new();
        manager.release(&session, &dom, &mut registry, &mut out);
        assert!(!out.iter().any(|c| matches!(c, FocusCommand::Focus { .. })));
    }

    #[test]
    fn an_escape_dismissal_retargets_the_reference() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let session = session();
        let mut dom = Dom::new();
        dom.active = Some(5);
        let mut registry = MarkRegistry::new();
        activate(&mut manager, &session, &dom, &mut registry);

        manager.on_session_event(&SessionEvent::Dismiss(DismissEvent {
            kind: DismissKind::EscapeKey,
            return_focus: ReturnFocus::Restore,
        }));
        dom.active = Some(3);
        let mut out = Vec::new();
        manager.release(&session, &dom, &mut registry, &mut out);
        assert!(out.contains(&FocusCommand::Focus { node: 1, prevent_scroll: false }));
    }

    #[test]
    fn a_press_like_open_restores_to_the_reference() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let mut session = session();
        let mut dom = Dom::new();
        dom.active = Some(5);
        let mut registry = MarkRegistry::new();
        activate(&mut manager, &session, &dom, &mut registry);
        session.apply_open_change(
            true,
            OpenChangeReason::Click,
            Some(OpenEvent { kind: TriggerKind::Click, pointer_type: Some(PointerType::Mouse) }),
        );

        dom.active = Some(3);
        let mut out = Vec::new();
        manager.release(&session, &dom, &mut registry, &mut out);
        assert!(out.contains(&FocusCommand::Focus { node: 1, prevent_scroll: false }));
    }

    #[test]
    fn an_intentional_focus_move_is_left_alone() {
        let mut manager = FocusManager::new(TrapConfig::default());
        let session = session();
        let mut dom = Dom::new();
        dom.active = Some(1);
        let mut registry = MarkRegistry::new();
        activate(&mut manager, &session, &dom, &mut registry);

        // Something outside the trap took focus before the release.
        dom.active = Some(5);
        let mut out = Vec::new();
        manager.release(&session, &dom, &mut registry, &mut out);
        assert!(!out.iter().any(|c| matches!(c, FocusCommand::Focus { .. })));
    }

    #[test]
    fn tab_index_follows_content_and_order() {
        let session = session();
        let dom = Dom::new();
        let manager = FocusManager::new(TrapConfig::default());
        let mut out = Vec::new();
        manager.sync_root_tab_index(&session, &dom, &mut out);
        assert!(out.contains(&FocusCommand::SetTabIndex { node: 2, value: -1 }));

        let manager = FocusManager::new(TrapConfig {
            order: vec![OrderTarget::Floating, OrderTarget::Content],
            ..TrapConfig::default()
        });
        let mut out = Vec::new();
        manager.sync_root_tab_index(&session, &dom, &mut out);
        assert!(out.contains(&FocusCommand::SetTabIndex { node: 2, value: 0 }));
    }

    #[test]
    fn overlapping_traps_share_outside_marks() {
        let mut registry = MarkRegistry::new();
        let dom = Dom::new();
        let session_a = session();
        let mut session_b = Session::new();
        session_b.set_handles(Some(1), Some(2));

        let mut outer = FocusManager::new(TrapConfig::default());
        let mut inner = FocusManager::new(TrapConfig::default());
        let first = activate(&mut outer, &session_a, &dom, &mut registry);
        let second = activate(&mut inner, &session_b, &dom, &mut registry);
        assert!(first.contains(&FocusCommand::MarkOutside(5)));
        assert!(!second.contains(&FocusCommand::MarkOutside(5)), "already marked");

        let mut out = Vec::new();
        inner.release(&session_b, &dom, &mut registry, &mut out);
        assert!(!out.contains(&FocusCommand::UnmarkOutside(5)));
        assert!(registry.is_marked(5));

        let mut out = Vec::new();
        outer.release(&session_a, &dom, &mut registry, &mut out);
        assert!(out.contains(&FocusCommand::UnmarkOutside(5)));
    }
}

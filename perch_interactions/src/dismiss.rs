// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dismissal: Escape, outside press, reference press, ancestor scroll.

use perch_core::{
    Action, Actions, Behavior, Contribution, Ctx, DismissEvent, DismissKind, DomView, EventKind,
    EventScope, Handled, Input, Key, Marker, NodeId, OpenChangeReason, ReturnFocus, Session,
};

/// Which press event counts for outside/reference presses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PressEvent {
    /// The initial press. Dismisses eagerly, before the release.
    #[default]
    PointerDown,
    /// The synthesized click after release.
    Click,
}

impl PressEvent {
    fn matches<K>(self, input: &Input<K>) -> bool {
        match self {
            Self::PointerDown => matches!(input, Input::PointerDown { .. }),
            Self::Click => matches!(input, Input::Click { .. }),
        }
    }
}

/// Whether a dismissal also propagates to ancestor floating elements.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DismissBubbles {
    /// Escape presses. Default false: one Escape closes one level.
    pub escape_key: bool,
    /// Outside presses. Default true: one outside press closes the whole
    /// stack.
    pub outside_press: bool,
}

impl Default for DismissBubbles {
    fn default() -> Self {
        Self {
            escape_key: false,
            outside_press: true,
        }
    }
}

/// Configuration for [`DismissBehavior`].
#[derive(Copy, Clone, Debug)]
pub struct DismissConfig {
    /// Whether the behavior participates at all.
    pub enabled: bool,
    /// Dismiss on Escape.
    pub escape_key: bool,
    /// Dismiss on presses outside the reference and floating element.
    pub outside_press: bool,
    /// Which press event counts as an outside press.
    pub outside_press_event: PressEvent,
    /// Dismiss when the reference itself is pressed.
    pub reference_press: bool,
    /// Which press event counts as a reference press.
    pub reference_press_event: PressEvent,
    /// Dismiss when an overflow ancestor of the reference or floating
    /// element scrolls. The host routes those scrolls here with
    /// [`EventScope::Document`].
    pub ancestor_scroll: bool,
    /// Propagation policy within a floating tree.
    pub bubbles: DismissBubbles,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            escape_key: true,
            outside_press: true,
            outside_press_event: PressEvent::default(),
            reference_press: false,
            reference_press_event: PressEvent::default(),
            ancestor_scroll: false,
            bubbles: DismissBubbles::default(),
        }
    }
}

/// Closes the floating element on Escape, outside presses, reference
/// presses, or ancestor scroll.
///
/// The host must deliver presses observed inside the floating element with
/// their [`EventScope::Floating`]/[`EventScope::Item`] scope *before* the
/// document-level copy of the same press; the behavior marks the press as
/// inside and skips the outside-press path for it.
pub struct DismissBehavior {
    config: DismissConfig,
    /// The current press started inside the floating element.
    inside_press: bool,
}

impl DismissBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(config: DismissConfig) -> Self {
        Self {
            config,
            inside_press: false,
        }
    }

    /// Open descendants of this session's node, if it is in a tree.
    fn open_children<K: Copy + Eq, D: DomView<K> + ?Sized>(
        ctx: &Ctx<'_, K, D>,
        session: &Session<K>,
    ) -> alloc::vec::Vec<NodeId> {
        match (ctx.tree, session.node_id()) {
            (Some(tree), Some(id)) => tree
                .descendants(id)
                .into_iter()
                .filter(|child| tree.node(*child).is_some_and(|n| n.open))
                .collect(),
            _ => alloc::vec::Vec::new(),
        }
    }

    fn dismiss<K: Copy + Eq>(
        session: &mut Session<K>,
        kind: DismissKind,
        return_focus: ReturnFocus,
        reason: OpenChangeReason,
    ) {
        session.publish_dismiss(DismissEvent { kind, return_focus });
        session.apply_open_change(false, reason, None);
    }

    fn on_escape<K: Copy + Eq, D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &mut Session<K>,
        out: &mut Actions<K>,
    ) -> Option<Handled> {
        if !session.open() || !self.config.escape_key {
            return None;
        }
        // A typeahead in flight owns the keyboard.
        if session.typing() {
            return None;
        }
        let children = Self::open_children(ctx, session);
        if !self.config.bubbles.escape_key {
            out.push(Action::StopPropagation);
            // An open child that does not bubble handles its own Escape.
            if let Some(tree) = ctx.tree {
                if children
                    .iter()
                    .any(|child| tree.node(*child).is_some_and(|n| !n.escape_bubbles))
                {
                    return None;
                }
            }
        }
        Self::dismiss(
            session,
            DismissKind::EscapeKey,
            ReturnFocus::Restore,
            OpenChangeReason::EscapeKey,
        );
        Some(Handled)
    }

    fn on_outside_press<K: Copy + Eq, D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &mut Session<K>,
        input: &Input<K>,
    ) -> Option<Handled> {
        let inside = core::mem::take(&mut self.inside_press);
        if !session.open() || !self.config.outside_press || inside {
            return None;
        }
        let target = input.target()?;
        // A press on a scrollbar scrolls; it does not dismiss.
        if let (Some(metrics), Some(pointer)) = (ctx.dom.scroll_metrics(target), input.pointer()) {
            if metrics.hit_scrollbar(pointer.offset, ctx.dom.is_rtl(target)) {
                return None;
            }
        }
        // Elements injected next to an open trap (toasts and the like) are
        // marked inert by the trap. A press inside a top-layer container
        // holding no such marker targets one of those injected elements,
        // not true outside content.
        let markers = ctx.dom.marked_nodes(Marker::Inert);
        if !markers.is_empty() && ctx.dom.parent_of(target).is_some() {
            let inside_floating = session
                .floating()
                .is_some_and(|f| ctx.dom.contains(target, f));
            let root = ctx.dom.root_ancestor(target);
            if !inside_floating && markers.iter().all(|m| !ctx.dom.contains(root, *m)) {
                return None;
            }
        }
        // Presses inside this element, its reference, or any open child
        // floating element are not outside.
        let within = |node: Option<K>| node.is_some_and(|n| ctx.dom.contains(n, target));
        if within(session.floating()) || within(session.reference()) {
            return None;
        }
        if let Some(tree) = ctx.tree {
            let children = Self::open_children(ctx, session);
            for child in &children {
                if within(tree.node(*child).and_then(|n| n.floating)) {
                    return None;
                }
            }
            // An open child that declared itself non-bubbling owns this
            // press; the parent stays up.
            if children
                .iter()
                .any(|child| tree.node(*child).is_some_and(|n| !n.outside_press_bubbles))
            {
                return None;
            }
        }
        let return_focus = if session.parent_id().is_some() {
            ReturnFocus::RestorePreventScroll
        } else {
            ReturnFocus::Restore
        };
        Self::dismiss(
            session,
            DismissKind::OutsidePress,
            return_focus,
            OpenChangeReason::OutsidePress,
        );
        Some(Handled)
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for DismissBehavior {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        contribution.reference.subscribe(EventKind::KeyDown);
        contribution.floating.subscribe(EventKind::KeyDown);
        let press = match self.config.outside_press_event {
            PressEvent::PointerDown => EventKind::PointerDown,
            PressEvent::Click => EventKind::Click,
        };
        contribution.floating.subscribe(press);
        if self.config.reference_press {
            let press = match self.config.reference_press_event {
                PressEvent::PointerDown => EventKind::PointerDown,
                PressEvent::Click => EventKind::Click,
            };
            contribution.reference.subscribe(press);
        }
        contribution
    }

    fn on_event(
        &mut self,
        ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        scope: EventScope,
        input: &Input<K>,
        _now: u64,
        out: &mut Actions<K>,
    ) -> Option<Handled> {
        if let Input::KeyDown { key: Key::Escape, .. } = input {
            return self.on_escape(ctx, session, out);
        }
        match scope {
            EventScope::Floating | EventScope::Item(_) => {
                if self.config.outside_press_event.matches(input) {
                    self.inside_press = true;
                }
                None
            }
            EventScope::Reference => {
                if self.config.reference_press
                    && self.config.reference_press_event.matches(input)
                    && session.open()
                {
                    Self::dismiss(
                        session,
                        DismissKind::ReferencePress,
                        ReturnFocus::Suppress,
                        OpenChangeReason::ReferencePress,
                    );
                    return Some(Handled);
                }
                None
            }
            EventScope::Document => match input {
                Input::Scroll { .. } => {
                    if self.config.ancestor_scroll && session.open() {
                        session.apply_open_change(false, OpenChangeReason::AncestorScroll, None);
                        return Some(Handled);
                    }
                    None
                }
                _ if self.config.outside_press_event.matches(input) => {
                    self.on_outside_press(ctx, session, input)
                }
                _ => None,
            },
        }
    }
}

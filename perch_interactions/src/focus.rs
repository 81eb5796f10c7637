// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open on reference focus, close when focus leaves.

use perch_core::{
    Actions, Behavior, Contribution, Ctx, DismissKind, DomView, EventKind, EventScope, Handled,
    Input, Marker, OpenChangeReason, OpenEvent, Session, SessionEvent, TriggerKind,
};

/// Configuration for [`FocusBehavior`].
#[derive(Copy, Clone, Debug)]
pub struct FocusConfig {
    /// Whether the behavior participates at all.
    pub enabled: bool,
    /// Only open for keyboard-driven ("focus-visible") focus. Pointer
    /// presses on the reference set a block that swallows the focus event
    /// they cause.
    pub keyboard_only: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keyboard_only: true,
        }
    }
}

/// Opens when the reference gains focus and closes when focus moves
/// somewhere outside the reference and floating element.
pub struct FocusBehavior {
    config: FocusConfig,
    /// Swallow the next reference focus event (pointer-caused focus,
    /// refocus after a window blur, focus returned by a dismissal).
    block_focus: bool,
}

impl FocusBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            block_focus: false,
        }
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for FocusBehavior {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        for kind in [
            EventKind::PointerDown,
            EventKind::PointerLeave,
            EventKind::FocusIn,
            EventKind::FocusOut,
        ] {
            contribution.reference.subscribe(kind);
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
        _out: &mut Actions<K>,
    ) -> Option<Handled> {
        if let Input::WindowBlur = input {
            // The window lost focus while the reference held it: when it
            // comes back the browser refocuses the reference, which must
            // not reopen anything.
            let reference_focused = session
                .reference()
                .is_some_and(|r| ctx.dom.active_element() == Some(r));
            if !session.open() && reference_focused {
                self.block_focus = true;
            }
            return None;
        }
        if scope != EventScope::Reference {
            return None;
        }
        match input {
            Input::PointerDown { .. } => {
                self.block_focus = self.config.keyboard_only;
                None
            }
            Input::PointerLeave { .. } => {
                self.block_focus = false;
                None
            }
            Input::FocusIn { .. } => {
                if self.block_focus {
                    return None;
                }
                // A press-opened element refocusing its reference must not
                // re-seat the open as focus-driven.
                if session
                    .open_event()
                    .is_some_and(|e| e.kind == TriggerKind::PointerDown)
                {
                    return None;
                }
                session.apply_open_change(
                    true,
                    OpenChangeReason::Focus,
                    OpenEvent::from_input(input),
                );
                Some(Handled)
            }
            Input::FocusOut { related, .. } => {
                self.block_focus = false;
                let related = *related;
                let moved_to_guard =
                    related.is_some_and(|r| ctx.dom.has_marker(r, Marker::FocusGuard));
                let still_inside = related.is_some_and(|r| {
                    session.floating().is_some_and(|f| ctx.dom.contains(f, r))
                        || session.reference().is_some_and(|n| ctx.dom.contains(n, r))
                });
                if moved_to_guard || still_inside {
                    return None;
                }
                session.apply_open_change(false, OpenChangeReason::FocusOut, None);
                Some(Handled)
            }
            _ => None,
        }
    }

    fn on_session_event(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        _session: &mut Session<K>,
        event: &SessionEvent,
        _now: u64,
        _out: &mut Actions<K>,
    ) {
        // A dismissal that returns focus to the reference must not
        // immediately reopen from that focus.
        if let SessionEvent::Dismiss(dismiss) = event {
            if matches!(
                dismiss.kind,
                DismissKind::ReferencePress | DismissKind::EscapeKey
            ) {
                self.block_focus = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use perch_core::{DismissEvent, PointerState, ReturnFocus};

    struct Dom {
        parents: alloc::vec::Vec<Option<u32>>,
        active: Option<u32>,
        guards: alloc::vec::Vec<u32>,
    }

    impl DomView<u32> for Dom {
        fn parent_of(&self, node: u32) -> Option<u32> {
            self.parents.get(node as usize).copied().flatten()
        }

        fn active_element(&self) -> Option<u32> {
            self.active
        }

        fn has_marker(&self, node: u32, marker: Marker) -> bool {
            marker == Marker::FocusGuard && self.guards.contains(&node)
        }
    }

    // Nodes: 0 root, 1 reference, 2 floating, 3 inside floating, 4 outside.
    fn dom() -> Dom {
        Dom {
            parents: alloc::vec![None, Some(0), Some(0), Some(2), Some(0)],
            active: None,
            guards: alloc::vec::Vec::new(),
        }
    }

    fn session() -> Session<u32> {
        let mut session = Session::new();
        session.set_handles(Some(1), Some(2));
        session
    }

    fn drive(
        focus: &mut FocusBehavior,
        session: &mut Session<u32>,
        dom: &Dom,
        scope: EventScope,
        input: &Input<u32>,
    ) {
        let mut ctx = Ctx::new(dom);
        let mut out = Actions::new();
        let _ = focus.on_event(&mut ctx, session, scope, input, 0, &mut out);
    }

    #[test]
    fn keyboard_focus_opens() {
        let dom = dom();
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        assert!(session.open());
    }

    #[test]
    fn pointer_caused_focus_is_blocked_when_keyboard_only() {
        let dom = dom();
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::PointerDown { target: 1, pointer: PointerState::mouse(Point::ZERO) },
        );
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        assert!(!session.open());
    }

    #[test]
    fn focus_moving_into_the_floating_element_keeps_open() {
        let dom = dom();
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusOut { target: 1, related: Some(3) },
        );
        assert!(session.open());
    }

    #[test]
    fn focus_leaving_entirely_closes() {
        let dom = dom();
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusOut { target: 1, related: Some(4) },
        );
        assert!(!session.open());
    }

    #[test]
    fn focus_moving_to_a_guard_keeps_open() {
        let mut dom = dom();
        dom.guards.push(4);
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusOut { target: 1, related: Some(4) },
        );
        assert!(session.open());
    }

    #[test]
    fn window_blur_with_focused_reference_blocks_the_refocus() {
        let mut dom = dom();
        dom.active = Some(1);
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        drive(&mut focus, &mut session, &dom, EventScope::Document, &Input::WindowBlur);
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        assert!(!session.open());
    }

    #[test]
    fn dismissal_blocks_the_returned_focus() {
        let dom = dom();
        let mut focus = FocusBehavior::new(FocusConfig::default());
        let mut session = session();
        let mut ctx = Ctx::new(&dom);
        let mut out = Actions::new();
        focus.on_session_event(
            &mut ctx,
            &mut session,
            &SessionEvent::Dismiss(DismissEvent {
                kind: DismissKind::EscapeKey,
                return_focus: ReturnFocus::Restore,
            }),
            0,
            &mut out,
        );
        drive(
            &mut focus,
            &mut session,
            &dom,
            EventScope::Reference,
            &Input::FocusIn { target: 1, related: None },
        );
        assert!(!session.open());
    }
}

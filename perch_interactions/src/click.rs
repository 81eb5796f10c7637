// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click (and keyboard-activation) open/toggle.

use perch_core::{
    Actions, Behavior, Contribution, Ctx, DomView, EventKind, EventScope, Handled, Input, Key,
    OpenChangeReason, OpenEvent, PointerType, Session, TriggerKind,
};
use perch_core::Action;

/// Which event opens the element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ClickTrigger {
    /// The synthesized click after release.
    #[default]
    Click,
    /// The initial press.
    PointerDown,
}

/// Configuration for [`ClickBehavior`].
#[derive(Copy, Clone, Debug)]
pub struct ClickConfig {
    /// Whether the behavior participates at all.
    pub enabled: bool,
    /// Which event opens.
    pub trigger: ClickTrigger,
    /// Close again when activated while open.
    pub toggle: bool,
    /// Ignore mouse-like pointers, e.g. when hover already covers mice.
    pub ignore_mouse: bool,
    /// Handle Enter and Space on references that are not native buttons.
    pub keyboard_handlers: bool,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger: ClickTrigger::default(),
            toggle: true,
            ignore_mouse: false,
            keyboard_handlers: true,
        }
    }
}

/// Opens on click or press, toggling closed when configured.
pub struct ClickBehavior {
    config: ClickConfig,
    pointer_type: Option<PointerType>,
    /// Space was pressed down on the reference and not yet released.
    did_key_down: bool,
}

impl ClickBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(config: ClickConfig) -> Self {
        Self {
            config,
            pointer_type: None,
            did_key_down: false,
        }
    }

    /// Toggle-close only unseats an open that came from the same trigger;
    /// an externally set open (no trigger snapshot) always toggles.
    fn toggles_closed<K>(&self, session: &Session<K>, kind: TriggerKind) -> bool {
        self.config.toggle && session.open_event().is_none_or(|e| e.kind == kind)
    }

    fn toggle<K: Copy + Eq>(&self, session: &mut Session<K>, input: &Input<K>, kind: TriggerKind) {
        if session.open() {
            if self.toggles_closed(session, kind) {
                session.apply_open_change(false, OpenChangeReason::Click, None);
            } else {
                session.refresh_open_event(OpenEvent::from_input(input));
            }
        } else {
            session.apply_open_change(true, OpenChangeReason::Click, OpenEvent::from_input(input));
        }
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for ClickBehavior {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        for kind in [
            EventKind::PointerDown,
            EventKind::Click,
            EventKind::KeyDown,
            EventKind::KeyUp,
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
        out: &mut Actions<K>,
    ) -> Option<Handled> {
        if scope != EventScope::Reference {
            return None;
        }
        match input {
            Input::PointerDown { pointer, .. } => {
                self.pointer_type = Some(pointer.pointer_type);
                if self.config.trigger != ClickTrigger::PointerDown {
                    return None;
                }
                if pointer.button != 0 {
                    return None;
                }
                if self.config.ignore_mouse && pointer.pointer_type.is_mouse_like() {
                    return None;
                }
                if !(session.open() && self.toggles_closed(session, TriggerKind::PointerDown)) {
                    // Keep focus from leaving the reference mid-press.
                    out.push(Action::PreventDefault);
                }
                self.toggle(session, input, TriggerKind::PointerDown);
                Some(Handled)
            }
            Input::Click { pointer, is_virtual, .. } => {
                // A press trigger already acted on pointerdown; swallow the
                // trailing click.
                if self.config.trigger == ClickTrigger::PointerDown && self.pointer_type.is_some() {
                    self.pointer_type = None;
                    return None;
                }
                let mouse_like = !is_virtual && pointer.pointer_type.is_mouse_like();
                if self.config.ignore_mouse && mouse_like {
                    return None;
                }
                self.toggle(session, input, TriggerKind::Click);
                Some(Handled)
            }
            Input::KeyDown { target, key, .. } => {
                self.pointer_type = None;
                if !self.config.keyboard_handlers || ctx.dom.is_typeable(*target) {
                    self.did_key_down = false;
                    return None;
                }
                match key {
                    Key::Space => {
                        // Keep the page from scrolling; activate on keyup
                        // like a native button.
                        out.push(Action::PreventDefault);
                        self.did_key_down = true;
                        Some(Handled)
                    }
                    Key::Enter => {
                        self.toggle(session, input, TriggerKind::KeyDown);
                        Some(Handled)
                    }
                    _ => None,
                }
            }
            Input::KeyUp { target, key, .. } => {
                if !self.config.keyboard_handlers
                    || ctx.dom.is_typeable(*target)
                    || *key != Key::Space
                    || !self.did_key_down
                {
                    return None;
                }
                self.did_key_down = false;
                self.toggle(session, input, TriggerKind::KeyDown);
                Some(Handled)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use perch_core::{Modifiers, PointerState};

    struct Dom {
        typeable: Option<u32>,
    }

    impl DomView<u32> for Dom {
        fn parent_of(&self, _node: u32) -> Option<u32> {
            None
        }

        fn is_typeable(&self, node: u32) -> bool {
            self.typeable == Some(node)
        }
    }

    fn drive(
        click: &mut ClickBehavior,
        session: &mut Session<u32>,
        dom: &Dom,
        input: &Input<u32>,
    ) -> Actions<u32> {
        let mut ctx = Ctx::new(dom);
        let mut out = Actions::new();
        let _ = click.on_event(&mut ctx, session, EventScope::Reference, input, 0, &mut out);
        out
    }

    fn mouse_click() -> Input<u32> {
        Input::Click {
            target: 1,
            pointer: PointerState::mouse(Point::ZERO),
            is_virtual: false,
        }
    }

    #[test]
    fn click_toggles_open_and_closed() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig::default());
        let mut session: Session<u32> = Session::new();

        drive(&mut click, &mut session, &dom, &mouse_click());
        assert!(session.open());
        drive(&mut click, &mut session, &dom, &mouse_click());
        assert!(!session.open());
    }

    #[test]
    fn toggle_false_never_closes() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig { toggle: false, ..Default::default() });
        let mut session: Session<u32> = Session::new();
        drive(&mut click, &mut session, &dom, &mouse_click());
        drive(&mut click, &mut session, &dom, &mouse_click());
        assert!(session.open());
    }

    #[test]
    fn click_does_not_unseat_a_hover_open() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig::default());
        let mut session: Session<u32> = Session::new();
        session.apply_open_change(
            true,
            OpenChangeReason::Hover,
            Some(OpenEvent { kind: TriggerKind::PointerEnter, pointer_type: Some(PointerType::Mouse) }),
        );
        // Clicking while hover-open re-seats the open as a click open
        // rather than closing.
        drive(&mut click, &mut session, &dom, &mouse_click());
        assert!(session.open());
        assert!(session.open_event().is_some_and(|e| e.kind == TriggerKind::Click));
    }

    #[test]
    fn press_trigger_opens_on_pointer_down_and_swallows_the_click() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig {
            trigger: ClickTrigger::PointerDown,
            ..Default::default()
        });
        let mut session: Session<u32> = Session::new();
        let down = Input::PointerDown { target: 1, pointer: PointerState::mouse(Point::ZERO) };
        drive(&mut click, &mut session, &dom, &down);
        assert!(session.open());
        drive(&mut click, &mut session, &dom, &mouse_click());
        assert!(session.open());
    }

    #[test]
    fn secondary_button_is_ignored_for_press_trigger() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig {
            trigger: ClickTrigger::PointerDown,
            ..Default::default()
        });
        let mut session: Session<u32> = Session::new();
        let mut pointer = PointerState::mouse(Point::ZERO);
        pointer.button = 2;
        drive(&mut click, &mut session, &dom, &Input::PointerDown { target: 1, pointer });
        assert!(!session.open());
    }

    #[test]
    fn ignore_mouse_still_accepts_virtual_clicks() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig { ignore_mouse: true, ..Default::default() });
        let mut session: Session<u32> = Session::new();
        drive(&mut click, &mut session, &dom, &mouse_click());
        assert!(!session.open());

        let virtual_click = Input::Click {
            target: 1,
            pointer: PointerState::mouse(Point::ZERO),
            is_virtual: true,
        };
        drive(&mut click, &mut session, &dom, &virtual_click);
        assert!(session.open());
    }

    #[test]
    fn space_activates_on_keyup() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig::default());
        let mut session: Session<u32> = Session::new();
        let down = Input::KeyDown { target: 1, key: Key::Space, modifiers: Modifiers::empty() };
        let up = Input::KeyUp { target: 1, key: Key::Space, modifiers: Modifiers::empty() };

        let out = drive(&mut click, &mut session, &dom, &down);
        assert!(out.as_slice().contains(&Action::PreventDefault));
        assert!(!session.open());
        drive(&mut click, &mut session, &dom, &up);
        assert!(session.open());
    }

    #[test]
    fn enter_activates_immediately() {
        let dom = Dom { typeable: None };
        let mut click = ClickBehavior::new(ClickConfig::default());
        let mut session: Session<u32> = Session::new();
        let down = Input::KeyDown { target: 1, key: Key::Enter, modifiers: Modifiers::empty() };
        drive(&mut click, &mut session, &dom, &down);
        assert!(session.open());
    }

    #[test]
    fn typeable_references_keep_their_space_key() {
        let dom = Dom { typeable: Some(1) };
        let mut click = ClickBehavior::new(ClickConfig::default());
        let mut session: Session<u32> = Session::new();
        let down = Input::KeyDown { target: 1, key: Key::Space, modifiers: Modifiers::empty() };
        let up = Input::KeyUp { target: 1, key: Key::Space, modifiers: Modifiers::empty() };
        drive(&mut click, &mut session, &dom, &down);
        drive(&mut click, &mut session, &dom, &up);
        assert!(!session.open());
    }
}

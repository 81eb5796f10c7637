// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover open/close with delays, rest detection, and the safe polygon.

use perch_core::{
    Actions, Behavior, Contribution, Ctx, Delay, DelayPhase, DomView, EventKind, EventScope,
    Handled, Input, OpenChangeReason, OpenEvent, PointerState, PointerType, Session, SessionEvent,
    TriggerKind,
};
use perch_core::{Action, ConfigIssue, DismissEvent, DismissKind, ReturnFocus, Timer};

use crate::safe_polygon::{SafePolygon, SafePolygonConfig, Side};

/// Configuration for [`HoverBehavior`].
#[derive(Clone, Debug)]
pub struct HoverConfig {
    /// Whether the behavior participates at all.
    pub enabled: bool,
    /// Open/close delays in milliseconds. Non-mouse-like pointers always
    /// resolve to zero.
    pub delay: Delay,
    /// Require the pointer to rest this long over the reference before
    /// opening. Only consulted when the open delay is zero.
    pub rest_ms: u64,
    /// Ignore non-mouse-like pointers entirely.
    pub mouse_only: bool,
    /// Also treat pointer movement over the reference as an entry. Covers
    /// the pointer already sitting over the reference when the behavior
    /// mounts.
    pub move_enabled: bool,
    /// Keep the element open while the pointer travels toward it through
    /// a grace triangle. `None` falls back to plain close delays.
    pub safe_polygon: Option<SafePolygonConfig>,
    /// Which side of the reference the floating element sits on. Only
    /// consulted when `safe_polygon` is set.
    pub side: Side,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Delay::default(),
            rest_ms: 0,
            mouse_only: false,
            move_enabled: true,
            safe_polygon: None,
            side: Side::default(),
        }
    }
}

impl HoverConfig {
    /// Configuration combinations that would silently not engage.
    #[must_use]
    pub fn validate(&self) -> alloc::vec::Vec<ConfigIssue> {
        let mut issues = alloc::vec::Vec::new();
        if self.rest_ms > 0 && self.delay.open > 0 {
            issues.push(ConfigIssue::RestIgnoredWithOpenDelay);
        }
        issues
    }
}

/// What the shared open/close timer does when it lands.
#[derive(Copy, Clone, Debug)]
enum Pending {
    Open(OpenEvent),
    Close(OpenChangeReason),
}

/// Opens on hover, closes on leave, with delays and an optional safe
/// polygon.
///
/// While the polygon is active the host must route document-level
/// [`Input::PointerMove`] events here with [`EventScope::Document`]; the
/// behavior tracks the pointer against the grace region and closes when it
/// leaves.
pub struct HoverBehavior {
    config: HoverConfig,
    pointer_type: Option<PointerType>,
    /// Shared open/close timer; scheduling one intent replaces the other.
    timer: Timer,
    pending: Option<Pending>,
    rest_timer: Timer,
    rest_open: Option<OpenEvent>,
    /// Set on dismiss so a rest timer landing afterwards does not reopen.
    block_mouse_move: bool,
    polygon: Option<SafePolygon>,
    /// Whether we hold a pointer-events suppression ticket.
    suppressing: bool,
}

impl HoverBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(config: HoverConfig) -> Self {
        Self {
            config,
            pointer_type: None,
            timer: Timer::new(),
            pending: None,
            rest_timer: Timer::new(),
            rest_open: None,
            block_mouse_move: true,
            polygon: None,
            suppressing: false,
        }
    }

    /// Replaces the delays, e.g. when a delay group takes over.
    pub fn set_delay(&mut self, delay: Delay) {
        self.config.delay = delay;
    }

    /// Whether the grace region is currently being tracked.
    #[must_use]
    pub fn polygon_active(&self) -> bool {
        self.polygon.is_some()
    }

    fn cancel_timer(&mut self) {
        self.timer.cancel();
        self.pending = None;
    }

    fn cancel_rest(&mut self) {
        self.rest_timer.cancel();
        self.rest_open = None;
    }

    /// Whether the current open came from a press rather than hovering.
    /// Hover's close logic stands down for press opens.
    fn click_like_open<K>(session: &Session<K>) -> bool {
        session.open_event().is_some_and(|e| e.is_press_like())
    }

    fn hover_like_open<K>(session: &Session<K>) -> bool {
        session.open_event().is_some_and(|e| {
            matches!(e.kind, TriggerKind::PointerEnter | TriggerKind::PointerMove)
        })
    }

    /// Entry logic shared by pointer enter and move-based entry.
    fn on_entry<K: Copy + Eq>(
        &mut self,
        session: &mut Session<K>,
        pointer: PointerState,
        input: &Input<K>,
        now: u64,
    ) {
        self.block_mouse_move = false;
        if self.config.mouse_only && !pointer.pointer_type.is_mouse_like() {
            return;
        }
        // With rest detection and no open delay, opening is the rest
        // timer's job.
        if self.config.rest_ms > 0 && self.config.delay.open == 0 {
            return;
        }
        let delay = self
            .config
            .delay
            .resolve(DelayPhase::Open, Some(pointer.pointer_type));
        match OpenEvent::from_input(input) {
            Some(event) if delay > 0 => {
                self.timer.schedule(now, delay);
                self.pending = Some(Pending::Open(event));
            }
            event => {
                self.cancel_timer();
                session.apply_open_change(true, OpenChangeReason::Hover, event);
            }
        }
    }

    /// Schedules a delayed close, or closes immediately when no close
    /// delay is configured and `run_else_branch` allows it.
    fn close_with_delay<K: Copy + Eq>(
        &mut self,
        session: &mut Session<K>,
        now: u64,
        run_else_branch: bool,
        reason: OpenChangeReason,
    ) {
        let delay = self.config.delay.resolve(DelayPhase::Close, self.pointer_type);
        if delay > 0 {
            self.timer.schedule(now, delay);
            self.pending = Some(Pending::Close(reason));
        } else if run_else_branch {
            self.cancel_timer();
            session.apply_open_change(false, reason, None);
        }
    }

    fn on_reference_leave<K: Copy + Eq, D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &mut Session<K>,
        pointer: PointerState,
        related: Option<K>,
        now: u64,
    ) {
        self.cancel_rest();
        if Self::click_like_open(session) {
            return;
        }
        if let Some(sp) = self.config.safe_polygon {
            if !session.open() {
                self.cancel_timer();
                return;
            }
            let rects = session
                .reference()
                .and_then(|r| ctx.dom.bounds(r))
                .zip(session.floating().and_then(|f| ctx.dom.bounds(f)));
            if let Some((reference, floating)) = rects {
                self.polygon = Some(SafePolygon::new(
                    reference,
                    floating,
                    self.config.side,
                    pointer.position,
                    sp.buffer,
                ));
            } else {
                // No geometry to track against; fall back to delays.
                self.close_with_delay(session, now, true, OpenChangeReason::Hover);
            }
            return;
        }
        // Touch keeps the element open when the contact moves into it.
        let moved_into_floating = pointer.pointer_type == PointerType::Touch
            && related
                .zip(session.floating())
                .is_some_and(|(r, f)| ctx.dom.contains(f, r));
        if !moved_into_floating {
            self.close_with_delay(session, now, true, OpenChangeReason::Hover);
        }
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for HoverBehavior {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        for kind in [
            EventKind::PointerEnter,
            EventKind::PointerLeave,
            EventKind::PointerMove,
            EventKind::PointerDown,
        ] {
            contribution.reference.subscribe(kind);
        }
        contribution.floating.subscribe(EventKind::PointerEnter);
        contribution.floating.subscribe(EventKind::PointerLeave);
        contribution
    }

    fn on_event(
        &mut self,
        ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        scope: EventScope,
        input: &Input<K>,
        now: u64,
        _out: &mut Actions<K>,
    ) -> Option<Handled> {
        match (scope, input) {
            (EventScope::Reference, Input::PointerDown { pointer, .. }) => {
                self.pointer_type = Some(pointer.pointer_type);
            }
            (EventScope::Reference, Input::PointerEnter { pointer, .. }) => {
                self.pointer_type = Some(pointer.pointer_type);
                self.cancel_timer();
                self.on_entry(session, *pointer, input, now);
            }
            (EventScope::Reference, Input::PointerMove { pointer, .. }) => {
                if self.config.move_enabled && !session.open() && !self.timer.is_scheduled() {
                    self.on_entry(session, *pointer, input, now);
                }
                if !session.open() && self.config.rest_ms > 0 {
                    self.rest_timer.schedule(now, self.config.rest_ms);
                    self.rest_open = OpenEvent::from_input(input);
                }
            }
            (EventScope::Reference, Input::PointerLeave { pointer, related, .. }) => {
                self.on_reference_leave(ctx, session, *pointer, *related, now);
            }
            (EventScope::Floating, Input::PointerEnter { .. }) => {
                self.cancel_timer();
            }
            (EventScope::Floating, Input::PointerLeave { .. }) => {
                if session.open() && !Self::click_like_open(session) {
                    session.publish_dismiss(DismissEvent {
                        kind: DismissKind::MouseLeave,
                        return_focus: ReturnFocus::Suppress,
                    });
                    self.close_with_delay(session, now, false, OpenChangeReason::Hover);
                }
            }
            (EventScope::Document, Input::PointerMove { pointer, .. }) => {
                if let Some(polygon) = &self.polygon {
                    if !polygon.contains(pointer.position) {
                        self.polygon = None;
                        self.close_with_delay(session, now, true, OpenChangeReason::SafePolygon);
                        return Some(Handled);
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn on_session_event(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        event: &SessionEvent,
        _now: u64,
        out: &mut Actions<K>,
    ) {
        match event {
            SessionEvent::Dismiss(_) => {
                self.cancel_timer();
                self.cancel_rest();
                self.block_mouse_move = true;
            }
            SessionEvent::OpenChange { open: false, .. } => {
                self.pointer_type = None;
                self.polygon = None;
                self.cancel_timer();
                if self.suppressing {
                    self.suppressing = false;
                    out.push(Action::PointerSuppression { active: false });
                }
            }
            SessionEvent::OpenChange { open: true, .. } => {
                let block = self
                    .config
                    .safe_polygon
                    .is_some_and(|sp| sp.block_pointer_events);
                if block && Self::hover_like_open(session) && !self.suppressing {
                    self.suppressing = true;
                    out.push(Action::PointerSuppression { active: true });
                }
            }
            SessionEvent::TypingChange(_) => {}
        }
    }

    fn next_deadline(&self) -> Option<u64> {
        match (self.timer.deadline(), self.rest_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn on_deadline(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        now: u64,
        _out: &mut Actions<K>,
    ) {
        if self.timer.fire(now) {
            match self.pending.take() {
                Some(Pending::Open(event)) => {
                    session.apply_open_change(true, OpenChangeReason::Hover, Some(event));
                }
                Some(Pending::Close(reason)) => {
                    session.apply_open_change(false, reason, None);
                }
                None => {}
            }
        }
        if self.rest_timer.fire(now) {
            let event = self.rest_open.take();
            if !self.block_mouse_move && !session.open() {
                session.apply_open_change(true, OpenChangeReason::Hover, event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect};
    use perch_core::{DelayGroup, GroupId};

    struct Dom {
        bounds: alloc::vec::Vec<(u32, Rect)>,
    }

    impl Dom {
        fn new() -> Self {
            Self {
                bounds: alloc::vec![
                    (1, Rect::new(40.0, 0.0, 60.0, 20.0)),
                    (2, Rect::new(0.0, 50.0, 200.0, 150.0)),
                ],
            }
        }
    }

    impl DomView<u32> for Dom {
        fn parent_of(&self, _node: u32) -> Option<u32> {
            None
        }

        fn bounds(&self, node: u32) -> Option<Rect> {
            self.bounds.iter().find(|(k, _)| *k == node).map(|(_, r)| *r)
        }
    }

    fn session() -> Session<u32> {
        let mut session = Session::new();
        session.set_handles(Some(1), Some(2));
        session
    }

    fn enter(pos: Point) -> Input<u32> {
        Input::PointerEnter {
            target: 1,
            pointer: PointerState::mouse(pos),
        }
    }

    fn leave(pos: Point, related: Option<u32>) -> Input<u32> {
        Input::PointerLeave {
            target: 1,
            pointer: PointerState::mouse(pos),
            related,
        }
    }

    fn drive(
        hover: &mut HoverBehavior,
        session: &mut Session<u32>,
        dom: &Dom,
        scope: EventScope,
        input: &Input<u32>,
        now: u64,
    ) {
        let mut ctx = Ctx::new(dom);
        let mut out = Actions::new();
        let _ = hover.on_event(&mut ctx, session, scope, input, now, &mut out);
    }

    fn pump(hover: &mut HoverBehavior, session: &mut Session<u32>, dom: &Dom, out: &mut Actions<u32>) {
        let mut ctx = Ctx::new(dom);
        while let Some(event) = session.pop_event() {
            hover.on_session_event(&mut ctx, session, &event, 0, out);
        }
    }

    #[test]
    fn rest_with_an_open_delay_is_flagged() {
        let config = HoverConfig {
            rest_ms: 120,
            delay: Delay { open: 300, close: 0 },
            ..Default::default()
        };
        assert_eq!(config.validate(), alloc::vec![ConfigIssue::RestIgnoredWithOpenDelay]);
        assert!(HoverConfig::default().validate().is_empty());
    }

    #[test]
    fn opens_immediately_without_delay() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig::default());
        let mut session = session();
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        assert!(session.open());
        assert!(session.open_event().is_some_and(|e| e.is_hover_like()));
    }

    #[test]
    fn open_delay_defers_until_the_deadline() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig {
            delay: Delay { open: 100, close: 0 },
            ..Default::default()
        });
        let mut session = session();
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        assert!(!session.open());
        assert_eq!(Behavior::<u32, Dom>::next_deadline(&hover), Some(100));

        let mut ctx = Ctx::new(&dom);
        let mut out = Actions::new();
        hover.on_deadline(&mut ctx, &mut session, 100, &mut out);
        assert!(session.open());
    }

    #[test]
    fn touch_is_ignored_when_mouse_only() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig { mouse_only: true, ..Default::default() });
        let mut session = session();
        let input = Input::PointerEnter {
            target: 1,
            pointer: PointerState::touch(Point::new(50.0, 10.0)),
        };
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &input, 0);
        assert!(!session.open());
    }

    #[test]
    fn leave_with_close_delay_schedules_instead_of_closing() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig {
            delay: Delay { open: 0, close: 200 },
            ..Default::default()
        });
        let mut session = session();
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        assert!(session.open());
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &leave(Point::new(50.0, 25.0), None), 10);
        assert!(session.open());

        // Re-entering the floating element cancels the pending close.
        let reenter = Input::PointerEnter {
            target: 2,
            pointer: PointerState::mouse(Point::new(100.0, 100.0)),
        };
        drive(&mut hover, &mut session, &dom, EventScope::Floating, &reenter, 50);
        assert_eq!(Behavior::<u32, Dom>::next_deadline(&hover), None);
        assert!(session.open());
    }

    #[test]
    fn a_delay_group_member_reopens_instantly_after_a_sibling_closes() {
        let dom = Dom::new();
        let mut group = DelayGroup::new(Delay { open: 1000, close: 200 }, 200);

        // The first tooltip pays the full open delay.
        let mut first = HoverBehavior::new(HoverConfig { delay: group.delay(), ..Default::default() });
        let mut session_a = session();
        drive(&mut first, &mut session_a, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        assert!(!session_a.open());
        let mut ctx = Ctx::new(&dom);
        let mut out = Actions::new();
        first.on_deadline(&mut ctx, &mut session_a, 1000, &mut out);
        assert!(session_a.open());
        group.note_open(GroupId(1), 1000);

        // Leaving closes after the close delay and opens the reopen window.
        drive(&mut first, &mut session_a, &dom, EventScope::Reference, &leave(Point::new(50.0, 25.0), None), 1100);
        first.on_deadline(&mut ctx, &mut session_a, 1300, &mut out);
        assert!(!session_a.open());
        group.note_close(GroupId(1), 1300);

        // A sibling entered within the window sees an effectively zero
        // open delay.
        let mut second = HoverBehavior::new(HoverConfig { delay: group.delay(), ..Default::default() });
        assert_eq!(group.delay().open, 1);
        let mut session_b = session();
        drive(&mut second, &mut session_b, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 1400);
        second.on_deadline(&mut ctx, &mut session_b, 1401, &mut out);
        assert!(session_b.open());
        assert_eq!(group.note_open(GroupId(2), 1401), None);
        assert!(group.is_instant_phase());
    }

    #[test]
    fn click_like_open_disables_hover_close() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig::default());
        let mut session = session();
        session.apply_open_change(
            true,
            OpenChangeReason::Click,
            Some(OpenEvent { kind: TriggerKind::Click, pointer_type: Some(PointerType::Mouse) }),
        );
        while session.pop_event().is_some() {}
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &leave(Point::new(50.0, 25.0), None), 0);
        assert!(session.open());
    }

    #[test]
    fn safe_polygon_keeps_open_along_the_grace_path() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig {
            safe_polygon: Some(SafePolygonConfig::default()),
            side: Side::Bottom,
            ..Default::default()
        });
        let mut session = session();
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        assert!(session.open());
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &leave(Point::new(50.0, 20.0), None), 10);
        assert!(hover.polygon_active());

        // Moving toward the floating element stays open.
        let toward = Input::PointerMove {
            target: 0,
            pointer: PointerState::mouse(Point::new(50.0, 35.0)),
        };
        drive(&mut hover, &mut session, &dom, EventScope::Document, &toward, 20);
        assert!(session.open());

        // Straying off the path closes.
        let away = Input::PointerMove {
            target: 0,
            pointer: PointerState::mouse(Point::new(250.0, 35.0)),
        };
        drive(&mut hover, &mut session, &dom, EventScope::Document, &away, 30);
        assert!(!session.open());
        assert!(!hover.polygon_active());
    }

    #[test]
    fn blocking_polygon_holds_a_suppression_ticket_while_hover_open() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig {
            safe_polygon: Some(SafePolygonConfig { block_pointer_events: true, buffer: 0.5 }),
            ..Default::default()
        });
        let mut session = session();
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        let mut out = Actions::new();
        pump(&mut hover, &mut session, &dom, &mut out);
        assert!(
            out.as_slice()
                .contains(&Action::PointerSuppression { active: true })
        );

        session.apply_open_change(false, OpenChangeReason::Hover, None);
        let mut out = Actions::new();
        pump(&mut hover, &mut session, &dom, &mut out);
        assert!(
            out.as_slice()
                .contains(&Action::PointerSuppression { active: false })
        );
    }

    #[test]
    fn rest_timer_opens_only_after_the_pointer_settles() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig { rest_ms: 100, ..Default::default() });
        let mut session = session();
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        // Rest is configured with no open delay, so entry alone does not open.
        assert!(!session.open());

        let wiggle = Input::PointerMove {
            target: 1,
            pointer: PointerState::mouse(Point::new(51.0, 10.0)),
        };
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &wiggle, 10);
        assert_eq!(Behavior::<u32, Dom>::next_deadline(&hover), Some(110));
        // Movement restarts the clock.
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &wiggle, 60);
        assert_eq!(Behavior::<u32, Dom>::next_deadline(&hover), Some(160));

        let mut ctx = Ctx::new(&dom);
        let mut out = Actions::new();
        hover.on_deadline(&mut ctx, &mut session, 160, &mut out);
        assert!(session.open());
    }

    #[test]
    fn dismiss_blocks_a_pending_rest_open() {
        let dom = Dom::new();
        let mut hover = HoverBehavior::new(HoverConfig { rest_ms: 100, ..Default::default() });
        let mut session = session();
        let wiggle = Input::PointerMove {
            target: 1,
            pointer: PointerState::mouse(Point::new(51.0, 10.0)),
        };
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &enter(Point::new(50.0, 10.0)), 0);
        drive(&mut hover, &mut session, &dom, EventScope::Reference, &wiggle, 10);

        let mut ctx = Ctx::new(&dom);
        let mut out = Actions::new();
        hover.on_session_event(
            &mut ctx,
            &mut session,
            &SessionEvent::Dismiss(DismissEvent {
                kind: DismissKind::EscapeKey,
                return_focus: ReturnFocus::Restore,
            }),
            20,
            &mut out,
        );
        hover.on_deadline(&mut ctx, &mut session, 200, &mut out);
        assert!(!session.open());
    }
}

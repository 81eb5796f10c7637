// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavior composition and event fan-out.

use alloc::boxed::Box;
use alloc::vec::Vec;

use perch_core::{
    Action, Actions, Behavior, Contribution, Ctx, DomView, EventScope, Handled, Input, PropBundles,
    Session, SessionEvent, merge,
};

/// A host-supplied handler layered after the behavior stack.
///
/// The handler sees every event after all behaviors have run, mirroring how
/// caller props are merged after behavior props. Returning `Some(Handled)`
/// marks the event consumed.
pub type UserHandler<K> =
    Box<dyn FnMut(EventScope, &Input<K>, &mut Session<K>) -> Option<Handled>>;

/// What a round of dispatch produced.
#[derive(Debug, Default)]
pub struct DispatchOutcome<K> {
    /// `Some` if any behavior (or the user handler) consumed the event.
    pub handled: Option<Handled>,
    /// Side effects for the host to apply, in emission order.
    pub actions: Vec<Action<K>>,
}

/// An ordered stack of behaviors sharing one [`Session`].
///
/// Order matters twice: prop contributions are merged front to back (later
/// behaviors win attribute conflicts), and events visit behaviors front to
/// back. Every behavior sees every event even after one consumes it; only
/// the first consumption is reported to the host.
pub struct Interactions<K: Copy + Eq, D: DomView<K> + ?Sized> {
    behaviors: Vec<Box<dyn Behavior<K, D>>>,
    user_contribution: Option<Contribution<K>>,
    user_handler: Option<UserHandler<K>>,
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Interactions<K, D> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self {
            behaviors: Vec::new(),
            user_contribution: None,
            user_handler: None,
        }
    }

    /// Appends a behavior to the stack.
    pub fn push(&mut self, behavior: impl Behavior<K, D> + 'static) {
        self.behaviors.push(Box::new(behavior));
    }

    /// Sets caller props merged after all behavior contributions.
    pub fn set_user_contribution(&mut self, contribution: Contribution<K>) {
        self.user_contribution = Some(contribution);
    }

    /// Sets a caller handler that runs after all behaviors.
    pub fn set_user_handler(&mut self, handler: UserHandler<K>) {
        self.user_handler = Some(handler);
    }

    /// Number of behaviors in the stack.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Whether the stack has no behaviors.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Merges the prop contributions of every enabled behavior, then the
    /// caller's, into per-target bundles.
    pub fn props(&self, session: &Session<K>) -> PropBundles<K> {
        let contributions: Vec<Contribution<K>> = self
            .behaviors
            .iter()
            .filter(|b| b.is_enabled())
            .map(|b| b.contribution(session))
            .collect();
        merge(&contributions, self.user_contribution.as_ref())
    }

    /// Routes one input event through the stack.
    ///
    /// Every enabled behavior runs; the first `Handled` is recorded but does
    /// not stop later behaviors. The user handler runs last. Session events
    /// published during dispatch are then pumped until the queue drains.
    pub fn dispatch(
        &mut self,
        ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        scope: EventScope,
        input: &Input<K>,
        now: u64,
    ) -> DispatchOutcome<K> {
        let mut out = Actions::new();
        let mut handled = None;
        for behavior in &mut self.behaviors {
            if !behavior.is_enabled() {
                continue;
            }
            let result = behavior.on_event(ctx, session, scope, input, now, &mut out);
            if handled.is_none() {
                handled = result;
            }
        }
        if let Some(handler) = &mut self.user_handler {
            let result = handler(scope, input, session);
            if handled.is_none() {
                handled = result;
            }
        }
        self.pump(ctx, session, now, &mut out);
        DispatchOutcome {
            handled,
            actions: out.drain().collect(),
        }
    }

    /// Fires every behavior whose deadline has passed, then pumps session
    /// events. The host calls this when the earliest deadline elapses.
    pub fn poll(
        &mut self,
        ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        now: u64,
    ) -> Vec<Action<K>> {
        let mut out = Actions::new();
        for behavior in &mut self.behaviors {
            if !behavior.is_enabled() {
                continue;
            }
            if behavior.next_deadline().is_some_and(|d| d <= now) {
                behavior.on_deadline(ctx, session, now, &mut out);
            }
        }
        self.pump(ctx, session, now, &mut out);
        out.drain().collect()
    }

    /// The earliest pending deadline across the stack, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.behaviors
            .iter()
            .filter(|b| b.is_enabled())
            .filter_map(|b| b.next_deadline())
            .min()
    }

    /// Drains the session queue, fanning each event out to every behavior
    /// and surfacing it as an action. Behaviors may publish further events
    /// while observing one; the loop runs until the queue is empty.
    fn pump(
        &mut self,
        ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        now: u64,
        out: &mut Actions<K>,
    ) {
        while let Some(event) = session.pop_event() {
            // Disabled behaviors still observe session events so they can
            // reset their own state.
            for behavior in &mut self.behaviors {
                behavior.on_session_event(ctx, session, &event, now, out);
            }
            match event {
                SessionEvent::OpenChange { open, reason } => {
                    out.push(Action::OpenChanged { open, reason });
                }
                SessionEvent::Dismiss(dismiss) => {
                    out.push(Action::Dismissed(dismiss));
                }
                SessionEvent::TypingChange(typing) => {
                    out.push(Action::TypingChanged(typing));
                }
            }
        }
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Default for Interactions<K, D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use perch_core::{OpenChangeReason, OpenEvent, PointerState};

    struct NoDom;
    impl DomView<u32> for NoDom {
        fn parent_of(&self, _node: u32) -> Option<u32> {
            None
        }
    }

    /// Opens on click, and records every session event it observes.
    struct Opener {
        observed: usize,
    }
    impl Behavior<u32, NoDom> for Opener {
        fn on_event(
            &mut self,
            _ctx: &mut Ctx<'_, u32, NoDom>,
            session: &mut Session<u32>,
            scope: EventScope,
            input: &Input<u32>,
            _now: u64,
            _out: &mut Actions<u32>,
        ) -> Option<Handled> {
            if scope == EventScope::Reference && matches!(input, Input::Click { .. }) {
                session.apply_open_change(
                    true,
                    OpenChangeReason::Click,
                    OpenEvent::from_input(input),
                );
                return Some(Handled);
            }
            None
        }

        fn on_session_event(
            &mut self,
            _ctx: &mut Ctx<'_, u32, NoDom>,
            _session: &mut Session<u32>,
            _event: &SessionEvent,
            _now: u64,
            _out: &mut Actions<u32>,
        ) {
            self.observed += 1;
        }
    }

    /// Consumes nothing but must still see every event.
    struct Counter {
        events: usize,
    }
    impl Behavior<u32, NoDom> for Counter {
        fn on_event(
            &mut self,
            _ctx: &mut Ctx<'_, u32, NoDom>,
            _session: &mut Session<u32>,
            _scope: EventScope,
            _input: &Input<u32>,
            _now: u64,
            _out: &mut Actions<u32>,
        ) -> Option<Handled> {
            self.events += 1;
            None
        }
    }

    fn click() -> Input<u32> {
        Input::Click {
            target: 1,
            pointer: PointerState::mouse(Point::ZERO),
            is_virtual: false,
        }
    }

    #[test]
    fn all_behaviors_run_even_after_one_handles() {
        let dom = NoDom;
        let mut stack: Interactions<u32, NoDom> = Interactions::new();
        stack.push(Opener { observed: 0 });
        stack.push(Counter { events: 0 });
        let mut session = Session::new();
        let mut ctx = Ctx::new(&dom);

        let outcome = stack.dispatch(&mut ctx, &mut session, EventScope::Reference, &click(), 0);
        assert!(outcome.handled.is_some());
        assert!(session.open());
        // The open change was fanned back out as an action.
        assert!(
            outcome
                .actions
                .iter()
                .any(|a| matches!(a, Action::OpenChanged { open: true, .. }))
        );
    }

    #[test]
    fn session_events_fan_out_to_every_behavior() {
        let dom = NoDom;
        let mut stack: Interactions<u32, NoDom> = Interactions::new();
        stack.push(Opener { observed: 0 });
        let mut session = Session::new();
        let mut ctx = Ctx::new(&dom);

        stack.dispatch(&mut ctx, &mut session, EventScope::Reference, &click(), 0);
        // The queue is fully drained after dispatch.
        assert!(session.pop_event().is_none());
    }

    #[test]
    fn user_handler_runs_after_behaviors() {
        let dom = NoDom;
        let mut stack: Interactions<u32, NoDom> = Interactions::new();
        stack.push(Counter { events: 0 });
        stack.set_user_handler(Box::new(|_, _, session| {
            session.apply_open_change(true, OpenChangeReason::Click, None);
            Some(Handled)
        }));
        let mut session = Session::new();
        let mut ctx = Ctx::new(&dom);

        let outcome = stack.dispatch(&mut ctx, &mut session, EventScope::Reference, &click(), 0);
        assert!(outcome.handled.is_some());
        assert!(session.open());
    }

    #[test]
    fn next_deadline_is_the_minimum() {
        struct Timed(u64);
        impl Behavior<u32, NoDom> for Timed {
            fn next_deadline(&self) -> Option<u64> {
                Some(self.0)
            }
        }
        let mut stack: Interactions<u32, NoDom> = Interactions::new();
        stack.push(Timed(500));
        stack.push(Timed(120));
        assert_eq!(stack.next_deadline(), Some(120));
    }
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeahead: printable characters move the active item by label prefix.

use alloc::string::String;
use alloc::vec::Vec;

use perch_core::{
    Action, Actions, Behavior, Contribution, Ctx, DomView, EventKind, EventScope, Handled, Input,
    Key, Session, SessionEvent,
};
use perch_list::{TypeaheadConfig, TypeaheadMatcher};

/// Buffers typed characters and matches them against item labels,
/// emitting [`Action::Navigate`] for matches and keeping the session's
/// typing flag in sync so press behaviors stand down mid-word.
///
/// The host registers labels with [`set_labels`] (in item order, `None`
/// for unlabelled items) and reports active-index changes back through
/// [`sync_active`].
///
/// [`set_labels`]: TypeaheadBehavior::set_labels
/// [`sync_active`]: TypeaheadBehavior::sync_active
pub struct TypeaheadBehavior {
    matcher: TypeaheadMatcher,
    labels: Vec<Option<String>>,
}

impl TypeaheadBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(config: TypeaheadConfig) -> Self {
        Self {
            matcher: TypeaheadMatcher::new(config),
            labels: Vec::new(),
        }
    }

    /// Replaces the item labels, in item order.
    pub fn set_labels(&mut self, labels: Vec<Option<String>>) {
        self.labels = labels;
    }

    /// Reports the current active index so matching resumes from it.
    pub fn sync_active(&mut self, index: Option<usize>) {
        self.matcher.sync_active(index);
    }

}

fn label_views(labels: &[Option<String>]) -> Vec<Option<&str>> {
    labels.iter().map(|l| l.as_deref()).collect()
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for TypeaheadBehavior {
    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        contribution.reference.subscribe(EventKind::KeyDown);
        contribution.floating.subscribe(EventKind::KeyDown);
        contribution.floating.subscribe(EventKind::KeyUp);
        contribution
    }

    fn on_event(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        scope: EventScope,
        input: &Input<K>,
        now: u64,
        out: &mut Actions<K>,
    ) -> Option<Handled> {
        if !matches!(scope, EventScope::Reference | EventScope::Floating) {
            return None;
        }
        match input {
            Input::KeyDown { key, modifiers, .. } => {
                let labels = label_views(&self.labels);
                if let Some(c) = key.to_char() {
                    let outcome = self.matcher.on_char(
                        &labels,
                        c,
                        modifiers.has_chord(),
                        session.open(),
                        now,
                    );
                    session.set_typing(outcome.typing);
                    if let Some(index) = outcome.matched {
                        out.push(Action::Navigate { index: Some(index) });
                    }
                    if outcome.consume {
                        out.push(Action::PreventDefault);
                        out.push(Action::StopPropagation);
                        return Some(Handled);
                    }
                } else {
                    let _ = self.matcher.on_other_key(&labels);
                    session.set_typing(self.matcher.typing());
                }
                None
            }
            Input::KeyUp { key: Key::Space, .. } => {
                self.matcher.on_space_up();
                session.set_typing(self.matcher.typing());
                None
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
        if let SessionEvent::OpenChange { open: true, .. } = event {
            self.matcher.reset_on_open();
        }
    }

    fn next_deadline(&self) -> Option<u64> {
        self.matcher.next_deadline()
    }

    fn on_deadline(
        &mut self,
        _ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        now: u64,
        _out: &mut Actions<K>,
    ) {
        if self.matcher.poll(now) {
            session.set_typing(self.matcher.typing());
        }
    }
}

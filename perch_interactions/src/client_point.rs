// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchor the floating element to the cursor instead of the reference.

use kurbo::Point;
use perch_core::{
    Action, Actions, Behavior, Contribution, Ctx, DomView, EventKind, EventScope, Handled, Input,
    Session,
};

/// Which cursor axes feed the anchor point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PointAxis {
    /// Follow the cursor on both axes.
    #[default]
    Both,
    /// Follow horizontally; the vertical coordinate stays on the
    /// reference (context-menu rows).
    X,
    /// Follow vertically; the horizontal coordinate stays on the
    /// reference.
    Y,
}

/// Configuration for [`ClientPointBehavior`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ClientPointConfig {
    /// Axes to track.
    pub axis: PointAxis,
    /// A fixed anchor point; tracking is disabled while set (external
    /// coordinates, e.g. a context-menu press position).
    pub explicit: Option<Point>,
}

/// Emits [`Action::AnchorPoint`] as the pointer moves over the reference,
/// and over the document while open. While the element is hover-open the
/// anchor is locked so the element does not chase the cursor into itself.
pub struct ClientPointBehavior {
    config: ClientPointConfig,
    point: Option<Point>,
    locked: bool,
}

impl ClientPointBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(config: ClientPointConfig) -> Self {
        Self {
            config,
            point: None,
            locked: false,
        }
    }

    /// Replaces the explicit anchor. `None` resumes pointer tracking.
    pub fn set_explicit(&mut self, point: Option<Point>) {
        self.config.explicit = point;
    }

    fn resolve<K: Copy + Eq, D: DomView<K> + ?Sized>(
        &self,
        ctx: &Ctx<'_, K, D>,
        session: &Session<K>,
        cursor: Point,
    ) -> Point {
        if let Some(explicit) = self.config.explicit {
            return explicit;
        }
        let center = session
            .reference()
            .and_then(|r| ctx.dom.bounds(r))
            .map_or(cursor, |b| b.center());
        match self.config.axis {
            PointAxis::Both => cursor,
            PointAxis::X => Point::new(cursor.x, center.y),
            PointAxis::Y => Point::new(center.x, cursor.y),
        }
    }

    fn track<K: Copy + Eq, D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &Session<K>,
        cursor: Point,
        out: &mut Actions<K>,
    ) {
        if self.locked && self.config.explicit.is_none() {
            return;
        }
        let next = self.resolve(ctx, session, cursor);
        if self.point != Some(next) {
            self.point = Some(next);
            out.push(Action::AnchorPoint { point: next });
        }
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for ClientPointBehavior {
    fn contribution(&self, _session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        contribution.reference.subscribe(EventKind::PointerEnter);
        contribution.reference.subscribe(EventKind::PointerMove);
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
        match (scope, input) {
            (
                EventScope::Reference,
                Input::PointerEnter { pointer, .. } | Input::PointerMove { pointer, .. },
            ) => {
                self.track(ctx, session, pointer.position, out);
            }
            (EventScope::Document, Input::PointerMove { pointer, .. }) => {
                if session.open() {
                    self.track(ctx, session, pointer.position, out);
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
        event: &perch_core::SessionEvent,
        _now: u64,
        _out: &mut Actions<K>,
    ) {
        if let perch_core::SessionEvent::OpenChange { open, .. } = event {
            // Lock while hover-open so the anchored element holds still.
            self.locked = *open && session.open_event().is_some_and(|e| e.is_hover_like());
            if !open {
                self.point = None;
            }
        }
    }
}

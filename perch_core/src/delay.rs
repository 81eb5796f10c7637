// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover delays and delay groups.
//!
//! A [`Delay`] is an open/close millisecond pair resolved per pointer
//! type: touch has no hover phase, so delays resolve to zero for
//! non-mouse-like pointers.
//!
//! A [`DelayGroup`] coordinates a row of hover-triggered elements
//! (toolbar tooltips, menubar menus): once one member is open, moving to
//! a sibling opens it near-instantly instead of waiting out the full open
//! delay, and the previously open member is reported for closing. The
//! instant regime persists for a configurable timeout after the current
//! member closes, so a brief gap between siblings does not reset the
//! group.

use crate::input::PointerType;
use crate::timer::Timer;

/// Open and close delays in milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Delay {
    /// Delay before opening.
    pub open: u64,
    /// Delay before closing.
    pub close: u64,
}

/// Which transition a delay applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DelayPhase {
    /// Opening.
    Open,
    /// Closing.
    Close,
}

impl Delay {
    /// The same delay for both phases.
    #[must_use]
    pub const fn all(ms: u64) -> Self {
        Self { open: ms, close: ms }
    }

    /// Distinct open and close delays.
    #[must_use]
    pub const fn split(open: u64, close: u64) -> Self {
        Self { open, close }
    }

    /// Resolve the delay for `phase` under `pointer_type`.
    ///
    /// Non-mouse-like pointers (touch) resolve to zero: there is no
    /// hover phase to delay through.
    #[must_use]
    pub fn resolve(&self, phase: DelayPhase, pointer_type: Option<PointerType>) -> u64 {
        if pointer_type.is_some_and(|p| !p.is_mouse_like()) {
            return 0;
        }
        match phase {
            DelayPhase::Open => self.open,
            DelayPhase::Close => self.close,
        }
    }
}

/// Identifier of a member within a [`DelayGroup`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub u64);

/// Shared hover-delay state for a group of sibling floating elements.
#[derive(Clone, Debug)]
pub struct DelayGroup {
    initial: Delay,
    timeout_ms: u64,
    current: Option<GroupId>,
    instant_phase: bool,
    reopen_window: Timer,
}

impl DelayGroup {
    /// A group whose members start from `initial` delays. `timeout_ms` is
    /// how long the instant regime outlives the current member's close.
    #[must_use]
    pub fn new(initial: Delay, timeout_ms: u64) -> Self {
        Self {
            initial,
            timeout_ms,
            current: None,
            instant_phase: false,
            reopen_window: Timer::new(),
        }
    }

    /// The currently open member, if any.
    #[must_use]
    pub fn current(&self) -> Option<GroupId> {
        self.current
    }

    /// Whether a member opened under the instant regime (a sibling was
    /// already open, or had closed within the timeout window).
    #[must_use]
    pub fn is_instant_phase(&self) -> bool {
        self.instant_phase
    }

    /// The effective delay for members right now: the initial delays when
    /// the group is idle, an ~instant open (1 ms) while a member is
    /// current or the reopen window is live.
    #[must_use]
    pub fn delay(&self) -> Delay {
        if self.current.is_some() || self.reopen_window.is_scheduled() {
            Delay { open: 1, close: self.initial.close }
        } else {
            self.initial
        }
    }

    /// Record that member `id` opened. Returns the member that must close
    /// to make way, if a different one was current.
    pub fn note_open(&mut self, id: GroupId, _now: u64) -> Option<GroupId> {
        let was_active = self.current.is_some() || self.reopen_window.is_scheduled();
        self.reopen_window.cancel();
        let previous = self.current.filter(|&prev| prev != id);
        self.instant_phase = was_active && self.current != Some(id);
        self.current = Some(id);
        previous
    }

    /// Record that member `id` closed. Only the current member affects
    /// the group; a stale close from an already-replaced member is
    /// ignored.
    pub fn note_close(&mut self, id: GroupId, now: u64) {
        if self.current != Some(id) {
            return;
        }
        self.current = None;
        if self.timeout_ms > 0 {
            self.reopen_window.schedule(now, self.timeout_ms);
        } else {
            self.reset();
        }
    }

    /// Expire the reopen window. Returns `true` when the group reset to
    /// its initial delays.
    pub fn poll(&mut self, now: u64) -> bool {
        if self.reopen_window.fire(now) {
            self.reset();
            true
        } else {
            false
        }
    }

    /// The next instant `poll` has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.reopen_window.deadline()
    }

    fn reset(&mut self) {
        self.current = None;
        self.instant_phase = false;
        self.reopen_window.cancel();
    }
}

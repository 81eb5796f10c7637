// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-polled deadlines.
//!
//! There are no callbacks anywhere in Perch. A [`Timer`] is just an
//! optional millisecond deadline; the owner schedules it against the
//! host-supplied clock, exposes it through `next_deadline()`, and acts
//! when the host polls past it. Cancellation clears the deadline rather
//! than marking the work ignored, so a cancelled timer can never fire
//! late.

/// A single cancellable deadline in host milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<u64>,
}

impl Timer {
    /// An unscheduled timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Schedule `delay_ms` from `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: u64, delay_ms: u64) {
        self.deadline = Some(now.saturating_add(delay_ms));
    }

    /// Clear the deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// The pending deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it is due at `now`. Returns `true` at most
    /// once per schedule.
    pub fn fire(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prefix typeahead over item labels.
//!
//! Characters typed in quick succession accumulate into a buffer that is
//! prefix-matched (case-insensitively) against the item labels, starting
//! just past the previously matched item and wrapping, so repeated
//! matches walk the list. The buffer resets after a quiet period
//! ([`TypeaheadConfig::reset_ms`], 750 ms by default) tracked as a
//! host-polled deadline.
//!
//! While a word is being typed the matcher reports `typing = true`;
//! composed behaviors use that flag to leave Space and Enter alone and to
//! ignore Escape-dismissal of the word in progress.

use alloc::string::String;
use alloc::vec::Vec;

/// Configuration for a [`TypeaheadMatcher`].
#[derive(Clone, Debug)]
pub struct TypeaheadConfig {
    /// Quiet period before the buffer resets, in milliseconds.
    pub reset_ms: u64,
    /// Characters that never enter the buffer.
    pub ignore_chars: Vec<char>,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self { reset_ms: 750, ignore_chars: Vec::new() }
    }
}

/// Result of feeding one key to the matcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeaheadOutcome {
    /// The matched item index, if this key produced a match.
    pub matched: Option<usize>,
    /// The key belongs to the typeahead; the caller should consume it
    /// (prevent default and stop propagation).
    pub consume: bool,
    /// Typing state after this key.
    pub typing: bool,
}

/// The typeahead state machine.
#[derive(Clone, Debug)]
pub struct TypeaheadMatcher {
    config: TypeaheadConfig,
    buffer: String,
    // `Some(-1)` is the initial "before the list" position; `None` means
    // the last reset found no match and rotation starts at the top.
    prev_index: Option<isize>,
    match_index: Option<usize>,
    typing: bool,
    reset_deadline: Option<u64>,
}

fn lowercase(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

fn matching_index(labels: &[Option<&str>], ordered: &[Option<&str>], buffer: &str) -> Option<usize> {
    let needle = lowercase(buffer);
    let found = ordered
        .iter()
        .flatten()
        .find(|text| lowercase(text).starts_with(&needle))?;
    labels.iter().position(|label| *label == Some(*found))
}

impl Default for TypeaheadMatcher {
    fn default() -> Self {
        Self::new(TypeaheadConfig::default())
    }
}

impl TypeaheadMatcher {
    /// A matcher with the given configuration.
    #[must_use]
    pub fn new(config: TypeaheadConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            prev_index: Some(-1),
            match_index: None,
            typing: false,
            reset_deadline: None,
        }
    }

    /// Whether a word is being typed.
    #[must_use]
    pub fn typing(&self) -> bool {
        self.typing
    }

    /// The pending buffer-reset deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.reset_deadline
    }

    /// Reset typeahead state when the floating element opens.
    pub fn reset_on_open(&mut self) {
        self.buffer.clear();
        self.match_index = None;
        self.reset_deadline = None;
        self.typing = false;
    }

    /// Sync the rotation start to externally driven navigation (arrow
    /// keys, selection). Only applies between words.
    pub fn sync_active(&mut self, index: Option<usize>) {
        if self.buffer.is_empty() {
            self.prev_index = Some(index.map_or(-1, |i| i as isize));
        }
    }

    /// Feed a non-character key (Enter, arrows). Never matches, but a
    /// stale buffer that no longer matches ends the typing state.
    pub fn on_other_key(&mut self, labels: &[Option<&str>]) -> TypeaheadOutcome {
        self.check_stale_buffer(labels, false);
        TypeaheadOutcome { matched: None, consume: false, typing: self.typing }
    }

    /// Feed one character. `has_chord` is true when a non-Shift modifier
    /// is held (shortcut, not text). `open` is the floating element's
    /// open state; printable keys are consumed while it is open.
    pub fn on_char(
        &mut self,
        labels: &[Option<&str>],
        c: char,
        has_chord: bool,
        open: bool,
        now: u64,
    ) -> TypeaheadOutcome {
        let mut consume = self.check_stale_buffer(labels, c == ' ');

        if self.config.ignore_chars.contains(&c) || has_chord {
            return TypeaheadOutcome { matched: None, consume, typing: self.typing };
        }

        if open && c != ' ' {
            consume = true;
            self.typing = true;
        }

        // Rapid repeats of one letter cycle through items sharing that
        // first letter, but only when no label's own second letter equals
        // its first (those need the full prefix to disambiguate).
        let allow_rapid = labels.iter().flatten().all(|text| {
            let mut chars = text.chars().flat_map(char::to_lowercase);
            let first = chars.next();
            let second = chars.next();
            first.is_none() || first != second
        });
        if allow_rapid && self.buffer.chars().eq(core::iter::once(c)) {
            self.buffer.clear();
            self.prev_index = self.match_index.map(|i| i as isize);
        }

        self.buffer.push(c);
        self.reset_deadline = Some(now.saturating_add(self.config.reset_ms));

        let prev = self.prev_index.unwrap_or(0);
        let start = (prev + 1).max(0) as usize;
        let split = start.min(labels.len());
        let mut ordered: Vec<Option<&str>> = Vec::with_capacity(labels.len());
        ordered.extend_from_slice(&labels[split..]);
        ordered.extend_from_slice(&labels[..split]);

        match matching_index(labels, &ordered, &self.buffer) {
            Some(index) => {
                if c == ' ' {
                    consume = true;
                }
                self.match_index = Some(index);
                TypeaheadOutcome { matched: Some(index), consume, typing: self.typing }
            }
            None => {
                if c != ' ' {
                    self.buffer.clear();
                    self.typing = false;
                }
                TypeaheadOutcome { matched: None, consume, typing: self.typing }
            }
        }
    }

    /// Space key-up ends the typing state.
    pub fn on_space_up(&mut self) {
        self.typing = false;
    }

    /// Expire the buffer-reset deadline. Returns `true` when the buffer
    /// reset (typing ended).
    pub fn poll(&mut self, now: u64) -> bool {
        match self.reset_deadline {
            Some(deadline) if now >= deadline => {
                self.reset_deadline = None;
                self.buffer.clear();
                self.prev_index = self.match_index.map(|i| i as isize);
                self.typing = false;
                true
            }
            _ => false,
        }
    }

    // A buffer that no longer matches anything ends typing; a matching
    // buffer claims the Space key.
    fn check_stale_buffer(&mut self, labels: &[Option<&str>], is_space: bool) -> bool {
        if self.buffer.is_empty() || self.buffer.starts_with(' ') {
            return false;
        }
        if matching_index(labels, labels, &self.buffer).is_none() {
            self.typing = false;
            false
        } else {
            is_space
        }
    }
}

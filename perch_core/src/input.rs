// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events as plain values.
//!
//! Hosts translate their native events (DOM, winit, test fixtures) into
//! [`Input`] values and feed them to the interaction composer together with
//! an explicit `now: u64` millisecond timestamp. Events carry the node key
//! `K` of the element they were observed on; document-level events use the
//! [`EventScope::Document`](crate::EventScope::Document) dispatch scope
//! rather than a key.

use kurbo::Point;

bitflags::bitflags! {
    /// Keyboard modifier state attached to key events.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        /// Control.
        const CTRL = 1 << 0;
        /// Alt / Option.
        const ALT = 1 << 1;
        /// Meta / Command / Windows.
        const META = 1 << 2;
        /// Shift.
        const SHIFT = 1 << 3;
    }
}

impl Modifiers {
    /// Whether a chord modifier (anything but Shift) is held.
    ///
    /// Chorded keys are shortcuts, not text entry; typeahead ignores them.
    #[must_use]
    pub fn has_chord(self) -> bool {
        self.intersects(Self::CTRL | Self::ALT | Self::META)
    }
}

/// The kind of pointing device behind a pointer event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerType {
    /// A mouse.
    Mouse,
    /// A stylus.
    Pen,
    /// A finger.
    Touch,
}

impl PointerType {
    /// Whether the pointer hovers before it touches.
    ///
    /// Mouse and pen produce meaningful enter/leave and rest sequences;
    /// touch does not, so hover delays resolve to zero for it.
    #[must_use]
    pub fn is_mouse_like(self) -> bool {
        matches!(self, Self::Mouse | Self::Pen)
    }
}

/// Snapshot of pointer state carried on pointer events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerState {
    /// Position in the host's viewport coordinate space.
    pub position: Point,
    /// Position relative to the target's padding box. Used by the
    /// scrollbar-press heuristic; hosts that cannot supply it pass the
    /// viewport position and opt out of that heuristic.
    pub offset: Point,
    /// Device kind.
    pub pointer_type: PointerType,
    /// Button index (0 = main).
    pub button: i16,
}

impl PointerState {
    /// A main-button mouse pointer at `position`.
    #[must_use]
    pub fn mouse(position: Point) -> Self {
        Self {
            position,
            offset: position,
            pointer_type: PointerType::Mouse,
            button: 0,
        }
    }

    /// A touch contact at `position`.
    #[must_use]
    pub fn touch(position: Point) -> Self {
        Self {
            position,
            offset: position,
            pointer_type: PointerType::Touch,
            button: 0,
        }
    }
}

/// Keyboard keys the interaction layer reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Enter.
    Enter,
    /// Space bar.
    Space,
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// A printable character.
    Char(char),
}

impl Key {
    /// The printable character for this key, if any. Space counts: it is
    /// both a press key and a typeahead character.
    #[must_use]
    pub fn to_char(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c),
            Self::Space => Some(' '),
            _ => None,
        }
    }
}

/// One input event observed by the host.
///
/// `related` on leave/focus transitions is the node gaining the pointer or
/// focus, when the host knows it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Input<K> {
    /// Pointer entered `target`.
    PointerEnter {
        /// Node under the pointer.
        target: K,
        /// Pointer snapshot.
        pointer: PointerState,
    },
    /// Pointer left `target`.
    PointerLeave {
        /// Node the pointer left.
        target: K,
        /// Pointer snapshot.
        pointer: PointerState,
        /// Node gaining the pointer, if known.
        related: Option<K>,
    },
    /// Pointer moved over `target`.
    PointerMove {
        /// Node under the pointer.
        target: K,
        /// Pointer snapshot.
        pointer: PointerState,
    },
    /// Pointer pressed on `target`.
    PointerDown {
        /// Pressed node.
        target: K,
        /// Pointer snapshot.
        pointer: PointerState,
    },
    /// Pointer released on `target`.
    PointerUp {
        /// Released node.
        target: K,
        /// Pointer snapshot.
        pointer: PointerState,
    },
    /// A click was synthesized on `target`.
    Click {
        /// Clicked node.
        target: K,
        /// Pointer snapshot.
        pointer: PointerState,
        /// True for assistive-technology clicks with no real pointer
        /// (zero-detail clicks, screen-reader activation).
        is_virtual: bool,
    },
    /// Key pressed while `target` had focus.
    KeyDown {
        /// Focused node.
        target: K,
        /// The key.
        key: Key,
        /// Modifier state.
        modifiers: Modifiers,
    },
    /// Key released while `target` had focus.
    KeyUp {
        /// Focused node.
        target: K,
        /// The key.
        key: Key,
        /// Modifier state.
        modifiers: Modifiers,
    },
    /// `target` gained focus.
    FocusIn {
        /// Newly focused node.
        target: K,
        /// Node losing focus, if known.
        related: Option<K>,
    },
    /// `target` lost focus.
    FocusOut {
        /// Node losing focus.
        target: K,
        /// Node gaining focus, if known.
        related: Option<K>,
    },
    /// A scroll container scrolled.
    Scroll {
        /// The scrolled node.
        target: K,
    },
    /// The window lost focus entirely.
    WindowBlur,
}

impl<K: Copy> Input<K> {
    /// The node this event was observed on, if any.
    #[must_use]
    pub fn target(&self) -> Option<K> {
        match *self {
            Self::PointerEnter { target, .. }
            | Self::PointerLeave { target, .. }
            | Self::PointerMove { target, .. }
            | Self::PointerDown { target, .. }
            | Self::PointerUp { target, .. }
            | Self::Click { target, .. }
            | Self::KeyDown { target, .. }
            | Self::KeyUp { target, .. }
            | Self::FocusIn { target, .. }
            | Self::FocusOut { target, .. }
            | Self::Scroll { target } => Some(target),
            Self::WindowBlur => None,
        }
    }

    /// The pointer snapshot, for pointer events.
    #[must_use]
    pub fn pointer(&self) -> Option<PointerState> {
        match *self {
            Self::PointerEnter { pointer, .. }
            | Self::PointerLeave { pointer, .. }
            | Self::PointerMove { pointer, .. }
            | Self::PointerDown { pointer, .. }
            | Self::PointerUp { pointer, .. }
            | Self::Click { pointer, .. } => Some(pointer),
            _ => None,
        }
    }
}

/// The kind of input that triggered an open, without its payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerKind {
    /// Opened from a pointer entering the reference.
    PointerEnter,
    /// Opened from pointer movement (rest detection).
    PointerMove,
    /// Opened from a press.
    PointerDown,
    /// Opened from a click.
    Click,
    /// Opened from a key press.
    KeyDown,
    /// Opened from the reference gaining focus.
    FocusIn,
}

/// Snapshot of the event that opened the floating element.
///
/// Behaviors consult this to disambiguate modalities: hover's close logic
/// stands down when the element was click-opened, and the focus manager
/// returns focus to the reference after click-like opens.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpenEvent {
    /// What kind of input opened the element.
    pub kind: TriggerKind,
    /// Device kind for pointer-driven opens.
    pub pointer_type: Option<PointerType>,
}

impl OpenEvent {
    /// Build a snapshot from the triggering input, if it is a kind that
    /// can open a floating element.
    #[must_use]
    pub fn from_input<K: Copy>(input: &Input<K>) -> Option<Self> {
        let (kind, pointer_type) = match *input {
            Input::PointerEnter { pointer, .. } => (TriggerKind::PointerEnter, Some(pointer)),
            Input::PointerMove { pointer, .. } => (TriggerKind::PointerMove, Some(pointer)),
            Input::PointerDown { pointer, .. } => (TriggerKind::PointerDown, Some(pointer)),
            Input::Click { pointer, .. } => (TriggerKind::Click, Some(pointer)),
            Input::KeyDown { .. } => (TriggerKind::KeyDown, None),
            Input::FocusIn { .. } => (TriggerKind::FocusIn, None),
            _ => return None,
        };
        Some(Self {
            kind,
            pointer_type: pointer_type.map(|p| p.pointer_type),
        })
    }

    /// Whether the open came from hovering rather than pressing.
    ///
    /// True for mouse-like enter/move trigger kinds. A press or click open
    /// disables hover's own close logic.
    #[must_use]
    pub fn is_hover_like(&self) -> bool {
        matches!(self.kind, TriggerKind::PointerEnter | TriggerKind::PointerMove)
            && self.pointer_type.is_some_and(PointerType::is_mouse_like)
    }

    /// Whether the open came from a press or click.
    #[must_use]
    pub fn is_press_like(&self) -> bool {
        matches!(self.kind, TriggerKind::PointerDown | TriggerKind::Click)
    }
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop bundles and their merge.
//!
//! Each behavior contributes attributes and event subscriptions for the
//! three render targets (reference, floating, items) as an immutable
//! [`Contribution`]. The composer merges contributions in registration
//! order into [`PropBundles`] the host spreads onto its elements:
//!
//! - attributes: later contributions override earlier ones per key, and
//!   caller overrides apply last;
//! - event subscriptions: the union, in first-subscription order — the
//!   host binds one listener per kind and routes through the composer,
//!   which fans events out to every behavior;
//! - the floating bundle is pre-seeded with `TabIndex(-1)` and the
//!   floating-root marker so the trap can focus the root before any
//!   behavior runs;
//! - the item bundle strips the [`AttrKey::ActiveItem`] and
//!   [`AttrKey::SelectedItem`] bookkeeping keys, which exist only to let
//!   item-aware behaviors communicate during the merge.
//!
//! A disabled behavior contributes [`Contribution::default`], never a
//! missing record, so consumers need no null case.

use smallvec::SmallVec;

/// Event kinds a contribution can subscribe a target to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Pointer enter.
    PointerEnter,
    /// Pointer leave.
    PointerLeave,
    /// Pointer move.
    PointerMove,
    /// Pointer down.
    PointerDown,
    /// Pointer up.
    PointerUp,
    /// Click.
    Click,
    /// Key down.
    KeyDown,
    /// Key up.
    KeyUp,
    /// Focus gained.
    FocusIn,
    /// Focus lost.
    FocusOut,
    /// Scroll.
    Scroll,
}

/// Attribute keys. One value per key survives the merge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttrKey {
    /// ARIA role.
    Role,
    /// Tab index.
    TabIndex,
    /// `aria-expanded`.
    AriaExpanded,
    /// `aria-haspopup`.
    AriaHasPopup,
    /// `aria-controls`, as a node reference.
    AriaControls,
    /// `aria-selected`.
    AriaSelected,
    /// `aria-activedescendant`, as a node reference.
    AriaActiveDescendant,
    /// `aria-orientation`.
    AriaOrientation,
    /// `aria-modal`.
    AriaModal,
    /// Marker identifying the floating root element.
    FloatingRoot,
    /// Merge-time bookkeeping: this item is the active one. Stripped
    /// from the final item bundle.
    ActiveItem,
    /// Merge-time bookkeeping: this item is the selected one. Stripped
    /// from the final item bundle.
    SelectedItem,
}

/// Attribute values. Node references let the host resolve its own ids.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AttrValue<K> {
    /// A bare marker attribute.
    Flag,
    /// A boolean attribute.
    Bool(bool),
    /// An integer attribute.
    Int(i64),
    /// A static string attribute.
    Str(&'static str),
    /// A reference to another node.
    Node(K),
}

/// An ordered attribute list with per-key override semantics.
#[derive(Clone, Debug, PartialEq)]
pub struct Attrs<K> {
    entries: SmallVec<[(AttrKey, AttrValue<K>); 4]>,
}

impl<K> Default for Attrs<K> {
    fn default() -> Self {
        Self { entries: SmallVec::new() }
    }
}

impl<K: Copy + PartialEq> Attrs<K> {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, overriding a previous value in place.
    pub fn set(&mut self, key: AttrKey, value: AttrValue<K>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Builder form of [`Attrs::set`].
    #[must_use]
    pub fn with(mut self, key: AttrKey, value: AttrValue<K>) -> Self {
        self.set(key, value);
        self
    }

    /// The value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: AttrKey) -> Option<AttrValue<K>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|&(_, v)| v)
    }

    /// Remove `key` if present.
    pub fn remove(&mut self, key: AttrKey) {
        self.entries.retain(|(k, _)| *k != key);
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (AttrKey, AttrValue<K>)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Attributes and event subscriptions for one render target.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetProps<K> {
    /// Merged attributes.
    pub attrs: Attrs<K>,
    /// Event kinds the target must be wired for, in first-subscription
    /// order.
    pub events: SmallVec<[EventKind; 8]>,
}

impl<K> Default for TargetProps<K> {
    fn default() -> Self {
        Self { attrs: Attrs::default(), events: SmallVec::new() }
    }
}

impl<K: Copy + PartialEq> TargetProps<K> {
    /// Subscribe the target to `kind` (idempotent).
    pub fn subscribe(&mut self, kind: EventKind) {
        if !self.events.contains(&kind) {
            self.events.push(kind);
        }
    }

    /// Builder form of [`TargetProps::subscribe`].
    #[must_use]
    pub fn with_event(mut self, kind: EventKind) -> Self {
        self.subscribe(kind);
        self
    }

    fn apply(&mut self, other: &Self) {
        for (key, value) in other.attrs.iter() {
            self.attrs.set(key, value);
        }
        for &kind in &other.events {
            self.subscribe(kind);
        }
    }
}

/// One behavior's props for all three targets.
#[derive(Clone, Debug, PartialEq)]
pub struct Contribution<K> {
    /// Props for the reference element.
    pub reference: TargetProps<K>,
    /// Props for the floating element.
    pub floating: TargetProps<K>,
    /// Props for each list item.
    pub item: TargetProps<K>,
}

impl<K> Default for Contribution<K> {
    fn default() -> Self {
        Self {
            reference: TargetProps::default(),
            floating: TargetProps::default(),
            item: TargetProps::default(),
        }
    }
}

/// The merged bundles the host spreads onto its elements.
#[derive(Clone, Debug, PartialEq)]
pub struct PropBundles<K> {
    /// Merged reference props.
    pub reference: TargetProps<K>,
    /// Merged floating props.
    pub floating: TargetProps<K>,
    /// Merged item props.
    pub item: TargetProps<K>,
}

impl<K> Default for PropBundles<K> {
    fn default() -> Self {
        Self {
            reference: TargetProps::default(),
            floating: TargetProps::default(),
            item: TargetProps::default(),
        }
    }
}

/// Merge `contributions` in order, then `user` overrides last.
#[must_use]
pub fn merge<K: Copy + PartialEq>(
    contributions: &[Contribution<K>],
    user: Option<&Contribution<K>>,
) -> PropBundles<K> {
    let mut bundles = PropBundles::default();
    bundles.floating.attrs.set(AttrKey::TabIndex, AttrValue::Int(-1));
    bundles.floating.attrs.set(AttrKey::FloatingRoot, AttrValue::Flag);
    for contribution in contributions.iter().chain(user) {
        bundles.reference.apply(&contribution.reference);
        bundles.floating.apply(&contribution.floating);
        bundles.item.apply(&contribution.item);
    }
    bundles.item.attrs.remove(AttrKey::ActiveItem);
    bundles.item.attrs.remove(AttrKey::SelectedItem);
    bundles
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ARIA role and relationship attributes.

use perch_core::{AttrKey, AttrValue, Behavior, Contribution, DomView, Session};

/// What the floating element is, semantically.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Role {
    /// A hover/focus tooltip.
    Tooltip,
    /// A generic popup disclosure.
    #[default]
    Dialog,
    /// An alert dialog.
    AlertDialog,
    /// A menu of actions.
    Menu,
    /// A listbox (select).
    Listbox,
    /// A grid of cells.
    Grid,
    /// A tree view.
    Tree,
}

impl Role {
    fn floating_role(self) -> &'static str {
        match self {
            Self::Tooltip => "tooltip",
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::Menu => "menu",
            Self::Listbox => "listbox",
            Self::Grid => "grid",
            Self::Tree => "tree",
        }
    }

    /// The `aria-haspopup` token for the reference, `None` for roles that
    /// are not popups in the ARIA sense.
    fn haspopup(self) -> Option<&'static str> {
        match self {
            Self::Tooltip => None,
            Self::Dialog | Self::AlertDialog => Some("dialog"),
            Self::Menu => Some("menu"),
            Self::Listbox => Some("listbox"),
            Self::Grid => Some("grid"),
            Self::Tree => Some("tree"),
        }
    }

    fn item_role(self) -> Option<&'static str> {
        match self {
            Self::Menu => Some("menuitem"),
            Self::Listbox => Some("option"),
            Self::Tree => Some("treeitem"),
            _ => None,
        }
    }
}

/// Contributes role and relationship attributes; handles no events.
pub struct RoleBehavior {
    role: Role,
}

impl RoleBehavior {
    /// Creates the behavior.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for RoleBehavior {
    fn contribution(&self, session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        contribution
            .floating
            .attrs
            .set(AttrKey::Role, AttrValue::Str(self.role.floating_role()));
        if let Some(token) = self.role.haspopup() {
            contribution
                .reference
                .attrs
                .set(AttrKey::AriaHasPopup, AttrValue::Str(token));
            contribution
                .reference
                .attrs
                .set(AttrKey::AriaExpanded, AttrValue::Bool(session.open()));
            if session.open() {
                if let Some(floating) = session.floating() {
                    contribution
                        .reference
                        .attrs
                        .set(AttrKey::AriaControls, AttrValue::Node(floating));
                }
            }
        }
        if matches!(self.role, Role::AlertDialog) {
            contribution
                .floating
                .attrs
                .set(AttrKey::AriaModal, AttrValue::Bool(true));
        }
        if let Some(role) = self.role.item_role() {
            contribution.item.attrs.set(AttrKey::Role, AttrValue::Str(role));
        }
        contribution
    }
}

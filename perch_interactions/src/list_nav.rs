// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arrow-key navigation over the floating element's items.

use alloc::vec::Vec;

use perch_core::{
    Action, Actions, AttrKey, AttrValue, Behavior, ConfigIssue, Contribution, Ctx, DomView,
    EventKind, EventScope, Handled, Input, Key, OpenChangeReason, OpenEvent, PointerType, Session,
    SessionEvent,
};
use perch_list::{
    Arrow, Dimensions, GridConfig, ItemSource, LinearConfig, Orientation, grid_navigate,
    grid_navigate_spanned, in_bounds, is_cross_close_key, is_cross_open_key, is_main_key,
    is_main_to_end_key, max_index, min_index,
};

/// When opening moves the active index onto an item.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FocusItemOnOpen {
    /// Only for keyboard-driven opens.
    #[default]
    Auto,
    /// On every open.
    Always,
    /// Never; the host moves the index itself.
    Never,
}

/// Configuration for [`ListNavBehavior`].
#[derive(Clone, Debug)]
pub struct ListNavConfig {
    /// Whether the behavior participates at all.
    pub enabled: bool,
    /// Main navigation axis.
    pub orientation: Orientation,
    /// Wrap at the list ends.
    pub looping: bool,
    /// Right-to-left layout.
    pub rtl: bool,
    /// Keep real focus on the reference and drive `aria-activedescendant`
    /// instead of focusing items (combobox pattern).
    pub is_virtual: bool,
    /// This list is a submenu: the cross-axis keys open and close it.
    pub nested: bool,
    /// Columns; above 1 the list navigates as a grid.
    pub cols: usize,
    /// With `looping`, stepping past the ends clears the active item
    /// instead of wrapping there. Requires `is_virtual`.
    pub allow_escape: bool,
    /// Arrow keys on a closed reference open the list.
    pub open_on_arrow_key_down: bool,
    /// Seed the active index when the list opens.
    pub focus_item_on_open: FocusItemOnOpen,
    /// Pointer hover moves the active index onto items.
    pub focus_item_on_hover: bool,
    /// Ask the host to scroll newly active items into view during
    /// keyboard navigation.
    pub scroll_item_into_view: bool,
    /// The selected item (selects); seeds navigation and the open sync.
    pub selected_index: Option<usize>,
    /// Cell spans for grid items; `None` means every item is one cell.
    pub sizes: Option<Vec<Dimensions>>,
    /// Dense packing for the spanned-grid cell map.
    pub dense: bool,
}

impl Default for ListNavConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            orientation: Orientation::default(),
            looping: false,
            rtl: false,
            is_virtual: false,
            nested: false,
            cols: 1,
            allow_escape: false,
            open_on_arrow_key_down: true,
            focus_item_on_open: FocusItemOnOpen::default(),
            focus_item_on_hover: true,
            scroll_item_into_view: true,
            selected_index: None,
            sizes: None,
            dense: false,
        }
    }
}

impl ListNavConfig {
    /// Configuration combinations that would silently not engage.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.allow_escape && !self.looping {
            issues.push(ConfigIssue::AllowEscapeRequiresLooping);
        }
        if self.allow_escape && !self.is_virtual {
            issues.push(ConfigIssue::AllowEscapeRequiresVirtual);
        }
        issues
    }
}

/// The registered items, with disabled state pulled from the host tree.
struct DomItems<'a, K: Copy + Eq, D: DomView<K> + ?Sized> {
    items: &'a [K],
    dom: &'a D,
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> ItemSource for DomItems<'_, K, D> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_disabled(&self, index: usize) -> bool {
        self.items
            .get(index)
            .is_none_or(|&item| self.dom.is_disabled(item))
    }
}

fn to_arrow(key: Key) -> Option<Arrow> {
    match key {
        Key::ArrowUp => Some(Arrow::Up),
        Key::ArrowDown => Some(Arrow::Down),
        Key::ArrowLeft => Some(Arrow::Left),
        Key::ArrowRight => Some(Arrow::Right),
        _ => None,
    }
}

/// Moves an active index through the item list with arrow keys, Home and
/// End, including grid layouts and nested submenus.
///
/// The host registers the item elements with [`set_items`] in list order
/// and applies the emitted [`Action::Navigate`], [`Action::Focus`], and
/// [`Action::ScrollItemIntoView`] effects.
///
/// [`set_items`]: ListNavBehavior::set_items
pub struct ListNavBehavior<K> {
    config: ListNavConfig,
    items: Vec<K>,
    /// Working index, `-1` when nothing is active. May sit out of bounds
    /// transiently under `allow_escape`.
    index: isize,
    active: Option<usize>,
    /// The arrow that initiated an open, for the open sync. `None` for a
    /// main-axis arrow on a nested list.
    open_arrow: Option<Arrow>,
    /// The last recorded navigation key was an arrow at all; cleared on
    /// close.
    had_nav_key: bool,
    /// Pointer (not keyboard) is the current modality.
    pointer_modality: bool,
    force_scroll: bool,
}

impl<K: Copy + Eq> ListNavBehavior<K> {
    /// Creates the behavior with an empty item list.
    #[must_use]
    pub fn new(config: ListNavConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            index: -1,
            active: None,
            open_arrow: None,
            had_nav_key: false,
            pointer_modality: false,
            force_scroll: false,
        }
    }

    /// Replaces the registered items, in list order.
    pub fn set_items(&mut self, items: Vec<K>) {
        self.items = items;
        if self
            .active
            .is_some_and(|active| active >= self.items.len())
        {
            self.active = None;
            self.index = -1;
        }
    }

    /// Replaces the selected index (selects keep this in sync).
    pub fn set_selected_index(&mut self, selected: Option<usize>) {
        self.config.selected_index = selected;
    }

    /// The current active index.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn grid_config(&self) -> GridConfig {
        GridConfig {
            orientation: self.config.orientation,
            looping: self.config.looping,
            rtl: self.config.rtl,
            cols: self.config.cols,
        }
    }

    fn navigate(&mut self, next: Option<usize>, out: &mut Actions<K>) {
        self.active = next;
        out.push(Action::Navigate { index: next });
        if let Some(index) = next {
            if !self.config.is_virtual {
                if let Some(&item) = self.items.get(index) {
                    out.push(Action::Focus { node: item, prevent_scroll: true });
                }
            }
            if self.config.scroll_item_into_view && (self.force_scroll || !self.pointer_modality) {
                out.push(Action::ScrollItemIntoView { index });
            }
        }
        self.force_scroll = false;
    }

    /// Arrow/Home/End handling shared by the floating element and, for
    /// virtual lists, the reference.
    fn on_nav_key<D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &mut Session<K>,
        key: Key,
        out: &mut Actions<K>,
    ) -> Option<Handled> {
        let arrow = to_arrow(key);
        if let Some(arrow) = arrow {
            if self.config.nested
                && is_cross_close_key(arrow, self.config.orientation, self.config.rtl)
                && session.open()
            {
                out.push(Action::StopPropagation);
                out.push(Action::PreventDefault);
                session.apply_open_change(false, OpenChangeReason::ListNavigation, None);
                if let Some(reference) = session.reference() {
                    out.push(Action::Focus { node: reference, prevent_scroll: false });
                }
                return Some(Handled);
            }
        }
        match key {
            Key::Home => {
                out.push(Action::PreventDefault);
                let items = DomItems { items: &self.items, dom: ctx.dom };
                self.index = min_index(&items);
                let next = in_bounds(&items, self.index);
                self.navigate(next, out);
                return Some(Handled);
            }
            Key::End => {
                out.push(Action::PreventDefault);
                let items = DomItems { items: &self.items, dom: ctx.dom };
                self.index = max_index(&items);
                let next = in_bounds(&items, self.index);
                self.navigate(next, out);
                return Some(Handled);
            }
            _ => {}
        }
        let arrow = arrow?;
        if self.config.cols > 1 {
            out.push(Action::PreventDefault);
            let items = DomItems { items: &self.items, dom: ctx.dom };
            if let Some(sizes) = self.config.sizes.clone() {
                let landed = grid_navigate_spanned(
                    &items,
                    &sizes,
                    self.config.dense,
                    arrow,
                    &self.grid_config(),
                    self.index,
                );
                if let Some(item) = landed {
                    self.index = item as isize;
                    self.navigate(Some(item), out);
                }
            } else {
                let min = min_index(&items);
                let max = max_index(&items);
                self.index =
                    grid_navigate(&items, arrow, &self.grid_config(), min, max, self.index);
                let next = in_bounds(&items, self.index);
                self.navigate(next, out);
            }
            if self.config.orientation == Orientation::Both {
                return Some(Handled);
            }
        }
        if !is_main_key(arrow, self.config.orientation) {
            return None;
        }
        out.push(Action::PreventDefault);
        out.push(Action::StopPropagation);
        let forward = is_main_to_end_key(arrow, self.config.orientation, self.config.rtl);
        // When the floating container itself has focus, jump to the edge
        // rather than stepping from a stale index.
        if session.open()
            && !self.config.is_virtual
            && session
                .floating()
                .is_some_and(|f| ctx.dom.active_element() == Some(f))
        {
            let items = DomItems { items: &self.items, dom: ctx.dom };
            self.index = if forward { min_index(&items) } else { max_index(&items) };
            let next = in_bounds(&items, self.index);
            self.navigate(next, out);
            return Some(Handled);
        }
        let config = LinearConfig {
            looping: self.config.looping,
            allow_escape: self.config.allow_escape && self.config.is_virtual,
        };
        let items = DomItems { items: &self.items, dom: ctx.dom };
        self.index = perch_list::linear_navigate(&items, self.index, forward, &config);
        let next = in_bounds(&items, self.index);
        self.navigate(next, out);
        Some(Handled)
    }

    fn on_reference_key<D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &mut Session<K>,
        input: &Input<K>,
        key: Key,
        out: &mut Actions<K>,
    ) -> Option<Handled> {
        self.pointer_modality = false;
        let was_open = session.open();
        if self.config.is_virtual && was_open {
            return self.on_nav_key(ctx, session, key, out);
        }
        let arrow = to_arrow(key)?;
        if !was_open && !self.config.open_on_arrow_key_down {
            return None;
        }
        let main = is_main_to_end_key(arrow, self.config.orientation, self.config.rtl);
        self.had_nav_key = true;
        self.open_arrow = if self.config.nested && main { None } else { Some(arrow) };
        if self.config.nested {
            if is_cross_open_key(arrow, self.config.orientation, self.config.rtl) {
                out.push(Action::StopPropagation);
                out.push(Action::PreventDefault);
                if session.open() {
                    let items = DomItems { items: &self.items, dom: ctx.dom };
                    self.index = min_index(&items);
                    let next = in_bounds(&items, self.index);
                    self.navigate(next, out);
                } else {
                    session.apply_open_change(
                        true,
                        OpenChangeReason::ListNavigation,
                        OpenEvent::from_input(input),
                    );
                }
                return Some(Handled);
            }
            return None;
        }
        if main {
            if let Some(selected) = self.config.selected_index {
                self.index = selected as isize;
            }
            out.push(Action::PreventDefault);
            out.push(Action::StopPropagation);
            if !was_open && self.config.open_on_arrow_key_down {
                session.apply_open_change(
                    true,
                    OpenChangeReason::ListNavigation,
                    OpenEvent::from_input(input),
                );
            } else {
                self.on_nav_key(ctx, session, key, out);
            }
            if was_open {
                let items = DomItems { items: &self.items, dom: ctx.dom };
                let next = in_bounds(&items, self.index);
                self.navigate(next, out);
            }
            return Some(Handled);
        }
        None
    }

    fn seed_on_open<D: DomView<K> + ?Sized>(
        &mut self,
        ctx: &Ctx<'_, K, D>,
        session: &Session<K>,
        out: &mut Actions<K>,
    ) {
        let focus_on_open = match self.config.focus_item_on_open {
            FocusItemOnOpen::Always => true,
            FocusItemOnOpen::Never => false,
            // Keyboard opens seed the index; pointer opens leave it to
            // hover.
            FocusItemOnOpen::Auto => {
                self.had_nav_key
                    || session
                        .open_event()
                        .is_none_or(|e| !e.is_press_like() && !e.is_hover_like())
            }
        };
        if !focus_on_open {
            return;
        }
        if let Some(selected) = self.config.selected_index {
            self.force_scroll = true;
            self.index = selected as isize;
            self.navigate(Some(selected), out);
            return;
        }
        let items = DomItems { items: &self.items, dom: ctx.dom };
        let from_end = self.open_arrow.is_some_and(|arrow| {
            !is_main_to_end_key(arrow, self.config.orientation, self.config.rtl)
        }) && !self.config.nested;
        self.index = if from_end { max_index(&items) } else { min_index(&items) };
        let next = in_bounds(&items, self.index);
        self.navigate(next, out);
    }
}

impl<K: Copy + Eq, D: DomView<K> + ?Sized> Behavior<K, D> for ListNavBehavior<K> {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn contribution(&self, session: &Session<K>) -> Contribution<K> {
        let mut contribution = Contribution::default();
        for kind in [EventKind::KeyDown, EventKind::FocusIn, EventKind::PointerDown] {
            contribution.reference.subscribe(kind);
        }
        contribution.floating.subscribe(EventKind::KeyDown);
        contribution.floating.subscribe(EventKind::PointerMove);
        if self.config.orientation != Orientation::Both {
            let orientation = match self.config.orientation {
                Orientation::Vertical => "vertical",
                _ => "horizontal",
            };
            contribution
                .floating
                .attrs
                .set(AttrKey::AriaOrientation, AttrValue::Str(orientation));
        }
        if self.config.is_virtual && session.open() {
            if let Some(&item) = self.active.and_then(|i| self.items.get(i)) {
                contribution
                    .reference
                    .attrs
                    .set(AttrKey::AriaActiveDescendant, AttrValue::Node(item));
                contribution
                    .floating
                    .attrs
                    .set(AttrKey::AriaActiveDescendant, AttrValue::Node(item));
            }
        }
        for kind in [
            EventKind::FocusIn,
            EventKind::Click,
            EventKind::PointerMove,
            EventKind::PointerLeave,
        ] {
            contribution.item.subscribe(kind);
        }
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
            (EventScope::Reference, Input::KeyDown { key, .. }) => {
                self.on_reference_key(ctx, session, input, *key, out)
            }
            (EventScope::Reference, Input::FocusIn { .. }) => {
                if session.open() {
                    self.navigate(None, out);
                }
                None
            }
            (EventScope::Floating, Input::KeyDown { key, .. }) => {
                if session.open() {
                    self.on_nav_key(ctx, session, *key, out)
                } else {
                    None
                }
            }
            (EventScope::Floating, Input::PointerMove { .. }) => {
                self.pointer_modality = true;
                None
            }
            (EventScope::Item(index), Input::FocusIn { .. }) => {
                self.index = index as isize;
                self.navigate(Some(index), out);
                None
            }
            (EventScope::Item(index), Input::PointerMove { .. }) => {
                if self.config.focus_item_on_hover && self.active != Some(index) {
                    self.pointer_modality = true;
                    self.index = index as isize;
                    self.navigate(Some(index), out);
                }
                None
            }
            (EventScope::Item(index), Input::Click { .. }) => {
                if let Some(&item) = self.items.get(index) {
                    out.push(Action::Focus { node: item, prevent_scroll: true });
                }
                None
            }
            (EventScope::Item(_), Input::PointerLeave { pointer, .. }) => {
                if self.config.focus_item_on_hover
                    && self.pointer_modality
                    && pointer.pointer_type != PointerType::Touch
                {
                    self.index = -1;
                    self.navigate(None, out);
                    if !self.config.is_virtual {
                        if let Some(floating) = session.floating() {
                            out.push(Action::Focus { node: floating, prevent_scroll: true });
                        }
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn on_session_event(
        &mut self,
        ctx: &mut Ctx<'_, K, D>,
        session: &mut Session<K>,
        event: &SessionEvent,
        _now: u64,
        out: &mut Actions<K>,
    ) {
        match event {
            SessionEvent::OpenChange { open: true, .. } => {
                self.seed_on_open(ctx, session, out);
            }
            SessionEvent::OpenChange { open: false, .. } => {
                self.index = -1;
                self.open_arrow = None;
                self.had_nav_key = false;
                if self.active.is_some() {
                    self.navigate(None, out);
                }
                // A closing submenu hands focus back to its parent when
                // focus would otherwise be lost.
                if self.config.nested {
                    if let (Some(tree), Some(id)) = (ctx.tree, session.node_id()) {
                        let parent_floating = tree
                            .parent_of(id)
                            .and_then(|p| tree.node(p))
                            .and_then(|n| n.floating);
                        if let Some(parent) = parent_floating {
                            let active_in_tree = ctx.dom.active_element().is_some_and(|a| {
                                tree.descendants(id)
                                    .iter()
                                    .chain(core::iter::once(&id))
                                    .any(|n| {
                                        tree.node(*n)
                                            .and_then(|n| n.floating)
                                            .is_some_and(|f| ctx.dom.contains(f, a))
                                    })
                            });
                            // Focus fell out of the tree with the closing
                            // submenu; hand it to the parent.
                            if !active_in_tree {
                                out.push(Action::Focus { node: parent, prevent_scroll: true });
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear list traversal with disabled skipping.

/// Describes the items under navigation.
///
/// Implemented for `[bool]` (true = disabled) for fixtures and simple
/// hosts; adapters implement it over their element lists.
pub trait ItemSource {
    /// Number of items.
    fn len(&self) -> usize;
    /// Whether the item at `index` is skipped by navigation.
    fn is_disabled(&self, index: usize) -> bool;
    /// Whether the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemSource for [bool] {
    fn len(&self) -> usize {
        <[bool]>::len(self)
    }

    fn is_disabled(&self, index: usize) -> bool {
        self.get(index).copied().unwrap_or(true)
    }
}

/// List orientation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Items stack vertically; Up/Down are the main axis.
    #[default]
    Vertical,
    /// Items flow horizontally; Left/Right are the main axis.
    Horizontal,
    /// A grid; both axes navigate.
    Both,
}

impl Orientation {
    fn pick(self, vertical: bool, horizontal: bool) -> bool {
        match self {
            Self::Vertical => vertical,
            Self::Horizontal => horizontal,
            Self::Both => vertical || horizontal,
        }
    }
}

/// An arrow key, already resolved from the host's key event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arrow {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
}

/// Whether `arrow` navigates along the list's main axis.
#[must_use]
pub fn is_main_key(arrow: Arrow, orientation: Orientation) -> bool {
    orientation.pick(
        matches!(arrow, Arrow::Up | Arrow::Down),
        matches!(arrow, Arrow::Left | Arrow::Right),
    )
}

/// Whether `arrow` navigates toward the end of the main axis.
#[must_use]
pub fn is_main_to_end_key(arrow: Arrow, orientation: Orientation, rtl: bool) -> bool {
    orientation.pick(
        arrow == Arrow::Down,
        arrow == if rtl { Arrow::Left } else { Arrow::Right },
    )
}

/// Whether `arrow` is the cross-axis key that opens a nested list.
#[must_use]
pub fn is_cross_open_key(arrow: Arrow, orientation: Orientation, rtl: bool) -> bool {
    match orientation {
        Orientation::Vertical => arrow == if rtl { Arrow::Left } else { Arrow::Right },
        Orientation::Horizontal => arrow == Arrow::Down,
        Orientation::Both => false,
    }
}

/// Whether `arrow` is the cross-axis key that closes a nested list.
#[must_use]
pub fn is_cross_close_key(arrow: Arrow, orientation: Orientation, rtl: bool) -> bool {
    match orientation {
        Orientation::Vertical => arrow == if rtl { Arrow::Right } else { Arrow::Left },
        Orientation::Horizontal => arrow == Arrow::Up,
        Orientation::Both => false,
    }
}

/// Parameters for [`find_non_disabled`].
#[derive(Copy, Clone, Debug)]
pub struct Find {
    /// Index to start *before*; the search begins one step past it.
    pub starting_index: isize,
    /// Search toward lower indices.
    pub decrement: bool,
    /// Step size (grid columns step by `cols`).
    pub amount: usize,
}

impl Default for Find {
    fn default() -> Self {
        Self { starting_index: -1, decrement: false, amount: 1 }
    }
}

/// Step from `starting_index` until a non-disabled index is found.
///
/// Returns an out-of-bounds index (`-1` or past the end) when the walk
/// runs off the list; callers decide whether that means "stay put",
/// "wrap", or "escape".
#[must_use]
pub fn find_non_disabled(items: &(impl ItemSource + ?Sized), find: Find) -> isize {
    let len = items.len() as isize;
    let step = find.amount as isize;
    let mut index = find.starting_index;
    loop {
        index += if find.decrement { -step } else { step };
        if index < 0 || index > len - 1 {
            break;
        }
        if !items.is_disabled(index as usize) {
            break;
        }
    }
    index
}

/// The first non-disabled index, or `len` when every item is disabled.
#[must_use]
pub fn min_index(items: &(impl ItemSource + ?Sized)) -> isize {
    find_non_disabled(items, Find::default())
}

/// The last non-disabled index, or `-1` when every item is disabled.
#[must_use]
pub fn max_index(items: &(impl ItemSource + ?Sized)) -> isize {
    find_non_disabled(
        items,
        Find { starting_index: items.len() as isize, decrement: true, ..Find::default() },
    )
}

/// Convert a sentinel-bearing index into an in-bounds one.
#[must_use]
pub fn in_bounds(items: &(impl ItemSource + ?Sized), index: isize) -> Option<usize> {
    (index >= 0 && (index as usize) < items.len()).then_some(index as usize)
}

/// Configuration for [`linear_navigate`].
#[derive(Copy, Clone, Debug, Default)]
pub struct LinearConfig {
    /// Wrap around at the ends.
    pub looping: bool,
    /// With `looping`, allow navigation past the ends into the
    /// out-of-bounds "no active item" state instead of wrapping there
    /// directly. Requires a virtual cursor to make sense.
    pub allow_escape: bool,
}

/// One main-axis step from `current` (`-1` = no active item).
///
/// Returns the next index; out-of-bounds results occur only under
/// `allow_escape` and mean "clear the active item".
#[must_use]
pub fn linear_navigate(
    items: &(impl ItemSource + ?Sized),
    current: isize,
    forward: bool,
    config: &LinearConfig,
) -> isize {
    let min = min_index(items);
    let max = max_index(items);
    let len = items.len() as isize;
    if forward {
        if config.looping {
            if current >= max {
                if config.allow_escape && current != len {
                    -1
                } else {
                    min
                }
            } else {
                find_non_disabled(items, Find { starting_index: current, ..Find::default() })
            }
        } else {
            max.min(find_non_disabled(
                items,
                Find { starting_index: current, ..Find::default() },
            ))
        }
    } else if config.looping {
        if current <= min {
            if config.allow_escape && current != -1 {
                len
            } else {
                max
            }
        } else {
            find_non_disabled(
                items,
                Find { starting_index: current, decrement: true, ..Find::default() },
            )
        }
    } else {
        min.max(find_non_disabled(
            items,
            Find { starting_index: current, decrement: true, ..Find::default() },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENABLED_3: [bool; 3] = [false, false, false];

    #[test]
    fn wraps_at_both_ends_when_looping() {
        let config = LinearConfig { looping: true, ..LinearConfig::default() };
        assert_eq!(linear_navigate(&ENABLED_3[..], 2, true, &config), 0);
        assert_eq!(linear_navigate(&ENABLED_3[..], 0, false, &config), 2);
        assert_eq!(linear_navigate(&ENABLED_3[..], 0, true, &config), 1);
    }

    #[test]
    fn clamps_at_ends_without_looping() {
        let config = LinearConfig::default();
        assert_eq!(linear_navigate(&ENABLED_3[..], 2, true, &config), 2);
        assert_eq!(linear_navigate(&ENABLED_3[..], 0, false, &config), 0);
    }

    #[test]
    fn skips_disabled_items_in_both_directions() {
        // [A, B*, C] with B disabled.
        let items = [false, true, false];
        let config = LinearConfig::default();
        assert_eq!(linear_navigate(&items[..], 0, true, &config), 2);
        assert_eq!(linear_navigate(&items[..], 2, false, &config), 0);
    }

    #[test]
    fn min_and_max_skip_disabled_ends() {
        let items = [true, false, false, true];
        assert_eq!(min_index(&items[..]), 1);
        assert_eq!(max_index(&items[..]), 2);
    }

    #[test]
    fn all_disabled_yields_sentinels() {
        let items = [true, true];
        assert_eq!(min_index(&items[..]), 2);
        assert_eq!(max_index(&items[..]), -1);
        assert_eq!(in_bounds(&items[..], min_index(&items[..])), None);
    }

    #[test]
    fn escape_leaves_bounds_instead_of_wrapping() {
        let config = LinearConfig { looping: true, allow_escape: true };
        // Forward past the end escapes to -1 ("no active item").
        assert_eq!(linear_navigate(&ENABLED_3[..], 2, true, &config), -1);
        // Backward past the start escapes to len.
        assert_eq!(linear_navigate(&ENABLED_3[..], 0, false, &config), 3);
        // From the escaped state, navigation re-enters at the ends.
        assert_eq!(linear_navigate(&ENABLED_3[..], -1, false, &config), 2);
        assert_eq!(linear_navigate(&ENABLED_3[..], 3, true, &config), 0);
    }

    #[test]
    fn main_axis_key_mapping_follows_orientation() {
        assert!(is_main_key(Arrow::Down, Orientation::Vertical));
        assert!(!is_main_key(Arrow::Right, Orientation::Vertical));
        assert!(is_main_key(Arrow::Right, Orientation::Horizontal));
        assert!(is_main_key(Arrow::Up, Orientation::Both));
        assert!(is_main_key(Arrow::Left, Orientation::Both));
    }

    #[test]
    fn end_key_respects_rtl() {
        assert!(is_main_to_end_key(Arrow::Right, Orientation::Horizontal, false));
        assert!(is_main_to_end_key(Arrow::Left, Orientation::Horizontal, true));
        assert!(is_main_to_end_key(Arrow::Down, Orientation::Vertical, true));
    }

    #[test]
    fn cross_axis_keys_open_and_close_nested_lists() {
        assert!(is_cross_open_key(Arrow::Right, Orientation::Vertical, false));
        assert!(is_cross_open_key(Arrow::Left, Orientation::Vertical, true));
        assert!(is_cross_close_key(Arrow::Left, Orientation::Vertical, false));
        assert!(is_cross_open_key(Arrow::Down, Orientation::Horizontal, false));
        assert!(is_cross_close_key(Arrow::Up, Orientation::Horizontal, false));
        assert!(!is_cross_open_key(Arrow::Right, Orientation::Both, false));
    }
}

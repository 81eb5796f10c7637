// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid navigation and cell maps for spanned items.
//!
//! A grid is a list laid out in `cols` columns. Items may span multiple
//! cells ([`Dimensions`]); [`build_cell_map`] assigns every cell the
//! index of the item occupying it, placing items left-to-right into the
//! first run of free cells that fits (restarting from the top for every
//! item when `dense`). Navigation then runs over *cells* and maps the
//! landing cell back to its item.

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::nav::{Arrow, Find, ItemSource, Orientation, find_non_disabled};

/// Width and height of one item, in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Columns spanned.
    pub width: usize,
    /// Rows spanned.
    pub height: usize,
}

impl Dimensions {
    /// A single-cell item.
    pub const UNIT: Self = Self { width: 1, height: 1 };
}

/// A corner of a spanned item's cell rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Corner {
    /// Top-left cell.
    TopLeft,
    /// Top-right cell.
    TopRight,
    /// Bottom-left cell.
    BottomLeft,
    /// Bottom-right cell.
    BottomRight,
}

/// Shared parameters for grid navigation.
#[derive(Copy, Clone, Debug)]
pub struct GridConfig {
    /// Axis behavior; `Both` adds same-row Left/Right stepping.
    pub orientation: Orientation,
    /// Wrap at the grid edges.
    pub looping: bool,
    /// Right-to-left layout; swaps Left/Right.
    pub rtl: bool,
    /// Number of columns.
    pub cols: usize,
}

/// For each cell, the index of the item occupying it.
///
/// Items are placed in order. An item wider than `cols` cannot be placed;
/// it is clamped to the grid width (debug builds assert).
#[must_use]
pub fn build_cell_map(sizes: &[Dimensions], cols: usize, dense: bool) -> Vec<Option<usize>> {
    debug_assert!(cols > 0, "grid must have at least one column");
    let mut cell_map: Vec<Option<usize>> = Vec::new();
    let mut start_index = 0;
    for (index, size) in sizes.iter().enumerate() {
        debug_assert!(
            size.width <= cols,
            "grid item is wider than the grid itself"
        );
        let width = size.width.min(cols).max(1);
        let height = size.height.max(1);
        if dense {
            start_index = 0;
        }
        loop {
            let mut target_cells: SmallVec<[usize; 8]> = SmallVec::new();
            for i in 0..width {
                for j in 0..height {
                    target_cells.push(start_index + i + j * cols);
                }
            }
            let fits_row = (start_index % cols) + width <= cols;
            let free = target_cells
                .iter()
                .all(|&cell| cell_map.get(cell).copied().flatten().is_none());
            if fits_row && free {
                let needed = target_cells.iter().max().map_or(0, |&m| m + 1);
                if cell_map.len() < needed {
                    cell_map.resize(needed, None);
                }
                for &cell in &target_cells {
                    cell_map[cell] = Some(index);
                }
                break;
            }
            start_index += 1;
        }
    }
    cell_map
}

/// The cell index of `index`'s `corner`, or `-1` when `index` is `-1`.
#[must_use]
pub fn corner_cell(
    index: isize,
    sizes: &[Dimensions],
    cell_map: &[Option<usize>],
    cols: usize,
    corner: Corner,
) -> isize {
    if index < 0 {
        return -1;
    }
    let item = index as usize;
    let first = match cell_map.iter().position(|&c| c == Some(item)) {
        Some(cell) => cell as isize,
        None => return -1,
    };
    let size = sizes.get(item).copied().unwrap_or(Dimensions::UNIT);
    match corner {
        Corner::TopLeft => first,
        Corner::TopRight => first + size.width as isize - 1,
        Corner::BottomLeft => first + (size.height as isize - 1) * cols as isize,
        Corner::BottomRight => cell_map
            .iter()
            .rposition(|&c| c == Some(item))
            .map_or(first, |cell| cell as isize),
    }
}

/// All cells whose occupying item satisfies `matches` (empty cells match
/// when `matches(None)` does).
#[must_use]
pub fn cell_indices(
    cell_map: &[Option<usize>],
    matches: impl Fn(Option<usize>) -> bool,
) -> Vec<usize> {
    cell_map
        .iter()
        .enumerate()
        .filter_map(|(cell, &item)| matches(item).then_some(cell))
        .collect()
}

/// One grid step over plain (unit-sized) items.
///
/// `prev` may be `-1` (no active item); the result is always in bounds or
/// equal to `prev`. `min`/`max` are the first/last non-disabled indices.
#[must_use]
pub fn grid_navigate(
    items: &(impl ItemSource + ?Sized),
    arrow: Arrow,
    config: &GridConfig,
    min: isize,
    max: isize,
    prev: isize,
) -> isize {
    let cols = config.cols as isize;
    let len = items.len() as isize;
    let out_of_bounds = |index: isize| index < 0 || index >= len;
    let mut next = prev;

    if arrow == Arrow::Up {
        if prev == -1 {
            next = max;
        } else {
            next = find_non_disabled(
                items,
                Find {
                    starting_index: prev,
                    amount: config.cols,
                    decrement: true,
                },
            );
            if config.looping && (prev - cols < min || next < 0) {
                let col = prev % cols;
                let max_col = max % cols;
                let offset = max - (max_col - col);
                next = if max_col == col {
                    max
                } else if max_col > col {
                    offset
                } else {
                    offset - cols
                };
            }
        }
        if out_of_bounds(next) {
            next = prev;
        }
    }

    if arrow == Arrow::Down {
        if prev == -1 {
            next = min;
        } else {
            next = find_non_disabled(
                items,
                Find { starting_index: prev, amount: config.cols, decrement: false },
            );
            if config.looping && prev + cols > max {
                next = find_non_disabled(
                    items,
                    Find {
                        starting_index: (prev % cols) - cols,
                        amount: config.cols,
                        decrement: false,
                    },
                );
            }
        }
        if out_of_bounds(next) {
            next = prev;
        }
    }

    // Left/Right must stay on the same row.
    if config.orientation == Orientation::Both && prev >= 0 {
        let prev_row = prev.div_euclid(cols);
        let different_row = |index: isize| index.div_euclid(cols) != prev_row;
        let toward_end = if config.rtl { Arrow::Left } else { Arrow::Right };
        let toward_start = if config.rtl { Arrow::Right } else { Arrow::Left };

        if arrow == toward_end {
            if prev % cols != cols - 1 {
                next = find_non_disabled(
                    items,
                    Find { starting_index: prev, ..Find::default() },
                );
                if config.looping && different_row(next) {
                    next = find_non_disabled(
                        items,
                        Find { starting_index: prev - (prev % cols) - 1, ..Find::default() },
                    );
                }
            } else if config.looping {
                next = find_non_disabled(
                    items,
                    Find { starting_index: prev - (prev % cols) - 1, ..Find::default() },
                );
            }
            if different_row(next) {
                next = prev;
            }
        }

        if arrow == toward_start {
            if prev % cols != 0 {
                next = find_non_disabled(
                    items,
                    Find { starting_index: prev, decrement: true, ..Find::default() },
                );
                if config.looping && different_row(next) {
                    next = find_non_disabled(
                        items,
                        Find {
                            starting_index: prev + (cols - (prev % cols)),
                            decrement: true,
                            ..Find::default()
                        },
                    );
                }
            } else if config.looping {
                next = find_non_disabled(
                    items,
                    Find {
                        starting_index: prev + (cols - (prev % cols)),
                        decrement: true,
                        ..Find::default()
                    },
                );
            }
            if different_row(next) {
                next = prev;
            }
        }

        let last_row = max.div_euclid(cols) == prev_row;
        if out_of_bounds(next) {
            if config.looping && last_row {
                next = if arrow == toward_start {
                    max
                } else {
                    find_non_disabled(
                        items,
                        Find { starting_index: prev - (prev % cols) - 1, ..Find::default() },
                    )
                };
            } else {
                next = prev;
            }
        }
    }

    next
}

struct CellSource<'a, S: ItemSource + ?Sized> {
    map: &'a [Option<usize>],
    items: &'a S,
}

impl<S: ItemSource + ?Sized> ItemSource for CellSource<'_, S> {
    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_disabled(&self, index: usize) -> bool {
        match self.map.get(index).copied().flatten() {
            Some(item) => self.items.is_disabled(item),
            None => true,
        }
    }
}

/// One grid step over items that may span multiple cells.
///
/// Builds the cell map from `sizes`, navigates over cells starting from
/// the corner of the previous item appropriate for the travel direction,
/// and maps the landing cell back to its item. Returns `None` when the
/// step lands nowhere (e.g. on an empty trailing cell).
#[must_use]
pub fn grid_navigate_spanned(
    items: &(impl ItemSource + ?Sized),
    sizes: &[Dimensions],
    dense: bool,
    arrow: Arrow,
    config: &GridConfig,
    prev: isize,
) -> Option<usize> {
    let cell_map = build_cell_map(sizes, config.cols, dense);
    let cells = CellSource { map: &cell_map, items };

    let min_cell = cell_map
        .iter()
        .position(|&c| c.is_some_and(|item| !items.is_disabled(item)))
        .map_or(-1, |cell| cell as isize);
    let max_cell = cell_map
        .iter()
        .rposition(|&c| c.is_some_and(|item| !items.is_disabled(item)))
        .map_or(-1, |cell| cell as isize);

    let item_min = crate::nav::min_index(items);
    let item_max = crate::nav::max_index(items);
    let prev_item = if prev > item_max { item_min } else { prev };
    let corner = if arrow == Arrow::Down {
        Corner::BottomLeft
    } else if arrow == if config.rtl { Arrow::Left } else { Arrow::Right } {
        Corner::TopRight
    } else {
        Corner::TopLeft
    };
    let prev_cell = corner_cell(prev_item, sizes, &cell_map, config.cols, corner);

    let cell = grid_navigate(&cells, arrow, config, min_cell, max_cell, prev_cell);
    if cell < 0 {
        return None;
    }
    cell_map.get(cell as usize).copied().flatten()
}

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch List: pure navigation policy for lists, grids, and typeahead.
//!
//! This crate computes *which index becomes active* when a user navigates
//! a list of items with arrow keys or types a prefix. It knows nothing
//! about elements, focus, or events; callers translate their key input
//! into [`Arrow`] / character values, describe the items through
//! [`ItemSource`], and apply the returned indices themselves. The
//! `perch_interactions` crate wraps these machines as behaviors.
//!
//! Indices are signed: the original list-navigation contract uses the
//! out-of-bounds sentinels `-1` and `len` to represent the "no active
//! item" state a looping list can escape to (combobox input regaining
//! the virtual cursor). [`in_bounds`] converts a sentinel-bearing index
//! into an `Option<usize>`.
//!
//! ## Minimal example
//!
//! ```rust
//! use perch_list::{Arrow, LinearConfig, Orientation, linear_navigate};
//!
//! // Three items, the middle one disabled.
//! let items = [false, true, false];
//! let config = LinearConfig { looping: true, ..LinearConfig::default() };
//! // From item 0, ArrowDown skips the disabled item 1.
//! let next = linear_navigate(&items[..], 0, true, &config);
//! assert_eq!(next, 2);
//! // And wraps back to the start.
//! assert_eq!(linear_navigate(&items[..], 2, true, &config), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod grid;
pub mod nav;
pub mod typeahead;

pub use grid::{Corner, Dimensions, GridConfig, build_cell_map, cell_indices, corner_cell,
    grid_navigate, grid_navigate_spanned};
pub use nav::{
    Arrow, Find, ItemSource, LinearConfig, Orientation, find_non_disabled, in_bounds,
    is_cross_close_key, is_cross_open_key, is_main_key, is_main_to_end_key, linear_navigate,
    max_index, min_index,
};
pub use typeahead::{TypeaheadConfig, TypeaheadMatcher, TypeaheadOutcome};

// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composable interaction behaviors for floating elements.
//!
//! This crate builds on [`perch_core`] to provide the standard set of
//! behaviors a floating-element anchor needs: hover with delays and a safe
//! polygon, click toggling, focus opening, dismissal (escape, outside press,
//! reference press, ancestor scroll), ARIA role wiring, client-point
//! anchoring, list navigation, and typeahead.
//!
//! Behaviors are pure state machines driven by [`Input`](perch_core::Input)
//! values the host translates from its platform events. They are composed by
//! an [`Interactions`] stack, which merges their prop contributions, routes
//! events to each of them in order, and fans session events back out so every
//! behavior observes open-state changes regardless of which one caused them.
//!
//! ```
//! use perch_core::{Ctx, EventScope, Input, PointerState, Session};
//! use perch_interactions::{ClickBehavior, ClickConfig, Interactions};
//!
//! struct NoDom;
//! impl perch_core::DomView<u32> for NoDom {
//!     fn parent_of(&self, _node: u32) -> Option<u32> {
//!         None
//!     }
//! }
//!
//! let mut stack: Interactions<u32, NoDom> = Interactions::new();
//! stack.push(ClickBehavior::new(ClickConfig::default()));
//!
//! let mut session = Session::new();
//! session.set_handles(Some(1), Some(2));
//! let dom = NoDom;
//! let mut ctx = Ctx::new(&dom);
//! let input = Input::Click {
//!     target: 1,
//!     pointer: PointerState::mouse(kurbo::Point::ZERO),
//!     is_virtual: false,
//! };
//! let outcome = stack.dispatch(&mut ctx, &mut session, EventScope::Reference, &input, 0);
//! assert!(session.open());
//! assert!(!outcome.actions.is_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod click;
mod client_point;
mod composer;
mod dismiss;
mod focus;
mod hover;
mod list_nav;
mod role;
mod safe_polygon;
mod typeahead;

pub use click::{ClickBehavior, ClickConfig, ClickTrigger};
pub use client_point::{ClientPointBehavior, ClientPointConfig, PointAxis};
pub use composer::{DispatchOutcome, Interactions, UserHandler};
pub use dismiss::{DismissBehavior, DismissBubbles, DismissConfig, PressEvent};
pub use focus::{FocusBehavior, FocusConfig};
pub use hover::{HoverBehavior, HoverConfig};
pub use list_nav::{FocusItemOnOpen, ListNavBehavior, ListNavConfig};
pub use role::{Role, RoleBehavior};
pub use safe_polygon::{SafePolygon, SafePolygonConfig, Side};
pub use typeahead::TypeaheadBehavior;

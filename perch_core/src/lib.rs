// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch Core: host-driven primitives for floating-element interactions.
//!
//! This crate provides the shared vocabulary for the Perch crates, which
//! together implement the interaction and focus layer of floating UI
//! surfaces (tooltips, popovers, menus, selects, dialogs) as pure state
//! machines. Nothing here touches a real element tree or a real clock:
//!
//! - Input arrives as [`Input`] values carrying an explicit `now: u64`
//!   millisecond timestamp chosen by the host.
//! - Delayed work is a [`Timer`] deadline the host polls; there are no
//!   callbacks.
//! - Side effects are returned as [`Action`] values for the host to apply.
//! - Facts about the host's element tree are pulled through the [`DomView`]
//!   trait, keyed by a caller-chosen node key `K: Copy + Eq`.
//!
//! The central object is the [`Session`]: the open/closed state of one
//! floating element, its trigger snapshot, and a typed event channel that
//! behaviors and the host observe. Every open/close transition funnels
//! through [`Session::apply_open_change`].
//!
//! ## Minimal example
//!
//! ```rust
//! use perch_core::{OpenChangeReason, Session, SessionEvent};
//!
//! let mut session: Session<u32> = Session::new();
//! session.set_handles(Some(1), Some(2));
//! session.apply_open_change(true, OpenChangeReason::Click, None);
//! assert!(session.open());
//! let event = session.pop_event().unwrap();
//! assert!(matches!(
//!     event,
//!     SessionEvent::OpenChange { open: true, reason: OpenChangeReason::Click }
//! ));
//! ```
//!
//! Behaviors (hover, click, dismiss, list navigation, ...) implement the
//! [`Behavior`] trait and are driven by a composer that merges their
//! [`Contribution`]s into prop bundles and fans events out in registration
//! order; see the `perch_interactions` crate.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod behavior;
pub mod delay;
pub mod dom;
pub mod input;
pub mod props;
pub mod session;
pub mod suppress;
pub mod timer;
pub mod tree;

pub use behavior::{Action, Actions, Behavior, ConfigIssue, Ctx, EventScope, Handled};
pub use delay::{Delay, DelayGroup, DelayPhase, GroupId};
pub use dom::{DomView, Marker, ScrollMetrics};
pub use input::{Input, Key, Modifiers, OpenEvent, PointerState, PointerType, TriggerKind};
pub use props::{
    AttrKey, AttrValue, Attrs, Contribution, EventKind, PropBundles, TargetProps, merge,
};
pub use session::{
    DismissEvent, DismissKind, OpenChangeReason, ReturnFocus, Session, SessionEvent,
};
pub use suppress::{PointerSuppression, RefCounts};
pub use timer::Timer;
pub use tree::{FloatingTree, NodeId, TreeNode};

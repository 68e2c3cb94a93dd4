// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Strata uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! propagate invalidation through the stage/layer/frame tree. Each channel
//! represents an independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`GEOMETRY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from frame to layer to host. Resizing a stage marks every layer and
//!   frame beneath it, because cached transform data is derived from the
//!   stage dimensions.
//!
//! - **Local-only** — [`ATTRIBUTES`] is marked with the default policy when
//!   a frame's fit mode, start position, or scale changes. Only that frame's
//!   cached transform data is stale; siblings are unaffected.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on tree mutations (add/remove
//!   frame or layer, cross-layer adoption). It does not propagate; the
//!   navigator uses it to notice that sibling order changed under an active
//!   frame.
//!
//! # Consumption
//!
//! The [`Navigator`](crate::nav::Navigator) drains [`GEOMETRY`] inside
//! [`set_stage_size`](crate::nav::Navigator::set_stage_size) and
//! [`request_resize`](crate::nav::Navigator::request_resize), dropping the
//! cached [`TransformData`](crate::geometry::TransformData) of every affected
//! frame and re-showing the layers whose current frame was invalidated.

use understory_dirty::Channel;

/// Stage size, frame size, or placement changed — cached transform data of
/// every descendant frame is stale.
pub const GEOMETRY: Channel = Channel::new(0);

/// Frame or layer configuration changed — only the marked node's cached
/// transform data is stale.
pub const ATTRIBUTES: Channel = Channel::new(1);

/// Tree topology changed — sibling order and neighbor resolution must be
/// re-evaluated.
pub const TOPOLOGY: Channel = Channel::new(2);

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! The tree has three node kinds:
//!
//! - A *stage* is a viewport. It hosts layers and determines the size their
//!   frames are fitted to.
//! - A *layer* is one navigation slot: an ordered list of frames of which at
//!   most one is current. Layers live on a stage or inside a frame of
//!   another layer (nested decks).
//! - A *frame* is one unit of content. It carries a navigation name, its
//!   configuration, a content size, and a cached
//!   [`TransformData`](crate::geometry::TransformData) once it has been
//!   measured against its viewport.
//!
//! All nodes are addressed by generational handles ([`StageId`],
//! [`LayerId`], [`FrameId`]) that become stale on removal, preventing
//! use-after-free bugs at the API level.
//!
//! # Dirty tracking
//!
//! Mutations automatically mark the channels in [`dirty`](crate::dirty):
//! size and placement changes mark **GEOMETRY** (propagating through nested
//! layers), configuration changes mark **ATTRIBUTES** (local), and child
//! list changes mark **TOPOLOGY**. [`SceneTree::drain_stale`] consumes all
//! three and drops the affected transform-data caches.

mod id;
mod store;

pub use id::{FrameId, LayerId, StageId};
pub use store::{Host, Invalidated, SceneTree};

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame navigation and transition engine for layered viewports.
//!
//! `strata_core` drives stages of stacked layers in which exactly one frame
//! per layer is visible at a time. It decides which frame to show next, how
//! to animate the change, and where the content sits while the embedder owns
//! painting, input, and the clock. It is `no_std` compatible (with `alloc`)
//! and uses array-based struct-of-arrays storage with index handles for
//! cache-friendly traversal.
//!
//! # Architecture
//!
//! The crate is organized around a request pipeline that turns navigation
//! calls into layout commands and events:
//!
//! ```text
//!   show_frame / transition_to / scroll_to / on_gesture
//!       │
//!       ▼
//!   Navigator ──► resolver ──► target frame
//!       │
//!       ├──► EventSink (before / started / prepared / finished)
//!       │
//!       ▼
//!   Layout (load, position, show, animate, surface)
//!       │
//!       ▼
//!   LayoutTicket ──► Navigator::complete() ──► on_frame(now)
//! ```
//!
//! **[`tree`]** — Struct-of-arrays scene tree of stages, layers, and frames
//! with generational handles. Configuration is set by the caller; transform
//! data is computed and cached on demand.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//! GEOMETRY propagates from stages down to frames; ATTRIBUTES and TOPOLOGY
//! are local.
//!
//! **[`config`]** — Attribute model: frame and layer configuration, fit
//! modes, start positions, transition kinds, and the lenient parsers that
//! accept them from markup.
//!
//! **[`geometry`]** — Pure placement math. Computes a frame's scale, shift,
//! and scroll range within its layer from the configuration.
//!
//! **[`resolver`]** — Frame targets (`"name"`, ordinals, `"!next"`,
//! `"!left"`, …) and their resolution against the sibling ring.
//!
//! **[`nav`]** — The [`Navigator`](nav::Navigator): per-layer runtime state,
//! the transition pipeline, scroll animations, watchdogs, delays, and
//! auto-advance timers.
//!
//! **[`scroll`]** — Native and synthetic scroll composition; turns a scroll
//! position into a surface transform or an embedder scroll offset.
//!
//! **[`gesture`]** — Gesture steps (drags and wheels) and the direction
//! model the navigator consumes.
//!
//! **[`layout`]** — The [`Layout`](layout::Layout) trait embedders implement
//! to load, place, and animate frames, with tickets for asynchronous
//! completion.
//!
//! **[`gate`]** — Transition gates for cross-layer grouping and the handles
//! callers await.
//!
//! **[`events`]** — Event payloads and the [`EventSink`](events::EventSink)
//! observers implement.
//!
//! **[`error`]** — Navigation error type.
//!
//! **[`time`]** — Nanosecond timestamps and spans, caller-supplied.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Uses the standard library's float math
//!   instead of `libm`.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

/// Re-export of the [`kurbo`] geometry crate used throughout the public API.
pub use kurbo;

pub mod config;
pub mod dirty;
pub mod error;
pub mod events;
pub mod gate;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod nav;
pub mod resolver;
pub mod scroll;
pub mod time;
pub mod tree;

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout strategy contract.
//!
//! Strata splits the physical presentation of frames into *layout* objects.
//! The navigator decides **what** is shown and **when**; the layout decides
//! **how** it reaches the surface. Each layout provides:
//!
//! - **Loading** — bring a frame's content into the render tree ahead of
//!   showing it, possibly asynchronously.
//! - **Placement** — put a frame (or no frame) on the surface instantly, or
//!   animate the move between two frames in whatever visual style the
//!   layout implements (slide, fade, ...).
//! - **Surface transforms** — move the layer's scroll surface itself, used
//!   for scroll animations and live gesture scrolling.
//! - **Scroll ownership** — optionally substitute the layer's
//!   [`ScrollTransformer`] when the layout has its own scroll model.
//!
//! # Completion protocol
//!
//! Operations that can outlive the call take a [`LayoutTicket`] and return
//! [`LayoutPoll`]. [`LayoutPoll::Ready`] means the work finished within the
//! call; the ticket is spent and must not be completed again.
//! [`LayoutPoll::Pending`] means the layout holds on to the ticket and
//! hands it to [`Navigator::complete`] once the work has landed on the
//! surface, at the paint boundary where it became visible. Completing a
//! ticket that a newer navigation superseded is a silent no-op, so layouts
//! never need to know about supersession.
//!
//! [`Navigator::complete`]: crate::nav::Navigator::complete

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::{Affine, Vec2};

use crate::geometry::TransformData;
use crate::scroll::ScrollTransformer;
use crate::time::Span;
use crate::tree::{FrameId, LayerId};

/// Identifies one asynchronous layout operation.
///
/// Opaque to layouts: store it and hand it back on completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutTicket {
    pub(crate) layer: LayerId,
    pub(crate) serial: u64,
}

/// Synchronous-or-deferred result of a layout operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPoll {
    /// The work completed within the call. The ticket is spent.
    Ready,
    /// The layout completes the ticket later via `Navigator::complete`.
    Pending,
}

/// Request to load a frame's content ahead of showing it.
#[derive(Clone, Copy, Debug)]
pub struct LoadRequest {
    /// Layer the frame will be shown on.
    pub layer: LayerId,
    /// Frame to load.
    pub frame: FrameId,
    /// Completion token for [`LayoutPoll::Pending`] loads.
    pub ticket: LayoutTicket,
}

/// Instant placement of a frame on a layer's surface.
#[derive(Clone, Debug)]
pub struct FramePlacement {
    /// Layer being (re)shown.
    pub layer: LayerId,
    /// `None` clears the layer (the "no frame" state).
    pub frame: Option<FrameId>,
    /// Measured placement of the frame within the layer.
    pub data: TransformData,
    /// Settled surface transform for the layer.
    pub transform: Affine,
    /// Scroll handoff target in surface pixels, when the layer scrolls
    /// natively.
    pub native_scroll: Option<Vec2>,
}

/// Animated move between two frames.
///
/// The endpoint state is part of the request; everything in between is the
/// layout's business.
#[derive(Clone, Debug)]
pub struct TransitionPlacement {
    /// Layer being animated.
    pub layer: LayerId,
    /// Departing frame, `None` when the layer was empty.
    pub from: Option<FrameId>,
    /// Arriving frame, `None` for a transition to no frame.
    pub to: Option<FrameId>,
    /// Resolved transition kind, prefixes stripped.
    pub kind: String,
    /// Play the kind's animation backwards.
    pub reverse: bool,
    /// Kind that brought the departing frame in, for exit animations.
    pub previous_kind: Option<String>,
    /// Whether the departing frame's entry animation was reversed.
    pub previous_reverse: bool,
    /// Animation length.
    pub duration: Span,
    /// Measured placement of the departing frame, if any.
    pub from_data: Option<TransformData>,
    /// Measured placement of the arriving frame.
    pub to_data: TransformData,
    /// Settled surface transform at the target endpoint.
    pub to_transform: Affine,
    /// Scroll handoff target at the endpoint, for native scrolling.
    pub to_native_scroll: Option<Vec2>,
    /// Completion token for [`LayoutPoll::Pending`] transitions.
    pub ticket: LayoutTicket,
}

/// A surface transform to apply, instantly or animated.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceTransform {
    /// Layer whose scroll surface moves.
    pub layer: LayerId,
    /// Transform to move it to.
    pub transform: Affine,
    /// Scroll offset to hand to the platform instead, for native scrolling.
    pub native_scroll: Option<Vec2>,
    /// Zero applies instantly.
    pub duration: Span,
    /// Present when the navigator waits for the animation to settle.
    pub ticket: Option<LayoutTicket>,
}

/// Explicit placement of a re-parented frame, compensating the visual jump
/// of the move.
#[derive(Clone, Copy, Debug)]
pub struct PositionRequest {
    /// Layer that adopted the frame.
    pub layer: LayerId,
    /// The adopted frame.
    pub frame: FrameId,
    /// Placement transform neutralizing the coordinate-space change.
    pub placement: Affine,
}

/// Places and animates frames on a render surface.
///
/// Implementations run on the single cooperative timeline: they may not
/// call back into the navigator from within these methods. Deferred work
/// reports through the ticket instead.
pub trait Layout {
    /// Brings `request.frame`'s content into the render tree.
    fn load_frame(&mut self, request: LoadRequest) -> LayoutPoll;

    /// Places a frame, or clears the layer, without animating.
    fn show_frame(&mut self, placement: FramePlacement);

    /// Starts the animated move between two frames.
    fn begin_transition(&mut self, placement: TransitionPlacement) -> LayoutPoll;

    /// Moves the layer's scroll surface.
    fn set_surface_transform(&mut self, transform: SurfaceTransform) -> LayoutPoll;

    /// Places a re-parented frame at an explicit transform. Layouts without
    /// cross-layer support can ignore this.
    fn position_frame(&mut self, request: PositionRequest) {
        _ = request;
    }

    /// A transformer replacing the default scroll behavior, if this layout
    /// owns scrolling.
    fn scroll_transformer(&self) -> Option<Box<dyn ScrollTransformer>> {
        None
    }
}

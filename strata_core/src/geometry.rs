// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-to-viewport geometry.
//!
//! [`TransformData`] captures the geometric and scroll relationship between
//! one frame and its viewport: the fit scale, the alignment shift applied
//! when the scaled frame is smaller than the viewport, and the scroll range
//! plus initial scroll position when it is larger. It is computed once per
//! activation and cached on the frame; anything that would change the
//! outcome (viewport resize, frame resize, configuration change) drops the
//! cache through the dirty channels instead of mutating the value.
//!
//! Scroll positions throughout the engine are in *frame units* (the frame's
//! own coordinate space, before scaling). The scroll transformer converts
//! them to surface pixels when composing transforms.

use kurbo::{Size, Vec2};

use crate::config::{FitMode, FrameConfig, LayerConfig, StartPosition};

/// Tolerance for "scaled frame fits the viewport" comparisons.
const EPSILON: f64 = 1e-6;

/// Derived geometry of a frame within its viewport. Immutable once produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformData {
    /// Viewport dimensions at computation time.
    pub stage_size: Size,
    /// Frame content dimensions at computation time.
    pub frame_size: Size,
    /// Scale applied to the frame, per its fit mode.
    pub scale: f64,
    /// Alignment offset in viewport units, non-zero only on axes where the
    /// scaled frame is smaller than the viewport.
    pub shift: Vec2,
    /// Scroll position the frame starts at, in frame units, derived from the
    /// start position on axes where the frame overflows.
    pub initial_scroll: Vec2,
    /// Upper scroll bound per axis, in frame units. Zero on fitting axes.
    pub max_scroll: Vec2,
    /// Whether the x axis responds to scrolling. Overflowing axes are
    /// scrollable unless the layer disables scrolling entirely.
    pub scrollable_x: bool,
    /// Whether the y axis responds to scrolling.
    pub scrollable_y: bool,
    /// Start position this data was computed for.
    pub start_position: StartPosition,
}

impl TransformData {
    /// Computes the geometry of `frame` fitted into `stage`.
    ///
    /// `start_override` replaces the frame's configured start position for
    /// this activation (a fresh value is computed; cached data for other
    /// start positions is never mutated).
    #[must_use]
    pub fn compute(
        stage: Size,
        frame: Size,
        frame_config: &FrameConfig,
        layer_config: &LayerConfig,
        start_override: Option<StartPosition>,
    ) -> Self {
        let start_position = start_override.unwrap_or(frame_config.start_position);
        let scale = fit_scale(stage, frame, frame_config);
        let scaled = Size::new(frame.width * scale, frame.height * scale);
        let no_scroll = layer_config.scrolling_disabled();
        let (align_x, align_y) = align_factors(start_position);

        // Per axis: a fitting frame gets an alignment shift in viewport
        // units; an overflowing frame gets a scroll range in frame units.
        let overflow_x = scaled.width > stage.width + EPSILON;
        let overflow_y = scaled.height > stage.height + EPSILON;
        let max_scroll = Vec2::new(
            if overflow_x {
                frame.width - stage.width / scale
            } else {
                0.0
            },
            if overflow_y {
                frame.height - stage.height / scale
            } else {
                0.0
            },
        );
        let mut shift = Vec2::new(
            if overflow_x {
                0.0
            } else {
                (stage.width - scaled.width) * align_x
            },
            if overflow_y {
                0.0
            } else {
                (stage.height - scaled.height) * align_y
            },
        );
        if frame_config.fit == FitMode::Fixed {
            if let Some(x) = frame_config.x {
                shift.x = x;
            }
            if let Some(y) = frame_config.y {
                shift.y = y;
            }
        }

        Self {
            stage_size: stage,
            frame_size: frame,
            scale,
            shift,
            initial_scroll: Vec2::new(max_scroll.x * align_x, max_scroll.y * align_y),
            max_scroll,
            scrollable_x: overflow_x && !no_scroll,
            scrollable_y: overflow_y && !no_scroll,
            start_position,
        }
    }

    /// Synthesizes the placeholder data used while no frame is shown:
    /// viewport-sized, scale 1, nothing scrollable.
    #[must_use]
    pub fn empty(stage: Size, start_position: StartPosition) -> Self {
        Self {
            stage_size: stage,
            frame_size: stage,
            scale: 1.0,
            shift: Vec2::ZERO,
            initial_scroll: Vec2::ZERO,
            max_scroll: Vec2::ZERO,
            scrollable_x: false,
            scrollable_y: false,
            start_position,
        }
    }

    /// Clamps a scroll position into this frame's valid range.
    #[must_use]
    pub fn clamp_scroll(&self, scroll: Vec2) -> Vec2 {
        Vec2::new(
            scroll.x.clamp(0.0, self.max_scroll.x),
            scroll.y.clamp(0.0, self.max_scroll.y),
        )
    }
}

/// Scale for fitting `frame` into `stage`, per the frame's fit mode.
///
/// Degenerate dimensions fall back to scale 1 rather than infinities.
fn fit_scale(stage: Size, frame: Size, config: &FrameConfig) -> f64 {
    let ratio_w = ratio(stage.width, frame.width);
    let ratio_h = ratio(stage.height, frame.height);
    match config.fit {
        FitMode::Width => ratio_w,
        FitMode::Height => ratio_h,
        FitMode::Contain => ratio_w.min(ratio_h),
        FitMode::Cover => ratio_w.max(ratio_h),
        FitMode::Fixed => {
            if config.scale > 0.0 {
                config.scale
            } else {
                1.0
            }
        }
    }
}

fn ratio(stage: f64, frame: f64) -> f64 {
    if frame > 0.0 && stage > 0.0 {
        stage / frame
    } else {
        1.0
    }
}

/// Horizontal and vertical alignment factors (0 start, 0.5 center, 1 end)
/// for a start position.
const fn align_factors(start: StartPosition) -> (f64, f64) {
    let x = match start {
        StartPosition::TopLeft | StartPosition::Left | StartPosition::BottomLeft => 0.0,
        StartPosition::Top | StartPosition::Center | StartPosition::Bottom => 0.5,
        StartPosition::TopRight | StartPosition::Right | StartPosition::BottomRight => 1.0,
    };
    let y = match start {
        StartPosition::TopLeft | StartPosition::Top | StartPosition::TopRight => 0.0,
        StartPosition::Left | StartPosition::Center | StartPosition::Right => 0.5,
        StartPosition::BottomLeft | StartPosition::Bottom | StartPosition::BottomRight => 1.0,
    };
    (x, y)
}

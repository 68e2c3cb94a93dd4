// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-to-transform composition.
//!
//! A frame's content point `q` (frame units) appears on the surface at
//!
//! ```text
//! P = shift + (q - scroll) * scale
//! ```
//!
//! The [`ScrollTransformer`] strategy turns a scroll position into the
//! affine realizing that formula. In *synthetic* mode the scroll is baked
//! into the transform. In *native* mode the settled output splits the
//! scroll out as a separate target for the embedder's native scroller while
//! the transform carries only fit and alignment; live (still-changing)
//! output bakes the scroll in even in native mode, because native scrollers
//! cannot follow a transition animation.
//!
//! Toggling between native and synthetic mid-session needs no dedicated
//! compensation step: composing the settled transform at the preserved
//! frame-unit scroll position under the new mode produces the same apparent
//! position, provided the embedder applies the transform and the native
//! scroll target atomically.

use kurbo::{Affine, Vec2};

use crate::geometry::TransformData;
use crate::gesture::Gesture;

/// Minimum scroll movement considered an actual position change.
const MOVE_EPSILON: f64 = 1e-6;

/// A composed layer transform plus, in settled native mode, the scroll
/// target for the embedder's native scroller (surface pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerTransform {
    /// Surface transform realizing fit, alignment, and (synthetic) scroll.
    pub transform: Affine,
    /// Where the native scroller should sit, in surface pixels.
    pub native_scroll: Option<Vec2>,
}

/// Outcome of feeding a gesture step to a transformer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureScroll {
    /// Native scrolling satisfies the step; the engine only records the new
    /// position.
    Native {
        /// The new scroll position (frame units).
        scroll: Vec2,
    },
    /// Synthetic scrolling moves the surface directly.
    Live {
        /// Transform to apply to the surface immediately.
        transform: Affine,
        /// The new scroll position (frame units).
        scroll: Vec2,
    },
    /// The step cannot move the content on any axis (at the bounds or not
    /// scrollable); the gesture bridge may turn it into a navigation.
    Unhandled,
}

/// Strategy that composes scroll positions into surface transforms.
///
/// Custom layouts with exotic scroll behavior substitute their own
/// implementation via
/// [`Layout::scroll_transformer`](crate::layout::Layout::scroll_transformer).
pub trait ScrollTransformer {
    /// Composes the transform for `scroll` (frame units, clamped to the
    /// data's range). `live` marks a still-changing position; the settled
    /// form is used once a transition or scroll animation completes.
    fn compose(&self, data: &TransformData, scroll: Vec2, live: bool) -> LayerTransform;

    /// Applies one gesture step to `current` (frame units).
    fn gesture_scroll(&self, data: &TransformData, current: Vec2, gesture: &Gesture)
    -> GestureScroll;

    /// Whether this transformer delegates settled scrolling to the embedder.
    fn is_native(&self) -> bool;
}

/// The stock transformer: plain per-axis clamped scrolling, native or
/// synthetic per the layer configuration.
#[derive(Clone, Copy, Debug)]
pub struct DefaultScrollTransformer {
    native: bool,
}

impl DefaultScrollTransformer {
    /// Creates a transformer in native or synthetic mode.
    #[must_use]
    pub const fn new(native: bool) -> Self {
        Self { native }
    }
}

impl ScrollTransformer for DefaultScrollTransformer {
    fn compose(&self, data: &TransformData, scroll: Vec2, live: bool) -> LayerTransform {
        let scroll = data.clamp_scroll(scroll);
        if self.native && !live {
            LayerTransform {
                transform: Affine::translate(data.shift) * Affine::scale(data.scale),
                native_scroll: Some(scroll * data.scale),
            }
        } else {
            LayerTransform {
                transform: Affine::translate(data.shift - scroll * data.scale)
                    * Affine::scale(data.scale),
                native_scroll: None,
            }
        }
    }

    fn gesture_scroll(
        &self,
        data: &TransformData,
        current: Vec2,
        gesture: &Gesture,
    ) -> GestureScroll {
        let scale = if data.scale > 0.0 { data.scale } else { 1.0 };
        // Gesture shifts are view motion, so the scroll position follows
        // them directly (frame units).
        let candidate = data.clamp_scroll(Vec2::new(
            current.x + gesture.shift.x / scale,
            current.y + gesture.shift.y / scale,
        ));
        let moved_x = data.scrollable_x && (candidate.x - current.x).abs() > MOVE_EPSILON;
        let moved_y = data.scrollable_y && (candidate.y - current.y).abs() > MOVE_EPSILON;
        if !moved_x && !moved_y {
            return GestureScroll::Unhandled;
        }
        let next = Vec2::new(
            if moved_x { candidate.x } else { current.x },
            if moved_y { candidate.y } else { current.y },
        );
        if self.native {
            GestureScroll::Native { scroll: next }
        } else {
            GestureScroll::Live {
                transform: self.compose(data, next, true).transform,
                scroll: next,
            }
        }
    }

    fn is_native(&self) -> bool {
        self.native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FrameConfig, LayerConfig};
    use kurbo::{Point, Size};

    fn scrollable_data() -> TransformData {
        // 800x1200 frame fitted by width into 400x300: scale 0.5, y scrolls.
        TransformData::compute(
            Size::new(400.0, 300.0),
            Size::new(800.0, 1200.0),
            &FrameConfig::new("f"),
            &LayerConfig::default(),
            None,
        )
    }

    #[test]
    fn synthetic_compose_bakes_scroll_into_transform() {
        let data = scrollable_data();
        let out = DefaultScrollTransformer::new(false).compose(&data, Vec2::new(0.0, 100.0), false);
        assert_eq!(out.native_scroll, None);
        // P = shift + (q - scroll) * scale, with shift = 0.
        let p = out.transform * Point::new(0.0, 100.0);
        assert!((p.x).abs() < 1e-9 && (p.y).abs() < 1e-9, "scrolled-to point lands at origin");
        let q = out.transform * Point::new(0.0, 700.0);
        assert!((q.y - 300.0).abs() < 1e-9, "one viewport further down");
    }

    #[test]
    fn native_settled_splits_scroll_out() {
        let data = scrollable_data();
        let out = DefaultScrollTransformer::new(true).compose(&data, Vec2::new(0.0, 100.0), false);
        assert_eq!(out.native_scroll, Some(Vec2::new(0.0, 50.0)), "surface px");
        let p = out.transform * Point::ZERO;
        assert!((p.x).abs() < 1e-9 && (p.y).abs() < 1e-9, "transform has no scroll");
    }

    #[test]
    fn native_live_bakes_scroll_like_synthetic() {
        let data = scrollable_data();
        let native = DefaultScrollTransformer::new(true).compose(&data, Vec2::new(0.0, 100.0), true);
        let synthetic =
            DefaultScrollTransformer::new(false).compose(&data, Vec2::new(0.0, 100.0), true);
        assert_eq!(native.transform, synthetic.transform);
        assert_eq!(native.native_scroll, None);
    }

    #[test]
    fn compose_clamps_out_of_range_scroll() {
        let data = scrollable_data();
        let transformer = DefaultScrollTransformer::new(false);
        let over = transformer.compose(&data, Vec2::new(0.0, 9999.0), false);
        let max = transformer.compose(&data, Vec2::new(0.0, data.max_scroll.y), false);
        assert_eq!(over.transform, max.transform);
    }

    #[test]
    fn compose_and_invert_round_trip() {
        let data = scrollable_data();
        let transformer = DefaultScrollTransformer::new(false);
        let scroll = Vec2::new(0.0, 250.0);
        let rest = transformer.compose(&data, Vec2::ZERO, false).transform;
        let out = transformer.compose(&data, scroll, false).transform;
        // Translation delta over the fit scale recovers the scroll offsets.
        let derived = (rest.translation() - out.translation()) / data.scale;
        assert!((derived.x - scroll.x).abs() < 1e-9, "got: {derived:?}");
        assert!((derived.y - scroll.y).abs() < 1e-9, "got: {derived:?}");
        let q = Point::new(123.0, 456.0);
        let back = out.inverse() * (out * q);
        assert!((back.x - q.x).abs() < 1e-9);
        assert!((back.y - q.y).abs() < 1e-9);
    }

    #[test]
    fn gesture_within_bounds_scrolls_natively() {
        let data = scrollable_data();
        let transformer = DefaultScrollTransformer::new(true);
        let gesture = Gesture::drag(Vec2::new(0.0, 20.0), Vec2::new(0.0, 20.0), false);
        match transformer.gesture_scroll(&data, Vec2::new(0.0, 100.0), &gesture) {
            GestureScroll::Native { scroll } => {
                // 20 surface px at scale 0.5 is 40 frame units.
                assert!((scroll.y - 140.0).abs() < 1e-9);
            }
            other => panic!("expected native scroll, got {other:?}"),
        }
    }

    #[test]
    fn gesture_at_bounds_is_unhandled() {
        let data = scrollable_data();
        let transformer = DefaultScrollTransformer::new(true);
        // Already at the top; scrolling further up cannot move.
        let gesture = Gesture::drag(Vec2::new(0.0, -30.0), Vec2::new(0.0, -30.0), false);
        assert_eq!(
            transformer.gesture_scroll(&data, Vec2::ZERO, &gesture),
            GestureScroll::Unhandled
        );
    }

    #[test]
    fn unscrollable_axis_is_ignored() {
        let data = scrollable_data();
        let transformer = DefaultScrollTransformer::new(true);
        // Diagonal gesture: x cannot scroll, y can.
        let gesture = Gesture::drag(Vec2::new(-15.0, 20.0), Vec2::new(-15.0, 20.0), false);
        match transformer.gesture_scroll(&data, Vec2::ZERO, &gesture) {
            GestureScroll::Native { scroll } => {
                assert_eq!(scroll.x, 0.0, "x axis pinned");
                assert!(scroll.y > 0.0);
            }
            other => panic!("expected native scroll, got {other:?}"),
        }
    }

    #[test]
    fn synthetic_gesture_returns_live_transform() {
        let data = scrollable_data();
        let transformer = DefaultScrollTransformer::new(false);
        let gesture = Gesture::drag(Vec2::new(0.0, 10.0), Vec2::new(0.0, 10.0), false);
        match transformer.gesture_scroll(&data, Vec2::ZERO, &gesture) {
            GestureScroll::Live { transform, scroll } => {
                assert_eq!(transform, transformer.compose(&data, scroll, true).transform);
            }
            other => panic!("expected live scroll, got {other:?}"),
        }
    }
}

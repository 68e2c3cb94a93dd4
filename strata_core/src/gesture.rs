// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture values handed to the navigator.
//!
//! Embedders run their own pointer and wheel recognizers and forward each
//! step as a [`Gesture`] to
//! [`Navigator::on_gesture`](crate::nav::Navigator::on_gesture). The
//! navigator either turns it into scrolling (native or synthetic) or, at the
//! scroll bounds, into a discrete neighbor navigation.
//!
//! Shifts follow the scroll sense: positive `x` moves the view right over
//! the content. Wheel deltas pass through unchanged; drag recognizers
//! negate finger travel before constructing the step. A rightward gesture
//! therefore targets the right neighbor, which is also the `next` sibling
//! under the fallback rules.
//!
//! The two flags written back by the engine mirror the DOM contract:
//! [`claim`](Gesture::claim) marks the gesture as consumed so outer layers
//! do not also react, and [`prevent_default`](Gesture::prevent_default)
//! tells the embedder to suppress its own default handling (e.g. page
//! scrolling) for this event.

use kurbo::Vec2;

/// Minimum accumulated travel before a wheel gesture may trigger a
/// navigation, in surface pixels.
const MIN_WHEEL_DISTANCE: f64 = 10.0;

/// Cardinal direction of view travel over the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureDirection {
    /// The view travels left over the content.
    Left,
    /// The view travels right.
    Right,
    /// The view travels up.
    Up,
    /// The view travels down.
    Down,
}

impl GestureDirection {
    /// Returns the dominant travel direction for an accumulated shift, or
    /// `None` when there was no travel at all.
    #[must_use]
    pub fn dominant(total: Vec2) -> Option<Self> {
        if total.x == 0.0 && total.y == 0.0 {
            return None;
        }
        if total.x.abs() >= total.y.abs() {
            Some(if total.x > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if total.y > 0.0 { Self::Down } else { Self::Up })
        }
    }

    /// The transition kind conventionally paired with this direction.
    #[must_use]
    pub fn transition_kind(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Parses a directional transition kind back into a direction. Anything
    /// that is not one of the four cardinal kinds carries no direction.
    #[must_use]
    pub fn from_transition_kind(kind: &str) -> Option<Self> {
        match kind {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

/// One recognizer step of a drag or wheel gesture.
#[derive(Clone, Debug)]
pub struct Gesture {
    /// View movement of this step, in surface pixels (scroll sense).
    pub shift: Vec2,
    /// Accumulated movement since the gesture began.
    pub total: Vec2,
    /// Dominant travel direction, once the recognizer has settled on one.
    pub direction: Option<GestureDirection>,
    /// Final step of a drag (pointer lifted). Wheel gestures never set this.
    pub last: bool,
    /// Wheel or trackpad input rather than a drag.
    pub wheel: bool,
    claimed: bool,
    default_prevented: bool,
}

impl Gesture {
    /// Creates a drag step.
    #[must_use]
    pub fn drag(shift: Vec2, total: Vec2, last: bool) -> Self {
        Self {
            shift,
            total,
            direction: GestureDirection::dominant(total),
            last,
            wheel: false,
            claimed: false,
            default_prevented: false,
        }
    }

    /// Creates a wheel step.
    #[must_use]
    pub fn wheel(shift: Vec2, total: Vec2) -> Self {
        Self {
            shift,
            total,
            direction: GestureDirection::dominant(total),
            last: false,
            wheel: true,
            claimed: false,
            default_prevented: false,
        }
    }

    /// Marks the gesture as consumed by this layer.
    pub fn claim(&mut self) {
        self.claimed = true;
    }

    /// Returns whether a layer already consumed this gesture.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Asks the embedder to suppress its default handling for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Returns whether default handling was suppressed.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether enough travel accumulated for a wheel gesture to count as a
    /// deliberate navigation push rather than scroll jitter.
    #[must_use]
    pub(crate) fn enough_distance(&self) -> bool {
        self.total.x.abs() >= MIN_WHEEL_DISTANCE || self.total.y.abs() >= MIN_WHEEL_DISTANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_direction_picks_larger_axis() {
        assert_eq!(
            GestureDirection::dominant(Vec2::new(-30.0, 10.0)),
            Some(GestureDirection::Left)
        );
        assert_eq!(
            GestureDirection::dominant(Vec2::new(5.0, 12.0)),
            Some(GestureDirection::Down)
        );
        assert_eq!(GestureDirection::dominant(Vec2::ZERO), None);
    }

    #[test]
    fn drag_derives_direction_from_total() {
        let gesture = Gesture::drag(Vec2::new(-2.0, 0.0), Vec2::new(-40.0, 3.0), false);
        assert_eq!(gesture.direction, Some(GestureDirection::Left));
        assert!(!gesture.wheel);
        assert!(!gesture.is_claimed());
    }

    #[test]
    fn directions_pair_with_cardinal_kinds() {
        assert_eq!(GestureDirection::Right.transition_kind(), "right");
        assert_eq!(
            GestureDirection::from_transition_kind("up"),
            Some(GestureDirection::Up)
        );
        assert_eq!(GestureDirection::from_transition_kind("fade"), None);
    }

    #[test]
    fn wheel_distance_threshold() {
        let small = Gesture::wheel(Vec2::new(0.0, -3.0), Vec2::new(0.0, -3.0));
        assert!(!small.enough_distance());
        let large = Gesture::wheel(Vec2::new(0.0, -3.0), Vec2::new(0.0, -12.0));
        assert!(large.enough_distance());
    }

    #[test]
    fn flags_round_trip() {
        let mut gesture = Gesture::drag(Vec2::ZERO, Vec2::ZERO, true);
        gesture.claim();
        gesture.prevent_default();
        assert!(gesture.is_claimed());
        assert!(gesture.default_prevented());
    }
}

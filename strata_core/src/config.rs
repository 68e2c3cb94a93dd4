// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed configuration for frames, layers, and navigation requests.
//!
//! Embedders usually derive these values from markup attributes or app
//! state. Everything here is a plain value type; the navigator reads the
//! configs through the scene tree and never mutates them behind the
//! embedder's back.
//!
//! Boolean attributes are [`Tristate`] so that "not specified" survives
//! until the point of use and each consumer can apply its own default.

use alloc::string::String;

use crate::gate::TransitionGate;
use crate::time::Span;

/// Transition duration applied when neither the request, the frame, nor the
/// layer specifies one.
pub const DEFAULT_DURATION: Span = Span::from_millis(300);

/// Slack added to a transition's duration before its watchdog fires.
pub const WATCHDOG_MARGIN: Span = Span::from_millis(20);

/// Transition kind used when no other kind applies.
pub const DEFAULT_KIND: &str = "default";

// --------------------------------------------------------------------------
// Attribute values
// --------------------------------------------------------------------------

/// A boolean attribute that distinguishes "not specified" from `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tristate {
    /// Explicitly enabled.
    True,
    /// Explicitly disabled.
    False,
    /// Not specified; the consumer's default applies.
    #[default]
    Unset,
}

impl Tristate {
    /// Resolves to a concrete boolean, substituting `default` when unset.
    #[inline]
    #[must_use]
    pub const fn or(self, default: bool) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Unset => default,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

/// Which corner or edge of a frame is shown first when the frame is larger
/// than its stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartPosition {
    /// The top-left corner.
    #[default]
    TopLeft,
    /// The top edge, horizontally centered.
    Top,
    /// The top-right corner.
    TopRight,
    /// The left edge, vertically centered.
    Left,
    /// The center of the frame.
    Center,
    /// The right edge, vertically centered.
    Right,
    /// The bottom-left corner.
    BottomLeft,
    /// The bottom edge, horizontally centered.
    Bottom,
    /// The bottom-right corner.
    BottomRight,
}

impl StartPosition {
    /// Parses an attribute keyword such as `"top"` or `"bottom-right"`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "top-left" => Some(Self::TopLeft),
            "top" => Some(Self::Top),
            "top-right" => Some(Self::TopRight),
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "bottom-left" => Some(Self::BottomLeft),
            "bottom" => Some(Self::Bottom),
            "bottom-right" => Some(Self::BottomRight),
            _ => None,
        }
    }
}

/// How a frame is scaled to its stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitMode {
    /// Scale so the frame's width fills the stage; height may scroll.
    #[default]
    Width,
    /// Scale so the frame's height fills the stage; width may scroll.
    Height,
    /// Scale so the whole frame is visible; nothing scrolls.
    Contain,
    /// Scale so the frame covers the stage; both axes may scroll.
    Cover,
    /// No automatic scaling; [`FrameConfig::scale`] applies as-is.
    Fixed,
}

impl FitMode {
    /// Parses an attribute keyword such as `"width"` or `"cover"`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            "contain" => Some(Self::Contain),
            "cover" => Some(Self::Cover),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

/// Declared directional neighbors of a frame, by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Frame reached by leftward view travel.
    pub left: Option<String>,
    /// Frame reached by rightward view travel.
    pub right: Option<String>,
    /// Frame reached by upward view travel.
    pub top: Option<String>,
    /// Frame reached by downward view travel.
    pub bottom: Option<String>,
}

/// Per-frame configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
    /// Name used for navigation targets. Unique within a context by
    /// convention; resolution prefers the own layer on collision.
    pub name: String,
    /// Declared directional neighbors.
    pub neighbors: Neighbors,
    /// Transition kind used when a request names this frame without a kind.
    pub default_transition: Option<String>,
    /// Corner or edge shown first when the frame overflows its stage.
    pub start_position: StartPosition,
    /// How the frame is scaled to its stage.
    pub fit: FitMode,
    /// Scale factor for [`FitMode::Fixed`].
    pub scale: f64,
    /// Explicit horizontal offset for [`FitMode::Fixed`], in stage units.
    pub x: Option<f64>,
    /// Explicit vertical offset for [`FitMode::Fixed`], in stage units.
    pub y: Option<f64>,
}

impl FrameConfig {
    /// Creates a config with the given name and default values for
    /// everything else.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            neighbors: Neighbors::default(),
            default_transition: None,
            start_position: StartPosition::default(),
            fit: FitMode::default(),
            scale: 1.0,
            x: None,
            y: None,
        }
    }
}

/// Per-layer configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerConfig {
    /// Initial frame to show, as a target token (`"intro"`, `"!none"`).
    /// `None` falls back to the layer's first frame.
    pub default_frame: Option<String>,
    /// Transition kind used when neither the request nor the target frame
    /// specifies one.
    pub default_transition: Option<String>,
    /// Whether the embedder scrolls the layer natively. Defaults to `true`.
    pub native_scroll: Tristate,
    /// Disables scrolling entirely when `true`. Defaults to `false`.
    pub no_scrolling: Tristate,
    /// Whether drag gestures may move the layer. Defaults to `false`.
    /// Consumed by the embedder's gesture recognizers, not by the engine.
    pub draggable: Tristate,
    /// Auto-advance interval. After each finished transition the navigator
    /// arms a timer that fires a `!next` navigation when the layer is idle.
    pub timer: Option<Span>,
}

impl LayerConfig {
    /// Whether the embedder scrolls this layer natively (default `true`).
    #[inline]
    #[must_use]
    pub fn native_scroll_enabled(&self) -> bool {
        self.native_scroll.or(true)
    }

    /// Whether scrolling is disabled entirely (default `false`).
    #[inline]
    #[must_use]
    pub fn scrolling_disabled(&self) -> bool {
        self.no_scrolling.or(false)
    }

    /// Whether drag gestures may move this layer (default `false`).
    #[inline]
    #[must_use]
    pub fn drag_enabled(&self) -> bool {
        self.draggable.or(false)
    }
}

// --------------------------------------------------------------------------
// Durations and kinds
// --------------------------------------------------------------------------

/// Parses a duration attribute.
///
/// Accepts `"250ms"`, `"1s"` (fractions allowed), or a bare number meaning
/// milliseconds. Returns `None` for anything unparseable or negative.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped non-negative and +0.5 rounds to nearest nanosecond"
)]
pub fn parse_duration(text: &str) -> Option<Span> {
    let text = text.trim();
    let millis: f64 = if let Some(number) = text.strip_suffix("ms") {
        number.trim().parse().ok()?
    } else if let Some(number) = text.strip_suffix('s') {
        let seconds: f64 = number.trim().parse().ok()?;
        seconds * 1000.0
    } else {
        text.parse().ok()?
    };
    if !millis.is_finite() || millis < 0.0 || millis > u64::MAX as f64 / 1_000_000.0 {
        return None;
    }
    Some(Span((millis * 1_000_000.0 + 0.5) as u64))
}

/// A transition kind with its prefixes resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionKind {
    /// The kind with all prefixes stripped. Empty means "unspecified";
    /// consumers substitute [`DEFAULT_KIND`].
    pub base: String,
    /// The kind carried the `auto:` prefix and may be replaced by a
    /// direction suggested by the current/target sibling order.
    pub auto: bool,
    /// The kind carried the `r:` or `reverse:` prefix and plays backwards.
    pub reverse: bool,
}

impl TransitionKind {
    /// Parses a raw kind string, stripping `auto:` then `r:`/`reverse:`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (auto, rest) = match raw.strip_prefix("auto:") {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (reverse, base) = if let Some(rest) = rest.strip_prefix("reverse:") {
            (true, rest)
        } else if let Some(rest) = rest.strip_prefix("r:") {
            (true, rest)
        } else {
            (false, rest)
        };
        Self {
            base: String::from(base),
            auto,
            reverse,
        }
    }

    /// The base kind, with [`DEFAULT_KIND`] substituted for an empty base.
    #[must_use]
    pub fn base_or_default(&self) -> &str {
        if self.base.is_empty() {
            DEFAULT_KIND
        } else {
            &self.base
        }
    }
}

// --------------------------------------------------------------------------
// Requests
// --------------------------------------------------------------------------

/// Options for a single navigation or scroll request.
///
/// Every field is optional; `TransitionRequest::default()` is the plain
/// "use the configured defaults" request.
#[derive(Clone, Debug, Default)]
pub struct TransitionRequest {
    /// Transition kind, possibly prefixed (`"auto:r:slide"`). Overrides the
    /// frame's and layer's default kinds.
    pub kind: Option<String>,
    /// Animation duration. Overrides [`DEFAULT_DURATION`].
    pub duration: Option<Span>,
    /// Defers execution; the request runs at the first paint boundary at or
    /// after `now + delay`, unless a later request in the same group
    /// cancels it.
    pub delay: Span,
    /// Requests sharing a group id supersede each other while delayed.
    pub group_id: Option<String>,
    /// Gate shared with other same-tick requests. Must be registered before
    /// the request is issued.
    pub gate: Option<TransitionGate>,
    /// Explicit horizontal scroll target, overriding the start-position
    /// derived default.
    pub scroll_x: Option<f64>,
    /// Explicit vertical scroll target, overriding the start-position
    /// derived default.
    pub scroll_y: Option<f64>,
    /// Overrides the target frame's configured start position.
    pub start_position: Option<StartPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tristate_defaults() {
        assert!(Tristate::Unset.or(true));
        assert!(!Tristate::Unset.or(false));
        assert!(Tristate::True.or(false));
        assert!(!Tristate::False.or(true));
        assert_eq!(Tristate::from(true), Tristate::True);
    }

    #[test]
    fn duration_parsing() {
        assert_eq!(parse_duration("250ms"), Some(Span::from_millis(250)));
        assert_eq!(parse_duration("1s"), Some(Span::from_millis(1000)));
        assert_eq!(parse_duration("0.3s"), Some(Span::from_millis(300)));
        assert_eq!(parse_duration("400"), Some(Span::from_millis(400)));
        assert_eq!(parse_duration(" 120ms "), Some(Span::from_millis(120)));
        assert_eq!(parse_duration("0"), Some(Span::ZERO));
        assert_eq!(parse_duration("fast"), None);
        assert_eq!(parse_duration("-5ms"), None, "negative rejected");
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn kind_prefix_parsing() {
        let plain = TransitionKind::parse("slide");
        assert_eq!(plain.base, "slide");
        assert!(!plain.auto && !plain.reverse);

        let reversed = TransitionKind::parse("r:fade");
        assert!(reversed.reverse);
        assert_eq!(reversed.base, "fade");

        let long_form = TransitionKind::parse("reverse:fade");
        assert!(long_form.reverse);
        assert_eq!(long_form.base, "fade");

        let stacked = TransitionKind::parse("auto:r:slide");
        assert!(stacked.auto && stacked.reverse);
        assert_eq!(stacked.base, "slide");

        let bare_auto = TransitionKind::parse("auto:");
        assert!(bare_auto.auto);
        assert_eq!(bare_auto.base_or_default(), DEFAULT_KIND, "empty base");
    }

    #[test]
    fn auto_prefix_must_come_first() {
        // "r:auto:x" reverses the literal kind "auto:x"; only the leading
        // position makes "auto:" a prefix.
        let kind = TransitionKind::parse("r:auto:x");
        assert!(!kind.auto);
        assert!(kind.reverse);
        assert_eq!(kind.base, "auto:x");
    }

    #[test]
    fn start_position_keywords() {
        assert_eq!(
            StartPosition::from_keyword("bottom-right"),
            Some(StartPosition::BottomRight)
        );
        assert_eq!(StartPosition::from_keyword("center"), Some(StartPosition::Center));
        assert_eq!(StartPosition::from_keyword("middle"), None);
        assert_eq!(StartPosition::default(), StartPosition::TopLeft);
    }

    #[test]
    fn layer_config_resolved_defaults() {
        let config = LayerConfig::default();
        assert!(config.native_scroll_enabled(), "native scroll defaults on");
        assert!(!config.scrolling_disabled());
        assert!(!config.drag_enabled());
    }
}

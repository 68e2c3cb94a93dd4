// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamps and spans for the tick-driven engine.
//!
//! [`Timestamp`] is a point in time expressed as nanoseconds since an
//! arbitrary epoch chosen by the embedder (usually process start). The engine
//! never reads a clock; every entry point that needs time takes a `now`
//! argument, which makes transition windows and watchdogs fully deterministic
//! under test.
//!
//! [`Span`] is a length of time in the same nanosecond units. Transition
//! durations and delays are spans.

use core::fmt;
use core::ops::{Add, Sub};

/// A point in time expressed as nanoseconds since the embedder's epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The epoch itself.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Creates a timestamp from a millisecond offset.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Returns the span between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn span_since(self, earlier: Self) -> Span {
        Span(self.0.saturating_sub(earlier.0))
    }

    /// Saturating addition of a span.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, span: Span) -> Self {
        Self(self.0.saturating_add(span.0))
    }

    /// Checked addition of a span.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, span: Span) -> Option<Self> {
        match self.0.checked_add(span.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }
}

impl Add<Span> for Timestamp {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Span) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub<Span> for Timestamp {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Span) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for Timestamp {
    type Output = Span;

    #[inline]
    fn sub(self, rhs: Self) -> Span {
        Span(self.0 - rhs.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A length of time in nanoseconds.
///
/// Transition durations, delays, and watchdog margins are all spans.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span(pub u64);

impl Span {
    /// A zero-length span.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Creates a span from milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Returns this span in whole milliseconds, rounding down.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// Returns `true` for the zero-length span.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns the larger of two spans.
    #[inline]
    #[must_use]
    pub const fn max(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 { self } else { rhs }
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Span {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Span {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip() {
        let s = Span::from_millis(300);
        assert_eq!(s.nanos(), 300_000_000);
        assert_eq!(s.as_millis(), 300, "round trip through nanos");
    }

    #[test]
    fn span_since_saturates() {
        let t = Timestamp::from_millis(100);
        assert_eq!(t.span_since(Timestamp::from_millis(250)), Span::ZERO);
        assert_eq!(
            t.span_since(Timestamp::from_millis(40)),
            Span::from_millis(60)
        );
    }

    #[test]
    fn span_arithmetic() {
        let a = Span::from_millis(100);
        let b = Span::from_millis(30);
        assert_eq!((a + b).as_millis(), 130);
        assert_eq!((a - b).as_millis(), 70);
        assert_eq!(a.saturating_sub(Span::from_millis(200)), Span::ZERO);
        assert_eq!(a.max(b), a);
        assert_eq!(b.max(a), a);
    }

    #[test]
    fn timestamp_span_ops() {
        let t = Timestamp::from_millis(1000);
        let d = Span::from_millis(200);
        assert_eq!(t + d, Timestamp::from_millis(1200));
        assert_eq!(t - d, Timestamp::from_millis(800));
        assert_eq!(
            Timestamp(u64::MAX).saturating_add(d),
            Timestamp(u64::MAX),
            "saturate at the far end"
        );
    }
}

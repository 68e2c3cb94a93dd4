// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigation error type.
//!
//! All failures are reported synchronously from the call that caused them.
//! Once a transition has been accepted (the call returned `Ok`), it can be
//! superseded or cleaned up by a watchdog, but it can no longer fail: those
//! paths are states, not errors.

use alloc::string::String;
use core::fmt;

/// Error returned by navigation entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationError {
    /// The named frame does not exist in the layer or, for cross-layer
    /// navigation, anywhere in the context.
    FrameNotFound {
        /// The name that failed to resolve.
        name: String,
    },
    /// A navigation request carried no target name at all.
    MissingTarget,
    /// A layer was created on a stale or foreign host id.
    InvalidHost,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameNotFound { name } => write!(f, "frame not found: {name:?}"),
            Self::MissingTarget => write!(f, "navigation request has no target"),
            Self::InvalidHost => write!(f, "layer host is stale or not in this tree"),
        }
    }
}

impl core::error::Error for NavigationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn display_includes_frame_name() {
        let err = NavigationError::FrameNotFound {
            name: "hero".to_string(),
        };
        let text = format!("{err}");
        assert!(text.contains("hero"), "got: {text}");
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(NavigationError::MissingTarget, NavigationError::MissingTarget);
        assert_ne!(
            NavigationError::MissingTarget,
            NavigationError::InvalidHost,
            "distinct variants"
        );
    }
}

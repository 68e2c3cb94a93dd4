// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Symbolic navigation target resolution.
//!
//! Requests name their destination either literally or with a `!` token:
//! `!next`, `!prev` (or `!previous`), `!none`, `!left`, `!right`, `!top`,
//! `!bottom`. Literal names are searched in the requesting layer first and
//! then across the whole tree, so a request can pull a frame out of another
//! layer.
//!
//! Directional tokens consult the current frame's declared neighbors first.
//! Without a declared neighbor they degrade to a circular sibling step:
//! rightward and downward motion means `next`, leftward and upward motion
//! means `previous`, where the motion is taken from the transition kind
//! hint when one is present and from the token itself otherwise. A missing
//! *declared* name is still an error; only the undeclared slot falls back.

use alloc::string::String;

use crate::config::Neighbors;
use crate::error::NavigationError;
use crate::gesture::GestureDirection;
use crate::tree::{FrameId, LayerId, SceneTree};

/// A parsed navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameTarget {
    /// A literal frame name.
    Name(String),
    /// The sibling after the current frame, wrapping at the end.
    Next,
    /// The sibling before the current frame, wrapping at the start.
    Previous,
    /// No frame shown. A valid state, not an error.
    None,
    /// The current frame's left neighbor.
    Left,
    /// The current frame's right neighbor.
    Right,
    /// The current frame's top neighbor.
    Top,
    /// The current frame's bottom neighbor.
    Bottom,
}

impl FrameTarget {
    /// Parses a target string. Anything that is not a known `!` token is a
    /// literal name, including unknown `!` strings.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text {
            "!next" => Self::Next,
            "!prev" | "!previous" => Self::Previous,
            "!none" => Self::None,
            "!left" => Self::Left,
            "!right" => Self::Right,
            "!top" => Self::Top,
            "!bottom" => Self::Bottom,
            _ => Self::Name(String::from(text)),
        }
    }
}

impl From<&str> for FrameTarget {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for FrameTarget {
    fn from(text: String) -> Self {
        match Self::parse(&text) {
            Self::Name(_) => Self::Name(text),
            token => token,
        }
    }
}

/// Resolves `target` against `layer`'s children and the current frame's
/// neighbor declarations.
///
/// `hint` is the motion implied by the request's transition kind, used when
/// a directional token has no declared neighbor. `Ok(None)` means "show no
/// frame" and only arises from [`FrameTarget::None`].
///
/// # Panics
///
/// Panics if `layer` or `current` is stale.
pub fn resolve(
    tree: &SceneTree,
    layer: LayerId,
    current: Option<FrameId>,
    target: &FrameTarget,
    hint: Option<GestureDirection>,
) -> Result<Option<FrameId>, NavigationError> {
    match target {
        FrameTarget::None => Ok(None),
        FrameTarget::Name(name) => by_name(tree, layer, name).map(Some),
        FrameTarget::Next => sibling(tree, layer, current, true).map(Some),
        FrameTarget::Previous => sibling(tree, layer, current, false).map(Some),
        FrameTarget::Left => {
            directional(tree, layer, current, GestureDirection::Left, hint).map(Some)
        }
        FrameTarget::Right => {
            directional(tree, layer, current, GestureDirection::Right, hint).map(Some)
        }
        FrameTarget::Top => directional(tree, layer, current, GestureDirection::Up, hint).map(Some),
        FrameTarget::Bottom => {
            directional(tree, layer, current, GestureDirection::Down, hint).map(Some)
        }
    }
}

fn by_name(tree: &SceneTree, layer: LayerId, name: &str) -> Result<FrameId, NavigationError> {
    if let Some(frame) = tree.find_frame(layer, name) {
        return Ok(frame);
    }
    tree.find_frame_anywhere(name)
        .ok_or_else(|| NavigationError::FrameNotFound {
            name: String::from(name),
        })
}

fn sibling(
    tree: &SceneTree,
    layer: LayerId,
    current: Option<FrameId>,
    forward: bool,
) -> Result<FrameId, NavigationError> {
    let count = tree.child_count(layer);
    if count == 0 {
        return Err(NavigationError::MissingTarget);
    }
    // Without a current frame both directions land on the first sibling.
    let Some(current) = current else {
        return Ok(tree.child_at(layer, 0));
    };
    let Some(position) = tree.position_of(layer, current) else {
        return Ok(tree.child_at(layer, 0));
    };
    let index = if forward {
        (position + 1) % count
    } else {
        (position + count - 1) % count
    };
    Ok(tree.child_at(layer, index))
}

fn directional(
    tree: &SceneTree,
    layer: LayerId,
    current: Option<FrameId>,
    direction: GestureDirection,
    hint: Option<GestureDirection>,
) -> Result<FrameId, NavigationError> {
    let Some(current) = current else {
        return sibling(tree, layer, None, true);
    };
    if let Some(name) = declared(&tree.frame_config(current).neighbors, direction) {
        return by_name(tree, layer, name);
    }
    let forward = matches!(
        hint.unwrap_or(direction),
        GestureDirection::Right | GestureDirection::Down
    );
    sibling(tree, layer, Some(current), forward)
}

/// The neighbor name a frame declares for `direction`, if any.
pub(crate) fn declared(neighbors: &Neighbors, direction: GestureDirection) -> Option<&str> {
    match direction {
        GestureDirection::Left => neighbors.left.as_deref(),
        GestureDirection::Right => neighbors.right.as_deref(),
        GestureDirection::Up => neighbors.top.as_deref(),
        GestureDirection::Down => neighbors.bottom.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FrameConfig, LayerConfig};
    use crate::tree::Host;
    use alloc::vec::Vec;
    use kurbo::Size;

    fn deck(names: &[&str]) -> (SceneTree, LayerId, Vec<FrameId>) {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let layer = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let frames = names
            .iter()
            .map(|name| tree.add_frame(layer, FrameConfig::new(*name), Size::new(800.0, 600.0)))
            .collect();
        (tree, layer, frames)
    }

    #[test]
    fn parse_tokens() {
        assert_eq!(FrameTarget::parse("!next"), FrameTarget::Next);
        assert_eq!(FrameTarget::parse("!prev"), FrameTarget::Previous);
        assert_eq!(FrameTarget::parse("!previous"), FrameTarget::Previous);
        assert_eq!(FrameTarget::parse("!none"), FrameTarget::None);
        assert_eq!(FrameTarget::parse("!left"), FrameTarget::Left);
        assert_eq!(
            FrameTarget::parse("hero"),
            FrameTarget::Name(String::from("hero"))
        );
    }

    #[test]
    fn next_walks_siblings_circularly() {
        let (tree, layer, frames) = deck(&["a", "b", "c"]);
        let target = FrameTarget::Next;
        assert_eq!(resolve(&tree, layer, None, &target, None), Ok(Some(frames[0])));
        assert_eq!(
            resolve(&tree, layer, Some(frames[0]), &target, None),
            Ok(Some(frames[1]))
        );
        assert_eq!(
            resolve(&tree, layer, Some(frames[2]), &target, None),
            Ok(Some(frames[0])),
            "wraps to the first sibling"
        );
    }

    #[test]
    fn previous_wraps_to_last() {
        let (tree, layer, frames) = deck(&["a", "b", "c"]);
        let target = FrameTarget::Previous;
        assert_eq!(resolve(&tree, layer, None, &target, None), Ok(Some(frames[0])));
        assert_eq!(
            resolve(&tree, layer, Some(frames[0]), &target, None),
            Ok(Some(frames[2]))
        );
    }

    #[test]
    fn none_resolves_to_no_frame() {
        let (tree, layer, frames) = deck(&["a"]);
        assert_eq!(
            resolve(&tree, layer, Some(frames[0]), &FrameTarget::None, None),
            Ok(None)
        );
    }

    #[test]
    fn missing_name_is_an_error() {
        let (tree, layer, _) = deck(&["a"]);
        assert_eq!(
            resolve(&tree, layer, None, &FrameTarget::parse("ghost"), None),
            Err(NavigationError::FrameNotFound {
                name: String::from("ghost")
            })
        );
    }

    #[test]
    fn empty_layer_has_no_sibling_target() {
        let (tree, layer, _) = deck(&[]);
        assert_eq!(
            resolve(&tree, layer, None, &FrameTarget::Next, None),
            Err(NavigationError::MissingTarget)
        );
    }

    #[test]
    fn declared_neighbor_wins_over_sibling_order() {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let layer = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let size = Size::new(800.0, 600.0);
        let a = tree.add_frame(layer, FrameConfig::new("a"), size);
        let mut config = FrameConfig::new("b");
        config.neighbors.right = Some(String::from("a"));
        let b = tree.add_frame(layer, config, size);
        let _ = tree.add_frame(layer, FrameConfig::new("c"), size);
        assert_eq!(
            resolve(&tree, layer, Some(b), &FrameTarget::Right, None),
            Ok(Some(a)),
            "declared neighbor beats the next sibling"
        );
    }

    #[test]
    fn declared_neighbor_must_exist() {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let layer = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let mut config = FrameConfig::new("a");
        config.neighbors.left = Some(String::from("ghost"));
        let a = tree.add_frame(layer, config, Size::new(800.0, 600.0));
        assert_eq!(
            resolve(&tree, layer, Some(a), &FrameTarget::Left, None),
            Err(NavigationError::FrameNotFound {
                name: String::from("ghost")
            }),
            "declared names never fall back"
        );
    }

    #[test]
    fn directional_fallback_follows_sibling_order() {
        let (tree, layer, frames) = deck(&["f1", "f2", "f3"]);
        assert_eq!(
            resolve(
                &tree,
                layer,
                Some(frames[1]),
                &FrameTarget::Right,
                Some(GestureDirection::Right)
            ),
            Ok(Some(frames[2]))
        );
        assert_eq!(
            resolve(
                &tree,
                layer,
                Some(frames[1]),
                &FrameTarget::Left,
                Some(GestureDirection::Left)
            ),
            Ok(Some(frames[0]))
        );
    }

    #[test]
    fn hint_overrides_the_token_direction() {
        let (tree, layer, frames) = deck(&["f1", "f2", "f3"]);
        // A left request caused by rightward motion steps forward.
        assert_eq!(
            resolve(
                &tree,
                layer,
                Some(frames[1]),
                &FrameTarget::Left,
                Some(GestureDirection::Right)
            ),
            Ok(Some(frames[2]))
        );
        // A right request caused by leftward motion steps back.
        assert_eq!(
            resolve(
                &tree,
                layer,
                Some(frames[1]),
                &FrameTarget::Right,
                Some(GestureDirection::Left)
            ),
            Ok(Some(frames[0]))
        );
    }

    #[test]
    fn directional_without_current_lands_on_first() {
        let (tree, layer, frames) = deck(&["a", "b"]);
        assert_eq!(
            resolve(&tree, layer, None, &FrameTarget::Left, None),
            Ok(Some(frames[0]))
        );
        assert_eq!(
            resolve(&tree, layer, None, &FrameTarget::Bottom, None),
            Ok(Some(frames[0]))
        );
    }

    #[test]
    fn names_are_found_across_layers() {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let here = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let there = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let remote = tree.add_frame(there, FrameConfig::new("far"), Size::new(100.0, 100.0));
        assert_eq!(
            resolve(&tree, here, None, &FrameTarget::parse("far"), None),
            Ok(Some(remote))
        );
    }
}

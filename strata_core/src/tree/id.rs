// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage, layer, and frame identity types.

use core::fmt;

/// A handle to a stage in a [`SceneTree`](super::SceneTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId {
    /// Slot index into the tree's stage slab.
    pub(crate) idx: u32,
    /// Generation counter. Must match the tree's generation for this slot.
    pub(crate) generation: u32,
}

/// A handle to a layer in a [`SceneTree`](super::SceneTree).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

/// A handle to a frame in a [`SceneTree`](super::SceneTree).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

macro_rules! id_impl {
    ($name:ident) => {
        impl $name {
            pub(crate) const fn new(idx: u32, generation: u32) -> Self {
                Self { idx, generation }
            }

            /// Returns the raw slot index (for diagnostics only).
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.idx
            }

            /// Returns the generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}@gen{})", stringify!($name), self.idx, self.generation)
            }
        }
    };
}

id_impl!(StageId);
id_impl!(LayerId);
id_impl!(FrameId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_format_shows_slot_and_generation() {
        let id = FrameId::new(3, 1);
        assert_eq!(alloc::format!("{id:?}"), "FrameId(3@gen1)");
    }

    #[test]
    fn ids_order_by_slot_then_generation() {
        let a = LayerId::new(0, 2);
        let b = LayerId::new(1, 0);
        assert!(a < b, "slot index dominates ordering");
    }
}

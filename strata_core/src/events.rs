// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle events for navigation.
//!
//! The [`Navigator`](crate::nav::Navigator) reports transition progress and
//! tree mutations through an [`EventSink`]. All sink methods default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! # Ordering guarantees
//!
//! - [`on_before_transition`](EventSink::on_before_transition) precedes
//!   [`on_transition_started`](EventSink::on_transition_started) precedes
//!   [`on_transition_finished`](EventSink::on_transition_finished) for any
//!   one generation; a superseded generation never reaches the finished
//!   event.
//! - [`on_transition_prepared`](EventSink::on_transition_prepared) fires
//!   exactly once per animated transition, after all gate parties finished
//!   preparing.
//! - Within one batch of child updates, every removal is reported before
//!   the first addition.
//!
//! # Re-entrancy
//!
//! Sinks must not call back into the navigator from inside a callback. A
//! sink that wants to react (e.g. trigger a follow-up navigation) records
//! the event and acts after the engine call returns.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::time::Timestamp;
use crate::tree::{FrameId, LayerId};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a navigation request has been accepted, before any loading
/// or animation starts.
#[derive(Clone, Copy, Debug)]
pub struct BeforeTransitionEvent<'a> {
    /// Layer the transition runs on.
    pub layer: LayerId,
    /// Resolved target frame name; `None` for a transition to no frame.
    pub target: Option<&'a str>,
    /// Generation of the transition this event belongs to.
    pub generation: u64,
    /// Engine time the event was emitted at.
    pub at: Timestamp,
}

/// Emitted once the target frame is loaded and measured and the layer state
/// has switched to it.
#[derive(Clone, Copy, Debug)]
pub struct TransitionStartedEvent<'a> {
    /// Layer the transition runs on.
    pub layer: LayerId,
    /// New current frame name; `None` for a transition to no frame.
    pub frame: Option<&'a str>,
    /// Generation of the transition this event belongs to.
    pub generation: u64,
    /// Engine time the event was emitted at.
    pub at: Timestamp,
}

/// Emitted exactly once per animated transition, after every gate party has
/// finished preparation and the animation is about to begin.
#[derive(Clone, Copy, Debug)]
pub struct TransitionPreparedEvent {
    /// Layer the transition runs on.
    pub layer: LayerId,
    /// Generation of the transition this event belongs to.
    pub generation: u64,
    /// Engine time the event was emitted at.
    pub at: Timestamp,
}

/// Emitted at the paint boundary after a transition's animation completed.
///
/// Superseded transitions never emit this.
#[derive(Clone, Copy, Debug)]
pub struct TransitionFinishedEvent<'a> {
    /// Layer the transition ran on.
    pub layer: LayerId,
    /// The frame that is now current; `None` after a transition to no frame.
    pub frame: Option<&'a str>,
    /// Generation of the transition this event belongs to.
    pub generation: u64,
    /// Engine time the event was emitted at.
    pub at: Timestamp,
}

/// Emitted when a frame joins a layer, including the destination side of a
/// cross-layer adoption.
#[derive(Clone, Copy, Debug)]
pub struct ChildAddedEvent<'a> {
    /// Layer that gained the frame.
    pub layer: LayerId,
    /// The frame that joined.
    pub frame: FrameId,
    /// The frame's navigation name.
    pub name: &'a str,
}

/// Emitted when a frame leaves a layer, including the source side of a
/// cross-layer adoption.
#[derive(Clone, Copy, Debug)]
pub struct ChildRemovedEvent<'a> {
    /// Layer that lost the frame.
    pub layer: LayerId,
    /// The frame that left. Stale if the frame was removed outright.
    pub frame: FrameId,
    /// The frame's navigation name.
    pub name: &'a str,
}

// ---------------------------------------------------------------------------
// EventSink trait
// ---------------------------------------------------------------------------

/// Receives lifecycle events from the navigator.
///
/// All methods have default no-op implementations. See the module docs for
/// ordering and re-entrancy rules.
pub trait EventSink {
    /// Called when a navigation request is accepted.
    fn on_before_transition(&mut self, e: &BeforeTransitionEvent<'_>) {
        _ = e;
    }

    /// Called when the layer switches to the target frame.
    fn on_transition_started(&mut self, e: &TransitionStartedEvent<'_>) {
        _ = e;
    }

    /// Called when all gate parties finished preparing.
    fn on_transition_prepared(&mut self, e: &TransitionPreparedEvent) {
        _ = e;
    }

    /// Called when a transition finishes (never for superseded ones).
    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
        _ = e;
    }

    /// Called when a frame joins a layer.
    fn on_child_added(&mut self, e: &ChildAddedEvent<'_>) {
        _ = e;
    }

    /// Called when a frame leaves a layer.
    fn on_child_removed(&mut self, e: &ChildRemovedEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// An [`EventSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}

/// Forwards events to the shared inner sink.
///
/// The navigator takes its sink by value; wrapping a sink in `Rc<RefCell>`
/// and handing over a clone lets the embedder read the sink's state back
/// afterwards.
impl<T: EventSink> EventSink for Rc<RefCell<T>> {
    fn on_before_transition(&mut self, e: &BeforeTransitionEvent<'_>) {
        self.borrow_mut().on_before_transition(e);
    }

    fn on_transition_started(&mut self, e: &TransitionStartedEvent<'_>) {
        self.borrow_mut().on_transition_started(e);
    }

    fn on_transition_prepared(&mut self, e: &TransitionPreparedEvent) {
        self.borrow_mut().on_transition_prepared(e);
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
        self.borrow_mut().on_transition_finished(e);
    }

    fn on_child_added(&mut self, e: &ChildAddedEvent<'_>) {
        self.borrow_mut().on_child_added(e);
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent<'_>) {
        self.borrow_mut().on_child_removed(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_transition_prepared(&TransitionPreparedEvent {
            layer: LayerId::new(0, 0),
            generation: 1,
            at: Timestamp::ZERO,
        });
    }

    #[test]
    fn partial_sink_overrides_one_event() {
        struct Finishes {
            frames: Vec<Option<String>>,
        }
        impl EventSink for Finishes {
            fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
                self.frames.push(e.frame.map(ToString::to_string));
            }
        }

        let mut sink = Finishes { frames: Vec::new() };
        sink.on_transition_started(&TransitionStartedEvent {
            layer: LayerId::new(0, 0),
            frame: Some("a"),
            generation: 1,
            at: Timestamp::ZERO,
        });
        sink.on_transition_finished(&TransitionFinishedEvent {
            layer: LayerId::new(0, 0),
            frame: Some("a"),
            generation: 1,
            at: Timestamp::ZERO,
        });
        sink.on_transition_finished(&TransitionFinishedEvent {
            layer: LayerId::new(0, 0),
            frame: None,
            generation: 2,
            at: Timestamp::ZERO,
        });
        assert_eq!(sink.frames, &[Some("a".to_string()), None]);
    }

    #[test]
    fn rc_wrapped_sink_shares_its_state() {
        #[derive(Default)]
        struct Counter {
            prepared: usize,
        }
        impl EventSink for Counter {
            fn on_transition_prepared(&mut self, _: &TransitionPreparedEvent) {
                self.prepared += 1;
            }
        }

        let shared = Rc::new(RefCell::new(Counter::default()));
        let mut handed_over: Rc<RefCell<Counter>> = shared.clone();
        handed_over.on_transition_prepared(&TransitionPreparedEvent {
            layer: LayerId::new(0, 0),
            generation: 1,
            at: Timestamp::ZERO,
        });
        assert_eq!(shared.borrow().prepared, 1);
    }
}

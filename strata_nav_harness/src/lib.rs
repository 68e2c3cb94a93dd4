// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable layout and event doubles for strata tests and demos.
//!
//! Embedders hand their [`Layout`] and [`EventSink`] to the navigator by
//! value, so the doubles here share their observable state through cloneable
//! handles:
//!
//! - [`InstantLayout`] — acknowledges every operation synchronously and
//!   records nothing. The cheapest way to drive a navigator.
//! - [`RecordingLayout`] — logs every layout call as a readable line and can
//!   defer loads, transitions, and surface animations behind tickets; the
//!   retained [`LayoutLog`] hands the tickets back for completion.
//! - [`RecordingSink`] — collects lifecycle events as [`NavEvent`] values.
//! - [`StepClock`] — a manual clock for deterministic `now` values.
//! - [`single_layer_deck`] — builds the one-stage, one-layer frame deck most
//!   demos and tests start from.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use strata_core::config::{FrameConfig, LayerConfig};
use strata_core::error::NavigationError;
use strata_core::events::{
    BeforeTransitionEvent, ChildAddedEvent, ChildRemovedEvent, EventSink, TransitionFinishedEvent,
    TransitionPreparedEvent, TransitionStartedEvent,
};
use strata_core::kurbo::Size;
use strata_core::layout::{
    FramePlacement, Layout, LayoutPoll, LayoutTicket, LoadRequest, PositionRequest,
    SurfaceTransform, TransitionPlacement,
};
use strata_core::nav::Navigator;
use strata_core::time::{Span, Timestamp};
use strata_core::tree::{FrameId, Host, LayerId, StageId};

// ---------------------------------------------------------------------------
// InstantLayout
// ---------------------------------------------------------------------------

/// A [`Layout`] that completes every operation within the call.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantLayout;

impl Layout for InstantLayout {
    fn load_frame(&mut self, _: LoadRequest) -> LayoutPoll {
        LayoutPoll::Ready
    }

    fn show_frame(&mut self, _: FramePlacement) {}

    fn begin_transition(&mut self, _: TransitionPlacement) -> LayoutPoll {
        LayoutPoll::Ready
    }

    fn set_surface_transform(&mut self, _: SurfaceTransform) -> LayoutPoll {
        LayoutPoll::Ready
    }
}

// ---------------------------------------------------------------------------
// RecordingLayout
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct LogInner {
    calls: Vec<String>,
    tickets: Vec<LayoutTicket>,
}

/// Shared view into a [`RecordingLayout`]'s call log and deferred tickets.
///
/// Clones observe the same log, so a handle retained before the layout was
/// handed to the navigator stays useful afterwards.
#[derive(Clone, Debug, Default)]
pub struct LayoutLog {
    inner: Rc<RefCell<LogInner>>,
}

impl LayoutLog {
    /// The calls recorded so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    /// Removes and returns the tickets of deferred operations, oldest first.
    /// Hand them to [`Navigator::complete`] to finish the work.
    pub fn take_tickets(&self) -> Vec<LayoutTicket> {
        core::mem::take(&mut self.inner.borrow_mut().tickets)
    }

    /// Clears recorded calls, keeping deferred tickets.
    pub fn clear(&self) {
        self.inner.borrow_mut().calls.clear();
    }
}

/// A [`Layout`] that logs every call and optionally defers completion.
///
/// With all toggles off it behaves like [`InstantLayout`] plus the log. Each
/// toggle makes the corresponding operation return [`LayoutPoll::Pending`]
/// and park its ticket in the [`LayoutLog`].
#[derive(Clone, Debug, Default)]
pub struct RecordingLayout {
    log: LayoutLog,
    /// Defer [`Layout::load_frame`] completions.
    pub async_load: bool,
    /// Defer [`Layout::begin_transition`] completions.
    pub async_transition: bool,
    /// Defer ticketed [`Layout::set_surface_transform`] completions.
    pub async_surface: bool,
}

impl RecordingLayout {
    /// Creates a fully synchronous recording layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to this layout's log, valid after the layout has been moved
    /// into the navigator.
    #[must_use]
    pub fn log(&self) -> LayoutLog {
        self.log.clone()
    }

    fn push(&self, line: String) {
        self.log.inner.borrow_mut().calls.push(line);
    }
}

impl Layout for RecordingLayout {
    fn load_frame(&mut self, request: LoadRequest) -> LayoutPoll {
        self.push(format!("load {}", request.frame.index()));
        if self.async_load {
            self.log.inner.borrow_mut().tickets.push(request.ticket);
            LayoutPoll::Pending
        } else {
            LayoutPoll::Ready
        }
    }

    fn show_frame(&mut self, placement: FramePlacement) {
        match placement.frame {
            Some(frame) => self.push(format!("show {}", frame.index())),
            None => self.push(String::from("show none")),
        }
    }

    fn begin_transition(&mut self, placement: TransitionPlacement) -> LayoutPoll {
        let reversed = if placement.reverse { " reversed" } else { "" };
        self.push(format!(
            "animate {}{reversed} {}ms",
            placement.kind,
            placement.duration.as_millis()
        ));
        if self.async_transition {
            self.log.inner.borrow_mut().tickets.push(placement.ticket);
            LayoutPoll::Pending
        } else {
            LayoutPoll::Ready
        }
    }

    fn set_surface_transform(&mut self, transform: SurfaceTransform) -> LayoutPoll {
        self.push(format!("surface {}ms", transform.duration.as_millis()));
        match transform.ticket {
            Some(ticket) if self.async_surface => {
                self.log.inner.borrow_mut().tickets.push(ticket);
                LayoutPoll::Pending
            }
            _ => LayoutPoll::Ready,
        }
    }

    fn position_frame(&mut self, request: PositionRequest) {
        self.push(format!("position {}", request.frame.index()));
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One recorded lifecycle event, with borrowed names taken over.
#[derive(Clone, Debug, PartialEq)]
pub enum NavEvent {
    /// A navigation request was accepted.
    Before {
        /// Layer the transition runs on.
        layer: LayerId,
        /// Resolved target name; `None` for a transition to no frame.
        target: Option<String>,
        /// Generation of the transition.
        generation: u64,
    },
    /// The layer switched to the target frame.
    Started {
        /// Layer the transition runs on.
        layer: LayerId,
        /// Name of the frame now shown; `None` when the layer emptied.
        frame: Option<String>,
        /// Generation of the transition.
        generation: u64,
    },
    /// All gate parties finished preparing.
    Prepared {
        /// Layer the transition runs on.
        layer: LayerId,
        /// Generation of the transition.
        generation: u64,
    },
    /// The transition's animation completed.
    Finished {
        /// Layer the transition ran on.
        layer: LayerId,
        /// Name of the frame settled on; `None` when the layer emptied.
        frame: Option<String>,
        /// Generation of the transition.
        generation: u64,
    },
    /// A frame joined a layer.
    ChildAdded {
        /// Layer that gained the frame.
        layer: LayerId,
        /// The frame that joined.
        frame: FrameId,
        /// The frame's navigation name.
        name: String,
    },
    /// A frame left a layer.
    ChildRemoved {
        /// Layer that lost the frame.
        layer: LayerId,
        /// The frame that left.
        frame: FrameId,
        /// The frame's navigation name.
        name: String,
    },
}

/// An [`EventSink`] that collects [`NavEvent`] values behind a shared handle.
///
/// Clone it, hand one clone to [`Navigator::with_sink`], and read events from
/// the other.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<NavEvent>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<NavEvent> {
        self.events.borrow().clone()
    }

    /// Discards all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, event: NavEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl EventSink for RecordingSink {
    fn on_before_transition(&mut self, e: &BeforeTransitionEvent<'_>) {
        self.push(NavEvent::Before {
            layer: e.layer,
            target: e.target.map(String::from),
            generation: e.generation,
        });
    }

    fn on_transition_started(&mut self, e: &TransitionStartedEvent<'_>) {
        self.push(NavEvent::Started {
            layer: e.layer,
            frame: e.frame.map(String::from),
            generation: e.generation,
        });
    }

    fn on_transition_prepared(&mut self, e: &TransitionPreparedEvent) {
        self.push(NavEvent::Prepared {
            layer: e.layer,
            generation: e.generation,
        });
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
        self.push(NavEvent::Finished {
            layer: e.layer,
            frame: e.frame.map(String::from),
            generation: e.generation,
        });
    }

    fn on_child_added(&mut self, e: &ChildAddedEvent<'_>) {
        self.push(NavEvent::ChildAdded {
            layer: e.layer,
            frame: e.frame,
            name: String::from(e.name),
        });
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent<'_>) {
        self.push(NavEvent::ChildRemoved {
            layer: e.layer,
            frame: e.frame,
            name: String::from(e.name),
        });
    }
}

// ---------------------------------------------------------------------------
// StepClock
// ---------------------------------------------------------------------------

/// A manual clock that advances only when told to.
///
/// The engine never reads time on its own, so demos and tests pass
/// `clock.now()` (or the value returned by [`tick`](Self::tick)) into every
/// navigator call.
#[derive(Clone, Copy, Debug)]
pub struct StepClock {
    now: Timestamp,
    step: Span,
}

impl StepClock {
    /// Creates a clock at the epoch advancing by `step` per tick.
    #[must_use]
    pub const fn new(step: Span) -> Self {
        Self {
            now: Timestamp::ZERO,
            step,
        }
    }

    /// The current time.
    #[must_use]
    pub const fn now(&self) -> Timestamp {
        self.now
    }

    /// Advances by one step and returns the new time.
    pub fn tick(&mut self) -> Timestamp {
        self.advance(self.step)
    }

    /// Advances by an arbitrary span and returns the new time.
    pub fn advance(&mut self, span: Span) -> Timestamp {
        self.now = self.now.saturating_add(span);
        self.now
    }
}

impl Default for StepClock {
    /// A clock stepping in 16ms surface frames.
    fn default() -> Self {
        Self::new(Span::from_millis(16))
    }
}

// ---------------------------------------------------------------------------
// Deck builder
// ---------------------------------------------------------------------------

/// Handles produced by [`single_layer_deck`].
#[derive(Clone, Debug)]
pub struct Deck {
    /// The stage hosting the deck.
    pub stage: StageId,
    /// The single layer all frames live on.
    pub layer: LayerId,
    /// Frames in insertion order, matching the names passed in.
    pub frames: Vec<FrameId>,
}

/// Builds a stage with one layer holding `names.len()` equally sized frames.
///
/// The layer starts empty; show
/// [`default_target`](Navigator::default_target) to populate it.
///
/// # Errors
///
/// Returns an error when the layer cannot be added, which does not happen
/// for a freshly created stage.
pub fn single_layer_deck(
    nav: &mut Navigator,
    stage_size: Size,
    frame_size: Size,
    names: &[&str],
    config: LayerConfig,
    layout: Box<dyn Layout>,
) -> Result<Deck, NavigationError> {
    let stage = nav.add_stage(stage_size);
    let layer = nav.add_layer(Host::Stage(stage), config, layout)?;
    let mut frames = Vec::with_capacity(names.len());
    for &name in names {
        frames.push(nav.add_frame(layer, FrameConfig::new(name), frame_size));
    }
    Ok(Deck {
        stage,
        layer,
        frames,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use strata_core::config::TransitionRequest;

    fn deck_rig(layout: RecordingLayout) -> (Navigator, RecordingSink, LayoutLog, Deck) {
        let sink = RecordingSink::new();
        let mut nav = Navigator::with_sink(Box::new(sink.clone()));
        let log = layout.log();
        let deck = single_layer_deck(
            &mut nav,
            Size::new(800.0, 600.0),
            Size::new(800.0, 600.0),
            &["a", "b", "c"],
            LayerConfig::default(),
            Box::new(layout),
        )
        .unwrap();
        (nav, sink, log, deck)
    }

    #[test]
    fn deck_builder_populates_a_layer() {
        let (mut nav, sink, log, deck) = deck_rig(RecordingLayout::new());
        assert_eq!(deck.frames.len(), 3);

        let target = nav.default_target(deck.layer).unwrap();
        nav.show_frame(deck.layer, target, TransitionRequest::default(), Timestamp::ZERO)
            .unwrap();

        assert_eq!(nav.current_frame_name(deck.layer), Some("a"));
        let calls = log.calls();
        assert!(calls.contains(&String::from("load 0")), "got: {calls:?}");
        assert!(calls.contains(&String::from("show 0")), "got: {calls:?}");

        let events = sink.events();
        assert_eq!(events.len(), 6, "got: {events:?}");
        assert!(matches!(&events[0], NavEvent::ChildAdded { name, .. } if name == "a"));
        assert!(
            matches!(&events[3], NavEvent::Before { target: Some(t), .. } if t == "a"),
            "got: {events:?}"
        );
        assert!(matches!(&events[5], NavEvent::Finished { frame: Some(f), .. } if f == "a"));
    }

    #[test]
    fn recording_layout_defers_until_completed() {
        let layout = RecordingLayout {
            async_transition: true,
            ..RecordingLayout::new()
        };
        let (mut nav, sink, log, deck) = deck_rig(layout);
        let mut clock = StepClock::default();

        nav.show_frame(
            deck.layer,
            "a".into(),
            TransitionRequest::default(),
            clock.now(),
        )
        .unwrap();
        sink.clear();

        nav.transition_to(
            deck.layer,
            "b".into(),
            TransitionRequest::default(),
            clock.tick(),
        )
        .unwrap();
        assert!(nav.in_transition(deck.layer));
        let tickets = log.take_tickets();
        assert_eq!(tickets.len(), 1, "the animation is parked");

        let done = clock.advance(Span::from_millis(300));
        nav.complete(tickets[0], done);
        nav.on_frame(clock.tick());
        assert!(!nav.in_transition(deck.layer));

        let events = sink.events();
        assert!(
            matches!(events.last(), Some(NavEvent::Finished { frame: Some(f), .. }) if f == "b"),
            "got: {events:?}"
        );
    }

    #[test]
    fn instant_layout_drives_a_navigator() {
        let mut nav = Navigator::new();
        let deck = single_layer_deck(
            &mut nav,
            Size::new(800.0, 600.0),
            Size::new(800.0, 600.0),
            &["a", "b"],
            LayerConfig::default(),
            Box::new(InstantLayout),
        )
        .unwrap();
        nav.transition_to(
            deck.layer,
            "b".into(),
            TransitionRequest::default(),
            Timestamp::ZERO,
        )
        .unwrap();
        assert_eq!(nav.current_frame_name(deck.layer), Some("b"));
    }

    #[test]
    fn step_clock_advances_deterministically() {
        let mut clock = StepClock::new(Span::from_millis(10));
        assert_eq!(clock.now(), Timestamp::ZERO);
        assert_eq!(clock.tick(), Timestamp::from_millis(10));
        assert_eq!(clock.advance(Span::from_millis(5)), Timestamp::from_millis(15));
        assert_eq!(clock.now(), Timestamp::from_millis(15));
    }
}

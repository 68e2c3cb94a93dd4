// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition gates and completion handles.
//!
//! A [`TransitionGate`] lets several same-tick navigation requests share one
//! animation start. Each participating request registers a party up front;
//! the gate releases once every non-skipped party has finished preparing
//! (loading and measuring its target frame). Requests that reach the gate
//! early park until the release.
//!
//! A [`TransitionHandle`] is the completion signal returned from
//! [`show_frame`](crate::nav::Navigator::show_frame) and
//! [`transition_to`](crate::nav::Navigator::transition_to). It resolves at
//! most once, when the transition it belongs to finishes. A superseded
//! transition's handle is **never** resolved; supersession is a state, not
//! an error, and callers that need to observe it should watch for the next
//! [`TransitionFinishedEvent`](crate::events::TransitionFinishedEvent)
//! instead.
//!
//! Both types are single-threaded shared handles (`Rc`), matching the
//! engine's cooperative model.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

// --------------------------------------------------------------------------
// Gate
// --------------------------------------------------------------------------

struct GateInner {
    /// Parties that announced participation via [`TransitionGate::register`].
    registered: usize,
    /// Parties that finished preparation.
    arrived: usize,
    /// Parties that withdrew (deferred by a delay or deduplicated away).
    skipped: usize,
    released: bool,
    /// Serials of pending operations parked at this gate.
    waiters: Vec<u64>,
}

impl GateInner {
    fn complete(&self) -> bool {
        self.arrived + self.skipped >= self.registered
    }
}

/// Outcome of a party arriving at a gate.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GateOutcome {
    /// The gate released. The caller proceeds immediately and must then
    /// resume the returned parked serials, in order.
    Released(Vec<u64>),
    /// Other parties are still preparing. The caller parks under its serial
    /// and is resumed when the gate releases.
    Parked,
}

/// A shared gate that synchronizes the animation start of several
/// navigation requests.
///
/// Clones share state. Register every party **before** issuing the requests
/// that carry the gate; registering after a release has no effect on the
/// already-released gate.
#[derive(Clone)]
pub struct TransitionGate {
    inner: Rc<RefCell<GateInner>>,
}

impl TransitionGate {
    /// Creates a gate with no registered parties.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(GateInner {
                registered: 0,
                arrived: 0,
                skipped: 0,
                released: false,
                waiters: Vec::new(),
            })),
        }
    }

    /// Announces one participating party.
    pub fn register(&self) {
        self.inner.borrow_mut().registered += 1;
    }

    /// Returns `true` once the gate has released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.borrow().released
    }

    /// Withdraws one party without preparation, releasing the gate if it was
    /// the last outstanding one. Returns the parked serials to resume.
    pub(crate) fn skip_one(&self) -> Vec<u64> {
        let mut inner = self.inner.borrow_mut();
        inner.skipped += 1;
        if !inner.released && inner.complete() {
            inner.released = true;
            return core::mem::take(&mut inner.waiters);
        }
        Vec::new()
    }

    /// Records that the party identified by `serial` finished preparation.
    pub(crate) fn arrive(&self, serial: u64) -> GateOutcome {
        let mut inner = self.inner.borrow_mut();
        if inner.released {
            return GateOutcome::Released(Vec::new());
        }
        inner.arrived += 1;
        if inner.complete() {
            inner.released = true;
            GateOutcome::Released(core::mem::take(&mut inner.waiters))
        } else {
            inner.waiters.push(serial);
            GateOutcome::Parked
        }
    }
}

impl Default for TransitionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransitionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        write!(
            f,
            "TransitionGate({}/{} arrived, {} skipped{})",
            inner.arrived,
            inner.registered,
            inner.skipped,
            if inner.released { ", released" } else { "" }
        )
    }
}

// --------------------------------------------------------------------------
// Handle
// --------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Completion {
    Pending,
    Done,
}

/// Completion signal for a single navigation request.
///
/// Clones observe the same state. The handle resolves exactly once, when its
/// transition finishes; if the transition is superseded before finishing,
/// the handle stays pending forever.
#[derive(Clone)]
pub struct TransitionHandle {
    state: Rc<Cell<Completion>>,
}

impl TransitionHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(Cell::new(Completion::Pending)),
        }
    }

    /// Returns `true` once the transition this handle belongs to finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state.get() == Completion::Done
    }

    pub(crate) fn resolve(&self) {
        self.state.set(Completion::Done);
    }
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransitionHandle({})",
            if self.is_done() { "done" } else { "pending" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_when_all_parties_arrive() {
        let gate = TransitionGate::new();
        gate.register();
        gate.register();

        assert_eq!(gate.arrive(1), GateOutcome::Parked);
        assert!(!gate.is_released());

        match gate.arrive(2) {
            GateOutcome::Released(waiters) => {
                assert_eq!(waiters, alloc::vec![1], "first party was parked");
            }
            GateOutcome::Parked => panic!("second arrival must release"),
        }
        assert!(gate.is_released());
    }

    #[test]
    fn skip_counts_toward_release() {
        let gate = TransitionGate::new();
        gate.register();
        gate.register();

        assert_eq!(gate.arrive(7), GateOutcome::Parked);
        let waiters = gate.skip_one();
        assert_eq!(waiters, alloc::vec![7], "skip released the parked party");
        assert!(gate.is_released());
    }

    #[test]
    fn arrival_after_release_passes_through() {
        let gate = TransitionGate::new();
        gate.register();
        assert_eq!(gate.arrive(1), GateOutcome::Released(Vec::new()));
        assert_eq!(
            gate.arrive(2),
            GateOutcome::Released(Vec::new()),
            "late party is not parked"
        );
    }

    #[test]
    fn unregistered_gate_releases_on_first_arrival() {
        let gate = TransitionGate::new();
        assert_eq!(gate.arrive(1), GateOutcome::Released(Vec::new()));
    }

    #[test]
    fn handle_resolves_across_clones() {
        let handle = TransitionHandle::new();
        let observer = handle.clone();
        assert!(!observer.is_done());
        handle.resolve();
        assert!(observer.is_done());
    }
}

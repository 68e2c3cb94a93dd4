// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accepting, preparing, committing, and finishing navigations.
//!
//! Both entry points funnel into [`Navigator::navigate`], which runs the
//! pipeline up to the first suspension point:
//!
//! 1. **Accept**: resolve the target, allocate a generation, emit the
//!    before event, arm the animation window and its watchdog.
//! 2. **Prepare**: load the target frame through the layout, then arrive at
//!    the request's gate.
//! 3. **Commit**: flip the layer's logical state to the target, emit the
//!    started event (and the prepared event for animated runs), and hand
//!    the layout the endpoint placement.
//! 4. **Finish**: at the paint boundary after the animation settled, emit
//!    the finished event and resolve the handle.
//!
//! Every suspension parks a [`TransitionPlan`] in the pending table keyed by
//! a fresh serial; every resumption re-checks the layer's active generation,
//! so superseded work drops out without touching state.

use alloc::string::String;

use kurbo::{Affine, Vec2};

use crate::config::{
    DEFAULT_DURATION, DEFAULT_KIND, TransitionKind, TransitionRequest, WATCHDOG_MARGIN,
};
use crate::error::NavigationError;
use crate::events::{
    BeforeTransitionEvent, ChildAddedEvent, ChildRemovedEvent, TransitionFinishedEvent,
    TransitionPreparedEvent, TransitionStartedEvent,
};
use crate::gate::{GateOutcome, TransitionHandle};
use crate::gesture::GestureDirection;
use crate::geometry::TransformData;
use crate::layout::{
    FramePlacement, LayoutPoll, LayoutTicket, LoadRequest, PositionRequest, SurfaceTransform,
    TransitionPlacement,
};
use crate::resolver::{self, FrameTarget};
use crate::time::{Span, Timestamp};
use crate::tree::{FrameId, LayerId};

use super::{
    ActiveWindow, AnimationOwner, BoundaryTask, DelayedRequest, FinishPlan, Navigator, PendingOp,
    TransitionPlan, Watchdog, frame_data, next_serial, placeholder_data, runtime_entry,
    runtime_ref,
};

impl Navigator {
    /// Shows `target` on `layer` without an animation.
    ///
    /// The layer's state flips as soon as the target frame is loaded and the
    /// request's gate (if any) has released. The finished event and the
    /// returned handle still settle at the paint boundary when the layout
    /// loads asynchronously, so callers observe the same lifecycle as for
    /// animated transitions.
    ///
    /// # Errors
    ///
    /// Fails without any state change when the target does not resolve to a
    /// frame of the scene.
    pub fn show_frame(
        &mut self,
        layer: LayerId,
        target: FrameTarget,
        request: TransitionRequest,
        now: Timestamp,
    ) -> Result<TransitionHandle, NavigationError> {
        self.navigate(layer, target, request, now, None, false)
    }

    /// Animates `layer` from its current frame to `target`.
    ///
    /// The logical state flips at commit time, before the animation has
    /// played out; [`Navigator::in_transition`] stays `true` until the
    /// animation window closes. A newer request for the layer supersedes an
    /// in-flight one, whose handle then never settles.
    ///
    /// # Errors
    ///
    /// Fails without any state change when the target does not resolve to a
    /// frame of the scene.
    pub fn transition_to(
        &mut self,
        layer: LayerId,
        target: FrameTarget,
        request: TransitionRequest,
        now: Timestamp,
    ) -> Result<TransitionHandle, NavigationError> {
        self.navigate(layer, target, request, now, None, true)
    }

    pub(super) fn navigate(
        &mut self,
        layer: LayerId,
        target: FrameTarget,
        mut request: TransitionRequest,
        now: Timestamp,
        carried: Option<TransitionHandle>,
        animate: bool,
    ) -> Result<TransitionHandle, NavigationError> {
        let handle = carried.unwrap_or_else(TransitionHandle::new);

        if !request.delay.is_zero() {
            let due = now.saturating_add(request.delay);
            request.delay = Span::ZERO;
            // A delayed request must not hold its gate open for an unbounded
            // wait; it leaves the gate before parking.
            let waiters = request.gate.take().map(|gate| gate.skip_one());
            let group = request.group_id.clone();
            {
                let runtime = runtime_entry(&mut self.runtimes, layer);
                runtime.latest_group = group.clone();
                // A newer delayed request replaces an older one on the same
                // layer; the replaced handle never settles.
                runtime.delayed = Some(DelayedRequest {
                    due,
                    group,
                    target,
                    request,
                    handle: handle.clone(),
                    animate,
                });
            }
            for serial in waiters.into_iter().flatten() {
                self.run_pending(serial, now);
            }
            return Ok(handle);
        }

        let requested = request.kind.as_deref().map(TransitionKind::parse);
        let hint = requested
            .as_ref()
            .and_then(|kind| GestureDirection::from_transition_kind(&kind.base));
        let current = runtime_ref(&self.runtimes, layer).current;
        let resolved = resolver::resolve(&self.tree, layer, current, &target, hint)?;

        {
            let runtime = runtime_ref(&self.runtimes, layer);
            if resolved == runtime.current
                && (runtime.window.is_some() || runtime.preparing.is_some())
            {
                // Re-entrant request for the frame that is already current:
                // complete immediately without disturbing the in-flight run.
                return Ok(self.complete_inert(request, handle, now));
            }
        }

        if !animate && resolved == current {
            let runtime = runtime_ref(&self.runtimes, layer);
            if runtime.window.is_none() && runtime.preparing.is_none() {
                let data = match resolved {
                    Some(frame) => frame_data(&self.tree, layer, frame, request.start_position),
                    None => {
                        let viewport = self.tree.viewport_of(layer);
                        let start = request
                            .start_position
                            .or_else(|| {
                                runtime.current_data.as_ref().map(|data| data.start_position)
                            })
                            .unwrap_or_default();
                        placeholder_data(runtime_entry(&mut self.runtimes, layer), viewport, start)
                    }
                };
                let runtime = runtime_ref(&self.runtimes, layer);
                let desired = data.clamp_scroll(Vec2::new(
                    request.scroll_x.unwrap_or(runtime.current_scroll.x),
                    request.scroll_y.unwrap_or(runtime.current_scroll.y),
                ));
                if runtime.current_data.as_ref() == Some(&data)
                    && (desired - runtime.current_scroll).hypot() < 1e-9
                {
                    // Showing what is already shown is a no-op.
                    return Ok(self.complete_inert(request, handle, now));
                }
            }
        }

        // The request is accepted; from here on it owns the layer.
        let remaining = self.remaining_transition_time(layer, now);
        self.next_generation += 1;
        let generation = self.next_generation;
        let target_name = resolved.map(|frame| self.tree.frame_name_owned(frame));
        self.sink.on_before_transition(&BeforeTransitionEvent {
            layer,
            target: target_name.as_deref(),
            generation,
            at: now,
        });

        let frame_default =
            resolved.and_then(|frame| self.tree.frame_config(frame).default_transition.clone());
        let layer_default = self.tree.layer_config(layer).default_transition.clone();
        let (kind, reverse) = effective_kind(requested, frame_default, layer_default);

        let requested_duration = request.duration.unwrap_or(DEFAULT_DURATION);
        // Taking over an unfinished animation stretches the new one to at
        // least the remaining time, so the surface never snaps.
        let duration = remaining.map_or(requested_duration, |rest| requested_duration.max(rest));

        let (from, from_data, previous_kind, previous_reverse) = {
            let runtime = runtime_entry(&mut self.runtimes, layer);
            runtime.active_generation = generation;
            runtime.scroll_serial += 1;
            runtime.latest_group = request.group_id.clone();
            runtime.timer_due = None;
            runtime.preparing = Some(generation);
            runtime.window = animate.then_some(ActiveWindow {
                since: now,
                duration: requested_duration,
                owner: AnimationOwner::Transition(generation),
            });
            runtime.watchdogs.push(Watchdog {
                due: now
                    .saturating_add(requested_duration)
                    .saturating_add(WATCHDOG_MARGIN),
                owner: AnimationOwner::Transition(generation),
            });
            (
                runtime.current,
                runtime.current_data.clone(),
                runtime.previous_kind.clone(),
                runtime.previous_reverse,
            )
        };
        // Superseded work parked for this layer can never commit now that
        // the generation moved on; drop it eagerly.
        self.pending.retain(|_, op| op.layer() != layer);

        let plan = TransitionPlan {
            layer,
            generation,
            target: resolved,
            target_name,
            kind,
            reverse,
            duration,
            scroll_x: request.scroll_x,
            scroll_y: request.scroll_y,
            start_position: request.start_position,
            gate: request.gate.unwrap_or_default(),
            handle: handle.clone(),
            animate,
            from,
            from_data,
            previous_kind,
            previous_reverse,
        };

        match resolved {
            Some(frame) if self.tree.layer_of(frame) != layer => self.adopt_frame(frame, plan),
            Some(frame) => {
                let serial = next_serial(&mut self.next_serial);
                let ticket = LayoutTicket { layer, serial };
                let poll = runtime_entry(&mut self.runtimes, layer)
                    .layout
                    .load_frame(LoadRequest { layer, frame, ticket });
                match poll {
                    LayoutPoll::Ready => self.continue_after_load(plan, now, true),
                    LayoutPoll::Pending => {
                        let _ = self.pending.insert(serial, PendingOp::Load(plan));
                    }
                }
            }
            None => self.continue_after_load(plan, now, true),
        }
        Ok(handle)
    }

    /// Settles a request that needs no state change: the gate is skipped so
    /// the other parties are not held up, and the handle resolves at once.
    fn complete_inert(
        &mut self,
        request: TransitionRequest,
        handle: TransitionHandle,
        now: Timestamp,
    ) -> TransitionHandle {
        if let Some(gate) = request.gate {
            for serial in gate.skip_one() {
                self.run_pending(serial, now);
            }
        }
        handle.resolve();
        handle
    }

    /// Re-parents `frame` into the plan's layer, keeping it visually in
    /// place, then runs the plan's load through the destination layout.
    fn adopt_frame(&mut self, frame: FrameId, plan: TransitionPlan) {
        let source = self.tree.layer_of(frame);
        let dest = plan.layer;
        // Stage-space placement of the frame today versus the destination
        // surface; the difference keeps the frame visually where it was.
        let frame_space = self.layer_space(source) * self.tree.frame_placement(frame);
        let compensation = self.layer_space(dest).inverse() * frame_space;
        let name = self.tree.frame_name_owned(frame);

        if runtime_ref(&self.runtimes, source).current == Some(frame) {
            let runtime = runtime_entry(&mut self.runtimes, source);
            runtime.current = None;
            runtime.current_data = None;
            runtime.current_transform = Affine::IDENTITY;
            runtime.current_scroll = Vec2::ZERO;
            runtime.window = None;
            runtime.preparing = None;
            self.tree.set_frame_active(frame, false);
            self.purge_layer(source);
        }
        // In-flight plans of other layers must not commit a frame that is
        // moving away.
        self.purge_targets(&[frame]);
        self.sink.on_child_removed(&ChildRemovedEvent {
            layer: source,
            frame,
            name: &name,
        });
        self.tree.move_frame(frame, dest, None);
        // The move invalidated cached geometry under the frame.
        let _ = self.tree.drain_stale();
        self.tree.set_frame_placement(frame, compensation);
        self.sink.on_child_added(&ChildAddedEvent {
            layer: dest,
            frame,
            name: &name,
        });

        let serial = next_serial(&mut self.next_serial);
        let ticket = LayoutTicket { layer: dest, serial };
        let poll = {
            let runtime = runtime_entry(&mut self.runtimes, dest);
            runtime.layout.position_frame(PositionRequest {
                layer: dest,
                frame,
                placement: compensation,
            });
            runtime.layout.load_frame(LoadRequest {
                layer: dest,
                frame,
                ticket,
            })
        };
        let _ = self.pending.insert(serial, PendingOp::Load(plan));
        if matches!(poll, LayoutPoll::Ready) {
            // Even a synchronous load commits only once the embedder has
            // painted the re-parented frame.
            self.boundary.push(BoundaryTask::Complete(serial));
        }
    }

    /// The plan's target frame is loaded; arrive at the gate.
    pub(super) fn continue_after_load(
        &mut self,
        plan: TransitionPlan,
        now: Timestamp,
        inline: bool,
    ) {
        if let Some(frame) = plan.target {
            // The content is in the render tree now even if a newer request
            // superseded this plan while the load was out.
            self.tree.set_frame_attached(frame);
        }
        if runtime_ref(&self.runtimes, plan.layer).active_generation != plan.generation {
            return;
        }
        let serial = next_serial(&mut self.next_serial);
        match plan.gate.arrive(serial) {
            GateOutcome::Released(waiters) => {
                self.resume_prepared(plan, now, inline);
                for waiter in waiters {
                    self.run_pending(waiter, now);
                }
            }
            GateOutcome::Parked => {
                let _ = self.pending.insert(serial, PendingOp::GateWait(plan));
            }
        }
    }

    /// Gate released: commit the layer's state and start the animation, or
    /// show directly for non-animated runs.
    pub(super) fn resume_prepared(&mut self, plan: TransitionPlan, now: Timestamp, inline: bool) {
        let layer = plan.layer;
        if runtime_ref(&self.runtimes, layer).active_generation != plan.generation {
            return;
        }

        let to_data = match plan.target {
            Some(frame) => frame_data(&self.tree, layer, frame, plan.start_position),
            None => {
                let viewport = self.tree.viewport_of(layer);
                let runtime = runtime_entry(&mut self.runtimes, layer);
                let start = plan
                    .start_position
                    .or_else(|| runtime.current_data.as_ref().map(|data| data.start_position))
                    .unwrap_or_default();
                placeholder_data(runtime, viewport, start)
            }
        };

        if plan.animate && plan.target == plan.from && plan.from_data.as_ref() == Some(&to_data) {
            // Animated run onto the frame already current, with unchanged
            // geometry: skip the animation and settle at the boundary.
            self.reconcile_and_finish(plan, &to_data, now);
            return;
        }

        let settled = {
            let runtime = runtime_entry(&mut self.runtimes, layer);
            let scroll = to_data.clamp_scroll(Vec2::new(
                plan.scroll_x.unwrap_or(to_data.initial_scroll.x),
                plan.scroll_y.unwrap_or(to_data.initial_scroll.y),
            ));
            let settled = runtime.transformer.compose(&to_data, scroll, false);
            runtime.current = plan.target;
            runtime.current_data = Some(to_data.clone());
            runtime.current_transform = settled.transform;
            runtime.current_scroll = scroll;
            runtime.previous_kind = Some(plan.kind.clone());
            runtime.previous_reverse = plan.reverse;
            if runtime.preparing == Some(plan.generation) {
                runtime.preparing = None;
            }
            settled
        };
        if let Some(old) = plan.from {
            if self.tree.is_frame_alive(old) {
                self.tree.set_frame_active(old, false);
            }
        }
        if let Some(frame) = plan.target {
            self.tree.set_frame_active(frame, true);
            self.tree.set_transform_data(frame, to_data.clone());
        }
        self.sink.on_transition_started(&TransitionStartedEvent {
            layer,
            frame: plan.target_name.as_deref(),
            generation: plan.generation,
            at: now,
        });

        if !plan.animate {
            runtime_entry(&mut self.runtimes, layer)
                .layout
                .show_frame(FramePlacement {
                    layer,
                    frame: plan.target,
                    data: to_data,
                    transform: settled.transform,
                    native_scroll: settled.native_scroll,
                });
            if inline {
                self.sink.on_transition_finished(&TransitionFinishedEvent {
                    layer,
                    frame: plan.target_name.as_deref(),
                    generation: plan.generation,
                    at: now,
                });
                plan.handle.resolve();
                self.after_finish(layer, now);
            } else {
                self.boundary.push(BoundaryTask::Finish {
                    layer,
                    generation: plan.generation,
                    name: plan.target_name,
                    handle: plan.handle,
                });
            }
            return;
        }

        self.sink.on_transition_prepared(&TransitionPreparedEvent {
            layer,
            generation: plan.generation,
            at: now,
        });
        let serial = next_serial(&mut self.next_serial);
        let ticket = LayoutTicket { layer, serial };
        let poll = runtime_entry(&mut self.runtimes, layer)
            .layout
            .begin_transition(TransitionPlacement {
                layer,
                from: plan.from,
                to: plan.target,
                kind: plan.kind,
                reverse: plan.reverse,
                previous_kind: plan.previous_kind,
                previous_reverse: plan.previous_reverse,
                duration: plan.duration,
                from_data: plan.from_data,
                to_data,
                to_transform: settled.transform,
                to_native_scroll: settled.native_scroll,
                ticket,
            });
        let finish = FinishPlan {
            layer,
            generation: plan.generation,
            name: plan.target_name,
            handle: plan.handle,
        };
        match poll {
            LayoutPoll::Ready => self.finalize_transition(finish),
            LayoutPoll::Pending => {
                let _ = self.pending.insert(serial, PendingOp::Animate(finish));
            }
        }
    }

    /// Degenerate animated run: the target is already in place. Only an
    /// explicit scroll in the request still moves the surface.
    fn reconcile_and_finish(&mut self, plan: TransitionPlan, data: &TransformData, now: Timestamp) {
        let layer = plan.layer;
        {
            let runtime = runtime_entry(&mut self.runtimes, layer);
            let desired = data.clamp_scroll(Vec2::new(
                plan.scroll_x.unwrap_or(runtime.current_scroll.x),
                plan.scroll_y.unwrap_or(runtime.current_scroll.y),
            ));
            if (desired - runtime.current_scroll).hypot() > 1e-9 {
                let settled = runtime.transformer.compose(data, desired, false);
                runtime.current_scroll = desired;
                runtime.current_transform = settled.transform;
                let _ = runtime.layout.set_surface_transform(SurfaceTransform {
                    layer,
                    transform: settled.transform,
                    native_scroll: settled.native_scroll,
                    duration: plan.duration,
                    ticket: None,
                });
            }
            if runtime.preparing == Some(plan.generation) {
                runtime.preparing = None;
            }
        }
        self.sink.on_transition_started(&TransitionStartedEvent {
            layer,
            frame: plan.target_name.as_deref(),
            generation: plan.generation,
            at: now,
        });
        self.boundary.push(BoundaryTask::Finish {
            layer,
            generation: plan.generation,
            name: plan.target_name,
            handle: plan.handle,
        });
    }

    /// The layout reported the animation settled; snap the surface to the
    /// endpoint and queue the finish for the next paint boundary.
    pub(super) fn finalize_transition(&mut self, finish: FinishPlan) {
        let Some(runtime) = self.runtimes.get_mut(&finish.layer) else {
            return;
        };
        if runtime.active_generation != finish.generation {
            return;
        }
        if let Some(data) = runtime.current_data.clone() {
            let settled = runtime
                .transformer
                .compose(&data, runtime.current_scroll, false);
            runtime.current_transform = settled.transform;
            let _ = runtime.layout.set_surface_transform(SurfaceTransform {
                layer: finish.layer,
                transform: settled.transform,
                native_scroll: settled.native_scroll,
                duration: Span::ZERO,
                ticket: None,
            });
        }
        self.boundary.push(BoundaryTask::Finish {
            layer: finish.layer,
            generation: finish.generation,
            name: finish.name,
            handle: finish.handle,
        });
    }
}

/// Picks the transition kind and reverse flag for a request.
///
/// Priority: an explicit non-`auto:` kind in the request, then the target
/// frame's configured default, then the layer's, then the request's `auto:`
/// suggestion, then [`DEFAULT_KIND`]. `reverse:`/`r:` prefixes accumulate
/// from every consulted source up to the one that supplies the base.
fn effective_kind(
    requested: Option<TransitionKind>,
    frame_default: Option<String>,
    layer_default: Option<String>,
) -> (String, bool) {
    let mut reverse = false;
    let mut suggestion = None;
    if let Some(kind) = requested {
        reverse |= kind.reverse;
        if !kind.base.is_empty() {
            if kind.auto {
                suggestion = Some(kind.base);
            } else {
                return (kind.base, reverse);
            }
        }
    }
    for configured in [frame_default, layer_default].into_iter().flatten() {
        let kind = TransitionKind::parse(&configured);
        if !kind.base.is_empty() {
            return (kind.base, reverse || kind.reverse);
        }
        reverse |= kind.reverse;
    }
    if let Some(base) = suggestion {
        return (base, reverse);
    }
    (String::from(DEFAULT_KIND), reverse)
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::effective_kind;
    use crate::config::TransitionKind;

    fn kind(spec: &str) -> Option<TransitionKind> {
        Some(TransitionKind::parse(spec))
    }

    fn owned(name: &str) -> Option<String> {
        Some(String::from(name))
    }

    #[test]
    fn explicit_kind_wins_over_configured_defaults() {
        let picked = effective_kind(kind("fade"), owned("slide"), owned("zoom"));
        assert_eq!(picked, (String::from("fade"), false), "got: {picked:?}");
    }

    #[test]
    fn frame_default_beats_layer_default() {
        let picked = effective_kind(None, owned("slide"), owned("zoom"));
        assert_eq!(picked, (String::from("slide"), false), "got: {picked:?}");
    }

    #[test]
    fn auto_prefix_defers_to_configured_defaults() {
        let picked = effective_kind(kind("auto:fade"), owned("slide"), None);
        assert_eq!(picked, (String::from("slide"), false), "got: {picked:?}");
    }

    #[test]
    fn auto_suggestion_applies_when_nothing_is_configured() {
        let picked = effective_kind(kind("auto:fade"), None, None);
        assert_eq!(picked, (String::from("fade"), false), "got: {picked:?}");
    }

    #[test]
    fn everything_empty_falls_back_to_the_default_kind() {
        let picked = effective_kind(None, None, None);
        assert_eq!(picked, (String::from("default"), false), "got: {picked:?}");
    }

    #[test]
    fn bare_reverse_prefix_carries_into_the_configured_kind() {
        let picked = effective_kind(kind("r:"), owned("slide"), None);
        assert_eq!(picked, (String::from("slide"), true), "got: {picked:?}");
    }

    #[test]
    fn reverse_prefixes_accumulate_rather_than_cancel() {
        let picked = effective_kind(kind("reverse:fade"), owned("r:slide"), None);
        assert_eq!(picked, (String::from("fade"), true), "got: {picked:?}");
    }
}

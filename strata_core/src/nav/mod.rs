// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame navigation engine.
//!
//! A [`Navigator`] owns the [`SceneTree`] and drives what every layer
//! shows. Each layer moves through `Idle`, `Preparing` (target frame
//! loading) and `Transitioning` (animation running) and back, with all
//! asynchronous steps expressed through tickets and the frame pump rather
//! than futures.
//!
//! # Generations and supersession
//!
//! Every accepted navigation allocates a monotonically increasing
//! *generation*. The newest generation is authoritative: work resuming at
//! any suspension point (frame load, gate release, animation completion,
//! paint boundary) first checks that its generation is still the layer's
//! active one and otherwise discards its effects. A superseded request is
//! not an error; its [`TransitionHandle`] is intentionally never resolved.
//! Callers that trigger a newer navigation themselves must not wait on the
//! older handle.
//!
//! # The frame pump
//!
//! The engine never schedules timers of its own. The embedder calls
//! [`Navigator::on_frame`] once per surface frame, after painting; that
//! call delivers paint-boundary notifications, expires watchdogs, fires
//! delayed requests, and advances auto-show timers. Asynchronous layout
//! work reports back through [`Navigator::complete`].
//!
//! Everything runs on one cooperative timeline. Event sinks and layouts
//! must not call back into the navigator from within a callback; they
//! record what they saw and act after the call returns.

#[cfg(test)]
mod fixtures;
mod scrolling;
mod transition;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::{fmt, mem};

use kurbo::{Affine, Size, Vec2};

use crate::config::{FrameConfig, LayerConfig, StartPosition, TransitionRequest};
use crate::error::NavigationError;
use crate::events::{
    ChildAddedEvent, ChildRemovedEvent, EventSink, NoopSink, TransitionFinishedEvent,
};
use crate::gate::{TransitionGate, TransitionHandle};
use crate::geometry::TransformData;
use crate::layout::{FramePlacement, Layout, LayoutTicket};
use crate::resolver::FrameTarget;
use crate::scroll::{DefaultScrollTransformer, ScrollTransformer};
use crate::time::{Span, Timestamp};
use crate::tree::{FrameId, Host, LayerId, SceneTree, StageId};

// ---------------------------------------------------------------------------
// Per-layer runtime state
// ---------------------------------------------------------------------------

/// The animation currently holding a layer, transition or scroll.
#[derive(Clone, Copy, Debug)]
struct ActiveWindow {
    since: Timestamp,
    duration: Span,
    owner: AnimationOwner,
}

/// Identifies which animation armed a window or watchdog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnimationOwner {
    Transition(u64),
    Scroll(u64),
}

/// Force-clears stuck state if an animation never reports completion.
#[derive(Clone, Copy, Debug)]
struct Watchdog {
    due: Timestamp,
    owner: AnimationOwner,
}

/// A deferred navigation waiting for its delay to elapse.
struct DelayedRequest {
    due: Timestamp,
    group: Option<String>,
    target: FrameTarget,
    request: TransitionRequest,
    handle: TransitionHandle,
    animate: bool,
}

struct LayerRuntime {
    layout: Box<dyn Layout>,
    transformer: Box<dyn ScrollTransformer>,
    current: Option<FrameId>,
    /// Geometry of the current frame, or of the no-frame placeholder.
    current_data: Option<TransformData>,
    current_transform: Affine,
    /// Scroll position in frame units.
    current_scroll: Vec2,
    /// No-frame geometry memoized per start position.
    empty_memo: [Option<TransformData>; 9],
    /// Generation of the logically latest navigation.
    active_generation: u64,
    /// Serial of the latest scroll animation.
    scroll_serial: u64,
    window: Option<ActiveWindow>,
    /// Generation whose target is still loading.
    preparing: Option<u64>,
    watchdogs: Vec<Watchdog>,
    resize_queued: bool,
    delayed: Option<DelayedRequest>,
    /// Group id of the latest request on this layer.
    latest_group: Option<String>,
    /// Auto-show deadline, armed when the layer config carries a timer.
    timer_due: Option<Timestamp>,
    /// Kind that brought the current frame in.
    previous_kind: Option<String>,
    previous_reverse: bool,
}

impl LayerRuntime {
    fn new(layout: Box<dyn Layout>, transformer: Box<dyn ScrollTransformer>) -> Self {
        Self {
            layout,
            transformer,
            current: None,
            current_data: None,
            current_transform: Affine::IDENTITY,
            current_scroll: Vec2::ZERO,
            empty_memo: core::array::from_fn(|_| None),
            active_generation: 0,
            scroll_serial: 0,
            window: None,
            preparing: None,
            watchdogs: Vec::new(),
            resize_queued: false,
            delayed: None,
            latest_group: None,
            timer_due: None,
            previous_kind: None,
            previous_reverse: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Suspended work
// ---------------------------------------------------------------------------

/// Everything a navigation needs to continue after a suspension point.
struct TransitionPlan {
    layer: LayerId,
    generation: u64,
    target: Option<FrameId>,
    target_name: Option<String>,
    kind: String,
    reverse: bool,
    duration: Span,
    scroll_x: Option<f64>,
    scroll_y: Option<f64>,
    start_position: Option<StartPosition>,
    gate: TransitionGate,
    handle: TransitionHandle,
    animate: bool,
    /// Departing frame, captured when the request was accepted.
    from: Option<FrameId>,
    from_data: Option<TransformData>,
    previous_kind: Option<String>,
    previous_reverse: bool,
}

/// What finalization needs once the animation settles.
struct FinishPlan {
    layer: LayerId,
    generation: u64,
    name: Option<String>,
    handle: TransitionHandle,
}

/// Outstanding asynchronous work, keyed by serial.
enum PendingOp {
    /// Waiting for the layout to load the target frame.
    Load(TransitionPlan),
    /// Parked at a gate until all parties prepared.
    GateWait(TransitionPlan),
    /// Waiting for the layout's transition animation.
    Animate(FinishPlan),
    /// Waiting for an animated surface transform to settle.
    ScrollSettle {
        layer: LayerId,
        serial: u64,
        handle: Option<TransitionHandle>,
    },
}

impl PendingOp {
    fn layer(&self) -> LayerId {
        match self {
            Self::Load(plan) | Self::GateWait(plan) => plan.layer,
            Self::Animate(finish) => finish.layer,
            Self::ScrollSettle { layer, .. } => *layer,
        }
    }
}

/// Work deferred to the next paint boundary.
enum BoundaryTask {
    /// Emit the finished event and resolve the handle, unless a newer
    /// navigation took over in the meantime.
    Finish {
        layer: LayerId,
        generation: u64,
        name: Option<String>,
        handle: TransitionHandle,
    },
    /// Continue the pending operation under this serial.
    Complete(u64),
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// A frame to add in a children update.
#[derive(Clone, Debug)]
pub struct FrameInsert {
    /// Configuration for the new frame.
    pub config: FrameConfig,
    /// Content size of the new frame.
    pub size: Size,
    /// Insertion position among siblings; `None` appends.
    pub index: Option<usize>,
}

/// The navigation engine: owns the scene tree and every layer's shown
/// frame, transition pipeline, and scroll state.
pub struct Navigator {
    tree: SceneTree,
    runtimes: BTreeMap<LayerId, LayerRuntime>,
    sink: Box<dyn EventSink>,
    pending: BTreeMap<u64, PendingOp>,
    boundary: Vec<BoundaryTask>,
    next_serial: u64,
    next_generation: u64,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("layers", &self.runtimes.len())
            .field("pending", &self.pending.len())
            .field("next_generation", &self.next_generation)
            .finish_non_exhaustive()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Creates a navigator that discards lifecycle events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Box::new(NoopSink))
    }

    /// Creates a navigator delivering lifecycle events to `sink`.
    #[must_use]
    pub fn with_sink(sink: Box<dyn EventSink>) -> Self {
        Self {
            tree: SceneTree::new(),
            runtimes: BTreeMap::new(),
            sink,
            pending: BTreeMap::new(),
            boundary: Vec::new(),
            next_serial: 0,
            next_generation: 0,
        }
    }

    // -- Topology API --

    /// Adds a stage with the given viewport size.
    pub fn add_stage(&mut self, size: Size) -> StageId {
        self.tree.add_stage(size)
    }

    /// Adds a layer under `host` and wires its layout strategy.
    ///
    /// The layer starts in the "no frame" state; show its
    /// [`default_target`](Self::default_target) to populate it.
    pub fn add_layer(
        &mut self,
        host: Host,
        config: LayerConfig,
        layout: Box<dyn Layout>,
    ) -> Result<LayerId, NavigationError> {
        let native = config.native_scroll_enabled();
        let layer = self.tree.add_layer(host, config)?;
        let transformer = layout
            .scroll_transformer()
            .unwrap_or_else(|| Box::new(DefaultScrollTransformer::new(native)));
        let _ = self
            .runtimes
            .insert(layer, LayerRuntime::new(layout, transformer));
        Ok(layer)
    }

    /// Appends a frame to `layer`'s children.
    pub fn add_frame(&mut self, layer: LayerId, config: FrameConfig, size: Size) -> FrameId {
        let index = self.tree.child_count(layer);
        self.insert_frame(layer, index, config, size)
    }

    /// Inserts a frame at `index` among `layer`'s children.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is stale or `index` is out of bounds.
    pub fn insert_frame(
        &mut self,
        layer: LayerId,
        index: usize,
        config: FrameConfig,
        size: Size,
    ) -> FrameId {
        let frame = self.tree.insert_frame(layer, index, config, size);
        let name = self.tree.frame_name_owned(frame);
        self.sink.on_child_added(&ChildAddedEvent {
            layer,
            frame,
            name: &name,
        });
        frame
    }

    /// Removes a frame and everything nested under it.
    ///
    /// If the frame was its layer's current one, the layer drops to the
    /// "no frame" state and any in-flight navigation on it is abandoned.
    pub fn remove_frame(&mut self, frame: FrameId) {
        let layer = self.tree.layer_of(frame);
        let name = self.tree.frame_name_owned(frame);
        let (frames, layers) = self.tree.subtree_of_frame(frame);
        for nested in &layers {
            self.purge_layer(*nested);
            let _ = self.runtimes.remove(nested);
        }
        self.detach_current(layer, &frames);
        self.purge_targets(&frames);
        self.sink.on_child_removed(&ChildRemovedEvent {
            layer,
            frame,
            name: &name,
        });
        self.tree.remove_frame(frame);
    }

    /// Removes a layer and everything nested under it.
    pub fn remove_layer(&mut self, layer: LayerId) {
        let (frames, layers) = self.tree.subtree_of_layer(layer);
        for nested in &layers {
            self.purge_layer(*nested);
            let _ = self.runtimes.remove(nested);
        }
        self.purge_targets(&frames);
        self.tree.remove_layer(layer);
    }

    /// Applies a batch of child changes. Removals always run before
    /// additions so in-flight transitions see departing frames first.
    pub fn update_children(
        &mut self,
        layer: LayerId,
        removed: Vec<FrameId>,
        added: Vec<FrameInsert>,
    ) -> Vec<FrameId> {
        for frame in removed {
            self.remove_frame(frame);
        }
        let mut ids = Vec::with_capacity(added.len());
        for insert in added {
            let frame = match insert.index {
                Some(index) => self.insert_frame(layer, index, insert.config, insert.size),
                None => self.add_frame(layer, insert.config, insert.size),
            };
            ids.push(frame);
        }
        ids
    }

    /// Replaces a frame's configuration and refreshes its layer.
    pub fn update_frame_config(&mut self, frame: FrameId, config: FrameConfig) {
        self.tree.update_frame_config(frame, config);
        let layer = self.tree.layer_of(frame);
        let _ = self.tree.drain_stale();
        self.refresh_layer(layer);
    }

    /// Replaces a layer's configuration and refreshes it. Scroll mode
    /// changes take effect immediately.
    pub fn update_layer_config(&mut self, layer: LayerId, config: LayerConfig) {
        self.tree.update_layer_config(layer, config);
        self.rebuild_transformer(layer);
        let _ = self.tree.drain_stale();
        self.refresh_layer(layer);
    }

    /// Resizes a stage and re-shows every affected layer.
    pub fn set_stage_size(&mut self, stage: StageId, size: Size) {
        self.tree.set_stage_size(stage, size);
        self.resize_pass();
    }

    /// Resizes a frame and re-shows every affected layer.
    pub fn set_frame_size(&mut self, frame: FrameId, size: Size) {
        self.tree.set_frame_size(frame, size);
        self.resize_pass();
    }

    /// Sets a layer's placement within its host coordinate space.
    pub fn set_layer_placement(&mut self, layer: LayerId, placement: Affine) {
        self.tree.set_layer_placement(layer, placement);
    }

    /// Recomputes and re-applies a layer's geometry, preserving its scroll
    /// position. Deferred until the layer is idle if a transition is
    /// running.
    pub fn request_resize(&mut self, layer: LayerId) {
        let _ = self.tree.drain_stale();
        self.refresh_layer(layer);
    }

    // -- Queries --

    /// The layer's current frame; `None` is the "no frame shown" state.
    #[must_use]
    pub fn current_frame(&self, layer: LayerId) -> Option<FrameId> {
        runtime_ref(&self.runtimes, layer).current
    }

    /// The current frame's name.
    #[must_use]
    pub fn current_frame_name(&self, layer: LayerId) -> Option<&str> {
        runtime_ref(&self.runtimes, layer)
            .current
            .map(|frame| self.tree.frame_name(frame))
    }

    /// The settled surface transform of the layer.
    #[must_use]
    pub fn current_transform(&self, layer: LayerId) -> Affine {
        runtime_ref(&self.runtimes, layer).current_transform
    }

    /// The scroll position in frame units.
    #[must_use]
    pub fn current_scroll(&self, layer: LayerId) -> Vec2 {
        runtime_ref(&self.runtimes, layer).current_scroll
    }

    /// Whether a transition or scroll animation is running.
    #[must_use]
    pub fn in_transition(&self, layer: LayerId) -> bool {
        runtime_ref(&self.runtimes, layer).window.is_some()
    }

    /// Whether a navigation is still loading its target.
    #[must_use]
    pub fn in_preparation(&self, layer: LayerId) -> bool {
        runtime_ref(&self.runtimes, layer).preparing.is_some()
    }

    /// Wall-clock remainder of the running animation, or `None` when idle.
    /// A newly requested animation is stretched to at least this long so a
    /// shorter override cannot visually tear.
    #[must_use]
    pub fn remaining_transition_time(&self, layer: LayerId, now: Timestamp) -> Option<Span> {
        let window = runtime_ref(&self.runtimes, layer).window?;
        Some(window.since.saturating_add(window.duration).span_since(now))
    }

    /// The layer's configuration.
    #[must_use]
    pub fn layer_config(&self, layer: LayerId) -> &LayerConfig {
        self.tree.layer_config(layer)
    }

    /// Read access to the scene tree.
    #[must_use]
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// The target a fresh layer should show: its configured default frame,
    /// or its first child, or nothing.
    #[must_use]
    pub fn default_target(&self, layer: LayerId) -> Option<FrameTarget> {
        if let Some(name) = &self.tree.layer_config(layer).default_frame {
            return Some(FrameTarget::parse(name));
        }
        self.tree
            .children(layer)
            .next()
            .map(|frame| FrameTarget::Name(self.tree.frame_name_owned(frame)))
    }

    // -- Frame pump --

    /// Advances time-driven work. Call once per surface frame, after the
    /// embedder painted.
    pub fn on_frame(&mut self, now: Timestamp) {
        self.run_boundary(now);
        self.run_watchdogs(now);
        self.run_delayed(now);
        self.run_timers(now);
    }

    /// Reports completion of an asynchronous layout operation. Tickets of
    /// superseded or already-finished operations are ignored.
    pub fn complete(&mut self, ticket: LayoutTicket, now: Timestamp) {
        self.run_pending(ticket.serial, now);
    }

    fn run_pending(&mut self, serial: u64, now: Timestamp) {
        let Some(op) = self.pending.remove(&serial) else {
            return;
        };
        match op {
            PendingOp::Load(plan) => self.continue_after_load(plan, now, false),
            PendingOp::GateWait(plan) => self.resume_prepared(plan, now, false),
            PendingOp::Animate(finish) => self.finalize_transition(finish),
            PendingOp::ScrollSettle {
                layer,
                serial,
                handle,
            } => self.finalize_scroll(layer, serial, handle),
        }
    }

    fn run_boundary(&mut self, now: Timestamp) {
        // Tasks queued while running land in the next boundary.
        let tasks = mem::take(&mut self.boundary);
        for task in tasks {
            match task {
                BoundaryTask::Finish {
                    layer,
                    generation,
                    name,
                    handle,
                } => {
                    {
                        let Some(runtime) = self.runtimes.get_mut(&layer) else {
                            continue;
                        };
                        if generation != runtime.active_generation {
                            continue;
                        }
                        if runtime.preparing == Some(generation) {
                            runtime.preparing = None;
                        }
                        let owner = AnimationOwner::Transition(generation);
                        if matches!(runtime.window, Some(window) if window.owner == owner) {
                            runtime.window = None;
                        }
                    }
                    self.sink.on_transition_finished(&TransitionFinishedEvent {
                        layer,
                        frame: name.as_deref(),
                        generation,
                        at: now,
                    });
                    handle.resolve();
                    self.after_finish(layer, now);
                }
                BoundaryTask::Complete(serial) => self.run_pending(serial, now),
            }
        }
    }

    fn run_watchdogs(&mut self, now: Timestamp) {
        for runtime in self.runtimes.values_mut() {
            let mut index = 0;
            while index < runtime.watchdogs.len() {
                if runtime.watchdogs[index].due.nanos() <= now.nanos() {
                    let watchdog = runtime.watchdogs.swap_remove(index);
                    fire_watchdog(runtime, watchdog.owner);
                } else {
                    index += 1;
                }
            }
        }
    }

    fn run_delayed(&mut self, now: Timestamp) {
        let due: Vec<LayerId> = self
            .runtimes
            .iter()
            .filter(|(_, runtime)| {
                runtime
                    .delayed
                    .as_ref()
                    .is_some_and(|delayed| delayed.due.nanos() <= now.nanos())
            })
            .map(|(layer, _)| *layer)
            .collect();
        for layer in due {
            let Some(runtime) = self.runtimes.get_mut(&layer) else {
                continue;
            };
            let Some(delayed) = runtime.delayed.take() else {
                continue;
            };
            // Fires only if no differing-group request arrived meanwhile.
            if runtime.latest_group != delayed.group {
                continue;
            }
            let _ = self.navigate(
                layer,
                delayed.target,
                delayed.request,
                now,
                Some(delayed.handle),
                delayed.animate,
            );
        }
    }

    fn run_timers(&mut self, now: Timestamp) {
        let due: Vec<LayerId> = self
            .runtimes
            .iter()
            .filter(|(_, runtime)| {
                runtime
                    .timer_due
                    .is_some_and(|due| due.nanos() <= now.nanos())
                    && runtime.window.is_none()
                    && runtime.preparing.is_none()
                    && runtime.delayed.is_none()
            })
            .map(|(layer, _)| *layer)
            .collect();
        for layer in due {
            if let Some(runtime) = self.runtimes.get_mut(&layer) {
                runtime.timer_due = None;
            }
            let _ = self.transition_to(layer, FrameTarget::Next, TransitionRequest::default(), now);
        }
    }

    /// Arms the auto-show timer and runs a deferred resize after a
    /// transition finished.
    fn after_finish(&mut self, layer: LayerId, now: Timestamp) {
        let timer = self.tree.layer_config(layer).timer;
        let queued = {
            let Some(runtime) = self.runtimes.get_mut(&layer) else {
                return;
            };
            if let Some(span) = timer {
                runtime.timer_due = Some(now.saturating_add(span));
            }
            mem::take(&mut runtime.resize_queued)
        };
        if queued {
            let _ = self.tree.drain_stale();
            self.refresh_layer(layer);
        }
    }

    // -- Geometry refresh --

    fn resize_pass(&mut self) {
        let invalidated = self.tree.drain_stale();
        let mut layers = invalidated.layers;
        for frame in invalidated.frames {
            layers.push(self.tree.layer_of(frame));
        }
        layers.sort_unstable();
        layers.dedup();
        for layer in layers {
            self.refresh_layer(layer);
        }
    }

    fn refresh_layer(&mut self, layer: LayerId) {
        {
            let Some(runtime) = self.runtimes.get_mut(&layer) else {
                return;
            };
            if runtime.window.is_some() || runtime.preparing.is_some() {
                runtime.resize_queued = true;
                return;
            }
            runtime.empty_memo = core::array::from_fn(|_| None);
        }
        self.reshow_current(layer);
    }

    /// Recomputes the current geometry and re-shows it, preserving the
    /// scroll position (clamped to the new range).
    fn reshow_current(&mut self, layer: LayerId) {
        let viewport = self.tree.viewport_of(layer);
        let Some(runtime) = self.runtimes.get_mut(&layer) else {
            return;
        };
        let current = runtime.current;
        let data = match current {
            Some(frame) => frame_data(&self.tree, layer, frame, None),
            None => {
                let start = runtime
                    .current_data
                    .as_ref()
                    .map_or(StartPosition::default(), |data| data.start_position);
                placeholder_data(runtime, viewport, start)
            }
        };
        if let Some(frame) = current {
            self.tree.set_transform_data(frame, data.clone());
        }
        let scroll = data.clamp_scroll(runtime.current_scroll);
        let settled = runtime.transformer.compose(&data, scroll, false);
        runtime.current_scroll = scroll;
        runtime.current_data = Some(data.clone());
        runtime.current_transform = settled.transform;
        runtime.layout.show_frame(FramePlacement {
            layer,
            frame: current,
            data,
            transform: settled.transform,
            native_scroll: settled.native_scroll,
        });
    }

    fn rebuild_transformer(&mut self, layer: LayerId) {
        let native = self.tree.layer_config(layer).native_scroll_enabled();
        let Some(runtime) = self.runtimes.get_mut(&layer) else {
            return;
        };
        runtime.transformer = runtime
            .layout
            .scroll_transformer()
            .unwrap_or_else(|| Box::new(DefaultScrollTransformer::new(native)));
    }

    // -- Bookkeeping --

    /// Composed transform from stage space into the layer's scroll surface.
    fn layer_space(&self, layer: LayerId) -> Affine {
        let base = match self.tree.host_of(layer) {
            Host::Stage(_) => Affine::IDENTITY,
            Host::Frame(frame) => {
                self.layer_space(self.tree.layer_of(frame)) * self.tree.frame_placement(frame)
            }
        };
        let surface = self
            .runtimes
            .get(&layer)
            .map_or(Affine::IDENTITY, |runtime| runtime.current_transform);
        base * self.tree.layer_placement(layer) * surface
    }

    fn purge_layer(&mut self, layer: LayerId) {
        self.pending.retain(|_, op| op.layer() != layer);
    }

    fn purge_targets(&mut self, removed: &[FrameId]) {
        self.pending.retain(|_, op| match op {
            PendingOp::Load(plan) | PendingOp::GateWait(plan) => {
                !plan.target.is_some_and(|frame| removed.contains(&frame))
            }
            PendingOp::Animate(_) | PendingOp::ScrollSettle { .. } => true,
        });
    }

    /// Drops the current frame if it is among `removed`, abandoning any
    /// in-flight navigation on the layer.
    fn detach_current(&mut self, layer: LayerId, removed: &[FrameId]) {
        let detached = {
            let Some(runtime) = self.runtimes.get_mut(&layer) else {
                return;
            };
            if !runtime
                .current
                .is_some_and(|frame| removed.contains(&frame))
            {
                return;
            }
            runtime.current = None;
            runtime.current_data = None;
            runtime.current_transform = Affine::IDENTITY;
            runtime.current_scroll = Vec2::ZERO;
            runtime.window = None;
            runtime.preparing = None;
            true
        };
        if detached {
            self.purge_layer(layer);
        }
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

// These take the individual fields rather than `&mut Navigator` so callers
// can hold disjoint borrows of the tree and a runtime at the same time.

fn runtime_ref(runtimes: &BTreeMap<LayerId, LayerRuntime>, layer: LayerId) -> &LayerRuntime {
    match runtimes.get(&layer) {
        Some(runtime) => runtime,
        None => panic!("no runtime for {layer:?}"),
    }
}

fn runtime_entry(
    runtimes: &mut BTreeMap<LayerId, LayerRuntime>,
    layer: LayerId,
) -> &mut LayerRuntime {
    match runtimes.get_mut(&layer) {
        Some(runtime) => runtime,
        None => panic!("no runtime for {layer:?}"),
    }
}

fn next_serial(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Geometry for a frame within its layer, from the cache unless a start
/// position override demands a fresh computation.
fn frame_data(
    tree: &SceneTree,
    layer: LayerId,
    frame: FrameId,
    start_override: Option<StartPosition>,
) -> TransformData {
    if start_override.is_none() {
        if let Some(data) = tree.transform_data(frame) {
            return data.clone();
        }
    }
    TransformData::compute(
        tree.viewport_of(layer),
        tree.frame_size(frame),
        tree.frame_config(frame),
        tree.layer_config(layer),
        start_override,
    )
}

/// No-frame geometry, memoized per start position. The memo self-validates
/// against the viewport size.
fn placeholder_data(
    runtime: &mut LayerRuntime,
    viewport: Size,
    start: StartPosition,
) -> TransformData {
    let slot = start as usize;
    if let Some(data) = &runtime.empty_memo[slot] {
        if data.stage_size == viewport {
            return data.clone();
        }
    }
    let data = TransformData::empty(viewport, start);
    runtime.empty_memo[slot] = Some(data.clone());
    data
}

fn fire_watchdog(runtime: &mut LayerRuntime, owner: AnimationOwner) {
    match owner {
        AnimationOwner::Transition(generation) => {
            // A stale watchdog must not clear a newer transition's state.
            if generation != runtime.active_generation {
                return;
            }
            if runtime.preparing == Some(generation) {
                runtime.preparing = None;
            }
        }
        AnimationOwner::Scroll(serial) => {
            if serial != runtime.scroll_serial {
                return;
            }
        }
    }
    if matches!(runtime.window, Some(window) if window.owner == owner) {
        runtime.window = None;
    }
}

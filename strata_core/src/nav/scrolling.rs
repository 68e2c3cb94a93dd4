// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll positions, scroll animations, and the gesture bridge.
//!
//! A layer's scroll position lives in the engine, in frame units; the
//! embedder never owns it. Natively scrolling layers report their offsets
//! back through [`Navigator::note_native_scroll`] so the recorded position
//! stays truthful, and synthetic layers move only through the surface
//! transforms the engine emits.
//!
//! Gestures enter through [`Navigator::on_gesture`]. A step that can still
//! move the content becomes scrolling; a directional step at the scroll
//! bounds becomes a navigation toward the current frame's declared neighbor.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::Vec2;

use crate::config::{DEFAULT_DURATION, Tristate, TransitionRequest, WATCHDOG_MARGIN};
use crate::gate::TransitionHandle;
use crate::gesture::Gesture;
use crate::layout::{Layout, LayoutPoll, LayoutTicket, SurfaceTransform};
use crate::resolver::{self, FrameTarget};
use crate::scroll::GestureScroll;
use crate::time::{Span, Timestamp};
use crate::tree::LayerId;

use super::{
    ActiveWindow, AnimationOwner, Navigator, PendingOp, Watchdog, next_serial, runtime_entry,
    runtime_ref,
};

impl Navigator {
    /// Animates the layer's scroll position to the given per-axis targets
    /// (frame units; `None` keeps an axis). Targets are clamped to the
    /// current frame's range and non-scrollable axes stay put.
    ///
    /// Returns `None` when nothing would move. The returned handle resolves
    /// once the surface animation settles; like transitions, a superseding
    /// scroll or navigation leaves the older handle unresolved.
    pub fn scroll_to(
        &mut self,
        layer: LayerId,
        x: Option<f64>,
        y: Option<f64>,
        request: TransitionRequest,
        now: Timestamp,
    ) -> Option<TransitionHandle> {
        let remaining = self.remaining_transition_time(layer, now);
        let (data, target) = {
            let runtime = runtime_ref(&self.runtimes, layer);
            let data = runtime.current_data.clone()?;
            let desired = data.clamp_scroll(Vec2::new(
                x.unwrap_or(runtime.current_scroll.x),
                y.unwrap_or(runtime.current_scroll.y),
            ));
            let target = Vec2::new(
                if data.scrollable_x {
                    desired.x
                } else {
                    runtime.current_scroll.x
                },
                if data.scrollable_y {
                    desired.y
                } else {
                    runtime.current_scroll.y
                },
            );
            if (target - runtime.current_scroll).hypot() < 1e-9 {
                return None;
            }
            (data, target)
        };

        let duration = request.duration.unwrap_or(DEFAULT_DURATION);
        // A scroll taking over an unfinished animation is stretched the same
        // way a transition is.
        let effective = remaining.map_or(duration, |rest| duration.max(rest));
        let serial = next_serial(&mut self.next_serial);
        let handle = TransitionHandle::new();
        let (poll, scroll_id) = {
            let runtime = runtime_entry(&mut self.runtimes, layer);
            runtime.scroll_serial += 1;
            let scroll_id = runtime.scroll_serial;
            let settled = runtime.transformer.compose(&data, target, false);
            runtime.current_scroll = target;
            runtime.current_transform = settled.transform;
            runtime.window = Some(ActiveWindow {
                since: now,
                duration: effective,
                owner: AnimationOwner::Scroll(scroll_id),
            });
            runtime.watchdogs.push(Watchdog {
                due: now.saturating_add(effective).saturating_add(WATCHDOG_MARGIN),
                owner: AnimationOwner::Scroll(scroll_id),
            });
            let poll = runtime.layout.set_surface_transform(SurfaceTransform {
                layer,
                transform: settled.transform,
                native_scroll: settled.native_scroll,
                duration: effective,
                ticket: Some(LayoutTicket { layer, serial }),
            });
            (poll, scroll_id)
        };
        match poll {
            LayoutPoll::Ready => self.finalize_scroll(layer, scroll_id, Some(handle.clone())),
            LayoutPoll::Pending => {
                let _ = self.pending.insert(
                    serial,
                    PendingOp::ScrollSettle {
                        layer,
                        serial: scroll_id,
                        handle: Some(handle.clone()),
                    },
                );
            }
        }
        Some(handle)
    }

    /// Surface transform settled; close the scroll's window unless a newer
    /// scroll or navigation took over meanwhile.
    pub(super) fn finalize_scroll(
        &mut self,
        layer: LayerId,
        serial: u64,
        handle: Option<TransitionHandle>,
    ) {
        let Some(runtime) = self.runtimes.get_mut(&layer) else {
            return;
        };
        if serial != runtime.scroll_serial {
            // Superseded; the handle intentionally never settles.
            return;
        }
        let owner = AnimationOwner::Scroll(serial);
        if matches!(runtime.window, Some(window) if window.owner == owner) {
            runtime.window = None;
        }
        if let Some(handle) = handle {
            handle.resolve();
        }
    }

    /// Records the scroll offset (surface pixels) reported by the embedder's
    /// native scroller. Layers in synthetic mode ignore the report.
    pub fn note_native_scroll(&mut self, layer: LayerId, offset: Vec2) {
        let runtime = runtime_entry(&mut self.runtimes, layer);
        if !runtime.transformer.is_native() {
            return;
        }
        let Some(data) = &runtime.current_data else {
            return;
        };
        if data.scale > 0.0 {
            runtime.current_scroll = data.clamp_scroll(offset / data.scale);
        }
    }

    /// Replaces the layer's layout. The current frame is re-shown through
    /// the new layout with geometry and scroll preserved, and the new
    /// layout's scroll transformer (if any) takes over.
    pub fn switch_layout(&mut self, layer: LayerId, layout: Box<dyn Layout>) {
        runtime_entry(&mut self.runtimes, layer).layout = layout;
        self.rebuild_transformer(layer);
        self.refresh_layer(layer);
    }

    /// Toggles the layer between native and synthetic scrolling. The
    /// frame-unit scroll position carries over, so the apparent position is
    /// unchanged.
    pub fn switch_scrolling(&mut self, layer: LayerId, native: bool) {
        let mut config = self.tree.layer_config(layer).clone();
        config.native_scroll = Tristate::from(native);
        self.update_layer_config(layer, config);
    }

    /// Feeds one gesture step to a layer.
    ///
    /// Steps already claimed by another layer are ignored. Otherwise the
    /// step becomes scrolling while the content can still move along it, and
    /// a navigation toward the declared neighbor in the step's direction
    /// once it cannot. [`Gesture::claim`] and [`Gesture::prevent_default`]
    /// are written back for the embedder to inspect.
    pub fn on_gesture(&mut self, layer: LayerId, gesture: &mut Gesture, now: Timestamp) {
        if gesture.is_claimed() {
            return;
        }
        let outcome = {
            let runtime = runtime_ref(&self.runtimes, layer);
            let Some(data) = &runtime.current_data else {
                return;
            };
            runtime
                .transformer
                .gesture_scroll(data, runtime.current_scroll, gesture)
        };
        match outcome {
            GestureScroll::Native { scroll } => {
                // The embedder's scroller performs the motion; only record
                // the position.
                runtime_entry(&mut self.runtimes, layer).current_scroll = scroll;
                gesture.claim();
            }
            GestureScroll::Live { transform, scroll } => {
                let runtime = runtime_entry(&mut self.runtimes, layer);
                runtime.scroll_serial += 1;
                if let Some(window) = runtime.window {
                    // Grabbing the content back cancels a running scroll
                    // animation; a transition keeps its window.
                    if matches!(window.owner, AnimationOwner::Scroll(_)) {
                        runtime.window = None;
                    }
                }
                runtime.current_scroll = scroll;
                runtime.current_transform = transform;
                let _ = runtime.layout.set_surface_transform(SurfaceTransform {
                    layer,
                    transform,
                    native_scroll: None,
                    duration: Span::ZERO,
                    ticket: None,
                });
                if gesture.last {
                    // Pointer lifted: emit the settled form, which in native
                    // mode hands the position back to the embedder.
                    if let Some(data) = runtime.current_data.clone() {
                        let settled = runtime.transformer.compose(&data, scroll, false);
                        runtime.current_transform = settled.transform;
                        let _ = runtime.layout.set_surface_transform(SurfaceTransform {
                            layer,
                            transform: settled.transform,
                            native_scroll: settled.native_scroll,
                            duration: Span::ZERO,
                            ticket: None,
                        });
                    }
                }
                gesture.claim();
                gesture.prevent_default();
            }
            GestureScroll::Unhandled => self.gesture_navigation(layer, gesture, now),
        }
    }

    /// The step cannot scroll: a directional one may become a navigation to
    /// the declared neighbor.
    fn gesture_navigation(&mut self, layer: LayerId, gesture: &mut Gesture, now: Timestamp) {
        let Some(direction) = gesture.direction else {
            // Directionless steps are swallowed so they do not fall through
            // to the embedder's page scrolling.
            gesture.claim();
            gesture.prevent_default();
            return;
        };
        let Some(current) = runtime_ref(&self.runtimes, layer).current else {
            return;
        };
        let neighbor = resolver::declared(&self.tree.frame_config(current).neighbors, direction)
            .map(String::from);
        let Some(neighbor) = neighbor else {
            // No neighbor declared: leave the gesture for outer layers.
            return;
        };
        gesture.claim();
        gesture.prevent_default();
        // Wheels repeat rapidly; require deliberate travel. Drags fire on
        // the terminal step only.
        let fire = if gesture.wheel {
            gesture.enough_distance()
        } else {
            gesture.last
        };
        let idle = {
            let runtime = runtime_ref(&self.runtimes, layer);
            runtime.window.is_none() && runtime.preparing.is_none()
        };
        if fire && idle {
            let request = TransitionRequest {
                kind: Some(String::from(direction.transition_kind())),
                ..TransitionRequest::default()
            };
            let _ = self.transition_to(layer, FrameTarget::Name(neighbor), request, now);
        }
    }
}

// ---------------------------------------------------------------------------

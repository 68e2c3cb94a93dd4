// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared doubles and builders for the navigator tests.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Size;

use crate::config::{FrameConfig, LayerConfig};
use crate::events::{
    BeforeTransitionEvent, ChildAddedEvent, ChildRemovedEvent, EventSink, TransitionFinishedEvent,
    TransitionPreparedEvent, TransitionStartedEvent,
};
use crate::layout::{
    FramePlacement, Layout, LayoutPoll, LayoutTicket, LoadRequest, PositionRequest,
    SurfaceTransform, TransitionPlacement,
};
use crate::time::Timestamp;
use crate::tree::{FrameId, Host, LayerId, StageId};

use super::Navigator;

#[derive(Default)]
pub(super) struct LayoutLog {
    pub(super) calls: Vec<String>,
    pub(super) tickets: Vec<LayoutTicket>,
}

/// Scriptable layout double: each operation logs itself and either completes
/// inline or parks its ticket.
#[derive(Clone, Default)]
pub(super) struct ScriptLayout {
    pub(super) log: Rc<RefCell<LayoutLog>>,
    pub(super) async_load: bool,
    pub(super) async_transition: bool,
    pub(super) async_surface: bool,
}

impl Layout for ScriptLayout {
    fn load_frame(&mut self, request: LoadRequest) -> LayoutPoll {
        let mut log = self.log.borrow_mut();
        log.calls.push(format!("load {}", request.frame.index()));
        if self.async_load {
            log.tickets.push(request.ticket);
            LayoutPoll::Pending
        } else {
            LayoutPoll::Ready
        }
    }

    fn show_frame(&mut self, placement: FramePlacement) {
        self.log.borrow_mut().calls.push(match placement.frame {
            Some(frame) => format!("show {}", frame.index()),
            None => "show none".to_string(),
        });
    }

    fn begin_transition(&mut self, placement: TransitionPlacement) -> LayoutPoll {
        let mut log = self.log.borrow_mut();
        log.calls.push(format!(
            "animate {} {}ms",
            placement.kind,
            placement.duration.as_millis()
        ));
        if self.async_transition {
            log.tickets.push(placement.ticket);
            LayoutPoll::Pending
        } else {
            LayoutPoll::Ready
        }
    }

    fn set_surface_transform(&mut self, transform: SurfaceTransform) -> LayoutPoll {
        let mut log = self.log.borrow_mut();
        log.calls
            .push(format!("surface {}ms", transform.duration.as_millis()));
        match transform.ticket {
            Some(ticket) if self.async_surface => {
                log.tickets.push(ticket);
                LayoutPoll::Pending
            }
            _ => LayoutPoll::Ready,
        }
    }

    fn position_frame(&mut self, request: PositionRequest) {
        self.log
            .borrow_mut()
            .calls
            .push(format!("position {}", request.frame.index()));
    }
}

#[derive(Clone, Default)]
pub(super) struct RecordingSink {
    pub(super) events: Rc<RefCell<Vec<String>>>,
}

impl EventSink for RecordingSink {
    fn on_before_transition(&mut self, e: &BeforeTransitionEvent<'_>) {
        self.events
            .borrow_mut()
            .push(format!("before {}", e.target.unwrap_or("-")));
    }

    fn on_transition_started(&mut self, e: &TransitionStartedEvent<'_>) {
        self.events
            .borrow_mut()
            .push(format!("started {}", e.frame.unwrap_or("-")));
    }

    fn on_transition_prepared(&mut self, e: &TransitionPreparedEvent) {
        let _ = e;
        self.events.borrow_mut().push("prepared".to_string());
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
        self.events
            .borrow_mut()
            .push(format!("finished {}", e.frame.unwrap_or("-")));
    }

    fn on_child_added(&mut self, e: &ChildAddedEvent<'_>) {
        self.events.borrow_mut().push(format!("added {}", e.name));
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent<'_>) {
        self.events.borrow_mut().push(format!("removed {}", e.name));
    }
}

pub(super) struct Rig {
    pub(super) nav: Navigator,
    pub(super) events: Rc<RefCell<Vec<String>>>,
    pub(super) log: Rc<RefCell<LayoutLog>>,
    pub(super) stage: StageId,
    pub(super) layer: LayerId,
    pub(super) frames: Vec<FrameId>,
}

impl Rig {
    pub(super) fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.log.borrow().calls.clone()
    }

    pub(super) fn pop_ticket(&self) -> LayoutTicket {
        self.log.borrow_mut().tickets.remove(0)
    }
}

/// One stage, one layer, one frame per name; events recorded, setup noise
/// cleared.
pub(super) fn build(names: &[&str], layout: ScriptLayout, config: LayerConfig) -> Rig {
    build_sized(names, Size::new(800.0, 600.0), layout, config)
}

pub(super) fn build_sized(
    names: &[&str],
    frame: Size,
    layout: ScriptLayout,
    config: LayerConfig,
) -> Rig {
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = layout.log.clone();
    let mut nav = Navigator::with_sink(Box::new(RecordingSink {
        events: events.clone(),
    }));
    let stage = nav.add_stage(Size::new(800.0, 600.0));
    let layer = nav
        .add_layer(Host::Stage(stage), config, Box::new(layout))
        .unwrap();
    let frames = names
        .iter()
        .map(|name| nav.add_frame(layer, FrameConfig::new(*name), frame))
        .collect();
    events.borrow_mut().clear();
    Rig {
        nav,
        events,
        log,
        stage,
        layer,
        frames,
    }
}

pub(super) fn instant_rig(names: &[&str]) -> Rig {
    build(names, ScriptLayout::default(), LayerConfig::default())
}

pub(super) fn animated_rig(names: &[&str]) -> Rig {
    let layout = ScriptLayout {
        async_transition: true,
        ..ScriptLayout::default()
    };
    build(names, layout, LayerConfig::default())
}

pub(super) fn t(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

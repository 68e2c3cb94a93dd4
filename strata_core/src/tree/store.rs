// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slab storage for stages, layers, and frames.
//!
//! Nodes are addressed by generational handles ([`StageId`], [`LayerId`],
//! [`FrameId`]). Each kind occupies its own set of parallel arrays; removed
//! nodes are recycled via free lists, and generation counters prevent stale
//! handle access.
//!
//! Sibling order is semantic here: `!next`/`!previous` navigation and the
//! directional fallbacks walk the child list in order, so children are
//! stored as explicit ordered vectors rather than intrusive links.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::config::{FrameConfig, LayerConfig};
use crate::dirty;
use crate::error::NavigationError;
use crate::geometry::TransformData;

use super::id::{FrameId, LayerId, StageId};

/// What a layer is mounted on.
///
/// Top-level layers live on a stage; nested layers live inside a frame of
/// another layer, which then acts as their viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Host {
    /// Mounted directly on a stage.
    Stage(StageId),
    /// Mounted inside a frame of another layer.
    Frame(FrameId),
}

/// Nodes whose cached geometry became stale, produced by
/// [`SceneTree::drain_stale`].
#[derive(Clone, Debug, Default)]
pub struct Invalidated {
    /// Frames whose cached transform data was dropped.
    pub frames: Vec<FrameId>,
    /// Layers whose viewport geometry changed.
    pub layers: Vec<LayerId>,
    /// Whether any child list changed since the last drain.
    pub topology_changed: bool,
}

// Dirty keys pack the node kind into the top bits of the slot index.
const KIND_SHIFT: u32 = 30;
const IDX_MASK: u32 = (1 << KIND_SHIFT) - 1;

const fn stage_key(idx: u32) -> u32 {
    idx
}

const fn layer_key(idx: u32) -> u32 {
    (1 << KIND_SHIFT) | idx
}

const fn frame_key(idx: u32) -> u32 {
    (2 << KIND_SHIFT) | idx
}

/// Slab storage for the whole scene: stages hosting layers hosting ordered
/// frames, with frames in turn able to host nested layers.
#[derive(Debug)]
pub struct SceneTree {
    // -- Stages --
    stage_size: Vec<Size>,
    stage_layers: Vec<Vec<u32>>,
    stage_generation: Vec<u32>,
    stage_free: Vec<u32>,
    stage_len: u32,

    // -- Layers --
    layer_host: Vec<Host>,
    layer_config: Vec<LayerConfig>,
    layer_children: Vec<Vec<u32>>,
    layer_placement: Vec<Affine>,
    layer_generation: Vec<u32>,
    layer_free: Vec<u32>,
    layer_len: u32,

    // -- Frames --
    frame_config: Vec<FrameConfig>,
    frame_layer: Vec<u32>,
    frame_layers: Vec<Vec<u32>>,
    frame_size: Vec<Size>,
    frame_placement: Vec<Affine>,
    frame_data: Vec<Option<TransformData>>,
    frame_active: Vec<bool>,
    frame_attached: Vec<bool>,
    frame_generation: Vec<u32>,
    frame_free: Vec<u32>,
    frame_len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage_size: Vec::new(),
            stage_layers: Vec::new(),
            stage_generation: Vec::new(),
            stage_free: Vec::new(),
            stage_len: 0,
            layer_host: Vec::new(),
            layer_config: Vec::new(),
            layer_children: Vec::new(),
            layer_placement: Vec::new(),
            layer_generation: Vec::new(),
            layer_free: Vec::new(),
            layer_len: 0,
            frame_config: Vec::new(),
            frame_layer: Vec::new(),
            frame_layers: Vec::new(),
            frame_size: Vec::new(),
            frame_placement: Vec::new(),
            frame_data: Vec::new(),
            frame_active: Vec::new(),
            frame_attached: Vec::new(),
            frame_generation: Vec::new(),
            frame_free: Vec::new(),
            frame_len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation API --

    /// Creates a new stage with the given viewport size.
    pub fn add_stage(&mut self, size: Size) -> StageId {
        let idx = if let Some(idx) = self.stage_free.pop() {
            self.stage_generation[idx as usize] += 1;
            self.stage_size[idx as usize] = size;
            self.stage_layers[idx as usize].clear();
            idx
        } else {
            let idx = self.stage_len;
            self.stage_len += 1;
            self.stage_size.push(size);
            self.stage_layers.push(Vec::new());
            self.stage_generation.push(0);
            idx
        };
        StageId::new(idx, self.stage_generation[idx as usize])
    }

    /// Creates a new layer on the given host.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::InvalidHost`] if the host handle is stale.
    pub fn add_layer(
        &mut self,
        host: Host,
        config: LayerConfig,
    ) -> Result<LayerId, NavigationError> {
        let host_alive = match host {
            Host::Stage(stage) => self.is_stage_alive(stage),
            Host::Frame(frame) => self.is_frame_alive(frame),
        };
        if !host_alive {
            return Err(NavigationError::InvalidHost);
        }

        let idx = if let Some(idx) = self.layer_free.pop() {
            self.layer_generation[idx as usize] += 1;
            self.layer_host[idx as usize] = host;
            self.layer_config[idx as usize] = config;
            self.layer_children[idx as usize].clear();
            self.layer_placement[idx as usize] = Affine::IDENTITY;
            idx
        } else {
            let idx = self.layer_len;
            self.layer_len += 1;
            self.layer_host.push(host);
            self.layer_config.push(config);
            self.layer_children.push(Vec::new());
            self.layer_placement.push(Affine::IDENTITY);
            self.layer_generation.push(0);
            idx
        };

        let host_key = match host {
            Host::Stage(stage) => {
                self.stage_layers[stage.idx as usize].push(idx);
                stage_key(stage.idx)
            }
            Host::Frame(frame) => {
                self.frame_layers[frame.idx as usize].push(idx);
                frame_key(frame.idx)
            }
        };
        let _ = self.dirty.add_dependency(layer_key(idx), host_key, dirty::GEOMETRY);
        self.dirty.mark(host_key, dirty::TOPOLOGY);

        Ok(LayerId::new(idx, self.layer_generation[idx as usize]))
    }

    /// Appends a new frame to a layer's child list.
    ///
    /// # Panics
    ///
    /// Panics if the layer handle is stale.
    pub fn add_frame(&mut self, layer: LayerId, config: FrameConfig, size: Size) -> FrameId {
        let at = self.layer_children[self.validated_layer(layer) as usize].len();
        self.insert_frame(layer, at, config, size)
    }

    /// Inserts a new frame at `index` in a layer's child list.
    ///
    /// # Panics
    ///
    /// Panics if the layer handle is stale or `index` is past the end.
    pub fn insert_frame(
        &mut self,
        layer: LayerId,
        index: usize,
        config: FrameConfig,
        size: Size,
    ) -> FrameId {
        let l = self.validated_layer(layer);
        assert!(
            index <= self.layer_children[l as usize].len(),
            "insert index {index} past end of child list (len {})",
            self.layer_children[l as usize].len()
        );

        let idx = if let Some(idx) = self.frame_free.pop() {
            self.frame_generation[idx as usize] += 1;
            self.frame_config[idx as usize] = config;
            self.frame_layer[idx as usize] = l;
            self.frame_layers[idx as usize].clear();
            self.frame_size[idx as usize] = size;
            self.frame_placement[idx as usize] = Affine::IDENTITY;
            self.frame_data[idx as usize] = None;
            self.frame_active[idx as usize] = false;
            self.frame_attached[idx as usize] = false;
            idx
        } else {
            let idx = self.frame_len;
            self.frame_len += 1;
            self.frame_config.push(config);
            self.frame_layer.push(l);
            self.frame_layers.push(Vec::new());
            self.frame_size.push(size);
            self.frame_placement.push(Affine::IDENTITY);
            self.frame_data.push(None);
            self.frame_active.push(false);
            self.frame_attached.push(false);
            self.frame_generation.push(0);
            idx
        };

        self.layer_children[l as usize].insert(index, idx);
        let _ = self.dirty.add_dependency(frame_key(idx), layer_key(l), dirty::GEOMETRY);
        self.dirty.mark(layer_key(l), dirty::TOPOLOGY);

        FrameId::new(idx, self.frame_generation[idx as usize])
    }

    /// Removes a frame and everything nested inside it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_frame(&mut self, frame: FrameId) {
        let f = self.validated_frame(frame);
        let l = self.frame_layer[f as usize];
        self.layer_children[l as usize].retain(|&c| c != f);
        self.dirty.mark(layer_key(l), dirty::TOPOLOGY);
        self.free_frame(f);
    }

    /// Removes a layer and everything nested inside it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_layer(&mut self, layer: LayerId) {
        let l = self.validated_layer(layer);
        let host_key = match self.layer_host[l as usize] {
            Host::Stage(stage) => {
                self.stage_layers[stage.idx as usize].retain(|&c| c != l);
                stage_key(stage.idx)
            }
            Host::Frame(frame) => {
                self.frame_layers[frame.idx as usize].retain(|&c| c != l);
                frame_key(frame.idx)
            }
        };
        self.dirty.mark(host_key, dirty::TOPOLOGY);
        self.free_layer(l);
    }

    /// Removes a stage and everything on it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_stage(&mut self, stage: StageId) {
        self.validate_stage(stage);
        let s = stage.idx;
        let hosted: Vec<u32> = core::mem::take(&mut self.stage_layers[s as usize]);
        for l in hosted {
            self.free_layer(l);
        }
        self.dirty.remove_key(stage_key(s));
        self.stage_generation[s as usize] += 1;
        self.stage_free.push(s);
    }

    // -- Liveness --

    /// Returns whether the handle refers to a live stage.
    #[must_use]
    pub fn is_stage_alive(&self, id: StageId) -> bool {
        id.idx < self.stage_len
            && self.stage_generation[id.idx as usize] == id.generation
            && !self.stage_free.contains(&id.idx)
    }

    /// Returns whether the handle refers to a live layer.
    #[must_use]
    pub fn is_layer_alive(&self, id: LayerId) -> bool {
        id.idx < self.layer_len
            && self.layer_generation[id.idx as usize] == id.generation
            && !self.layer_free.contains(&id.idx)
    }

    /// Returns whether the handle refers to a live frame.
    #[must_use]
    pub fn is_frame_alive(&self, id: FrameId) -> bool {
        id.idx < self.frame_len
            && self.frame_generation[id.idx as usize] == id.generation
            && !self.frame_free.contains(&id.idx)
    }

    // -- Topology API --

    /// Moves a frame into another layer's child list (cross-layer adoption).
    ///
    /// `index` of `None` appends. Geometry under the frame is marked stale
    /// since nested layers now derive from a different ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `index` is past the end.
    pub fn move_frame(&mut self, frame: FrameId, dest: LayerId, index: Option<usize>) {
        let f = self.validated_frame(frame);
        let d = self.validated_layer(dest);

        let source = self.frame_layer[f as usize];
        self.layer_children[source as usize].retain(|&c| c != f);
        self.dirty.remove_dependency(frame_key(f), layer_key(source), dirty::GEOMETRY);
        self.dirty.mark(layer_key(source), dirty::TOPOLOGY);

        let at = index.unwrap_or(self.layer_children[d as usize].len());
        assert!(
            at <= self.layer_children[d as usize].len(),
            "insert index {at} past end of child list (len {})",
            self.layer_children[d as usize].len()
        );
        self.layer_children[d as usize].insert(at, f);
        self.frame_layer[f as usize] = d;
        let _ = self.dirty.add_dependency(frame_key(f), layer_key(d), dirty::GEOMETRY);
        self.dirty.mark(layer_key(d), dirty::TOPOLOGY);
        self.dirty.mark_with(frame_key(f), dirty::GEOMETRY, &EagerPolicy);
    }

    /// Returns the layer a frame currently belongs to.
    #[must_use]
    pub fn layer_of(&self, frame: FrameId) -> LayerId {
        let f = self.validated_frame(frame);
        let l = self.frame_layer[f as usize];
        LayerId::new(l, self.layer_generation[l as usize])
    }

    /// Returns what a layer is mounted on.
    #[must_use]
    pub fn host_of(&self, layer: LayerId) -> Host {
        let l = self.validated_layer(layer);
        self.layer_host[l as usize]
    }

    /// Returns the viewport size a layer's frames are fitted to: the stage
    /// size for top-level layers, the hosting frame's size for nested ones.
    #[must_use]
    pub fn viewport_of(&self, layer: LayerId) -> Size {
        match self.host_of(layer) {
            Host::Stage(stage) => self.stage_size(stage),
            Host::Frame(frame) => self.frame_size(frame),
        }
    }

    /// Returns the frames and layers in the subtree rooted at `frame`
    /// (pre-order, the root frame first).
    #[must_use]
    pub fn subtree_of_frame(&self, frame: FrameId) -> (Vec<FrameId>, Vec<LayerId>) {
        self.validate_frame(frame);
        let mut frames = Vec::new();
        let mut layers = Vec::new();
        self.collect_frame_subtree(frame.idx, &mut frames, &mut layers);
        (frames, layers)
    }

    /// Returns the frames and layers in the subtree rooted at `layer`
    /// (pre-order, the root layer first).
    #[must_use]
    pub fn subtree_of_layer(&self, layer: LayerId) -> (Vec<FrameId>, Vec<LayerId>) {
        self.validate_layer(layer);
        let mut frames = Vec::new();
        let mut layers = Vec::new();
        self.collect_layer_subtree(layer.idx, &mut frames, &mut layers);
        (frames, layers)
    }

    // -- Child queries --

    /// Returns an iterator over a layer's frames in sibling order.
    pub fn children(&self, layer: LayerId) -> impl Iterator<Item = FrameId> + '_ {
        let l = self.validated_layer(layer);
        self.layer_children[l as usize]
            .iter()
            .map(move |&f| FrameId::new(f, self.frame_generation[f as usize]))
    }

    /// Returns the number of frames in a layer.
    #[must_use]
    pub fn child_count(&self, layer: LayerId) -> usize {
        let l = self.validated_layer(layer);
        self.layer_children[l as usize].len()
    }

    /// Returns the frame at `index` in sibling order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn child_at(&self, layer: LayerId, index: usize) -> FrameId {
        let l = self.validated_layer(layer);
        let f = self.layer_children[l as usize][index];
        FrameId::new(f, self.frame_generation[f as usize])
    }

    /// Returns a frame's position in its layer's sibling order.
    #[must_use]
    pub fn position_of(&self, layer: LayerId, frame: FrameId) -> Option<usize> {
        let l = self.validated_layer(layer);
        self.validate_frame(frame);
        self.layer_children[l as usize]
            .iter()
            .position(|&f| f == frame.idx)
    }

    /// Finds a frame by name within one layer (first match in sibling order).
    #[must_use]
    pub fn find_frame(&self, layer: LayerId, name: &str) -> Option<FrameId> {
        let l = self.validated_layer(layer);
        self.layer_children[l as usize]
            .iter()
            .find(|&&f| self.frame_config[f as usize].name == name)
            .map(|&f| FrameId::new(f, self.frame_generation[f as usize]))
    }

    /// Finds a frame by name anywhere in the tree.
    ///
    /// The scan runs in slot order, so the result is deterministic when
    /// names collide across layers.
    #[must_use]
    pub fn find_frame_anywhere(&self, name: &str) -> Option<FrameId> {
        (0..self.frame_len)
            .filter(|idx| !self.frame_free.contains(idx))
            .find(|&idx| self.frame_config[idx as usize].name == name)
            .map(|idx| FrameId::new(idx, self.frame_generation[idx as usize]))
    }

    // -- Property getters --

    /// Returns a frame's navigation name.
    #[must_use]
    pub fn frame_name(&self, frame: FrameId) -> &str {
        let f = self.validated_frame(frame);
        &self.frame_config[f as usize].name
    }

    /// Returns a frame's configuration.
    #[must_use]
    pub fn frame_config(&self, frame: FrameId) -> &FrameConfig {
        let f = self.validated_frame(frame);
        &self.frame_config[f as usize]
    }

    /// Returns a layer's configuration.
    #[must_use]
    pub fn layer_config(&self, layer: LayerId) -> &LayerConfig {
        let l = self.validated_layer(layer);
        &self.layer_config[l as usize]
    }

    /// Returns a stage's viewport size.
    #[must_use]
    pub fn stage_size(&self, stage: StageId) -> Size {
        self.validate_stage(stage);
        self.stage_size[stage.idx as usize]
    }

    /// Returns a frame's content size.
    #[must_use]
    pub fn frame_size(&self, frame: FrameId) -> Size {
        let f = self.validated_frame(frame);
        self.frame_size[f as usize]
    }

    /// Returns a frame's placement transform within its layer.
    #[must_use]
    pub fn frame_placement(&self, frame: FrameId) -> Affine {
        let f = self.validated_frame(frame);
        self.frame_placement[f as usize]
    }

    /// Returns a layer's placement transform within its host.
    #[must_use]
    pub fn layer_placement(&self, layer: LayerId) -> Affine {
        let l = self.validated_layer(layer);
        self.layer_placement[l as usize]
    }

    /// Returns a frame's cached transform data, if still valid.
    #[must_use]
    pub fn transform_data(&self, frame: FrameId) -> Option<&TransformData> {
        let f = self.validated_frame(frame);
        self.frame_data[f as usize].as_ref()
    }

    /// Returns whether a frame is the current frame of its layer.
    #[must_use]
    pub fn is_frame_active(&self, frame: FrameId) -> bool {
        let f = self.validated_frame(frame);
        self.frame_active[f as usize]
    }

    /// Returns whether a frame's content has been brought into the render
    /// tree by a completed load.
    #[must_use]
    pub fn is_frame_attached(&self, frame: FrameId) -> bool {
        let f = self.validated_frame(frame);
        self.frame_attached[f as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets a stage's viewport size, invalidating cached geometry beneath it.
    pub fn set_stage_size(&mut self, stage: StageId, size: Size) {
        self.validate_stage(stage);
        self.stage_size[stage.idx as usize] = size;
        self.dirty.mark_with(stage_key(stage.idx), dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets a frame's content size, invalidating its own cached geometry and
    /// everything nested inside it.
    pub fn set_frame_size(&mut self, frame: FrameId, size: Size) {
        let f = self.validated_frame(frame);
        self.frame_size[f as usize] = size;
        self.dirty.mark_with(frame_key(f), dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets a frame's placement transform within its layer.
    pub fn set_frame_placement(&mut self, frame: FrameId, placement: Affine) {
        let f = self.validated_frame(frame);
        self.frame_placement[f as usize] = placement;
    }

    /// Sets a layer's placement transform within its host.
    pub fn set_layer_placement(&mut self, layer: LayerId, placement: Affine) {
        let l = self.validated_layer(layer);
        self.layer_placement[l as usize] = placement;
    }

    /// Replaces a frame's configuration, dropping its cached transform data.
    pub fn update_frame_config(&mut self, frame: FrameId, config: FrameConfig) {
        let f = self.validated_frame(frame);
        self.frame_config[f as usize] = config;
        self.frame_data[f as usize] = None;
        self.dirty.mark(frame_key(f), dirty::ATTRIBUTES);
    }

    /// Replaces a layer's configuration, dropping the cached transform data
    /// of all its frames (scrollability flags derive from the layer config).
    pub fn update_layer_config(&mut self, layer: LayerId, config: LayerConfig) {
        let l = self.validated_layer(layer);
        self.layer_config[l as usize] = config;
        for i in 0..self.layer_children[l as usize].len() {
            let f = self.layer_children[l as usize][i];
            self.frame_data[f as usize] = None;
            self.dirty.mark(frame_key(f), dirty::ATTRIBUTES);
        }
    }

    pub(crate) fn set_transform_data(&mut self, frame: FrameId, data: TransformData) {
        let f = self.validated_frame(frame);
        self.frame_data[f as usize] = Some(data);
    }

    pub(crate) fn set_frame_active(&mut self, frame: FrameId, active: bool) {
        let f = self.validated_frame(frame);
        self.frame_active[f as usize] = active;
    }

    pub(crate) fn set_frame_attached(&mut self, frame: FrameId) {
        let f = self.validated_frame(frame);
        self.frame_attached[f as usize] = true;
    }

    // -- Invalidation --

    /// Drains the dirty channels, dropping stale transform-data caches and
    /// returning the affected nodes.
    pub fn drain_stale(&mut self) -> Invalidated {
        let geometry: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        let attributes: Vec<u32> = self
            .dirty
            .drain(dirty::ATTRIBUTES)
            .deterministic()
            .run()
            .collect();
        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        let mut out = Invalidated {
            topology_changed: !topology.is_empty(),
            ..Invalidated::default()
        };
        for &key in geometry.iter().chain(attributes.iter()) {
            let idx = key & IDX_MASK;
            match key >> KIND_SHIFT {
                1 => {
                    if !self.layer_free.contains(&idx) {
                        out.layers
                            .push(LayerId::new(idx, self.layer_generation[idx as usize]));
                    }
                }
                2 => {
                    if !self.frame_free.contains(&idx) {
                        self.frame_data[idx as usize] = None;
                        out.frames
                            .push(FrameId::new(idx, self.frame_generation[idx as usize]));
                    }
                }
                _ => {}
            }
        }
        out.frames.sort_unstable();
        out.frames.dedup();
        out.layers.sort_unstable();
        out.layers.dedup();
        out
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate_stage(&self, id: StageId) {
        assert!(
            self.is_stage_alive(id),
            "stale StageId: {id:?} (current gen: {})",
            if id.idx < self.stage_len {
                self.stage_generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn validate_layer(&self, id: LayerId) {
        assert!(
            self.is_layer_alive(id),
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.layer_len {
                self.layer_generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn validate_frame(&self, id: FrameId) {
        assert!(
            self.is_frame_alive(id),
            "stale FrameId: {id:?} (current gen: {})",
            if id.idx < self.frame_len {
                self.frame_generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn validated_layer(&self, id: LayerId) -> u32 {
        self.validate_layer(id);
        id.idx
    }

    fn validated_frame(&self, id: FrameId) -> u32 {
        self.validate_frame(id);
        id.idx
    }

    fn collect_frame_subtree(&self, f: u32, frames: &mut Vec<FrameId>, layers: &mut Vec<LayerId>) {
        frames.push(FrameId::new(f, self.frame_generation[f as usize]));
        for &l in &self.frame_layers[f as usize] {
            self.collect_layer_subtree(l, frames, layers);
        }
    }

    fn collect_layer_subtree(&self, l: u32, frames: &mut Vec<FrameId>, layers: &mut Vec<LayerId>) {
        layers.push(LayerId::new(l, self.layer_generation[l as usize]));
        for &f in &self.layer_children[l as usize] {
            self.collect_frame_subtree(f, frames, layers);
        }
    }

    /// Frees a frame slot and everything nested inside it.
    fn free_frame(&mut self, f: u32) {
        let hosted: Vec<u32> = core::mem::take(&mut self.frame_layers[f as usize]);
        for l in hosted {
            self.free_layer(l);
        }
        self.dirty.remove_key(frame_key(f));
        self.frame_data[f as usize] = None;
        self.frame_generation[f as usize] += 1;
        self.frame_free.push(f);
    }

    /// Frees a layer slot and everything nested inside it.
    fn free_layer(&mut self, l: u32) {
        let children: Vec<u32> = core::mem::take(&mut self.layer_children[l as usize]);
        for f in children {
            self.free_frame(f);
        }
        self.dirty.remove_key(layer_key(l));
        self.layer_generation[l as usize] += 1;
        self.layer_free.push(l);
    }

    /// Extracts a frame's name as an owned string (event emission helper).
    #[must_use]
    pub(crate) fn frame_name_owned(&self, frame: FrameId) -> String {
        String::from(self.frame_name(frame))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn tree_with_layer() -> (SceneTree, StageId, LayerId) {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let layer = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        (tree, stage, layer)
    }

    #[test]
    fn add_and_remove_frame() {
        let (mut tree, _, layer) = tree_with_layer();
        let frame = tree.add_frame(layer, FrameConfig::new("a"), Size::new(800.0, 600.0));
        assert!(tree.is_frame_alive(frame));
        assert_eq!(tree.frame_name(frame), "a");

        tree.remove_frame(frame);
        assert!(!tree.is_frame_alive(frame));
        assert_eq!(tree.child_count(layer), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let (mut tree, _, layer) = tree_with_layer();
        let first = tree.add_frame(layer, FrameConfig::new("a"), Size::ZERO);
        tree.set_frame_attached(first);
        tree.remove_frame(first);
        let second = tree.add_frame(layer, FrameConfig::new("b"), Size::ZERO);

        assert_eq!(first.index(), second.index(), "slot is recycled");
        assert_ne!(first.generation(), second.generation());
        assert!(!tree.is_frame_alive(first));
        assert!(tree.is_frame_alive(second));
        assert!(!tree.is_frame_attached(second), "flags reset on reuse");
    }

    #[test]
    #[should_panic(expected = "stale FrameId")]
    fn stale_frame_handle_panics() {
        let (mut tree, _, layer) = tree_with_layer();
        let frame = tree.add_frame(layer, FrameConfig::new("a"), Size::ZERO);
        tree.remove_frame(frame);
        let _ = tree.frame_name(frame);
    }

    #[test]
    fn add_layer_on_stale_host_errors() {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(100.0, 100.0));
        tree.remove_stage(stage);
        assert_eq!(
            tree.add_layer(Host::Stage(stage), LayerConfig::default()),
            Err(NavigationError::InvalidHost)
        );
    }

    #[test]
    fn children_keep_sibling_order() {
        let (mut tree, _, layer) = tree_with_layer();
        let a = tree.add_frame(layer, FrameConfig::new("a"), Size::ZERO);
        let c = tree.add_frame(layer, FrameConfig::new("c"), Size::ZERO);
        let b = tree.insert_frame(layer, 1, FrameConfig::new("b"), Size::ZERO);

        let kids: Vec<_> = tree.children(layer).collect();
        assert_eq!(kids, vec![a, b, c]);
        assert_eq!(tree.position_of(layer, b), Some(1));
        assert_eq!(tree.child_at(layer, 2), c);
    }

    #[test]
    fn find_frame_prefers_sibling_order_and_scan_is_deterministic() {
        let (mut tree, stage, layer) = tree_with_layer();
        let other = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let own = tree.add_frame(layer, FrameConfig::new("hero"), Size::ZERO);
        let foreign = tree.add_frame(other, FrameConfig::new("hero"), Size::ZERO);

        assert_eq!(tree.find_frame(layer, "hero"), Some(own));
        assert_eq!(tree.find_frame(other, "hero"), Some(foreign));
        assert_eq!(tree.find_frame_anywhere("hero"), Some(own), "slot order");
        assert_eq!(tree.find_frame(layer, "missing"), None);
    }

    #[test]
    fn move_frame_reparents_and_reorders() {
        let (mut tree, stage, source) = tree_with_layer();
        let dest = tree
            .add_layer(Host::Stage(stage), LayerConfig::default())
            .unwrap();
        let a = tree.add_frame(source, FrameConfig::new("a"), Size::ZERO);
        let b = tree.add_frame(dest, FrameConfig::new("b"), Size::ZERO);

        tree.move_frame(a, dest, Some(0));

        assert_eq!(tree.child_count(source), 0);
        assert_eq!(tree.children(dest).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.layer_of(a), dest);
    }

    #[test]
    fn removal_cascades_through_nested_layers() {
        let (mut tree, _, layer) = tree_with_layer();
        let outer = tree.add_frame(layer, FrameConfig::new("outer"), Size::ZERO);
        let nested = tree
            .add_layer(Host::Frame(outer), LayerConfig::default())
            .unwrap();
        let inner = tree.add_frame(nested, FrameConfig::new("inner"), Size::ZERO);

        let (frames, layers) = tree.subtree_of_frame(outer);
        assert_eq!(frames, vec![outer, inner]);
        assert_eq!(layers, vec![nested]);

        tree.remove_frame(outer);
        assert!(!tree.is_frame_alive(outer));
        assert!(!tree.is_layer_alive(nested));
        assert!(!tree.is_frame_alive(inner));
    }

    #[test]
    fn viewport_of_nested_layer_is_host_frame_size() {
        let (mut tree, _, layer) = tree_with_layer();
        let outer = tree.add_frame(layer, FrameConfig::new("outer"), Size::new(400.0, 300.0));
        let nested = tree
            .add_layer(Host::Frame(outer), LayerConfig::default())
            .unwrap();

        assert_eq!(tree.viewport_of(layer), Size::new(800.0, 600.0));
        assert_eq!(tree.viewport_of(nested), Size::new(400.0, 300.0));
    }

    #[test]
    fn stage_resize_invalidates_cached_data_below() {
        let (mut tree, stage, layer) = tree_with_layer();
        let frame = tree.add_frame(layer, FrameConfig::new("a"), Size::new(800.0, 600.0));
        let data = TransformData::compute(
            tree.viewport_of(layer),
            tree.frame_size(frame),
            tree.frame_config(frame),
            tree.layer_config(layer),
            None,
        );
        tree.set_transform_data(frame, data);
        let _ = tree.drain_stale();
        assert!(tree.transform_data(frame).is_some());

        tree.set_stage_size(stage, Size::new(1024.0, 768.0));
        let invalidated = tree.drain_stale();

        assert!(invalidated.frames.contains(&frame), "cascade reached frame");
        assert!(invalidated.layers.contains(&layer));
        assert!(tree.transform_data(frame).is_none(), "cache dropped");
    }

    #[test]
    fn frame_resize_invalidates_nested_subtree() {
        let (mut tree, _, layer) = tree_with_layer();
        let outer = tree.add_frame(layer, FrameConfig::new("outer"), Size::new(400.0, 300.0));
        let nested = tree
            .add_layer(Host::Frame(outer), LayerConfig::default())
            .unwrap();
        let inner = tree.add_frame(nested, FrameConfig::new("inner"), Size::new(400.0, 300.0));
        let _ = tree.drain_stale();

        tree.set_frame_size(outer, Size::new(500.0, 500.0));
        let invalidated = tree.drain_stale();

        assert!(invalidated.frames.contains(&outer));
        assert!(invalidated.frames.contains(&inner), "nested frame affected");
        assert!(invalidated.layers.contains(&nested));
    }

    #[test]
    fn config_update_drops_only_own_cache() {
        let (mut tree, _, layer) = tree_with_layer();
        let a = tree.add_frame(layer, FrameConfig::new("a"), Size::new(800.0, 600.0));
        let b = tree.add_frame(layer, FrameConfig::new("b"), Size::new(800.0, 600.0));
        for frame in [a, b] {
            let data = TransformData::compute(
                tree.viewport_of(layer),
                tree.frame_size(frame),
                tree.frame_config(frame),
                tree.layer_config(layer),
                None,
            );
            tree.set_transform_data(frame, data);
        }
        let _ = tree.drain_stale();

        let mut config = tree.frame_config(a).clone();
        config.start_position = crate::config::StartPosition::Center;
        tree.update_frame_config(a, config);
        let invalidated = tree.drain_stale();

        assert_eq!(invalidated.frames, vec![a]);
        assert!(tree.transform_data(a).is_none());
        assert!(tree.transform_data(b).is_some(), "sibling cache survives");
    }
}

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`EventSink`] and encodes events into a
//! `Vec<u8>` as little-endian records with length-prefixed names. [`decode`]
//! reads them back as an iterator of [`RecordedEvent`].
//!
//! Layer and frame handles are stored as their slot indices; generations are
//! not preserved, so a recording identifies nodes only within the run that
//! produced it.

use strata_core::events::{
    BeforeTransitionEvent, ChildAddedEvent, ChildRemovedEvent, EventSink, TransitionFinishedEvent,
    TransitionPreparedEvent, TransitionStartedEvent,
};
use strata_core::time::Timestamp;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_BEFORE: u8 = 1;
const TAG_STARTED: u8 = 2;
const TAG_PREPARED: u8 = 3;
const TAG_FINISHED: u8 = 4;
const TAG_CHILD_ADDED: u8 = 5;
const TAG_CHILD_REMOVED: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// An [`EventSink`] that encodes events into a compact binary buffer.
///
/// The navigator takes its sink by value; wrap the recorder in
/// `Rc<RefCell<..>>` and hand over a clone to read the bytes back afterwards.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "frame names are far shorter than u32::MAX bytes"
        )]
        let len = s.len() as u32;
        self.write_u32(len);
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn write_option_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }
}

impl EventSink for RecorderSink {
    fn on_before_transition(&mut self, e: &BeforeTransitionEvent<'_>) {
        self.write_u8(TAG_BEFORE);
        self.write_u32(e.layer.index());
        self.write_option_str(e.target);
        self.write_u64(e.generation);
        self.write_u64(e.at.nanos());
    }

    fn on_transition_started(&mut self, e: &TransitionStartedEvent<'_>) {
        self.write_u8(TAG_STARTED);
        self.write_u32(e.layer.index());
        self.write_option_str(e.frame);
        self.write_u64(e.generation);
        self.write_u64(e.at.nanos());
    }

    fn on_transition_prepared(&mut self, e: &TransitionPreparedEvent) {
        self.write_u8(TAG_PREPARED);
        self.write_u32(e.layer.index());
        self.write_u64(e.generation);
        self.write_u64(e.at.nanos());
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
        self.write_u8(TAG_FINISHED);
        self.write_u32(e.layer.index());
        self.write_option_str(e.frame);
        self.write_u64(e.generation);
        self.write_u64(e.at.nanos());
    }

    fn on_child_added(&mut self, e: &ChildAddedEvent<'_>) {
        self.write_u8(TAG_CHILD_ADDED);
        self.write_u32(e.layer.index());
        self.write_u32(e.frame.index());
        self.write_str(e.name);
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent<'_>) {
        self.write_u8(TAG_CHILD_REMOVED);
        self.write_u32(e.layer.index());
        self.write_u32(e.frame.index());
        self.write_str(e.name);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A navigation request was accepted.
    Before {
        /// Layer slot index.
        layer: u32,
        /// Resolved target name; `None` for a transition to no frame.
        target: Option<String>,
        /// Transition generation.
        generation: u64,
        /// When the request was accepted.
        at: Timestamp,
    },
    /// The layer switched to the target frame.
    Started {
        /// Layer slot index.
        layer: u32,
        /// New current frame name.
        frame: Option<String>,
        /// Transition generation.
        generation: u64,
        /// When the switch happened.
        at: Timestamp,
    },
    /// All gate parties finished preparing.
    Prepared {
        /// Layer slot index.
        layer: u32,
        /// Transition generation.
        generation: u64,
        /// When the gate released.
        at: Timestamp,
    },
    /// A transition's animation completed.
    Finished {
        /// Layer slot index.
        layer: u32,
        /// The frame that is now current.
        frame: Option<String>,
        /// Transition generation.
        generation: u64,
        /// When the animation settled.
        at: Timestamp,
    },
    /// A frame joined a layer.
    ChildAdded {
        /// Layer slot index.
        layer: u32,
        /// Frame slot index.
        frame: u32,
        /// Frame name.
        name: String,
    },
    /// A frame left a layer.
    ChildRemoved {
        /// Layer slot index.
        layer: u32,
        /// Frame slot index.
        frame: u32,
        /// Frame name.
        name: String,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_str(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn read_option_str(&mut self) -> Option<Option<String>> {
        match self.read_u8()? {
            0 => Some(None),
            _ => Some(Some(self.read_str()?)),
        }
    }

    fn decode_before(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Before {
            layer: self.read_u32()?,
            target: self.read_option_str()?,
            generation: self.read_u64()?,
            at: Timestamp(self.read_u64()?),
        })
    }

    fn decode_started(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Started {
            layer: self.read_u32()?,
            frame: self.read_option_str()?,
            generation: self.read_u64()?,
            at: Timestamp(self.read_u64()?),
        })
    }

    fn decode_prepared(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Prepared {
            layer: self.read_u32()?,
            generation: self.read_u64()?,
            at: Timestamp(self.read_u64()?),
        })
    }

    fn decode_finished(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Finished {
            layer: self.read_u32()?,
            frame: self.read_option_str()?,
            generation: self.read_u64()?,
            at: Timestamp(self.read_u64()?),
        })
    }

    fn decode_child_added(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChildAdded {
            layer: self.read_u32()?,
            frame: self.read_u32()?,
            name: self.read_str()?,
        })
    }

    fn decode_child_removed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChildRemoved {
            layer: self.read_u32()?,
            frame: self.read_u32()?,
            name: self.read_str()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_BEFORE => self.decode_before(),
            TAG_STARTED => self.decode_started(),
            TAG_PREPARED => self.decode_prepared(),
            TAG_FINISHED => self.decode_finished(),
            TAG_CHILD_ADDED => self.decode_child_added(),
            TAG_CHILD_REMOVED => self.decode_child_removed(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

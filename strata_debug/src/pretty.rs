// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable event output.
//!
//! [`PrettyPrintSink`] implements [`EventSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).
//! Timestamps are printed as milliseconds since the embedder's epoch.

use std::io::Write;

use strata_core::events::{
    BeforeTransitionEvent, ChildAddedEvent, ChildRemovedEvent, EventSink, TransitionFinishedEvent,
    TransitionPreparedEvent, TransitionStartedEvent,
};
use strata_core::time::Timestamp;

/// Writes human-readable event lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn ms(t: Timestamp) -> f64 {
    t.nanos() as f64 / 1_000_000.0
}

impl<W: Write> EventSink for PrettyPrintSink<W> {
    fn on_before_transition(&mut self, e: &BeforeTransitionEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[before] layer={} target={} gen={} at={:.1}ms",
            e.layer.index(),
            e.target.unwrap_or("-"),
            e.generation,
            ms(e.at),
        );
    }

    fn on_transition_started(&mut self, e: &TransitionStartedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[started] layer={} frame={} gen={} at={:.1}ms",
            e.layer.index(),
            e.frame.unwrap_or("-"),
            e.generation,
            ms(e.at),
        );
    }

    fn on_transition_prepared(&mut self, e: &TransitionPreparedEvent) {
        let _ = writeln!(
            self.writer,
            "[prepared] layer={} gen={} at={:.1}ms",
            e.layer.index(),
            e.generation,
            ms(e.at),
        );
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[finished] layer={} frame={} gen={} at={:.1}ms",
            e.layer.index(),
            e.frame.unwrap_or("-"),
            e.generation,
            ms(e.at),
        );
    }

    fn on_child_added(&mut self, e: &ChildAddedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[child:added] layer={} frame={} name={}",
            e.layer.index(),
            e.frame.index(),
            e.name,
        );
    }

    fn on_child_removed(&mut self, e: &ChildRemovedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[child:removed] layer={} frame={} name={}",
            e.layer.index(),
            e.frame.index(),
            e.name,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use strata_core::config::{FrameConfig, LayerConfig};
    use strata_core::kurbo::Size;
    use strata_core::tree::{Host, LayerId, SceneTree};

    fn sample_layer() -> LayerId {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let layer = tree.add_layer(Host::Stage(stage), LayerConfig::default()).unwrap();
        let _ = tree.add_frame(layer, FrameConfig::new("a"), Size::new(800.0, 600.0));
        layer
    }

    #[test]
    fn pretty_print_before_transition() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_before_transition(&BeforeTransitionEvent {
            layer: sample_layer(),
            target: Some("intro"),
            generation: 1,
            at: Timestamp::from_millis(120),
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[before]"), "got: {output}");
        assert!(output.contains("target=intro"), "got: {output}");
        assert!(output.contains("at=120.0ms"), "got: {output}");
    }

    #[test]
    fn no_frame_prints_a_dash() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transition_finished(&TransitionFinishedEvent {
            layer: sample_layer(),
            frame: None,
            generation: 2,
            at: Timestamp::ZERO,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("frame=-"), "got: {output}");
    }
}

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each transition becomes an async `b`/`e` pair keyed by its generation, so
//! overlapping and superseded transitions show up as separate (possibly
//! unterminated) spans. Everything else becomes instant events.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::time::Timestamp;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// # Errors
///
/// Returns any error produced by the writer.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Before {
                layer,
                target,
                generation,
                at,
            } => {
                events.push(json!({
                    "ph": "b",
                    "name": "transition",
                    "cat": "nav",
                    "id": generation,
                    "ts": us(at),
                    "pid": 0,
                    "tid": layer,
                    "args": {
                        "target": target,
                    }
                }));
            }
            RecordedEvent::Started {
                layer,
                frame,
                generation,
                at,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "started",
                    "cat": "nav",
                    "ts": us(at),
                    "pid": 0,
                    "tid": layer,
                    "s": "t",
                    "args": {
                        "frame": frame,
                        "generation": generation,
                    }
                }));
            }
            RecordedEvent::Prepared {
                layer,
                generation,
                at,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "prepared",
                    "cat": "nav",
                    "ts": us(at),
                    "pid": 0,
                    "tid": layer,
                    "s": "t",
                    "args": {
                        "generation": generation,
                    }
                }));
            }
            RecordedEvent::Finished {
                layer,
                frame,
                generation,
                at,
            } => {
                events.push(json!({
                    "ph": "e",
                    "name": "transition",
                    "cat": "nav",
                    "id": generation,
                    "ts": us(at),
                    "pid": 0,
                    "tid": layer,
                    "args": {
                        "frame": frame,
                    }
                }));
            }
            RecordedEvent::ChildAdded { layer, frame, name } => {
                events.push(json!({
                    "ph": "i",
                    "name": "child_added",
                    "cat": "tree",
                    "ts": 0,
                    "pid": 0,
                    "tid": layer,
                    "s": "t",
                    "args": {
                        "frame": frame,
                        "name": name,
                    }
                }));
            }
            RecordedEvent::ChildRemoved { layer, frame, name } => {
                events.push(json!({
                    "ph": "i",
                    "name": "child_removed",
                    "cat": "tree",
                    "ts": 0,
                    "pid": 0,
                    "tid": layer,
                    "s": "t",
                    "args": {
                        "frame": frame,
                        "name": name,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: Timestamp) -> f64 {
    t.nanos() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use strata_core::config::{FrameConfig, LayerConfig};
    use strata_core::events::{
        BeforeTransitionEvent, EventSink, TransitionFinishedEvent, TransitionStartedEvent,
    };
    use strata_core::kurbo::Size;
    use strata_core::tree::{Host, LayerId, SceneTree};

    use crate::recorder::RecorderSink;

    fn sample_layer() -> LayerId {
        let mut tree = SceneTree::new();
        let stage = tree.add_stage(Size::new(800.0, 600.0));
        let layer = tree.add_layer(Host::Stage(stage), LayerConfig::default()).unwrap();
        let _ = tree.add_frame(layer, FrameConfig::new("a"), Size::new(800.0, 600.0));
        layer
    }

    #[test]
    fn export_produces_valid_json() {
        let layer = sample_layer();
        let mut rec = RecorderSink::new();
        rec.on_before_transition(&BeforeTransitionEvent {
            layer,
            target: Some("detail"),
            generation: 1,
            at: Timestamp::from_millis(10),
        });
        rec.on_transition_started(&TransitionStartedEvent {
            layer,
            frame: Some("detail"),
            generation: 1,
            at: Timestamp::from_millis(10),
        });
        rec.on_transition_finished(&TransitionFinishedEvent {
            layer,
            frame: Some("detail"),
            generation: 1,
            at: Timestamp::from_millis(310),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        // The transition is an async begin/end pair keyed by generation.
        assert_eq!(parsed[0]["ph"], "b");
        assert_eq!(parsed[0]["name"], "transition");
        assert_eq!(parsed[0]["id"], 1);
        assert_eq!(parsed[0]["args"]["target"], "detail");

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "started");

        assert_eq!(parsed[2]["ph"], "e");
        assert_eq!(parsed[2]["id"], 1);
        // 310ms in microseconds.
        assert_eq!(parsed[2]["ts"], 310_000.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}

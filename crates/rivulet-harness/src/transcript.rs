#![forbid(unsafe_code)]

//! JSONL transcripts of recorded streams.
//!
//! Each line is one JSON object with a deterministic `ts` (`T000000`,
//! `T000001`, ...), the run id, and a `step` name. Recorder output is
//! appended with one line per event so a CI log can be diffed between runs.

use std::fmt;

use serde_json::{Map, Value, json};

use crate::recorder::Recorder;
use rivulet_core::Event;

/// True when transcripts should be printed (`E2E_JSONL` or `CI` set).
pub fn jsonl_enabled() -> bool {
    std::env::var("E2E_JSONL").is_ok() || std::env::var("CI").is_ok()
}

/// An ordered list of JSONL records.
#[derive(Debug, Clone)]
pub struct Transcript {
    run_id: String,
    next_ts: u64,
    lines: Vec<String>,
}

impl Transcript {
    /// An empty transcript for `run_id`. Timestamps start at `T000000`.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            next_ts: 0,
            lines: Vec::new(),
        }
    }

    /// The run id stamped on every record.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn timestamp(&mut self) -> String {
        let ts = format!("T{:06}", self.next_ts);
        self.next_ts += 1;
        ts
    }

    /// Append a record for `step` with extra `fields`.
    pub fn step(&mut self, step: &str, fields: &[(&str, Value)]) {
        let mut obj = Map::new();
        obj.insert("ts".into(), Value::String(self.timestamp()));
        obj.insert("run".into(), Value::String(self.run_id.clone()));
        obj.insert("step".into(), Value::String(step.to_string()));
        for (key, value) in fields {
            obj.insert((*key).to_string(), value.clone());
        }
        self.lines.push(Value::Object(obj).to_string());
    }

    /// Append one `event` record per event the recorder holds.
    pub fn record<T: Clone + fmt::Display>(&mut self, recorder: &Recorder<T>) {
        for entry in recorder.entries() {
            let (kind, detail) = match &entry.event {
                Event::Next(value) => ("next", Value::String(value.to_string())),
                Event::Error(err) => ("error", Value::String(err.to_string())),
                Event::Completed => ("completed", Value::Null),
            };
            self.step(
                "event",
                &[
                    ("observer", json!(recorder.label())),
                    ("seq", json!(entry.seq)),
                    ("kind", json!(kind)),
                    ("detail", detail),
                ],
            );
        }
    }

    /// Records written so far, one JSON object per entry.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All records joined with newlines, with a trailing newline.
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Print the transcript to stderr if [`jsonl_enabled`].
    pub fn emit(&self) {
        if jsonl_enabled() {
            eprint!("{}", self.to_jsonl());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::prelude::*;

    #[test]
    fn steps_get_sequential_timestamps() {
        let mut t = Transcript::new("unit");
        t.step("start", &[]);
        t.step("attach", &[("observer", json!("1)"))]);

        let first: Value = serde_json::from_str(&t.lines()[0]).expect("valid json");
        let second: Value = serde_json::from_str(&t.lines()[1]).expect("valid json");
        assert_eq!(first["ts"], "T000000");
        assert_eq!(second["ts"], "T000001");
        assert_eq!(second["observer"], "1)");
        assert_eq!(second["run"], "unit");
    }

    #[test]
    fn recorder_events_become_records() {
        let rec: Recorder<i32> = Recorder::new("obs");
        let _sub =
            Observable::<i32>::error(StreamError::msg("bad")).subscribe_observer(rec.clone());

        let mut t = Transcript::new("unit");
        t.record(&rec);
        assert_eq!(t.len(), 1);
        let line: Value = serde_json::from_str(&t.lines()[0]).expect("valid json");
        assert_eq!(line["kind"], "error");
        assert_eq!(line["detail"], "bad");
        assert_eq!(line["observer"], "obs");
        assert!(t.to_jsonl().ends_with('\n'));
    }
}

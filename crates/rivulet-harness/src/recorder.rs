#![forbid(unsafe_code)]

//! Recording observer.
//!
//! A [`Recorder`] is an [`Observer`] that stores every event it receives.
//! Recorders created with [`Recorder::sibling`] share one sequence clock,
//! so the interleaving of events across several observers can be
//! reconstructed with [`Recorder::interleave`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rivulet_core::{Event, Observer};

/// One event as seen by a recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded<T> {
    /// Position on the recorder's shared clock.
    pub seq: u64,
    pub event: Event<T>,
}

/// An observer that keeps everything it is told.
///
/// Cloning shares the same log.
pub struct Recorder<T> {
    label: Arc<str>,
    clock: Arc<AtomicU64>,
    log: Arc<Mutex<Vec<Recorded<T>>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            clock: Arc::clone(&self.clock),
            log: Arc::clone(&self.log),
        }
    }
}

impl<T: Clone> Recorder<T> {
    /// Create a recorder with its own clock.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            clock: Arc::new(AtomicU64::new(0)),
            log: Arc::default(),
        }
    }

    /// Create a recorder with a separate log that shares this recorder's
    /// clock.
    pub fn sibling(&self, label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            clock: Arc::clone(&self.clock),
            log: Arc::default(),
        }
    }

    /// The label prefixed to rendered lines.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<Recorded<T>> {
        self.log.lock().clone()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<Event<T>> {
        self.log.lock().iter().map(|r| r.event.clone()).collect()
    }

    /// The values of every `next` event.
    pub fn values(&self) -> Vec<T> {
        self.log
            .lock()
            .iter()
            .filter_map(|r| r.event.element().cloned())
            .collect()
    }

    /// The terminal event, if one arrived.
    pub fn terminal(&self) -> Option<Event<T>> {
        self.log
            .lock()
            .iter()
            .find(|r| r.event.is_terminal())
            .map(|r| r.event.clone())
    }

    /// True once an `error` or `completed` event has been recorded.
    pub fn is_terminated(&self) -> bool {
        self.terminal().is_some()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    /// Forget everything recorded so far. The clock keeps running.
    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl<T: Clone + fmt::Display> Recorder<T> {
    /// Recorded events rendered as `"<label> <event>"`.
    pub fn lines(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .map(|r| format!("{} {}", self.label, r.event))
            .collect()
    }

    /// Merge the lines of several recorders in clock order.
    ///
    /// Only meaningful for recorders that share a clock.
    pub fn interleave(recorders: &[&Recorder<T>]) -> Vec<String> {
        let mut merged: Vec<(u64, String)> = recorders
            .iter()
            .flat_map(|rec| {
                rec.entries()
                    .into_iter()
                    .map(move |r| (r.seq, format!("{} {}", rec.label, r.event)))
            })
            .collect();
        merged.sort_by_key(|(seq, _)| *seq);
        merged.into_iter().map(|(_, line)| line).collect()
    }
}

impl<T: Clone + Send + Sync> Observer<T> for Recorder<T> {
    fn on(&self, event: Event<T>) {
        let seq = self.clock.fetch_add(1, Ordering::Relaxed);
        self.log.lock().push(Recorded { seq, event });
    }
}

impl<T> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("label", &self.label)
            .field("len", &self.log.lock().len())
            .finish()
    }
}

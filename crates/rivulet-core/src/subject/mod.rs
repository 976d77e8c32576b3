#![forbid(unsafe_code)]

//! Subjects: event sinks that are also observables.
//!
//! | Variant | On attach | On `on_next` |
//! |---------|-----------|--------------|
//! | [`PublishSubject`] | nothing | fan-out |
//! | [`BehaviorSubject`] | latest value | store latest, fan-out |
//! | [`ReplaySubject`] | last N values | append to ring, fan-out |
//! | [`Variable`] | latest value | written through `set_value` |
//!
//! # Architecture
//!
//! All variants share one `SubjectCore<T, R>`, parameterized by a
//! `Retention` policy that decides which values are kept for late
//! attachers. The core state sits behind a `ReentrantMutex<RefCell<..>>`:
//!
//! - The re-entrant lock is the subject's single mutual-exclusion domain.
//!   It is held across attach (including replay), fan-out, and the terminal
//!   check-and-set, so emissions from different threads never interleave.
//! - The `RefCell` borrow is scoped to bookkeeping and never held while
//!   user callbacks run. A callback on the emitting thread may therefore
//!   dispose itself, subscribe, or emit again without deadlocking.
//!
//! # Invariants
//!
//! 1. Observers are notified in attach order.
//! 2. Each emission is delivered to the observer list as it was when the
//!    emission started; attaches and detaches made by callbacks apply from
//!    the next emission on.
//! 3. The terminal event is recorded once. Later emissions are no-ops, and
//!    later attachers receive the eligible replay followed by the stored
//!    terminal event.
//! 4. After `dispose()`, emissions are no-ops and attachers receive
//!    `error(SubjectDisposed)`.
//! 5. Re-entrant emission is delivered depth-first. If an observer emits
//!    `b` while handling `a`, the whole fan-out of `b` finishes before the
//!    observers after it in the list see `a`, so those observers receive
//!    `b` before `a`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;
use tracing::{debug, debug_span, trace};

use crate::config::SubjectConfig;
use crate::disposable::Disposable;
use crate::error::RxError;
use crate::event::{Element, Event};
use crate::observer::ObserverHandle;

mod behavior;
mod publish;
mod replay;
mod variable;

pub use behavior::BehaviorSubject;
pub use publish::PublishSubject;
pub use replay::ReplaySubject;
pub use variable::Variable;

/// Which values a subject keeps for observers that attach later.
trait Retention<T>: Send + 'static {
    /// Record a value that is about to be fanned out.
    fn retain(&mut self, value: &T);

    /// Values to deliver to a new observer, oldest first.
    fn replay(&self, terminated: bool) -> Vec<T>;

    /// Drop everything retained.
    fn clear(&mut self);
}

/// Keeps nothing.
struct NoRetention;

impl<T> Retention<T> for NoRetention {
    fn retain(&mut self, _value: &T) {}

    fn replay(&self, _terminated: bool) -> Vec<T> {
        Vec::new()
    }

    fn clear(&mut self) {}
}

/// Keeps the latest value; replayed only while the subject is live.
struct Latest<T> {
    value: T,
}

impl<T: Element> Retention<T> for Latest<T> {
    fn retain(&mut self, value: &T) {
        self.value = value.clone();
    }

    fn replay(&self, terminated: bool) -> Vec<T> {
        if terminated {
            Vec::new()
        } else {
            vec![self.value.clone()]
        }
    }

    // The latest value stays readable after dispose; `BehaviorSubject::value`
    // checks the disposed flag instead.
    fn clear(&mut self) {}
}

/// Bounded FIFO of the last `capacity` values; replayed even after the
/// subject terminates.
struct Ring<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }
}

impl<T: Element> Retention<T> for Ring<T> {
    fn retain(&mut self, value: &T) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value.clone());
    }

    fn replay(&self, _terminated: bool) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}

struct Entry<T> {
    id: u64,
    observer: ObserverHandle<T>,
}

struct SubjectState<T, R> {
    observers: Vec<Entry<T>>,
    next_id: u64,
    terminal: Option<Event<T>>,
    disposed: bool,
    retention: R,
}

/// Shared engine behind every subject variant.
struct SubjectCore<T, R> {
    state: ReentrantMutex<RefCell<SubjectState<T, R>>>,
    config: SubjectConfig,
    kind: &'static str,
}

enum AttachStep<T> {
    Rejected,
    Replay {
        values: Vec<T>,
        terminal: Option<Event<T>>,
    },
}

impl<T: Element, R: Retention<T>> SubjectCore<T, R> {
    fn new(kind: &'static str, retention: R, config: SubjectConfig) -> Arc<Self> {
        Arc::new(Self {
            state: ReentrantMutex::new(RefCell::new(SubjectState {
                observers: Vec::new(),
                next_id: 0,
                terminal: None,
                disposed: false,
                retention,
            })),
            config,
            kind,
        })
    }

    /// Record `event` and fan it out to a snapshot of the observer list.
    fn emit(&self, event: Event<T>) {
        let guard = self.state.lock();
        let snapshot: Vec<ObserverHandle<T>> = {
            let mut state = guard.borrow_mut();
            if state.disposed || state.terminal.is_some() {
                trace!(
                    kind = self.kind,
                    label = self.config.label(),
                    "emission after termination dropped"
                );
                return;
            }
            match &event {
                Event::Next(value) => {
                    state.retention.retain(value);
                    state.observers.iter().map(|e| e.observer.clone()).collect()
                }
                Event::Error(_) | Event::Completed => {
                    state.terminal = Some(event.clone());
                    debug!(
                        kind = self.kind,
                        label = self.config.label(),
                        observers = state.observers.len(),
                        error = matches!(event, Event::Error(_)),
                        "subject terminated"
                    );
                    std::mem::take(&mut state.observers)
                        .into_iter()
                        .map(|e| e.observer)
                        .collect()
                }
            }
        };

        let _span = self.config.trace_emissions.then(|| {
            debug_span!(
                "subject_emit",
                kind = self.kind,
                label = self.config.label(),
                observers = snapshot.len()
            )
            .entered()
        });
        for observer in &snapshot {
            observer.deliver(event.clone());
        }
        drop(guard);
    }

    /// Attach `observer`: replay retained values, then either register it
    /// or hand it the stored terminal event.
    fn attach(self: &Arc<Self>, observer: ObserverHandle<T>) -> Disposable {
        let guard = self.state.lock();
        let step = {
            let state = guard.borrow();
            if state.disposed {
                AttachStep::Rejected
            } else {
                AttachStep::Replay {
                    values: state.retention.replay(state.terminal.is_some()),
                    terminal: state.terminal.clone(),
                }
            }
        };

        let (values, terminal) = match step {
            AttachStep::Rejected => {
                observer.deliver(Event::Error(RxError::SubjectDisposed.into()));
                return Disposable::empty();
            }
            AttachStep::Replay { values, terminal } => (values, terminal),
        };

        for value in values {
            observer.deliver(Event::Next(value));
        }
        if let Some(terminal) = terminal {
            observer.deliver(terminal);
            return Disposable::empty();
        }

        // A replay callback on this thread may have terminated or disposed
        // the subject; re-check before registering.
        let registered = {
            let mut state = guard.borrow_mut();
            if state.disposed {
                Err(Event::Error(RxError::SubjectDisposed.into()))
            } else if let Some(terminal) = state.terminal.clone() {
                Err(terminal)
            } else {
                let id = state.next_id;
                state.next_id += 1;
                state.observers.push(Entry {
                    id,
                    observer: observer.clone(),
                });
                trace!(
                    kind = self.kind,
                    label = self.config.label(),
                    id,
                    observers = state.observers.len(),
                    "observer attached"
                );
                Ok(id)
            }
        };
        drop(guard);

        match registered {
            Ok(id) => {
                let core: Weak<Self> = Arc::downgrade(self);
                Disposable::new(move || {
                    if let Some(core) = core.upgrade() {
                        core.detach(id);
                    }
                })
            }
            Err(event) => {
                observer.deliver(event);
                Disposable::empty()
            }
        }
    }

    fn detach(&self, id: u64) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let before = state.observers.len();
        state.observers.retain(|e| e.id != id);
        if state.observers.len() != before {
            trace!(
                kind = self.kind,
                label = self.config.label(),
                id,
                observers = state.observers.len(),
                "observer detached"
            );
        }
    }

    /// Release observers and retained values. Later emissions are no-ops
    /// and later attachers are rejected.
    fn dispose(&self) {
        let guard = self.state.lock();
        let released = {
            let mut state = guard.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.retention.clear();
            std::mem::take(&mut state.observers)
        };
        debug!(
            kind = self.kind,
            label = self.config.label(),
            released = released.len(),
            "subject disposed"
        );
        drop(guard);
        // Dropped outside the lock: the handles may be the last owners of
        // user closures.
        drop(released);
    }

    fn observer_count(&self) -> usize {
        self.state.lock().borrow().observers.len()
    }

    fn is_terminated(&self) -> bool {
        self.state.lock().borrow().terminal.is_some()
    }

    fn is_disposed(&self) -> bool {
        self.state.lock().borrow().disposed
    }

    /// Read the state under the lock.
    fn inspect<U>(&self, f: impl FnOnce(&SubjectState<T, R>) -> U) -> U {
        let guard = self.state.lock();
        let state = guard.borrow();
        f(&state)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_evicts_oldest() {
        let mut ring = Ring::new(2);
        for v in 1..=3 {
            ring.retain(&v);
        }
        assert_eq!(ring.replay(false), vec![2, 3]);
        assert_eq!(ring.replay(true), vec![2, 3]);
    }

    #[test]
    fn zero_capacity_ring_keeps_nothing() {
        let mut ring = Ring::new(0);
        ring.retain(&1);
        assert!(ring.replay(false).is_empty());
    }

    #[test]
    fn latest_is_hidden_after_termination() {
        let mut latest = Latest { value: "init" };
        latest.retain(&"X");
        assert_eq!(latest.replay(false), vec!["X"]);
        assert!(latest.replay(true).is_empty());
    }

    #[test]
    fn no_retention_replays_nothing() {
        let mut none = NoRetention;
        Retention::<i32>::retain(&mut none, &1);
        assert!(Retention::<i32>::replay(&none, false).is_empty());
    }
}

#![forbid(unsafe_code)]

//! Observers and the per-subscription sink.
//!
//! # Design
//!
//! [`Observer<T>`] is the consumer capability set: one dispatch method,
//! [`Observer::on`], taking an [`Event`], plus `on_next`/`on_error`/
//! `on_completed` as provided sugar. Two adapters cover the common cases:
//!
//! - [`Callbacks<T>`]: optional split handlers; a missing handler is a no-op.
//! - [`FnObserver`]: a bare `Fn(Event<T>)` closure (see [`observer_fn`]).
//!
//! Every subscription wraps its observer in a `Sink`, which owns the
//! subscription's teardown and enforces the grammar: once a terminal event
//! has been forwarded, everything after it is dropped. Delivering the
//! terminal event also releases the subscription (teardown runs, then the
//! `on_disposed` hook fires).
//!
//! Producers reach the sink through an [`ObserverHandle`]. A handle also
//! drops events once its subscription has been disposed, so a producer
//! that keeps its handle alive cannot reach a subscriber that has left.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, ReentrantMutex};

use crate::disposable::Disposable;
use crate::error::StreamError;
use crate::event::Event;

/// A consumer of events.
pub trait Observer<T>: Send + Sync {
    /// Receive one event.
    fn on(&self, event: Event<T>);

    /// Receive a value.
    fn on_next(&self, value: T) {
        self.on(Event::Next(value));
    }

    /// Receive a terminal error.
    fn on_error(&self, error: StreamError) {
        self.on(Event::Error(error));
    }

    /// Receive terminal completion.
    fn on_completed(&self) {
        self.on(Event::Completed);
    }
}

impl<T, O: Observer<T> + ?Sized> Observer<T> for Arc<O> {
    fn on(&self, event: Event<T>) {
        (**self).on(event);
    }
}

impl<T, O: Observer<T> + ?Sized> Observer<T> for Box<O> {
    fn on(&self, event: Event<T>) {
        (**self).on(event);
    }
}

type NextFn<T> = Box<dyn Fn(T) + Send + Sync>;
type ErrorFn = Box<dyn Fn(StreamError) + Send + Sync>;
type CompletedFn = Box<dyn Fn() + Send + Sync>;
pub(crate) type DisposedFn = Box<dyn FnOnce() + Send + Sync>;

/// Split, optional event handlers.
///
/// ```
/// use rivulet_core::prelude::*;
///
/// let subject = PublishSubject::<i32>::new();
/// let _sub = subject.subscribe_with(
///     Callbacks::new()
///         .on_next(|v| println!("got {v}"))
///         .on_completed(|| println!("done")),
/// );
/// subject.on_next(1);
/// ```
pub struct Callbacks<T> {
    on_next: Option<NextFn<T>>,
    on_error: Option<ErrorFn>,
    on_completed: Option<CompletedFn>,
    on_disposed: Option<DisposedFn>,
}

impl<T> Callbacks<T> {
    /// No handlers; every event is ignored.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_next: None,
            on_error: None,
            on_completed: None,
            on_disposed: None,
        }
    }

    /// Handle values.
    #[must_use]
    pub fn on_next(mut self, f: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.on_next = Some(Box::new(f));
        self
    }

    /// Handle a terminal error.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(StreamError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Handle terminal completion.
    #[must_use]
    pub fn on_completed(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_completed = Some(Box::new(f));
        self
    }

    /// Run once when the subscription is torn down, whether by `dispose()`
    /// or after its terminal event.
    #[must_use]
    pub fn on_disposed(mut self, f: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_disposed = Some(Box::new(f));
        self
    }

    pub(crate) fn take_on_disposed(&mut self) -> Option<DisposedFn> {
        self.on_disposed.take()
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_next", &self.on_next.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .field("on_disposed", &self.on_disposed.is_some())
            .finish()
    }
}

impl<T> Observer<T> for Callbacks<T> {
    fn on(&self, event: Event<T>) {
        match event {
            Event::Next(value) => {
                if let Some(f) = &self.on_next {
                    f(value);
                }
            }
            Event::Error(err) => {
                if let Some(f) = &self.on_error {
                    f(err);
                }
            }
            Event::Completed => {
                if let Some(f) = &self.on_completed {
                    f();
                }
            }
        }
    }
}

/// Adapter turning a closure over [`Event`] into an [`Observer`].
pub struct FnObserver<F>(pub F);

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(Event<T>) + Send + Sync,
{
    fn on(&self, event: Event<T>) {
        (self.0)(event);
    }
}

impl<F> fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver").finish_non_exhaustive()
    }
}

/// Wrap a closure as an observer.
pub fn observer_fn<T, F>(f: F) -> FnObserver<F>
where
    F: Fn(Event<T>) + Send + Sync,
{
    FnObserver(f)
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Per-subscription state: grammar guard plus teardown ownership.
///
/// `gate` serializes forwarding across producer threads, so the stopped
/// check and the call into the observer happen as one step. It is
/// re-entrant because observers may emit into their own subscription.
pub(crate) struct Sink<T> {
    observer: Box<dyn Observer<T>>,
    gate: ReentrantMutex<()>,
    stopped: AtomicBool,
    disposed: AtomicBool,
    teardown: Mutex<Option<Disposable>>,
    on_disposed: Mutex<Option<DisposedFn>>,
}

impl<T> Sink<T> {
    pub(crate) fn new(
        observer: Box<dyn Observer<T>>,
        on_disposed: Option<DisposedFn>,
    ) -> Arc<Self> {
        Arc::new(Self {
            observer,
            gate: ReentrantMutex::new(()),
            stopped: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            teardown: Mutex::new(None),
            on_disposed: Mutex::new(on_disposed),
        })
    }

    /// Forward `event` unless a terminal event has already gone through.
    ///
    /// The teardown runs after the gate is released, so a teardown that
    /// waits on another lock never holds up producers blocked on this sink.
    pub(crate) fn deliver(&self, event: Event<T>) {
        let terminal = event.is_terminal();
        {
            let _gate = self.gate.lock();
            if terminal {
                if self.stopped.swap(true, Ordering::AcqRel) {
                    return;
                }
            } else if self.stopped.load(Ordering::Acquire) {
                return;
            }
            self.observer.on(event);
        }
        if terminal {
            self.dispose();
        }
    }

    /// Install the teardown returned by the source. If the subscription is
    /// already over (a synchronous source terminated inside `subscribe`),
    /// the teardown runs immediately.
    pub(crate) fn attach_teardown(&self, teardown: Disposable) {
        {
            let mut slot = self.teardown.lock();
            if !self.disposed.load(Ordering::Acquire) {
                *slot = Some(teardown);
                return;
            }
        }
        teardown.dispose();
    }

    pub(crate) fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let teardown = self.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown.dispose();
        }
        let hook = self.on_disposed.lock().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// The producer-facing side of one subscription.
///
/// Passed to [`crate::Observable::create`] builders. Cheap to clone and
/// safe to move to another thread.
pub struct ObserverHandle<T> {
    sink: Arc<Sink<T>>,
}

impl<T> Clone for ObserverHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<T> ObserverHandle<T> {
    pub(crate) fn new(sink: Arc<Sink<T>>) -> Self {
        Self { sink }
    }

    /// Emit one event. Ignored after a terminal event or after the
    /// subscriber has disposed.
    pub fn on(&self, event: Event<T>) {
        if self.sink.is_disposed() {
            return;
        }
        self.sink.deliver(event);
    }

    /// Emit a value.
    pub fn on_next(&self, value: T) {
        self.on(Event::Next(value));
    }

    /// Terminate with an error.
    pub fn on_error(&self, error: impl Into<StreamError>) {
        self.on(Event::Error(error.into()));
    }

    /// Terminate successfully.
    pub fn on_completed(&self) {
        self.on(Event::Completed);
    }

    /// True once the subscriber has disposed or the stream has terminated.
    /// Long-running producers can poll this to stop early.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.sink.is_disposed()
    }

    /// True once a terminal event has been delivered.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.sink.is_stopped()
    }

    /// Deliver through the grammar guard only. Subjects use this for fan-out
    /// so an observer removed mid-emission still receives the emission in
    /// progress.
    pub(crate) fn deliver(&self, event: Event<T>) {
        self.sink.deliver(event);
    }
}

impl<T> Observer<T> for ObserverHandle<T> {
    fn on(&self, event: Event<T>) {
        ObserverHandle::on(self, event);
    }
}

impl<T> fmt::Debug for ObserverHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("stopped", &self.sink.is_stopped())
            .field("disposed", &self.sink.is_disposed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Replay subject: a bounded history for late observers.

use std::fmt;
use std::sync::Arc;

use super::{Ring, SubjectCore};
use crate::config::SubjectConfig;
use crate::disposable::Disposable;
use crate::error::{RxError, StreamError};
use crate::event::{Element, Event};
use crate::observable::{Observable, ObservableType};
use crate::observer::{Observer, ObserverHandle};

/// A subject that replays up to the last `buffer_size` values.
///
/// A new observer receives the buffered values in their original order,
/// then live emissions. The buffer is FIFO: once full, each new value
/// evicts the oldest. After termination, new observers receive the full
/// buffer followed by the terminal event.
///
/// Keep in mind the buffer is held in memory for the subject's lifetime.
pub struct ReplaySubject<T> {
    core: Arc<SubjectCore<T, Ring<T>>>,
    buffer_size: usize,
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            buffer_size: self.buffer_size,
        }
    }
}

impl<T: Element> ReplaySubject<T> {
    /// Create a subject replaying up to `buffer_size` values. A size of
    /// zero replays nothing.
    #[must_use]
    pub fn create(buffer_size: usize) -> Self {
        Self::build(buffer_size, SubjectConfig::default())
    }

    /// Create a subject from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::MissingArgument`] if `config` has no replay
    /// buffer size.
    pub fn with_config(config: SubjectConfig) -> Result<Self, RxError> {
        let buffer_size = config.require_replay_buffer()?;
        Ok(Self::build(buffer_size, config))
    }

    fn build(buffer_size: usize, config: SubjectConfig) -> Self {
        Self {
            core: SubjectCore::new("replay", Ring::new(buffer_size), config),
            buffer_size,
        }
    }

    /// Maximum number of replayed values.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Values currently held for replay, oldest first.
    #[must_use]
    pub fn buffered(&self) -> Vec<T> {
        self.core
            .inspect(|state| state.retention.buffer.iter().cloned().collect())
    }

    /// Emit one event.
    pub fn on(&self, event: Event<T>) {
        self.core.emit(event);
    }

    /// Buffer a value and fan it out.
    pub fn on_next(&self, value: T) {
        self.core.emit(Event::Next(value));
    }

    /// Terminate with an error.
    pub fn on_error(&self, error: impl Into<StreamError>) {
        self.core.emit(Event::Error(error.into()));
    }

    /// Terminate successfully.
    pub fn on_completed(&self) {
        self.core.emit(Event::Completed);
    }

    /// Release observers and the buffer. Later emissions are ignored and
    /// later subscribers receive `error(SubjectDisposed)`.
    pub fn dispose(&self) {
        self.core.dispose();
    }

    /// Number of attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    /// True once `on_error` or `on_completed` has been called.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.core.is_terminated()
    }

    /// True once `dispose` has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl<T: Element> ObservableType<T> for ReplaySubject<T> {
    fn subscribe_handle(&self, observer: ObserverHandle<T>) -> Disposable {
        self.core.attach(observer)
    }

    fn as_observable(&self) -> Observable<T> {
        let core = Arc::clone(&self.core);
        Observable::create(move |observer| core.attach(observer))
    }
}

impl<T: Element> Observer<T> for ReplaySubject<T> {
    fn on(&self, event: Event<T>) {
        self.core.emit(event);
    }
}

impl<T: Element> fmt::Debug for ReplaySubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplaySubject")
            .field("buffer_size", &self.buffer_size)
            .field("buffered", &self.core.inspect(|s| s.retention.buffer.len()))
            .field("observers", &self.core.observer_count())
            .field("terminated", &self.core.is_terminated())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

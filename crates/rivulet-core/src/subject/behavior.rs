#![forbid(unsafe_code)]

//! Behavior subject: a live value that new observers receive first.

use std::fmt;
use std::sync::Arc;

use super::{Latest, SubjectCore};
use crate::config::SubjectConfig;
use crate::disposable::Disposable;
use crate::error::{RxError, StreamError};
use crate::event::{Element, Event};
use crate::observable::{Observable, ObservableType};
use crate::observer::{Observer, ObserverHandle};

/// A subject that always has a current value.
///
/// It must be seeded at construction. A new observer immediately receives
/// the latest value as `next`, then every later emission. After an error,
/// new observers receive the error instead of a value; after completion,
/// they receive `completed` only.
pub struct BehaviorSubject<T> {
    core: Arc<SubjectCore<T, Latest<T>>>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Element> BehaviorSubject<T> {
    /// Create a subject whose current value is `seed`.
    #[must_use]
    pub fn new(seed: T) -> Self {
        Self::with_config(seed, SubjectConfig::default())
    }

    /// Create a seeded subject with a log label and tracing options.
    #[must_use]
    pub fn with_config(seed: T, config: SubjectConfig) -> Self {
        Self {
            core: SubjectCore::new("behavior", Latest { value: seed }, config),
        }
    }

    /// The current value.
    ///
    /// # Errors
    ///
    /// - [`RxError::SubjectDisposed`] after `dispose()`.
    /// - [`RxError::Terminated`] if the subject terminated with an error.
    pub fn value(&self) -> Result<T, RxError> {
        self.core.inspect(|state| {
            if state.disposed {
                return Err(RxError::SubjectDisposed);
            }
            match &state.terminal {
                Some(Event::Error(err)) => Err(RxError::Terminated(err.clone())),
                _ => Ok(state.retention.value.clone()),
            }
        })
    }

    /// Latest value regardless of terminal or disposed state.
    pub(crate) fn latest(&self) -> T {
        self.core.inspect(|state| state.retention.value.clone())
    }

    /// Emit one event.
    pub fn on(&self, event: Event<T>) {
        self.core.emit(event);
    }

    /// Replace the current value and fan it out.
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

    /// Release all observers. Later emissions are ignored and later
    /// subscribers receive `error(SubjectDisposed)`.
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

impl<T: Element> ObservableType<T> for BehaviorSubject<T> {
    fn subscribe_handle(&self, observer: ObserverHandle<T>) -> Disposable {
        self.core.attach(observer)
    }

    fn as_observable(&self) -> Observable<T> {
        let core = Arc::clone(&self.core);
        Observable::create(move |observer| core.attach(observer))
    }
}

impl<T: Element> Observer<T> for BehaviorSubject<T> {
    fn on(&self, event: Event<T>) {
        self.core.emit(event);
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for BehaviorSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorSubject")
            .field("value", &self.latest())
            .field("observers", &self.core.observer_count())
            .field("terminated", &self.core.is_terminated())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Publish subject: pure fan-out, no replay.

use std::fmt;
use std::sync::Arc;

use super::{NoRetention, SubjectCore};
use crate::config::SubjectConfig;
use crate::disposable::Disposable;
use crate::error::StreamError;
use crate::event::{Element, Event};
use crate::observable::{Observable, ObservableType};
use crate::observer::{Observer, ObserverHandle};

/// Broadcasts events emitted after an observer attaches.
///
/// Once terminated, new observers immediately receive the stored terminal
/// event and nothing else.
///
/// Cloning shares the same subject.
pub struct PublishSubject<T> {
    core: Arc<SubjectCore<T, NoRetention>>,
}

impl<T> Clone for PublishSubject<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Element> PublishSubject<T> {
    /// Create a live subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SubjectConfig::default())
    }

    /// Create a subject with a log label and tracing options.
    #[must_use]
    pub fn with_config(config: SubjectConfig) -> Self {
        Self {
            core: SubjectCore::new("publish", NoRetention, config),
        }
    }

    /// Emit one event.
    pub fn on(&self, event: Event<T>) {
        self.core.emit(event);
    }

    /// Emit a value to every attached observer.
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

impl<T: Element> Default for PublishSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> ObservableType<T> for PublishSubject<T> {
    fn subscribe_handle(&self, observer: ObserverHandle<T>) -> Disposable {
        self.core.attach(observer)
    }

    fn as_observable(&self) -> Observable<T> {
        let core = Arc::clone(&self.core);
        Observable::create(move |observer| core.attach(observer))
    }
}

impl<T: Element> Observer<T> for PublishSubject<T> {
    fn on(&self, event: Event<T>) {
        self.core.emit(event);
    }
}

impl<T: Element> fmt::Debug for PublishSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishSubject")
            .field("observers", &self.core.observer_count())
            .field("terminated", &self.core.is_terminated())
            .field("disposed", &self.core.is_disposed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Maybe: one value, nothing, or one error.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use super::OneShot;
use crate::disposable::Disposable;
use crate::error::StreamError;
use crate::event::{Element, Event};
use crate::observable::{Observable, ObservableType};

/// The outcome of a [`Maybe`].
#[derive(Debug, Clone, PartialEq)]
pub enum MaybeEvent<T> {
    Success(T),
    Completed,
    Error(StreamError),
}

impl<T: fmt::Display> fmt::Display for MaybeEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => write!(f, "success({value})"),
            Self::Completed => f.write_str("completed"),
            Self::Error(err) => write!(f, "error({err})"),
        }
    }
}

/// Producer side of a [`Maybe`]. Only the first call has an effect.
pub struct MaybeEmitter<T> {
    inner: OneShot<T>,
}

impl<T> Clone for MaybeEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Element> MaybeEmitter<T> {
    /// Resolve with `value`.
    pub fn success(&self, value: T) {
        self.inner.success(value);
    }

    /// Resolve without a value.
    pub fn completed(&self) {
        self.inner.completed();
    }

    /// Resolve with `error`.
    pub fn error(&self, error: impl Into<StreamError>) {
        self.inner.error(error.into());
    }

    /// Resolve with an already-built outcome.
    pub fn emit(&self, event: MaybeEvent<T>) {
        match event {
            MaybeEvent::Success(value) => self.success(value),
            MaybeEvent::Completed => self.completed(),
            MaybeEvent::Error(err) => self.error(err),
        }
    }

    /// True once the subscriber is gone or the maybe has resolved.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl<T> fmt::Debug for MaybeEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaybeEmitter").finish_non_exhaustive()
    }
}

/// An observable that resolves exactly once, with a value, with nothing, or
/// with an error.
pub struct Maybe<T> {
    source: Observable<T>,
}

impl<T> Clone for Maybe<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T> fmt::Debug for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maybe").finish_non_exhaustive()
    }
}

impl<T: Element> Maybe<T> {
    /// Build a maybe from a producer closure, run once per subscription.
    pub fn create<F>(subscribe: F) -> Self
    where
        F: Fn(MaybeEmitter<T>) -> Disposable + Send + Sync + 'static,
    {
        Self {
            source: Observable::create(move |handle| {
                subscribe(MaybeEmitter {
                    inner: OneShot::new(handle, "maybe"),
                })
            }),
        }
    }

    /// Resolve with `value` on every subscription.
    pub fn just(value: T) -> Self {
        Self::create(move |emitter| {
            emitter.success(value.clone());
            Disposable::empty()
        })
    }

    /// Complete without a value.
    pub fn empty() -> Self {
        Self::create(|emitter| {
            emitter.completed();
            Disposable::empty()
        })
    }

    /// Fail with `error` on every subscription.
    pub fn error(error: impl Into<StreamError>) -> Self {
        let error = error.into();
        Self::create(move |emitter| {
            emitter.error(error.clone());
            Disposable::empty()
        })
    }

    /// Subscribe a handler receiving the outcome.
    pub fn subscribe<F>(&self, on_event: F) -> Disposable
    where
        F: Fn(MaybeEvent<T>) + Send + Sync + 'static,
    {
        // A value is always followed by `completed`; report it once.
        let seen_value = AtomicBool::new(false);
        self.source.subscribe(move |event| match event {
            Event::Next(value) => {
                seen_value.store(true, Ordering::Release);
                on_event(MaybeEvent::Success(value));
            }
            Event::Completed => {
                if !seen_value.load(Ordering::Acquire) {
                    on_event(MaybeEvent::Completed);
                }
            }
            Event::Error(err) => on_event(MaybeEvent::Error(err)),
        })
    }

    /// Subscribe a success handler; the other outcomes are ignored.
    pub fn subscribe_success<F>(&self, on_success: F) -> Disposable
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let MaybeEvent::Success(value) = event {
                on_success(value);
            }
        })
    }

    /// Subscribe a handler for the empty outcome.
    pub fn subscribe_completed<F>(&self, on_completed: F) -> Disposable
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let MaybeEvent::Completed = event {
                on_completed();
            }
        })
    }

    /// Subscribe an error handler; the other outcomes are ignored.
    pub fn subscribe_error<F>(&self, on_error: F) -> Disposable
    where
        F: Fn(StreamError) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let MaybeEvent::Error(err) = event {
                on_error(err);
            }
        })
    }

    /// The underlying observable: `next(v), completed`, `completed`, or
    /// `error(e)`.
    #[must_use]
    pub fn as_observable(&self) -> Observable<T> {
        self.source.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn outcomes(maybe: &Maybe<&'static str>) -> Vec<MaybeEvent<&'static str>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let _sub = maybe.subscribe(move |event| l.lock().push(event));
        let out = log.lock().clone();
        out
    }

    #[test]
    fn success_is_reported_without_trailing_completion() {
        assert_eq!(outcomes(&Maybe::just("v")), vec![MaybeEvent::Success("v")]);
    }

    #[test]
    fn empty_completes() {
        assert_eq!(outcomes(&Maybe::empty()), vec![MaybeEvent::Completed]);
    }

    #[test]
    fn completed_then_success_is_completed() {
        let maybe = Maybe::create(|emitter| {
            emitter.completed();
            emitter.success("late");
            Disposable::empty()
        });
        assert_eq!(outcomes(&maybe), vec![MaybeEvent::Completed]);
    }

    #[test]
    fn error_wins_when_first() {
        let maybe = Maybe::create(|emitter| {
            emitter.emit(MaybeEvent::Error(StreamError::msg("e")));
            emitter.emit(MaybeEvent::Completed);
            Disposable::empty()
        });
        assert_eq!(
            outcomes(&maybe),
            vec![MaybeEvent::Error(StreamError::msg("e"))]
        );
    }

    #[test]
    fn completed_handler_not_called_on_success() {
        let hits = Arc::new(Mutex::new(0));
        let h = Arc::clone(&hits);
        let _a = Maybe::just(1).subscribe_completed(move || *h.lock() += 1);
        let h = Arc::clone(&hits);
        let _b = Maybe::<i32>::empty().subscribe_completed(move || *h.lock() += 1);
        assert_eq!(*hits.lock(), 1);
    }
}

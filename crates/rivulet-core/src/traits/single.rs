#![forbid(unsafe_code)]

//! Single: one value or one error.

use std::fmt;

use super::OneShot;
use crate::disposable::Disposable;
use crate::error::StreamError;
use crate::event::{Element, Event};
use crate::observable::{Observable, ObservableType};

/// The outcome of a [`Single`].
#[derive(Debug, Clone, PartialEq)]
pub enum SingleEvent<T> {
    Success(T),
    Error(StreamError),
}

impl<T> SingleEvent<T> {
    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<T, StreamError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(err) => Err(err),
        }
    }
}

impl<T: fmt::Display> fmt::Display for SingleEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => write!(f, "success({value})"),
            Self::Error(err) => write!(f, "error({err})"),
        }
    }
}

/// Producer side of a [`Single`]. Only the first call has an effect.
pub struct SingleEmitter<T> {
    inner: OneShot<T>,
}

impl<T> Clone for SingleEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Element> SingleEmitter<T> {
    /// Resolve with `value`.
    pub fn success(&self, value: T) {
        self.inner.success(value);
    }

    /// Resolve with `error`.
    pub fn error(&self, error: impl Into<StreamError>) {
        self.inner.error(error.into());
    }

    /// Resolve with an already-built outcome.
    pub fn emit(&self, event: SingleEvent<T>) {
        match event {
            SingleEvent::Success(value) => self.success(value),
            SingleEvent::Error(err) => self.error(err),
        }
    }

    /// True once the subscriber is gone or the single has resolved.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl<T> fmt::Debug for SingleEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleEmitter").finish_non_exhaustive()
    }
}

/// An observable that resolves exactly once, with a value or an error.
pub struct Single<T> {
    source: Observable<T>,
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single").finish_non_exhaustive()
    }
}

impl<T: Element> Single<T> {
    /// Build a single from a producer closure, run once per subscription.
    ///
    /// ```
    /// use rivulet_core::prelude::*;
    ///
    /// let answer = Single::create(|emitter| {
    ///     emitter.success(42);
    ///     emitter.success(43); // ignored
    ///     Disposable::empty()
    /// });
    /// let _sub = answer.subscribe_success(|v| assert_eq!(v, 42));
    /// ```
    pub fn create<F>(subscribe: F) -> Self
    where
        F: Fn(SingleEmitter<T>) -> Disposable + Send + Sync + 'static,
    {
        Self {
            source: Observable::create(move |handle| {
                subscribe(SingleEmitter {
                    inner: OneShot::new(handle, "single"),
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
        F: Fn(SingleEvent<T>) + Send + Sync + 'static,
    {
        self.source.subscribe(move |event| match event {
            Event::Next(value) => on_event(SingleEvent::Success(value)),
            Event::Error(err) => on_event(SingleEvent::Error(err)),
            Event::Completed => {}
        })
    }

    /// Subscribe a success handler; errors are ignored.
    pub fn subscribe_success<F>(&self, on_success: F) -> Disposable
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let SingleEvent::Success(value) = event {
                on_success(value);
            }
        })
    }

    /// Subscribe an error handler; the value is ignored.
    pub fn subscribe_error<F>(&self, on_error: F) -> Disposable
    where
        F: Fn(StreamError) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let SingleEvent::Error(err) = event {
                on_error(err);
            }
        })
    }

    /// The underlying observable: `next(v), completed` or `error(e)`.
    #[must_use]
    pub fn as_observable(&self) -> Observable<T> {
        self.source.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

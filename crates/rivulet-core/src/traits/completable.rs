#![forbid(unsafe_code)]

//! Completable: completion or one error, never a value.

use std::convert::Infallible;
use std::fmt;

use super::OneShot;
use crate::disposable::Disposable;
use crate::error::StreamError;
use crate::event::Event;
use crate::observable::{Observable, ObservableType};

/// The outcome of a [`Completable`].
#[derive(Debug, Clone, PartialEq)]
pub enum CompletableEvent {
    Completed,
    Error(StreamError),
}

impl fmt::Display for CompletableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Error(err) => write!(f, "error({err})"),
        }
    }
}

/// Producer side of a [`Completable`]. Only the first call has an effect.
#[derive(Clone)]
pub struct CompletableEmitter {
    inner: OneShot<Infallible>,
}

impl CompletableEmitter {
    /// Resolve successfully.
    pub fn completed(&self) {
        self.inner.completed();
    }

    /// Resolve with `error`.
    pub fn error(&self, error: impl Into<StreamError>) {
        self.inner.error(error.into());
    }

    /// Resolve with an already-built outcome.
    pub fn emit(&self, event: CompletableEvent) {
        match event {
            CompletableEvent::Completed => self.completed(),
            CompletableEvent::Error(err) => self.error(err),
        }
    }

    /// True once the subscriber is gone or the completable has resolved.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl fmt::Debug for CompletableEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletableEmitter").finish_non_exhaustive()
    }
}

/// An observable that carries no value: it completes or it fails.
///
/// The element type of the underlying observable is [`Infallible`], so a
/// value can never be emitted.
#[derive(Clone)]
pub struct Completable {
    source: Observable<Infallible>,
}

impl fmt::Debug for Completable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completable").finish_non_exhaustive()
    }
}

impl Completable {
    /// Build a completable from a producer closure, run once per
    /// subscription.
    ///
    /// ```
    /// use rivulet_core::prelude::*;
    ///
    /// let flush = Completable::create(|emitter| {
    ///     emitter.completed();
    ///     Disposable::empty()
    /// });
    /// let _sub = flush.subscribe(|event| assert_eq!(event, CompletableEvent::Completed));
    /// ```
    pub fn create<F>(subscribe: F) -> Self
    where
        F: Fn(CompletableEmitter) -> Disposable + Send + Sync + 'static,
    {
        Self {
            source: Observable::create(move |handle| {
                subscribe(CompletableEmitter {
                    inner: OneShot::new(handle, "completable"),
                })
            }),
        }
    }

    /// Complete on every subscription.
    #[must_use]
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
        F: Fn(CompletableEvent) + Send + Sync + 'static,
    {
        self.source.subscribe(move |event| match event {
            Event::Next(never) => match never {},
            Event::Completed => on_event(CompletableEvent::Completed),
            Event::Error(err) => on_event(CompletableEvent::Error(err)),
        })
    }

    /// Subscribe a completion handler; errors are ignored.
    pub fn subscribe_completed<F>(&self, on_completed: F) -> Disposable
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if event == CompletableEvent::Completed {
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
            if let CompletableEvent::Error(err) = event {
                on_error(err);
            }
        })
    }

    /// The underlying observable, which can only terminate.
    #[must_use]
    pub fn as_observable(&self) -> Observable<Infallible> {
        self.source.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

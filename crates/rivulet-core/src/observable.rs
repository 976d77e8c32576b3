#![forbid(unsafe_code)]

//! Observable sources and the subscription surface.
//!
//! # Design
//!
//! An [`Observable<T>`] is an immutable description of how to produce
//! events: a shared subscribe function that, given an [`ObserverHandle`],
//! starts emission and returns the teardown [`Disposable`]. Cloning an
//! `Observable` clones the `Arc`, not the producer.
//!
//! Sources built with [`Observable::create`], [`Observable::just`],
//! [`Observable::of`], [`Observable::from_sequence`] and
//! [`Observable::deferred`] are *cold*: the producer runs again for every
//! subscription. Subjects are *hot* and serve the same
//! [`ObservableType`] surface.
//!
//! # Subscription flow
//!
//! ```text
//! subscribe(observer)
//!   └─ Sink::new(observer)            grammar guard + teardown slot
//!        └─ source.subscribe_handle(handle)   producer runs, may emit
//!             └─ returns teardown  ──► sink.attach_teardown(teardown)
//!   ◄─ Disposable (disposes the sink)
//! ```
//!
//! A synchronous source (`just`, `of`) delivers every event, including the
//! terminal one, before `subscribe` returns. The terminal event disposes the
//! sink; the teardown is then run as soon as it is attached.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::disposable::Disposable;
use crate::error::{RxError, StreamError};
use crate::event::{Element, Event};
use crate::observer::{Callbacks, DisposedFn, FnObserver, Observer, ObserverHandle, Sink};

/// The subscription surface shared by observables and subjects.
pub trait ObservableType<T: Element>: Send + Sync {
    /// Attach a producer-side handle and return the teardown for it.
    ///
    /// This is the primitive every other `subscribe*` method builds on.
    fn subscribe_handle(&self, observer: ObserverHandle<T>) -> Disposable;

    /// A plain [`Observable`] view of this source.
    fn as_observable(&self) -> Observable<T>;

    /// Subscribe any [`Observer`].
    fn subscribe_observer<O>(&self, observer: O) -> Disposable
    where
        O: Observer<T> + 'static,
        Self: Sized,
    {
        attach(self, Box::new(observer), None)
    }

    /// Subscribe a closure receiving every [`Event`].
    fn subscribe<F>(&self, on_event: F) -> Disposable
    where
        F: Fn(Event<T>) + Send + Sync + 'static,
        Self: Sized,
    {
        attach(self, Box::new(FnObserver(on_event)), None)
    }

    /// Subscribe split, optional handlers.
    fn subscribe_with(&self, mut callbacks: Callbacks<T>) -> Disposable
    where
        Self: Sized,
    {
        let on_disposed = callbacks.take_on_disposed();
        attach(self, Box::new(callbacks), on_disposed)
    }

    /// Subscribe a value handler; terminal events are ignored.
    fn subscribe_next<F>(&self, on_next: F) -> Disposable
    where
        F: Fn(T) + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribe_with(Callbacks::new().on_next(on_next))
    }
}

fn attach<T, S>(
    source: &S,
    observer: Box<dyn Observer<T>>,
    on_disposed: Option<DisposedFn>,
) -> Disposable
where
    T: Element,
    S: ObservableType<T> + ?Sized,
{
    let sink = Sink::new(observer, on_disposed);
    let teardown = source.subscribe_handle(ObserverHandle::new(Arc::clone(&sink)));
    sink.attach_teardown(teardown);
    Disposable::new(move || sink.dispose())
}

type SubscribeFn<T> = dyn Fn(ObserverHandle<T>) -> Disposable + Send + Sync;

/// A cold or hot event source.
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: Element> Observable<T> {
    /// Build a source from a producer closure.
    ///
    /// `builder` runs once per subscription with that subscription's
    /// [`ObserverHandle`]. Its return value is the teardown, run when the
    /// subscriber disposes or after the terminal event.
    ///
    /// ```
    /// use rivulet_core::prelude::*;
    ///
    /// let source = Observable::<&str>::create(|observer| {
    ///     observer.on_next("1");
    ///     observer.on_completed();
    ///     observer.on_next("?"); // dropped: the stream already completed
    ///     Disposable::empty()
    /// });
    /// let _sub = source.subscribe(|event| println!("{event}"));
    /// ```
    pub fn create<F>(builder: F) -> Self
    where
        F: Fn(ObserverHandle<T>) -> Disposable + Send + Sync + 'static,
    {
        Self {
            subscribe_fn: Arc::new(builder),
        }
    }

    /// Emit `value`, then complete.
    pub fn just(value: T) -> Self {
        Self::create(move |observer| {
            observer.on_next(value.clone());
            observer.on_completed();
            Disposable::empty()
        })
    }

    /// Emit each value in order, then complete.
    pub fn of<const N: usize>(values: [T; N]) -> Self {
        Self::from_sequence(values)
    }

    /// Emit each element of `values` in order, then complete.
    ///
    /// An empty sequence completes immediately. Use
    /// [`Observable::from_nonempty`] to reject empty input instead.
    pub fn from_sequence<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values: Arc<[T]> = values.into_iter().collect();
        Self::create(move |observer| {
            for value in values.iter() {
                if observer.is_disposed() {
                    break;
                }
                observer.on_next(value.clone());
            }
            observer.on_completed();
            Disposable::empty()
        })
    }

    /// Like [`Observable::from_sequence`], but fails at definition time on
    /// empty input.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::EmptyInput`] if `values` yields nothing.
    pub fn from_nonempty<I>(values: I) -> Result<Self, RxError>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Err(RxError::EmptyInput);
        }
        Ok(Self::from_sequence(values))
    }

    /// Never emit anything.
    ///
    /// The observer stays registered until the subscription is disposed.
    pub fn never() -> Self {
        Self::create(|observer| Disposable::new(move || drop(observer)))
    }

    /// Complete immediately.
    pub fn empty() -> Self {
        Self::create(|observer| {
            observer.on_completed();
            Disposable::empty()
        })
    }

    /// Fail immediately with `error`.
    pub fn error(error: impl Into<StreamError>) -> Self {
        let error = error.into();
        Self::create(move |observer| {
            observer.on_error(error.clone());
            Disposable::empty()
        })
    }

    /// Build a fresh source per subscription.
    ///
    /// `factory` runs once for every subscription attempt, in call order,
    /// and the subscription is delegated to the source it returns. The
    /// factory may keep mutable state between calls.
    pub fn deferred<F>(factory: F) -> Self
    where
        F: FnMut() -> Observable<T> + Send + 'static,
    {
        let factory = Mutex::new(factory);
        Self::create(move |observer| {
            // Release the factory lock before subscribing so the produced
            // source may itself subscribe to this deferred source.
            let source = {
                let mut factory = factory.lock();
                (*factory)()
            };
            trace!("deferred factory produced a source");
            source.subscribe_handle(observer)
        })
    }
}

impl<T: Element> ObservableType<T> for Observable<T> {
    fn subscribe_handle(&self, observer: ObserverHandle<T>) -> Disposable {
        (self.subscribe_fn)(observer)
    }

    fn as_observable(&self) -> Observable<T> {
        self.clone()
    }
}

impl<T: Element> FromIterator<T> for Observable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_sequence(iter)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

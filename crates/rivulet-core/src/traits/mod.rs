#![forbid(unsafe_code)]

//! Narrowed-grammar observables.
//!
//! | Type | Events |
//! |------|--------|
//! | [`Single<T>`] | exactly one of `success(v)` or `error(e)` |
//! | [`Maybe<T>`] | exactly one of `success(v)`, `completed`, or `error(e)` |
//! | [`Completable`] | exactly one of `completed` or `error(e)` |
//!
//! Each type wraps an [`Observable`] whose event sequence is kept inside
//! the narrowed grammar by its emitter: the first emitter call wins and
//! every later call is a no-op. A general observable is narrowed with
//! [`Observable::as_single`], [`Observable::as_maybe`], or
//! [`Observable::as_completable`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::RxError;
use crate::event::{Element, Event};
use crate::observable::{Observable, ObservableType};
use crate::observer::ObserverHandle;

mod completable;
mod maybe;
mod single;

pub use completable::{Completable, CompletableEmitter, CompletableEvent};
pub use maybe::{Maybe, MaybeEmitter, MaybeEvent};
pub use single::{Single, SingleEmitter, SingleEvent};

/// A producer handle that lets exactly one emitter call through.
struct OneShot<T> {
    handle: ObserverHandle<T>,
    fired: Arc<AtomicBool>,
    kind: &'static str,
}

impl<T> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            fired: Arc::clone(&self.fired),
            kind: self.kind,
        }
    }
}

impl<T: Element> OneShot<T> {
    fn new(handle: ObserverHandle<T>, kind: &'static str) -> Self {
        Self {
            handle,
            fired: Arc::new(AtomicBool::new(false)),
            kind,
        }
    }

    /// Claim the single emission. Returns false if it was already used.
    fn claim(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::AcqRel);
        if !first {
            trace!(kind = self.kind, "emitter already fired; call ignored");
        }
        first
    }

    fn success(&self, value: T) {
        if self.claim() {
            self.handle.on_next(value);
            self.handle.on_completed();
        }
    }

    fn completed(&self) {
        if self.claim() {
            self.handle.on_completed();
        }
    }

    fn error(&self, error: crate::error::StreamError) {
        if self.claim() {
            self.handle.on_error(error);
        }
    }

    fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }
}

/// At most one value seen so far on an upstream being narrowed.
struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Store `value`. Returns false if a value was already stored.
    fn fill(&self, value: T) -> bool {
        let mut slot = self.value.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    fn take(&self) -> Option<T> {
        self.value.lock().take()
    }
}

impl<T: Element> Observable<T> {
    /// Narrow to a [`Single`].
    ///
    /// Succeeds with the only element once the source completes. Fails with
    /// [`RxError::NoElements`] if the source completes empty and with
    /// [`RxError::MoreThanOneElement`] as soon as a second element arrives.
    /// Source errors pass through.
    #[must_use]
    pub fn as_single(&self) -> Single<T> {
        let upstream = self.clone();
        Single::create(move |emitter| {
            let slot = Slot::new();
            upstream.subscribe(move |event| match event {
                Event::Next(value) => {
                    if !slot.fill(value) {
                        emitter.error(RxError::MoreThanOneElement);
                    }
                }
                Event::Error(err) => emitter.error(err),
                Event::Completed => match slot.take() {
                    Some(value) => emitter.success(value),
                    None => emitter.error(RxError::NoElements),
                },
            })
        })
    }

    /// Narrow to a [`Maybe`].
    ///
    /// Completes empty if the source does, succeeds with its only element,
    /// and fails with [`RxError::MoreThanOneElement`] on a second element.
    #[must_use]
    pub fn as_maybe(&self) -> Maybe<T> {
        let upstream = self.clone();
        Maybe::create(move |emitter| {
            let slot = Slot::new();
            upstream.subscribe(move |event| match event {
                Event::Next(value) => {
                    if !slot.fill(value) {
                        emitter.error(RxError::MoreThanOneElement);
                    }
                }
                Event::Error(err) => emitter.error(err),
                Event::Completed => match slot.take() {
                    Some(value) => emitter.success(value),
                    None => emitter.completed(),
                },
            })
        })
    }

    /// Narrow to a [`Completable`], discarding every element.
    #[must_use]
    pub fn as_completable(&self) -> Completable {
        let upstream = self.clone();
        Completable::create(move |emitter| {
            upstream.subscribe(move |event| match event {
                Event::Next(_) => {}
                Event::Error(err) => emitter.error(err),
                Event::Completed => emitter.completed(),
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::subject::PublishSubject;

    fn single_outcome(source: &Observable<i32>) -> Vec<SingleEvent<i32>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let _sub = source
            .as_single()
            .subscribe(move |event| l.lock().push(event));
        log.lock().clone()
    }

    #[test]
    fn as_single_of_one_element() {
        assert_eq!(
            single_outcome(&Observable::just(7)),
            vec![SingleEvent::Success(7)]
        );
    }

    #[test]
    fn as_single_of_empty_source() {
        let out = single_outcome(&Observable::empty());
        assert_eq!(out.len(), 1);
        let SingleEvent::Error(err) = &out[0] else {
            panic!("expected error, got {out:?}");
        };
        assert_eq!(err.downcast_ref::<RxError>(), Some(&RxError::NoElements));
    }

    #[test]
    fn as_single_of_two_elements() {
        let out = single_outcome(&Observable::of([1, 2]));
        assert_eq!(
            out,
            vec![SingleEvent::Error(RxError::MoreThanOneElement.into())]
        );
    }

    #[test]
    fn as_single_passes_source_error() {
        let out = single_outcome(&Observable::error(StreamError::msg("io")));
        assert_eq!(out, vec![SingleEvent::Error(StreamError::msg("io"))]);
    }

    #[test]
    fn as_single_waits_for_completion() {
        let subject = PublishSubject::<i32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let _sub = subject
            .as_observable()
            .as_single()
            .subscribe(move |event| l.lock().push(event));

        subject.on_next(5);
        assert!(log.lock().is_empty());
        subject.on_completed();
        assert_eq!(*log.lock(), vec![SingleEvent::Success(5)]);
    }

    #[test]
    fn as_maybe_variants() {
        let collect = |source: Observable<i32>| {
            let log = Arc::new(Mutex::new(Vec::new()));
            let l = Arc::clone(&log);
            let _sub = source
                .as_maybe()
                .subscribe(move |event| l.lock().push(event));
            let out = log.lock().clone();
            out
        };
        assert_eq!(collect(Observable::just(1)), vec![MaybeEvent::Success(1)]);
        assert_eq!(collect(Observable::empty()), vec![MaybeEvent::Completed]);
        assert_eq!(
            collect(Observable::of([1, 2, 3])),
            vec![MaybeEvent::Error(RxError::MoreThanOneElement.into())]
        );
    }

    #[test]
    fn as_completable_ignores_values() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let _sub = Observable::of([1, 2, 3])
            .as_completable()
            .subscribe(move |event| l.lock().push(event));
        assert_eq!(*log.lock(), vec![CompletableEvent::Completed]);
    }
}

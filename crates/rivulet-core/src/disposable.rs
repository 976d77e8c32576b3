#![forbid(unsafe_code)]

//! Cancellation handles and scoped aggregate owners.
//!
//! # Design
//!
//! A [`Disposable`] wraps a one-shot teardown action. `dispose()` runs the
//! action at most once no matter how many times, or from how many threads,
//! it is called. Dropping a `Disposable` does **not** dispose it: the
//! subscriber owns the handle and decides when to release it.
//!
//! A [`DisposeBag`] is the scoped owner. It collects disposables and
//! releases all of them, in insertion order, exactly once, when it is
//! dropped (or when [`DisposeBag::dispose`] is called first).
//!
//! # Invariants
//!
//! 1. The teardown action of a `Disposable` runs at most once.
//! 2. `is_disposed()` is true from the first `dispose()` call onward.
//! 3. A bag disposes its contents in insertion order.
//! 4. A disposable inserted into an already-disposed bag is disposed
//!    immediately.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::trace;

type Action = Box<dyn FnOnce() + Send + 'static>;

struct DisposeState {
    disposed: AtomicBool,
    action: Mutex<Option<Action>>,
}

/// A cancellable resource or subscription.
///
/// Clones share the same state, so disposing any clone disposes them all.
#[derive(Clone)]
pub struct Disposable {
    state: Arc<DisposeState>,
}

impl Disposable {
    /// Create a disposable that runs `action` on first dispose.
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            state: Arc::new(DisposeState {
                disposed: AtomicBool::new(false),
                action: Mutex::new(Some(Box::new(action))),
            }),
        }
    }

    /// A disposable with no teardown action.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: Arc::new(DisposeState {
                disposed: AtomicBool::new(false),
                action: Mutex::new(None),
            }),
        }
    }

    /// Run the teardown action if it has not run yet.
    pub fn dispose(&self) {
        if self.state.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Take the action out before running it: the action may re-enter
        // this disposable through a clone.
        let action = self.state.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    /// True once `dispose()` has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.disposed.load(Ordering::Acquire)
    }

    /// Hand ownership to `bag`, which disposes this handle on its teardown.
    pub fn disposed_by(self, bag: &DisposeBag) {
        bag.insert(self);
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Default for Disposable {
    fn default() -> Self {
        Self::empty()
    }
}

struct BagState {
    disposed: bool,
    items: Vec<Disposable>,
}

/// Scoped owner of a set of disposables.
///
/// ```
/// use rivulet_core::prelude::*;
///
/// let bag = DisposeBag::new();
/// Observable::of(["A", "B", "C"])
///     .subscribe(|event| println!("{event}"))
///     .disposed_by(&bag);
/// // Everything in `bag` is disposed when it goes out of scope.
/// ```
pub struct DisposeBag {
    state: Mutex<BagState>,
}

impl DisposeBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BagState {
                disposed: false,
                items: Vec::new(),
            }),
        }
    }

    /// Take ownership of `disposable`.
    ///
    /// If the bag has already been disposed, `disposable` is disposed
    /// immediately.
    pub fn insert(&self, disposable: Disposable) {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            disposable.dispose();
            return;
        }
        state.items.push(disposable);
    }

    /// Dispose every owned handle in insertion order. Later calls do nothing.
    pub fn dispose(&self) {
        let items = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            std::mem::take(&mut state.items)
        };
        trace!(count = items.len(), "dispose bag released");
        for item in items {
            item.dispose();
        }
    }

    /// Number of handles currently owned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// True when the bag owns no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the bag has released its contents.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl Default for DisposeBag {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<Disposable> for DisposeBag {
    fn extend<I: IntoIterator<Item = Disposable>>(&mut self, iter: I) {
        for disposable in iter {
            self.insert(disposable);
        }
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for DisposeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DisposeBag")
            .field("len", &state.items.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(counter: &Arc<AtomicUsize>) -> Disposable {
        let counter = Arc::clone(counter);
        Disposable::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn dispose_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let d = counting(&count);
        assert!(!d.is_disposed());

        d.dispose();
        d.dispose();

        assert!(d.is_disposed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_state() {
        let count = Arc::new(AtomicUsize::new(0));
        let d = counting(&count);
        let copy = d.clone();

        copy.dispose();
        d.dispose();

        assert!(d.is_disposed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_does_not_dispose() {
        let count = Arc::new(AtomicUsize::new(0));
        drop(counting(&count));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_is_harmless() {
        let d = Disposable::empty();
        d.dispose();
        d.dispose();
        assert!(d.is_disposed());
    }

    #[test]
    fn action_may_reenter_its_own_handle() {
        let slot: Arc<Mutex<Option<Disposable>>> = Arc::new(Mutex::new(None));
        let slot_clone = Arc::clone(&slot);
        let d = Disposable::new(move || {
            let inner = slot_clone.lock().clone();
            if let Some(inner) = inner {
                inner.dispose();
            }
        });
        *slot.lock() = Some(d.clone());
        d.dispose();
        assert!(d.is_disposed());
    }

    #[test]
    fn bag_disposes_in_insertion_order_on_drop() {
        let order = Arc::new(Mutex::new(Vec::new()));
        {
            let bag = DisposeBag::new();
            for i in 0..3 {
                let order = Arc::clone(&order);
                Disposable::new(move || order.lock().push(i)).disposed_by(&bag);
            }
            assert_eq!(bag.len(), 3);
            assert!(order.lock().is_empty());
        }
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn bag_disposes_exactly_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let bag = DisposeBag::new();
        bag.insert(counting(&count));
        bag.dispose();
        bag.dispose();
        drop(bag);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn insert_after_dispose_disposes_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let bag = DisposeBag::new();
        bag.dispose();
        bag.insert(counting(&count));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(bag.is_empty());
        assert!(bag.is_disposed());
    }

    #[test]
    fn extend_collects_handles() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut bag = DisposeBag::new();
        bag.extend((0..4).map(|_| counting(&count)));
        assert_eq!(bag.len(), 4);
        drop(bag);
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }
}

#![forbid(unsafe_code)]

//! Variable: a mutable value cell that broadcasts its changes.

use std::fmt;

use tracing::debug;

use super::BehaviorSubject;
use crate::config::SubjectConfig;
use crate::disposable::Disposable;
use crate::event::Element;
use crate::observable::{Observable, ObservableType};
use crate::observer::ObserverHandle;

/// Owns a [`BehaviorSubject`] and exposes it as a value cell.
///
/// Observers receive the current value on attach and every later
/// `set_value`. There is no error entry point. When the variable ends,
/// either through [`finish`](Self::finish) or by being dropped, the wrapped
/// subject completes and every observer receives `completed`.
///
/// A `Variable` has a single owner and is not `Clone`; share
/// [`as_observable`](ObservableType::as_observable) views instead.
pub struct Variable<T: Element> {
    subject: BehaviorSubject<T>,
}

impl<T: Element> Variable<T> {
    /// Create a variable holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            subject: BehaviorSubject::new(initial),
        }
    }

    /// Create a variable whose subject uses `config` for logging.
    #[must_use]
    pub fn with_config(initial: T, config: SubjectConfig) -> Self {
        Self {
            subject: BehaviorSubject::with_config(initial, config),
        }
    }

    /// Current value, read without subscribing.
    #[must_use]
    pub fn value(&self) -> T {
        self.subject.latest()
    }

    /// Store `value` and broadcast it.
    pub fn set_value(&self, value: T) {
        self.subject.on_next(value);
    }

    /// End the variable now, completing every observer.
    pub fn finish(self) {
        self.complete();
    }

    fn complete(&self) {
        if self.subject.is_terminated() {
            return;
        }
        debug!(observers = self.subject.observer_count(), "variable finished");
        self.subject.on_completed();
    }
}

impl<T: Element> Drop for Variable<T> {
    fn drop(&mut self) {
        self.complete();
    }
}

impl<T: Element> ObservableType<T> for Variable<T> {
    fn subscribe_handle(&self, observer: ObserverHandle<T>) -> Disposable {
        self.subject.subscribe_handle(observer)
    }

    fn as_observable(&self) -> Observable<T> {
        self.subject.as_observable()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &self.value())
            .field("observers", &self.subject.observer_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<Event<String>>>>;

    fn watch(source: &impl ObservableType<String>) -> (Log, Disposable) {
        let log: Log = Arc::default();
        let l = Arc::clone(&log);
        let sub = source.subscribe(move |event| l.lock().push(event));
        (log, sub)
    }

    #[test]
    fn observers_get_current_then_changes() {
        let variable = Variable::new("Initial value".to_string());
        variable.set_value("New initial value".to_string());
        let (log, _sub) = watch(&variable);
        variable.set_value("1".to_string());

        assert_eq!(
            *log.lock(),
            vec![
                Event::Next("New initial value".to_string()),
                Event::Next("1".to_string()),
            ]
        );
        assert_eq!(variable.value(), "1");
    }

    #[test]
    fn drop_completes_observers() {
        let variable = Variable::new(String::from("a"));
        let (log, _sub) = watch(&variable);
        drop(variable);
        assert_eq!(
            *log.lock(),
            vec![Event::Next("a".to_string()), Event::Completed]
        );
    }

    #[test]
    fn finish_completes_once() {
        let variable = Variable::new(String::from("a"));
        let (log, _sub) = watch(&variable);
        variable.finish();
        let completions = log
            .lock()
            .iter()
            .filter(|e| **e == Event::Completed)
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn observable_view_outlives_variable() {
        let variable = Variable::new(String::from("x"));
        let view = variable.as_observable();
        drop(variable);
        let (log, _sub) = watch(&view);
        assert_eq!(*log.lock(), vec![Event::Completed]);
    }
}

//! Cross-thread behavior of subjects.
//!
//! Emissions from different threads are serialized by the subject, so each
//! observer sees a well-formed sequence: every value at most once, each
//! producer's values in its own order, and exactly one terminal event.

use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;
use rivulet_core::prelude::*;
use tracing::Level;

const PRODUCERS: u32 = 4;
const PER_PRODUCER: u32 = 200;
const ATTACHERS: usize = 6;

type Log = Arc<Mutex<Vec<Event<(u32, u32)>>>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

fn record<S: ObservableType<(u32, u32)>>(source: &S) -> (Log, Disposable) {
    let log: Log = Arc::default();
    let l = Arc::clone(&log);
    let sub = source.subscribe(move |event| l.lock().push(event));
    (log, sub)
}

fn check_sequence(events: &[Event<(u32, u32)>]) {
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1, "expected exactly one terminal: {events:?}");
    assert!(events.last().is_some_and(Event::is_terminal));

    let mut last_seen = vec![None; PRODUCERS as usize];
    for event in events {
        if let Event::Next((producer, seq)) = event {
            let slot = &mut last_seen[*producer as usize];
            if let Some(prev) = *slot {
                assert!(*seq > prev, "producer {producer} out of order: {prev} then {seq}");
            }
            *slot = Some(*seq);
        }
    }
}

fn run_race<S>(subject: S)
where
    S: ObservableType<(u32, u32)> + Observer<(u32, u32)> + Clone + 'static,
{
    init_tracing();
    let barrier = Arc::new(Barrier::new(PRODUCERS as usize + ATTACHERS));
    let logs: Arc<Mutex<Vec<(Log, Disposable)>>> = Arc::default();

    thread::scope(|scope| {
        for producer in 0..PRODUCERS {
            let subject = subject.clone();
            let barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                barrier.wait();
                for seq in 1..=PER_PRODUCER {
                    subject.on_next((producer, seq));
                }
                subject.on_completed();
            });
        }
        for _ in 0..ATTACHERS {
            let subject = subject.clone();
            let barrier = Arc::clone(&barrier);
            let logs = Arc::clone(&logs);
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..5 {
                    let entry = record(&subject);
                    logs.lock().push(entry);
                    thread::yield_now();
                }
            });
        }
    });

    let logs = logs.lock();
    assert_eq!(logs.len(), ATTACHERS * 5);
    for (log, _sub) in logs.iter() {
        check_sequence(&log.lock());
    }
}

#[test]
fn publish_subject_under_concurrent_emit_and_attach() {
    run_race(PublishSubject::new());
}

#[test]
fn replay_subject_under_concurrent_emit_and_attach() {
    run_race(ReplaySubject::create(16));
}

#[test]
fn behavior_subject_under_concurrent_emit_and_attach() {
    run_race(BehaviorSubject::new((0, 0)));
}

#[test]
fn concurrent_terminal_emissions_deliver_once() {
    init_tracing();
    let subject = PublishSubject::<u8>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&log);
    let _sub = subject.subscribe(move |event| l.lock().push(event));

    let barrier = Arc::new(Barrier::new(8));
    thread::scope(|scope| {
        for i in 0..8 {
            let subject = subject.clone();
            let barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    subject.on_completed();
                } else {
                    subject.on_error(StreamError::msg("race"));
                }
            });
        }
    });

    let log = log.lock();
    assert_eq!(log.len(), 1);
    assert!(log[0].is_terminal());
}

#[test]
fn dispose_from_another_thread_stops_delivery() {
    let subject = PublishSubject::<u32>::new();
    let count = Arc::new(Mutex::new(0u32));
    let c = Arc::clone(&count);
    let sub = subject.subscribe_next(move |_| *c.lock() += 1);

    subject.on_next(1);
    thread::spawn(move || sub.dispose())
        .join()
        .expect("dispose thread");
    subject.on_next(2);

    assert_eq!(*count.lock(), 1);
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn handle_shared_across_threads_never_delivers_after_terminal() {
    init_tracing();
    for round in 0..500 {
        let slot: Arc<Mutex<Option<ObserverHandle<u8>>>> = Arc::default();
        let s = Arc::clone(&slot);
        let source = Observable::create(move |handle| {
            *s.lock() = Some(handle);
            Disposable::empty()
        });

        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let _sub = source.subscribe(move |event| l.lock().push(event));
        let handle = slot.lock().take().expect("builder ran");

        let barrier = Arc::new(Barrier::new(2));
        thread::scope(|scope| {
            let (h, b) = (handle.clone(), Arc::clone(&barrier));
            scope.spawn(move || {
                b.wait();
                h.on_next(1);
            });
            let (h, b) = (handle.clone(), Arc::clone(&barrier));
            scope.spawn(move || {
                b.wait();
                h.on_completed();
            });
        });

        let log = log.lock();
        assert!(
            log.last().is_some_and(Event::is_terminal),
            "round {round}: event after terminal: {log:?}"
        );
        assert_eq!(log.iter().filter(|e| e.is_terminal()).count(), 1);
    }
}

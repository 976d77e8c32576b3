#![forbid(unsafe_code)]

//! Core: push-based event streams, subjects, and narrowed-grammar traits.
//!
//! # Role in Rivulet
//! `rivulet-core` is the engine. It defines the event grammar, the
//! subscription lifecycle, and every source type. `rivulet-harness` builds
//! test recorders and transcripts on top of it.
//!
//! # Primary responsibilities
//! - **Event**: `next(v)* (error(e) | completed)?`, enforced per subscription.
//! - **Disposable / DisposeBag**: idempotent teardown, scoped release.
//! - **Observable**: cold sources (`create`, `just`, `of`, `from_sequence`,
//!   `deferred`) behind one [`ObservableType`] surface.
//! - **Subjects**: hot sources that are also observers
//!   ([`PublishSubject`], [`BehaviorSubject`], [`ReplaySubject`],
//!   [`Variable`]).
//! - **Traits**: [`Single`], [`Maybe`], [`Completable`].
//!
//! # Example
//! ```
//! use rivulet_core::prelude::*;
//!
//! let bag = DisposeBag::new();
//! let subject = BehaviorSubject::new("init");
//! subject
//!     .subscribe(|event| println!("{event}"))
//!     .disposed_by(&bag);
//! subject.on_next("next");
//! ```

pub mod config;
pub mod disposable;
pub mod error;
pub mod event;
pub mod observable;
pub mod observer;
pub mod subject;
pub mod traits;

pub use config::SubjectConfig;
pub use disposable::{Disposable, DisposeBag};
pub use error::{RxError, StreamError};
pub use event::{Element, Event};
pub use observable::{Observable, ObservableType};
pub use observer::{Callbacks, FnObserver, Observer, ObserverHandle, observer_fn};
pub use subject::{BehaviorSubject, PublishSubject, ReplaySubject, Variable};
pub use traits::{
    Completable, CompletableEmitter, CompletableEvent, Maybe, MaybeEmitter, MaybeEvent, Single,
    SingleEmitter, SingleEvent,
};

/// Everything needed to build and subscribe to streams.
pub mod prelude {
    pub use crate::{
        BehaviorSubject, Callbacks, Completable, CompletableEmitter, CompletableEvent, Disposable,
        DisposeBag, Element, Event, Maybe, MaybeEmitter, MaybeEvent, Observable, ObservableType,
        Observer, ObserverHandle, PublishSubject, ReplaySubject, RxError, Single, SingleEmitter,
        SingleEvent, StreamError, SubjectConfig, Variable, observer_fn,
    };
}

#![forbid(unsafe_code)]

//! Error types.
//!
//! Two kinds of error flow through the engine:
//!
//! - [`StreamError`]: an opaque producer error passed to `on_error`. The
//!   engine never inspects it; it is cloned to every attached observer and
//!   stored as the terminal event of a subject.
//! - [`RxError`]: conditions raised by the engine itself, such as a
//!   construction argument that is missing or a trait conversion whose
//!   upstream emitted the wrong number of elements.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Errors raised by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RxError {
    /// A sequence source was defined on an empty input in fail-fast mode.
    EmptyInput,
    /// A required construction argument was not supplied.
    MissingArgument(&'static str),
    /// A configuration value could not be used.
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
    /// The subject has been disposed.
    SubjectDisposed,
    /// The source already terminated with this error.
    Terminated(StreamError),
    /// A single-element conversion saw a completion without any element.
    NoElements,
    /// A single-element conversion saw a second element.
    MoreThanOneElement,
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "sequence source defined on empty input"),
            Self::MissingArgument(name) => write!(f, "missing construction argument: {name}"),
            Self::InvalidConfig { key, value, reason } => {
                write!(f, "invalid value {value:?} for {key}: {reason}")
            }
            Self::SubjectDisposed => write!(f, "subject has been disposed"),
            Self::Terminated(err) => write!(f, "source terminated with error: {err}"),
            Self::NoElements => write!(f, "sequence completed without an element"),
            Self::MoreThanOneElement => write!(f, "sequence emitted more than one element"),
        }
    }
}

impl StdError for RxError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Terminated(err) => Some(err.as_std()),
            _ => None,
        }
    }
}

/// An opaque, shareable producer error.
///
/// Cloning is cheap (`Arc`). The original error is carried verbatim and
/// can be recovered with [`StreamError::downcast_ref`].
///
/// `StreamError` does not implement [`std::error::Error`]; every error type
/// converts into it through `From`. Use [`StreamError::as_std`] where a
/// `&dyn Error` is needed.
#[derive(Clone)]
pub struct StreamError {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl StreamError {
    /// Wrap a producer error.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(err),
        }
    }

    /// Build an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Borrow the wrapped error if it has type `E`.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// True if the wrapped error has type `E`.
    #[must_use]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.inner.is::<E>()
    }

    /// View as a standard error trait object.
    #[must_use]
    pub fn as_std(&self) -> &(dyn StdError + 'static) {
        &*self.inner
    }

    /// True if both handles share the same underlying error.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> From<E> for StreamError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl fmt::Debug for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

/// Two errors are equal when they share the same allocation or render to
/// the same message.
impl PartialEq for StreamError {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.to_string() == other.to_string()
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for MessageError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

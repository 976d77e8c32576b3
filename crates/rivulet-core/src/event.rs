#![forbid(unsafe_code)]

//! The event grammar of a stream.
//!
//! A source delivers any number of [`Event::Next`] values followed by at
//! most one terminal event ([`Event::Error`] or [`Event::Completed`]).
//! Nothing may follow a terminal event on the same source-to-observer
//! channel; the per-subscription sink enforces this (see
//! [`crate::observer`]).

use std::fmt;

use crate::error::StreamError;

/// Bound carried by every element type.
///
/// Values are cloned when fanned out to several observers, and sources can
/// be shared across threads.
pub trait Element: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Element for T {}

/// A single emission.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// A value.
    Next(T),
    /// Terminal failure carrying the producer error.
    Error(StreamError),
    /// Terminal success.
    Completed,
}

impl<T> Event<T> {
    /// True for `Error` and `Completed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Next(_))
    }

    /// True for `Next`.
    #[must_use]
    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }

    /// The carried value, if any.
    #[must_use]
    pub fn element(&self) -> Option<&T> {
        match self {
            Self::Next(value) => Some(value),
            _ => None,
        }
    }

    /// Consume the event, returning the carried value.
    #[must_use]
    pub fn into_element(self) -> Option<T> {
        match self {
            Self::Next(value) => Some(value),
            _ => None,
        }
    }

    /// The carried error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Transform the carried value, keeping terminal events as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Event<U> {
        match self {
            Self::Next(value) => Event::Next(f(value)),
            Self::Error(err) => Event::Error(err),
            Self::Completed => Event::Completed,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next(value) => write!(f, "next({value})"),
            Self::Error(err) => write!(f, "error({err})"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        assert!(!Event::Next(1).is_terminal());
        assert!(Event::<i32>::Completed.is_terminal());
        assert!(Event::<i32>::Error(StreamError::msg("x")).is_terminal());
    }

    #[test]
    fn accessors() {
        let next = Event::Next("a");
        assert_eq!(next.element(), Some(&"a"));
        assert!(next.error().is_none());

        let err = Event::<&str>::Error(StreamError::msg("bad"));
        assert!(err.element().is_none());
        assert_eq!(err.error().map(ToString::to_string).as_deref(), Some("bad"));
    }

    #[test]
    fn map_keeps_terminals() {
        assert_eq!(Event::Next(2).map(|v| v * 10), Event::Next(20));
        assert_eq!(Event::<i32>::Completed.map(|v| v * 10), Event::Completed);
    }

    #[test]
    fn display_format() {
        assert_eq!(Event::Next("X").to_string(), "next(X)");
        assert_eq!(Event::<u8>::Completed.to_string(), "completed");
        assert_eq!(
            Event::<u8>::Error(StreamError::msg("anError")).to_string(),
            "error(anError)"
        );
    }
}

#![forbid(unsafe_code)]

//! Subject configuration.
//!
//! [`SubjectConfig`] carries the optional knobs of a subject: a label that
//! tags its log events, whether each emission is wrapped in a tracing span,
//! and the replay buffer size used by [`crate::ReplaySubject::with_config`].
//!
//! Configuration can come from code (builder methods) or from the
//! environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `RIVULET_SUBJECT_LABEL` | label attached to log events |
//! | `RIVULET_TRACE_EMISSIONS` | `1`/`true`/`yes`/`on` enables per-emission spans |
//! | `RIVULET_REPLAY_BUFFER` | non-negative replay buffer size |

use crate::error::RxError;

/// Environment variable naming the subject label.
pub const ENV_SUBJECT_LABEL: &str = "RIVULET_SUBJECT_LABEL";
/// Environment variable enabling per-emission spans.
pub const ENV_TRACE_EMISSIONS: &str = "RIVULET_TRACE_EMISSIONS";
/// Environment variable holding the replay buffer size.
pub const ENV_REPLAY_BUFFER: &str = "RIVULET_REPLAY_BUFFER";

/// Configuration shared by all subject variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectConfig {
    /// Label attached to log events (`"-"` when unset).
    pub label: Option<String>,
    /// Wrap each emission fan-out in a `debug` span.
    pub trace_emissions: bool,
    /// Replay buffer size. Required by replay subjects built from config.
    pub replay_buffer: Option<usize>,
}

impl SubjectConfig {
    /// Defaults: no label, no emission spans, no replay buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enable or disable per-emission spans.
    #[must_use]
    pub fn with_trace_emissions(mut self, enabled: bool) -> Self {
        self.trace_emissions = enabled;
        self
    }

    /// Set the replay buffer size.
    #[must_use]
    pub fn with_replay_buffer(mut self, size: usize) -> Self {
        self.replay_buffer = Some(size);
        self
    }

    /// Read overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::InvalidConfig`] if `RIVULET_REPLAY_BUFFER` is
    /// negative or not an integer.
    pub fn from_env() -> Result<Self, RxError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `get_env`, which maps a variable name to its
    /// value. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::InvalidConfig`] for a malformed replay buffer size.
    pub fn from_lookup<F>(get_env: F) -> Result<Self, RxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(label) = get_env(ENV_SUBJECT_LABEL) {
            let label = label.trim();
            if !label.is_empty() {
                config.label = Some(label.to_string());
            }
        }
        if let Some(flag) = get_env(ENV_TRACE_EMISSIONS) {
            config.trace_emissions = env_flag(&flag);
        }
        if let Some(raw) = get_env(ENV_REPLAY_BUFFER) {
            config.replay_buffer = Some(parse_buffer_size(&raw)?);
        }
        Ok(config)
    }

    /// The replay buffer size, required for replay subjects.
    ///
    /// # Errors
    ///
    /// Returns [`RxError::MissingArgument`] if no size was configured.
    pub fn require_replay_buffer(&self) -> Result<usize, RxError> {
        self.replay_buffer
            .ok_or(RxError::MissingArgument("replay_buffer"))
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_buffer_size(raw: &str) -> Result<usize, RxError> {
    let trimmed = raw.trim();
    let invalid = |reason| RxError::InvalidConfig {
        key: ENV_REPLAY_BUFFER,
        value: raw.to_string(),
        reason,
    };
    match trimmed.parse::<i128>() {
        Ok(n) if n < 0 => Err(invalid("buffer size must be non-negative")),
        Ok(n) => usize::try_from(n).map_err(|_| invalid("buffer size is too large")),
        Err(_) => Err(invalid("buffer size must be an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = SubjectConfig::new();
        assert_eq!(config.label(), "-");
        assert!(!config.trace_emissions);
        assert_eq!(
            config.require_replay_buffer(),
            Err(RxError::MissingArgument("replay_buffer"))
        );
    }

    #[test]
    fn builder_sets_fields() {
        let config = SubjectConfig::new()
            .with_label("prices")
            .with_trace_emissions(true)
            .with_replay_buffer(4);
        assert_eq!(config.label(), "prices");
        assert!(config.trace_emissions);
        assert_eq!(config.require_replay_buffer(), Ok(4));
    }

    #[test]
    fn env_overrides() {
        let config = SubjectConfig::from_lookup(lookup(&[
            (ENV_SUBJECT_LABEL, " ticks "),
            (ENV_TRACE_EMISSIONS, "YES"),
            (ENV_REPLAY_BUFFER, " 16 "),
        ]))
        .expect("valid config");
        assert_eq!(config.label.as_deref(), Some("ticks"));
        assert!(config.trace_emissions);
        assert_eq!(config.replay_buffer, Some(16));
    }

    #[test]
    fn env_flag_values() {
        for on in ["1", "true", "Yes", " on "] {
            assert!(env_flag(on), "{on}");
        }
        for off in ["0", "false", "no", "", "maybe"] {
            assert!(!env_flag(off), "{off}");
        }
    }

    #[test]
    fn negative_buffer_rejected() {
        let err = SubjectConfig::from_lookup(lookup(&[(ENV_REPLAY_BUFFER, "-1")]))
            .expect_err("negative size");
        assert!(matches!(
            err,
            RxError::InvalidConfig {
                reason: "buffer size must be non-negative",
                ..
            }
        ));
    }

    #[test]
    fn malformed_buffer_rejected() {
        let err = SubjectConfig::from_lookup(lookup(&[(ENV_REPLAY_BUFFER, "two")]))
            .expect_err("not a number");
        assert!(matches!(err, RxError::InvalidConfig { key: ENV_REPLAY_BUFFER, .. }));
    }

    #[test]
    fn blank_label_ignored() {
        let config =
            SubjectConfig::from_lookup(lookup(&[(ENV_SUBJECT_LABEL, "   ")])).expect("valid");
        assert_eq!(config.label, None);
    }
}

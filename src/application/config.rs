//! Throttle configuration as supplied by the host client.
//!
//! The host passes three options, all optional:
//!
//! | option                        | default | meaning                          |
//! |-------------------------------|---------|----------------------------------|
//! | `eventWindowSize`             | 60000   | sliding window length in ms      |
//! | `maxEventsPerWindow`          | 100     | reports admitted per window      |
//! | `maxDuplicateEventsPerWindow` | 10      | identical reports per window     |
//!
//! Each one must be a positive integer when present; `null` counts as present.

use crate::domain::policy::WindowPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const EVENT_WINDOW_SIZE: &str = "eventWindowSize";
const MAX_EVENTS_PER_WINDOW: &str = "maxEventsPerWindow";
const MAX_DUPLICATE_EVENTS_PER_WINDOW: &str = "maxDuplicateEventsPerWindow";

/// Error returned when throttle configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An option was present but not a positive integer
    NotAPositiveInteger {
        /// The option name as the host spells it
        option: &'static str,
    },
    /// The configuration was not a JSON object
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotAPositiveInteger { option } => {
                write!(f, "(number) {} must be a number if specified", option)
            }
            ConfigError::Malformed(msg) => write!(f, "malformed throttle configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Malformed(e.to_string())
    }
}

/// Validated throttle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThrottleConfig {
    /// Sliding window length in milliseconds
    pub event_window_size: u64,
    /// Reports admitted per window
    pub max_events_per_window: u64,
    /// Identical reports admitted per window
    pub max_duplicate_events_per_window: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            event_window_size: 60 * 1000,
            max_events_per_window: 100,
            max_duplicate_events_per_window: 10,
        }
    }
}

impl ThrottleConfig {
    /// Read the throttle options from a host configuration object.
    ///
    /// Unknown keys are ignored so the whole client configuration can be
    /// passed in. Missing options take their defaults; an explicit `null` is
    /// not a positive integer and is rejected.
    ///
    /// # Errors
    /// Returns `ConfigError::Malformed` if `value` is not an object, or
    /// `ConfigError::NotAPositiveInteger` naming the first bad option.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::Malformed(format!("expected an object, got {}", value)))?;

        let defaults = Self::default();
        let option = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match object.get(name) {
                None => Ok(default),
                Some(v) => positive_int(v).ok_or(ConfigError::NotAPositiveInteger { option: name }),
            }
        };

        let config = Self {
            event_window_size: option(EVENT_WINDOW_SIZE, defaults.event_window_size)?,
            max_events_per_window: option(MAX_EVENTS_PER_WINDOW, defaults.max_events_per_window)?,
            max_duplicate_events_per_window: option(
                MAX_DUPLICATE_EVENTS_PER_WINDOW,
                defaults.max_duplicate_events_per_window,
            )?,
        };
        Ok(config)
    }

    /// Parse and validate configuration from JSON text.
    ///
    /// # Errors
    /// See [`ThrottleConfig::from_json`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Check that every option is positive.
    ///
    /// # Errors
    /// Returns `ConfigError::NotAPositiveInteger` naming the first zero option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (EVENT_WINDOW_SIZE, self.event_window_size),
            (MAX_EVENTS_PER_WINDOW, self.max_events_per_window),
            (MAX_DUPLICATE_EVENTS_PER_WINDOW, self.max_duplicate_events_per_window),
        ];
        for (option, value) in checks {
            if value == 0 {
                return Err(ConfigError::NotAPositiveInteger { option });
            }
        }
        Ok(())
    }

    /// The window length as a `Duration`.
    pub fn event_window(&self) -> Duration {
        Duration::from_millis(self.event_window_size)
    }

    /// Convert into a window policy.
    ///
    /// # Errors
    /// Returns `ConfigError::NotAPositiveInteger` if an option is zero or does
    /// not fit in `usize`.
    pub fn to_policy(&self) -> Result<WindowPolicy, ConfigError> {
        self.validate()?;

        let max_events = usize::try_from(self.max_events_per_window).map_err(|_| {
            ConfigError::NotAPositiveInteger {
                option: MAX_EVENTS_PER_WINDOW,
            }
        })?;
        let max_duplicates = usize::try_from(self.max_duplicate_events_per_window).map_err(|_| {
            ConfigError::NotAPositiveInteger {
                option: MAX_DUPLICATE_EVENTS_PER_WINDOW,
            }
        })?;

        WindowPolicy::new(self.event_window(), max_events, max_duplicates).map_err(|e| {
            // validate() already covers every zero case
            ConfigError::Malformed(e.to_string())
        })
    }
}

/// A JSON number that is a positive integer. `5.0` counts, `5.5` does not.
fn positive_int(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return (n > 0).then_some(n);
    }
    let f = value.as_f64()?;
    if f >= 1.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

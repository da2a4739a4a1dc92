//! Runtime environment marker.

use std::fmt;

/// The environment the relay is running in.
///
/// Only `Production` changes behaviour: the local sync script is never run there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeEnv {
    Production,
    #[default]
    Development,
}

impl RuntimeEnv {
    /// Interprets a runtime marker value. Anything other than `production`
    /// (case-insensitive, surrounding whitespace ignored) is development.
    pub fn from_marker(marker: &str) -> Self {
        if marker.trim().eq_ignore_ascii_case("production") {
            RuntimeEnv::Production
        } else {
            RuntimeEnv::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnv::Production)
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnv::Production => write!(f, "production"),
            RuntimeEnv::Development => write!(f, "development"),
        }
    }
}

//! GitHub API error type for dispatch failures.

use std::fmt;
use thiserror::Error;

/// A failed `repository_dispatch` call.
#[derive(Debug, Error)]
pub struct DispatchError {
    /// The HTTP status code, if the request reached GitHub.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl DispatchError {
    /// Wraps an octocrab error, keeping the HTTP status when GitHub answered.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => source.message.clone(),
            other => other.to_string(),
        };

        Self {
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Creates an error without an octocrab source.
    pub fn without_source(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_status() {
        let err = DispatchError::without_source(Some(404), "Not Found");
        assert_eq!(err.to_string(), "GitHub API error (HTTP 404): Not Found");
    }

    #[test]
    fn display_without_status() {
        let err = DispatchError::without_source(None, "connection refused");
        assert_eq!(err.to_string(), "GitHub API error: connection refused");
    }
}

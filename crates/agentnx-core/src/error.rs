//! Error taxonomy shared by the registry, the invoker and the pipeline.
//!
//! Two kinds matter to callers: configuration problems the user can fix in
//! the settings, and upstream problems reported by a provider. The facade
//! tells them apart with [`Error::is_configuration`].

use std::time::Duration;

use thiserror::Error;

/// Result alias used across the AgentNx crates.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required provider, model or credential is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-success HTTP status, transport failure or malformed body.
    ///
    /// `message` carries the upstream text (truncated), never the credential.
    #[error("upstream error{}: {message}", format_status(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// The host-supplied deadline elapsed before the reply was ready.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Upstream failure without an HTTP status (network error, bad body).
    pub fn upstream(msg: impl Into<String>) -> Self {
        Error::Upstream {
            status: None,
            message: msg.into(),
        }
    }

    pub fn upstream_status(status: u16, msg: impl Into<String>) -> Self {
        Error::Upstream {
            status: Some(status),
            message: msg.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_with_status() {
        let err = Error::upstream_status(429, "Rate limit exceeded");
        assert_eq!(err.to_string(), "upstream error (HTTP 429): Rate limit exceeded");
        assert!(err.is_upstream());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_upstream_display_without_status() {
        let err = Error::upstream("connection refused");
        assert_eq!(err.to_string(), "upstream error: connection refused");
    }

    #[test]
    fn test_configuration_display() {
        let err = Error::configuration("provider not configured: openai");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("provider not configured"));
    }
}

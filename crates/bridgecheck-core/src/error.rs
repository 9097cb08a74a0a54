//! Error types for the conformance harness
//!
//! Two families live here. [`HarnessError`] covers everything that stops the
//! process before a scenario outcome exists (bad arguments, unknown scenario
//! names, transport setup). [`ScenarioError`] is what a scenario body returns
//! when the system under test misbehaves; it always becomes a reported
//! [`Outcome::Failure`](crate::Outcome::Failure).

use thiserror::Error;

use crate::config::ConfigError;

/// Boxed error used at the transport seam, where each adapter has its own error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ----------------------------------------------------------------------------
// Fatal Harness Errors
// ----------------------------------------------------------------------------

/// Errors that terminate the harness without producing a scenario outcome
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Unknown test scenario: {name}")]
    UnknownScenario { name: String, available: Vec<String> },

    #[error("Scenario registered twice: {0}")]
    DuplicateScenario(String),

    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Transport setup failed: {0}")]
    TransportSetup(#[source] BoxError),
}

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

// ----------------------------------------------------------------------------
// Scenario Failures
// ----------------------------------------------------------------------------

/// Reasons a scenario body reports failure
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// The scenario observed a wrong or missing result.
    #[error("{0}")]
    Failed(String),

    /// The transport failed while the scenario was using it.
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// The scenario stopped because the supervisor gave up waiting.
    #[error("scenario cancelled before completion")]
    Cancelled,

    #[error("scenario panicked: {0}")]
    Panicked(String),
}

impl ScenarioError {
    /// Build a failure from a human-readable description
    pub fn failed(reason: impl Into<String>) -> Self {
        ScenarioError::Failed(reason.into())
    }

    /// Wrap an adapter error raised mid-scenario
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ScenarioError::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timeout_message() {
        let err = HarnessError::InvalidTimeout("abc".to_string());
        assert_eq!(err.to_string(), "Invalid timeout: abc");
    }

    #[test]
    fn test_transport_failure_is_verbatim() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset the stream");
        let err = ScenarioError::transport(io);
        assert_eq!(err.to_string(), "peer reset the stream");
    }
}

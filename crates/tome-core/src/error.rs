//! Error taxonomy for the conversation core.

use crate::run_state::RunPhase;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the orchestrator and the assistant backend client.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Run {phase}: {reason}")]
    RunFailed { phase: RunPhase, reason: String },

    #[error("Run still pending after {attempts} polls ({waited:?})")]
    Timeout { attempts: u32, waited: Duration },

    #[error("Assistant backend error{}: {message}", status_suffix(.status))]
    Backend { status: Option<u16>, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" {}", s)).unwrap_or_default()
}

impl CoreError {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        CoreError::Backend {
            status,
            message: message.into(),
        }
    }

    /// HTTP-like status for the boundary layer. Upstream codes pass through when they are
    /// client or server errors; everything unclassified is 500.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::InvalidInput(_) => 400,
            CoreError::RunFailed { .. } => 502,
            CoreError::Timeout { .. } => 504,
            CoreError::Backend { status, .. } => match status {
                Some(code) if (400..600).contains(code) => *code,
                _ => 500,
            },
            CoreError::Config(_) => 500,
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Backend {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(CoreError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(
            CoreError::Timeout { attempts: 60, waited: Duration::from_secs(60) }.status_code(),
            504
        );
        assert_eq!(CoreError::backend(Some(429), "slow down").status_code(), 429);
        assert_eq!(CoreError::backend(Some(200), "odd").status_code(), 500);
        assert_eq!(CoreError::backend(None, "connect refused").status_code(), 500);
    }

    #[test]
    fn backend_display_includes_status() {
        let err = CoreError::backend(Some(401), "bad key");
        assert_eq!(err.to_string(), "Assistant backend error 401: bad key");
        let err = CoreError::backend(None, "timeout");
        assert_eq!(err.to_string(), "Assistant backend error: timeout");
    }
}

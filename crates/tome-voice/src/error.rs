//! Error types for the Tome voice layer

use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors that can occur in speech synthesis and transcription
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown TTS provider '{name}' (known: {known})")]
    UnknownProvider { name: String, known: String },

    #[error("TTS provider '{provider}' is not configured: {guidance}")]
    MisconfiguredProvider { provider: String, guidance: String },

    #[error("TTS error: {0}")]
    Synthesis(String),

    #[error("Speech backend error{}: {message}", status_suffix(.status))]
    Backend { status: Option<u16>, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" {}", s)).unwrap_or_default()
}

impl VoiceError {
    /// HTTP-like status for the boundary layer.
    pub fn status_code(&self) -> u16 {
        match self {
            VoiceError::InvalidInput(_) | VoiceError::UnknownProvider { .. } => 400,
            VoiceError::MisconfiguredProvider { .. } => 503,
            VoiceError::Synthesis(_) => 502,
            VoiceError::Backend { status, .. } => match status {
                Some(code) if (400..600).contains(code) => *code,
                _ => 500,
            },
            VoiceError::Config(_) => 500,
        }
    }
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Backend {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

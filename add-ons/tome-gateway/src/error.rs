//! Boundary error: every failure leaves the gateway as `{ "error": "..." }` with a mapped status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tome_core::CoreError;
use tome_voice::VoiceError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn from_code(code: u16, message: String) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::from_code(err.status_code(), err.to_string())
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        Self::from_code(err.status_code(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(target: "tome::gateway", status = %self.status, "{}", self.message);
        } else {
            tracing::warn!(target: "tome::gateway", status = %self.status, "{}", self.message);
        }
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn core_errors_keep_their_status() {
        let timeout = ApiError::from(CoreError::Timeout {
            attempts: 60,
            waited: Duration::from_secs(60),
        });
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);

        let upstream = ApiError::from(CoreError::backend(Some(429), "rate limited"));
        assert_eq!(upstream.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(upstream.message.contains("rate limited"));
    }

    #[test]
    fn voice_errors_keep_their_status() {
        let unknown = ApiError::from(VoiceError::UnknownProvider {
            name: "polly".to_string(),
            known: "openai, elevenlabs".to_string(),
        });
        assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
        assert!(unknown.message.contains("polly"));
    }
}

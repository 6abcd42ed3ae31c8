//! Direct synthesis: `{text, provider?}` to `{audioUrl, provider}`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: String,
    /// Falls back to the configured default provider.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub audio_url: String,
    pub provider: String,
}

pub async fn speech(
    State(state): State<AppState>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Json<SpeechResponse>, ApiError> {
    let Json(req) = payload?;
    let provider = req
        .provider
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| state.speech.default_provider());
    let handle = state.speech.synthesize(&req.text, provider).await?;
    Ok(Json(SpeechResponse {
        audio_url: handle.url,
        provider: handle.provider.to_string(),
    }))
}

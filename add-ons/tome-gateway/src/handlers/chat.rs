//! Chat handler: one grounded turn, with best-effort spoken audio.
//!
//! The orchestrator does the assistant/thread/run work. Speech failures are logged and the
//! reply goes out without `audioUrl`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub thread_id: String,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let answer = state
        .orchestrator
        .answer(&req.message, req.thread_id.as_deref())
        .await?;

    let audio_url = if state.speak_replies {
        match state.speech.synthesize_default(&answer.text).await {
            Ok(handle) => Some(handle.url),
            Err(e) => {
                tracing::warn!(target: "tome::gateway", thread_id = %answer.thread_id, "TTS skipped: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing::info!(
        target: "tome::gateway",
        thread_id = %answer.thread_id,
        sources = answer.sources.len(),
        audio = audio_url.is_some(),
        "Chat turn answered"
    );

    Ok(Json(ChatResponse {
        response: answer.text,
        thread_id: answer.thread_id,
        sources: answer.sources,
        tools_used: answer.tools_used,
        audio_url,
    }))
}

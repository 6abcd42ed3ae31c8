//! Transcription: multipart upload (field `audio` or `file`) to `{text}`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tome_voice::{transcribe as transcribe_blob, AudioBlob};

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut blob: Option<AudioBlob> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != "audio" && name != "file" {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("could not read audio field: {}", e)))?;
        let mut b = AudioBlob::new(bytes.to_vec());
        if let Some(n) = file_name {
            b = b.with_file_name(n);
        }
        if let Some(ct) = content_type {
            b = b.with_content_type(ct);
        }
        blob = Some(b);
        break;
    }

    let blob = blob.unwrap_or_default();
    if blob.is_empty() {
        return Err(ApiError::bad_request("no audio payload supplied (field `audio` or `file`)"));
    }
    let stt = state.stt.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "transcription is not configured: set TTS_API_KEY or OPENAI_API_KEY",
        )
    })?;
    let text = transcribe_blob(stt.as_ref(), &blob).await?;
    tracing::debug!(target: "tome::gateway", chars = text.len(), "Transcribed upload");
    Ok(Json(TranscribeResponse { text }))
}

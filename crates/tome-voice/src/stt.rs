//! **Speech-to-Text (STT)**: forward recorded audio to a hosted transcription API.
//!
//! Implement `SttBackend` for any remote service; use `transcribe` with it to get a String
//! for the chat turn.

use crate::config::VoiceConfig;
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Uploaded audio as received from the client.
#[derive(Debug, Clone, Default)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    /// Original file name, if the client sent one (e.g. `recording.webm`).
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Backend for converting an audio blob to text.
#[async_trait]
pub trait SttBackend: Send + Sync {
    async fn transcribe_blob(&self, blob: &AudioBlob) -> VoiceResult<String>;
}

/// Transcribe one upload. Rejects an empty payload before calling the backend.
pub async fn transcribe<B: SttBackend + ?Sized>(backend: &B, blob: &AudioBlob) -> VoiceResult<String> {
    if blob.is_empty() {
        return Err(VoiceError::InvalidInput("no audio payload supplied".to_string()));
    }
    let text = backend.transcribe_blob(blob).await?;
    Ok(text.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Hosted STT: OpenAI-compatible `/audio/transcriptions` with a fixed language hint.
#[derive(Debug, Clone)]
pub struct OpenAiStt {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    pub api_key: String,
    /// whisper-1 or gpt-4o-transcribe, etc.
    pub model: String,
    /// ISO-639-1 hint sent with every request.
    pub language: String,
    client: reqwest::Client,
}

impl OpenAiStt {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        language: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceError::Config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            language: language.into(),
            client,
        })
    }

    /// Build from voice config. Requires the hosted credential.
    pub fn from_config(config: &VoiceConfig) -> VoiceResult<Self> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            VoiceError::Config("STT requires TTS_API_KEY or OPENAI_API_KEY".to_string())
        })?;
        Self::new(
            config.openai_base_url.clone(),
            api_key,
            config.stt_model.clone(),
            config.stt_language.clone(),
        )
    }
}

#[async_trait]
impl SttBackend for OpenAiStt {
    async fn transcribe_blob(&self, blob: &AudioBlob) -> VoiceResult<String> {
        let url = format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'));
        let file_name = blob
            .file_name
            .clone()
            .unwrap_or_else(|| "audio.webm".to_string());
        let mime = blob.content_type.as_deref().unwrap_or("audio/webm");
        let part = reqwest::multipart::Part::bytes(blob.bytes.clone())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| VoiceError::InvalidInput(format!("bad audio content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Backend {
                status: Some(status.as_u16()),
                message: format!("STT API error: {}", body.trim()),
            });
        }
        let parsed: TranscriptionResponse = res.json().await?;
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStt {
        text: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SttBackend for FixedStt {
        async fn transcribe_blob(&self, _blob: &AudioBlob) -> VoiceResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_without_backend_call() {
        let backend = FixedStt { text: "unused", calls: AtomicUsize::new(0) };
        let err = transcribe(&backend, &AudioBlob::new(Vec::new())).await.unwrap_err();
        assert!(matches!(err, VoiceError::InvalidInput(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transcript_is_trimmed() {
        let backend = FixedStt { text: "  hello there \n", calls: AtomicUsize::new(0) };
        let text = transcribe(&backend, &AudioBlob::new(vec![1, 2, 3])).await.unwrap();
        assert_eq!(text, "hello there");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn from_config_requires_credential() {
        let err = OpenAiStt::from_config(&VoiceConfig::default()).unwrap_err();
        assert!(matches!(err, VoiceError::Config(_)));
    }
}

//! **Text-to-Speech**: hosted synthesis backends and the provider registry they plug into.
//!
//! Implement `TtsBackend` for a hosted API; `TtsProvider` is the closed set of names the
//! `SpeechGateway` dispatches on.

use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Marker appended to text cut down to a backend's limit.
pub const TRUNCATION_MARKER: &str = "...";

const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io/v1";
const ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

/// Backend that turns text into audio bytes (MP3).
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize already-truncated text.
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>>;

    /// MIME type of the returned bytes.
    fn mime_type(&self) -> &str {
        "audio/mpeg"
    }
}

/// Registered synthesis providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// Hosted default (OpenAI speech).
    OpenAi,
    /// Alternate hosted backend (ElevenLabs); may be left unconfigured.
    ElevenLabs,
}

impl TtsProvider {
    pub const ALL: [TtsProvider; 2] = [TtsProvider::OpenAi, TtsProvider::ElevenLabs];

    pub fn as_str(self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "openai",
            TtsProvider::ElevenLabs => "elevenlabs",
        }
    }

    /// Maximum characters the backend accepts per request.
    pub fn char_limit(self) -> usize {
        match self {
            TtsProvider::OpenAi => 4096,
            TtsProvider::ElevenLabs => 5000,
        }
    }

    /// How to fix a missing credential.
    pub fn setup_guidance(self) -> &'static str {
        match self {
            TtsProvider::OpenAi => {
                "set TTS_API_KEY or OPENAI_API_KEY, or switch providers with TTS_PROVIDER=elevenlabs"
            }
            TtsProvider::ElevenLabs => {
                "set ELEVENLABS_API_KEY (and optionally ELEVENLABS_VOICE_ID), or switch providers with TTS_PROVIDER=openai"
            }
        }
    }

    fn known_names() -> String {
        Self::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsProvider {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "default" | "hosted" => Ok(TtsProvider::OpenAi),
            "elevenlabs" | "eleven_labs" | "alternate" => Ok(TtsProvider::ElevenLabs),
            _ => Err(VoiceError::UnknownProvider {
                name: s.trim().to_string(),
                known: Self::known_names(),
            }),
        }
    }
}

/// Playable reference to synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioHandle {
    pub url: String,
    pub provider: TtsProvider,
}

impl AudioHandle {
    /// Self-contained `data:` URL for the given bytes.
    pub fn data_url(provider: TtsProvider, mime_type: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            url: format!("data:{};base64,{}", mime_type, encoded),
            provider,
        }
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with `TRUNCATION_MARKER`.
pub fn truncate_for_speech(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(TRUNCATION_MARKER.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

async fn read_audio(res: reqwest::Response, provider: TtsProvider) -> VoiceResult<Vec<u8>> {
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(VoiceError::Synthesis(format!(
            "{} TTS API error {}: {}",
            provider,
            status,
            body.trim()
        )));
    }
    let bytes = res
        .bytes()
        .await
        .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
    if bytes.is_empty() {
        return Err(VoiceError::Synthesis(format!("{} returned no audio", provider)));
    }
    Ok(bytes.to_vec())
}

/// Hosted default: OpenAI-compatible `/audio/speech`.
#[derive(Debug, Clone)]
pub struct OpenAiTts {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    pub api_key: String,
    /// tts-1 (fast) or tts-1-hd.
    pub model: String,
    pub voice: String,
    client: reqwest::Client,
}

impl OpenAiTts {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VoiceError::Config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            voice: voice.into(),
            client,
        })
    }
}

#[async_trait]
impl TtsBackend for OpenAiTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
        read_audio(res, TtsProvider::OpenAi).await
    }
}

/// Alternate hosted backend: ElevenLabs text-to-speech.
#[derive(Debug, Clone)]
pub struct ElevenLabsTts {
    pub api_key: String,
    pub voice_id: String,
    client: reqwest::Client,
}

impl ElevenLabsTts {
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VoiceError::Config(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            client,
        })
    }
}

#[async_trait]
impl TtsBackend for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let url = format!(
            "{}/text-to-speech/{}",
            ELEVENLABS_API_BASE, self.voice_id
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": ELEVENLABS_MODEL,
        });
        let res = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;
        read_audio(res, TtsProvider::ElevenLabs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("OpenAI".parse::<TtsProvider>().unwrap(), TtsProvider::OpenAi);
        assert_eq!(" elevenlabs ".parse::<TtsProvider>().unwrap(), TtsProvider::ElevenLabs);
        assert_eq!("default".parse::<TtsProvider>().unwrap(), TtsProvider::OpenAi);
        assert_eq!("alternate".parse::<TtsProvider>().unwrap(), TtsProvider::ElevenLabs);
        let err = "polly".parse::<TtsProvider>().unwrap_err();
        match err {
            VoiceError::UnknownProvider { name, known } => {
                assert_eq!(name, "polly");
                assert_eq!(known, "openai, elevenlabs");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(truncate_for_speech("hello", 4096), "hello");
        let exact = "a".repeat(4096);
        assert_eq!(truncate_for_speech(&exact, 4096), exact);
    }

    #[test]
    fn long_text_is_cut_to_limit_with_marker() {
        let long = "b".repeat(5000);
        let out = truncate_for_speech(&long, 4096);
        assert_eq!(out.chars().count(), 4096);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(out.starts_with("bbbb"));
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let long = "é".repeat(10);
        let out = truncate_for_speech(&long, 6);
        assert_eq!(out, "ééé...");
    }

    #[test]
    fn data_url_is_base64_encoded() {
        let handle = AudioHandle::data_url(TtsProvider::OpenAi, "audio/mpeg", b"ID3");
        assert_eq!(handle.url, "data:audio/mpeg;base64,SUQz");
        assert_eq!(handle.provider, TtsProvider::OpenAi);
    }
}

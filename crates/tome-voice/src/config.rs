//! Voice configuration loaded from the environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | TTS_PROVIDER | openai | `openai` (hosted default) or `elevenlabs` (alternate). |
//! | TTS_API_KEY / OPENAI_API_KEY | unset | Credential for hosted OpenAI speech (TTS and STT). |
//! | TTS_API_URL | https://api.openai.com/v1 | OpenAI-compatible base URL. |
//! | TTS_MODEL | tts-1 | Hosted TTS model. |
//! | TTS_VOICE | alloy | Hosted TTS voice. |
//! | ELEVENLABS_API_KEY | unset | Credential for the alternate backend. |
//! | ELEVENLABS_VOICE_ID | `DEFAULT_ELEVENLABS_VOICE_ID` | Alternate backend voice override. |
//! | STT_MODEL | whisper-1 | Transcription model. |
//! | STT_LANGUAGE | en | Language hint sent with every transcription. |

use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_TTS_VOICE: &str = "alloy";
pub const DEFAULT_ELEVENLABS_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_STT_MODEL: &str = "whisper-1";
pub const DEFAULT_STT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Provider name as configured; validated when the gateway dispatches.
    pub tts_provider: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: String,
    pub stt_model: String,
    pub stt_language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            tts_provider: "openai".to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            elevenlabs_api_key: None,
            elevenlabs_voice_id: DEFAULT_ELEVENLABS_VOICE_ID.to_string(),
            stt_model: DEFAULT_STT_MODEL.to_string(),
            stt_language: DEFAULT_STT_LANGUAGE.to_string(),
        }
    }
}

impl VoiceConfig {
    /// Load from environment. Unset or blank values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tts_provider: env_opt_string("TTS_PROVIDER").unwrap_or(defaults.tts_provider),
            openai_api_key: env_opt_string("TTS_API_KEY").or_else(|| env_opt_string("OPENAI_API_KEY")),
            openai_base_url: env_opt_string("TTS_API_URL").unwrap_or(defaults.openai_base_url),
            tts_model: env_opt_string("TTS_MODEL").unwrap_or(defaults.tts_model),
            tts_voice: env_opt_string("TTS_VOICE").unwrap_or(defaults.tts_voice),
            elevenlabs_api_key: env_opt_string("ELEVENLABS_API_KEY"),
            elevenlabs_voice_id: env_opt_string("ELEVENLABS_VOICE_ID").unwrap_or(defaults.elevenlabs_voice_id),
            stt_model: env_opt_string("STT_MODEL").unwrap_or(defaults.stt_model),
            stt_language: env_opt_string("STT_LANGUAGE").unwrap_or(defaults.stt_language),
        }
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

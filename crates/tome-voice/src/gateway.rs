//! **SpeechGateway**: dispatches a synthesis request to the backend registered for a provider.
//!
//! Unknown names are rejected before any network call. A known provider without credentials
//! fails with setup guidance; there is no fallback to another provider.

use crate::config::VoiceConfig;
use crate::error::{VoiceError, VoiceResult};
use crate::tts::{truncate_for_speech, AudioHandle, ElevenLabsTts, OpenAiTts, TtsBackend, TtsProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SpeechGateway {
    default_provider: String,
    openai: Option<Arc<dyn TtsBackend>>,
    elevenlabs: Option<Arc<dyn TtsBackend>>,
}

impl SpeechGateway {
    /// Empty registry; every provider is unconfigured until a backend is registered.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            default_provider: default_provider.into(),
            openai: None,
            elevenlabs: None,
        }
    }

    /// Register hosted backends for every provider whose credential is present.
    pub fn from_config(config: &VoiceConfig) -> VoiceResult<Self> {
        let mut gateway = Self::new(config.tts_provider.clone());
        if let Some(key) = config.openai_api_key.as_deref() {
            let tts = OpenAiTts::new(
                config.openai_base_url.clone(),
                key,
                config.tts_model.clone(),
                config.tts_voice.clone(),
            )?;
            gateway = gateway.with_backend(TtsProvider::OpenAi, Arc::new(tts));
        }
        if let Some(key) = config.elevenlabs_api_key.as_deref() {
            let tts = ElevenLabsTts::new(key, config.elevenlabs_voice_id.clone())?;
            gateway = gateway.with_backend(TtsProvider::ElevenLabs, Arc::new(tts));
        }
        Ok(gateway)
    }

    pub fn with_backend(mut self, provider: TtsProvider, backend: Arc<dyn TtsBackend>) -> Self {
        *self.slot_mut(provider) = Some(backend);
        self
    }

    /// Configured provider name (may be unknown; checked on dispatch).
    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub fn is_configured(&self, provider: TtsProvider) -> bool {
        self.slot(provider).is_some()
    }

    /// Log which providers are usable (call once at startup).
    pub fn log_status(&self) {
        for provider in TtsProvider::ALL {
            if self.is_configured(provider) {
                info!(target: "tome::voice", "TTS: [{}] ready", provider);
            } else {
                info!(target: "tome::voice", "TTS: [{}] not configured ({})", provider, provider.setup_guidance());
            }
        }
        if let Err(e) = self.default_provider.parse::<TtsProvider>() {
            warn!(target: "tome::voice", "Default TTS provider is invalid: {}", e);
        }
    }

    /// Synthesize with the default provider.
    pub async fn synthesize_default(&self, text: &str) -> VoiceResult<AudioHandle> {
        self.synthesize(text, &self.default_provider).await
    }

    /// Synthesize `text` with the named provider, truncating to the provider's limit.
    pub async fn synthesize(&self, text: &str, provider_name: &str) -> VoiceResult<AudioHandle> {
        let provider: TtsProvider = provider_name.parse()?;
        let backend = self
            .slot(provider)
            .ok_or_else(|| VoiceError::MisconfiguredProvider {
                provider: provider.to_string(),
                guidance: provider.setup_guidance().to_string(),
            })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::InvalidInput("nothing to synthesize".to_string()));
        }
        let limit = provider.char_limit();
        let input = truncate_for_speech(text, limit);
        if input.len() != text.len() {
            debug!(target: "tome::voice", %provider, limit, "Truncated TTS input");
        }

        let bytes = backend.synthesize(&input).await?;
        Ok(AudioHandle::data_url(provider, backend.mime_type(), &bytes))
    }

    fn slot(&self, provider: TtsProvider) -> Option<&Arc<dyn TtsBackend>> {
        match provider {
            TtsProvider::OpenAi => self.openai.as_ref(),
            TtsProvider::ElevenLabs => self.elevenlabs.as_ref(),
        }
    }

    fn slot_mut(&mut self, provider: TtsProvider) -> &mut Option<Arc<dyn TtsBackend>> {
        match provider {
            TtsProvider::OpenAi => &mut self.openai,
            TtsProvider::ElevenLabs => &mut self.elevenlabs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_registers_only_credentialed_providers() {
        let config = VoiceConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..VoiceConfig::default()
        };
        let gateway = SpeechGateway::from_config(&config).unwrap();
        assert!(gateway.is_configured(TtsProvider::OpenAi));
        assert!(!gateway.is_configured(TtsProvider::ElevenLabs));
        assert_eq!(gateway.default_provider(), "openai");
    }

    #[test]
    fn invalid_default_provider_surfaces_on_dispatch() {
        let gateway = SpeechGateway::new("festival");
        let err = tokio_test::block_on(gateway.synthesize_default("hello")).unwrap_err();
        assert!(matches!(err, VoiceError::UnknownProvider { .. }));
    }
}

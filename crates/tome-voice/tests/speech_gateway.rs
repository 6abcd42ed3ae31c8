use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tome_voice::{
    SpeechGateway, TtsBackend, TtsProvider, VoiceError, VoiceResult, TRUNCATION_MARKER,
};

/// Records every input it is asked to speak.
#[derive(Default)]
struct RecordingTts {
    inputs: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingTts {
    fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl TtsBackend for RecordingTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(VoiceError::Synthesis("upstream 500".to_string()));
        }
        Ok(b"ID3".to_vec())
    }
}

fn gateway_with_openai(tts: Arc<RecordingTts>) -> SpeechGateway {
    SpeechGateway::new("openai").with_backend(TtsProvider::OpenAi, tts)
}

#[tokio::test]
async fn unknown_provider_fails_before_any_backend_call() {
    let tts = Arc::new(RecordingTts::default());
    let gateway = gateway_with_openai(tts.clone());

    let err = gateway.synthesize("hello", "polly").await.unwrap_err();
    assert!(matches!(err, VoiceError::UnknownProvider { .. }));
    assert_eq!(err.status_code(), 400);
    assert!(tts.inputs().is_empty());
}

#[tokio::test]
async fn oversized_input_is_truncated_and_still_returns_handle() {
    let tts = Arc::new(RecordingTts::default());
    let gateway = gateway_with_openai(tts.clone());

    let text = "x".repeat(5000);
    let handle = gateway.synthesize(&text, "openai").await.unwrap();

    assert!(handle.url.starts_with("data:audio/mpeg;base64,"));
    assert_eq!(handle.provider, TtsProvider::OpenAi);
    let inputs = tts.inputs();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].chars().count(), 4096);
    assert!(inputs[0].ends_with(TRUNCATION_MARKER));
}

#[tokio::test]
async fn unconfigured_alternate_provider_reports_guidance_without_fallback() {
    let tts = Arc::new(RecordingTts::default());
    let gateway = gateway_with_openai(tts.clone());

    let err = gateway.synthesize("hello", "ElevenLabs").await.unwrap_err();
    match &err {
        VoiceError::MisconfiguredProvider { provider, guidance } => {
            assert_eq!(provider, "elevenlabs");
            assert!(guidance.contains("ELEVENLABS_API_KEY"));
            assert!(guidance.contains("TTS_PROVIDER=openai"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(err.status_code(), 503);
    assert!(tts.inputs().is_empty());
}

#[tokio::test]
async fn alternate_provider_uses_its_own_limit() {
    let tts = Arc::new(RecordingTts::default());
    let gateway = SpeechGateway::new("alternate").with_backend(TtsProvider::ElevenLabs, tts.clone());

    let text = "y".repeat(4500);
    let handle = gateway.synthesize_default(&text).await.unwrap();
    assert_eq!(handle.provider, TtsProvider::ElevenLabs);
    assert_eq!(tts.inputs()[0].chars().count(), 4500);
}

#[tokio::test]
async fn blank_text_is_invalid_input() {
    let tts = Arc::new(RecordingTts::default());
    let gateway = gateway_with_openai(tts.clone());

    let err = gateway.synthesize("   ", "openai").await.unwrap_err();
    assert!(matches!(err, VoiceError::InvalidInput(_)));
    assert!(tts.inputs().is_empty());
}

#[tokio::test]
async fn remote_failure_surfaces_as_synthesis_error() {
    let tts = Arc::new(RecordingTts::failing());
    let gateway = gateway_with_openai(tts.clone());

    let err = gateway.synthesize("hello", "openai").await.unwrap_err();
    assert!(matches!(err, VoiceError::Synthesis(_)));
    assert_eq!(err.status_code(), 502);
}

//! Shared handler state.

use std::sync::Arc;
use tome_core::Orchestrator;
use tome_voice::{SpeechGateway, SttBackend};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub speech: Arc<SpeechGateway>,
    /// None when no hosted transcription credential is configured.
    pub stt: Option<Arc<dyn SttBackend>>,
    /// Attach synthesized audio to chat replies.
    pub speak_replies: bool,
}

//! # Tome Voice
//!
//! Hosted speech around a chat turn: a provider-selected text-to-speech gateway that returns
//! inline audio handles, and a transcription adapter for recorded questions.
//!
//! ```text
//!   answer text ──► SpeechGateway ──► [openai | elevenlabs] ──► data:audio/mpeg;base64,...
//!   audio blob  ──► transcribe    ──► OpenAiStt             ──► text
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod stt;
pub mod tts;

pub use config::VoiceConfig;
pub use error::{VoiceError, VoiceResult};
pub use gateway::SpeechGateway;
pub use stt::{transcribe, AudioBlob, OpenAiStt, SttBackend};
pub use tts::{
    truncate_for_speech, AudioHandle, ElevenLabsTts, OpenAiTts, TtsBackend, TtsProvider,
    TRUNCATION_MARKER,
};

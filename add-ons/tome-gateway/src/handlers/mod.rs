pub mod chat;
pub mod speech;
pub mod transcribe;

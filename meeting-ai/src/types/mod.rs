pub mod chat;
pub mod pattern;
pub mod transcription;

pub mod completion;
pub mod template_store;
pub mod transcription;

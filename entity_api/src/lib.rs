pub use entity::{audio_files, transcription_status, Id};

pub mod audio_file;
pub mod error;

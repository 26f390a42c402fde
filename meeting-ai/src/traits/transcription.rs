//! Transcription provider trait.

use crate::types::transcription::{Config, Transcription};
use crate::Error;
use async_trait::async_trait;
use std::path::Path;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations take a local audio file, hand it to the provider, and return
/// once the transcription has finished (or failed). Supports AssemblyAI today;
/// the trait keeps upload handling independent of the vendor.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe the audio file at `audio_path`, waiting for the job to finish.
    ///
    /// A job that the provider reports as failed is returned as `Error::Provider`.
    async fn transcribe(
        &self,
        audio_path: &Path,
        config: Config,
    ) -> std::result::Result<Transcription, Error>;

    /// Return unique identifier for this provider (e.g., "assemblyai").
    fn provider_id(&self) -> &str;
}

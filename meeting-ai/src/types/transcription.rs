//! Types for transcription operations.

use serde::{Deserialize, Serialize};

/// Processing status of a speech-to-text transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Continuous speech from a single speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub confidence: f64,
}

/// A finished (or failed) transcription as reported by a provider.
///
/// `utterances` is only populated when speaker labels were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub id: String,
    pub status: Status,
    pub text: Option<String>,
    pub utterances: Vec<Utterance>,
    pub duration_seconds: Option<f64>,
    pub error_message: Option<String>,
}

impl Transcription {
    /// Renders the transcript as one `Speaker <label>: <text>` paragraph per utterance.
    ///
    /// Falls back to the plain text when the provider returned no utterances.
    pub fn speaker_labeled_text(&self) -> String {
        if self.utterances.is_empty() {
            return self.text.clone().unwrap_or_default();
        }

        self.utterances
            .iter()
            .map(|u| format!("Speaker {}: {}\n\n", u.speaker, u.text))
            .collect()
    }
}

/// Options for a transcription job.
#[derive(Debug, Clone)]
pub struct Config {
    pub enable_speaker_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_speaker_labels: true,
        }
    }
}

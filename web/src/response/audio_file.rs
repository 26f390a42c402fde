use domain::audio_file::{self as AudioFileApi, AudioDetails, Page};
use domain::{audio_files::Model, transcription_status::TranscriptionStatus, Id};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use utoipa::ToSchema;

/// One recording as listed in the library.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AudioFileSummary {
    #[schema(value_type = String, format = Uuid)]
    pub(crate) id: Id,
    pub(crate) filename: String,
    pub(crate) original_filename: String,
    /// Seconds
    pub(crate) duration: f64,
    pub(crate) department: Option<String>,
    pub(crate) language: Vec<String>,
    #[schema(value_type = String, format = DateTime)]
    pub(crate) upload_time: DateTimeWithTimeZone,
    pub(crate) transcription_status: TranscriptionStatus,
}

impl From<Model> for AudioFileSummary {
    fn from(audio_file: Model) -> Self {
        Self {
            language: AudioFileApi::languages(&audio_file),
            id: audio_file.id,
            filename: audio_file.filename,
            original_filename: audio_file.original_filename,
            duration: audio_file.duration,
            department: audio_file.department,
            upload_time: audio_file.upload_time,
            transcription_status: audio_file.transcription_status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AudioFilePage {
    pub(crate) recordings: Vec<AudioFileSummary>,
    pub(crate) has_previous: bool,
    pub(crate) has_next: bool,
    pub(crate) total: u64,
}

impl From<Page> for AudioFilePage {
    fn from(page: Page) -> Self {
        Self {
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            total: page.total,
            recordings: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AudioFileDetails {
    #[serde(flatten)]
    pub(crate) audio_file: AudioFileSummary,
    pub(crate) transcript: Option<String>,
}

impl From<AudioDetails> for AudioFileDetails {
    fn from(details: AudioDetails) -> Self {
        Self {
            audio_file: details.audio_file.into(),
            transcript: details.transcript,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TranscriptResponse {
    pub(crate) transcript: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UploadResponse {
    pub(crate) message: String,
    #[schema(value_type = String, format = Uuid)]
    pub(crate) id: Id,
    pub(crate) filename: String,
}

impl From<Model> for UploadResponse {
    fn from(audio_file: Model) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            id: audio_file.id,
            filename: audio_file.filename,
        }
    }
}

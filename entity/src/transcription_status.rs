use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of an audio file's transcript through its lifecycle.
#[derive(
    Debug,
    Clone,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "transcription_status"
)]
pub enum TranscriptionStatus {
    /// Transcription was requested with the upload and has not finished yet
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Transcript written to disk and available
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Transcription was requested but the provider failed or is not configured
    #[sea_orm(string_value = "failed")]
    Failed,
    /// The upload did not ask for a transcript
    #[sea_orm(string_value = "not_requested")]
    NotRequested,
}

impl TranscriptionStatus {
    /// Initial status of a freshly uploaded file.
    pub fn on_upload(create_transcript: bool) -> Self {
        if create_transcript {
            TranscriptionStatus::Pending
        } else {
            TranscriptionStatus::NotRequested
        }
    }
}

impl std::fmt::Display for TranscriptionStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionStatus::Pending => write!(fmt, "pending"),
            TranscriptionStatus::Completed => write!(fmt, "completed"),
            TranscriptionStatus::Failed => write!(fmt, "failed"),
            TranscriptionStatus::NotRequested => write!(fmt, "not_requested"),
        }
    }
}

//! SeaORM Entity for audio_files table.
//! Tracks uploaded meeting recordings and their transcripts on disk.

use crate::transcription_status::TranscriptionStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::audio_files::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "audio_files")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Stored file name, unique across all uploads
    #[sea_orm(unique)]
    pub filename: String,

    /// File name as supplied by the uploading client
    pub original_filename: String,

    /// Location of the audio file on the server
    #[serde(skip_serializing)]
    pub filepath: String,

    /// Duration of the recording in seconds
    #[sea_orm(column_type = "Double")]
    pub duration: f64,

    pub department: Option<String>,

    /// JSON array of the languages spoken in the recording
    pub language: String,

    #[schema(value_type = String, format = DateTime)]
    pub upload_time: DateTimeWithTimeZone,

    /// Location of the transcript on the server, once one exists
    #[serde(skip_serializing)]
    pub transcript_path: Option<String>,

    pub transcription_status: TranscriptionStatus,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Workflows over uploaded meeting recordings: storing an upload, converting and
//! transcribing it, listing, reading back and deleting it.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::assembly_ai::AssemblyAiClient;
use crate::media::{self, MediaTools};
use crate::media_store::{self, MediaStore, StagedAudio};
use crate::{audio_files::Model, transcription_status::TranscriptionStatus, Id};
use entity_api::audio_file::{self as audio_file_api, NewAudioFile};
use log::*;
use meeting_ai::traits::transcription::Provider as TranscriptionProvider;
use meeting_ai::types::transcription::Config as TranscriptionConfig;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use entity_api::audio_file::{ListFilter, Page};

/// A file received from a client, staged in the audio directory but not yet
/// converted or recorded.
#[derive(Debug, Clone)]
pub struct Upload {
    pub audio: StagedAudio,
    pub create_transcript: bool,
    pub department: Option<String>,
    pub languages: Vec<String>,
}

/// An audio file together with the text of its transcript, when there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDetails {
    pub audio_file: Model,
    pub transcript: Option<String>,
}

/// Everything needed to turn an upload into a stored, transcribed recording.
/// Built once at startup and shared by all requests.
#[derive(Clone)]
pub struct AudioPipeline {
    store: MediaStore,
    tools: MediaTools,
    transcriber: Option<Arc<dyn TranscriptionProvider>>,
}

impl AudioPipeline {
    pub fn new(
        store: MediaStore,
        tools: MediaTools,
        transcriber: Option<Arc<dyn TranscriptionProvider>>,
    ) -> Self {
        Self {
            store,
            tools,
            transcriber,
        }
    }

    /// Transcription is only available when an AssemblyAI key is configured.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let transcriber: Option<Arc<dyn TranscriptionProvider>> =
            match config.assemblyai_api_key() {
                Some(api_key) => Some(Arc::new(AssemblyAiClient::new(
                    &api_key,
                    config.assemblyai_base_url(),
                    Duration::from_secs(config.transcription_poll_interval_secs),
                    Duration::from_secs(config.transcription_timeout_secs),
                )?)),
                None => {
                    warn!("ASSEMBLYAI_API_KEY is not set; requested transcriptions will fail");
                    None
                }
            };

        Ok(Self::new(
            MediaStore::from_config(config),
            MediaTools::from_config(config),
            transcriber,
        ))
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    pub async fn prepare(&self) -> Result<(), Error> {
        self.store.prepare().await
    }

    /// Convert and record a staged upload, transcribing it when requested.
    ///
    /// Files written for an upload that could not be recorded are removed again.
    pub async fn upload(&self, db: &DatabaseConnection, upload: Upload) -> Result<Model, Error> {
        let StagedAudio {
            original_filename,
            filename: stored_name,
            path: stored_path,
        } = upload.audio;

        let (filename, filepath) = if media::needs_conversion(&original_filename) {
            let mp3_name = media_store::mp3_filename(&stored_name);
            let mp3_path = self.store.audio_path(&mp3_name);

            let converted = self.tools.convert_to_mp3(&stored_path, &mp3_path).await;
            media_store::remove_file(&stored_path).await?;
            if let Err(e) = converted {
                error!("Failed to convert {original_filename} to MP3: {e}");
                media_store::remove_file(&mp3_path).await?;
                return Err(e);
            }

            (mp3_name, mp3_path)
        } else {
            (stored_name, stored_path)
        };

        let duration = self
            .tools
            .probe_duration(&filepath)
            .await
            .unwrap_or_else(|e| {
                warn!("Could not read the duration of {filename}: {e}");
                0.0
            });

        let new_file = NewAudioFile {
            filename: filename.clone(),
            original_filename,
            filepath: filepath.to_string_lossy().into_owned(),
            duration,
            department: upload.department.filter(|d| !d.trim().is_empty()),
            language: encode_languages(&upload.languages),
            transcription_status: TranscriptionStatus::on_upload(upload.create_transcript),
        };

        let audio_file = match audio_file_api::create(db, new_file).await {
            Ok(audio_file) => audio_file,
            Err(e) => {
                warn!("Failed to record upload {filename}: {e}");
                media_store::remove_file(&filepath).await?;
                return Err(e.into());
            }
        };

        info!("Stored upload {} as {}", audio_file.id, audio_file.filename);

        if upload.create_transcript {
            self.transcribe(db, audio_file).await
        } else {
            Ok(audio_file)
        }
    }

    /// Transcribe a stored recording and record the outcome.
    ///
    /// Transcription failures are recorded on the audio file, not returned.
    pub async fn transcribe(
        &self,
        db: &DatabaseConnection,
        audio_file: Model,
    ) -> Result<Model, Error> {
        let transcript_path = match self.write_transcript(&audio_file).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Transcription of {} failed: {e}", audio_file.filename);
                None
            }
        };

        let status = if transcript_path.is_some() {
            TranscriptionStatus::Completed
        } else {
            TranscriptionStatus::Failed
        };

        Ok(audio_file_api::update_transcription(
            db,
            audio_file.id,
            status,
            transcript_path.map(|p| p.to_string_lossy().into_owned()),
        )
        .await?)
    }

    async fn write_transcript(&self, audio_file: &Model) -> Result<PathBuf, Error> {
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            Error::internal(InternalErrorKind::Config(
                "ASSEMBLYAI_API_KEY is not set".to_string(),
            ))
        })?;

        debug!(
            "Transcribing {} with {}",
            audio_file.filename,
            transcriber.provider_id()
        );

        let transcription = transcriber
            .transcribe(Path::new(&audio_file.filepath), TranscriptionConfig::default())
            .await?;

        let text = transcription.speaker_labeled_text();
        if text.trim().is_empty() {
            return Err(Error::internal(InternalErrorKind::Other(
                "transcription returned no text".to_string(),
            )));
        }

        self.store.save_transcript(&audio_file.filename, &text).await
    }
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Ok(audio_file_api::find_by_id(db, id).await?)
}

/// One page of recordings, newest first.
pub async fn list(
    db: &DatabaseConnection,
    filter: &ListFilter,
    page: u64,
    page_size: u64,
) -> Result<Page, Error> {
    Ok(audio_file_api::find_page(db, filter, page, page_size).await?)
}

pub async fn details(db: &DatabaseConnection, id: Id) -> Result<AudioDetails, Error> {
    let audio_file = find_by_id(db, id).await?;
    let transcript = match audio_file.transcript_path.as_deref() {
        Some(path) => media_store::read_transcript(Path::new(path)).await?,
        None => None,
    };

    Ok(AudioDetails {
        audio_file,
        transcript,
    })
}

/// The transcript text of a recording; missing transcripts are `NotFound`.
pub async fn transcript(db: &DatabaseConnection, id: Id) -> Result<String, Error> {
    details(db, id)
        .await?
        .transcript
        .ok_or_else(|| not_found("Transcript not found"))
}

/// Where the MP3 of a recording lives on disk. Fails when the file is gone.
pub async fn audio_path(db: &DatabaseConnection, id: Id) -> Result<PathBuf, Error> {
    let audio_file = find_by_id(db, id).await?;
    let path = PathBuf::from(audio_file.filepath);

    if tokio::fs::try_exists(&path).await? {
        Ok(path)
    } else {
        warn!("Audio file {id} is missing from {}", path.display());
        Err(not_found("File not found"))
    }
}

/// Remove the audio, the transcript and finally the record of a recording.
pub async fn delete(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let audio_file = find_by_id(db, id).await?;

    media_store::remove_file(Path::new(&audio_file.filepath)).await?;
    if let Some(transcript_path) = audio_file.transcript_path.as_deref() {
        media_store::remove_file(Path::new(transcript_path)).await?;
    }

    let deleted = audio_file_api::delete_by_id(db, audio_file.id).await?;
    info!("Deleted audio file {id}");
    Ok(deleted)
}

/// Split a comma separated query value, dropping blanks.
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Languages arrive either as a JSON array or as a comma separated list.
pub fn parse_languages(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(languages) => languages
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        Err(_) => parse_list(Some(raw)),
    }
}

/// The languages stored for a recording.
pub fn languages(audio_file: &Model) -> Vec<String> {
    parse_languages(&audio_file.language)
}

fn encode_languages(languages: &[String]) -> String {
    serde_json::Value::from(languages.to_vec()).to_string()
}

fn not_found(message: &str) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::NotFound(message.to_string())),
    }
}


// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::error::EntityErrorKind;
    use async_trait::async_trait;
    use meeting_ai::types::transcription::{Status, Transcription, Utterance};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    struct FixedTranscriber;

    #[async_trait]
    impl TranscriptionProvider for FixedTranscriber {
        async fn transcribe(
            &self,
            _audio_path: &Path,
            _config: TranscriptionConfig,
        ) -> Result<Transcription, meeting_ai::Error> {
            Ok(Transcription {
                id: "tr_1".to_string(),
                status: Status::Completed,
                text: Some("hello".to_string()),
                utterances: vec![Utterance {
                    speaker: "A".to_string(),
                    text: "hello".to_string(),
                    start_ms: 0,
                    end_ms: 400,
                    confidence: 0.9,
                }],
                duration_seconds: Some(1.0),
                error_message: None,
            })
        }

        fn provider_id(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline(root: &Path, transcriber: Option<Arc<dyn TranscriptionProvider>>) -> AudioPipeline {
        AudioPipeline::new(
            MediaStore::new(root.join("audio"), root.join("transcripts")),
            MediaTools::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe"),
            transcriber,
        )
    }

    fn audio_file_model(filepath: &Path) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            filename: "0b6c_standup.mp3".to_string(),
            original_filename: "standup.mp3".to_string(),
            filepath: filepath.to_string_lossy().into_owned(),
            duration: 0.0,
            department: Some("Engineering".to_string()),
            language: r#"["English"]"#.to_string(),
            upload_time: now.into(),
            transcript_path: None,
            transcription_status: TranscriptionStatus::NotRequested,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    async fn staged_upload(
        pipeline: &AudioPipeline,
        original_filename: &str,
        create_transcript: bool,
    ) -> Upload {
        let mut writer = pipeline.store().create_audio(original_filename).await.unwrap();
        writer.write_chunk(b"ID3").await.unwrap();

        Upload {
            audio: writer.finish().await.unwrap(),
            create_transcript,
            department: Some("Engineering".to_string()),
            languages: vec!["English".to_string()],
        }
    }

    #[tokio::test]
    async fn mp3_upload_without_transcript_is_recorded() -> Result<(), Error> {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), None);
        pipeline.prepare().await?;

        let model = audio_file_model(&dir.path().join("audio/0b6c_standup.mp3"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let upload = staged_upload(&pipeline, "standup.mp3", false).await;
        let recorded = pipeline.upload(&db, upload).await?;

        assert_eq!(recorded.id, model.id);
        let stored: Vec<_> = std::fs::read_dir(dir.path().join("audio"))
            .unwrap()
            .collect();
        assert_eq!(stored.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn failed_insert_removes_the_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), None);
        pipeline.prepare().await.unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![sea_orm::DbErr::Custom("insert failed".to_string())])
            .into_connection();

        let upload = staged_upload(&pipeline, "standup.mp3", false).await;
        assert!(pipeline.upload(&db, upload).await.is_err());
        assert_eq!(
            std::fs::read_dir(dir.path().join("audio")).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn failed_conversion_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), None);
        pipeline.prepare().await.unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let upload = staged_upload(&pipeline, "standup.wav", false).await;

        let err = pipeline.upload(&db, upload).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Media(_))
        ));
        assert_eq!(
            std::fs::read_dir(dir.path().join("audio")).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn transcribe_writes_the_transcript_and_completes() -> Result<(), Error> {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), Some(Arc::new(FixedTranscriber)));
        pipeline.prepare().await?;

        let model = audio_file_model(&dir.path().join("audio/0b6c_standup.mp3"));
        let transcript_path = pipeline.store().transcript_path(&model.filename);
        let completed = Model {
            transcription_status: TranscriptionStatus::Completed,
            transcript_path: Some(transcript_path.to_string_lossy().into_owned()),
            ..model.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![completed.clone()]])
            .into_connection();

        let updated = pipeline.transcribe(&db, model).await?;

        assert_eq!(updated.transcription_status, TranscriptionStatus::Completed);
        assert_eq!(
            std::fs::read_to_string(&transcript_path).unwrap(),
            "Speaker A: hello\n\n"
        );

        Ok(())
    }

    #[tokio::test]
    async fn transcribe_without_provider_marks_failed() -> Result<(), Error> {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), None);

        let model = audio_file_model(&dir.path().join("audio/0b6c_standup.mp3"));
        let failed = Model {
            transcription_status: TranscriptionStatus::Failed,
            ..model.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![failed]])
            .into_connection();

        let updated = pipeline.transcribe(&db, model).await?;

        assert_eq!(updated.transcription_status, TranscriptionStatus::Failed);
        assert_eq!(updated.transcript_path, None);

        Ok(())
    }

    #[tokio::test]
    async fn details_include_transcript_text() -> Result<(), Error> {
        let dir = tempfile::tempdir().unwrap();
        let transcript_path = dir.path().join("a.mp3.txt");
        std::fs::write(&transcript_path, "Speaker A: hi\n\n").unwrap();

        let model = Model {
            transcript_path: Some(transcript_path.to_string_lossy().into_owned()),
            ..audio_file_model(&dir.path().join("a.mp3"))
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let details = details(&db, model.id).await?;

        assert_eq!(details.transcript.as_deref(), Some("Speaker A: hi\n\n"));

        Ok(())
    }

    #[tokio::test]
    async fn transcript_of_untranscribed_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let model = audio_file_model(&dir.path().join("a.mp3"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let err = transcript(&db, model.id).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_an_entity_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let err = find_by_id(&db, Id::new_v4()).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }

    #[tokio::test]
    async fn delete_removes_files_and_record() -> Result<(), Error> {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("a.mp3");
        let transcript = dir.path().join("a.mp3.txt");
        std::fs::write(&audio, b"ID3").unwrap();
        std::fs::write(&transcript, "Speaker A: hi\n\n").unwrap();

        let model = Model {
            transcript_path: Some(transcript.to_string_lossy().into_owned()),
            ..audio_file_model(&audio)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![model.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let deleted = delete(&db, model.id).await?;

        assert_eq!(deleted.id, model.id);
        assert!(!audio.exists());
        assert!(!transcript.exists());

        Ok(())
    }
}

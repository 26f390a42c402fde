//! AssemblyAI API client for transcription services.
//!
//! This module provides an HTTP client for interacting with the AssemblyAI API
//! to transcribe uploaded meeting recordings with speaker diarization.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use meeting_ai::traits::transcription::Provider;
use meeting_ai::types::transcription::{Config, Status, Transcription, Utterance as SpeakerTurn};
use meeting_ai::Error as AiError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

const PROVIDER_ID: &str = "assemblyai";

/// Response from uploading raw audio bytes
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub upload_url: String,
}

/// Request to create a new transcription
#[derive(Debug, Serialize)]
pub struct CreateTranscriptRequest {
    pub audio_url: String,
    pub speaker_labels: bool,
}

/// Response from creating or polling a transcript
#[derive(Debug, Deserialize)]
pub struct TranscriptResponse {
    pub id: String,
    pub status: TranscriptStatus,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub utterances: Option<Vec<Utterance>>,
    #[serde(default)]
    pub audio_duration: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transcript processing status
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Utterance (speaker segment) with timing
#[derive(Debug, Deserialize, Clone)]
pub struct Utterance {
    pub text: String,
    pub start: i64,
    pub end: i64,
    pub confidence: f64,
    pub speaker: String,
}

impl From<TranscriptResponse> for Transcription {
    fn from(response: TranscriptResponse) -> Self {
        let status = match response.status {
            TranscriptStatus::Queued => Status::Queued,
            TranscriptStatus::Processing => Status::Processing,
            TranscriptStatus::Completed => Status::Completed,
            TranscriptStatus::Error => Status::Failed,
        };

        Transcription {
            id: response.id,
            status,
            text: response.text,
            utterances: response
                .utterances
                .unwrap_or_default()
                .into_iter()
                .map(|u| SpeakerTurn {
                    speaker: u.speaker,
                    text: u.text,
                    start_ms: u.start,
                    end_ms: u.end,
                    confidence: u.confidence,
                })
                .collect(),
            duration_seconds: response.audio_duration,
            error_message: response.error,
        }
    }
}

/// AssemblyAI API client
pub struct AssemblyAiClient {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl AssemblyAiClient {
    /// Create a new AssemblyAI client with the given API key and base URL.
    ///
    /// `poll_interval` is the pause between status checks; a transcript that has
    /// not finished within `timeout` is reported as a timeout.
    pub fn new(
        api_key: &str,
        base_url: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value = reqwest::header::HeaderValue::from_str(api_key).map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Invalid API key format".to_string(),
                )),
            }
        })?;
        header_value.set_sensitive(true);
        headers.insert("authorization", header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
            timeout,
        })
    }

    /// Upload a local audio file, returning the URL AssemblyAI assigned to it
    pub async fn upload_file(&self, audio_path: &Path) -> Result<String, AiError> {
        let url = format!("{}/upload", self.base_url);
        let bytes = tokio::fs::read(audio_path).await?;

        debug!(
            "Uploading {} bytes from {} to AssemblyAI",
            bytes.len(),
            audio_path.display()
        );

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to upload audio to AssemblyAI: {:?}", e);
                AiError::Network(e.to_string())
            })?;

        let upload: UploadResponse = Self::parse(response).await?;
        Ok(upload.upload_url)
    }

    /// Create a new transcription request
    pub async fn create_transcript(
        &self,
        request: CreateTranscriptRequest,
    ) -> Result<TranscriptResponse, AiError> {
        let url = format!("{}/transcript", self.base_url);

        debug!(
            "Creating AssemblyAI transcript for audio: {}",
            request.audio_url
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to create AssemblyAI transcript: {:?}", e);
                AiError::Network(e.to_string())
            })?;

        let transcript: TranscriptResponse = Self::parse(response).await?;
        info!("Created AssemblyAI transcript with ID: {}", transcript.id);
        Ok(transcript)
    }

    /// Get the status of a transcript
    pub async fn get_transcript(&self, transcript_id: &str) -> Result<TranscriptResponse, AiError> {
        let url = format!("{}/transcript/{}", self.base_url, transcript_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to get AssemblyAI transcript: {:?}", e);
            AiError::Network(e.to_string())
        })?;

        Self::parse(response).await
    }

    /// Poll a transcript until it completes, fails or the client timeout elapses
    pub async fn wait_for_completion(
        &self,
        transcript_id: &str,
    ) -> Result<TranscriptResponse, AiError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            let transcript = self.get_transcript(transcript_id).await?;

            match transcript.status {
                TranscriptStatus::Completed => return Ok(transcript),
                TranscriptStatus::Error => {
                    let message = transcript
                        .error
                        .unwrap_or_else(|| "transcription failed".to_string());
                    error!("AssemblyAI transcript {transcript_id} failed: {message}");
                    return Err(AiError::Provider(message));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {
                    if Instant::now() + self.poll_interval > deadline {
                        warn!("Gave up waiting for AssemblyAI transcript {transcript_id}");
                        return Err(AiError::Timeout(format!(
                            "transcript {transcript_id} did not finish within {}s",
                            self.timeout.as_secs()
                        )));
                    }
                    trace!("AssemblyAI transcript {transcript_id} is {:?}", transcript.status);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AiError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                warn!("Failed to parse AssemblyAI response: {:?}", e);
                AiError::Deserialization(e.to_string())
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("AssemblyAI API ({status}): {error_text}");
            Err(match status {
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    AiError::Authentication(error_text)
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited {
                    retry_after_seconds: 0,
                },
                _ => AiError::Provider(format!("{status}: {error_text}")),
            })
        }
    }
}

#[async_trait]
impl Provider for AssemblyAiClient {
    async fn transcribe(&self, audio_path: &Path, config: Config) -> Result<Transcription, AiError> {
        let audio_url = self.upload_file(audio_path).await?;

        let created = self
            .create_transcript(CreateTranscriptRequest {
                audio_url,
                speaker_labels: config.enable_speaker_labels,
            })
            .await?;

        let transcript = self.wait_for_completion(&created.id).await?;
        Ok(transcript.into())
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}

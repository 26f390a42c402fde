use axum::extract::multipart::{Field, Multipart};
use domain::audio_file::{self as AudioFileApi, ListFilter, Upload};
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use domain::media_store::{AudioWriter, MediaStore, StagedAudio};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::Error;

pub(crate) const DEFAULT_PAGE_SIZE: u64 = 5;
pub(crate) const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// 1-based page number
    pub(crate) page: Option<u64>,
    /// Recordings per page, 1 to 100
    pub(crate) page_size: Option<u64>,
    /// Comma separated departments; matches any
    pub(crate) department: Option<String>,
    /// Comma separated languages; matches any
    pub(crate) language: Option<String>,
    /// Substring of the original file name
    pub(crate) filename: Option<String>,
}

impl IndexParams {
    pub(crate) fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub(crate) fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub(crate) fn filter(&self) -> ListFilter {
        ListFilter {
            departments: AudioFileApi::parse_list(self.department.as_deref()),
            languages: AudioFileApi::parse_list(self.language.as_deref()),
            filename: self
                .filename
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }
}

/// Multipart form accepted by `POST /upload`. Only used for the OpenAPI schema;
/// the body itself is read field by field.
#[allow(dead_code)]
#[derive(ToSchema)]
pub(crate) struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    create_transcript: bool,
    department: Option<String>,
    /// JSON array (`["English","German"]`) or comma separated list
    language: Option<String>,
}

impl UploadForm {
    /// Read an upload out of a multipart body, streaming the `file` field into
    /// `store`. `file` and `create_transcript` are required. The staged file is
    /// removed again when the form turns out to be invalid.
    pub(crate) async fn read(multipart: Multipart, store: &MediaStore) -> Result<Upload, Error> {
        let mut received = ReceivedForm::default();

        if let Err(e) = received.read_fields(multipart, store).await {
            received.discard().await;
            return Err(e);
        }

        received.into_upload().await
    }
}

#[derive(Default)]
struct ReceivedForm {
    audio: Option<StagedAudio>,
    create_transcript: Option<bool>,
    department: Option<String>,
    languages: Vec<String>,
}

impl ReceivedForm {
    async fn read_fields(&mut self, mut multipart: Multipart, store: &MediaStore) -> Result<(), Error> {
        while let Some(mut field) = multipart.next_field().await.map_err(|e| invalid(e.to_string()))? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let original_filename = field.file_name().unwrap_or_default().to_string();
                    if original_filename.trim().is_empty() {
                        continue;
                    }

                    let mut writer = store.create_audio(&original_filename).await?;
                    if let Err(e) = copy_field(&mut field, &mut writer).await {
                        writer.discard().await;
                        return Err(e);
                    }

                    // Only the last file field is kept.
                    let audio = writer.finish().await?;
                    if let Some(previous) = self.audio.replace(audio) {
                        previous.discard().await;
                    }
                }
                "create_transcript" => {
                    self.create_transcript = Some(parse_bool(&text(field).await?)?);
                }
                "department" => {
                    self.department = Some(text(field).await?).filter(|d| !d.trim().is_empty());
                }
                "language" => {
                    self.languages = AudioFileApi::parse_languages(&text(field).await?);
                }
                _ => {}
            }
        }

        Ok(())
    }

    async fn into_upload(self) -> Result<Upload, Error> {
        let Some(audio) = self.audio else {
            return Err(invalid("No file was uploaded"));
        };
        let Some(create_transcript) = self.create_transcript else {
            audio.discard().await;
            return Err(invalid("create_transcript is required"));
        };

        Ok(Upload {
            audio,
            create_transcript,
            department: self.department,
            languages: self.languages,
        })
    }

    async fn discard(&mut self) {
        if let Some(audio) = self.audio.take() {
            audio.discard().await;
        }
    }
}

async fn copy_field(field: &mut Field<'_>, writer: &mut AudioWriter) -> Result<(), Error> {
    while let Some(chunk) = field.chunk().await.map_err(|e| invalid(e.to_string()))? {
        writer.write_chunk(&chunk).await?;
    }
    Ok(())
}

async fn text(field: Field<'_>) -> Result<String, Error> {
    field.text().await.map_err(|e| invalid(e.to_string()))
}

fn parse_bool(value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(invalid(format!("create_transcript must be a boolean, got '{other}'"))),
    }
}

fn invalid(detail: impl Into<String>) -> Error {
    DomainError {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Invalid(detail.into())),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_bounds() {
        let params = IndexParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);

        let params = IndexParams {
            page: Some(0),
            page_size: Some(1000),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);

        let params = IndexParams {
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(params.page_size(), 1);
    }

    #[test]
    fn filter_splits_comma_lists() {
        let params = IndexParams {
            department: Some("Sales,HR".to_string()),
            language: Some("English".to_string()),
            filename: Some("  ".to_string()),
            ..Default::default()
        };

        assert_eq!(
            params.filter(),
            ListFilter {
                departments: vec!["Sales".to_string(), "HR".to_string()],
                languages: vec!["English".to_string()],
                filename: None,
            }
        );
    }

    #[test]
    fn booleans_accept_form_spellings() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool(" True ").unwrap());
        assert!(parse_bool("on").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}

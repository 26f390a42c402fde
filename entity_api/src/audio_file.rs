//! CRUD operations for audio_files table.

use super::error::{EntityApiErrorKind, Error};
use entity::audio_files::{ActiveModel, Column, Entity, Model};
use entity::transcription_status::TranscriptionStatus;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::LikeExpr,
    ActiveValue::{Set, Unchanged},
    Condition, DatabaseConnection, PaginatorTrait, QueryOrder, TryIntoModel,
};

/// Fields supplied when recording a newly stored upload.
#[derive(Debug, Clone)]
pub struct NewAudioFile {
    pub filename: String,
    pub original_filename: String,
    pub filepath: String,
    pub duration: f64,
    pub department: Option<String>,
    pub language: String,
    pub transcription_status: TranscriptionStatus,
}

/// Filters accepted when listing audio files. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Match any of these departments
    pub departments: Vec<String>,
    /// Match recordings that list any of these languages
    pub languages: Vec<String>,
    /// Substring of the original file name
    pub filename: Option<String>,
}

impl ListFilter {
    pub(crate) fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if !self.departments.is_empty() {
            condition = condition.add(Column::Department.is_in(self.departments.clone()));
        }

        if !self.languages.is_empty() {
            // `language` holds a JSON array, so match the quoted element.
            let any_language = self
                .languages
                .iter()
                .fold(Condition::any(), |any, language| {
                    any.add(Column::Language.like(containing(&format!("\"{language}\""))))
                });
            condition = condition.add(any_language);
        }

        if let Some(filename) = self.filename.as_deref().filter(|f| !f.is_empty()) {
            condition = condition.add(Column::OriginalFilename.like(containing(filename)));
        }

        condition
    }
}

/// `LIKE` pattern matching `value` anywhere in the column.
fn containing(value: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(value))).escape('\\')
}

/// Escape `%`, `_` and `\` so they match literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// One page of audio files plus what is needed to render pagination controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Model>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

impl Page {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.total
    }
}

/// Creates a new audio file record
pub async fn create(db: &DatabaseConnection, new_file: NewAudioFile) -> Result<Model, Error> {
    debug!("Creating new audio file record: {}", new_file.filename);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        filename: Set(new_file.filename),
        original_filename: Set(new_file.original_filename),
        filepath: Set(new_file.filepath),
        duration: Set(new_file.duration),
        department: Set(new_file.department),
        language: Set(new_file.language),
        upload_time: Set(now.into()),
        transcript_path: Set(None),
        transcription_status: Set(new_file.transcription_status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Records the outcome of a transcription attempt
pub async fn update_transcription(
    db: &DatabaseConnection,
    id: Id,
    status: TranscriptionStatus,
    transcript_path: Option<String>,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating audio file transcription status to {status}: {id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                filename: Unchanged(existing.filename),
                original_filename: Unchanged(existing.original_filename),
                filepath: Unchanged(existing.filepath),
                duration: Unchanged(existing.duration),
                department: Unchanged(existing.department),
                language: Unchanged(existing.language),
                upload_time: Unchanged(existing.upload_time),
                transcript_path: Set(transcript_path),
                transcription_status: Set(status),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Audio file with id {id} not found");
            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordNotFound,
            })
        }
    }
}

/// Finds an audio file by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Finds one page of audio files matching `filter`, newest upload first.
///
/// `page` is 1-based; zero values for `page` or `page_size` are treated as 1.
/// Pages whose offset does not fit in a `u64` are an invalid query.
pub async fn find_page(
    db: &DatabaseConnection,
    filter: &ListFilter,
    page: u64,
    page_size: u64,
) -> Result<Page, Error> {
    let page = page.max(1);
    let page_size = page_size.max(1);

    if page.checked_mul(page_size).is_none() {
        warn!("Rejecting page {page} with page size {page_size}: offset out of range");
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::InvalidQueryTerm,
        });
    }

    debug!("Listing audio files page {page} (size {page_size}) with {filter:?}");

    let paginator = Entity::find()
        .filter(filter.condition())
        .order_by_desc(Column::UploadTime)
        .paginate(db, page_size);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        items,
        page,
        page_size,
        total,
    })
}

/// Deletes an audio file record by ID, returning the removed record
pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let model = find_by_id(db, id).await?;
    Entity::delete_by_id(model.id).exec(db).await?;
    Ok(model)
}

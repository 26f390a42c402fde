use axum::extract::{Multipart, Path, Query, Request, State};
use axum::response::IntoResponse;
use axum::Json;
use domain::audio_file as AudioFileApi;
use domain::Id;
use log::*;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::params::audio_file::{IndexParams, UploadForm};
use crate::response::audio_file::{
    AudioFileDetails, AudioFilePage, TranscriptResponse, UploadResponse,
};
use crate::response::MessageResponse;
use crate::{AppState, Error};

/// POST upload a meeting recording
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored (and transcribed when requested)", body = UploadResponse),
        (status = 400, description = "Missing fields or a file with this name already exists"),
        (status = 500, description = "Conversion or storage failed")
    )
)]
pub async fn upload(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let upload = UploadForm::read(multipart, app_state.audio_pipeline.store()).await?;

    debug!(
        "POST Upload {} staged as {} (transcript requested: {})",
        upload.audio.original_filename, upload.audio.filename, upload.create_transcript
    );

    let audio_file = app_state
        .audio_pipeline
        .upload(app_state.db_conn_ref(), upload)
        .await?;

    Ok(Json(UploadResponse::from(audio_file)))
}

/// GET a page of recordings, newest first
#[utoipa::path(
    get,
    path = "/list-audio-files",
    params(IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved a page of recordings", body = AudioFilePage),
        (status = 400, description = "Malformed query")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all audio files: {params:?}");

    let page = AudioFileApi::list(
        app_state.db_conn_ref(),
        &params.filter(),
        params.page(),
        params.page_size(),
    )
    .await?;

    Ok(Json(AudioFilePage::from(page)))
}

/// GET a recording's metadata and transcript
#[utoipa::path(
    get,
    path = "/get-audio-details/{id}",
    params(("id" = String, Path, description = "Audio file id (UUID)")),
    responses(
        (status = 200, description = "Successfully retrieved the recording", body = AudioFileDetails),
        (status = 404, description = "File not found")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET audio file details: {id}");

    let details = AudioFileApi::details(app_state.db_conn_ref(), id).await?;

    Ok(Json(AudioFileDetails::from(details)))
}

/// GET a recording's transcript text
#[utoipa::path(
    get,
    path = "/get-transcript/{id}",
    params(("id" = String, Path, description = "Audio file id (UUID)")),
    responses(
        (status = 200, description = "Successfully retrieved the transcript", body = TranscriptResponse),
        (status = 404, description = "File or transcript not found")
    )
)]
pub async fn transcript(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET transcript: {id}");

    let transcript = AudioFileApi::transcript(app_state.db_conn_ref(), id).await?;

    Ok(Json(TranscriptResponse { transcript }))
}

/// GET the stored MP3 of a recording
#[utoipa::path(
    get,
    path = "/serve-audio/{id}",
    params(("id" = String, Path, description = "Audio file id (UUID)")),
    responses(
        (status = 200, description = "The stored MP3 (audio/mpeg), with range support"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    request: Request,
) -> Result<impl IntoResponse, Error> {
    let path = AudioFileApi::audio_path(app_state.db_conn_ref(), id).await?;

    debug!("GET audio stream {id} from {}", path.display());

    // ServeFile handles range requests, which audio players rely on for seeking.
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => Ok(response),
        Err(infallible) => match infallible {},
    }
}

/// DELETE a recording together with its transcript
#[utoipa::path(
    delete,
    path = "/delete-audio/{id}",
    params(("id" = String, Path, description = "Audio file id (UUID)")),
    responses(
        (status = 200, description = "Successfully deleted the recording", body = MessageResponse),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE audio file: {id}");

    AudioFileApi::delete(app_state.db_conn_ref(), id).await?;

    Ok(Json(MessageResponse::new(
        "Audio file and its transcript deleted successfully",
    )))
}

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::pattern as PatternApi;
use log::*;

use crate::params::pattern::GenerateParams;
use crate::response::pattern::GenerateResponse;
use crate::{AppState, Error};

/// POST apply a set of patterns to a transcript
///
/// Every pattern is sent to the language model concurrently. By default one
/// failing pattern fails the whole request; set `isolate_failures` to receive a
/// result (with an `error`) for every pattern instead.
#[utoipa::path(
    post,
    path = "/generate-patterns",
    request_body = GenerateParams,
    responses(
        (status = 200, description = "One result per requested pattern", body = GenerateResponse),
        (status = 404, description = "A requested pattern has no template"),
        (status = 422, description = "Malformed request body"),
        (status = 500, description = "OPENAI_MODEL is not configured"),
        (status = 502, description = "The language model failed or timed out")
    )
)]
pub async fn generate(
    State(app_state): State<AppState>,
    Json(params): Json<GenerateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST Generate {} pattern(s): {:?}",
        params.patterns.len(),
        params.patterns
    );

    let (request, isolate_failures) = params.into_request();
    let results =
        PatternApi::generate(&app_state.pattern_context, request, isolate_failures).await?;

    Ok(Json(GenerateResponse::from(results)))
}

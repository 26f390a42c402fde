use crate::{
    controller::{audio_file_controller, health_check_controller, pattern_controller},
    params, response, AppState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Meeting Notes API"
        ),
        paths(
            audio_file_controller::upload,
            audio_file_controller::index,
            audio_file_controller::read,
            audio_file_controller::transcript,
            audio_file_controller::serve,
            audio_file_controller::delete,
            health_check_controller::health_check,
            pattern_controller::generate,
        ),
        components(
            schemas(
                domain::transcription_status::TranscriptionStatus,
                params::audio_file::UploadForm,
                params::pattern::GenerateParams,
                response::MessageResponse,
                response::audio_file::AudioFileDetails,
                response::audio_file::AudioFilePage,
                response::audio_file::AudioFileSummary,
                response::audio_file::TranscriptResponse,
                response::audio_file::UploadResponse,
                response::pattern::GenerateResponse,
                response::pattern::PatternResultResponse,
            )
        ),
        tags(
            (name = "meeting_notes", description = "Meeting recording, transcription and pattern extraction API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let static_directory = app_state.config().static_directory().to_path_buf();
    let index_file = app_state.config().index_file().to_path_buf();

    Router::new()
        .merge(audio_file_routes(app_state.clone()))
        .merge(pattern_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .route_service("/", ServeFile::new(index_file))
        .nest_service("/static", ServeDir::new(static_directory))
}

fn audio_file_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/upload", post(audio_file_controller::upload))
        .route("/list-audio-files", get(audio_file_controller::index))
        .route("/get-audio-details/:id", get(audio_file_controller::read))
        .route("/get-transcript/:id", get(audio_file_controller::transcript))
        .route("/serve-audio/:id", get(audio_file_controller::serve))
        .route("/delete-audio/:id", delete(audio_file_controller::delete))
        .with_state(app_state)
}

fn pattern_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/generate-patterns", post(pattern_controller::generate))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use domain::audio_file::AudioPipeline;
    use domain::media::MediaTools;
    use domain::media_store::MediaStore;
    use domain::pattern::PatternContext;
    use meeting_ai::templates::MemoryTemplateStore;
    use meeting_ai::traits::completion::Provider;
    use meeting_ai::types::chat::Request as ChatRequest;
    use sea_orm::DatabaseConnection;
    use serde_json::{json, Value};
    use service::config::Config;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Answers every prompt with the first line of its system instruction.
    struct InstructionEcho;

    #[async_trait]
    impl Provider for InstructionEcho {
        async fn complete(&self, request: ChatRequest) -> Result<String, meeting_ai::Error> {
            Ok(request.messages[0].content.clone())
        }

        fn provider_id(&self) -> &str {
            "echo"
        }
    }

    fn pattern_context(model: Option<&str>) -> PatternContext {
        PatternContext::new(
            Arc::new(InstructionEcho),
            Arc::new(
                MemoryTemplateStore::new()
                    .with_template("summary", "Summarize.")
                    .with_template("action_items", "List action items."),
            ),
            model.map(String::from),
            Duration::from_secs(5),
        )
    }

    fn app_with(db: DatabaseConnection, root: &std::path::Path, model: Option<&str>) -> Router {
        let config = Config::try_from_args(["meeting_notes_rs"])
            .unwrap()
            .set_upload_directory(root.join("uploads"));
        let service_state = service::AppState::new(config, &Arc::new(db));
        let audio_pipeline = AudioPipeline::new(
            MediaStore::new(root.join("uploads/audio"), root.join("uploads/transcripts")),
            MediaTools::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe"),
            None,
        );

        define_routes(AppState::new(
            service_state,
            audio_pipeline,
            pattern_context(model),
        ))
    }

    fn app(model: Option<&str>) -> Router {
        let dir = std::env::temp_dir();
        app_with(DatabaseConnection::Disconnected, &dir, model)
    }

    async fn json_body(response: Response) -> Result<Value> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn generate_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate-patterns")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_check_responds_healthy() -> Result<()> {
        let response = app(None)
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"healthy");
        Ok(())
    }

    #[tokio::test]
    async fn generate_patterns_returns_one_result_per_pattern() -> Result<()> {
        let response = app(Some("gpt-4o-mini"))
            .oneshot(generate_request(json!({
                "transcript": "Speaker A: ship it\n\n",
                "patterns": ["summary", "action_items", "summary"]
            })))
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await?;
        let results = body["results"].as_array().cloned().unwrap_or_default();
        assert_eq!(results.len(), 3);

        let mut patterns: Vec<&str> = results
            .iter()
            .filter_map(|r| r["pattern"].as_str())
            .collect();
        patterns.sort();
        assert_eq!(patterns, vec!["action_items", "summary", "summary"]);
        assert!(results
            .iter()
            .all(|r| r.get("error").is_none() && r["response"].is_string()));
        Ok(())
    }

    #[tokio::test]
    async fn generate_patterns_with_empty_list_is_empty() -> Result<()> {
        let response = app(Some("gpt-4o-mini"))
            .oneshot(generate_request(json!({"transcript": "x", "patterns": []})))
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await?, json!({"results": []}));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_pattern_is_404() -> Result<()> {
        let response = app(Some("gpt-4o-mini"))
            .oneshot(generate_request(json!({
                "transcript": "x",
                "patterns": ["summary", "haiku"]
            })))
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn isolated_failures_are_reported_inline() -> Result<()> {
        let response = app(Some("gpt-4o-mini"))
            .oneshot(generate_request(json!({
                "transcript": "x",
                "patterns": ["summary", "haiku"],
                "isolate_failures": true
            })))
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await?;
        let haiku = body["results"]
            .as_array()
            .and_then(|results| results.iter().find(|r| r["pattern"] == "haiku"))
            .cloned()
            .unwrap_or_default();
        assert!(haiku["response"].is_null());
        assert!(haiku["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn missing_model_is_500() -> Result<()> {
        let response = app(None)
            .oneshot(generate_request(json!({
                "transcript": "x",
                "patterns": ["summary"]
            })))
            .await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await?,
            json!({"detail": "OPENAI_MODEL is not set"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_the_database() -> Result<()> {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/get-audio-details/not-a-uuid")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_lists_the_routes() -> Result<()> {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await?;
        for path in ["/upload", "/list-audio-files", "/generate-patterns"] {
            assert!(body["paths"].get(path).is_some(), "{path} is undocumented");
        }
        Ok(())
    }

    #[tokio::test]
    async fn upload_without_file_is_400() -> Result<()> {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"create_transcript\"\r\n\r\nfalse\r\n--{boundary}--\r\n"
        );
        let response = app(None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await?,
            json!({"detail": "No file was uploaded"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_with_out_of_range_page_is_rejected() -> Result<()> {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .uri("/list-audio-files?page=9223372036854775807&page_size=100")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_upload_removes_the_staged_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let audio_directory = dir.path().join("uploads/audio");
        std::fs::create_dir_all(&audio_directory)?;

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"standup.mp3\"\r\nContent-Type: audio/mpeg\r\n\r\nID3 audio bytes\r\n--{boundary}--\r\n"
        );
        let response = app_with(DatabaseConnection::Disconnected, dir.path(), None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await?,
            json!({"detail": "create_transcript is required"})
        );
        assert_eq!(std::fs::read_dir(&audio_directory)?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn home_page_and_static_files_are_served() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("static/css"))?;
        std::fs::create_dir_all(dir.path().join("templates"))?;
        std::fs::write(dir.path().join("static/css/app.css"), "body {}")?;
        std::fs::write(dir.path().join("templates/index.html"), "<h1>Notes</h1>")?;

        let config = Config::try_from_args([
            "meeting_notes_rs".into(),
            "--static-directory".into(),
            dir.path().join("static").into_os_string(),
            "--index-file".into(),
            dir.path().join("templates/index.html").into_os_string(),
        ])?;
        let service_state =
            service::AppState::new(config, &Arc::new(DatabaseConnection::Disconnected));
        let app = define_routes(AppState::new(
            service_state,
            AudioPipeline::new(
                MediaStore::new(dir.path().join("audio"), dir.path().join("transcripts")),
                MediaTools::new("ffmpeg", "ffprobe"),
                None,
            ),
            pattern_context(None),
        ));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"<h1>Notes</h1>");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/css/app.css")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}

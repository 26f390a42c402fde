use domain::audio_file::AudioPipeline;
use domain::pattern as PatternApi;
use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting meeting notes service v{} [{}]",
        env!("CARGO_PKG_VERSION"),
        config.runtime_env()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = service::ensure_schema(&db).await {
        error!("Failed to create database schema: {e}");
        std::process::exit(1);
    }

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    let audio_pipeline = match AudioPipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to set up the audio pipeline: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = audio_pipeline.prepare().await {
        error!("Failed to create upload directories: {e}");
        std::process::exit(1);
    }

    let pattern_context = match PatternApi::context_from_config(&config) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to set up the pattern client: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);
    let app_state = web::AppState::new(service_state, audio_pipeline, pattern_context);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}

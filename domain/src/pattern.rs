//! Pattern generation: apply a set of prompt templates to one meeting transcript.

use crate::error::Error;
use crate::gateway::openai::OpenAiClient;
use log::*;
use meeting_ai::templates::FileTemplateStore;
use meeting_ai::PatternProcessor;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;

pub use meeting_ai::{PatternContext, PatternRequest, PatternResult};

/// Build the process-wide pattern context: one chat completion client and the
/// template directory, shared by every request.
pub fn context_from_config(config: &Config) -> Result<PatternContext, Error> {
    let client = OpenAiClient::new(
        config.openai_api_key().as_deref(),
        config.openai_base_url(),
    )?;

    if config.openai_model().is_none() {
        warn!("OPENAI_MODEL is not set; pattern generation requests will fail");
    }

    info!(
        "Loading pattern templates from {}",
        config.patterns_directory().display()
    );

    Ok(PatternContext::new(
        Arc::new(client),
        Arc::new(FileTemplateStore::new(config.patterns_directory())),
        config.openai_model(),
        Duration::from_secs(config.llm_request_timeout_secs),
    ))
}

/// Run every requested pattern concurrently.
///
/// By default the first failing pattern fails the whole request. With
/// `isolate_failures` each failure is reported in its own result instead.
pub async fn generate(
    context: &PatternContext,
    request: PatternRequest,
    isolate_failures: bool,
) -> Result<Vec<PatternResult>, Error> {
    let processor = PatternProcessor::new(context.clone(), request);

    let results = if isolate_failures {
        processor.process_all_settled().await?
    } else {
        processor.process_all().await?
    };

    Ok(results)
}

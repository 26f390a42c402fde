use crate::traits::completion::Provider as CompletionProvider;
use crate::traits::template_store::TemplateStore;
use crate::types::chat::Request;
use crate::types::pattern::{PatternRequest, PatternResult};
use crate::Error;
use futures::future::{join_all, try_join_all};
use log::*;
use std::sync::Arc;
use std::time::Duration;

/// Name of the setting that selects the model used for pattern requests.
pub const MODEL_SETTING: &str = "OPENAI_MODEL";

/// Long-lived dependencies shared by every pattern request in the process.
///
/// Cloning is cheap: the provider and template store are reference counted and
/// are used concurrently by all in-flight requests.
#[derive(Clone)]
pub struct PatternContext {
    provider: Arc<dyn CompletionProvider>,
    templates: Arc<dyn TemplateStore>,
    model: Option<String>,
    request_timeout: Duration,
}

impl PatternContext {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        templates: Arc<dyn TemplateStore>,
        model: Option<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            templates,
            model,
            request_timeout,
        }
    }

    /// The configured model name. Unset and blank values are both a
    /// configuration error.
    pub fn model(&self) -> Result<&str, Error> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .ok_or_else(|| Error::Configuration(format!("{MODEL_SETTING} is not set")))
    }
}

/// Applies every pattern of a [`PatternRequest`] to its transcript, one
/// completion request per pattern, all in flight at the same time.
pub struct PatternProcessor {
    context: PatternContext,
    request: PatternRequest,
}

impl PatternProcessor {
    pub fn new(context: PatternContext, request: PatternRequest) -> Self {
        Self { context, request }
    }

    /// Load the prompt template registered for `pattern`.
    pub async fn resolve_template(&self, pattern: &str) -> Result<String, Error> {
        self.context.templates.lookup(pattern).await
    }

    /// Run a single pattern against the transcript. The model setting is
    /// checked before the template is loaded.
    pub async fn process_pattern(&self, pattern: &str) -> Result<PatternResult, Error> {
        let model = self.context.model()?;
        let template = self.resolve_template(pattern).await?;

        let request = Request::instruct(model, &template, &self.request.transcript);

        debug!(
            "Dispatching pattern '{pattern}' to model {model} ({} transcript bytes)",
            self.request.transcript.len()
        );

        let response = tokio::time::timeout(
            self.context.request_timeout,
            self.context.provider.complete(request),
        )
        .await
        .map_err(|_| {
            warn!("Pattern '{pattern}' timed out");
            Error::Timeout(format!(
                "pattern '{pattern}' did not complete within {}s",
                self.context.request_timeout.as_secs()
            ))
        })??;

        debug!("Pattern '{pattern}' completed");

        Ok(PatternResult::success(pattern, response))
    }

    /// Run every pattern concurrently and gather the results.
    ///
    /// The first failure fails the whole batch and no partial results are
    /// returned. Dropping the returned future abandons all in-flight requests.
    pub async fn process_all(&self) -> Result<Vec<PatternResult>, Error> {
        self.context.model()?;

        info!(
            "Processing {} pattern(s) against transcript",
            self.request.patterns.len()
        );

        try_join_all(
            self.request
                .patterns
                .iter()
                .map(|pattern| self.process_pattern(pattern)),
        )
        .await
        .inspect_err(|e| warn!("Pattern batch failed: {e}"))
    }

    /// Run every pattern concurrently, reporting each failure in its own result
    /// instead of failing the batch.
    ///
    /// A missing model setting still fails the call, before anything is sent.
    pub async fn process_all_settled(&self) -> Result<Vec<PatternResult>, Error> {
        self.context.model()?;

        info!(
            "Processing {} pattern(s) against transcript, isolating failures",
            self.request.patterns.len()
        );

        let results = join_all(self.request.patterns.iter().map(|pattern| async move {
            self.process_pattern(pattern).await.unwrap_or_else(|e| {
                warn!("Pattern '{pattern}' failed: {e}");
                PatternResult::failure(pattern, e)
            })
        }))
        .await;

        Ok(results)
    }
}

//! Client for OpenAI-compatible chat completion endpoints.
//!
//! Implements [`meeting_ai::traits::completion::Provider`] so that the pattern
//! fan-out can dispatch to any service speaking the `/chat/completions` wire format.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use meeting_ai::traits::completion::Provider;
use meeting_ai::types::chat::Request;
use meeting_ai::Error as AiError;
use reqwest::StatusCode;
use serde::Deserialize;

const PROVIDER_ID: &str = "openai";

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion client. One instance is shared by all in-flight pattern requests.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for `base_url`. Without an API key requests are sent
    /// unauthenticated, which local OpenAI-compatible servers accept.
    pub fn new(api_key: Option<&str>, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(api_key) = api_key {
            let mut header_value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(
                    |e| {
                        warn!("Failed to create auth header: {:?}", e);
                        Error {
                            source: Some(Box::new(e)),
                            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                                "Invalid API key format".to_string(),
                            )),
                        }
                    },
                )?;
            header_value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, header_value);
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: String) -> AiError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Authentication(body),
            StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited {
                retry_after_seconds: retry_after.unwrap_or(0),
            },
            _ => AiError::Provider(format!("{status}: {body}")),
        }
    }
}

#[async_trait]
impl Provider for OpenAiClient {
    async fn complete(&self, request: Request) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach chat completion endpoint: {:?}", e);
                if e.is_timeout() {
                    AiError::Timeout(e.to_string())
                } else {
                    AiError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat completion API ({status}): {error_text}");
            return Err(Self::error_for_status(status, retry_after, error_text));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse chat completion response: {:?}", e);
            AiError::Deserialization(e.to_string())
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| {
                AiError::Provider("response contained no completion choices".to_string())
            })
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}

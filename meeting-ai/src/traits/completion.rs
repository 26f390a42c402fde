//! Chat completion provider trait.

use crate::types::chat::Request;
use crate::Error;
use async_trait::async_trait;

/// Abstraction over a chat-style language-model completion endpoint.
///
/// One instance is created per process and shared by every in-flight request,
/// so implementations must be safe to call concurrently from many tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a single non-streaming completion request and return the text of the
    /// first completion choice.
    async fn complete(&self, request: Request) -> std::result::Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "openai").
    fn provider_id(&self) -> &str;
}

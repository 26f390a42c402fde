//! Prompt template lookup.

use crate::Error;
use async_trait::async_trait;

/// Read-only mapping from pattern identifiers to prompt template text.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Return the full template text for `pattern`, or `Error::NotFound` if there
    /// is no template registered under that identifier.
    async fn lookup(&self, pattern: &str) -> std::result::Result<String, Error>;
}

//! Meeting AI abstraction layer for transcription and language-model providers.
//!
//! This crate provides trait-based abstractions for meeting AI workflows:
//! - Speech-to-text transcription of recorded meetings
//! - Chat-style completions against a large language model
//! - Pattern fan-out: one transcript, many prompt templates, processed concurrently
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different service providers (AssemblyAI, OpenAI-compatible endpoints, etc.)
//! without changing application code.

pub mod error;
pub mod pattern;
pub mod templates;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use pattern::{PatternContext, PatternProcessor};
pub use types::pattern::{PatternRequest, PatternResult};

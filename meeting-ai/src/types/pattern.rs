//! Types for pattern fan-out over a transcript.

use serde::{Deserialize, Serialize};

/// A transcript together with the pattern identifiers to apply to it.
///
/// Duplicate identifiers are allowed and each one is processed on its own.
/// The order of `patterns` says nothing about the order of the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRequest {
    pub transcript: String,
    pub patterns: Vec<String>,
}

impl PatternRequest {
    pub fn new(transcript: impl Into<String>, patterns: Vec<String>) -> Self {
        Self {
            transcript: transcript.into(),
            patterns,
        }
    }
}

/// The outcome of applying one pattern to a transcript.
///
/// `response` is `None` only when the pattern failed and the caller asked for
/// per-pattern isolation, in which case `error` describes the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern: String,
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PatternResult {
    pub fn success(pattern: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn failure(pattern: impl Into<String>, error: impl ToString) -> Self {
        Self {
            pattern: pattern.into(),
            response: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

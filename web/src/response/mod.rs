//! Response bodies shaped for the browser client.

pub(crate) mod audio_file;
pub(crate) mod pattern;

use serde::Serialize;
use utoipa::ToSchema;

/// A human readable outcome, shown to the user as-is.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

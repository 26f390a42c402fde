use domain::pattern::PatternRequest;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /generate-patterns`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct GenerateParams {
    /// Meeting transcript every pattern is applied to
    pub(crate) transcript: String,
    /// Pattern identifiers; each names a `create_<pattern>.md` template
    pub(crate) patterns: Vec<String>,
    /// Report failing patterns individually instead of failing the request
    #[serde(default)]
    pub(crate) isolate_failures: bool,
}

impl GenerateParams {
    pub(crate) fn into_request(self) -> (PatternRequest, bool) {
        (
            PatternRequest::new(self.transcript, self.patterns),
            self.isolate_failures,
        )
    }
}

use domain::pattern::PatternResult;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PatternResultResponse {
    pub(crate) pattern: String,
    pub(crate) response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl From<PatternResult> for PatternResultResponse {
    fn from(result: PatternResult) -> Self {
        Self {
            pattern: result.pattern,
            response: result.response,
            error: result.error,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GenerateResponse {
    pub(crate) results: Vec<PatternResultResponse>,
}

impl From<Vec<PatternResult>> for GenerateResponse {
    fn from(results: Vec<PatternResult>) -> Self {
        Self {
            results: results.into_iter().map(Into::into).collect(),
        }
    }
}

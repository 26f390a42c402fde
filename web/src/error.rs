use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;
use serde_json::json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "File not found".into()),
                    EntityErrorKind::Invalid => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "UNPROCESSABLE ENTITY".into(),
                    ),
                    EntityErrorKind::Conflict => (
                        StatusCode::BAD_REQUEST,
                        "A file with this name already exists".into(),
                    ),
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL SERVER ERROR".into(),
                    ),
                },
                InternalErrorKind::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
                InternalErrorKind::Invalid(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
                InternalErrorKind::Config(detail) | InternalErrorKind::Media(detail) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, detail.clone())
                }
                InternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".into(),
                ),
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => (StatusCode::BAD_GATEWAY, "BAD GATEWAY".into()),
                ExternalErrorKind::Timeout => (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service timed out".into(),
                ),
                ExternalErrorKind::Provider(detail) => (StatusCode::BAD_GATEWAY, detail.clone()),
                ExternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".into(),
                ),
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if status.is_server_error() {
            error!("{status}: {:?}", self.0);
        } else {
            warn!("{status}: {:?}", self.0);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error_kind: DomainErrorKind) -> (StatusCode, String) {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .status_and_detail()
    }

    #[test]
    fn missing_resources_are_404() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound
            )))
            .0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::NotFound(
                "Transcript not found".into()
            ))),
            (StatusCode::NOT_FOUND, "Transcript not found".to_string())
        );
    }

    #[test]
    fn duplicate_filename_is_400() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Conflict
            ))),
            (
                StatusCode::BAD_REQUEST,
                "A file with this name already exists".to_string()
            )
        );
    }

    #[test]
    fn missing_configuration_is_500() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Config(
                "OPENAI_MODEL is not set".into()
            ))),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OPENAI_MODEL is not set".to_string()
            )
        );
    }

    #[test]
    fn upstream_failures_are_502() {
        for kind in [
            ExternalErrorKind::Network,
            ExternalErrorKind::Timeout,
            ExternalErrorKind::Provider("503 Service Unavailable".into()),
        ] {
            assert_eq!(
                status_of(DomainErrorKind::External(kind)).0,
                StatusCode::BAD_GATEWAY
            );
        }
    }

    #[tokio::test]
    async fn response_body_carries_the_detail() {
        let response = Error(DomainError {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Invalid(
                "No file was uploaded".into(),
            )),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "detail": "No file was uploaded" }));
    }
}

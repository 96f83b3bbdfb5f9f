use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl Error {
    /// A request that is well-formed but carries values outside their allowed range.
    pub(crate) fn invalid_params(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        debug!("Rejecting request parameters: {detail}");
        Self(DomainError {
            source: Some(detail.into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        })
    }

    fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                    EntityErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                },
                InternalErrorKind::Ingest(_) => StatusCode::UNPROCESSABLE_ENTITY,
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => StatusCode::BAD_GATEWAY,
                ExternalErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed with {status}: {:?}", self.0);
        }

        let reason = status
            .canonical_reason()
            .unwrap_or("UNKNOWN")
            .to_uppercase();
        match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid)) => {
                let detail = self
                    .0
                    .source
                    .as_ref()
                    .map(|source| source.to_string())
                    .unwrap_or(reason);
                (status, detail).into_response()
            }
            _ => (status, reason).into_response(),
        }
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
    use domain::error::IngestErrorKind;

    fn error(error_kind: DomainErrorKind) -> Error {
        Error(DomainError {
            source: None,
            error_kind,
        })
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = error(DomainErrorKind::Internal(InternalErrorKind::Entity(
            EntityErrorKind::NotFound,
        )));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ingest_errors_map_to_422() {
        let err = error(DomainErrorKind::Internal(InternalErrorKind::Ingest(
            IngestErrorKind::OrderingViolation("2".to_string()),
        )));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn ml_network_failures_map_to_502() {
        let err = error(DomainErrorKind::External(ExternalErrorKind::Network));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_params_map_to_422() {
        let err = Error::invalid_params("limit must be between 1 and 100");
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

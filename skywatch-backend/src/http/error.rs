///! Mapping of lookup errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use skywatch_common::{ErrorBody, ErrorKind};

use crate::error::LookupError;

/// Handler error; renders as a non-2xx status with an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::ObjectNotFound | ErrorKind::NoEphemerisData => StatusCode::NOT_FOUND,
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::CatalogUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::CollaboratorFailure if self.0.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::CollaboratorFailure => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self.0);
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self.0);
        }

        let body = ErrorBody::new(self.0.kind(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LookupError::ObjectNotFound("X".into()), StatusCode::NOT_FOUND),
            (LookupError::NoEphemerisData("Mars".into()), StatusCode::NOT_FOUND),
            (LookupError::InvalidRequest("lat".into()), StatusCode::BAD_REQUEST),
            (LookupError::CatalogUnavailable("gone".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LookupError::collaborator("sesame", "HTTP 503"), StatusCode::BAD_GATEWAY),
            (
                LookupError::Timeout { service: "horizons", seconds: 30 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}

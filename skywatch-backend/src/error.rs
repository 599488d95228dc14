///! Errors raised while resolving a target or loading the catalog.

use skywatch_common::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Horizons returned no data for {0}")]
    NoEphemerisData(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("{service} request failed: {message}")]
    CollaboratorFailure {
        service: &'static str,
        message: String,
    },

    #[error("{service} did not respond within {seconds}s")]
    Timeout { service: &'static str, seconds: u64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

impl LookupError {
    pub fn collaborator(service: &'static str, message: impl std::fmt::Display) -> Self {
        LookupError::CollaboratorFailure {
            service,
            message: message.to_string(),
        }
    }

    /// Category reported to clients. Timeouts are collaborator failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::ObjectNotFound(_) => ErrorKind::ObjectNotFound,
            LookupError::NoEphemerisData(_) => ErrorKind::NoEphemerisData,
            LookupError::CatalogUnavailable(_) => ErrorKind::CatalogUnavailable,
            LookupError::CollaboratorFailure { .. } | LookupError::Timeout { .. } => {
                ErrorKind::CollaboratorFailure
            }
            LookupError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LookupError::Timeout { .. })
    }
}

use devreg_core::LookupError;
use hyper::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Errors the HTTP handlers can return. `routerify` requires this to
/// implement `std::error::Error + Send + Sync`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("missing path parameter {0:?}")]
    MissingParam(&'static str),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Lookup(LookupError::GuidNotFound { .. })
            | Error::Lookup(LookupError::DeviceIdNotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Lookup(LookupError::DeviceIdNotUnique { .. }) => StatusCode::CONFLICT,
            Error::MissingParam(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON-serializable rendering of an [`Error`], used as the HTTP response
/// body whenever a handler fails.
#[derive(Serialize)]
pub struct FormattedError {
    pub message: String,
}

impl From<&Error> for FormattedError {
    fn from(err: &Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{
    auth::AuthError,
    dao::{storage::StorageError, store::GameUpdateError},
    state::lifecycle::LifecycleError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("{0}")]
    InvalidInput(String),
    /// Well-formed request carrying a value in the wrong format.
    #[error("{0}")]
    InvalidFormat(String),
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated caller is not allowed to touch the resource.
    #[error("{0}")]
    Forbidden(String),
    /// Operation conflicts with the current state of the resource.
    #[error("{0}")]
    Conflict(String),
    /// Storage backend failed.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::Conflict(message),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<LifecycleError> for ServiceError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::GameNotFound(_) => ServiceError::NotFound(err.to_string()),
            other => ServiceError::Conflict(other.to_string()),
        }
    }
}

impl From<GameUpdateError> for ServiceError {
    fn from(err: GameUpdateError) -> Self {
        match err {
            GameUpdateError::Rejected(rejected) => rejected.into(),
            GameUpdateError::Storage(storage) => storage.into(),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                ServiceError::Unauthorized(err.to_string())
            }
            AuthError::Encode(_) | AuthError::Hash(_) => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    /// Internal server error; details are logged, never returned.
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) | ServiceError::Conflict(message) => {
                AppError::BadRequest(message)
            }
            ServiceError::InvalidFormat(message) => AppError::Unprocessable(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::Unavailable(source) => {
                error!(error = %source, details = ?source, "storage failure");
                AppError::Internal("internal server error".into())
            }
            ServiceError::Internal(details) => {
                error!(details = %details, "internal failure");
                AppError::Internal("internal server error".into())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("invalid query string: {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn lifecycle_rejections_map_to_client_errors() {
        assert_eq!(
            status_of(LifecycleError::GameNotFound(1).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LifecycleError::GameFull.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(LifecycleError::AlreadyJoined.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn conflict_keeps_client_message() {
        let app: AppError = ServiceError::from(LifecycleError::GameFull).into();
        assert_eq!(app.to_string(), "Game is already full");
    }

    #[test]
    fn storage_failure_hides_details() {
        let err = StorageError::unavailable(
            "connection refused".into(),
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        );
        let app = AppError::from(ServiceError::from(err));

        assert_eq!(app.to_string(), "internal server error");
        assert_eq!(app.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_conflict_is_a_bad_request() {
        let app = AppError::from(ServiceError::from(StorageError::conflict(
            "Username already exists",
        )));
        assert!(matches!(app, AppError::BadRequest(ref m) if m == "Username already exists"));
    }

    #[test]
    fn invalid_format_is_unprocessable() {
        assert_eq!(
            status_of(ServiceError::InvalidFormat("bad date".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

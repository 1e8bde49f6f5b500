use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("room unavailable: {0}")]
    RoomUnavailable(String),
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("slot mismatch: {0}")]
    SlotMismatch(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("incomplete checkout: {0}")]
    IncompleteCheckout(String),
    #[error("already checked out: {0}")]
    AlreadyCheckedOut(String),
    // lock contention; the caller may retry with backoff
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("transaction could not be executed")]
    TransactionError(#[source] sqlx::Error),
    #[error("an error occurred while running a database operation")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("{0}")]
    ConversionEntityError(String),
}

impl AppError {
    /// Whether a caller may resubmit the same request and expect a different outcome.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRange(_)
            | AppError::ValidationError(_)
            | AppError::ConvertToUuidError(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessableEntity(_) | AppError::SlotMismatch(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::RoomUnavailable(_)
            | AppError::CapacityExceeded(_)
            | AppError::InvalidTransition(_)
            | AppError::IncompleteCheckout(_)
            | AppError::AlreadyCheckedOut(_)
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::ConversionEntityError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        if self.is_transient() {
            return (status_code, [(header::RETRY_AFTER, "1")], self.to_string()).into_response();
        }
        (status_code, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

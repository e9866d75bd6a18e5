//! Request-level error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::{envelope::Envelope, storage::StorageError, users::validation::FieldError};

pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Body failed schema validation; every violated field is listed.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("user not found")]
    NotFound,

    #[error("route not found")]
    RouteNotFound,

    /// Body could not be read as a JSON object.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(Envelope::invalid(errors))).into_response()
            }
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Json(Envelope::error("User not found"))).into_response()
            }
            AppError::RouteNotFound => {
                (StatusCode::NOT_FOUND, Json(Envelope::error("Route not found"))).into_response()
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(Envelope::error(msg))).into_response()
            }
            AppError::Storage(e) => {
                error!(error = %e, "storage failure");
                internal_error()
            }
            AppError::Internal(e) => {
                error!(error = ?e, "unhandled failure");
                internal_error()
            }
        }
    }
}

pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::error(INTERNAL_MESSAGE)),
    )
        .into_response()
}

pub type AppResult<T> = Result<T, AppError>;

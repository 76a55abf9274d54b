use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::storage::{InsufficientFunds, StoreError};

/// Failure taxonomy for every request flow. Each variant carries the
/// client-facing message; `IntoResponse` maps it onto the wire shape
/// `{ok: false, message}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),
    /// Wallet balance short of the quoted price.
    #[error("Saldo kurang")]
    InsufficientFunds,
    /// Non-success reply from a third-party API, message passed through.
    #[error("{0}")]
    Upstream(String),
    /// Unknown order id, or an order owned by another user.
    #[error("not found")]
    NotFound,
    /// Network or decode failure talking to a third-party API.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InsufficientFunds | ApiError::Upstream(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            ok: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<InsufficientFunds> for ApiError {
    fn from(_: InsufficientFunds) -> Self {
        ApiError::InsufficientFunds
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Terminal => ApiError::Validation(e.to_string()),
        }
    }
}

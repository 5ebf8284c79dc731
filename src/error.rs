/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthOutcome の拒否を 401 / 500 に変換 (詳細はログのみ、レスポンスには出さない)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::{AuthOutcome, Rejection};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(Rejection),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Error for a non-authenticated outcome; `None` when authenticated.
    pub fn from_outcome(outcome: &AuthOutcome) -> Option<Self> {
        match outcome {
            AuthOutcome::Authenticated { .. } => None,
            AuthOutcome::Unauthenticated { reason } => Some(Self::Unauthenticated(*reason)),
            AuthOutcome::ServerFault { .. } => Some(Self::Internal),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

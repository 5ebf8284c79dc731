/*
 * Responsibility
 * - GET /health (疎通用、認証なし)
 * - verifier key の取得はしない (最初の認証リクエストまで遅延)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

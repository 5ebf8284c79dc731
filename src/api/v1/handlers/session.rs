/*
 * Responsibility
 * - GET /api/v1/session
 * - middleware が確定させた identity をそのまま返す
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::AuthCtxExtractor;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
}

pub async fn current_session(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<SessionResponse> {
    Json(SessionResponse {
        user_id: ctx.user_id,
    })
}

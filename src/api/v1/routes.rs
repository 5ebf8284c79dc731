/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は認証なし、それ以外は session cookie 認証の内側
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, session::current_session};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/session", get(current_session));
    let protected = middleware::auth::session::apply(protected, state);

    Router::new().route("/health", get(health)).merge(protected)
}

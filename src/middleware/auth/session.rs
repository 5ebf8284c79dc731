//! session cookie の検証 → AuthCtx を extensions に入れる
//!
//! 判定そのものは `Authenticator` が行い、ここは HTTP への写像だけを担当する。
//! - Authenticated   → AuthCtx を insert して次へ
//! - Unauthenticated → 401 (固定メッセージ)
//! - ServerFault     → 500

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthOutcome;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/session", get(current_session));
/// let protected = middleware::auth::session::apply(protected, state);
/// let v1 = Router::new().route("/health", get(health)).merge(protected);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, session_middleware))
}

async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let outcome = state.auth.authenticate(req.headers()).await;

    let identity = match outcome {
        AuthOutcome::Authenticated { identity } => identity,
        rejected => {
            return Err(AppError::from_outcome(&rejected).unwrap_or(AppError::Internal));
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(identity));

    Ok(next.run(req).await)
}

/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: Authenticator (プロセス共有の verifier key を内部に持つ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::Authenticator;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(auth: Arc<Authenticator>) -> Self {
        Self { auth }
    }
}

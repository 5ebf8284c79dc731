/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が session cookie を検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 権限 (authorization) の判断はここでは扱わない。identity のみ。
 */

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は session token の `userId` claim (空でない文字列)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

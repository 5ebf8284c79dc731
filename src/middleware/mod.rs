/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - http: 全ルート共通 (request id / trace / limit / timeout)
 * - auth: session cookie 認証
 */
pub mod auth;
pub mod http;

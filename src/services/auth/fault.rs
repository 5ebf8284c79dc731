use thiserror::Error;

/// Faults raised while provisioning keys or verifying a session token.
///
/// `Clone` because a provisioning fault is memoized and handed to every later
/// caller. Detail strings are for operators only; they never reach a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFault {
    // Key at rest is not a PEM-encoded RSA public key.
    #[error("key material invalid: {0}")]
    KeyMaterialInvalid(String),

    // Remote store failed or returned nothing.
    #[error("key store unavailable: {0}")]
    KeyStoreUnavailable(String),

    #[error("verifier key unavailable")]
    KeyUnavailable,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl From<jsonwebtoken::errors::Error> for AuthFault {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(e.to_string())
    }
}

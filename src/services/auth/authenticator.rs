//! Session-cookie authentication for a single request.
//!
//! Steps run in order and stop at the first failure:
//! key provisioned -> Cookie header present -> named cookie present ->
//! token verified -> `userId` claim present.
use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, header};

use crate::config::{EnvSource, EnvironmentConfig};
use crate::services::auth::cookie::find_cookie;
use crate::services::auth::provisioner::KeyProvisioner;
use crate::services::auth::verifier::{TokenVerifier, VerifierOptions};

/// Claim carrying the caller's identity.
pub const USER_ID_CLAIM: &str = "userId";

pub const SERVER_FAULT_MESSAGE: &str = "Internal server error";

/// Why a request was not authenticated. Each maps to one fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthenticated,
    InvalidToken,
    Unauthorized,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::InvalidToken => "Invalid token",
            Self::Unauthorized => "Unauthorized",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated { identity: String },
    Unauthenticated { reason: Rejection },
    ServerFault { reason: &'static str },
}

impl AuthOutcome {
    fn rejected(reason: Rejection) -> Self {
        Self::Unauthenticated { reason }
    }

    fn server_fault() -> Self {
        Self::ServerFault {
            reason: SERVER_FAULT_MESSAGE,
        }
    }
}

/// Drives provisioning, cookie lookup, verification and claim extraction.
pub struct Authenticator {
    provisioner: Arc<KeyProvisioner>,
    verifier: TokenVerifier,
    env: Arc<dyn EnvSource>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("verifier", &self.verifier)
            .finish()
    }
}

impl Authenticator {
    pub fn new(
        provisioner: Arc<KeyProvisioner>,
        env: Arc<dyn EnvSource>,
        options: &VerifierOptions,
    ) -> Self {
        let verifier = TokenVerifier::new(provisioner.clone(), options);
        Self {
            provisioner,
            verifier,
            env,
        }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthOutcome {
        if let Err(fault) = self.provisioner.get_verifier_key().await {
            tracing::error!(error = %fault, "verifier key unavailable, refusing request");
            return AuthOutcome::server_fault();
        }

        let Some(cookie_header) = cookie_header(headers) else {
            return AuthOutcome::rejected(Rejection::Unauthenticated);
        };

        let env = EnvironmentConfig::resolve_from(self.env.as_ref());
        let cookie_name = env.effective_cookie_name();

        let token = match find_cookie(&cookie_header, cookie_name) {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::debug!(cookie_name, "session cookie not present");
                return AuthOutcome::rejected(Rejection::Unauthenticated);
            }
        };

        let claims = match self.verifier.validate(token).await {
            Ok(claims) => claims,
            Err(fault) => {
                tracing::warn!(error = %fault, "session token validation failed");
                return AuthOutcome::rejected(Rejection::InvalidToken);
            }
        };

        match TokenVerifier::extract_claim(&claims, USER_ID_CLAIM) {
            Ok(identity) => AuthOutcome::Authenticated { identity },
            Err(fault) => {
                tracing::warn!(error = %fault, "session token has no usable identity");
                AuthOutcome::rejected(Rejection::Unauthorized)
            }
        }
    }
}

// All Cookie header lines, joined the way a single header would carry them.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    (!joined.is_empty()).then_some(joined)
}

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::services::auth::fault::AuthFault;
use crate::services::auth::provisioner::KeyProvisioner;

/// Signing algorithms accepted for session tokens (RSA PKCS#1 v1.5 only).
pub const RSA_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Claim set of a verified token.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AuthClaims(Map<String, Value>);

impl AuthClaims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Optional checks layered on top of signature verification.
///
/// With everything unset only the signature, algorithm and (when present)
/// `exp` / `nbf` are checked.
#[derive(Debug, Clone, Default)]
pub struct VerifierOptions {
    pub leeway_seconds: u64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// RSA session-token verifier backed by the provisioned public key.
pub struct TokenVerifier {
    provisioner: Arc<KeyProvisioner>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("provisioner", &self.provisioner)
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(provisioner: Arc<KeyProvisioner>, options: &VerifierOptions) -> Self {
        Self {
            provisioner,
            validation: build_validation(options),
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// `KeyUnavailable` when provisioning failed; `InvalidToken` for a non-RSA
    /// algorithm, a bad signature, malformed input or an expired token.
    pub async fn validate(&self, token: &str) -> Result<AuthClaims, AuthFault> {
        let key = self
            .provisioner
            .get_verifier_key()
            .await
            .map_err(|_| AuthFault::KeyUnavailable)?;

        decode_claims(token, &key, &self.validation)
    }

    /// A claim that must be a non-empty string.
    pub fn extract_claim(claims: &AuthClaims, name: &str) -> Result<String, AuthFault> {
        match claims.get(name) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
            Some(Value::String(_)) => Err(AuthFault::Unauthorized(format!("empty '{name}' claim"))),
            Some(_) => Err(AuthFault::Unauthorized(format!(
                "'{name}' claim is not a string"
            ))),
            None => Err(AuthFault::Unauthorized(format!("missing '{name}' claim"))),
        }
    }
}

fn build_validation(options: &VerifierOptions) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = RSA_ALGORITHMS.to_vec();
    // No registered claim is mandatory; exp/nbf are still enforced when present.
    validation.required_spec_claims.clear();
    validation.validate_nbf = true;
    validation.leeway = options.leeway_seconds;

    match &options.audience {
        Some(audience) => {
            validation.set_audience(&[audience]);
            validation.required_spec_claims.insert("aud".to_string());
        }
        None => validation.validate_aud = false,
    }
    if let Some(issuer) = &options.issuer {
        validation.set_issuer(&[issuer]);
        validation.required_spec_claims.insert("iss".to_string());
    }

    validation
}

fn decode_claims(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<AuthClaims, AuthFault> {
    // Checked before touching the key so no other algorithm family gets through.
    let header = jsonwebtoken::decode_header(token)?;
    if !RSA_ALGORITHMS.contains(&header.alg) {
        return Err(AuthFault::InvalidToken(format!(
            "algorithm {:?} not allowed",
            header.alg
        )));
    }

    let data = jsonwebtoken::decode::<AuthClaims>(token, key, validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    use super::*;
    use crate::services::auth::test_support::{
        CountingStore, EC_PRIVATE_PEM, RSA_PRIVATE_PEM, RSA_PUBLIC_PEM,
        RSA_UNTRUSTED_PRIVATE_PEM, env_map, now, sign, sign_hs256, sign_rs256,
    };

    fn verifier_with(options: VerifierOptions) -> TokenVerifier {
        let store = CountingStore::serving(RSA_PUBLIC_PEM);
        let provisioner = Arc::new(KeyProvisioner::new(store, env_map(&[])));
        TokenVerifier::new(provisioner, &options)
    }

    fn verifier() -> TokenVerifier {
        verifier_with(VerifierOptions::default())
    }

    fn unsigned_token(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{body}.")
    }

    #[tokio::test]
    async fn accepts_rs256_token_and_returns_claims() {
        let token = sign_rs256(&json!({ "userId": "u1", "role": "member" }));
        let claims = verifier().validate(&token).await.expect("valid token");
        assert_eq!(claims.get("userId"), Some(&json!("u1")));
        assert_eq!(claims.get("role"), Some(&json!("member")));
    }

    #[tokio::test]
    async fn accepts_rs384_and_rs512() {
        for alg in [Algorithm::RS384, Algorithm::RS512] {
            let token = sign(alg, RSA_PRIVATE_PEM, &json!({ "userId": "u1" }));
            assert!(verifier().validate(&token).await.is_ok(), "{alg:?}");
        }
    }

    #[tokio::test]
    async fn rejects_rsa_pss_tokens() {
        for alg in [Algorithm::PS256, Algorithm::PS384, Algorithm::PS512] {
            let token = sign(alg, RSA_PRIVATE_PEM, &json!({ "userId": "u1" }));
            let err = verifier().validate(&token).await.err();
            assert!(matches!(err, Some(AuthFault::InvalidToken(_))), "{alg:?}");
        }
    }

    #[tokio::test]
    async fn token_without_registered_claims_is_accepted() {
        let token = sign_rs256(&json!({}));
        let claims = verifier().validate(&token).await.expect("valid token");
        assert_eq!(claims, AuthClaims::default());
    }

    #[tokio::test]
    async fn rejects_hmac_token() {
        let token = sign_hs256(RSA_PUBLIC_PEM.as_bytes(), &json!({ "userId": "u1" }));
        let err = verifier().validate(&token).await.err();
        assert!(matches!(err, Some(AuthFault::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_ecdsa_token() {
        let token = sign(Algorithm::ES256, EC_PRIVATE_PEM, &json!({ "userId": "u1" }));
        let err = verifier().validate(&token).await.err();
        assert!(matches!(err, Some(AuthFault::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_unsigned_token() {
        let token = unsigned_token(&json!({ "userId": "u1" }));
        let err = verifier().validate(&token).await.err();
        assert!(matches!(err, Some(AuthFault::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_token_signed_by_another_key() {
        let token = sign(
            Algorithm::RS256,
            RSA_UNTRUSTED_PRIVATE_PEM,
            &json!({ "userId": "u1" }),
        );
        let err = verifier().validate(&token).await.err();
        assert!(matches!(err, Some(AuthFault::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let token = sign_rs256(&json!({ "userId": "u1", "exp": now() - 3600 }));
        let err = verifier().validate(&token).await.err();
        assert!(matches!(err, Some(AuthFault::InvalidToken(_))));
    }

    #[tokio::test]
    async fn leeway_tolerates_slightly_expired_token() {
        let token = sign_rs256(&json!({ "userId": "u1", "exp": now() - 30 }));
        let v = verifier_with(VerifierOptions {
            leeway_seconds: 120,
            ..Default::default()
        });
        assert!(v.validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_not_yet_valid_token() {
        let token = sign_rs256(&json!({ "userId": "u1", "nbf": now() + 3600 }));
        let err = verifier().validate(&token).await.err();
        assert!(matches!(err, Some(AuthFault::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        for token in ["", "abc", "a.b.c", "expiredtoken"] {
            let err = verifier().validate(token).await.err();
            assert!(matches!(err, Some(AuthFault::InvalidToken(_))), "{token}");
        }
    }

    #[tokio::test]
    async fn issuer_and_audience_are_checked_when_configured() {
        let v = verifier_with(VerifierOptions {
            issuer: Some("rds-backend".into()),
            audience: Some("feature-flags".into()),
            ..Default::default()
        });

        let good = sign_rs256(&json!({
            "userId": "u1", "iss": "rds-backend", "aud": "feature-flags"
        }));
        assert!(v.validate(&good).await.is_ok());

        let wrong_iss = sign_rs256(&json!({
            "userId": "u1", "iss": "someone-else", "aud": "feature-flags"
        }));
        assert!(v.validate(&wrong_iss).await.is_err());

        let no_claims = sign_rs256(&json!({ "userId": "u1" }));
        assert!(v.validate(&no_claims).await.is_err());
    }

    #[tokio::test]
    async fn audience_claim_is_ignored_when_not_configured() {
        let token = sign_rs256(&json!({ "userId": "u1", "aud": "anything" }));
        assert!(verifier().validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn key_unavailable_when_provisioning_failed() {
        let store = CountingStore::failing("timeout");
        let provisioner = Arc::new(KeyProvisioner::new(store, env_map(&[])));
        let v = TokenVerifier::new(provisioner, &VerifierOptions::default());

        let token = sign_rs256(&json!({ "userId": "u1" }));
        assert_eq!(v.validate(&token).await.err(), Some(AuthFault::KeyUnavailable));
    }

    #[test]
    fn extract_claim_requires_non_empty_string() {
        let claims: AuthClaims = serde_json::from_value(json!({
            "userId": "u1", "empty": "", "number": 7, "null": null
        }))
        .expect("claims");

        assert_eq!(
            TokenVerifier::extract_claim(&claims, "userId").ok(),
            Some("u1".to_string())
        );
        for name in ["empty", "number", "null", "absent"] {
            let err = TokenVerifier::extract_claim(&claims, name).err();
            assert!(matches!(err, Some(AuthFault::Unauthorized(_))), "{name}");
        }
    }
}

use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use tokio::sync::OnceCell;

use crate::config::{EnvSource, EnvironmentConfig};
use crate::services::auth::fault::AuthFault;
use crate::services::parameter_store::ParameterStore;

type Provisioned = Result<Arc<DecodingKey>, AuthFault>;

/// Fetch-once holder for the RSA public key that verifies session tokens.
///
/// The first caller fetches the PEM from the parameter store and parses it;
/// concurrent callers wait on the same cell and see that single result. The
/// outcome is kept for the life of the process, failures included: a failed
/// attempt is never retried by this type.
pub struct KeyProvisioner {
    store: Arc<dyn ParameterStore>,
    env: Arc<dyn EnvSource>,
    cell: OnceCell<Provisioned>,
}

impl std::fmt::Debug for KeyProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("KeyProvisioner")
            .field("backend", &self.store.backend_name())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl KeyProvisioner {
    pub fn new(store: Arc<dyn ParameterStore>, env: Arc<dyn EnvSource>) -> Self {
        Self {
            store,
            env,
            cell: OnceCell::new(),
        }
    }

    /// The cached verifier key, provisioning it on first use.
    pub async fn get_verifier_key(&self) -> Result<Arc<DecodingKey>, AuthFault> {
        self.cell.get_or_init(|| self.provision()).await.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn provision(&self) -> Provisioned {
        let env = EnvironmentConfig::resolve_from(self.env.as_ref());
        let key_identifier = env.effective_key_identifier();
        let backend = self.store.backend_name();

        let pem = match self.store.get_parameter(key_identifier, true).await {
            Ok(pem) => pem,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    backend,
                    key_identifier,
                    "failed to fetch verifier public key"
                );
                return Err(AuthFault::KeyStoreUnavailable(err.to_string()));
            }
        };

        match parse_rsa_public_key(&pem) {
            Ok(key) => {
                tracing::info!(backend, key_identifier, "verifier public key provisioned");
                Ok(Arc::new(key))
            }
            Err(fault) => {
                tracing::error!(error = %fault, key_identifier, "verifier public key rejected");
                Err(fault)
            }
        }
    }
}

const SPKI_LABEL: &str = "PUBLIC KEY";
const PKCS1_LABEL: &str = "RSA PUBLIC KEY";

/// Parse PEM text into an RSA verification key.
///
/// Values stored with escaped newlines (`\n` as two characters) are accepted,
/// and text around the first PEM block is ignored. Only `PUBLIC KEY` (SPKI)
/// and `RSA PUBLIC KEY` (PKCS#1) blocks whose DER is a well-formed RSA public
/// key pass; anything else is `KeyMaterialInvalid`.
pub fn parse_rsa_public_key(pem: &str) -> Result<DecodingKey, AuthFault> {
    let text = pem.replace("\\n", "\n");
    let (label, block) = first_pem_block(&text)
        .ok_or_else(|| AuthFault::KeyMaterialInvalid("no PEM block found".into()))?;

    let key = match label {
        SPKI_LABEL => RsaPublicKey::from_public_key_pem(block)
            .map_err(|e| AuthFault::KeyMaterialInvalid(format!("not an RSA public key: {e}")))?,
        PKCS1_LABEL => RsaPublicKey::from_pkcs1_pem(block)
            .map_err(|e| AuthFault::KeyMaterialInvalid(format!("malformed RSA public key: {e}")))?,
        other => {
            return Err(AuthFault::KeyMaterialInvalid(format!(
                "unexpected PEM block '{other}'"
            )));
        }
    };

    Ok(DecodingKey::from_rsa_raw_components(
        &key.n().to_bytes_be(),
        &key.e().to_bytes_be(),
    ))
}

// First `-----BEGIN <label>----- ... -----END <label>-----` block and its label.
fn first_pem_block(text: &str) -> Option<(&str, &str)> {
    const BEGIN: &str = "-----BEGIN ";
    const DASHES: &str = "-----";

    let start = text.find(BEGIN)?;
    let after_begin = &text[start + BEGIN.len()..];
    let label = &after_begin[..after_begin.find(DASHES)?];

    let end_marker = format!("-----END {label}-----");
    let end = start + text[start..].find(&end_marker)? + end_marker.len();

    Some((label, &text[start..end]))
}

//! Fixtures shared by the auth tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;

use crate::config::EnvSource;
use crate::services::parameter_store::client::{
    ParameterResult, ParameterStore, ParameterStoreError,
};

pub const RSA_PUBLIC_PEM: &str = include_str!("../../../testdata/rsa_public.pem");
pub const RSA_PUBLIC_PKCS1_PEM: &str = include_str!("../../../testdata/rsa_public_pkcs1.pem");
pub const RSA_PRIVATE_PEM: &str = include_str!("../../../testdata/rsa_private.pem");
pub const RSA_UNTRUSTED_PRIVATE_PEM: &str =
    include_str!("../../../testdata/rsa_untrusted_private.pem");
pub const EC_PUBLIC_PEM: &str = include_str!("../../../testdata/ec_public.pem");
pub const EC_PRIVATE_PEM: &str = include_str!("../../../testdata/ec_private.pem");

pub fn env_map(pairs: &[(&str, &str)]) -> Arc<dyn EnvSource> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(map)
}

/// In-memory store that counts fetches and records what was asked for.
pub struct CountingStore {
    value: Result<String, String>,
    delay: Duration,
    fetches: AtomicUsize,
    requests: Mutex<Vec<(String, bool)>>,
}

impl CountingStore {
    pub fn serving(pem: &str) -> Arc<Self> {
        Arc::new(Self::new(Ok(pem.to_string()), Duration::ZERO))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self::new(Err(message.to_string()), Duration::ZERO))
    }

    pub fn slow(pem: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(Ok(pem.to_string()), delay))
    }

    fn new(value: Result<String, String>, delay: Duration) -> Self {
        Self {
            value,
            delay,
            fetches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, bool)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ParameterStore for CountingStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_parameter(&self, name: &str, with_decryption: bool) -> ParameterResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((name.to_string(), with_decryption));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.value.clone().map_err(ParameterStoreError::Backend)
    }
}

pub fn sign(alg: Algorithm, private_pem: &str, claims: &Value) -> String {
    let key = match alg {
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(private_pem.as_bytes()),
        _ => EncodingKey::from_rsa_pem(private_pem.as_bytes()),
    }
    .expect("test signing key");
    jsonwebtoken::encode(&Header::new(alg), claims, &key).expect("sign test token")
}

pub fn sign_rs256(claims: &Value) -> String {
    sign(Algorithm::RS256, RSA_PRIVATE_PEM, claims)
}

pub fn sign_hs256(secret: &[u8], claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("sign test token")
}

pub fn now() -> u64 {
    jsonwebtoken::get_current_timestamp()
}

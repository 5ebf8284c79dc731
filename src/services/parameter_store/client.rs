//! Parameter store interface used by key provisioning.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for parameter store operations.
pub type ParameterResult<T> = Result<T, ParameterStoreError>;

/// Parameter-store errors (transport/service/missing value).
///
/// Kept apart from `AuthFault` so the provisioner decides how a backend
/// failure maps onto the auth taxonomy.
#[derive(Debug, Error)]
pub enum ParameterStoreError {
    #[error("parameter store request failed: {0}")]
    Backend(String),
    #[error("parameter has no value: {0}")]
    MissingValue(String),
}

/// A remote key/value store holding secrets by name.
#[async_trait]
pub trait ParameterStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Fetch a parameter's value as UTF-8 text.
    //
    // `with_decryption` asks the backend to decrypt secure values server-side.
    async fn get_parameter(&self, name: &str, with_decryption: bool) -> ParameterResult<String>;
}

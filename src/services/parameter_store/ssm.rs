use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::config::Region;
use aws_sdk_ssm::error::DisplayErrorContext;

use crate::services::parameter_store::client::{
    ParameterResult, ParameterStore, ParameterStoreError,
};

/// AWS Systems Manager Parameter Store client.
///
/// Retries (bounded attempts with backoff) come from the SDK's standard retry
/// policy; `AWS_MAX_ATTEMPTS` tunes it.
#[derive(Clone, Debug)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    // Load credentials/region from the default provider chain.
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        Self {
            client: aws_sdk_ssm::Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    fn backend_name(&self) -> &'static str {
        "ssm"
    }

    async fn get_parameter(&self, name: &str, with_decryption: bool) -> ParameterResult<String> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|e| ParameterStoreError::Backend(DisplayErrorContext(&e).to_string()))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_owned)
            .ok_or_else(|| ParameterStoreError::MissingValue(name.to_string()))
    }
}

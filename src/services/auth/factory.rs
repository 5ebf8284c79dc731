//! Factory: build the `Authenticator` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, EnvSource, ProcessEnv};
use crate::services::auth::{Authenticator, KeyProvisioner, VerifierOptions};
use crate::services::parameter_store::ParameterStore;

// Nothing is fetched here; the key is provisioned by the first request.
pub fn build_authenticator(config: &Config, store: Arc<dyn ParameterStore>) -> Arc<Authenticator> {
    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);
    let provisioner = Arc::new(KeyProvisioner::new(store, env.clone()));

    let options = VerifierOptions {
        leeway_seconds: config.token_leeway_seconds,
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
    };

    Arc::new(Authenticator::new(provisioner, env, &options))
}

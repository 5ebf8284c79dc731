pub mod authenticator;
pub mod cookie;
pub mod factory;
pub mod fault;
pub mod provisioner;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use authenticator::{AuthOutcome, Authenticator, Rejection};
pub use factory::build_authenticator;
pub use provisioner::KeyProvisioner;
pub use verifier::VerifierOptions;

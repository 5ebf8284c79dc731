pub mod client;
pub mod ssm;

pub use client::ParameterStore;
pub use ssm::SsmParameterStore;

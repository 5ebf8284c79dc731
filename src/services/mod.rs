pub mod auth;
pub mod parameter_store;

//! Authentication module
//!
//! Supports: Teamtailor token, None
//!
//! The `Authenticator` turns an `AuthConfig` into request headers. Every
//! stream of a connector shares one authenticator.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;

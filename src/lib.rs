//! # Scoped Google OAuth2 token cache
//!
//! Turns a long-lived refresh token into short-lived access tokens per scope
//! set, caching each token until shortly before expiry and making sure only
//! one exchange per scope set runs at a time.
//!
//! Modules:
//! - `scope`: scope input normalization and the service alias table
//! - `cache`: credentials and cached token records
//! - `store`: the `TokenStore` and its refresh coordinator
//! - `sources`: token endpoint transport and environment lookups
//! - `config`: YAML configuration for the binary

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod scope;
pub mod sources;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::ServiceConfig;
pub use crate::error::{AuthError, AuthResult};
pub use crate::scope::{normalize, NormalizedScope, ScopeInput};
pub use crate::store::{AuthOptions, StoreSummary, TokenData, TokenEnvelope, TokenStore};

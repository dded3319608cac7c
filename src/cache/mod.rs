//! Scope-keyed token cache state.
//!
//! - `credentials`: global defaults and per-entry credential merging
//! - `token_entry`: the cached token record and its validity check

pub mod credentials;
pub mod token_entry;

pub use credentials::{CredentialDefaults, Credentials, EntryCredentials};
pub use token_entry::CacheEntry;

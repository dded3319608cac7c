//! YAML configuration: settings, default credentials, per-scope overrides.

pub mod bootstrap;
pub mod loader;
pub mod settings;
pub mod types;

pub use types::ServiceConfig;

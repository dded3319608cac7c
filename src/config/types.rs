use serde::Deserialize;
use std::collections::HashMap;

use crate::cache::credentials::Credentials;
use crate::config::settings::SettingsConfig;
use crate::scope::ScopeInput;
use crate::store::AuthOptions;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    /// global default credentials
    #[serde(default)]
    pub credentials: Credentials,
    /// per-scope credential overrides
    #[serde(default)]
    pub scopes: Vec<ScopeConfig>,
    /// values served by the environment collaborator (`gauth.clientId`, `google.scope`, ...)
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// ================================
/// Scopes
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ScopeConfig {
    pub scope: ScopeInput,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl ScopeConfig {
    pub fn to_options(&self) -> AuthOptions {
        AuthOptions {
            credentials: self.credentials.clone(),
            scope: Some(self.scope.clone()),
            ..AuthOptions::default()
        }
    }
}

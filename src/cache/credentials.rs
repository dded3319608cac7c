use serde::{Deserialize, Serialize};

use crate::helpers::lenient::opt_string;
use crate::sources::env::EnvSource;
use crate::utils::constants::{
    DEFAULT_TOKEN_ENDPOINT, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REFRESH_TOKEN, ENV_TOKEN_ENDPOINT,
};

/// Credential fields a caller may supply. Absent or empty fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, alias = "client_id", deserialize_with = "opt_string")]
    pub client_id: Option<String>,
    #[serde(default, alias = "client_secret", deserialize_with = "opt_string")]
    pub client_secret: Option<String>,
    #[serde(default, alias = "refresh_token", deserialize_with = "opt_string")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "token_endpoint", deserialize_with = "opt_string")]
    pub token_endpoint: Option<String>,
}

/// Process-wide fallback credentials, seeded into every new cache entry.
///
/// An unset `token_endpoint` defers to the environment, then to Google's
/// token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialDefaults {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub token_endpoint: Option<String>,
}

impl CredentialDefaults {
    /// Overwrite each field that is present and non-empty in `creds`.
    pub fn apply(&mut self, creds: &Credentials) {
        overwrite(&mut self.client_id, &creds.client_id);
        overwrite(&mut self.client_secret, &creds.client_secret);
        overwrite(&mut self.refresh_token, &creds.refresh_token);
        overwrite(&mut self.token_endpoint, &creds.token_endpoint);
    }

    /// Client id, secret and refresh token are all set.
    pub fn is_complete(&self) -> bool {
        given(&self.client_id).is_some()
            && given(&self.client_secret).is_some()
            && given(&self.refresh_token).is_some()
    }
}

/// The credential half of a cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub token_endpoint: Option<String>,
}

impl EntryCredentials {
    pub fn seeded_from(defaults: &CredentialDefaults) -> Self {
        Self {
            client_id: defaults.client_id.clone(),
            client_secret: defaults.client_secret.clone(),
            refresh_token: defaults.refresh_token.clone(),
            token_endpoint: defaults.token_endpoint.clone(),
        }
    }

    /// Merge explicit overrides, then fill remaining gaps from the global
    /// defaults, then from the environment, and finally Google's endpoint.
    pub fn merge(&mut self, overrides: &Credentials, defaults: &CredentialDefaults, env: &dyn EnvSource) {
        overwrite(&mut self.client_id, &overrides.client_id);
        overwrite(&mut self.client_secret, &overrides.client_secret);
        overwrite(&mut self.refresh_token, &overrides.refresh_token);
        overwrite(&mut self.token_endpoint, &overrides.token_endpoint);

        fill(&mut self.client_id, &defaults.client_id, env, ENV_CLIENT_ID);
        fill(&mut self.client_secret, &defaults.client_secret, env, ENV_CLIENT_SECRET);
        fill(&mut self.refresh_token, &defaults.refresh_token, env, ENV_REFRESH_TOKEN);
        fill(&mut self.token_endpoint, &defaults.token_endpoint, env, ENV_TOKEN_ENDPOINT);
        if given(&self.token_endpoint).is_none() {
            self.token_endpoint = Some(DEFAULT_TOKEN_ENDPOINT.to_owned());
        }
    }

    pub fn is_complete(&self) -> bool {
        given(&self.client_id).is_some()
            && given(&self.client_secret).is_some()
            && given(&self.refresh_token).is_some()
    }

    pub fn endpoint(&self) -> &str {
        given(&self.token_endpoint).unwrap_or(DEFAULT_TOKEN_ENDPOINT)
    }
}

/// `Some` only for a non-empty value.
pub(crate) fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn overwrite(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = given(value) {
        *target = Some(v.to_owned());
    }
}

fn fill(target: &mut Option<String>, default: &Option<String>, env: &dyn EnvSource, env_key: &str) {
    if given(target).is_some() {
        return;
    }
    *target = given(default)
        .map(str::to_owned)
        .or_else(|| env.get(env_key).filter(|v| !v.is_empty()));
}

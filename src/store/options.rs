use serde::{Deserialize, Serialize};

use crate::cache::credentials::Credentials;
use crate::helpers::lenient::opt_string;
use crate::scope::ScopeInput;

/// Options accepted by `configure`, `get_access_token` and friends.
///
/// The scope may arrive under any of `scope`, `scopes` or `services`; the
/// first one present wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOptions {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub scope: Option<ScopeInput>,
    #[serde(default)]
    pub scopes: Option<ScopeInput>,
    #[serde(default)]
    pub services: Option<ScopeInput>,
}

impl AuthOptions {
    pub fn for_scope(scope: impl Into<ScopeInput>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::default()
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.credentials.client_id = Some(client_id.into());
        self
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.credentials.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.credentials.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_token_endpoint(mut self, token_endpoint: impl Into<String>) -> Self {
        self.credentials.token_endpoint = Some(token_endpoint.into());
        self
    }

    pub fn scope_input(&self) -> Option<&ScopeInput> {
        pick_scope(&self.scope, &self.scopes, &self.services)
    }
}

/// A previously obtained token set to place directly into the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    #[serde(default, alias = "access_token", deserialize_with = "opt_string")]
    pub access_token: Option<String>,
    /// UNIX timestamp, milliseconds
    #[serde(default, alias = "expires_at")]
    pub expires_at: Option<i64>,
    /// UNIX timestamp, seconds
    #[serde(default, alias = "obtained_at")]
    pub obtained_at: Option<i64>,
    #[serde(default, alias = "refresh_token", deserialize_with = "opt_string")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<ScopeInput>,
    #[serde(default)]
    pub scopes: Option<ScopeInput>,
    #[serde(default)]
    pub services: Option<ScopeInput>,
}

impl TokenData {
    pub fn scope_input(&self) -> Option<&ScopeInput> {
        pick_scope(&self.scope, &self.scopes, &self.services)
    }
}

fn pick_scope<'a>(
    scope: &'a Option<ScopeInput>,
    scopes: &'a Option<ScopeInput>,
    services: &'a Option<ScopeInput>,
) -> Option<&'a ScopeInput> {
    [scope, scopes, services]
        .into_iter()
        .flatten()
        .find(|input| input.is_present())
}

/// Token details reported by `get_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedTokens {
    pub access_token: String,
    /// seconds until nominal expiry
    pub expires_in: i64,
    /// UNIX timestamp, seconds
    pub obtained_at: i64,
    pub scope: String,
}

/// Result envelope of `get_token`: `{"status":"ok","tokens":{..}}` or
/// `{"status":"error","error":".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TokenEnvelope {
    Ok { tokens: IssuedTokens },
    Error { error: String },
}

impl TokenEnvelope {
    pub fn is_ok(&self) -> bool {
        matches!(self, TokenEnvelope::Ok { .. })
    }
}

/// `to_json` snapshot of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    /// Global defaults carry client id, secret and refresh token.
    pub configured: bool,
    /// Every scope key seen so far.
    pub scopes: Vec<String>,
}

//! The token store: credential configuration, token injection and the
//! scope-keyed cache, plus the refresh coordinator in `refresh`.

pub mod options;
pub mod refresh;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::credentials::{CredentialDefaults, Credentials};
use crate::cache::token_entry::CacheEntry;
use crate::error::{AuthError, AuthResult};
use crate::scope::{normalize, NormalizedScope, ScopeInput};
use crate::sources::env::{EnvSource, ProcessEnv};
use crate::sources::transport::{FormTransport, ReqwestTransport};
use crate::utils::constants::{ENV_GAUTH_SCOPE, ENV_GOOGLE_SCOPE};

pub use options::{AuthOptions, IssuedTokens, StoreSummary, TokenData, TokenEnvelope};

pub(crate) type SharedExchange = Shared<BoxFuture<'static, AuthResult<String>>>;

/// An exchange running for one scope key.
pub(crate) struct InFlight {
    pub generation: u64,
    pub exchange: SharedExchange,
}

#[derive(Default)]
pub(crate) struct StoreState {
    pub defaults: CredentialDefaults,
    pub entries: BTreeMap<String, CacheEntry>,
    pub in_flight: HashMap<String, InFlight>,
    next_generation: u64,
}

impl StoreState {
    /// Fetch or create the entry for `scope_key`, then merge `overrides` into it.
    pub fn prepare_entry(&mut self, scope_key: &str, overrides: &Credentials, env: &dyn EnvSource) -> &mut CacheEntry {
        let defaults = &self.defaults;
        let entry = self
            .entries
            .entry(scope_key.to_owned())
            .or_insert_with(|| CacheEntry::new(scope_key, defaults));
        entry.credentials.merge(overrides, defaults, env);
        entry
    }

    /// Fetch or create the entry without touching its credentials.
    pub fn entry_mut(&mut self, scope_key: &str) -> &mut CacheEntry {
        let defaults = &self.defaults;
        self.entries
            .entry(scope_key.to_owned())
            .or_insert_with(|| CacheEntry::new(scope_key, defaults))
    }

    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Drop the in-flight marker for `scope_key` if it still belongs to `generation`.
    /// Returns whether it did.
    pub fn settle(&mut self, scope_key: &str, generation: u64) -> bool {
        match self.in_flight.get(scope_key) {
            Some(in_flight) if in_flight.generation == generation => {
                self.in_flight.remove(scope_key);
                true
            }
            _ => false,
        }
    }
}

pub(crate) struct StoreInner<T> {
    pub transport: T,
    pub env: Box<dyn EnvSource>,
    pub state: RwLock<StoreState>,
}

/// Scope-keyed access token cache backed by a refresh-token exchange.
///
/// Cloning is cheap and clones share state.
pub struct TokenStore<T: FormTransport = ReqwestTransport> {
    inner: Arc<StoreInner<T>>,
}

impl<T: FormTransport> Clone for TokenStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl TokenStore<ReqwestTransport> {
    /// Store talking to the token endpoint over reqwest, with fallbacks read
    /// from the process environment.
    pub fn new() -> Self {
        Self::with_parts(ReqwestTransport::default(), ProcessEnv)
    }
}

impl Default for TokenStore<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FormTransport> TokenStore<T> {
    pub fn with_parts(transport: T, env: impl EnvSource + 'static) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                transport,
                env: Box::new(env),
                state: RwLock::new(StoreState::default()),
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Normalize `input`, falling back to the `google.scope` / `gauth.scope`
    /// configuration values.
    pub fn resolve_scope(&self, input: Option<&ScopeInput>) -> NormalizedScope {
        let env = &self.inner.env;
        let fallback = env
            .get(ENV_GOOGLE_SCOPE)
            .filter(|v| !v.is_empty())
            .or_else(|| env.get(ENV_GAUTH_SCOPE))
            .unwrap_or_default();
        normalize(input, Some(fallback.as_str()))
    }

    /// Without a scope: update the global defaults.
    /// With a scope: merge credentials into that scope's entry and invalidate
    /// its cached token.
    pub async fn configure(&self, options: &AuthOptions) {
        let mut state = self.inner.state.write().await;
        match options.scope_input() {
            Some(input) => {
                let scope = self.resolve_scope(Some(input));
                let entry = state.prepare_entry(&scope.scope_key, &options.credentials, self.inner.env.as_ref());
                entry.clear_tokens();
                entry.scope = scope.scope_string;
                state.in_flight.remove(&scope.scope_key);
                info!(scope_key = %scope.scope_key, "scope credentials configured");
            }
            None => {
                state.defaults.apply(&options.credentials);
                info!(configured = state.defaults.is_complete(), "default credentials configured");
            }
        }
    }

    /// `configure` for untyped input: `null` behaves as empty options, any
    /// other non-object is rejected.
    pub async fn configure_value(&self, options: Value) -> AuthResult<()> {
        let options = match options {
            Value::Null => AuthOptions::default(),
            Value::Object(_) => serde_json::from_value(options)
                .map_err(|e| AuthError::invalid_input("configure", e.to_string()))?,
            _ => return Err(AuthError::invalid_input("configure", "options must be object")),
        };
        self.configure(&options).await;
        Ok(())
    }

    /// Place a previously obtained token set into the cache, overwriting only
    /// the fields present in `tokens`.
    pub async fn set_tokens(&self, tokens: &TokenData) {
        let scope = self.resolve_scope(tokens.scope_input());
        let mut state = self.inner.state.write().await;
        let entry = state.entry_mut(&scope.scope_key);
        if let Some(access_token) = tokens.access_token.as_deref().filter(|t| !t.is_empty()) {
            entry.access_token = Some(access_token.to_owned());
        }
        if let Some(expires_at) = tokens.expires_at {
            entry.expires_at = expires_at;
        }
        if let Some(obtained_at) = tokens.obtained_at {
            entry.obtained_at = obtained_at;
        }
        if let Some(refresh_token) = tokens.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            entry.credentials.refresh_token = Some(refresh_token.to_owned());
        }
        debug!(scope_key = %scope.scope_key, "tokens injected");
    }

    /// `set_tokens` for untyped input; anything but an object is rejected.
    pub async fn set_tokens_value(&self, tokens: Value) -> AuthResult<()> {
        if !tokens.is_object() {
            return Err(AuthError::invalid_input("setTokens", "object required"));
        }
        let tokens: TokenData =
            serde_json::from_value(tokens).map_err(|e| AuthError::invalid_input("setTokens", e.to_string()))?;
        self.set_tokens(&tokens).await;
        Ok(())
    }

    /// Reset token state of one scope (when `options` carries a scope) or of
    /// every scope, and drop the matching in-flight markers. Credentials stay.
    pub async fn clear(&self, options: Option<&AuthOptions>) {
        let mut state = self.inner.state.write().await;
        match options.and_then(AuthOptions::scope_input) {
            Some(input) => {
                let scope = self.resolve_scope(Some(input));
                state.entry_mut(&scope.scope_key).clear_tokens();
                state.in_flight.remove(&scope.scope_key);
                debug!(scope_key = %scope.scope_key, "scope tokens cleared");
            }
            None => {
                state.entries.values_mut().for_each(CacheEntry::clear_tokens);
                state.in_flight.clear();
                debug!("all tokens cleared");
            }
        }
    }

    pub async fn to_json(&self) -> StoreSummary {
        let state = self.inner.state.read().await;
        StoreSummary {
            configured: state.defaults.is_complete(),
            scopes: state.entries.keys().cloned().collect(),
        }
    }

    /// Copy of the cache entry for a scope, if one was created.
    pub async fn entry(&self, scope: Option<&ScopeInput>) -> Option<CacheEntry> {
        let scope = self.resolve_scope(scope);
        self.inner.state.read().await.entries.get(&scope.scope_key).cloned()
    }
}

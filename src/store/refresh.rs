use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::cache::token_entry::CacheEntry;
use crate::error::{AuthError, AuthResult};
use crate::helpers::time::{get_instant, now_ms, now_secs, skew_ms};
use crate::observability::metrics::{get_metrics, scope_label};
use crate::sources::oauth2::{RefreshGrant, TokenGrant};
use crate::sources::transport::FormTransport;
use crate::store::options::{AuthOptions, IssuedTokens, TokenEnvelope};
use crate::store::{InFlight, SharedExchange, StoreInner, TokenStore};
use crate::utils::constants::BEARER_HEADER_PREFIX;

impl<T: FormTransport> TokenStore<T> {
    /// Cached access token for the requested scope, refreshing it when it is
    /// missing or inside the expiry margin.
    ///
    /// Concurrent callers for the same scope key share one exchange; distinct
    /// scope keys refresh independently.
    pub async fn get_access_token(&self, options: Option<&AuthOptions>) -> AuthResult<String> {
        let defaults = AuthOptions::default();
        let options = options.unwrap_or(&defaults);
        let scope = self.resolve_scope(options.scope_input());
        let scope_key = scope.scope_key.as_str();
        let metrics = get_metrics().await;
        let label = scope_label(scope_key);

        let exchange: SharedExchange = {
            let mut state = self.inner.state.write().await;
            let entry = state.prepare_entry(scope_key, &options.credentials, self.inner.env.as_ref());

            if let Some(token) = entry.valid_token(now_ms(), skew_ms()) {
                debug!(%scope_key, "access token served from cache");
                metrics.cache_hits.with_label_values(&[label]).inc();
                return Ok(token.to_owned());
            }

            let creds = &entry.credentials;
            let grant = match (&creds.client_id, &creds.client_secret, &creds.refresh_token) {
                (Some(client_id), Some(client_secret), Some(refresh_token)) if creds.is_complete() => RefreshGrant {
                    token_endpoint: creds.endpoint().to_owned(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    refresh_token: refresh_token.clone(),
                },
                _ => {
                    warn!(%scope_key, "no credentials to refresh access token");
                    return Err(AuthError::MissingCredentials {
                        scope_key: scope_key.to_owned(),
                    });
                }
            };
            metrics.cache_misses.with_label_values(&[label]).inc();

            if let Some(in_flight) = state.in_flight.get(scope_key) {
                debug!(%scope_key, "joining in-flight token exchange");
                metrics.coalesced_waits.with_label_values(&[label]).inc();
                in_flight.exchange.clone()
            } else {
                let generation = state.next_generation();
                let exchange = Arc::clone(&self.inner)
                    .run_exchange(scope_key.to_owned(), scope.scope_string.clone(), grant, generation)
                    .boxed()
                    .shared();
                state.in_flight.insert(
                    scope_key.to_owned(),
                    InFlight {
                        generation,
                        exchange: exchange.clone(),
                    },
                );
                exchange
            }
        };

        exchange.await
    }

    /// Discard the cached expiry for the scope and fetch a new token, unless
    /// an exchange for it is already running.
    pub async fn force_refresh(&self, options: Option<&AuthOptions>) -> AuthResult<String> {
        let scope = self.resolve_scope(options.and_then(AuthOptions::scope_input));
        self.inner.state.write().await.entry_mut(&scope.scope_key).expires_at = 0;
        self.get_access_token(options).await
    }

    /// `"Authorization: Bearer <token>"` for the default scope.
    pub async fn authorization_header(&self) -> AuthResult<String> {
        let token = self.get_access_token(None).await?;
        Ok(format!("{BEARER_HEADER_PREFIX}{token}"))
    }

    /// `get_access_token` wrapped in a status envelope instead of an error.
    pub async fn get_token(&self, options: Option<&AuthOptions>) -> TokenEnvelope {
        let token = match self.get_access_token(options).await {
            Ok(token) => token,
            Err(err) => return TokenEnvelope::Error { error: err.to_string() },
        };

        let scope = self.resolve_scope(options.and_then(AuthOptions::scope_input));
        let state = self.inner.state.read().await;
        let entry = state.entries.get(&scope.scope_key);
        let tokens = IssuedTokens {
            access_token: token,
            expires_in: entry.map(|e| e.expires_in_secs()).unwrap_or_default(),
            obtained_at: entry
                .map(|e| e.obtained_at)
                .filter(|ts| *ts != 0)
                .unwrap_or_else(now_secs),
            scope: entry
                .map(|e| e.scope.clone())
                .filter(|s| !s.is_empty())
                .unwrap_or(scope.scope_string),
        };
        TokenEnvelope::Ok { tokens }
    }

    /// The bare access token, or an empty string on any failure.
    ///
    /// Errors are swallowed on purpose; use `get_token` or `get_access_token`
    /// when the cause matters.
    pub async fn auth(&self, options: Option<&AuthOptions>) -> String {
        match self.get_token(options).await {
            TokenEnvelope::Ok { tokens } => tokens.access_token,
            TokenEnvelope::Error { .. } => String::new(),
        }
    }
}

impl<T: FormTransport> StoreInner<T> {
    /// One token exchange for `scope_key`. The result is written to the cache
    /// only while the exchange still owns the scope's in-flight marker, i.e.
    /// nobody cleared or reconfigured the scope meanwhile.
    async fn run_exchange(
        self: Arc<Self>,
        scope_key: String,
        scope_string: String,
        grant: RefreshGrant,
        generation: u64,
    ) -> AuthResult<String> {
        let metrics = get_metrics().await;
        let label = scope_label(&scope_key);
        metrics.exchange_requests.with_label_values(&[label]).inc();
        info!(%scope_key, endpoint = %grant.token_endpoint, "exchanging refresh token");

        let start = get_instant();
        let result = grant.exchange(&self.transport).await;
        metrics
            .exchange_duration
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        let mut state = self.state.write().await;
        let current = state.settle(&scope_key, generation);

        match result {
            Ok(issued) => {
                let entry = state.entry_mut(&scope_key);
                if current {
                    store_grant(entry, &issued, &scope_string);
                    info!(%scope_key, expires_in = issued.expires_in_secs, "access token refreshed");
                } else {
                    // invalidated mid-flight: keep a rotated refresh token, drop the access token
                    if entry.credentials.refresh_token.as_deref() == Some(grant.refresh_token.as_str()) {
                        if let Some(rotated) = &issued.refresh_token {
                            entry.credentials.refresh_token = Some(rotated.clone());
                        }
                    }
                    debug!(%scope_key, "scope invalidated during exchange, token not cached");
                }
                Ok(issued.access_token)
            }
            Err(err) => {
                metrics
                    .exchange_failures
                    .with_label_values(&[label, err.reason()])
                    .inc();
                warn!(%scope_key, status = ?err.status(), error = %err, "token exchange failed");
                Err(err)
            }
        }
    }
}

fn store_grant(entry: &mut CacheEntry, issued: &TokenGrant, scope_string: &str) {
    let now = now_ms();
    entry.access_token = Some(issued.access_token.clone());
    if let Some(rotated) = &issued.refresh_token {
        entry.credentials.refresh_token = Some(rotated.clone());
    }
    // float-to-int `as` saturates; the add has to as well
    entry.expires_at = now.saturating_add((issued.expires_in_secs * 1000.0) as i64);
    entry.obtained_at = now / 1000;
    if !scope_string.is_empty() {
        entry.scope = scope_string.to_owned();
    }
}

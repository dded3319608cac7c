use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::config::types::ServiceConfig;
use crate::sources::env::StaticEnv;
use crate::sources::transport::ReqwestTransport;
use crate::store::{AuthOptions, TokenStore};

/// Build a store from configuration: reqwest transport with the configured
/// timeout, environment values from the process overlaid with `env`, global
/// defaults and every per-scope override applied.
pub async fn build_store(service_config: &ServiceConfig) -> Result<TokenStore> {
    let transport = ReqwestTransport::new(Duration::from_millis(service_config.settings.http_timeout_ms()))?;

    let mut env = StaticEnv::from_process();
    env.extend(service_config.env.clone());

    let store = TokenStore::with_parts(transport, env);
    store
        .configure(&AuthOptions {
            credentials: service_config.credentials.clone(),
            ..AuthOptions::default()
        })
        .await;
    for scope_config in &service_config.scopes {
        store.configure(&scope_config.to_options()).await;
    }

    info!(scopes = service_config.scopes.len(), "token store ready");
    Ok(store)
}

// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::Method;
use tokio::sync::Barrier;

use crate::error::AuthResult;
use crate::helpers::time::now_ms;
use crate::sources::env::StaticEnv;
use crate::sources::transport::{FormResponse, FormTransport};
use crate::store::{AuthOptions, TokenData, TokenStore};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const GMAIL_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// A recorded form submission.
#[derive(Debug, Clone)]
pub struct SubmittedForm {
    pub url: String,
    pub method: Method,
    pub fields: Vec<(String, String)>,
}

impl SubmittedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// In-memory token endpoint: counts calls, records forms, answers from a
/// script and otherwise issues `token-<n>`.
#[derive(Default)]
pub struct FakeTransport {
    calls: AtomicUsize,
    forms: Mutex<Vec<SubmittedForm>>,
    script: Mutex<VecDeque<AuthResult<FormResponse>>>,
    delay: Duration,
    barrier: Option<Arc<Barrier>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call waits until `barrier` is full before answering.
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Queue the answer of the next unanswered call.
    pub fn respond(self, response: AuthResult<FormResponse>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(Ok(FormResponse::new(status, body.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn forms(&self) -> Vec<SubmittedForm> {
        self.forms.lock().unwrap().clone()
    }
}

impl FormTransport for FakeTransport {
    async fn submit_form(&self, url: &str, method: Method, fields: &[(&str, &str)]) -> AuthResult<FormResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.forms.lock().unwrap().push(SubmittedForm {
            url: url.to_owned(),
            method,
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(FormResponse::new(
                200,
                json!({"access_token": format!("token-{n}"), "expires_in": 3600}).to_string(),
            ))
        })
    }
}

/// Store over `transport` with an empty environment.
pub fn store_with(transport: FakeTransport) -> TokenStore<FakeTransport> {
    TokenStore::with_parts(transport, StaticEnv::new())
}

/// Store whose global defaults carry complete credentials.
pub async fn configured_store(transport: FakeTransport) -> TokenStore<FakeTransport> {
    let store = store_with(transport);
    store.configure(&default_credentials()).await;
    store
}

pub fn default_credentials() -> AuthOptions {
    AuthOptions::default()
        .with_client_id(CLIENT_ID)
        .with_client_secret(CLIENT_SECRET)
        .with_refresh_token(REFRESH_TOKEN)
}

/// Token data for `scope` expiring `ttl_ms` from now.
pub fn cached_token(scope: &str, token: &str, ttl_ms: i64) -> TokenData {
    TokenData {
        access_token: Some(token.to_owned()),
        expires_at: Some(now_ms() + ttl_ms),
        scope: Some(scope.into()),
        ..TokenData::default()
    }
}

pub fn build_reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

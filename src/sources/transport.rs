use std::future::Future;
use std::time::Duration;

use http::Method;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::utils::constants::DEFAULT_HTTP_TIMEOUT_MS;

/// What came back from a form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormResponse {
    pub status: u16,
    /// Body decoded as JSON, when it was JSON.
    pub json: Option<Value>,
    pub raw: String,
}

impl FormResponse {
    pub fn new(status: u16, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let json = serde_json::from_str(&raw).ok();
        Self { status, json, raw }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a form-encoded request and hands back status and body.
///
/// Errors are reserved for transport failures; any HTTP status is a response.
pub trait FormTransport: Send + Sync + 'static {
    fn submit_form(
        &self,
        url: &str,
        method: Method,
        fields: &[(&str, &str)],
    ) -> impl Future<Output = AuthResult<FormResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> AuthResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(transport_error)?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Client::builder()
            .timeout(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS))
            .build()
            .map(Self::with_client)
            .unwrap_or_else(|_| Self::with_client(Client::new()))
    }
}

impl FormTransport for ReqwestTransport {
    async fn submit_form(&self, url: &str, method: Method, fields: &[(&str, &str)]) -> AuthResult<FormResponse> {
        debug!(%url, %method, "submitting form");
        let response = self
            .client
            .request(method, url)
            .form(fields)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let raw = response.text().await.map_err(transport_error)?;
        Ok(FormResponse::new(status, raw))
    }
}

fn transport_error(err: reqwest::Error) -> AuthError {
    AuthError::Exchange {
        status: err.status().map(|s| s.as_u16()),
        body: None,
        message: format!("token request failed: {err}"),
    }
}

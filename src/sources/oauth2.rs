use http::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::sources::transport::{FormResponse, FormTransport};
use crate::utils::constants::{DEFAULT_EXPIRES_IN_SECS, GRANT_TYPE_REFRESH_TOKEN};

const EXCHANGE_FAILED_MSG: &str = "token exchange failed";

/// Inputs of a `grant_type=refresh_token` exchange.
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Tokens issued by a successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in_secs: f64,
    /// Present when the provider rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl RefreshGrant {
    pub fn form_fields(&self) -> [(&str, &str); 4] {
        [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", GRANT_TYPE_REFRESH_TOKEN),
        ]
    }

    /// POST the grant to the token endpoint and decode the answer.
    pub async fn exchange<T: FormTransport>(&self, transport: &T) -> AuthResult<TokenGrant> {
        let response = transport
            .submit_form(&self.token_endpoint, Method::POST, &self.form_fields())
            .await?;
        debug!(status = response.status, endpoint = %self.token_endpoint, "token endpoint answered");
        parse_token_response(&response)
    }
}

/// Decode a token endpoint answer.
///
/// Fails unless the status is 2xx and the body carries a non-empty
/// `access_token`; the upstream `error_description` / `error` becomes the
/// message.
pub fn parse_token_response(response: &FormResponse) -> AuthResult<TokenGrant> {
    let body = response
        .json
        .clone()
        .or_else(|| serde_json::from_str::<Value>(&response.raw).ok());

    let access_token = body
        .as_ref()
        .and_then(|b| b.get("access_token"))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty());

    match access_token {
        Some(access_token) if response.is_success() => {
            let body = body.as_ref();
            Ok(TokenGrant {
                access_token: access_token.to_owned(),
                expires_in_secs: body
                    .and_then(|b| b.get("expires_in"))
                    .and_then(Value::as_f64)
                    .unwrap_or(DEFAULT_EXPIRES_IN_SECS),
                refresh_token: body
                    .and_then(|b| b.get("refresh_token"))
                    .and_then(Value::as_str)
                    .filter(|token| !token.is_empty())
                    .map(str::to_owned),
            })
        }
        _ => Err(AuthError::Exchange {
            status: Some(response.status),
            message: upstream_message(body.as_ref()),
            body,
        }),
    }
}

fn upstream_message(body: Option<&Value>) -> String {
    body.and_then(|b| {
        ["error_description", "error"]
            .iter()
            .filter_map(|field| b.get(*field).and_then(Value::as_str))
            .find(|msg| !msg.is_empty())
    })
    .unwrap_or(EXCHANGE_FAILED_MSG)
    .to_owned()
}

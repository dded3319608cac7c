use crate::cache::credentials::{CredentialDefaults, EntryCredentials};
use crate::helpers::time::now_ms;
use crate::utils::constants::DEFAULT_SCOPE_KEY;

/// Per scope-key record: the credentials used to refresh and the cached token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub credentials: EntryCredentials,
    pub access_token: Option<String>,
    /// UNIX timestamp, milliseconds
    pub expires_at: i64,
    /// UNIX timestamp, seconds
    pub obtained_at: i64,
    /// Canonical scope string ("" for the default key).
    pub scope: String,
}

impl CacheEntry {
    pub fn new(scope_key: &str, defaults: &CredentialDefaults) -> Self {
        Self {
            credentials: EntryCredentials::seeded_from(defaults),
            access_token: None,
            expires_at: 0,
            obtained_at: 0,
            scope: if scope_key == DEFAULT_SCOPE_KEY {
                String::new()
            } else {
                scope_key.to_owned()
            },
        }
    }

    /// Cached token usable at `now_ms`, keeping `skew_ms` of margin before expiry.
    pub fn valid_token(&self, now_ms: i64, skew_ms: i64) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .filter(|_| now_ms < self.expires_at.saturating_sub(skew_ms))
    }

    /// Reset token state; credentials stay.
    pub fn clear_tokens(&mut self) {
        self.access_token = None;
        self.expires_at = 0;
        self.obtained_at = 0;
    }

    /// Whole seconds left before nominal expiry, never negative.
    pub fn expires_in_secs(&self) -> i64 {
        if self.expires_at == 0 {
            return 0;
        }
        (self.expires_at.saturating_sub(now_ms()) / 1000).max(0)
    }
}

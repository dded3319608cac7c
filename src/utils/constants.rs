//! Shared constants and invariants

pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

/// Cache key used when a scope set normalizes to nothing.
pub const DEFAULT_SCOPE_KEY: &str = "default";

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: f64 = 3600.0;

/// Tokens are treated as expired this long before their nominal expiry...
pub const SAFETY_SKEW_MS: i64 = 60_000;
/// ...plus up to this much random jitter, drawn per check.
pub const SKEW_JITTER_MS: i64 = 5_000;

pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
pub const BEARER_HEADER_PREFIX: &str = "Authorization: Bearer ";

// Environment / configuration store keys
pub const ENV_CLIENT_ID: &str = "gauth.clientId";
pub const ENV_CLIENT_SECRET: &str = "gauth.clientSecret";
pub const ENV_REFRESH_TOKEN: &str = "gauth.refreshToken";
pub const ENV_TOKEN_ENDPOINT: &str = "gauth.tokenEndpoint";
pub const ENV_GOOGLE_SCOPE: &str = "google.scope";
pub const ENV_GAUTH_SCOPE: &str = "gauth.scope";

pub const ENV_KEYS: &[&str] = &[
    ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
    ENV_REFRESH_TOKEN,
    ENV_TOKEN_ENDPOINT,
    ENV_GOOGLE_SCOPE,
    ENV_GAUTH_SCOPE,
];

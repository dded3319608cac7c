use chrono::Utc;
use rand::Rng;
use tokio::time::Instant;

use crate::utils::constants::{SAFETY_SKEW_MS, SKEW_JITTER_MS};

/// Safety margin subtracted from a token's expiry, freshly jittered on every
/// call so concurrent holders do not all refresh on the same millisecond.
pub fn skew_ms() -> i64 {
    SAFETY_SKEW_MS + rand::rng().random_range(0..SKEW_JITTER_MS)
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

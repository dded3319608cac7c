use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::utils::constants::DEFAULT_SCOPE_KEY;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Exchange metrics
    pub exchange_requests: IntCounterVec,
    pub exchange_failures: IntCounterVec,
    pub exchange_duration: HistogramVec,

    // Cache metrics
    pub cache_hits: IntCounterVec,
    pub cache_misses: IntCounterVec,
    /// callers that joined an exchange already in flight
    pub coalesced_waits: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("gauth".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Exchange
            exchange_requests: IntCounterVec::new(Opts::new("token_exchange_requests_total", "Token exchange attempts, default scope key versus scoped"),&["scope"],).unwrap(),
            exchange_failures: IntCounterVec::new(Opts::new("token_exchange_failures_total", "Token exchange failures by reason"),&["scope", "reason"],).unwrap(),
            exchange_duration: HistogramVec::new(HistogramOpts::new("token_exchange_duration_seconds", "Token exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["scope"],).unwrap(),

            // Cache
            cache_hits: IntCounterVec::new(Opts::new("cache_hits_total", "Requests served from cache"),&["scope"],).unwrap(),
            cache_misses: IntCounterVec::new(Opts::new("cache_misses_total", "Requests that needed a refresh"),&["scope"],).unwrap(),
            coalesced_waits: IntCounterVec::new(Opts::new("coalesced_waits_total", "Requests that joined an in-flight exchange"),&["scope"],).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.exchange_requests.clone())).unwrap();
        reg.register(Box::new(metrics.exchange_failures.clone())).unwrap();
        reg.register(Box::new(metrics.exchange_duration.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.cache_misses.clone())).unwrap();
        reg.register(Box::new(metrics.coalesced_waits.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition of the registry.
    pub fn encode(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Value of the `scope` label. Scope keys are caller-controlled, so metrics
/// only tell the default key apart from everything else.
pub fn scope_label(scope_key: &str) -> &'static str {
    if scope_key == DEFAULT_SCOPE_KEY {
        DEFAULT_SCOPE_KEY
    } else {
        "scoped"
    }
}

pub mod circuit_breaker;
pub mod frankfurter;
pub mod http;
pub mod retry;
pub mod wire;

use crate::core::cache::CachedPayload;
use crate::core::config::AppConfig;
use crate::core::fingerprint::Fingerprint;
use crate::core::{CurrencyPolicy, ProviderRegistry, RateError};
use crate::store::MemoryCache;
use frankfurter::FrankfurterProvider;
use http::UpstreamClient;
use std::sync::Arc;
use tracing::debug;

/// Wires every built-in provider from `config` around one shared cache.
pub fn build_registry(config: &AppConfig) -> Result<ProviderRegistry, RateError> {
    let cache: Arc<MemoryCache<Fingerprint, CachedPayload>> = Arc::new(MemoryCache::new());

    let frankfurter = &config.providers.frankfurter;
    let client = UpstreamClient::new(
        &frankfurter.base_url,
        frankfurter.timeout(),
        frankfurter.retry,
        frankfurter.circuit_breaker,
    )?;

    let policy = CurrencyPolicy::default();
    debug!(excluded = ?policy.excluded().collect::<Vec<_>>(), "Currency policy");

    let mut registry = ProviderRegistry::new(&config.default_provider);
    registry.register(Arc::new(FrankfurterProvider::new(
        Arc::new(client),
        cache,
        policy,
        config.cache.ttl(),
    )));
    Ok(registry)
}

use super::rates::{CurrencyCatalog, RateSet, Rates};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;

/// Key-value store with per-entry expiry.
///
/// Implementations must tolerate concurrent `get`/`put` on any keys. Values
/// are returned as clones; callers never see the stored instance.
#[async_trait]
pub trait Cache<K, V>: Send + Sync {
    async fn get(&self, key: &K) -> Option<V>;
    async fn put(&self, key: K, value: V, ttl: Duration);
}

/// Unfiltered upstream daily series, as cached.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    pub base_currency: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rates: BTreeMap<NaiveDate, Rates>,
}

/// Whatever the upstream returned for a fingerprint, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    Rates(RateSet),
    Series(RateSeries),
    Currencies(CurrencyCatalog),
}

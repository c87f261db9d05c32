use super::http::UpstreamClient;
use super::wire::{CurrenciesPayload, RatesPayload, SeriesPayload};
use crate::core::cache::{Cache, CachedPayload, RateSeries};
use crate::core::fingerprint::{DATE_FORMAT, Fingerprint};
use crate::core::pagination::{PageRequest, paginate};
use crate::core::provider::{RateProvider, Result};
use crate::core::{
    CurrencyCatalog, CurrencyPolicy, HistoricalRateSet, RateError, RateSet, TimeSeries,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const PROVIDER_NAME: &str = "Frankfurter";

pub type PayloadCache = dyn Cache<Fingerprint, CachedPayload>;

/// Rate provider backed by the Frankfurter API.
///
/// The cache always holds unfiltered upstream data; the currency policy is
/// applied on the way out.
pub struct FrankfurterProvider {
    client: Arc<UpstreamClient>,
    cache: Arc<PayloadCache>,
    policy: CurrencyPolicy,
    ttl: Duration,
}

impl FrankfurterProvider {
    pub fn new(
        client: Arc<UpstreamClient>,
        cache: Arc<PayloadCache>,
        policy: CurrencyPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            policy,
            ttl,
        }
    }

    fn query(base_currency: &str, amount: Decimal) -> String {
        format!("from={}&amount={}", base_currency.to_uppercase(), amount.normalize())
    }

    async fn cached_rates(&self, key: Fingerprint, path: String) -> Result<RateSet> {
        if let Some(CachedPayload::Rates(cached)) = self.cache.get(&key).await {
            return Ok(cached);
        }
        let payload: RatesPayload = self.client.fetch(&path).await?;
        let rates = RateSet::try_from(payload)?;
        self.cache
            .put(key, CachedPayload::Rates(rates.clone()), self.ttl)
            .await;
        Ok(rates)
    }

    async fn cached_series(&self, key: Fingerprint, path: String) -> Result<RateSeries> {
        if let Some(CachedPayload::Series(cached)) = self.cache.get(&key).await {
            return Ok(cached);
        }
        let payload: SeriesPayload = self.client.fetch(&path).await?;
        let series = RateSeries::try_from(payload)?;
        self.cache
            .put(key, CachedPayload::Series(series.clone()), self.ttl)
            .await;
        Ok(series)
    }
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(name = "FrankfurterLatest", skip(self))]
    async fn get_latest(&self, base_currency: &str, amount: Decimal) -> Result<RateSet> {
        let key = Fingerprint::latest(base_currency, amount);
        let path = format!("latest?{}", Self::query(base_currency, amount));
        let cached = self.cached_rates(key, path).await?;

        Ok(RateSet {
            base_currency: base_currency.to_uppercase(),
            amount,
            as_of: cached.as_of,
            rates: self.policy.exclude(&cached.rates),
        })
    }

    #[instrument(name = "FrankfurterHistorical", skip(self))]
    async fn get_historical(
        &self,
        date: NaiveDate,
        base_currency: &str,
        amount: Decimal,
        page: PageRequest,
    ) -> Result<HistoricalRateSet> {
        if date > Utc::now().date_naive() {
            return Err(RateError::invalid("Date must be in the past."));
        }

        let key = Fingerprint::historical(date, base_currency, amount, page);
        let path = format!(
            "{}?{}",
            date.format(DATE_FORMAT),
            Self::query(base_currency, amount)
        );
        let cached = self.cached_rates(key, path).await?;

        let allowed = self.policy.exclude(&cached.rates);
        let (rates, total_count) = paginate(&allowed, page);
        debug!(total_count, returned = rates.len(), "Paginated historical rates");

        Ok(HistoricalRateSet {
            page: page.info(total_count, rates.len()),
            rate_set: RateSet {
                base_currency: base_currency.to_uppercase(),
                amount,
                as_of: date,
                rates,
            },
        })
    }

    #[instrument(name = "FrankfurterTimeSeries", skip(self))]
    async fn get_time_series(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        base_currency: &str,
        amount: Decimal,
        page: PageRequest,
    ) -> Result<TimeSeries> {
        if start_date > end_date {
            return Err(RateError::invalid(
                "Start date must be less than or equal to end date.",
            ));
        }

        let key = Fingerprint::time_series(start_date, end_date, base_currency, amount, page);
        let path = format!(
            "{}..{}?{}",
            start_date.format(DATE_FORMAT),
            end_date.format(DATE_FORMAT),
            Self::query(base_currency, amount)
        );
        let cached = self.cached_series(key, path).await?;

        let (days, total_count) = paginate(&cached.rates, page);
        let rates = days
            .into_iter()
            .map(|(day, rates)| (day, self.policy.exclude(&rates)))
            .collect::<std::collections::BTreeMap<_, _>>();

        Ok(TimeSeries {
            base_currency: base_currency.to_uppercase(),
            amount,
            start_date,
            end_date,
            page: page.info(total_count, rates.len()),
            rates,
        })
    }

    #[instrument(name = "FrankfurterCurrencies", skip(self))]
    async fn get_currencies(&self) -> Result<CurrencyCatalog> {
        let key = Fingerprint::currencies();
        if let Some(CachedPayload::Currencies(cached)) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let payload: CurrenciesPayload = self.client.fetch("currencies").await?;
        if payload.is_empty() {
            return Err(RateError::decode("Upstream returned an empty currency list"));
        }
        let catalog = CurrencyCatalog::new(payload);
        self.cache
            .put(key, CachedPayload::Currencies(catalog.clone()), self.ttl)
            .await;
        Ok(catalog)
    }

    async fn is_base_supported(&self, code: &str) -> Result<bool> {
        let catalog = self.get_currencies().await?;
        Ok(self.policy.is_supported(code, &catalog))
    }
}

//! Rate provider abstraction

use super::error::RateError;
use super::pagination::PageRequest;
use super::rates::{CurrencyCatalog, HistoricalRateSet, RateSet, TimeSeries};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub type Result<T, E = RateError> = std::result::Result<T, E>;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable registry name of this provider.
    fn name(&self) -> &str;

    async fn get_latest(&self, base_currency: &str, amount: Decimal) -> Result<RateSet>;

    /// Rates on `date`. Fails with `InvalidRequest` for dates after today.
    async fn get_historical(
        &self,
        date: NaiveDate,
        base_currency: &str,
        amount: Decimal,
        page: PageRequest,
    ) -> Result<HistoricalRateSet>;

    /// Daily rates over `start..=end`, paginated by date.
    async fn get_time_series(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        base_currency: &str,
        amount: Decimal,
        page: PageRequest,
    ) -> Result<TimeSeries>;

    async fn get_currencies(&self) -> Result<CurrencyCatalog>;

    async fn is_base_supported(&self, code: &str) -> Result<bool>;
}

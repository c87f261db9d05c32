//! Rate result types handed back to callers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency code to converted amount, ordered by code.
pub type Rates = BTreeMap<String, Decimal>;

/// A single point-in-time conversion table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    #[serde(rename = "base")]
    pub base_currency: String,
    pub amount: Decimal,
    #[serde(rename = "date")]
    pub as_of: NaiveDate,
    pub rates: Rates,
}

/// Pagination metadata attached to paged results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_count: usize,
    pub returned_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRateSet {
    #[serde(flatten)]
    pub rate_set: RateSet,
    #[serde(flatten)]
    pub page: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(rename = "base")]
    pub base_currency: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rates: BTreeMap<NaiveDate, Rates>,
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Every currency the upstream recognises, code to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCatalog(BTreeMap<String, String>);

impl CurrencyCatalog {
    pub fn new(currencies: BTreeMap<String, String>) -> Self {
        Self(currencies)
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(&code.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl FromIterator<(String, String)> for CurrencyCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

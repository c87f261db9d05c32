//! Payload shapes shared by Frankfurter-compatible upstreams.

use crate::core::cache::RateSeries;
use crate::core::fingerprint::DATE_FORMAT;
use crate::core::{RateError, RateSet, Rates};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use std::collections::BTreeMap;

/// A calendar date that only decodes from a strict `yyyy-MM-dd` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WireDate(pub NaiveDate);

impl WireDate {
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shaped {
            return None;
        }
        NaiveDate::parse_from_str(text, DATE_FORMAT).ok().map(WireDate)
    }
}

impl<'de> Deserialize<'de> for WireDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        WireDate::parse(&text).ok_or_else(|| {
            de::Error::custom(format!("invalid date '{text}', expected yyyy-MM-dd"))
        })
    }
}

/// Body of `latest` and `{date}` responses.
#[derive(Debug, Deserialize)]
pub struct RatesPayload {
    pub amount: Decimal,
    pub base: String,
    pub date: WireDate,
    pub rates: Option<Rates>,
}

impl TryFrom<RatesPayload> for RateSet {
    type Error = RateError;

    fn try_from(payload: RatesPayload) -> Result<Self, Self::Error> {
        let rates = non_empty(payload.rates, "rates")?;
        Ok(RateSet {
            base_currency: payload.base,
            amount: payload.amount,
            as_of: payload.date.0,
            rates,
        })
    }
}

/// Body of `{start}..{end}` responses.
#[derive(Debug, Deserialize)]
pub struct SeriesPayload {
    pub amount: Decimal,
    pub base: String,
    pub start_date: WireDate,
    pub end_date: WireDate,
    pub rates: Option<BTreeMap<WireDate, Rates>>,
}

impl TryFrom<SeriesPayload> for RateSeries {
    type Error = RateError;

    fn try_from(payload: SeriesPayload) -> Result<Self, Self::Error> {
        let rates = non_empty(payload.rates, "rates")?;
        Ok(RateSeries {
            base_currency: payload.base,
            amount: payload.amount,
            start_date: payload.start_date.0,
            end_date: payload.end_date.0,
            rates: rates.into_iter().map(|(day, rates)| (day.0, rates)).collect(),
        })
    }
}

/// `currencies` is a bare code → name object.
pub type CurrenciesPayload = BTreeMap<String, String>;

fn non_empty<K, V>(map: Option<BTreeMap<K, V>>, field: &str) -> Result<BTreeMap<K, V>, RateError> {
    match map {
        Some(map) if !map.is_empty() => Ok(map),
        Some(_) => Err(RateError::decode(format!("Upstream returned empty {field}"))),
        None => Err(RateError::decode(format!("Upstream response is missing {field}"))),
    }
}

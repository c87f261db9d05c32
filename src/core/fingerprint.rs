//! Deterministic cache keys for rate requests.

use super::pagination::PageRequest;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display};

/// Format used for dates both in fingerprints and on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The logical request a cached value answers.
///
/// Fields are normalized on construction: currency codes are uppercased and
/// amounts stripped of trailing zeros, so `("eur", 1.0)` and `("EUR", 1)`
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Latest {
        base: String,
        amount: Decimal,
    },
    Historical {
        date: NaiveDate,
        base: String,
        amount: Decimal,
        page: PageRequest,
    },
    TimeSeries {
        start: NaiveDate,
        end: NaiveDate,
        base: String,
        amount: Decimal,
        page: PageRequest,
    },
    Currencies,
}

impl Fingerprint {
    pub fn latest(base: &str, amount: Decimal) -> Self {
        Fingerprint::Latest {
            base: base.to_uppercase(),
            amount: amount.normalize(),
        }
    }

    pub fn historical(date: NaiveDate, base: &str, amount: Decimal, page: PageRequest) -> Self {
        Fingerprint::Historical {
            date,
            base: base.to_uppercase(),
            amount: amount.normalize(),
            page,
        }
    }

    pub fn time_series(
        start: NaiveDate,
        end: NaiveDate,
        base: &str,
        amount: Decimal,
        page: PageRequest,
    ) -> Self {
        Fingerprint::TimeSeries {
            start,
            end,
            base: base.to_uppercase(),
            amount: amount.normalize(),
            page,
        }
    }

    pub fn currencies() -> Self {
        Fingerprint::Currencies
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Latest { base, amount } => write!(f, "latest_{base}_{amount}"),
            Fingerprint::Historical {
                date,
                base,
                amount,
                page,
            } => write!(
                f,
                "historical_{}_{base}_{amount}_{}_{}",
                date.format(DATE_FORMAT),
                page.page(),
                page.page_size()
            ),
            Fingerprint::TimeSeries {
                start,
                end,
                base,
                amount,
                page,
            } => write!(
                f,
                "timeseries_{}_{}_{base}_{amount}_{}_{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT),
                page.page(),
                page.page_size()
            ),
            Fingerprint::Currencies => write!(f, "currencies"),
        }
    }
}

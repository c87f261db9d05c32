//! Logical requests from outer surfaces and their dispatch through the registry.

use super::error::RateError;
use super::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageRequest};
use super::provider::{RateProvider, Result};
use super::rates::{CurrencyCatalog, HistoricalRateSet, RateSet, TimeSeries};
use super::registry::ProviderRegistry;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Latest,
    Historical,
    TimeSeries,
    Currencies,
    Supported,
}

/// Unvalidated request as delivered by a caller. Missing fields take the
/// defaults of the public API: `EUR`, amount 1, page 1 of 20.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRequest {
    pub operation: Operation,
    pub provider_name: Option<String>,
    pub base_currency: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl RateRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            provider_name: None,
            base_currency: None,
            amount: None,
            date: None,
            start_date: None,
            end_date: None,
            page: None,
            page_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RateResponse {
    Latest(RateSet),
    Historical(HistoricalRateSet),
    TimeSeries(TimeSeries),
    Currencies(CurrencyCatalog),
    Supported(bool),
}

/// A request that passed every check that needs no I/O.
#[derive(Debug, Clone, PartialEq)]
enum ValidRequest {
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
    Supported {
        code: String,
    },
}

fn validate_currency(code: Option<&str>) -> Result<String> {
    let code = code.unwrap_or(DEFAULT_BASE_CURRENCY).trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RateError::invalid(format!(
            "Currency code '{code}' must be three letters"
        )));
    }
    Ok(code.to_uppercase())
}

/// Smallest amount accepted for conversion.
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

fn validate_amount(amount: Option<Decimal>) -> Result<Decimal> {
    let amount = amount.unwrap_or(Decimal::ONE);
    if amount < MIN_AMOUNT {
        return Err(RateError::invalid("Amount should be greater than zero"));
    }
    Ok(amount)
}

fn required(date: Option<NaiveDate>, field: &str) -> Result<NaiveDate> {
    date.ok_or_else(|| RateError::invalid(format!("{field} is required")))
}

impl RateRequest {
    fn page(&self) -> Result<PageRequest> {
        PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    fn validate(&self, today: NaiveDate) -> Result<ValidRequest> {
        let base = self.base_currency.as_deref();
        Ok(match self.operation {
            Operation::Latest => ValidRequest::Latest {
                base: validate_currency(base)?,
                amount: validate_amount(self.amount)?,
            },
            Operation::Historical => {
                let date = required(self.date, "date")?;
                if date > today {
                    return Err(RateError::invalid("Date must be in the past."));
                }
                ValidRequest::Historical {
                    date,
                    base: validate_currency(base)?,
                    amount: validate_amount(self.amount)?,
                    page: self.page()?,
                }
            }
            Operation::TimeSeries => {
                let start = required(self.start_date, "start date")?;
                let end = required(self.end_date, "end date")?;
                if start > end {
                    return Err(RateError::invalid(
                        "Start date must be less than or equal to end date.",
                    ));
                }
                ValidRequest::TimeSeries {
                    start,
                    end,
                    base: validate_currency(base)?,
                    amount: validate_amount(self.amount)?,
                    page: self.page()?,
                }
            }
            Operation::Currencies => ValidRequest::Currencies,
            Operation::Supported => ValidRequest::Supported {
                code: validate_currency(base)?,
            },
        })
    }
}

async fn ensure_supported(provider: &dyn RateProvider, base: &str) -> Result<()> {
    if provider.is_base_supported(base).await? {
        Ok(())
    } else {
        Err(RateError::UnsupportedCurrency(base.to_string()))
    }
}

/// Validates `request`, resolves its provider and runs the operation.
///
/// Rate operations are refused with `UnsupportedCurrency` before any rate
/// fetch when the provider does not support the base currency.
#[instrument(skip(registry))]
pub async fn execute(registry: &ProviderRegistry, request: &RateRequest) -> Result<RateResponse> {
    let valid = request.validate(Utc::now().date_naive())?;
    let provider = registry.resolve(request.provider_name.as_deref())?;
    debug!(provider = provider.name(), "Dispatching rate request");

    Ok(match valid {
        ValidRequest::Latest { base, amount } => {
            ensure_supported(provider.as_ref(), &base).await?;
            RateResponse::Latest(provider.get_latest(&base, amount).await?)
        }
        ValidRequest::Historical {
            date,
            base,
            amount,
            page,
        } => {
            ensure_supported(provider.as_ref(), &base).await?;
            RateResponse::Historical(provider.get_historical(date, &base, amount, page).await?)
        }
        ValidRequest::TimeSeries {
            start,
            end,
            base,
            amount,
            page,
        } => {
            ensure_supported(provider.as_ref(), &base).await?;
            RateResponse::TimeSeries(
                provider
                    .get_time_series(start, end, &base, amount, page)
                    .await?,
            )
        }
        ValidRequest::Currencies => RateResponse::Currencies(provider.get_currencies().await?),
        ValidRequest::Supported { code } => {
            RateResponse::Supported(provider.is_base_supported(&code).await?)
        }
    })
}

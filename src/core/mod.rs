//! Core rate pipeline abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod log;
pub mod pagination;
pub mod policy;
pub mod provider;
pub mod rates;
pub mod registry;
pub mod request;

// Re-export main types for cleaner imports
pub use error::{FailureKind, RateError};
pub use pagination::PageRequest;
pub use policy::CurrencyPolicy;
pub use provider::RateProvider;
pub use rates::{CurrencyCatalog, HistoricalRateSet, PageInfo, RateSet, Rates, TimeSeries};
pub use registry::ProviderRegistry;
pub use request::{Operation, RateRequest, RateResponse};

//! Currency exclusion policy applied to every rate mapping leaving the core.

use super::rates::{CurrencyCatalog, Rates};
use std::collections::BTreeSet;

/// Codes that are never offered as conversion targets or bases.
pub const DEFAULT_EXCLUDED_CURRENCIES: [&str; 4] = ["TRY", "PLN", "THB", "MXN"];

/// An immutable denylist of currency codes, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPolicy {
    excluded: BTreeSet<String>,
}

impl CurrencyPolicy {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|code| code.as_ref().to_uppercase())
                .collect(),
        }
    }

    pub fn is_excluded(&self, code: &str) -> bool {
        self.excluded.contains(&code.to_uppercase())
    }

    /// Returns `rates` without the denylisted entries.
    pub fn exclude(&self, rates: &Rates) -> Rates {
        rates
            .iter()
            .filter(|(code, _)| !self.is_excluded(code))
            .map(|(code, rate)| (code.clone(), *rate))
            .collect()
    }

    /// True iff `code` is known to the catalog and not denylisted.
    pub fn is_supported(&self, code: &str, catalog: &CurrencyCatalog) -> bool {
        catalog.contains(code) && !self.is_excluded(code)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

impl Default for CurrencyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_CURRENCIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_rates() -> Rates {
        Rates::from([
            ("USD".to_string(), dec!(1.1)),
            ("TRY".to_string(), dec!(4.0)),
            ("pln".to_string(), dec!(4.3)),
            ("GBP".to_string(), dec!(0.85)),
        ])
    }

    #[test]
    fn test_exclude_removes_denylisted_codes() {
        let policy = CurrencyPolicy::default();
        let filtered = policy.exclude(&sample_rates());

        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains_key("USD"));
        assert!(filtered.contains_key("GBP"));
        assert!(!filtered.contains_key("TRY"));
        assert!(!filtered.contains_key("pln"));
    }

    #[test]
    fn test_exclude_is_idempotent() {
        let policy = CurrencyPolicy::default();
        let once = policy.exclude(&sample_rates());
        let twice = policy.exclude(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_denylist_wins_over_catalog() {
        let policy = CurrencyPolicy::default();
        let catalog: CurrencyCatalog = [
            ("TRY".to_string(), "Turkish Lira".to_string()),
            ("EUR".to_string(), "Euro".to_string()),
        ]
        .into_iter()
        .collect();

        assert!(!policy.is_supported("try", &catalog));
        assert!(!policy.is_supported("TRY", &catalog));
        assert!(policy.is_supported("eur", &catalog));
        assert!(!policy.is_supported("USD", &catalog));
    }

    #[test]
    fn test_custom_policy() {
        let policy = CurrencyPolicy::new(["usd"]);
        let filtered = policy.exclude(&sample_rates());

        assert!(!filtered.contains_key("USD"));
        assert!(filtered.contains_key("TRY"));
        assert_eq!(policy.excluded().collect::<Vec<_>>(), vec!["USD"]);
    }
}

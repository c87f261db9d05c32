use super::error::RateError;
use super::provider::RateProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the provider used when a request does not name one.
pub const DEFAULT_PROVIDER: &str = "Frankfurter";

/// Resolves provider names to shared provider instances.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn RateProvider>>,
    default_provider: String,
}

impl ProviderRegistry {
    pub fn new(default_provider: &str) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.to_string(),
        }
    }

    /// Adds a provider under its own name, replacing any earlier entry.
    pub fn register(&mut self, provider: Arc<dyn RateProvider>) -> &mut Self {
        debug!(provider = provider.name(), "Registering rate provider");
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    /// Exact, case-sensitive lookup. `None` and `""` select the default provider.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn RateProvider>, RateError> {
        let name = match name {
            None | Some("") => self.default_provider.as_str(),
            Some(name) => name,
        };
        self.providers.get(name).cloned().ok_or_else(|| {
            warn!(
                requested = name,
                known = ?self.names().collect::<Vec<_>>(),
                "Unknown rate provider"
            );
            RateError::Configuration(name.to_string())
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER)
    }
}

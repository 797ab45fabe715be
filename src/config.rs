//! Configuration for afftrack
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for an SDK instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Tracking Configuration
    // -------------------------------------------------------------------------
    /// Base URL of the tracking domain (scheme included)
    pub tracking_domain: String,

    // -------------------------------------------------------------------------
    // TTL Configuration
    // -------------------------------------------------------------------------
    /// TTL applied by `TieredStore::store_default` (days)
    pub default_ttl_days: u32,

    /// TTL for correlation lists and the witness flag (days)
    pub ledger_ttl_days: u32,

    // -------------------------------------------------------------------------
    // Truncation Configuration
    // -------------------------------------------------------------------------
    /// Max characters written into a single cookie value
    pub cookie_value_limit: usize,

    /// Max characters of a pipe-delimited transaction list
    pub transaction_value_limit: usize,

    /// Characters kept from the start of a value when it is truncated
    pub truncation_prefix: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking_domain: "https://tracking.example.com".to_string(),
            default_ttl_days: 30,
            ledger_ttl_days: 365,
            cookie_value_limit: 1650,
            transaction_value_limit: 332,
            truncation_prefix: 33,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the tracking domain
    pub fn tracking_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.tracking_domain = domain.into();
        self
    }

    /// Set the default store TTL (in days)
    pub fn default_ttl_days(mut self, days: u32) -> Self {
        self.config.default_ttl_days = days;
        self
    }

    /// Set the ledger TTL (in days)
    pub fn ledger_ttl_days(mut self, days: u32) -> Self {
        self.config.ledger_ttl_days = days;
        self
    }

    /// Set the cookie value ceiling (in characters)
    pub fn cookie_value_limit(mut self, limit: usize) -> Self {
        self.config.cookie_value_limit = limit;
        self
    }

    /// Set the transaction list ceiling (in characters)
    pub fn transaction_value_limit(mut self, limit: usize) -> Self {
        self.config.transaction_value_limit = limit;
        self
    }

    /// Set the number of leading characters kept on truncation
    pub fn truncation_prefix(mut self, prefix: usize) -> Self {
        self.config.truncation_prefix = prefix;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

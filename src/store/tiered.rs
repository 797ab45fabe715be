//! Tiered Store
//!
//! Fan-out on write, first hit on read.

use std::sync::Arc;

use crate::backend::{
    format_set_cookie, is_cookie_safe, lookup_cookie, BackendKind, CookieJar, StorageArea,
    StorageBackends,
};
use crate::clock::{deadline, SharedClock};
use crate::config::Config;
use crate::error::{AttributionError, Result};
use crate::probe::{probe, BackendAvailability};

use super::{truncate_middle, StorageItem};

/// Result of a `store` call
///
/// Never an error: a write that no backend accepted is reported here as a
/// failed outcome with one diagnostic per backend.
#[derive(Debug, Default)]
pub struct StoreOutcome {
    accepted: Vec<BackendKind>,
    failures: Vec<AttributionError>,
}

impl StoreOutcome {
    /// True iff at least one backend accepted the write
    pub fn is_success(&self) -> bool {
        !self.accepted.is_empty()
    }

    /// Backends that accepted the write, in write order
    pub fn accepted(&self) -> &[BackendKind] {
        &self.accepted
    }

    /// Per-backend failures, plus `AllBackendsFailed` when nothing was written
    pub fn failures(&self) -> &[AttributionError] {
        &self.failures
    }
}

/// Key/value store over the cookie, local and session backends
///
/// Availability is probed once at construction and never re-probed. A
/// backend that fails a live call fails only that call.
pub struct TieredStore {
    backends: StorageBackends,
    availability: BackendAvailability,
    clock: SharedClock,
    default_ttl_days: u32,
    cookie_value_limit: usize,
    truncation_prefix: usize,
}

impl TieredStore {
    /// Probe `backends` and build a store using `config`'s limits
    pub fn new(backends: StorageBackends, clock: SharedClock, config: &Config) -> Self {
        let availability = probe(&backends);
        if availability.is_empty() {
            tracing::warn!("No storage backend available, nothing will persist");
        }

        Self {
            backends,
            availability,
            clock,
            default_ttl_days: config.default_ttl_days,
            cookie_value_limit: config.cookie_value_limit,
            truncation_prefix: config.truncation_prefix,
        }
    }

    /// Build with the default config
    pub fn with_defaults(backends: StorageBackends, clock: SharedClock) -> Self {
        Self::new(backends, clock, &Config::default())
    }

    /// Store `value` under `key` in every available backend
    ///
    /// Cookie values longer than the cookie ceiling are middle-truncated
    /// before writing; local and session get the full value. Values a raw
    /// cookie cannot carry (`;`, control characters, surrounding whitespace)
    /// fail the cookie write and are left to local and session.
    pub fn store(&self, key: &str, value: &str, ttl_days: u32) -> StoreOutcome {
        let expires = deadline(self.clock.now_ms(), ttl_days);
        let mut outcome = StoreOutcome::default();

        for kind in self.availability.available() {
            let result = match kind {
                BackendKind::Cookie => self.write_cookie(key, value, expires),
                BackendKind::Local | BackendKind::Session => {
                    self.write_area(kind, key, value, expires)
                }
            };

            match result {
                Ok(()) => outcome.accepted.push(kind),
                Err(e) => {
                    tracing::warn!("Failed to store '{}' in {}: {}", key, kind, e);
                    outcome
                        .failures
                        .push(AttributionError::WriteFailed(kind, e.to_string()));
                }
            }
        }

        if !outcome.is_success() {
            tracing::error!("All storage methods failed for '{}'", key);
            outcome.failures.push(AttributionError::AllBackendsFailed);
        }
        outcome
    }

    /// Store with the default TTL
    pub fn store_default(&self, key: &str, value: &str) -> StoreOutcome {
        self.store(key, value, self.default_ttl_days)
    }

    /// Read `key`, empty string when absent
    ///
    /// Priority cookie → local → session; lower tiers are not consulted once
    /// a live value is found. Expired envelopes are evicted on the way.
    pub fn retrieve(&self, key: &str) -> String {
        let now = self.clock.now_ms();

        for kind in self.availability.available() {
            let hit = match kind {
                BackendKind::Cookie => self.read_cookie(key),
                BackendKind::Local | BackendKind::Session => self.read_area(kind, key, now),
            };
            if let Some(value) = hit {
                return value;
            }
        }

        String::new()
    }

    /// Delete `key` from every available backend
    pub fn remove(&self, key: &str) {
        for kind in self.availability.available() {
            let result = match kind {
                BackendKind::Cookie => self.cookie().and_then(|jar| {
                    jar.set_cookie(&format_set_cookie(key, "", 0)?)
                }),
                BackendKind::Local | BackendKind::Session => {
                    self.area(kind).and_then(|area| area.remove_item(key))
                }
            };

            if let Err(e) = result {
                tracing::warn!("Failed to remove '{}' from {}: {}", key, kind, e);
            }
        }
    }

    pub fn availability(&self) -> BackendAvailability {
        self.availability
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn cookie(&self) -> Result<&Arc<dyn CookieJar>> {
        self.backends
            .cookie
            .as_ref()
            .ok_or(AttributionError::BackendUnavailable(BackendKind::Cookie))
    }

    fn area(&self, kind: BackendKind) -> Result<&Arc<dyn StorageArea>> {
        self.backends
            .area(kind)
            .ok_or(AttributionError::BackendUnavailable(kind))
    }

    fn write_cookie(&self, key: &str, value: &str, expires: u64) -> Result<()> {
        let jar = self.cookie()?;

        if !is_cookie_safe(value) {
            // Clear the old cookie so it cannot shadow the other tiers
            jar.set_cookie(&format_set_cookie(key, "", 0)?)?;
            return Err(AttributionError::Backend(
                BackendKind::Cookie,
                "value cannot be stored as a raw cookie".to_string(),
            ));
        }

        let value = truncate_middle(value, self.cookie_value_limit, self.truncation_prefix);
        let line = format_set_cookie(key, &value, expires)?;
        jar.set_cookie(&line)
    }

    fn write_area(&self, kind: BackendKind, key: &str, value: &str, expires: u64) -> Result<()> {
        let encoded = StorageItem::new(value, expires).encode()?;
        self.area(kind)?.set_item(key, &encoded)
    }

    fn read_cookie(&self, key: &str) -> Option<String> {
        match self.cookie().and_then(|jar| jar.cookie_header()) {
            Ok(header) => lookup_cookie(&header, key),
            Err(e) => {
                tracing::debug!("Cookie read failed for '{}': {}", key, e);
                None
            }
        }
    }

    fn read_area(&self, kind: BackendKind, key: &str, now: u64) -> Option<String> {
        let area = self.area(kind).ok()?;

        let raw = match area.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("{} read failed for '{}': {}", kind, key, e);
                return None;
            }
        };

        let item = match StorageItem::decode(&raw) {
            Ok(item) => item,
            Err(e) => {
                let corrupt = AttributionError::CorruptEntry {
                    backend: kind,
                    key: key.to_string(),
                    reason: e.to_string(),
                };
                tracing::debug!("Skipping entry: {}", corrupt);
                return None;
            }
        };

        if item.is_expired(now) {
            tracing::trace!("Evicting expired '{}' from {}", key, kind);
            if let Err(e) = area.remove_item(key) {
                tracing::debug!("Eviction of '{}' from {} failed: {}", key, kind, e);
            }
            return None;
        }

        Some(item.value).filter(|value| !value.is_empty())
    }
}

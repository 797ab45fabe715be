//! Ledger Module
//!
//! Identifier correlation on top of the tiered store.
//!
//! ## Responsibilities
//! - Accumulate transaction ids per offer and per advertiser
//! - Keep each list under its ceiling, oldest ids dropped first
//! - Resolve the latest id, falling back through legacy key conventions
//! - Track whether any paid click was ever seen (witness flag)
//!
//! ## Value Layout
//! ```text
//! aff_tid_c_o_42  =  tid1|tid2|tid3      (oldest → newest)
//! ```
//!
//! Every read-modify-write here is non-atomic: two writers appending to the
//! same key concurrently (e.g. two tabs) are last-write-wins.

mod keys;

use std::sync::Arc;

use crate::config::Config;
use crate::store::{truncate_middle, TieredStore};

pub use keys::{current_key, legacy_keys, Scope, WITNESS_KEY, WITNESS_VALUE};

/// Separator between ids in a correlation value
pub const SEPARATOR: char = '|';

/// Transaction id lists keyed by scope
pub struct Ledger {
    store: Arc<TieredStore>,
    ttl_days: u32,
    value_limit: usize,
    truncation_prefix: usize,
}

impl Ledger {
    pub fn new(store: Arc<TieredStore>, config: &Config) -> Self {
        Self {
            store,
            ttl_days: config.ledger_ttl_days,
            value_limit: config.transaction_value_limit,
            truncation_prefix: config.truncation_prefix,
        }
    }

    /// Append `transaction_id` to the list for `scope`/`scope_id`
    ///
    /// Empty ids are ignored. Storage failures are logged by the store and
    /// otherwise swallowed.
    pub fn record_transaction(&self, scope: Scope, scope_id: &str, transaction_id: &str) {
        if transaction_id.is_empty() {
            return;
        }

        let key = current_key(scope, scope_id);
        let current = self.store.retrieve(&key);
        let next = self.append(&current, transaction_id);

        let outcome = self.store.store(&key, &next, self.ttl_days);
        if !outcome.is_success() {
            tracing::debug!("Transaction for {} {} not persisted", scope, scope_id);
        }
    }

    /// Most recently recorded id, empty when none is known
    pub fn latest_transaction(&self, scope: Scope, scope_id: &str) -> String {
        let current = self.store.retrieve(&current_key(scope, scope_id));
        if let Some(latest) = last_segment(&current) {
            return latest.to_string();
        }

        for key in legacy_keys(scope, scope_id) {
            let value = self.store.retrieve(&key);
            if let Some(latest) = last_segment(&value) {
                tracing::debug!("Resolved {} {} from legacy key {}", scope, scope_id, key);
                return latest.to_string();
            }
        }

        String::new()
    }

    /// Every id in the current list, oldest first
    pub fn transactions(&self, scope: Scope, scope_id: &str) -> Vec<String> {
        self.store
            .retrieve(&current_key(scope, scope_id))
            .split(SEPARATOR)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether a tracked click has ever been recorded for this visitor
    pub fn witnessed(&self) -> bool {
        self.store.retrieve(WITNESS_KEY) == WITNESS_VALUE
    }

    pub fn mark_witnessed(&self) {
        self.store.store(WITNESS_KEY, WITNESS_VALUE, self.ttl_days);
    }

    pub fn store(&self) -> &Arc<TieredStore> {
        &self.store
    }

    /// `current` plus `transaction_id`, middle-truncated to the list ceiling
    ///
    /// The kept tail must hold the separator and the whole new id. An id too
    /// long for that replaces the list instead of being cut.
    fn append(&self, current: &str, transaction_id: &str) -> String {
        let tail = self
            .value_limit
            .saturating_sub(self.truncation_prefix.min(self.value_limit) + 1);
        if current.is_empty() || transaction_id.chars().count() >= tail {
            return transaction_id.to_string();
        }

        let combined = format!("{}{}{}", current, SEPARATOR, transaction_id);
        truncate_middle(&combined, self.value_limit, self.truncation_prefix).into_owned()
    }
}

fn last_segment(value: &str) -> Option<&str> {
    value.rsplit(SEPARATOR).next().filter(|id| !id.is_empty())
}

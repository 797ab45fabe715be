//! Tests for Ledger
//!
//! These tests verify:
//! - Append-only accumulation per scope
//! - Latest-id resolution and legacy key fallback
//! - Transaction list truncation
//! - Witness flag
//! - Degradation to empty results when storage is gone

use std::sync::Arc;

use afftrack::backend::{MemoryCookieJar, MemoryStorageArea, StorageArea, StorageBackends};
use afftrack::clock::ManualClock;
use afftrack::store::{StorageItem, TieredStore};
use afftrack::{Config, Ledger, Scope};

// =============================================================================
// Helper Functions
// =============================================================================

const START_MS: u64 = 1_700_000_000_000;

fn setup_ledger() -> (Arc<ManualClock>, Arc<MemoryStorageArea>, Ledger) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let local = Arc::new(MemoryStorageArea::local());
    let backends = StorageBackends::new()
        .with_cookie(Arc::new(MemoryCookieJar::new(clock.clone())))
        .with_local(local.clone())
        .with_session(Arc::new(MemoryStorageArea::session()));

    let config = Config::default();
    let store = Arc::new(TieredStore::new(backends, clock.clone(), &config));
    (clock, local, Ledger::new(store, &config))
}

fn offer() -> Scope {
    "o".parse().unwrap()
}

fn put_legacy(local: &MemoryStorageArea, key: &str, value: &str) {
    local
        .set_item(key, &StorageItem::new(value, u64::MAX).encode().unwrap())
        .unwrap();
}

// =============================================================================
// Accumulation Tests
// =============================================================================

#[test]
fn test_record_then_latest() {
    let (_clock, _local, ledger) = setup_ledger();

    ledger.record_transaction(offer(), "42", "A");
    ledger.record_transaction(offer(), "42", "B");

    assert_eq!(ledger.latest_transaction(offer(), "42"), "B");
    assert_eq!(ledger.store().retrieve("aff_tid_c_o_42"), "A|B");
    assert_eq!(ledger.transactions(offer(), "42"), vec!["A", "B"]);
}

#[test]
fn test_first_record_is_bare_id() {
    let (_clock, _local, ledger) = setup_ledger();

    ledger.record_transaction(Scope::Advertiser, "7", "T1");

    assert_eq!(ledger.store().retrieve("aff_tid_c_a_7"), "T1");
}

#[test]
fn test_scopes_are_independent() {
    let (_clock, _local, ledger) = setup_ledger();

    ledger.record_transaction(Scope::Offer, "1", "offer-tid");
    ledger.record_transaction(Scope::Advertiser, "1", "adv-tid");
    ledger.record_transaction(Scope::Offer, "2", "other-offer");

    assert_eq!(ledger.latest_transaction(Scope::Offer, "1"), "offer-tid");
    assert_eq!(ledger.latest_transaction(Scope::Advertiser, "1"), "adv-tid");
    assert_eq!(ledger.latest_transaction(Scope::Offer, "2"), "other-offer");
}

#[test]
fn test_empty_transaction_is_ignored() {
    let (_clock, _local, ledger) = setup_ledger();

    ledger.record_transaction(offer(), "42", "A");
    ledger.record_transaction(offer(), "42", "");

    assert_eq!(ledger.store().retrieve("aff_tid_c_o_42"), "A");
}

#[test]
fn test_unknown_scope_is_empty() {
    let (_clock, _local, ledger) = setup_ledger();

    assert_eq!(ledger.latest_transaction(offer(), "404"), "");
    assert!(ledger.transactions(offer(), "404").is_empty());
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_list_is_capped_and_newest_survives() {
    let (_clock, _local, ledger) = setup_ledger();
    let ids: Vec<String> = (0..40).map(|i| format!("{:024x}", i)).collect();

    for id in &ids {
        ledger.record_transaction(offer(), "42", id);
    }

    let stored = ledger.store().retrieve("aff_tid_c_o_42");
    assert!(stored.len() <= 332);
    assert!(stored.starts_with(&ids[0]));
    assert!(stored.ends_with(&format!("|{}", ids[39])));
    assert_eq!(ledger.latest_transaction(offer(), "42"), ids[39]);
}

#[test]
fn test_oversized_transaction_replaces_list() {
    let (_clock, _local, ledger) = setup_ledger();
    for i in 0..10 {
        ledger.record_transaction(offer(), "42", &format!("{:024x}", i));
    }

    let long_id = "z".repeat(320);
    ledger.record_transaction(offer(), "42", &long_id);

    assert_eq!(ledger.latest_transaction(offer(), "42"), long_id);
    assert_eq!(ledger.store().retrieve("aff_tid_c_o_42"), long_id);
    assert_eq!(ledger.transactions(offer(), "42"), vec![long_id]);
}

#[test]
fn test_longest_fitting_transaction_keeps_separator() {
    let (_clock, _local, ledger) = setup_ledger();
    for i in 0..10 {
        ledger.record_transaction(offer(), "42", &format!("{:024x}", i));
    }

    // 332 - 33 - 1 = 298 tail characters: one separator plus the id
    let id = "y".repeat(297);
    ledger.record_transaction(offer(), "42", &id);

    let stored = ledger.store().retrieve("aff_tid_c_o_42");
    assert!(stored.ends_with(&format!("|{}", id)));
    assert_eq!(ledger.latest_transaction(offer(), "42"), id);

    let exact = "x".repeat(298);
    ledger.record_transaction(offer(), "42", &exact);
    assert_eq!(ledger.store().retrieve("aff_tid_c_o_42"), exact);
}

#[test]
fn test_list_under_cap_keeps_everything() {
    let (_clock, _local, ledger) = setup_ledger();

    for id in ["a1", "b2", "c3", "d4"] {
        ledger.record_transaction(offer(), "42", id);
    }

    assert_eq!(ledger.store().retrieve("aff_tid_c_o_42"), "a1|b2|c3|d4");
}

// =============================================================================
// Legacy Fallback Tests
// =============================================================================

#[test]
fn test_fallback_to_legacy_key() {
    let (_clock, local, ledger) = setup_ledger();
    put_legacy(&local, "aff_tid_i_o_42", "X");

    assert_eq!(ledger.latest_transaction(offer(), "42"), "X");
}

#[test]
fn test_fallback_to_oldest_key() {
    let (_clock, local, ledger) = setup_ledger();
    put_legacy(&local, "aff_tid_42", "OLD");

    assert_eq!(ledger.latest_transaction(offer(), "42"), "OLD");
}

#[test]
fn test_oldest_key_only_applies_to_offers() {
    let (_clock, local, ledger) = setup_ledger();
    put_legacy(&local, "aff_tid_42", "OLD");

    assert_eq!(ledger.latest_transaction(Scope::Advertiser, "42"), "");
}

#[test]
fn test_current_key_beats_legacy() {
    let (_clock, local, ledger) = setup_ledger();
    put_legacy(&local, "aff_tid_i_o_42", "X");
    put_legacy(&local, "aff_tid_42", "OLD");

    ledger.record_transaction(offer(), "42", "NEW");

    assert_eq!(ledger.latest_transaction(offer(), "42"), "NEW");
}

#[test]
fn test_legacy_keys_are_never_written() {
    let (_clock, local, ledger) = setup_ledger();
    put_legacy(&local, "aff_tid_i_a_9", "X");

    ledger.record_transaction(Scope::Advertiser, "9", "Y");

    let legacy = StorageItem::decode(&local.raw("aff_tid_i_a_9").unwrap()).unwrap();
    assert_eq!(legacy.value, "X");
    assert_eq!(ledger.transactions(Scope::Advertiser, "9"), vec!["Y"]);
}

// =============================================================================
// Witness Tests
// =============================================================================

#[test]
fn test_witness_flag() {
    let (_clock, _local, ledger) = setup_ledger();

    assert!(!ledger.witnessed());
    ledger.mark_witnessed();
    assert!(ledger.witnessed());
    assert!(ledger.witnessed());
    assert_eq!(ledger.store().retrieve("aff_witness"), "1");
}

// =============================================================================
// Expiry & Degradation Tests
// =============================================================================

#[test]
fn test_lists_expire_with_ledger_ttl() {
    let (clock, _local, ledger) = setup_ledger();
    ledger.record_transaction(offer(), "42", "A");
    ledger.mark_witnessed();

    clock.advance_days(366);

    assert_eq!(ledger.latest_transaction(offer(), "42"), "");
    assert!(!ledger.witnessed());
}

#[test]
fn test_no_backends_degrades_to_empty() {
    let clock = Arc::new(ManualClock::new(START_MS));
    let config = Config::default();
    let store = Arc::new(TieredStore::new(StorageBackends::new(), clock, &config));
    let ledger = Ledger::new(store, &config);

    ledger.record_transaction(offer(), "42", "A");
    ledger.mark_witnessed();

    assert_eq!(ledger.latest_transaction(offer(), "42"), "");
    assert!(!ledger.witnessed());
}

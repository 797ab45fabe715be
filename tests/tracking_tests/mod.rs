//! Tests for Tracker
//!
//! These tests verify:
//! - Click and conversion URL assembly
//! - Required parameter validation
//! - Click responses feeding the ledger
//! - Conversions picking up correlated click ids

use std::collections::HashMap;
use std::sync::Arc;

use afftrack::backend::{MemoryCookieJar, MemoryStorageArea, StorageBackends};
use afftrack::clock::ManualClock;
use afftrack::tracking::{url_parameter, ClickOptions, ConversionItem, ConversionOptions};
use afftrack::{AttributionError, Config, Scope, Tracker};
use url::Url;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_tracker() -> Tracker {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let backends = StorageBackends::new()
        .with_cookie(Arc::new(MemoryCookieJar::new(clock.clone())))
        .with_local(Arc::new(MemoryStorageArea::local()))
        .with_session(Arc::new(MemoryStorageArea::session()));
    let config = Config::builder()
        .tracking_domain("https://track.example.org/")
        .build();
    Tracker::new(config, backends, clock)
}

fn query(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

// =============================================================================
// Click Tests
// =============================================================================

#[test]
fn test_click_url_required_params() {
    let tracker = setup_tracker();

    let url = tracker.click_url(&ClickOptions::new("aff1", "offer9")).unwrap();

    assert_eq!(url.path(), "/click");
    assert_eq!(url.host_str(), Some("track.example.org"));
    assert_eq!(
        url.query(),
        Some("format=json&websdk=1&pid=aff1&offer_id=offer9")
    );
}

#[test]
fn test_click_url_optional_params_and_empties() {
    let tracker = setup_tracker();
    let options = ClickOptions {
        user_agent: Some("UA/1.0".to_string()),
        landing_id: Some("12".to_string()),
        fbclid: Some(String::new()),
        ..ClickOptions::new("aff1", "offer9")
    }
    .with_sub(1, "s1")
    .with_sub(30, "s30");

    let params = query(&tracker.click_url(&options).unwrap());

    assert_eq!(params.get("ua").map(String::as_str), Some("UA/1.0"));
    assert_eq!(params.get("l").map(String::as_str), Some("12"));
    assert_eq!(params.get("sub1").map(String::as_str), Some("s1"));
    assert_eq!(params.get("sub30").map(String::as_str), Some("s30"));
    assert!(!params.contains_key("fbclid"));
}

#[test]
fn test_click_url_domain_override() {
    let tracker = setup_tracker();
    let options = ClickOptions {
        tracking_domain: Some("https://other.example.net".to_string()),
        ..ClickOptions::new("a", "o")
    };

    let url = tracker.click_url(&options).unwrap();
    assert_eq!(url.host_str(), Some("other.example.net"));
}

#[test]
fn test_click_url_missing_params() {
    let tracker = setup_tracker();
    let options = ClickOptions {
        offer_id: Some("o".to_string()),
        ..ClickOptions::default()
    };

    let err = tracker.click_url(&options).unwrap_err();
    assert!(matches!(err, AttributionError::MissingRequiredParams(_)));
    assert_eq!(err.code(), "MISSING_REQUIRED_PARAMS");
}

#[test]
fn test_invalid_domain_is_config_error() {
    let mut tracker = setup_tracker();
    tracker.configure("not a url");

    let err = tracker.click_url(&ClickOptions::new("a", "o")).unwrap_err();
    assert!(matches!(err, AttributionError::Config(_)));
}

// =============================================================================
// Click Response Tests
// =============================================================================

#[test]
fn test_click_response_records_offer_and_advertiser() {
    let tracker = setup_tracker();

    let id = tracker
        .handle_click_response("42", Some("7"), r#"{"clickid":"abc123"}"#)
        .unwrap();

    assert_eq!(id, "abc123");
    assert_eq!(tracker.click_id("42"), "abc123");
    assert_eq!(
        tracker.ledger().latest_transaction(Scope::Advertiser, "7"),
        "abc123"
    );
    assert!(tracker.ledger().witnessed());
}

#[test]
fn test_repeated_clicks_accumulate() {
    let tracker = setup_tracker();

    tracker
        .handle_click_response("42", None, r#"{"clickid":"c1"}"#)
        .unwrap();
    tracker
        .handle_click_response("42", None, r#"{"clickid":"c2"}"#)
        .unwrap();

    assert_eq!(
        tracker.ledger().transactions(Scope::Offer, "42"),
        vec!["c1", "c2"]
    );
    assert_eq!(tracker.click_id("42"), "c2");
}

#[test]
fn test_click_response_without_id_is_invalid() {
    let tracker = setup_tracker();

    for body in [r#"{}"#, r#"{"clickid":""}"#, "not json"] {
        let err = tracker.handle_click_response("42", None, body).unwrap_err();
        assert!(matches!(err, AttributionError::InvalidResponse(_)));
    }
    assert!(!tracker.ledger().witnessed());
    assert_eq!(tracker.click_id("42"), "");
}

// =============================================================================
// Conversion Tests
// =============================================================================

#[test]
fn test_conversion_url_mapping() {
    let tracker = setup_tracker();
    let mut options = ConversionOptions {
        click_id: Some("cid".to_string()),
        status: Some("1".to_string()),
        sum: Some("10.5".to_string()),
        action_id: Some("ext-1".to_string()),
        items: vec![ConversionItem {
            sku: Some("SKU1".to_string()),
            quantity: Some("2".to_string()),
            ..ConversionItem::default()
        }],
        ..ConversionOptions::default()
    };
    options.custom_field.insert(3, "cf".to_string());

    let url = tracker.conversion_url(&options).unwrap();
    let params = query(&url);

    assert_eq!(url.path(), "/success.jpg");
    assert_eq!(params.get("success").map(String::as_str), Some("1"));
    assert_eq!(params.get("afclick").map(String::as_str), Some("cid"));
    assert_eq!(params.get("afstatus").map(String::as_str), Some("1"));
    assert_eq!(params.get("afprice").map(String::as_str), Some("10.5"));
    assert_eq!(params.get("afid").map(String::as_str), Some("ext-1"));
    assert_eq!(params.get("custom_field3").map(String::as_str), Some("cf"));
    assert_eq!(params.get("items[0][sku]").map(String::as_str), Some("SKU1"));
    assert_eq!(params.get("items[0][quantity]").map(String::as_str), Some("2"));
}

#[test]
fn test_conversion_uses_correlated_click_id() {
    let tracker = setup_tracker();
    tracker
        .handle_click_response("42", None, r#"{"clickid":"from-click"}"#)
        .unwrap();

    let options = ConversionOptions {
        offer_id: Some("42".to_string()),
        ..ConversionOptions::default()
    };
    let params = query(&tracker.conversion_url(&options).unwrap());

    assert_eq!(params.get("afclick").map(String::as_str), Some("from-click"));
    assert_eq!(params.get("offer_id").map(String::as_str), Some("42"));
}

#[test]
fn test_conversion_explicit_click_id_wins() {
    let tracker = setup_tracker();
    tracker
        .handle_click_response("42", None, r#"{"clickid":"from-click"}"#)
        .unwrap();

    let options = ConversionOptions {
        offer_id: Some("42".to_string()),
        click_id: Some("explicit".to_string()),
        ..ConversionOptions::default()
    };
    let params = query(&tracker.conversion_url(&options).unwrap());

    assert_eq!(params.get("afclick").map(String::as_str), Some("explicit"));
}

#[test]
fn test_conversion_with_promo_code_only() {
    let tracker = setup_tracker();
    let options = ConversionOptions {
        promo_code: Some("SPRING".to_string()),
        ..ConversionOptions::default()
    };

    let params = query(&tracker.conversion_url(&options).unwrap());

    assert_eq!(params.get("promo_code").map(String::as_str), Some("SPRING"));
    assert!(!params.contains_key("afclick"));
}

#[test]
fn test_conversion_without_correlation_fails() {
    let tracker = setup_tracker();
    let options = ConversionOptions {
        offer_id: Some("never-clicked".to_string()),
        ..ConversionOptions::default()
    };

    let err = tracker.conversion_url(&options).unwrap_err();
    assert!(matches!(err, AttributionError::MissingRequiredParams(_)));
}

// =============================================================================
// URL Parameter Tests
// =============================================================================

#[test]
fn test_url_parameter() {
    let page = "https://shop.example.com/landing?clickid=xyz&offer=42";

    assert_eq!(url_parameter(page, "clickid").unwrap().as_deref(), Some("xyz"));
    assert_eq!(url_parameter(page, "missing").unwrap(), None);
    assert!(url_parameter("::bad::", "x").is_err());
}

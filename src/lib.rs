//! # afftrack
//!
//! Client-side attribution core:
//! - Tiered key/value storage over cookie, local and session backends
//! - Per-backend capability probing with silent degradation
//! - TTL expiry and size-bounded cookie writes
//! - Transaction id correlation per offer and per advertiser
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Tracker                              │
//! │            (click / conversion URL building)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Ledger                               │
//! │        (aff_tid_c_<scope>_<id> = tid1|tid2|...)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     TieredStore                             │
//! │       (fan-out writes, cookie → local → session reads)      │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//!  ┌───────────┐        ┌─────────────┐        ┌─────────────┐
//!  │ CookieJar │        │ StorageArea │        │ StorageArea │
//!  │ (cookie)  │        │   (local)   │        │  (session)  │
//!  └───────────┘        └─────────────┘        └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod backend;
pub mod probe;
pub mod store;
pub mod ledger;
pub mod tracking;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AttributionError, Result};
pub use config::Config;
pub use ledger::{Ledger, Scope};
pub use store::TieredStore;
pub use tracking::Tracker;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of afftrack
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

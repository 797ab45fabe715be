//! Store Module
//!
//! One logical key/value namespace spread over the cookie, local and
//! session backends.
//!
//! ## Responsibilities
//! - Fan writes out to every available backend
//! - Read in fixed priority order: cookie → local → session
//! - Apply TTLs (native cookie expiry, JSON envelope elsewhere)
//! - Keep cookie values under the per-cookie size ceiling
//!
//! ## Encodings
//! ```text
//! cookie:           key=<raw value>;expires=<RFC 1123 GMT>;path=/
//! local / session:  key -> {"value":"<raw value>","expires":<epoch ms>}
//! ```

mod item;
mod tiered;
mod truncate;

pub use item::StorageItem;
pub use tiered::{StoreOutcome, TieredStore};
pub use truncate::truncate_middle;

//! Tracking Module
//!
//! Request building for the click and conversion endpoints. No network I/O
//! happens here: hosts send the URLs themselves and hand click response
//! bodies back to [`Tracker::handle_click_response`].
//!
//! ```text
//!  click_url ──► host GET /click ──► handle_click_response ──► Ledger
//!                                                                │
//!  conversion_url ◄──────────── latest transaction ◄─────────────┘
//! ```

mod request;
mod tracker;

pub use request::{
    ClickOptions, ConversionItem, ConversionOptions, MAX_CUSTOM_FIELDS, MAX_SUB_PARAMS,
};
pub use tracker::{url_parameter, Tracker};

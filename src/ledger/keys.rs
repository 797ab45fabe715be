//! Correlation key formatting
//!
//! The ledger is the only place raw keys are built.

use std::fmt;
use std::str::FromStr;

use crate::error::AttributionError;

/// Presence flag key
pub const WITNESS_KEY: &str = "aff_witness";

/// Value written under `WITNESS_KEY`
pub const WITNESS_VALUE: &str = "1";

const CURRENT_FAMILY: &str = "aff_tid_c";
const LEGACY_FAMILY: &str = "aff_tid_i";
const OLDEST_FAMILY: &str = "aff_tid";

/// Correlation dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Offer,
    Advertiser,
}

impl Scope {
    /// One-letter code used inside keys
    pub fn code(&self) -> &'static str {
        match self {
            Self::Offer => "o",
            Self::Advertiser => "a",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Scope {
    type Err = AttributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "o" | "offer" => Ok(Self::Offer),
            "a" | "advertiser" => Ok(Self::Advertiser),
            other => Err(AttributionError::Config(format!(
                "unknown scope '{}', expected 'o' or 'a'",
                other
            ))),
        }
    }
}

/// Key of the list written today: `aff_tid_c_<scope>_<id>`
pub fn current_key(scope: Scope, id: &str) -> String {
    format!("{}_{}_{}", CURRENT_FAMILY, scope.code(), id)
}

/// Read-only fallback keys, newest convention first
pub fn legacy_keys(scope: Scope, id: &str) -> Vec<String> {
    let mut keys = vec![format!("{}_{}_{}", LEGACY_FAMILY, scope.code(), id)];
    // The oldest convention only ever tracked offers
    if scope == Scope::Offer {
        keys.push(format!("{}_{}", OLDEST_FAMILY, id));
    }
    keys
}

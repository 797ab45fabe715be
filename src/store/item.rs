//! StorageItem envelope
//!
//! What local and session storage actually hold.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A value plus its absolute expiry (epoch ms)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageItem {
    pub value: String,
    pub expires: u64,
}

impl StorageItem {
    pub fn new(value: impl Into<String>, expires: u64) -> Self {
        Self {
            value: value.into(),
            expires,
        }
    }

    /// Live strictly before `expires`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires <= now_ms
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

//! In-memory storage area
//!
//! HashMap behind an RwLock, with an optional byte quota so quota
//! exhaustion can be reproduced.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{BackendKind, StorageArea};
use crate::error::{AttributionError, Result};

/// In-memory `StorageArea`
#[derive(Debug)]
pub struct MemoryStorageArea {
    kind: BackendKind,
    items: RwLock<HashMap<String, String>>,
    /// Max total bytes of keys + values, `None` = unbounded
    quota: Option<usize>,
}

impl MemoryStorageArea {
    /// Create an empty area reporting errors as `kind`
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            items: RwLock::new(HashMap::new()),
            quota: None,
        }
    }

    pub fn local() -> Self {
        Self::new(BackendKind::Local)
    }

    pub fn session() -> Self {
        Self::new(BackendKind::Session)
    }

    /// Reject writes that would push the area past `bytes`
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Raw stored string, bypassing the trait (for inspection)
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn used_bytes(items: &HashMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageArea for MemoryStorageArea {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write();

        if let Some(quota) = self.quota {
            let replaced = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = Self::used_bytes(&items) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(AttributionError::Backend(
                    self.kind,
                    format!("quota of {} bytes exceeded", quota),
                ));
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

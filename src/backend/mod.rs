//! Backend Module
//!
//! The three storage mechanisms the tiered store fans out to.
//!
//! ## Responsibilities
//! - Cookie jar: `name=value` pairs with native expiry, small per-cookie cap
//! - Local storage: persistent string key/value area
//! - Session storage: string key/value area scoped to one browsing session
//!
//! Backends are plain handles injected into the store. They may fail on any
//! call (privacy settings, quota, sandboxing); callers above this layer decide
//! what a failure means.

mod area;
mod cookie;
mod file;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

pub use area::MemoryStorageArea;
pub use cookie::{
    format_set_cookie, is_cookie_safe, lookup_cookie, MemoryCookieJar, MAX_COOKIE_BYTES,
};
pub use file::FileStorageArea;

/// Identifies one of the three backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Cookie,
    Local,
    Session,
}

impl BackendKind {
    /// Read priority order
    pub const PRIORITY: [BackendKind; 3] = [Self::Cookie, Self::Local, Self::Session];
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cookie => f.write_str("cookie"),
            Self::Local => f.write_str("localStorage"),
            Self::Session => f.write_str("sessionStorage"),
        }
    }
}

/// A string key/value area (local or session storage)
pub trait StorageArea: Send + Sync {
    /// Read the raw string stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store a raw string under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key` (no-op when absent)
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// A cookie jar with `document.cookie` semantics
pub trait CookieJar: Send + Sync {
    /// Assign one cookie line: `name=value; expires=...; max-age=...; path=/`
    fn set_cookie(&self, line: &str) -> Result<()>;

    /// Current `name=value; name2=value2` view of live cookies
    fn cookie_header(&self) -> Result<String>;
}

/// Backend handles passed into a tiered store
///
/// A `None` handle means the host has no such mechanism at all; it is
/// reported unavailable without probing.
#[derive(Clone, Default)]
pub struct StorageBackends {
    pub cookie: Option<Arc<dyn CookieJar>>,
    pub local: Option<Arc<dyn StorageArea>>,
    pub session: Option<Arc<dyn StorageArea>>,
}

impl StorageBackends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, jar: Arc<dyn CookieJar>) -> Self {
        self.cookie = Some(jar);
        self
    }

    pub fn with_local(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.local = Some(area);
        self
    }

    pub fn with_session(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.session = Some(area);
        self
    }

    /// Area handle for `Local` or `Session`
    pub fn area(&self, kind: BackendKind) -> Option<&Arc<dyn StorageArea>> {
        match kind {
            BackendKind::Cookie => None,
            BackendKind::Local => self.local.as_ref(),
            BackendKind::Session => self.session.as_ref(),
        }
    }
}

impl fmt::Debug for StorageBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackends")
            .field("cookie", &self.cookie.is_some())
            .field("local", &self.local.is_some())
            .field("session", &self.session.is_some())
            .finish()
    }
}

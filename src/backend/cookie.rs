//! Cookie jar
//!
//! Writes go through cookie lines exactly as a page would assign them to
//! `document.cookie`; reads parse the `name=value; ...` view. Expiry is
//! enforced by the jar itself, never by an embedded field.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{BackendKind, CookieJar};
use crate::clock::SharedClock;
use crate::error::{AttributionError, Result};

/// Browsers drop cookies whose name + value exceed this many bytes
pub const MAX_COOKIE_BYTES: usize = 4096;

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Build a cookie line: `key=value;expires=<RFC 1123>;path=/`
pub fn format_set_cookie(key: &str, value: &str, expires_ms: u64) -> Result<String> {
    let expires = i64::try_from(expires_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| {
            AttributionError::Backend(
                BackendKind::Cookie,
                format!("expiry {} out of range", expires_ms),
            )
        })?;

    Ok(format!(
        "{}={};expires={};path=/",
        key,
        value,
        expires.format(EXPIRES_FORMAT)
    ))
}

/// Whether `value` survives a raw `name=value` cookie line unchanged
///
/// `;` would end the value (and start attributes), control characters are
/// refused by browsers, and surrounding whitespace is trimmed on parse.
pub fn is_cookie_safe(value: &str) -> bool {
    value.trim() == value && !value.chars().any(|c| c == ';' || c.is_control())
}

/// Find `key` in a `name=value; ...` header
///
/// Empty values count as absent.
pub fn lookup_cookie(header: &str, key: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim() == key)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    /// Epoch ms, `None` for a session cookie
    expires: Option<u64>,
}

impl StoredCookie {
    fn is_live(&self, now_ms: u64) -> bool {
        self.expires.map_or(true, |at| at > now_ms)
    }
}

/// In-memory cookie jar with browser expiry semantics
pub struct MemoryCookieJar {
    clock: SharedClock,
    cookies: RwLock<BTreeMap<String, StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            cookies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Live value for `name`, bypassing the header view (for inspection)
    pub fn value(&self, name: &str) -> Option<String> {
        let now = self.clock.now_ms();
        self.cookies
            .read()
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.value.clone())
    }

    /// Number of live cookies
    pub fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.cookies.read().values().filter(|c| c.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn malformed(line: &str, reason: &str) -> AttributionError {
        AttributionError::Backend(
            BackendKind::Cookie,
            format!("malformed cookie line '{}': {}", line, reason),
        )
    }
}

impl CookieJar for MemoryCookieJar {
    fn set_cookie(&self, line: &str) -> Result<()> {
        let mut parts = line.split(';');
        let (name, value) = parts
            .next()
            .and_then(|pair| pair.split_once('='))
            .ok_or_else(|| Self::malformed(line, "missing name=value"))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Self::malformed(line, "empty name"));
        }
        let value = value.trim();

        let now = self.clock.now_ms();
        let mut expires = None;
        let mut max_age = None;

        for attr in parts {
            let Some((attr_name, attr_value)) = attr.split_once('=') else {
                continue;
            };
            let attr_value = attr_value.trim();
            match attr_name.trim().to_ascii_lowercase().as_str() {
                "expires" => {
                    let at = DateTime::parse_from_rfc2822(attr_value)
                        .map_err(|e| Self::malformed(line, &e.to_string()))?;
                    expires = Some(at.timestamp_millis().max(0) as u64);
                }
                "max-age" => {
                    let secs: i64 = attr_value
                        .parse()
                        .map_err(|_| Self::malformed(line, "bad max-age"))?;
                    max_age = Some(secs);
                }
                _ => {}
            }
        }

        // max-age wins over expires
        let expires = match max_age {
            Some(secs) if secs <= 0 => Some(0),
            Some(secs) => Some(now.saturating_add((secs as u64).saturating_mul(1000))),
            None => expires,
        };

        let mut cookies = self.cookies.write();
        if expires.is_some_and(|at| at <= now) {
            cookies.remove(name);
            return Ok(());
        }

        // Oversized cookies are silently dropped, as browsers do
        if name.len() + value.len() > MAX_COOKIE_BYTES {
            tracing::trace!("Dropping oversized cookie {}", name);
            return Ok(());
        }

        cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires,
            },
        );
        Ok(())
    }

    fn cookie_header(&self) -> Result<String> {
        let now = self.clock.now_ms();
        let mut cookies = self.cookies.write();
        cookies.retain(|_, c| c.is_live(now));

        Ok(cookies
            .iter()
            .map(|(name, c)| format!("{}={}", name, c.value))
            .collect::<Vec<_>>()
            .join("; "))
    }
}

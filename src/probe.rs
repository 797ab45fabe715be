//! Backend Capability Probe
//!
//! Run once when a store is built: each backend gets a sentinel write,
//! read-back and delete. Only a full round trip marks it usable.

use std::sync::Arc;

use crate::backend::{lookup_cookie, BackendKind, CookieJar, StorageArea, StorageBackends};
use crate::error::{AttributionError, Result};

const PROBE_KEY: &str = "aff_probe";
const PROBE_VALUE: &str = "1";

/// Which backends survived probing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendAvailability {
    pub cookie: bool,
    pub local: bool,
    pub session: bool,
}

impl BackendAvailability {
    pub fn is_available(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Cookie => self.cookie,
            BackendKind::Local => self.local,
            BackendKind::Session => self.session,
        }
    }

    /// True when no backend is usable
    pub fn is_empty(&self) -> bool {
        !(self.cookie || self.local || self.session)
    }

    /// Available backends in read priority order
    pub fn available(&self) -> impl Iterator<Item = BackendKind> + '_ {
        BackendKind::PRIORITY
            .into_iter()
            .filter(move |kind| self.is_available(*kind))
    }
}

/// Probe every backend independently
pub fn probe(backends: &StorageBackends) -> BackendAvailability {
    let availability = BackendAvailability {
        cookie: report(
            BackendKind::Cookie,
            backends.cookie.as_ref().map(probe_cookie),
        ),
        local: report(
            BackendKind::Local,
            backends.local.as_ref().map(|a| probe_area(BackendKind::Local, a)),
        ),
        session: report(
            BackendKind::Session,
            backends
                .session
                .as_ref()
                .map(|a| probe_area(BackendKind::Session, a)),
        ),
    };

    tracing::debug!(
        cookie = availability.cookie,
        local = availability.local,
        session = availability.session,
        "Storage availability probed"
    );
    availability
}

fn report(kind: BackendKind, outcome: Option<Result<()>>) -> bool {
    match outcome {
        Some(Ok(())) => true,
        Some(Err(e)) => {
            tracing::debug!("{} unavailable: {}", kind, e);
            false
        }
        None => false,
    }
}

fn probe_cookie(jar: &Arc<dyn CookieJar>) -> Result<()> {
    jar.set_cookie(&format!("{}={}; max-age=10", PROBE_KEY, PROBE_VALUE))?;
    let header = jar.cookie_header();
    // Delete the sentinel even when the read failed
    let cleanup = jar.set_cookie(&format!("{}={}; max-age=0", PROBE_KEY, PROBE_VALUE));

    let seen = lookup_cookie(&header?, PROBE_KEY);
    cleanup?;

    match seen.as_deref() {
        Some(PROBE_VALUE) => Ok(()),
        _ => Err(AttributionError::BackendUnavailable(BackendKind::Cookie)),
    }
}

fn probe_area(kind: BackendKind, area: &Arc<dyn StorageArea>) -> Result<()> {
    area.set_item(PROBE_KEY, PROBE_VALUE)?;
    let seen = area.get_item(PROBE_KEY);
    area.remove_item(PROBE_KEY)?;

    match seen?.as_deref() {
        Some(PROBE_VALUE) => Ok(()),
        _ => Err(AttributionError::BackendUnavailable(kind)),
    }
}

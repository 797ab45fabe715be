//! Tracker
//!
//! The SDK handle a host holds: builds request URLs, feeds click responses
//! into the ledger and reads correlation data back out for conversions.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::backend::StorageBackends;
use crate::clock::SharedClock;
use crate::config::Config;
use crate::error::{AttributionError, Result};
use crate::ledger::{Ledger, Scope};
use crate::store::TieredStore;

use super::{ClickOptions, ConversionOptions};

/// Body of a successful click response
#[derive(Debug, Deserialize)]
struct ClickResponse {
    #[serde(default)]
    clickid: Option<String>,
}

/// Click/conversion request builder backed by a ledger
pub struct Tracker {
    config: Config,
    ledger: Ledger,
}

impl Tracker {
    /// Probe `backends` and build the store, ledger and tracker
    pub fn new(config: Config, backends: StorageBackends, clock: SharedClock) -> Self {
        let store = Arc::new(TieredStore::new(backends, clock, &config));
        let ledger = Ledger::new(store, &config);
        Self { config, ledger }
    }

    /// Replace the default tracking domain
    pub fn configure(&mut self, tracking_domain: impl Into<String>) {
        self.config.tracking_domain = tracking_domain.into();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// URL for a click request
    pub fn click_url(&self, options: &ClickOptions) -> Result<Url> {
        let (affiliate_id, offer_id) = match (
            non_empty(options.affiliate_id.as_deref()),
            non_empty(options.offer_id.as_deref()),
        ) {
            (Some(a), Some(o)) => (a, o),
            _ => {
                let err = AttributionError::MissingRequiredParams(
                    "offer_id and/or affiliate_id".to_string(),
                );
                tracing::warn!("{}", err);
                return Err(err);
            }
        };

        let mut url = self.endpoint(options.tracking_domain.as_deref(), "click")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("format", "json")
                .append_pair("websdk", "1")
                .append_pair("pid", affiliate_id)
                .append_pair("offer_id", offer_id);

            for (name, value) in options.optional_params() {
                if !value.is_empty() {
                    query.append_pair(&name, value);
                }
            }
        }

        tracing::debug!("Built click URL for offer {}", offer_id);
        Ok(url)
    }

    /// Record the click id from a click response body
    ///
    /// The id is appended under the offer (and the advertiser, when known)
    /// and the visitor is marked as witnessed.
    pub fn handle_click_response(
        &self,
        offer_id: &str,
        advertiser_id: Option<&str>,
        body: &str,
    ) -> Result<String> {
        let response: ClickResponse = serde_json::from_str(body).map_err(|e| {
            tracing::error!("Unparseable click response: {}", e);
            AttributionError::InvalidResponse(e.to_string())
        })?;

        let click_id = match response.clickid.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let err = AttributionError::InvalidResponse("missing clickid".to_string());
                tracing::error!("{}", err);
                return Err(err);
            }
        };

        self.ledger.record_transaction(Scope::Offer, offer_id, &click_id);
        if let Some(advertiser_id) = non_empty(advertiser_id) {
            self.ledger
                .record_transaction(Scope::Advertiser, advertiser_id, &click_id);
        }
        self.ledger.mark_witnessed();

        Ok(click_id)
    }

    /// URL for a conversion request
    ///
    /// Without an explicit click id, the latest one recorded for the offer
    /// is used. A conversion needs either a click id or a promo code.
    pub fn conversion_url(&self, options: &ConversionOptions) -> Result<Url> {
        let correlated = match non_empty(options.click_id.as_deref()) {
            Some(_) => None,
            None => non_empty(options.offer_id.as_deref())
                .map(|offer_id| self.click_id(offer_id))
                .filter(|id| !id.is_empty()),
        };
        let click_id = non_empty(options.click_id.as_deref()).or(correlated.as_deref());

        if click_id.is_none() && non_empty(options.promo_code.as_deref()).is_none() {
            let err =
                AttributionError::MissingRequiredParams("click_id or promo_code".to_string());
            tracing::warn!("{}", err);
            return Err(err);
        }

        let mut url = self.endpoint(options.tracking_domain.as_deref(), "success.jpg")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("success", "1");

            for (name, value) in options.params(click_id) {
                if !value.is_empty() {
                    query.append_pair(&name, value);
                }
            }
        }

        Ok(url)
    }

    /// Latest click id recorded for `offer_id`, empty when unknown
    pub fn click_id(&self, offer_id: &str) -> String {
        self.ledger.latest_transaction(Scope::Offer, offer_id)
    }

    fn endpoint(&self, domain_override: Option<&str>, path: &str) -> Result<Url> {
        let domain = non_empty(domain_override).unwrap_or(&self.config.tracking_domain);
        let base = format!("{}/{}", domain.trim_end_matches('/'), path);

        Url::parse(&base).map_err(|e| {
            AttributionError::Config(format!("invalid tracking domain '{}': {}", domain, e))
        })
    }
}

/// Value of query parameter `name` in `page_url`
pub fn url_parameter(page_url: &str, name: &str) -> Result<Option<String>> {
    let url = Url::parse(page_url)?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

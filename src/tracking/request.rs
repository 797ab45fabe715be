//! Click and conversion request options
//!
//! Field → query parameter mapping for the two tracking endpoints.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Highest `subN` parameter accepted on clicks
pub const MAX_SUB_PARAMS: u8 = 30;

/// Highest `custom_fieldN` parameter accepted on conversions
pub const MAX_CUSTOM_FIELDS: u8 = 15;

/// Options for a click request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClickOptions {
    pub affiliate_id: Option<String>,
    pub offer_id: Option<String>,
    pub tracking_domain: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub ref_id: Option<String>,
    pub ref_android_id: Option<String>,
    pub ref_device_id: Option<String>,
    pub mac_address: Option<String>,
    pub os_id: Option<String>,
    pub user_id: Option<String>,
    pub ext1: Option<String>,
    pub ext2: Option<String>,
    pub ext3: Option<String>,
    pub imp_id: Option<String>,
    pub unid: Option<String>,
    pub fbclid: Option<String>,
    pub landing_id: Option<String>,
    /// `sub1` .. `sub30`, keyed by number
    pub sub: BTreeMap<u8, String>,
}

impl ClickOptions {
    pub fn new(affiliate_id: impl Into<String>, offer_id: impl Into<String>) -> Self {
        Self {
            affiliate_id: Some(affiliate_id.into()),
            offer_id: Some(offer_id.into()),
            ..Self::default()
        }
    }

    /// Set `subN`
    pub fn with_sub(mut self, n: u8, value: impl Into<String>) -> Self {
        self.sub.insert(n, value.into());
        self
    }

    /// Optional parameters as `(query name, value)`, unset ones skipped
    pub(crate) fn optional_params(&self) -> Vec<(String, &str)> {
        let fixed = [
            ("ip", &self.ip),
            ("ua", &self.user_agent),
            ("ref_id", &self.ref_id),
            ("ref_android_id", &self.ref_android_id),
            ("ref_device_id", &self.ref_device_id),
            ("mac_address", &self.mac_address),
            ("os_id", &self.os_id),
            ("user_id", &self.user_id),
            ("ext1", &self.ext1),
            ("ext2", &self.ext2),
            ("ext3", &self.ext3),
            ("imp_id", &self.imp_id),
            ("unid", &self.unid),
            ("fbclid", &self.fbclid),
            ("l", &self.landing_id),
        ];

        let mut params: Vec<(String, &str)> = fixed
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name.to_string(), v)))
            .collect();

        params.extend(numbered("sub", &self.sub, MAX_SUB_PARAMS));
        params
    }
}

/// One product feed line of a conversion
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversionItem {
    pub order_id: Option<String>,
    pub sku: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
}

/// Options for a conversion request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub tracking_domain: Option<String>,
    pub click_id: Option<String>,
    /// 1 confirmed, 2 pending, 3 decline, 5 hold
    pub status: Option<String>,
    pub offer_id: Option<String>,
    pub secure: Option<String>,
    pub comment: Option<String>,
    pub action_id: Option<String>,
    pub sum: Option<String>,
    pub goal: Option<String>,
    pub promo_code: Option<String>,
    pub order_sum: Option<String>,
    pub order_currency: Option<String>,
    pub user_id: Option<String>,
    /// `custom_field1` .. `custom_field15`, keyed by number
    pub custom_field: BTreeMap<u8, String>,
    pub items: Vec<ConversionItem>,
}

impl ConversionOptions {
    /// Parameters as `(query name, value)`; `click_id` is passed in
    /// separately because it may come from the ledger
    pub(crate) fn params<'a>(&'a self, click_id: Option<&'a str>) -> Vec<(String, &'a str)> {
        let fixed = [
            ("afclick", click_id),
            ("afstatus", self.status.as_deref()),
            ("offer_id", self.offer_id.as_deref()),
            ("afsecure", self.secure.as_deref()),
            ("afcomment", self.comment.as_deref()),
            ("afid", self.action_id.as_deref()),
            ("afprice", self.sum.as_deref()),
            ("afgoal", self.goal.as_deref()),
            ("promo_code", self.promo_code.as_deref()),
            ("order_sum", self.order_sum.as_deref()),
            ("order_currency", self.order_currency.as_deref()),
            ("user_id", self.user_id.as_deref()),
        ];

        let mut params: Vec<(String, &str)> = fixed
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect();

        params.extend(numbered("custom_field", &self.custom_field, MAX_CUSTOM_FIELDS));

        for (i, item) in self.items.iter().enumerate() {
            let fields = [
                ("order_id", &item.order_id),
                ("sku", &item.sku),
                ("quantity", &item.quantity),
                ("price", &item.price),
            ];
            for (field, value) in fields {
                if let Some(value) = value.as_deref() {
                    params.push((format!("items[{}][{}]", i, field), value));
                }
            }
        }

        params
    }
}

fn numbered<'a>(
    prefix: &'a str,
    values: &'a BTreeMap<u8, String>,
    max: u8,
) -> impl Iterator<Item = (String, &'a str)> + 'a {
    values
        .iter()
        .filter(move |(n, _)| (1..=max).contains(*n))
        .map(move |(n, value)| (format!("{}{}", prefix, n), value.as_str()))
}

//! DefiLlama API Client
//!
//! Serves two roles: the protocol directory (name -> slug) and the TVL source.
//!
//! API:
//! - `GET {base}/protocols` - every listed protocol (cached)
//! - `GET {base}/protocol/{slug}` - detail with per-chain TVL and history
//!
//! Free, no API key required

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::http::HttpFetcher;
use super::{ProtocolDirectory, TvlSource};
use crate::models::types::TvlData;
use crate::utils::cache::TtlCache;
use crate::utils::constants::{DEFAULT_CACHE_TTL_SECS, SECONDS_PER_DAY};

const DIRECTORY_KEY: &str = "protocols";

/// Derived TVL buckets reported next to real chains; excluded from totals
const DERIVED_TVL_KEYS: &[&str] = &[
    "borrowed",
    "staking",
    "pool2",
    "vesting",
    "offers",
    "treasury",
    "doublecounted",
    "liquidstaking",
    "dcandlsoverlap",
];

/// One row of `/protocols`
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolListing {
    pub name: String,
    pub slug: String,
}

/// `/protocol/{slug}` response (only the fields we score)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetail {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub current_chain_tvls: HashMap<String, f64>,
    #[serde(default)]
    pub tvl: Vec<TvlPoint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvlPoint {
    /// Unix seconds
    pub date: i64,
    #[serde(rename = "totalLiquidityUSD")]
    pub total_liquidity_usd: f64,
}

pub struct DefiLlamaClient {
    base_url: String,
    http: HttpFetcher,
    directory: TtlCache<Arc<Vec<ProtocolListing>>>,
    details: TtlCache<TvlData>,
}

impl DefiLlamaClient {
    pub fn new(base_url: &str, http: HttpFetcher) -> Self {
        let ttl = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            directory: TtlCache::with_ttl(ttl),
            details: TtlCache::with_ttl(ttl),
        }
    }

    async fn listings(&self) -> Option<Arc<Vec<ProtocolListing>>> {
        if let Some(cached) = self.directory.get(DIRECTORY_KEY) {
            return Some(cached);
        }

        let url = format!("{}/protocols", self.base_url);
        match self.http.get_json::<Vec<ProtocolListing>>(&url, &[], None).await {
            Ok(list) => {
                info!("📚 DefiLlama directory loaded: {} protocols", list.len());
                let list = Arc::new(list);
                self.directory.set(DIRECTORY_KEY, list.clone());
                Some(list)
            }
            Err(e) => {
                warn!(error = %e, "⚠️ DefiLlama directory unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl ProtocolDirectory for DefiLlamaClient {
    async fn resolve_protocol_slug(&self, name: &str) -> Option<String> {
        let listings = self.listings().await?;
        let slug = match_listing(&listings, name);
        if slug.is_none() {
            debug!(name = %name, "No DefiLlama listing matches");
        }
        slug
    }

    fn source_name(&self) -> &'static str {
        "defillama"
    }
}

#[async_trait]
impl TvlSource for DefiLlamaClient {
    async fn get_tvl(&self, slug: &str) -> Option<TvlData> {
        if let Some(cached) = self.details.get(slug) {
            return Some(cached);
        }

        let url = format!("{}/protocol/{}", self.base_url, slug);
        let detail = match self.http.get_json::<ProtocolDetail>(&url, &[], None).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(slug = %slug, error = %e, "⚠️ DefiLlama TVL unavailable");
                return None;
            }
        };

        let data = tvl_from_detail(detail)?;
        self.details.set(slug, data.clone());
        Some(data)
    }

    fn source_name(&self) -> &'static str {
        "defillama"
    }
}

/// Slug match, then case-insensitive name, then hyphenated name
pub fn match_listing(listings: &[ProtocolListing], name: &str) -> Option<String> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    let hyphenated = wanted.split_whitespace().collect::<Vec<_>>().join("-");

    listings
        .iter()
        .find(|p| p.slug.eq_ignore_ascii_case(&wanted))
        .or_else(|| listings.iter().find(|p| p.name.to_lowercase() == wanted))
        .or_else(|| listings.iter().find(|p| p.slug.eq_ignore_ascii_case(&hyphenated)))
        .map(|p| p.slug.clone())
}

fn is_real_chain_key(key: &str) -> bool {
    !key.contains('-') && !DERIVED_TVL_KEYS.contains(&key.to_lowercase().as_str())
}

/// Percent change between the last point and the one at or before `days` earlier
pub fn change_over_days(history: &[TvlPoint], days: i64) -> f64 {
    let Some(last) = history.last() else {
        return 0.0;
    };
    let target = last.date - days * SECONDS_PER_DAY;
    let previous = history.iter().rev().find(|p| p.date <= target);

    match previous {
        Some(prev) if prev.total_liquidity_usd > 0.0 => {
            (last.total_liquidity_usd - prev.total_liquidity_usd) / prev.total_liquidity_usd
                * 100.0
        }
        _ => 0.0,
    }
}

/// Convert a detail response to a TVL record; `None` when there is no TVL at all
pub fn tvl_from_detail(detail: ProtocolDetail) -> Option<TvlData> {
    let chain_tvls: HashMap<String, f64> = detail
        .current_chain_tvls
        .into_iter()
        .filter(|(k, v)| is_real_chain_key(k) && v.is_finite())
        .collect();

    let tvl = if chain_tvls.is_empty() {
        detail.tvl.last()?.total_liquidity_usd
    } else {
        chain_tvls.values().sum()
    };

    Some(TvlData {
        protocol_name: detail.name,
        tvl,
        tvl_change_24h: change_over_days(&detail.tvl, 1),
        tvl_change_7d: change_over_days(&detail.tvl, 7),
        chain_tvls,
        category: detail.category.unwrap_or_default(),
        chains: detail.chains,
    })
}

//! Ethplorer client (holder analytics, Ethereum mainnet only)
//!
//! - `GET {base}/getTokenInfo/{address}` - holder count and 24h price move
//! - `GET {base}/getTopTokenHolders/{address}?limit=10` - whale concentration

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::http::HttpFetcher;
use super::OnChainAnalytics;
use crate::models::types::OnChainBehavior;
use crate::utils::constants::{ABNORMAL_PRICE_MOVE_PERCENT, TOP_HOLDER_COUNT};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenInfo {
    #[serde(default)]
    holders_count: u64,
    /// Object when priced, `false` otherwise
    #[serde(default)]
    price: Value,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TopHolders {
    #[serde(default)]
    holders: Vec<Holder>,
}

#[derive(Debug, Deserialize)]
struct Holder {
    /// Percent of supply
    #[serde(default)]
    share: f64,
}

pub struct EthplorerClient {
    base_url: String,
    api_key: String,
    http: HttpFetcher,
}

impl EthplorerClient {
    pub fn new(base_url: &str, api_key: &str, http: HttpFetcher) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    fn supports(chain: &str) -> bool {
        matches!(chain.to_lowercase().as_str(), "ethereum" | "eth" | "mainnet")
    }
}

#[async_trait]
impl OnChainAnalytics for EthplorerClient {
    async fn get_onchain_behavior(&self, address: &str, chain: &str) -> Option<OnChainBehavior> {
        if !Self::supports(chain) {
            debug!(chain = %chain, "Ethplorer does not cover this chain");
            return None;
        }

        let info_url = format!("{}/getTokenInfo/{}", self.base_url, address);
        let info = match self
            .http
            .get_json::<TokenInfo>(&info_url, &[("apiKey", self.api_key.as_str())], None)
            .await
        {
            Ok(info) if info.error.is_none() => info,
            Ok(info) => {
                debug!(address = %address, error = ?info.error, "Ethplorer has no token info");
                return None;
            }
            Err(e) => {
                warn!(address = %address, error = %e, "⚠️ Ethplorer token info unavailable");
                return None;
            }
        };

        let limit = TOP_HOLDER_COUNT.to_string();
        let holders_url = format!("{}/getTopTokenHolders/{}", self.base_url, address);
        let holders = match self
            .http
            .get_json::<TopHolders>(
                &holders_url,
                &[("apiKey", self.api_key.as_str()), ("limit", limit.as_str())],
                None,
            )
            .await
        {
            Ok(h) => h,
            Err(e) => {
                warn!(address = %address, error = %e, "⚠️ Ethplorer top holders unavailable");
                return None;
            }
        };

        Some(OnChainBehavior {
            whale_concentration: whale_concentration(&holders.holders),
            unique_holders: info.holders_count,
            abnormal_activity: is_abnormal(&info.price),
        })
    }

    fn source_name(&self) -> &'static str {
        "ethplorer"
    }
}

fn whale_concentration(holders: &[Holder]) -> f64 {
    holders
        .iter()
        .take(TOP_HOLDER_COUNT)
        .map(|h| h.share.max(0.0))
        .sum::<f64>()
        .min(100.0)
}

/// A 24h price move of `ABNORMAL_PRICE_MOVE_PERCENT` or more either way
fn is_abnormal(price: &Value) -> bool {
    price
        .get("diff")
        .and_then(Value::as_f64)
        .map(|diff| diff.abs() >= ABNORMAL_PRICE_MOVE_PERCENT)
        .unwrap_or(false)
}

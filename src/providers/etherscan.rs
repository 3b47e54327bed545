//! Etherscan v2 client (contract explorer)
//!
//! - `module=contract&action=getsourcecode` - verification, name, proxy flags
//! - `module=account&action=txlist` (first tx, ascending) - deployment age
//! - `module=contract&action=getcontractcreation` - deployment age when the
//!   contract has no normal transactions (factory deployments)
//!
//! A contract whose deployment time cannot be found is reported as absent.
//!
//! Etherscan returns `result` as an array on success and as a string on
//! error, so responses are decoded as loose JSON.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::http::HttpFetcher;
use super::ContractExplorer;
use crate::core::resolver::normalize_address;
use crate::models::types::ContractInfo;
use crate::utils::constants::SECONDS_PER_DAY;

#[derive(Debug, Deserialize)]
struct EtherscanEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Value,
}

pub struct EtherscanClient {
    base_url: String,
    api_key: String,
    chain_id: String,
    http: HttpFetcher,
}

impl EtherscanClient {
    pub fn new(base_url: &str, api_key: &str, chain_id: u64, http: HttpFetcher) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            chain_id: chain_id.to_string(),
            http,
        }
    }

    async fn call(&self, params: &[(&str, &str)]) -> Option<Value> {
        let mut query = vec![("chainid", self.chain_id.as_str()), ("apikey", self.api_key.as_str())];
        query.extend_from_slice(params);

        match self
            .http
            .get_json::<EtherscanEnvelope>(&self.base_url, &query, None)
            .await
        {
            Ok(envelope) if envelope.status == "1" => Some(envelope.result),
            Ok(envelope) => {
                debug!(result = %envelope.result, "Etherscan returned status 0");
                None
            }
            Err(e) => {
                warn!(error = %e, "⚠️ Etherscan request failed");
                None
            }
        }
    }

    /// First normal transaction, else the creation record
    async fn deployment_timestamp(&self, address: &str) -> Option<i64> {
        let first_tx = self
            .call(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("page", "1"),
                ("offset", "1"),
                ("sort", "asc"),
            ])
            .await;
        if let Some(ts) = first_tx.as_ref().and_then(first_tx_timestamp) {
            return Some(ts);
        }

        self.call(&[
            ("module", "contract"),
            ("action", "getcontractcreation"),
            ("contractaddresses", address),
        ])
        .await
        .as_ref()
        .and_then(creation_timestamp)
    }
}

#[async_trait]
impl ContractExplorer for EtherscanClient {
    async fn get_contract_info(&self, address: &str) -> Option<ContractInfo> {
        let source = self
            .call(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
            ])
            .await?;
        let Some(deployed_at) = self.deployment_timestamp(address).await else {
            debug!(address = %address, "No deployment time, contract info absent");
            return None;
        };

        parse_source_code(address, &source, age_in_days(deployed_at, Utc::now().timestamp()))
    }

    fn source_name(&self) -> &'static str {
        "etherscan"
    }
}

fn field<'a>(entry: &'a Value, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Build contract info from a `getsourcecode` result
pub fn parse_source_code(address: &str, result: &Value, age_in_days: u64) -> Option<ContractInfo> {
    let entry = result.as_array()?.first()?;

    let contract_name = Some(field(entry, "ContractName").trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let is_proxy = field(entry, "Proxy") == "1";
    let implementation_address = normalize_address(field(entry, "Implementation"));

    Some(ContractInfo {
        address: address.to_string(),
        is_verified: !field(entry, "SourceCode").trim().is_empty(),
        contract_name,
        age_in_days,
        is_proxy,
        implementation_address: if is_proxy { implementation_address } else { None },
    })
}

/// `timeStamp` of the first transaction in a `txlist` result
pub fn first_tx_timestamp(result: &Value) -> Option<i64> {
    result
        .as_array()?
        .first()?
        .get("timeStamp")?
        .as_str()?
        .parse()
        .ok()
}

/// `timestamp` of a `getcontractcreation` result
pub fn creation_timestamp(result: &Value) -> Option<i64> {
    result
        .as_array()?
        .first()?
        .get("timestamp")?
        .as_str()?
        .parse()
        .ok()
}

pub fn age_in_days(deployed_at: i64, now: i64) -> u64 {
    (now.saturating_sub(deployed_at).max(0) / SECONDS_PER_DAY) as u64
}

//! Providers Module - External Data Sources
//!
//! One collaborator interface per data dimension, plus real and
//! simulated implementations of each.
//!
//! Boundary contract: no method here returns an error. Network failures,
//! missing credentials and malformed upstream responses are logged inside
//! the implementation and surface as `None`.

pub mod audit;
pub mod defillama;
pub mod etherscan;
pub mod ethplorer;
pub mod http;
pub mod simulated;

pub use audit::AuditRegistryClient;
pub use defillama::DefiLlamaClient;
pub use etherscan::EtherscanClient;
pub use ethplorer::EthplorerClient;
pub use http::HttpFetcher;
pub use simulated::{
    SimulatedAuditRegistry, SimulatedDirectory, SimulatedExplorer, SimulatedOnChain,
    SimulatedTvlSource,
};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::models::config::ScannerConfig;
use crate::models::errors::AppResult;
use crate::models::types::{AuditData, ContractInfo, OnChainBehavior, TvlData};

/// Maps a free-text protocol name to a canonical slug
#[async_trait]
pub trait ProtocolDirectory: Send + Sync {
    async fn resolve_protocol_slug(&self, name: &str) -> Option<String>;

    fn source_name(&self) -> &'static str;
}

/// Total-value-locked history
#[async_trait]
pub trait TvlSource: Send + Sync {
    async fn get_tvl(&self, slug: &str) -> Option<TvlData>;

    fn source_name(&self) -> &'static str;
}

/// Audit / security registry
#[async_trait]
pub trait AuditRegistry: Send + Sync {
    async fn get_audit(&self, name_or_slug: &str) -> Option<AuditData>;

    fn source_name(&self) -> &'static str;
}

/// Contract explorer metadata
#[async_trait]
pub trait ContractExplorer: Send + Sync {
    async fn get_contract_info(&self, address: &str) -> Option<ContractInfo>;

    fn source_name(&self) -> &'static str;
}

/// Holder analytics
#[async_trait]
pub trait OnChainAnalytics: Send + Sync {
    async fn get_onchain_behavior(&self, address: &str, chain: &str) -> Option<OnChainBehavior>;

    fn source_name(&self) -> &'static str;
}

/// The collaborator set a scanner runs against
#[derive(Clone)]
pub struct Collectors {
    pub directory: Arc<dyn ProtocolDirectory>,
    pub tvl: Arc<dyn TvlSource>,
    pub audits: Arc<dyn AuditRegistry>,
    pub explorer: Arc<dyn ContractExplorer>,
    pub onchain: Arc<dyn OnChainAnalytics>,
}

impl Collectors {
    /// Deterministic offline data for every dimension
    pub fn simulated() -> Self {
        Self {
            directory: Arc::new(SimulatedDirectory),
            tvl: Arc::new(SimulatedTvlSource),
            audits: Arc::new(SimulatedAuditRegistry),
            explorer: Arc::new(SimulatedExplorer),
            onchain: Arc::new(SimulatedOnChain),
        }
    }

    /// Pick implementations once, at startup, from available capabilities.
    ///
    /// DefiLlama needs no key and is always real unless `simulate` is set.
    /// Keyed sources fall back to their simulated twin when the key is missing.
    pub fn from_config(config: &ScannerConfig) -> AppResult<Self> {
        if config.simulate {
            info!("🧪 Simulation mode: all collectors use simulated data");
            return Ok(Self::simulated());
        }

        let llama = Arc::new(DefiLlamaClient::new(
            &config.defillama.base_url,
            HttpFetcher::new("defillama", config.http_timeout, config.max_retries)?,
        ));

        let audits: Arc<dyn AuditRegistry> = match &config.audit_registry.api_key {
            Some(key) => Arc::new(AuditRegistryClient::new(
                &config.audit_registry.base_url,
                key,
                HttpFetcher::new("audit-registry", config.http_timeout, config.max_retries)?,
            )),
            None => Arc::new(SimulatedAuditRegistry),
        };

        let explorer: Arc<dyn ContractExplorer> = match &config.etherscan.api_key {
            Some(key) => Arc::new(EtherscanClient::new(
                &config.etherscan.base_url,
                key,
                config.explorer_chain_id,
                HttpFetcher::new("etherscan", config.http_timeout, config.max_retries)?,
            )),
            None => Arc::new(SimulatedExplorer),
        };

        let onchain: Arc<dyn OnChainAnalytics> = match &config.ethplorer.api_key {
            Some(key) => Arc::new(EthplorerClient::new(
                &config.ethplorer.base_url,
                key,
                HttpFetcher::new("ethplorer", config.http_timeout, config.max_retries)?,
            )),
            None => Arc::new(SimulatedOnChain),
        };

        let collectors = Self {
            directory: llama.clone(),
            tvl: llama,
            audits,
            explorer,
            onchain,
        };
        collectors.log_selection();
        Ok(collectors)
    }

    fn log_selection(&self) {
        info!(
            directory = self.directory.source_name(),
            tvl = self.tvl.source_name(),
            audits = self.audits.source_name(),
            explorer = self.explorer.source_name(),
            onchain = self.onchain.source_name(),
            "🔌 Collectors selected"
        );
    }
}

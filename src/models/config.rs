//! Configuration module for the protocol scanner
//!
//! All tunables come from environment variables with production defaults.
//! Scoring weights and band thresholds are static for the life of the
//! process; nothing here is adjusted at runtime.

use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_AUDIT_URL, DEFAULT_CHAIN, DEFAULT_CONTRACT_WEIGHT, DEFAULT_DEFILLAMA_URL,
    DEFAULT_ETHERSCAN_URL, DEFAULT_ETHPLORER_URL, DEFAULT_EXPLORER_CHAIN_ID,
    DEFAULT_HIGH_RISK_BELOW, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_MEDIUM_RISK_BELOW, DEFAULT_ONCHAIN_WEIGHT, DEFAULT_SCAN_TIMEOUT_SECS,
    DEFAULT_TEAM_WEIGHT, DEFAULT_TVL_WEIGHT, WEIGHT_SUM_TOLERANCE,
};

/// Composite score weights. Always non-negative and summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    contract: f64,
    tvl: f64,
    team: f64,
    onchain: f64,
}

impl RiskWeights {
    pub fn new(contract: f64, tvl: f64, team: f64, onchain: f64) -> AppResult<Self> {
        let all = [contract, tvl, team, onchain];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::invalid_weights(format!(
                "Weights must be non-negative, got {:?}",
                all
            )));
        }
        let sum: f64 = all.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::invalid_weights(format!(
                "Weights must sum to 1.0, got {:.6}",
                sum
            )));
        }
        Ok(Self {
            contract,
            tvl,
            team,
            onchain,
        })
    }

    /// Parse "contract,tvl,team,onchain"
    pub fn parse(raw: &str) -> AppResult<Self> {
        let parts: Vec<f64> = raw
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::invalid_weights(format!("Bad weight list '{}': {}", raw, e)))?;

        match parts.as_slice() {
            [c, t, team, o] => Self::new(*c, *t, *team, *o),
            _ => Err(AppError::invalid_weights(format!(
                "Expected 4 weights, got {}",
                parts.len()
            ))),
        }
    }

    pub fn contract(&self) -> f64 {
        self.contract
    }

    pub fn tvl(&self) -> f64 {
        self.tvl
    }

    pub fn team(&self) -> f64 {
        self.team
    }

    pub fn onchain(&self) -> f64 {
        self.onchain
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT_WEIGHT,
            tvl: DEFAULT_TVL_WEIGHT,
            team: DEFAULT_TEAM_WEIGHT,
            onchain: DEFAULT_ONCHAIN_WEIGHT,
        }
    }
}

/// Band thresholds: `score < high_below` is HIGH, `score < medium_below` is MEDIUM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskThresholds {
    high_below: u8,
    medium_below: u8,
}

impl RiskThresholds {
    pub fn new(high_below: u8, medium_below: u8) -> AppResult<Self> {
        if high_below > medium_below || medium_below > 100 {
            return Err(AppError::invalid_config(format!(
                "Invalid thresholds: high_below={} medium_below={}",
                high_below, medium_below
            )));
        }
        Ok(Self {
            high_below,
            medium_below,
        })
    }

    pub fn high_below(&self) -> u8 {
        self.high_below
    }

    pub fn medium_below(&self) -> u8 {
        self.medium_below
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_below: DEFAULT_HIGH_RISK_BELOW,
            medium_below: DEFAULT_MEDIUM_RISK_BELOW,
        }
    }
}

/// How the four fetch stages are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One stage at a time, in pipeline order
    #[default]
    Sequential,
    /// All four fetches joined, merged in pipeline order
    Concurrent,
}

impl FetchMode {
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "concurrent" | "parallel" => Ok(Self::Concurrent),
            other => Err(AppError::invalid_config(format!(
                "Unknown fetch mode: {}",
                other
            ))),
        }
    }
}

/// Endpoint + optional credential of one collaborator
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Endpoint {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub weights: RiskWeights,
    pub thresholds: RiskThresholds,
    pub fetch_mode: FetchMode,
    /// Chain passed to on-chain analytics
    pub default_chain: String,
    /// Deadline for a whole scan on the HTTP surface
    pub scan_timeout: Duration,
    /// Timeout for one collector HTTP request
    pub http_timeout: Duration,
    /// Attempts per collector request
    pub max_retries: u32,
    pub defillama: Endpoint,
    pub etherscan: Endpoint,
    pub explorer_chain_id: u64,
    pub ethplorer: Endpoint,
    pub audit_registry: Endpoint,
    /// Force every collaborator to its simulated implementation
    pub simulate: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            thresholds: RiskThresholds::default(),
            fetch_mode: FetchMode::default(),
            default_chain: DEFAULT_CHAIN.to_string(),
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            defillama: Endpoint::new(DEFAULT_DEFILLAMA_URL),
            etherscan: Endpoint::new(DEFAULT_ETHERSCAN_URL),
            explorer_chain_id: DEFAULT_EXPLORER_CHAIN_ID,
            ethplorer: Endpoint::new(DEFAULT_ETHPLORER_URL),
            audit_registry: Endpoint::new(DEFAULT_AUDIT_URL),
            simulate: false,
        }
    }
}

impl ScannerConfig {
    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, tests)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(raw) = get("SCANNER_WEIGHTS") {
            cfg.weights = RiskWeights::parse(&raw)?;
        }

        let high = match get("SCANNER_HIGH_BELOW") {
            Some(raw) => parse_num::<u8>("SCANNER_HIGH_BELOW", &raw)?,
            None => cfg.thresholds.high_below(),
        };
        let medium = match get("SCANNER_MEDIUM_BELOW") {
            Some(raw) => parse_num::<u8>("SCANNER_MEDIUM_BELOW", &raw)?,
            None => cfg.thresholds.medium_below(),
        };
        cfg.thresholds = RiskThresholds::new(high, medium)?;

        if let Some(raw) = get("SCANNER_FETCH_MODE") {
            cfg.fetch_mode = FetchMode::parse(&raw)?;
        }
        if let Some(chain) = get("SCANNER_DEFAULT_CHAIN") {
            cfg.default_chain = chain.to_lowercase();
        }
        if let Some(raw) = get("SCANNER_SCAN_TIMEOUT_SECS") {
            cfg.scan_timeout = Duration::from_secs(parse_num("SCANNER_SCAN_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("SCANNER_HTTP_TIMEOUT_SECS") {
            cfg.http_timeout = Duration::from_secs(parse_num("SCANNER_HTTP_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("SCANNER_MAX_RETRIES") {
            cfg.max_retries = parse_num::<u32>("SCANNER_MAX_RETRIES", &raw)?.max(1);
        }
        if let Some(raw) = get("SCANNER_SIMULATE") {
            cfg.simulate = matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(url) = get("DEFILLAMA_API_URL") {
            cfg.defillama = Endpoint::new(&url);
        }
        if let Some(url) = get("ETHERSCAN_API_URL") {
            cfg.etherscan = Endpoint::new(&url);
        }
        cfg.etherscan.api_key = get("ETHERSCAN_API_KEY").filter(|k| k != "YOUR_API_KEY");
        if let Some(raw) = get("ETHERSCAN_CHAIN_ID") {
            cfg.explorer_chain_id = parse_num("ETHERSCAN_CHAIN_ID", &raw)?;
        }
        if let Some(url) = get("ETHPLORER_API_URL") {
            cfg.ethplorer = Endpoint::new(&url);
        }
        cfg.ethplorer.api_key = get("ETHPLORER_API_KEY").filter(|k| k != "YOUR_API_KEY");
        if let Some(url) = get("AUDIT_API_URL") {
            cfg.audit_registry = Endpoint::new(&url);
        }
        cfg.audit_registry.api_key = get("AUDIT_API_KEY").filter(|k| k != "YOUR_API_KEY");

        cfg.log_summary();
        Ok(cfg)
    }

    /// Log effective configuration. Keys are never logged, only presence.
    fn log_summary(&self) {
        info!(
            fetch_mode = ?self.fetch_mode,
            default_chain = %self.default_chain,
            simulate = self.simulate,
            etherscan_key = if self.etherscan.has_key() { "configured" } else { "missing" },
            ethplorer_key = if self.ethplorer.has_key() { "configured" } else { "missing" },
            audit_key = if self.audit_registry.has_key() { "configured" } else { "missing" },
            "⚙️ Scanner configuration loaded"
        );
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::invalid_config(format!("{}='{}': {}", key, raw, e)))
}

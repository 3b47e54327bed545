//! Constants Module - Single Source of Truth
//!
//! Endpoints, scoring thresholds and defaults used across the scanner.
//! Other modules reference these instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

pub const APP_NAME: &str = "ProtocolScanner";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for collector HTTP requests
pub const USER_AGENT: &str = concat!("ProtocolScanner/", env!("CARGO_PKG_VERSION"));

// ============================================
// COLLECTOR DEFAULTS
// ============================================

pub const DEFAULT_DEFILLAMA_URL: &str = "https://api.llama.fi";
pub const DEFAULT_ETHERSCAN_URL: &str = "https://api.etherscan.io/v2/api";
pub const DEFAULT_ETHPLORER_URL: &str = "https://api.ethplorer.io";
pub const DEFAULT_AUDIT_URL: &str = "https://api.auditregistry.io/v1";

/// Ethereum mainnet chain id for the explorer
pub const DEFAULT_EXPLORER_CHAIN_ID: u64 = 1;

/// Chain name used for on-chain analytics when none is given
pub const DEFAULT_CHAIN: &str = "ethereum";

/// Timeout for a single collector HTTP request (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Retry attempts per collector request (including the first)
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const BASE_RETRY_MS: u64 = 250;
pub const MAX_RETRY_MS: u64 = 4_000;
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// Per-scan deadline for the HTTP surface (seconds)
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;

/// In-flight requests the HTTP surface admits at once
pub const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Directory list / protocol detail cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Number of holders summed for whale concentration
pub const TOP_HOLDER_COUNT: usize = 10;

/// |24h price move| at or above this percent marks abnormal activity
pub const ABNORMAL_PRICE_MOVE_PERCENT: f64 = 50.0;

pub const SECONDS_PER_DAY: i64 = 86_400;

// ============================================
// ADDRESS SHAPE
// ============================================

pub const ADDRESS_PREFIX: &str = "0x";

/// Hex digits after the prefix
pub const ADDRESS_HEX_LEN: usize = 40;

// ============================================
// SCORING CONSTANTS
// ============================================

pub const DEFAULT_CONTRACT_WEIGHT: f64 = 0.40;
pub const DEFAULT_TVL_WEIGHT: f64 = 0.30;
pub const DEFAULT_TEAM_WEIGHT: f64 = 0.15;
pub const DEFAULT_ONCHAIN_WEIGHT: f64 = 0.15;

/// Composite below this is HIGH risk
pub const DEFAULT_HIGH_RISK_BELOW: u8 = 50;
/// Composite below this (and not HIGH) is MEDIUM risk
pub const DEFAULT_MEDIUM_RISK_BELOW: u8 = 70;

/// Allowed drift when checking that weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// Defaults applied when a record is absent
pub const ABSENT_CONTRACT_SUBSCORE: f64 = 20.0;
pub const ABSENT_AUDIT_SUBSCORE: f64 = 10.0;
pub const ABSENT_TVL_SCORE: f64 = 30.0;
pub const ABSENT_TEAM_SCORE: f64 = 50.0;
pub const ABSENT_ONCHAIN_SCORE: f64 = 50.0;

pub const USD_BILLION: f64 = 1_000_000_000.0;
pub const USD_MILLION: f64 = 1_000_000.0;

/// Appended to every report summary
pub const DISCLAIMER: &str =
    "This assessment is automated and informational only; it is not financial advice.";

// ============================================
// WARNING CATEGORIES
// ============================================

pub const CATEGORY_CONTRACT: &str = "contract";
pub const CATEGORY_AUDIT: &str = "audit";
pub const CATEGORY_TVL: &str = "tvl";
pub const CATEGORY_TEAM: &str = "team";
pub const CATEGORY_ONCHAIN: &str = "onchain";
pub const CATEGORY_OVERALL: &str = "overall";

//! Protocol Scanner Library
//!
//! DeFi protocol safety scanner. A query (protocol name or contract
//! address) is resolved, four independent data sources are consulted, and
//! whatever came back is folded into one composite safety score with a
//! ranked warning list.
//!
//! - `core` - resolver, scan workflow, risk scorer, report text
//! - `providers` - collaborator interfaces with real and simulated sources
//! - `models` - data records, configuration, error codes
//! - `api` - HTTP surface over `Scanner::run_scan`

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::report::{render_text, summarize};
pub use crate::core::resolver::{resolve_query, QueryKind, ResolvedTarget};
pub use crate::core::risk_score::{calculate_risk_score, RiskScoreBuilder, RiskScorer};
pub use crate::core::workflow::{ScanStatus, Scanner, ScannerState, Stage, StageUpdate};
pub use models::config::{FetchMode, RiskThresholds, RiskWeights, ScannerConfig};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::*;
pub use providers::Collectors;
pub use utils::telemetry::{ScanStats, ScanTelemetry};

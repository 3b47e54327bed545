//! Type definitions for the protocol scanner
//! Every collected record, the scorer inputs and the final report.
//!
//! Collected records are either fully populated or absent: an `Option`
//! around the whole record, never optional fields standing in for a
//! failed lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Warning severity, ordered critical < warning < info for sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Sort rank (lower sorts first)
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::Warning => "🟠",
            Severity::Info => "🔵",
        }
    }
}

/// Risk band derived from the composite score.
///
/// Higher composite score means a SAFER protocol, so `Low` is the best band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟠",
            RiskLevel::Low => "✅",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Collected records
// ============================================

/// Total-value-locked snapshot for a protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvlData {
    pub protocol_name: String,
    /// Current TVL in USD
    pub tvl: f64,
    /// 24h change in percent
    pub tvl_change_24h: f64,
    /// 7d change in percent
    pub tvl_change_7d: f64,
    pub chain_tvls: HashMap<String, f64>,
    pub category: String,
    pub chains: Vec<String>,
}

/// Severity of an individual audit finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Critical,
    Major,
    Medium,
    Minor,
    Informational,
}

impl FindingSeverity {
    /// Critical and major findings penalize the audit score while unresolved
    pub fn is_blocking(&self) -> bool {
        matches!(self, FindingSeverity::Critical | FindingSeverity::Major)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Critical => "critical",
            FindingSeverity::Major => "major",
            FindingSeverity::Medium => "medium",
            FindingSeverity::Minor => "minor",
            FindingSeverity::Informational => "informational",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub severity: FindingSeverity,
    pub title: String,
    pub resolved: bool,
}

/// Audit / security registry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditData {
    pub is_audited: bool,
    pub auditor: Option<String>,
    pub audit_date: Option<String>,
    /// Registry security score (0-100)
    pub security_score: f64,
    pub findings: Vec<AuditFinding>,
    pub kyc_verified: bool,
}

impl AuditData {
    /// Findings that are critical/major and still open
    pub fn unresolved_blocking(&self) -> impl Iterator<Item = &AuditFinding> {
        self.findings
            .iter()
            .filter(|f| !f.resolved && f.severity.is_blocking())
    }
}

/// Contract explorer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub is_verified: bool,
    pub contract_name: Option<String>,
    pub age_in_days: u64,
    pub is_proxy: bool,
    pub implementation_address: Option<String>,
}

/// Holder analytics for the protocol token/contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainBehavior {
    /// Percent of supply held by the top 10 addresses (0-100)
    pub whale_concentration: f64,
    pub unique_holders: u64,
    pub abnormal_activity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub is_doxxed: bool,
    pub has_public_team: bool,
}

/// Everything the scorer may look at. Any subset may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInputs {
    pub tvl_data: Option<TvlData>,
    pub audit_data: Option<AuditData>,
    pub contract_info: Option<ContractInfo>,
    pub onchain_data: Option<OnChainBehavior>,
    pub team_info: Option<TeamInfo>,
}

// ============================================
// Scorer output
// ============================================

/// Component scores, each 0-100 (higher = safer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskComponents {
    pub contract_score: u8,
    pub tvl_score: u8,
    pub team_score: u8,
    pub onchain_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWarning {
    pub severity: Severity,
    pub message: String,
    pub category: String,
}

impl RiskWarning {
    pub fn new(severity: Severity, message: impl Into<String>, category: &str) -> Self {
        Self {
            severity,
            message: message.into(),
            category: category.to_string(),
        }
    }

    pub fn critical(message: impl Into<String>, category: &str) -> Self {
        Self::new(Severity::Critical, message, category)
    }

    pub fn warning(message: impl Into<String>, category: &str) -> Self {
        Self::new(Severity::Warning, message, category)
    }

    pub fn info(message: impl Into<String>, category: &str) -> Self {
        Self::new(Severity::Info, message, category)
    }
}

/// Final scan report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub protocol: String,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    pub components: RiskComponents,
    /// Sorted critical, warning, info; stable within a severity
    pub warnings: Vec<RiskWarning>,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl RiskReport {
    fn count(&self, severity: Severity) -> usize {
        self.warnings.iter().filter(|w| w.severity == severity).count()
    }

    pub fn critical_count(&self) -> usize {
        self.count(Severity::Critical)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    /// Equality ignoring the generation timestamp
    pub fn same_assessment(&self, other: &RiskReport) -> bool {
        self.protocol == other.protocol
            && self.overall_score == other.overall_score
            && self.risk_level == other.risk_level
            && self.components == other.components
            && self.warnings == other.warnings
            && self.summary == other.summary
    }
}

//! Risk Scoring Module
//!
//! Maps whatever data was collected to four 0-100 component scores, a
//! weighted composite, a risk band and a sorted warning list.
//!
//! Scores reward safety: 100 is the safest possible protocol. The band
//! names follow from that, so a composite below the HIGH threshold means
//! HIGH risk.
//!
//! Every function here is pure and total. Absent records fall back to a
//! fixed default plus an explicit warning (or, for team data, a
//! non-penalizing note).

use chrono::Utc;

use super::report::summarize;
use crate::models::config::{RiskThresholds, RiskWeights, ScannerConfig};
use crate::models::types::{
    AuditData, ContractInfo, OnChainBehavior, RiskComponents, RiskInputs, RiskLevel, RiskReport,
    RiskWarning, TeamInfo, TvlData,
};
use crate::utils::constants::{
    ABSENT_AUDIT_SUBSCORE, ABSENT_CONTRACT_SUBSCORE, ABSENT_ONCHAIN_SCORE, ABSENT_TEAM_SCORE,
    ABSENT_TVL_SCORE, CATEGORY_AUDIT, CATEGORY_CONTRACT, CATEGORY_ONCHAIN, CATEGORY_OVERALL,
    CATEGORY_TEAM, CATEGORY_TVL, USD_BILLION, USD_MILLION,
};

/// Fallback report name when no TVL record names the protocol
pub const UNKNOWN_PROTOCOL: &str = "Unknown Protocol";

/// One component's score plus the warnings it raised, in emission order
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentScore {
    pub score: u8,
    pub warnings: Vec<RiskWarning>,
}

#[inline]
fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

#[inline]
fn to_score(raw: f64) -> u8 {
    clamp_score(raw).round() as u8
}

// ============================================
// Contract / audit component
// ============================================

/// Age bonus tiers: <30d, 30-89d, 90-179d, 180-364d, >=365d
fn age_bonus(age_in_days: u64) -> f64 {
    match age_in_days {
        0..=29 => 0.0,
        30..=89 => 10.0,
        90..=179 => 20.0,
        180..=364 => 30.0,
        _ => 40.0,
    }
}

fn contract_subscore(contract: Option<&ContractInfo>, warnings: &mut Vec<RiskWarning>) -> f64 {
    let Some(info) = contract else {
        warnings.push(RiskWarning::warning(
            "Contract info unavailable",
            CATEGORY_CONTRACT,
        ));
        return ABSENT_CONTRACT_SUBSCORE;
    };

    let mut score = 0.0;

    if info.is_verified {
        score += 30.0;
    } else {
        warnings.push(RiskWarning::warning(
            "Contract source code is not verified",
            CATEGORY_CONTRACT,
        ));
    }

    score += age_bonus(info.age_in_days);
    if info.age_in_days < 30 {
        warnings.push(RiskWarning::warning(
            format!(
                "Contract deployed less than 30 days ago ({} days)",
                info.age_in_days
            ),
            CATEGORY_CONTRACT,
        ));
    }

    if info.is_proxy {
        score -= 5.0;
        warnings.push(RiskWarning::info(
            "Contract is an upgradeable proxy",
            CATEGORY_CONTRACT,
        ));
    }

    if info.contract_name.is_some() {
        score += 10.0;
    }

    clamp_score(score)
}

fn audit_subscore(audit: Option<&AuditData>, warnings: &mut Vec<RiskWarning>) -> f64 {
    let Some(audit) = audit else {
        warnings.push(RiskWarning::critical(
            "No audit information found",
            CATEGORY_AUDIT,
        ));
        return ABSENT_AUDIT_SUBSCORE;
    };

    let mut score = 0.0;

    if audit.is_audited {
        score += 40.0;
    } else {
        warnings.push(RiskWarning::critical(
            "Protocol has NOT been audited",
            CATEGORY_AUDIT,
        ));
    }

    // Up to 40 points proportional to the registry score
    score += clamp_score(audit.security_score) / 100.0 * 40.0;

    if audit.kyc_verified {
        score += 10.0;
    }

    for finding in audit.unresolved_blocking() {
        score -= 10.0;
        warnings.push(RiskWarning::critical(
            format!(
                "Unresolved {} finding: {}",
                finding.severity.as_str(),
                finding.title
            ),
            CATEGORY_AUDIT,
        ));
    }

    clamp_score(score)
}

/// Average of the contract and audit sub-scores
pub fn contract_component(
    contract: Option<&ContractInfo>,
    audit: Option<&AuditData>,
) -> ComponentScore {
    let mut warnings = Vec::new();
    let contract_part = contract_subscore(contract, &mut warnings);
    let audit_part = audit_subscore(audit, &mut warnings);

    ComponentScore {
        score: to_score((contract_part + audit_part) / 2.0),
        warnings,
    }
}

// ============================================
// TVL component
// ============================================

fn tvl_size_bonus(tvl: f64) -> Option<f64> {
    if tvl >= USD_BILLION {
        Some(30.0)
    } else if tvl >= 100.0 * USD_MILLION {
        Some(25.0)
    } else if tvl >= 10.0 * USD_MILLION {
        Some(15.0)
    } else if tvl >= USD_MILLION {
        Some(5.0)
    } else {
        None
    }
}

pub fn tvl_component(tvl: Option<&TvlData>) -> ComponentScore {
    let mut warnings = Vec::new();

    let Some(data) = tvl else {
        warnings.push(RiskWarning::warning("Unable to fetch TVL data", CATEGORY_TVL));
        return ComponentScore {
            score: to_score(ABSENT_TVL_SCORE),
            warnings,
        };
    };

    let mut score = 50.0;

    match tvl_size_bonus(data.tvl) {
        Some(bonus) => score += bonus,
        None => warnings.push(RiskWarning::warning(
            format!("Low TVL: ${:.2}M", data.tvl / USD_MILLION),
            CATEGORY_TVL,
        )),
    }

    if data.tvl_change_24h < -20.0 {
        score -= 20.0;
        warnings.push(RiskWarning::critical(
            format!("Severe TVL drop: {:.1}% in 24h", data.tvl_change_24h),
            CATEGORY_TVL,
        ));
    } else if data.tvl_change_24h < -10.0 {
        score -= 10.0;
        warnings.push(RiskWarning::warning(
            format!("TVL dropped {:.1}% in 24h", data.tvl_change_24h),
            CATEGORY_TVL,
        ));
    }

    if data.tvl_change_7d < -30.0 {
        score -= 15.0;
        warnings.push(RiskWarning::critical(
            format!("TVL dropped {:.1}% over 7 days", data.tvl_change_7d),
            CATEGORY_TVL,
        ));
    }

    let chain_count = data.chains.len();
    if chain_count >= 5 {
        score += 10.0;
    } else if chain_count >= 3 {
        score += 5.0;
    }

    ComponentScore {
        score: to_score(score),
        warnings,
    }
}

// ============================================
// Team component
// ============================================

pub fn team_component(team: Option<&TeamInfo>) -> ComponentScore {
    let mut warnings = Vec::new();

    let Some(team) = team else {
        warnings.push(RiskWarning::info(
            "Team information not available",
            CATEGORY_TEAM,
        ));
        return ComponentScore {
            score: to_score(ABSENT_TEAM_SCORE),
            warnings,
        };
    };

    // Anonymous baseline
    let mut score = 30.0;

    if team.is_doxxed {
        score += 50.0;
    } else {
        warnings.push(RiskWarning::warning("Team is anonymous", CATEGORY_TEAM));
    }

    if team.has_public_team {
        score += 20.0;
    }

    ComponentScore {
        score: to_score(score),
        warnings,
    }
}

// ============================================
// On-chain component
// ============================================

pub fn onchain_component(onchain: Option<&OnChainBehavior>) -> ComponentScore {
    let mut warnings = Vec::new();

    let Some(data) = onchain else {
        warnings.push(RiskWarning::info(
            "On-chain behavior data not available",
            CATEGORY_ONCHAIN,
        ));
        return ComponentScore {
            score: to_score(ABSENT_ONCHAIN_SCORE),
            warnings,
        };
    };

    let mut score = 70.0;
    let whales = data.whale_concentration;

    if whales > 80.0 {
        score -= 40.0;
        warnings.push(RiskWarning::critical(
            format!(
                "Extreme whale concentration: top 10 addresses hold {:.1}%",
                whales
            ),
            CATEGORY_ONCHAIN,
        ));
    } else if whales > 60.0 {
        score -= 20.0;
        warnings.push(RiskWarning::warning(
            format!(
                "High whale concentration: top 10 addresses hold {:.1}%",
                whales
            ),
            CATEGORY_ONCHAIN,
        ));
    } else if whales > 40.0 {
        score -= 10.0;
    }

    if data.unique_holders >= 10_000 {
        score += 15.0;
    } else if data.unique_holders >= 1_000 {
        score += 10.0;
    } else if data.unique_holders < 100 {
        score -= 10.0;
        warnings.push(RiskWarning::warning(
            format!("Very few holders: {}", data.unique_holders),
            CATEGORY_ONCHAIN,
        ));
    }

    if data.abnormal_activity {
        score -= 20.0;
        warnings.push(RiskWarning::critical(
            "Abnormal on-chain activity detected",
            CATEGORY_ONCHAIN,
        ));
    }

    ComponentScore {
        score: to_score(score),
        warnings,
    }
}

// ============================================
// Composite
// ============================================

/// Weighted composite scorer with fixed band thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    weights: RiskWeights,
    thresholds: RiskThresholds,
}

impl RiskScorer {
    pub fn new(weights: RiskWeights, thresholds: RiskThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.weights, config.thresholds)
    }

    /// `round(sum(component * weight))`, clamped to 0-100
    pub fn composite(&self, components: &RiskComponents) -> u8 {
        let w = &self.weights;
        let total = components.contract_score as f64 * w.contract()
            + components.tvl_score as f64 * w.tvl()
            + components.team_score as f64 * w.team()
            + components.onchain_score as f64 * w.onchain();
        to_score(total)
    }

    pub fn level(&self, overall_score: u8) -> RiskLevel {
        if overall_score < self.thresholds.high_below() {
            RiskLevel::High
        } else if overall_score < self.thresholds.medium_below() {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Score inputs, naming the report after the TVL record when present
    pub fn calculate(&self, inputs: &RiskInputs) -> RiskReport {
        let name = inputs
            .tvl_data
            .as_ref()
            .map(|t| t.protocol_name.as_str())
            .unwrap_or(UNKNOWN_PROTOCOL);
        self.calculate_named(name, inputs)
    }

    pub fn calculate_named(&self, protocol: &str, inputs: &RiskInputs) -> RiskReport {
        let contract = contract_component(inputs.contract_info.as_ref(), inputs.audit_data.as_ref());
        let tvl = tvl_component(inputs.tvl_data.as_ref());
        let team = team_component(inputs.team_info.as_ref());
        let onchain = onchain_component(inputs.onchain_data.as_ref());

        let components = RiskComponents {
            contract_score: contract.score,
            tvl_score: tvl.score,
            team_score: team.score,
            onchain_score: onchain.score,
        };

        let overall_score = self.composite(&components);
        let risk_level = self.level(overall_score);

        let mut warnings: Vec<RiskWarning> = [contract, tvl, team, onchain]
            .into_iter()
            .flat_map(|c| c.warnings)
            .collect();

        if risk_level == RiskLevel::High {
            warnings.push(RiskWarning::critical(
                "Overall risk score indicates high risk",
                CATEGORY_OVERALL,
            ));
        }

        // Stable: emission order survives within a severity
        warnings.sort_by_key(|w| w.severity.rank());

        let report = RiskReport {
            protocol: protocol.to_string(),
            overall_score,
            risk_level,
            components,
            warnings,
            summary: String::new(),
            timestamp: Utc::now(),
        };

        let summary = summarize(
            report.overall_score,
            report.risk_level,
            report.critical_count(),
            report.warning_count(),
        );

        RiskReport { summary, ..report }
    }
}

/// Score with the default weights and thresholds
pub fn calculate_risk_score(inputs: &RiskInputs) -> RiskReport {
    RiskScorer::default().calculate(inputs)
}

/// Builder for assembling scorer inputs piece by piece
#[derive(Debug, Clone, Default)]
pub struct RiskScoreBuilder {
    inputs: RiskInputs,
    scorer: RiskScorer,
}

impl RiskScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scorer(mut self, scorer: RiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_tvl(mut self, tvl: TvlData) -> Self {
        self.inputs.tvl_data = Some(tvl);
        self
    }

    pub fn with_audit(mut self, audit: AuditData) -> Self {
        self.inputs.audit_data = Some(audit);
        self
    }

    pub fn with_contract(mut self, contract: ContractInfo) -> Self {
        self.inputs.contract_info = Some(contract);
        self
    }

    pub fn with_onchain(mut self, onchain: OnChainBehavior) -> Self {
        self.inputs.onchain_data = Some(onchain);
        self
    }

    pub fn with_team(mut self, team: TeamInfo) -> Self {
        self.inputs.team_info = Some(team);
        self
    }

    pub fn build(self) -> RiskReport {
        self.scorer.calculate(&self.inputs)
    }
}

//! Report Formatter
//!
//! Deterministic text templating of a scored report. No free-form text.

use crate::models::types::{RiskLevel, RiskReport};
use crate::utils::constants::DISCLAIMER;

/// One-paragraph summary stored on every report
pub fn summarize(
    overall_score: u8,
    level: RiskLevel,
    critical_count: usize,
    warning_count: usize,
) -> String {
    format!(
        "Overall safety score: {}/100 ({} risk). Found {} critical issue(s) and {} warning(s). {}",
        overall_score,
        level.as_str(),
        critical_count,
        warning_count,
        DISCLAIMER
    )
}

/// Multi-line rendering for terminals
pub fn render_text(report: &RiskReport) -> String {
    let c = &report.components;
    let mut output = format!(
        "\n{} {} | Score: {}/100 | Risk: {}\n",
        report.risk_level.emoji(),
        report.protocol,
        report.overall_score,
        report.risk_level.as_str(),
    );
    output.push_str(&format!("   Contract/Audit: {:>3}\n", c.contract_score));
    output.push_str(&format!("   TVL:            {:>3}\n", c.tvl_score));
    output.push_str(&format!("   Team:           {:>3}\n", c.team_score));
    output.push_str(&format!("   On-chain:       {:>3}\n", c.onchain_score));

    if !report.warnings.is_empty() {
        output.push_str(&format!(
            "   Warnings ({} critical, {} warning, {} info):\n",
            report.critical_count(),
            report.warning_count(),
            report.info_count()
        ));
        for warning in &report.warnings {
            output.push_str(&format!(
                "     {} [{}] {} ({})\n",
                warning.severity.emoji(),
                warning.severity.as_str(),
                warning.message,
                warning.category
            ));
        }
    }

    output.push_str(&format!("   {}\n", report.summary));
    output.push_str(&format!("   Generated: {}\n", report.timestamp.to_rfc3339()));
    output
}

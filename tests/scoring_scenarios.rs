//! Scoring scenarios and properties through the public API

use protocol_scanner::{
    calculate_risk_score, AuditData, ContractInfo, OnChainBehavior, RiskInputs, RiskLevel,
    RiskScoreBuilder, Severity, TeamInfo, TvlData,
};
use std::collections::HashMap;

fn tvl(amount: f64, change_24h: f64, change_7d: f64, chains: usize) -> TvlData {
    TvlData {
        protocol_name: "Scenario".to_string(),
        tvl: amount,
        tvl_change_24h: change_24h,
        tvl_change_7d: change_7d,
        chain_tvls: HashMap::new(),
        category: "Lending".to_string(),
        chains: (0..chains).map(|i| format!("chain-{}", i)).collect(),
    }
}

fn healthy_contract() -> ContractInfo {
    ContractInfo {
        address: "0x7a250d5630b4cf539739df2c5dacb4c659f2488d".to_string(),
        is_verified: true,
        contract_name: Some("X".to_string()),
        age_in_days: 400,
        is_proxy: false,
        implementation_address: None,
    }
}

fn healthy_audit() -> AuditData {
    AuditData {
        is_audited: true,
        auditor: Some("Trail of Bits".to_string()),
        audit_date: Some("2024-01-15".to_string()),
        security_score: 90.0,
        findings: vec![],
        kyc_verified: true,
    }
}

fn onchain(whales: f64, holders: u64, abnormal: bool) -> OnChainBehavior {
    OnChainBehavior {
        whale_concentration: whales,
        unique_holders: holders,
        abnormal_activity: abnormal,
    }
}

fn has_message(inputs: &RiskInputs, message: &str) -> bool {
    calculate_risk_score(inputs)
        .warnings
        .iter()
        .any(|w| w.message == message)
}

/// Every present/absent combination of the four collected records
fn all_combinations() -> Vec<RiskInputs> {
    (0..16u8)
        .map(|mask| RiskInputs {
            tvl_data: (mask & 1 != 0).then(|| tvl(50_000_000.0, -12.0, -35.0, 3)),
            audit_data: (mask & 2 != 0).then(healthy_audit),
            contract_info: (mask & 4 != 0).then(healthy_contract),
            onchain_data: (mask & 8 != 0).then(|| onchain(85.0, 50, true)),
            team_info: None,
        })
        .collect()
}

#[test]
fn test_all_absent_scores_thirty_high() {
    let inputs = RiskInputs::default();
    let report = calculate_risk_score(&inputs);

    assert_eq!(report.components.contract_score, 15);
    assert_eq!(report.components.tvl_score, 30);
    assert_eq!(report.components.team_score, 50);
    assert_eq!(report.components.onchain_score, 50);
    assert_eq!(report.overall_score, 30);
    assert_eq!(report.risk_level, RiskLevel::High);

    for message in [
        "Contract info unavailable",
        "No audit information found",
        "Unable to fetch TVL data",
        "On-chain behavior data not available",
    ] {
        assert!(has_message(&inputs, message), "missing warning: {}", message);
    }
}

#[test]
fn test_strong_tvl_with_severe_drop() {
    let report = RiskScoreBuilder::new()
        .with_tvl(tvl(2_000_000_000.0, -25.0, -5.0, 5))
        .build();

    assert_eq!(report.components.tvl_score, 70);
    // 0.4*15 + 0.3*70 + 0.15*50 + 0.15*50
    assert_eq!(report.overall_score, 42);

    let drops: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.message.starts_with("Severe TVL drop"))
        .collect();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].severity, Severity::Critical);
    assert_eq!(drops[0].message, "Severe TVL drop: -25.0% in 24h");
}

#[test]
fn test_warnings_ordered_critical_warning_info() {
    let report = RiskScoreBuilder::new()
        .with_contract(healthy_contract())
        .with_audit(AuditData {
            security_score: 100.0,
            ..healthy_audit()
        })
        .with_tvl(tvl(2_000_000_000.0, 0.0, 0.0, 5))
        .with_onchain(onchain(65.0, 50_000, true))
        .build();

    assert_ne!(report.risk_level, RiskLevel::High);
    let severities: Vec<Severity> = report.warnings.iter().map(|w| w.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::Critical, Severity::Warning, Severity::Info]
    );
}

#[test]
fn test_audited_doxxed_healthy_protocol_is_low_risk() {
    let report = RiskScoreBuilder::new()
        .with_contract(healthy_contract())
        .with_audit(healthy_audit())
        .with_tvl(tvl(2_000_000_000.0, 1.0, 3.0, 6))
        .with_team(TeamInfo {
            is_doxxed: true,
            has_public_team: true,
        })
        .with_onchain(onchain(25.0, 40_000, false))
        .build();

    assert_eq!(report.components.contract_score, 83);
    assert_eq!(report.components.team_score, 100);
    assert_eq!(report.risk_level, RiskLevel::Low);
    assert_eq!(report.critical_count(), 0);
}

#[test]
fn test_overall_is_weighted_round_for_every_combination() {
    for inputs in all_combinations() {
        let report = calculate_risk_score(&inputs);
        let c = report.components;
        let expected = (0.4 * c.contract_score as f64
            + 0.3 * c.tvl_score as f64
            + 0.15 * c.team_score as f64
            + 0.15 * c.onchain_score as f64)
            .round() as u8;
        assert_eq!(report.overall_score, expected);
        assert!(report.overall_score <= 100);
    }
}

#[test]
fn test_level_follows_thresholds() {
    for inputs in all_combinations() {
        let report = calculate_risk_score(&inputs);
        let expected = match report.overall_score {
            0..=49 => RiskLevel::High,
            50..=69 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        };
        assert_eq!(report.risk_level, expected);
    }
}

#[test]
fn test_scoring_is_idempotent() {
    for inputs in all_combinations() {
        let a = calculate_risk_score(&inputs);
        let b = calculate_risk_score(&inputs);
        assert!(a.same_assessment(&b));
    }
}

#[test]
fn test_raising_tvl_never_lowers_tvl_score() {
    let amounts = [
        0.0,
        500_000.0,
        1_000_000.0,
        9_999_999.0,
        10_000_000.0,
        150_000_000.0,
        1_000_000_000.0,
        50_000_000_000.0,
    ];
    let mut previous = 0;
    for amount in amounts {
        let score = RiskScoreBuilder::new()
            .with_tvl(tvl(amount, -15.0, -40.0, 2))
            .build()
            .components
            .tvl_score;
        assert!(score >= previous, "tvl {} scored {} < {}", amount, score, previous);
        previous = score;
    }
}

#[test]
fn test_extreme_whale_concentration_is_always_critical() {
    for whales in [80.01, 85.0, 99.9, 100.0] {
        let report = RiskScoreBuilder::new()
            .with_onchain(onchain(whales, 20_000, false))
            .build();
        assert!(report.warnings.iter().any(|w| {
            w.severity == Severity::Critical && w.message.starts_with("Extreme whale concentration")
        }));
    }
}

#[test]
fn test_sorted_warnings_and_summary_counts() {
    for inputs in all_combinations() {
        let report = calculate_risk_score(&inputs);
        let ranks: Vec<u8> = report.warnings.iter().map(|w| w.severity.rank()).collect();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(report.summary.contains(&format!(
            "Found {} critical issue(s) and {} warning(s)",
            report.critical_count(),
            report.warning_count()
        )));
    }
}

#[test]
fn test_ties_keep_emission_order() {
    let report = calculate_risk_score(&RiskInputs::default());
    let messages: Vec<&str> = report.warnings.iter().map(|w| w.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "No audit information found",
            "Overall risk score indicates high risk",
            "Contract info unavailable",
            "Unable to fetch TVL data",
            "Team information not available",
            "On-chain behavior data not available",
        ]
    );

    // two criticals from different components stay in component order
    let report = RiskScoreBuilder::new()
        .with_contract(healthy_contract())
        .with_audit(healthy_audit())
        .with_tvl(tvl(2_000_000_000.0, -25.0, -5.0, 5))
        .with_onchain(onchain(90.0, 20_000, false))
        .build();
    let criticals: Vec<&str> = report
        .warnings
        .iter()
        .filter(|w| w.severity == Severity::Critical)
        .map(|w| w.message.as_str())
        .collect();
    assert_eq!(criticals.len(), 2);
    assert!(criticals[0].starts_with("Severe TVL drop"));
    assert!(criticals[1].starts_with("Extreme whale concentration"));
}

#[test]
fn test_report_serializes_camel_case() {
    let report = calculate_risk_score(&RiskInputs::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["overallScore"], 30);
    assert_eq!(json["riskLevel"], "HIGH");
    assert!(json["components"]["contractScore"].is_number());
    assert_eq!(json["warnings"][0]["severity"], "critical");
}

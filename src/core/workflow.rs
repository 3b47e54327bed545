//! Workflow Orchestrator
//!
//! Fixed pipeline: resolve -> fetch TVL -> fetch audit -> fetch contract ->
//! fetch on-chain -> analyze risk.
//!
//! Every stage produces a `StageUpdate` that is merged into an immutable
//! `ScannerState`. Resolution is the only stage that can fail. The fetch
//! stages take a `ResolvedTarget`, which only a successful resolve yields,
//! so a failed scan never reaches them.

use futures_util::future::join4;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::resolver::{resolve_query, ResolvedTarget};
use super::risk_score::RiskScorer;
use crate::models::config::{FetchMode, ScannerConfig};
use crate::models::types::{
    AuditData, ContractInfo, OnChainBehavior, RiskInputs, RiskReport, TvlData,
};
use crate::providers::Collectors;

/// Named pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolve,
    FetchTvl,
    FetchAudit,
    FetchContract,
    FetchOnchain,
    AnalyzeRisk,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::FetchTvl => "fetch_tvl",
            Stage::FetchAudit => "fetch_audit",
            Stage::FetchContract => "fetch_contract",
            Stage::FetchOnchain => "fetch_onchain",
            Stage::AnalyzeRisk => "analyze_risk",
        }
    }
}

/// Partial update returned by one stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageUpdate {
    Resolved(ResolvedTarget),
    Tvl(Option<TvlData>),
    Audit(Option<AuditData>),
    Contract(Option<ContractInfo>),
    Onchain(Option<OnChainBehavior>),
    Scored(RiskReport),
    /// Resolution failure
    Failed(String),
}

impl StageUpdate {
    pub fn stage(&self) -> Stage {
        match self {
            StageUpdate::Resolved(_) | StageUpdate::Failed(_) => Stage::Resolve,
            StageUpdate::Tvl(_) => Stage::FetchTvl,
            StageUpdate::Audit(_) => Stage::FetchAudit,
            StageUpdate::Contract(_) => Stage::FetchContract,
            StageUpdate::Onchain(_) => Stage::FetchOnchain,
            StageUpdate::Scored(_) => Stage::AnalyzeRisk,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanStatus {
    Running,
    Failed { error: String },
    Completed { report: RiskReport },
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Running)
    }
}

/// State carried through one scan. Created fresh per scan and never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerState {
    query: String,
    contract_address: Option<String>,
    protocol_slug: Option<String>,
    tvl_data: Option<TvlData>,
    audit_data: Option<AuditData>,
    contract_info: Option<ContractInfo>,
    onchain_data: Option<OnChainBehavior>,
    status: ScanStatus,
    stages: Vec<Stage>,
}

impl ScannerState {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            contract_address: None,
            protocol_slug: None,
            tvl_data: None,
            audit_data: None,
            contract_info: None,
            onchain_data: None,
            status: ScanStatus::Running,
            stages: Vec::new(),
        }
    }

    /// Merge one stage's update. A terminal state ignores every update.
    pub fn apply(mut self, update: StageUpdate) -> Self {
        if self.status.is_terminal() {
            return self;
        }
        self.stages.push(update.stage());

        match update {
            StageUpdate::Resolved(target) => {
                self.contract_address = target.contract_address;
                self.protocol_slug = target.protocol_slug;
            }
            StageUpdate::Tvl(data) => self.tvl_data = data,
            StageUpdate::Audit(data) => self.audit_data = data,
            StageUpdate::Contract(data) => self.contract_info = data,
            StageUpdate::Onchain(data) => self.onchain_data = data,
            StageUpdate::Scored(report) => self.status = ScanStatus::Completed { report },
            StageUpdate::Failed(error) => self.status = ScanStatus::Failed { error },
        }
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
    }

    pub fn protocol_slug(&self) -> Option<&str> {
        self.protocol_slug.as_deref()
    }

    pub fn tvl_data(&self) -> Option<&TvlData> {
        self.tvl_data.as_ref()
    }

    pub fn audit_data(&self) -> Option<&AuditData> {
        self.audit_data.as_ref()
    }

    pub fn contract_info(&self) -> Option<&ContractInfo> {
        self.contract_info.as_ref()
    }

    pub fn onchain_data(&self) -> Option<&OnChainBehavior> {
        self.onchain_data.as_ref()
    }

    pub fn status(&self) -> &ScanStatus {
        &self.status
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ScanStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn risk_report(&self) -> Option<&RiskReport> {
        match &self.status {
            ScanStatus::Completed { report } => Some(report),
            _ => None,
        }
    }

    /// Scorer inputs from the collected records. Team info is never collected.
    pub fn risk_inputs(&self) -> RiskInputs {
        RiskInputs {
            tvl_data: self.tvl_data.clone(),
            audit_data: self.audit_data.clone(),
            contract_info: self.contract_info.clone(),
            onchain_data: self.onchain_data.clone(),
            team_info: None,
        }
    }

    /// Report on success, error text on failure
    pub fn into_outcome(self) -> Result<RiskReport, String> {
        match self.status {
            ScanStatus::Completed { report } => Ok(report),
            ScanStatus::Failed { error } => Err(error),
            ScanStatus::Running => Err(format!("Scan of '{}' did not finish", self.query)),
        }
    }

    /// Equality ignoring the report timestamp
    pub fn same_outcome(&self, other: &ScannerState) -> bool {
        let reports_match = match (self.risk_report(), other.risk_report()) {
            (Some(a), Some(b)) => a.same_assessment(b),
            (None, None) => self.error() == other.error(),
            _ => false,
        };
        reports_match
            && self.query == other.query
            && self.contract_address == other.contract_address
            && self.protocol_slug == other.protocol_slug
            && self.risk_inputs() == other.risk_inputs()
            && self.stages == other.stages
    }
}

/// Runs scans against an injected collaborator set
#[derive(Clone)]
pub struct Scanner {
    collectors: Collectors,
    scorer: RiskScorer,
    fetch_mode: FetchMode,
    chain: String,
}

impl Scanner {
    pub fn new(collectors: Collectors, config: &ScannerConfig) -> Self {
        Self {
            collectors,
            scorer: RiskScorer::from_config(config),
            fetch_mode: config.fetch_mode,
            chain: config.default_chain.clone(),
        }
    }

    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    pub async fn run_scan(&self, query: &str, known_contract_address: Option<&str>) -> ScannerState {
        let span = info_span!("scan", scan_id = %Uuid::new_v4(), query = %query.trim());
        self.run_stages(query, known_contract_address)
            .instrument(span)
            .await
    }

    async fn run_stages(&self, query: &str, known_contract_address: Option<&str>) -> ScannerState {
        let state = ScannerState::new(query);

        let target = match resolve_query(
            query,
            known_contract_address,
            self.collectors.directory.as_ref(),
        )
        .await
        {
            Ok(target) => target,
            Err(e) => {
                warn!(stage = Stage::Resolve.as_str(), code = e.code_str(), "❌ {}", e.message);
                return state.apply(StageUpdate::Failed(e.message));
            }
        };
        let state = state.apply(StageUpdate::Resolved(target.clone()));

        let state = match self.fetch_mode {
            FetchMode::Sequential => {
                let state = state.apply(self.fetch_tvl(&target).await);
                let state = state.apply(self.fetch_audit(&target).await);
                let state = state.apply(self.fetch_contract(&target).await);
                state.apply(self.fetch_onchain(&target).await)
            }
            FetchMode::Concurrent => {
                let (tvl, audit, contract, onchain) = join4(
                    self.fetch_tvl(&target),
                    self.fetch_audit(&target),
                    self.fetch_contract(&target),
                    self.fetch_onchain(&target),
                )
                .await;
                [tvl, audit, contract, onchain]
                    .into_iter()
                    .fold(state, ScannerState::apply)
            }
        };

        let report = self.analyze(&state, &target);
        info!(
            stage = Stage::AnalyzeRisk.as_str(),
            score = report.overall_score,
            level = %report.risk_level,
            warnings = report.warnings.len(),
            "📊 Scan complete"
        );
        state.apply(StageUpdate::Scored(report))
    }

    async fn fetch_tvl(&self, target: &ResolvedTarget) -> StageUpdate {
        let data = match target.protocol_slug.as_deref() {
            Some(slug) => self.collectors.tvl.get_tvl(slug).await,
            None => None,
        };
        debug!(stage = Stage::FetchTvl.as_str(), found = data.is_some(), "stage done");
        StageUpdate::Tvl(data)
    }

    async fn fetch_audit(&self, target: &ResolvedTarget) -> StageUpdate {
        let data = match target.protocol_slug.as_deref() {
            Some(slug) => self.collectors.audits.get_audit(slug).await,
            None => None,
        };
        debug!(stage = Stage::FetchAudit.as_str(), found = data.is_some(), "stage done");
        StageUpdate::Audit(data)
    }

    async fn fetch_contract(&self, target: &ResolvedTarget) -> StageUpdate {
        let data = match target.contract_address.as_deref() {
            Some(address) => self.collectors.explorer.get_contract_info(address).await,
            None => None,
        };
        debug!(stage = Stage::FetchContract.as_str(), found = data.is_some(), "stage done");
        StageUpdate::Contract(data)
    }

    async fn fetch_onchain(&self, target: &ResolvedTarget) -> StageUpdate {
        let data = match target.contract_address.as_deref() {
            Some(address) => {
                self.collectors
                    .onchain
                    .get_onchain_behavior(address, &self.chain)
                    .await
            }
            None => None,
        };
        debug!(stage = Stage::FetchOnchain.as_str(), found = data.is_some(), "stage done");
        StageUpdate::Onchain(data)
    }

    /// TVL protocol name, else slug, else address, else the raw query
    fn analyze(&self, state: &ScannerState, target: &ResolvedTarget) -> RiskReport {
        let label = state
            .tvl_data()
            .map(|t| t.protocol_name.as_str())
            .or_else(|| target.label())
            .unwrap_or_else(|| state.query().trim());
        self.scorer.calculate_named(label, &state.risk_inputs())
    }
}

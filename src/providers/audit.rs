//! Audit registry client
//!
//! API: `GET {base}/audits/{slug}` with a bearer token.
//! A 404 means the registry has no record for the protocol.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::HttpFetcher;
use super::AuditRegistry;
use crate::models::errors::ErrorCode;
use crate::models::types::{AuditData, AuditFinding};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditRecord {
    #[serde(default)]
    audited: bool,
    #[serde(default)]
    auditor: Option<String>,
    #[serde(default)]
    audit_date: Option<String>,
    #[serde(default)]
    security_score: f64,
    #[serde(default)]
    kyc_verified: bool,
    #[serde(default)]
    findings: Vec<AuditFinding>,
}

impl From<AuditRecord> for AuditData {
    fn from(r: AuditRecord) -> Self {
        AuditData {
            is_audited: r.audited,
            auditor: r.auditor,
            audit_date: r.audit_date,
            security_score: r.security_score.clamp(0.0, 100.0),
            findings: r.findings,
            kyc_verified: r.kyc_verified,
        }
    }
}

pub struct AuditRegistryClient {
    base_url: String,
    api_key: String,
    http: HttpFetcher,
}

impl AuditRegistryClient {
    pub fn new(base_url: &str, api_key: &str, http: HttpFetcher) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }
}

#[async_trait]
impl AuditRegistry for AuditRegistryClient {
    async fn get_audit(&self, name_or_slug: &str) -> Option<AuditData> {
        let key = name_or_slug.trim().to_lowercase();
        let url = format!("{}/audits/{}", self.base_url, key);

        match self
            .http
            .get_json::<AuditRecord>(&url, &[], Some(&self.api_key))
            .await
        {
            Ok(record) => Some(record.into()),
            Err(e) if e.code == ErrorCode::CollectorNotFound => {
                debug!(protocol = %key, "No audit record");
                None
            }
            Err(e) => {
                warn!(protocol = %key, error = %e, "⚠️ Audit registry unavailable");
                None
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "audit-registry"
    }
}

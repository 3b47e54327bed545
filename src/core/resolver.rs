//! Input Resolver
//!
//! Classifies a raw query as a contract address or a protocol name and
//! maps names to a canonical directory slug.

use alloy_primitives::Address;
use std::str::FromStr;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::providers::ProtocolDirectory;
use crate::utils::constants::{ADDRESS_HEX_LEN, ADDRESS_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// Lowercased `0x` + 40 hex digits
    Address(String),
    /// Trimmed free text
    Name(String),
}

impl QueryKind {
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        match normalize_address(trimmed) {
            Some(address) => Self::Address(address),
            None => Self::Name(trimmed.to_string()),
        }
    }
}

/// Lowercased address if `raw` has the address shape
pub fn normalize_address(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() != ADDRESS_PREFIX.len() + ADDRESS_HEX_LEN {
        return None;
    }
    let (prefix, digits) = raw.split_at(ADDRESS_PREFIX.len());
    if !prefix.eq_ignore_ascii_case(ADDRESS_PREFIX) {
        return None;
    }
    hex::decode(digits).ok()?;
    Some(format!("{}{}", ADDRESS_PREFIX, digits.to_lowercase()))
}

/// EIP-55 rendering for display; falls back to the input
pub fn checksummed(address: &str) -> String {
    Address::from_str(address)
        .map(|a| a.to_checksum(None))
        .unwrap_or_else(|_| address.to_string())
}

/// Identifiers available to the fetch stages.
///
/// Only a successful resolve produces one, so holding a `ResolvedTarget`
/// proves the scan has not failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub contract_address: Option<String>,
    pub protocol_slug: Option<String>,
}

impl ResolvedTarget {
    /// Best human-readable label for the report
    pub fn label(&self) -> Option<&str> {
        self.protocol_slug
            .as_deref()
            .or(self.contract_address.as_deref())
    }
}

/// Resolve a query. Fails only when a name has no directory match.
pub async fn resolve_query(
    query: &str,
    known_contract_address: Option<&str>,
    directory: &dyn ProtocolDirectory,
) -> AppResult<ResolvedTarget> {
    match QueryKind::classify(query) {
        QueryKind::Address(address) => {
            info!(address = %checksummed(&address), "🔍 Query is a contract address");
            Ok(ResolvedTarget {
                contract_address: Some(address),
                protocol_slug: None,
            })
        }
        QueryKind::Name(name) if name.is_empty() => Err(AppError::invalid_query("Query is empty")),
        QueryKind::Name(name) => {
            let slug = directory
                .resolve_protocol_slug(&name)
                .await
                .ok_or_else(|| AppError::unresolved(&name))?;

            let contract_address = known_contract_address.and_then(|raw| {
                let normalized = normalize_address(raw);
                if normalized.is_none() {
                    warn!(address = %raw, "⚠️ Ignoring malformed contract address");
                }
                normalized
            });

            let display_address = contract_address.as_deref().map(checksummed);
            info!(
                query = %name,
                slug = %slug,
                address = display_address.as_deref().unwrap_or("-"),
                "✅ Resolved protocol"
            );
            Ok(ResolvedTarget {
                contract_address,
                protocol_slug: Some(slug),
            })
        }
    }
}

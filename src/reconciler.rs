//! Idempotent A-record reconciliation against the DNS provider.
//!
//! Each call is a fresh read-decide-write cycle: list the records for the name,
//! then create, update or leave alone. Nothing is cached between calls and
//! records are never deleted.

use std::{fmt, net::Ipv4Addr, str::FromStr, time::Duration};

use log::{debug, warn};
use thiserror::Error;

use crate::api::{ApiDnsRecord, ApiError, CloudflareClient, DnsApiClient, RecordBody, RecordType};

pub const DEFAULT_TTL: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDefaults {
    pub ttl: u32,
    pub proxied: bool,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            proxied: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub name: String,
    pub record_type: RecordType,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl DesiredRecord {
    pub fn a(
        name: impl Into<String>,
        content: impl Into<String>,
        defaults: RecordDefaults,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::A,
            content: content.into(),
            ttl: defaults.ttl,
            proxied: defaults.proxied,
        }
    }

    fn body(&self) -> RecordBody {
        RecordBody {
            r#type: self.record_type,
            name: self.name.clone(),
            content: self.content.clone(),
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordState {
    pub id: String,
    pub name: String,
    pub content: String,
}

impl From<ApiDnsRecord> for RecordState {
    fn from(record: ApiDnsRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            content: record.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Created(RecordState),
    Updated { record: RecordState, previous: String },
    Unchanged(RecordState),
}

impl Action {
    pub fn record(&self) -> &RecordState {
        match self {
            Action::Created(record) | Action::Unchanged(record) => record,
            Action::Updated { record, .. } => record,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Unchanged(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Query,
    Create,
    Update,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Stage::Query => "query",
            Stage::Create => "create",
            Stage::Update => "update",
        };
        f.write_str(stage)
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    #[error("failed to query existing records: {0}")]
    QueryFailed(#[source] ApiError),

    #[error("failed to create record: {0}")]
    CreateFailed(#[source] ApiError),

    #[error("failed to update record: {0}")]
    UpdateFailed(#[source] ApiError),

    #[error("{stage} request timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] ApiError),
}

impl ReconcileError {
    fn at(stage: Stage, err: ApiError) -> Self {
        match (stage, err) {
            (stage, ApiError::Timeout(after)) => ReconcileError::Timeout { stage, after },
            (Stage::Query, err) => ReconcileError::QueryFailed(err),
            (Stage::Create, err) => ReconcileError::CreateFailed(err),
            (Stage::Update, err) => ReconcileError::UpdateFailed(err),
        }
    }
}

/// Strict dotted-quad check: four decimal octets, each 0..=255, no leading zeros.
pub fn validate_ipv4(address: &str) -> Result<Ipv4Addr, ReconcileError> {
    let well_formed = address.split('.').count() == 4
        && address.split('.').all(|octet| {
            !octet.is_empty()
                && octet.bytes().all(|b| b.is_ascii_digit())
                && !(octet.len() > 1 && octet.starts_with('0'))
        });
    if !well_formed {
        return Err(ReconcileError::InvalidAddress(address.to_string()));
    }

    Ipv4Addr::from_str(address).map_err(|_| ReconcileError::InvalidAddress(address.to_string()))
}

#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
    zone_id: String,
    defaults: RecordDefaults,
}

impl<C: DnsApiClient> Reconciler<C> {
    pub fn new(client: C, zone_id: impl Into<String>, defaults: RecordDefaults) -> Self {
        Self {
            client,
            zone_id: zone_id.into(),
            defaults,
        }
    }

    pub fn defaults(&self) -> RecordDefaults {
        self.defaults
    }

    pub async fn reconcile(&self, name: &str, ip_address: &str) -> Result<Action, ReconcileError> {
        self.reconcile_record(&DesiredRecord::a(name, ip_address, self.defaults))
            .await
    }

    pub async fn reconcile_record(
        &self,
        desired: &DesiredRecord,
    ) -> Result<Action, ReconcileError> {
        validate_ipv4(&desired.content)?;

        let existing = self
            .client
            .list_records(&self.zone_id, &desired.name, desired.record_type)
            .await
            .map_err(|e| ReconcileError::at(Stage::Query, e))?;

        if existing.len() > 1 {
            warn!(
                "{} {} records found for {}; reconciling the first and leaving {} in place",
                existing.len(),
                desired.record_type,
                desired.name,
                existing.len() - 1
            );
        }

        let Some(current) = existing.into_iter().next() else {
            let created = self
                .client
                .create_record(&self.zone_id, &desired.body())
                .await
                .map_err(|e| ReconcileError::at(Stage::Create, e))?;
            return Ok(Action::Created(created.into()));
        };

        if current.content == desired.content {
            debug!("{} already points at {}", desired.name, desired.content);
            return Ok(Action::Unchanged(current.into()));
        }

        let previous = current.content;
        let updated = self
            .client
            .update_record(&self.zone_id, &current.id, &desired.body())
            .await
            .map_err(|e| ReconcileError::at(Stage::Update, e))?;

        Ok(Action::Updated {
            record: updated.into(),
            previous,
        })
    }
}

/// One-shot reconciliation with a default-timeout Cloudflare client.
pub async fn reconcile(
    credentials: &str,
    zone_id: &str,
    name: &str,
    ip_address: &str,
    ttl: u32,
    proxied: bool,
) -> Result<Action, ReconcileError> {
    validate_ipv4(ip_address)?;

    let client = CloudflareClient::new(credentials, crate::api::cloudflare::DEFAULT_TIMEOUT)
        .map_err(ReconcileError::Client)?;
    Reconciler::new(client, zone_id, RecordDefaults { ttl, proxied })
        .reconcile(name, ip_address)
        .await
}

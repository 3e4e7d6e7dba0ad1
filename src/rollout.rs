//! Drives the reconciler across a domain's worklist of subdomains.
//!
//! Every record is attempted even when an earlier one fails. The run as a whole
//! fails if any record failed, and an apex failure is called out separately.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use log::{error, info, warn};

use crate::api::DnsApiClient;
use crate::propagation::{Propagation, PropagationChecker};
use crate::reconciler::{Action, ReconcileError, Reconciler};

pub const APEX_LABEL: &str = "@";

pub const DEFAULT_SUBDOMAINS: &[&str] = &["www", "api", "worker", "data", "nodes", "auth", "docs"];

pub const DEFAULT_MONITORING_SUBDOMAINS: &[&str] =
    &["monitor", "grafana", "prometheus", "alertmanager", "status"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub label: String,
    pub name: String,
}

impl WorkItem {
    pub fn is_apex(&self) -> bool {
        self.label == APEX_LABEL
    }
}

/// Expands a label into a fully-qualified name under `domain`. `@` is the apex.
pub fn qualify(domain: &str, label: &str) -> String {
    let domain = domain.trim_end_matches('.').to_lowercase();
    let label = label.trim().trim_end_matches('.').to_lowercase();

    if label == APEX_LABEL || label.is_empty() || label == domain {
        domain
    } else if label.ends_with(&format!(".{}", domain)) {
        label
    } else {
        format!("{}.{}", label, domain)
    }
}

/// Builds the ordered worklist: apex first, then `subdomains`, then `monitoring`.
/// A name appearing twice is only kept the first time.
pub fn build_worklist<S: AsRef<str>>(
    domain: &str,
    subdomains: &[S],
    monitoring: Option<&[S]>,
) -> Vec<WorkItem> {
    let labels = std::iter::once(APEX_LABEL)
        .chain(subdomains.iter().map(|s| s.as_ref()))
        .chain(monitoring.unwrap_or_default().iter().map(|s| s.as_ref()));

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for label in labels {
        let name = qualify(domain, label);
        if !seen.insert(name.clone()) {
            continue;
        }
        let label = if name == qualify(domain, APEX_LABEL) {
            APEX_LABEL.to_string()
        } else {
            label.trim().to_lowercase()
        };
        items.push(WorkItem { label, name });
    }
    items
}

#[derive(Debug)]
pub struct RecordOutcome {
    pub item: WorkItem,
    pub result: Result<Action, ReconcileError>,
    pub propagation: Option<Propagation>,
}

#[derive(Debug, Default)]
pub struct RolloutReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl RolloutReport {
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn apex_failed(&self) -> bool {
        self.failures().any(|o| o.item.is_apex())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.result, Ok(action) if pred(action)))
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(|a| matches!(a, Action::Created(_)))
    }

    pub fn updated(&self) -> usize {
        self.count(|a| matches!(a, Action::Updated { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|a| matches!(a, Action::Unchanged(_)))
    }
}

pub struct Rollout<'a, C> {
    reconciler: &'a Reconciler<C>,
    address: String,
    concurrency: usize,
    checker: Option<PropagationChecker>,
}

impl<'a, C: DnsApiClient> Rollout<'a, C> {
    pub fn new(reconciler: &'a Reconciler<C>, address: impl Into<String>) -> Self {
        Self {
            reconciler,
            address: address.into(),
            concurrency: 1,
            checker: None,
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn verify_with(mut self, checker: PropagationChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Runs the worklist. Outcomes come back in worklist order regardless of
    /// concurrency. A name listed more than once is only reconciled the first
    /// time, so two read-decide-write cycles never overlap on one name.
    pub async fn run(&self, worklist: Vec<WorkItem>) -> RolloutReport {
        let mut seen = HashSet::new();
        let worklist: Vec<_> = worklist
            .into_iter()
            .filter(|item| {
                let first = seen.insert(item.name.clone());
                if !first {
                    warn!("Skipping repeated worklist entry for {}", item.name);
                }
                first
            })
            .collect();

        info!(
            "Reconciling {} A record(s) -> {}",
            worklist.len(),
            self.address
        );

        let outcomes = stream::iter(worklist)
            .map(|item| self.run_item(item))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = RolloutReport { outcomes };
        self.log_summary(&report);
        report
    }

    async fn run_item(&self, item: WorkItem) -> RecordOutcome {
        let result = self.reconciler.reconcile(&item.name, &self.address).await;
        log_outcome(&item, &result);

        let propagation = match (&result, &self.checker) {
            (Ok(action), Some(checker)) => {
                let propagation = checker.wait_for(&item.name, &action.record().content).await;
                match propagation {
                    Propagation::Confirmed { attempts } => {
                        info!("🌐 {} resolves publicly (attempt {})", item.name, attempts)
                    }
                    Propagation::Pending => {
                        warn!("⏳ {} has not propagated yet", item.name)
                    }
                }
                Some(propagation)
            }
            _ => None,
        };

        RecordOutcome {
            item,
            result,
            propagation,
        }
    }

    fn log_summary(&self, report: &RolloutReport) {
        let failed = report.failures().count();
        info!(
            "DNS summary: {} created, {} updated, {} unchanged, {} failed",
            report.created(),
            report.updated(),
            report.unchanged(),
            failed
        );
        if report.apex_failed() {
            error!(
                "Apex record failed; the domain itself will not resolve to {}",
                self.address
            );
        }
        for outcome in report.failures() {
            if let Err(e) = &outcome.result {
                error!("  {}: {}", outcome.item.name, e);
            }
        }
    }
}

fn log_outcome(item: &WorkItem, result: &Result<Action, ReconcileError>) {
    match result {
        Ok(Action::Created(record)) => {
            info!("✅ Created A {} -> {} (id {})", record.name, record.content, record.id)
        }
        Ok(Action::Updated { record, previous }) => info!(
            "🔄 Updated A {}: {} -> {} (id {})",
            record.name, previous, record.content, record.id
        ),
        Ok(Action::Unchanged(record)) => {
            info!("✔️ Unchanged A {} -> {}", record.name, record.content)
        }
        Err(e) => error!("❌ Failed A {}: {}", item.name, e),
    }
}

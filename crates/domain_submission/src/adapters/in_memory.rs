//! In-memory adapters
//!
//! `MockSubmissionAdapter` stands in for the payer API: it records what it
//! receives and synthesizes a reference number and status for each call.
//! State is guarded with `tokio::sync::RwLock` so the adapters can be shared
//! behind `Arc` like a remote adapter would be.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, OperationMetadata, PortError};
use crate::history::SubmissionStatus;
use crate::ports::{
    ComplianceReport, ComplianceValidator, Connectivity, OfflineQueue, SubmissionPayload,
    SubmissionPort, SubmissionResponse,
};

/// How the mock payer answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Accept every submission with the given status
    Accept(SubmissionStatus),
    /// Reject every payload as invalid
    RejectPayload(String),
    /// Behave as if the API were down
    Unavailable,
}

/// Payer API stand-in
#[derive(Debug)]
pub struct MockSubmissionAdapter {
    behavior: RwLock<MockBehavior>,
    sequence: AtomicU64,
    received: RwLock<Vec<SubmissionPayload>>,
}

impl Default for MockSubmissionAdapter {
    fn default() -> Self {
        Self::new(MockBehavior::Accept(SubmissionStatus::Pending))
    }
}

impl MockSubmissionAdapter {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: RwLock::new(behavior),
            sequence: AtomicU64::new(0),
            received: RwLock::new(Vec::new()),
        }
    }

    pub async fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.write().await = behavior;
    }

    /// Payloads accepted so far
    pub async fn received(&self) -> Vec<SubmissionPayload> {
        self.received.read().await.clone()
    }
}

impl DomainPort for MockSubmissionAdapter {}

#[async_trait]
impl SubmissionPort for MockSubmissionAdapter {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionResponse, PortError> {
        let behavior = self.behavior.read().await.clone();
        let correlation_id = metadata.and_then(|m| m.correlation_id);
        tracing::debug!(
            submission_id = %payload.submission_id,
            correlation_id = ?correlation_id,
            "mock payer received submission"
        );

        match behavior {
            MockBehavior::Accept(status) => {
                let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                let reference_number = format!(
                    "{}-{}-{:04}",
                    payload.kind.reference_prefix(),
                    payload.prepared_at.format("%Y%m%d"),
                    n
                );
                self.received.write().await.push(payload.clone());
                Ok(SubmissionResponse {
                    reference_number,
                    status,
                    message: Some("Submission received".to_string()),
                })
            }
            MockBehavior::RejectPayload(message) => Err(PortError::rejected(message)),
            MockBehavior::Unavailable => Err(PortError::unavailable("submission-api")),
        }
    }
}

/// Offline queue held in memory
#[derive(Debug, Default)]
pub struct InMemoryOfflineQueue {
    items: RwLock<VecDeque<SubmissionPayload>>,
}

impl InMemoryOfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryOfflineQueue {}

#[async_trait]
impl OfflineQueue for InMemoryOfflineQueue {
    async fn enqueue(&self, payload: SubmissionPayload) -> Result<(), PortError> {
        self.items.write().await.push_back(payload);
        Ok(())
    }

    async fn drain(&self) -> Result<Vec<SubmissionPayload>, PortError> {
        Ok(self.items.write().await.drain(..).collect())
    }

    async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}

/// Compliance validator that always returns the same report
#[derive(Debug, Clone)]
pub struct StaticComplianceValidator {
    report: ComplianceReport,
}

impl StaticComplianceValidator {
    pub fn new(report: ComplianceReport) -> Self {
        Self { report }
    }

    pub fn compliant() -> Self {
        Self::new(ComplianceReport::compliant())
    }
}

impl DomainPort for StaticComplianceValidator {}

#[async_trait]
impl ComplianceValidator for StaticComplianceValidator {
    async fn validate(&self, _payload: &SubmissionPayload) -> Result<ComplianceReport, PortError> {
        Ok(self.report.clone())
    }
}

/// Online/offline switch
#[derive(Debug)]
pub struct ConnectivityFlag(AtomicBool);

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        Self(AtomicBool::new(online))
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

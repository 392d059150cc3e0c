//! Ports to the collaborators a submission goes through
//!
//! The claims/authorization API, the offline queue and the compliance
//! validator live outside this workspace. The service only sees these
//! traits; `adapters` has in-memory implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, FormId, Money, OperationMetadata, PortError, SubmissionId};
use crate::checklist::FileMeta;
use crate::gate::GateCheck;
use crate::history::{SubmissionKind, SubmissionStatus};
use crate::service_line::ServiceLine;

/// A document attached to a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedDocument {
    pub id: String,
    pub name: String,
    pub file: Option<FileMeta>,
}

/// Everything sent to the payer for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub submission_id: SubmissionId,
    pub form_id: FormId,
    pub kind: SubmissionKind,
    pub documents: Vec<SubmittedDocument>,
    pub fields: BTreeMap<String, String>,
    pub service_lines: Vec<ServiceLine>,
    pub total_amount: Option<Money>,
    /// Checks the user confirmed past
    pub overridden_checks: Vec<GateCheck>,
    pub prepared_at: DateTime<Utc>,
}

/// The payer's answer to a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub reference_number: String,
    pub status: SubmissionStatus,
    pub message: Option<String>,
}

/// Result of the external compliance validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub is_compliant: bool,
    pub issues: Vec<String>,
}

impl ComplianceReport {
    pub fn compliant() -> Self {
        Self {
            is_compliant: true,
            issues: Vec::new(),
        }
    }

    pub fn with_issues(issues: Vec<String>) -> Self {
        Self {
            is_compliant: issues.is_empty(),
            issues,
        }
    }
}

/// The payer's claims/authorization submission API
#[async_trait]
pub trait SubmissionPort: DomainPort {
    /// Submits a payload and returns the payer's reference and status
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionResponse, PortError>;
}

/// Local store for submissions made while offline
#[async_trait]
pub trait OfflineQueue: DomainPort {
    async fn enqueue(&self, payload: SubmissionPayload) -> Result<(), PortError>;

    /// Removes and returns every queued payload, oldest first
    async fn drain(&self) -> Result<Vec<SubmissionPayload>, PortError>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Regulator compliance check, treated as a black box
#[async_trait]
pub trait ComplianceValidator: DomainPort {
    async fn validate(&self, payload: &SubmissionPayload) -> Result<ComplianceReport, PortError>;
}

/// Whether the submission API is currently reachable
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

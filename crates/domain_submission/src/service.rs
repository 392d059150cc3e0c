//! Submission service
//!
//! Orchestrates a submission from a completed form:
//!
//! 1. The form must be at 100% progress
//! 2. The [`SubmissionGate`] must clear it (with any user overrides)
//! 3. A payload is built and, if configured, shown to the compliance validator
//! 4. Online: the payload goes to the payer API. Offline: it is queued locally
//!    under an `OFF-` reference
//! 5. The result is appended to the history ledger and returned as a receipt
//!
//! Once the payer has accepted a payload the service does not fail the call.
//! A ledger write that fails afterwards is logged and reported on the receipt
//! or flush report instead.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use core_kernel::{OperationMetadata, SubmissionId, Timezone};
use crate::documentation::DocumentationLog;
use crate::error::SubmissionError;
use crate::form::SubmissionForm;
use crate::gate::{GateClearance, GateOverrides, SubmissionGate};
use crate::history::{StatusUpdate, SubmissionLedger, SubmissionRecord, SubmissionStatus};
use crate::license::LicenseRegistry;
use crate::ports::{
    ComplianceReport, ComplianceValidator, Connectivity, OfflineQueue, SubmissionPayload,
    SubmissionPort, SubmissionResponse, SubmittedDocument,
};

/// What the user sees after a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: SubmissionId,
    pub reference_number: String,
    pub status: SubmissionStatus,
    pub queued_offline: bool,
    pub clearance: GateClearance,
    pub compliance: Option<ComplianceReport>,
    pub message: Option<String>,
    /// False when the ledger refused the record after the payload left
    pub recorded: bool,
}

/// Result of pushing queued submissions to the payer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub sent: usize,
    /// Payloads put back on the queue after a failed send
    pub requeued: usize,
    /// Sent payloads the ledger could not record
    pub unrecorded: usize,
}

/// Runs submissions through the gate and the external ports
pub struct SubmissionService {
    submissions: Arc<dyn SubmissionPort>,
    queue: Arc<dyn OfflineQueue>,
    connectivity: Arc<dyn Connectivity>,
    compliance: Option<Arc<dyn ComplianceValidator>>,
    licenses: LicenseRegistry,
    documentation: DocumentationLog,
    ledger: SubmissionLedger,
    timezone: Timezone,
}

impl SubmissionService {
    pub fn new(
        submissions: Arc<dyn SubmissionPort>,
        queue: Arc<dyn OfflineQueue>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            submissions,
            queue,
            connectivity,
            compliance: None,
            licenses: LicenseRegistry::default(),
            documentation: DocumentationLog::default(),
            ledger: SubmissionLedger::default(),
            timezone: Timezone::default(),
        }
    }

    pub fn with_compliance(mut self, validator: Arc<dyn ComplianceValidator>) -> Self {
        self.compliance = Some(validator);
        self
    }

    pub fn with_licenses(mut self, licenses: LicenseRegistry) -> Self {
        self.licenses = licenses;
        self
    }

    pub fn with_documentation(mut self, documentation: DocumentationLog) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn with_ledger(mut self, ledger: SubmissionLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SubmissionLedger {
        &mut self.ledger
    }

    pub fn licenses(&self) -> &LicenseRegistry {
        &self.licenses
    }

    pub fn documentation_mut(&mut self) -> &mut DocumentationLog {
        &mut self.documentation
    }

    pub fn gate(&self) -> SubmissionGate<'_> {
        SubmissionGate::new(&self.licenses, &self.documentation)
    }

    /// Submits a form
    ///
    /// # Errors
    ///
    /// - `Incomplete` if the form is below 100%
    /// - `Rejected` with the first failing gate check
    /// - `Port` if the payer API or the offline queue fails
    pub async fn submit<F>(
        &mut self,
        form: &F,
        overrides: GateOverrides,
        submitted_by: Option<&str>,
    ) -> Result<SubmissionReceipt, SubmissionError>
    where
        F: SubmissionForm + ?Sized,
    {
        let progress = form.progress();
        if !progress.is_complete() {
            return Err(SubmissionError::Incomplete {
                percent: progress.percent(),
                missing: form.missing_items(),
            });
        }

        let now = Utc::now();
        let clearance = self
            .gate()
            .evaluate(form, overrides, self.timezone.local_date(now))
            .map_err(|rejection| {
                tracing::warn!(
                    form_id = %form.id(),
                    check = ?rejection.check(),
                    overridable = rejection.is_overridable(),
                    "submission blocked by gate"
                );
                rejection
            })?;

        let payload = build_payload(form, &clearance, now)?;
        let compliance = self.check_compliance(&payload).await;

        let mut metadata = OperationMetadata::for_submission(payload.submission_id)
            .with_context("kind", payload.kind.reference_prefix());
        if let Some(user) = submitted_by {
            metadata = metadata.initiated_by(user);
        }

        let (reference_number, status, message, queued_offline) = if self.connectivity.is_online() {
            let response = self.submissions.submit(&payload, Some(metadata)).await?;
            (response.reference_number, response.status, response.message, false)
        } else {
            let reference = format!("OFF-{}", payload.submission_id.short_code());
            self.queue.enqueue(payload.clone()).await?;
            (
                reference,
                SubmissionStatus::Pending,
                Some("Saved offline; will be sent when connectivity returns".to_string()),
                true,
            )
        };

        let record = SubmissionRecord::new(
            payload.submission_id,
            reference_number.clone(),
            payload.kind,
            now,
            status,
        )
        .with_comments(message.clone().unwrap_or_default())
        .with_amount(payload.total_amount)
        .queued_offline(queued_offline);
        let recorded = match self.ledger.append(record) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(
                    reference = %reference_number,
                    submission_id = %payload.submission_id,
                    error = %error,
                    "submission sent but not recorded in ledger"
                );
                false
            }
        };

        tracing::info!(
            reference = %reference_number,
            kind = ?payload.kind,
            status = ?status,
            queued_offline,
            overridden = clearance.overridden.len(),
            "submission recorded"
        );

        Ok(SubmissionReceipt {
            submission_id: payload.submission_id,
            reference_number,
            status,
            queued_offline,
            clearance,
            compliance,
            message,
            recorded,
        })
    }

    /// Sends queued offline submissions to the payer
    ///
    /// Does nothing while offline. Each sent submission keeps its `OFF-`
    /// reference in the ledger; the payer's status and reference are applied
    /// as a status update. A payload queued by another service instance has no
    /// ledger entry here and is recorded afresh. A failed send puts the
    /// remaining payloads back on the queue and returns the error.
    pub async fn flush_offline_queue(&mut self) -> Result<FlushReport, SubmissionError> {
        if !self.connectivity.is_online() {
            return Ok(FlushReport::default());
        }

        let pending = self.queue.drain().await?;
        let mut report = FlushReport::default();
        let mut remaining = pending.into_iter();

        while let Some(payload) = remaining.next() {
            let metadata = OperationMetadata::for_submission(payload.submission_id)
                .with_context("source", "offline-queue");
            match self.submissions.submit(&payload, Some(metadata)).await {
                Ok(response) => {
                    report.sent += 1;
                    if let Err(error) = self.record_synced(&payload, &response) {
                        tracing::error!(
                            submission_id = %payload.submission_id,
                            payer_reference = %response.reference_number,
                            error = %error,
                            "queued submission sent but not recorded in ledger"
                        );
                        report.unrecorded += 1;
                    }
                }
                Err(error) => {
                    self.queue.enqueue(payload).await?;
                    report.requeued += 1;
                    for rest in remaining {
                        self.queue.enqueue(rest).await?;
                        report.requeued += 1;
                    }
                    tracing::warn!(
                        sent = report.sent,
                        requeued = report.requeued,
                        error = %error,
                        "offline queue flush stopped"
                    );
                    return Err(error.into());
                }
            }
        }

        tracing::info!(
            sent = report.sent,
            unrecorded = report.unrecorded,
            "offline queue flushed"
        );
        Ok(report)
    }

    /// Applies the payer's answer to the ledger entry of a queued payload
    fn record_synced(
        &mut self,
        payload: &SubmissionPayload,
        response: &SubmissionResponse,
    ) -> Result<(), SubmissionError> {
        let comments = format!("Synced as {}", response.reference_number);
        let update = StatusUpdate::new(response.status).with_comments(comments.clone());
        let updated = self.ledger.update(payload.submission_id, update).map(|_| ());
        match updated {
            Err(SubmissionError::RecordNotFound(_)) => {
                let record = SubmissionRecord::new(
                    payload.submission_id,
                    format!("OFF-{}", payload.submission_id.short_code()),
                    payload.kind,
                    payload.prepared_at,
                    response.status,
                )
                .with_comments(comments)
                .with_amount(payload.total_amount)
                .queued_offline(true);
                self.ledger.append(record)
            }
            other => other,
        }
    }

    async fn check_compliance(&self, payload: &SubmissionPayload) -> Option<ComplianceReport> {
        let validator = self.compliance.as_ref()?;
        match validator.validate(payload).await {
            Ok(report) => {
                if !report.is_compliant {
                    tracing::warn!(
                        submission_id = %payload.submission_id,
                        issues = report.issues.len(),
                        "compliance validator reported issues"
                    );
                }
                Some(report)
            }
            Err(error) => {
                tracing::warn!(error = %error, "compliance validator unavailable");
                None
            }
        }
    }
}

fn build_payload<F>(
    form: &F,
    clearance: &GateClearance,
    now: chrono::DateTime<Utc>,
) -> Result<SubmissionPayload, SubmissionError>
where
    F: SubmissionForm + ?Sized,
{
    let documents = form
        .checklist()
        .uploaded()
        .map(|d| SubmittedDocument {
            id: d.id.clone(),
            name: d.name.clone(),
            file: d.file_meta.clone(),
        })
        .collect();

    let service_lines = form
        .service_lines()
        .map(|lines| lines.as_slice().to_vec())
        .unwrap_or_default();

    Ok(SubmissionPayload {
        submission_id: SubmissionId::new_v7(),
        form_id: form.id(),
        kind: form.kind(),
        documents,
        fields: form.fields().clone(),
        service_lines,
        total_amount: form.claimed_amount()?,
        overridden_checks: clearance.overridden_checks(),
        prepared_at: now,
    })
}

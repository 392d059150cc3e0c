//! Submission history ledger
//!
//! The ledger is append-only. Tracking updates and payment/denial/appeal
//! records replace an entry with an updated copy that only differs in
//! status, comments and reviewer; `id`, `reference_number` and
//! `submission_date` never change once appended.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, SubmissionId};
use crate::error::SubmissionError;

/// What was submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Claim,
    Authorization,
}

impl SubmissionKind {
    /// Prefix used on reference numbers
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            SubmissionKind::Claim => "CLM",
            SubmissionKind::Authorization => "PA",
        }
    }
}

/// Status of a submission as reported by the payer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    Pending,
    InReview,
    Approved,
    Paid,
    Rejected,
    AdditionalInfo,
    Returned,
    Partial,
}

impl SubmissionStatus {
    /// True once the payer has made a final decision
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Paid | SubmissionStatus::Rejected
        )
    }
}

/// One entry in the submission history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    id: SubmissionId,
    reference_number: String,
    kind: SubmissionKind,
    submission_date: DateTime<Utc>,
    status: SubmissionStatus,
    comments: String,
    reviewer: Option<String>,
    amount: Option<Money>,
    queued_offline: bool,
}

impl SubmissionRecord {
    pub fn new(
        id: SubmissionId,
        reference_number: impl Into<String>,
        kind: SubmissionKind,
        submission_date: DateTime<Utc>,
        status: SubmissionStatus,
    ) -> Self {
        Self {
            id,
            reference_number: reference_number.into(),
            kind,
            submission_date,
            status,
            comments: String::new(),
            reviewer: None,
            amount: None,
            queued_offline: false,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_amount(mut self, amount: Option<Money>) -> Self {
        self.amount = amount;
        self
    }

    pub fn queued_offline(mut self, queued: bool) -> Self {
        self.queued_offline = queued;
        self
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }

    pub fn reference_number(&self) -> &str {
        &self.reference_number
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn submission_date(&self) -> DateTime<Utc> {
        self.submission_date
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn reviewer(&self) -> Option<&str> {
        self.reviewer.as_deref()
    }

    pub fn amount(&self) -> Option<Money> {
        self.amount
    }

    pub fn is_queued_offline(&self) -> bool {
        self.queued_offline
    }

    /// Copy of this record with the update applied
    fn updated(&self, update: StatusUpdate) -> Self {
        Self {
            status: update.status,
            comments: update.comments.unwrap_or_else(|| self.comments.clone()),
            reviewer: update.reviewer.or_else(|| self.reviewer.clone()),
            ..self.clone()
        }
    }
}

/// A status change reported for a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: SubmissionStatus,
    /// Replaces the comments when present
    pub comments: Option<String>,
    /// Replaces the reviewer when present
    pub reviewer: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: SubmissionStatus) -> Self {
        Self {
            status,
            comments: None,
            reviewer: None,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }
}

/// In-memory history of submissions, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionLedger {
    records: Vec<SubmissionRecord>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a ledger with existing history
    ///
    /// # Errors
    ///
    /// Returns `DuplicateReference` if two records share a reference number.
    pub fn with_records(records: Vec<SubmissionRecord>) -> Result<Self, SubmissionError> {
        let mut ledger = Self::new();
        for record in records {
            ledger.append(record)?;
        }
        Ok(ledger)
    }

    /// Appends a new submission
    pub fn append(&mut self, record: SubmissionRecord) -> Result<(), SubmissionError> {
        if self.find_by_reference(&record.reference_number).is_some() {
            return Err(SubmissionError::DuplicateReference(record.reference_number));
        }
        tracing::debug!(
            reference = %record.reference_number,
            status = ?record.status,
            "submission appended to history"
        );
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_reference(&self, reference: &str) -> Option<&SubmissionRecord> {
        self.records.iter().find(|r| r.reference_number == reference)
    }

    pub fn get(&self, id: SubmissionId) -> Option<&SubmissionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Applies a status update to the submission with the given id
    pub fn update(&mut self, id: SubmissionId, update: StatusUpdate) -> Result<&SubmissionRecord, SubmissionError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| SubmissionError::RecordNotFound(id.to_string()))?;
        Ok(self.replace(index, update))
    }

    /// Applies a status update to the submission with the given reference number
    pub fn track(&mut self, reference: &str, update: StatusUpdate) -> Result<&SubmissionRecord, SubmissionError> {
        let index = self
            .records
            .iter()
            .position(|r| r.reference_number == reference)
            .ok_or_else(|| SubmissionError::RecordNotFound(reference.to_string()))?;
        Ok(self.replace(index, update))
    }

    fn replace(&mut self, index: usize, update: StatusUpdate) -> &SubmissionRecord {
        let updated = self.records[index].updated(update);
        tracing::debug!(
            reference = %updated.reference_number,
            from = ?self.records[index].status,
            to = ?updated.status,
            "submission status updated"
        );
        self.records[index] = updated;
        &self.records[index]
    }

    /// Records that the payer paid the submission
    pub fn record_payment(
        &mut self,
        reference: &str,
        amount: Money,
        reviewer: impl Into<String>,
    ) -> Result<&SubmissionRecord, SubmissionError> {
        let update = StatusUpdate::new(SubmissionStatus::Paid)
            .with_comments(format!("Payment received: {}", amount))
            .with_reviewer(reviewer);
        self.track(reference, update)
    }

    /// Records that the payer denied the submission
    pub fn record_denial(
        &mut self,
        reference: &str,
        reason: impl Into<String>,
        reviewer: impl Into<String>,
    ) -> Result<&SubmissionRecord, SubmissionError> {
        let update = StatusUpdate::new(SubmissionStatus::Rejected)
            .with_comments(format!("Denied: {}", reason.into()))
            .with_reviewer(reviewer);
        self.track(reference, update)
    }

    /// Records an appeal against a denial, sending it back into review
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the submission is currently `Rejected`.
    pub fn record_appeal(
        &mut self,
        reference: &str,
        grounds: impl Into<String>,
    ) -> Result<&SubmissionRecord, SubmissionError> {
        let current = self
            .find_by_reference(reference)
            .ok_or_else(|| SubmissionError::RecordNotFound(reference.to_string()))?;
        if current.status != SubmissionStatus::Rejected {
            return Err(SubmissionError::validation(format!(
                "Only rejected submissions can be appealed; {} is {:?}",
                reference, current.status
            )));
        }
        let update = StatusUpdate::new(SubmissionStatus::InReview)
            .with_comments(format!("Appealed: {}", grounds.into()));
        self.track(reference, update)
    }

    pub fn by_status(&self, status: SubmissionStatus) -> impl Iterator<Item = &SubmissionRecord> {
        self.records.iter().filter(move |r| r.status == status)
    }

    pub fn status_counts(&self) -> BTreeMap<SubmissionStatus, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn record(reference: &str) -> SubmissionRecord {
        SubmissionRecord::new(
            SubmissionId::new(),
            reference,
            SubmissionKind::Claim,
            Utc::now(),
            SubmissionStatus::Pending,
        )
    }

    #[test]
    fn test_duplicate_reference_rejected() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("CLM-1")).unwrap();
        let result = ledger.append(record("CLM-1"));
        assert!(matches!(result, Err(SubmissionError::DuplicateReference(r)) if r == "CLM-1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_track_keeps_identity() {
        let mut ledger = SubmissionLedger::new();
        let original = record("CLM-1");
        ledger.append(original.clone()).unwrap();

        let updated = ledger
            .track("CLM-1", StatusUpdate::new(SubmissionStatus::InReview).with_reviewer("Dr. Noor"))
            .unwrap();

        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.reference_number(), "CLM-1");
        assert_eq!(updated.submission_date(), original.submission_date());
        assert_eq!(updated.status(), SubmissionStatus::InReview);
        assert_eq!(updated.reviewer(), Some("Dr. Noor"));
    }

    #[test]
    fn test_update_without_comments_keeps_previous() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("CLM-1").with_comments("initial")).unwrap();
        let updated = ledger.track("CLM-1", StatusUpdate::new(SubmissionStatus::Approved)).unwrap();
        assert_eq!(updated.comments(), "initial");
    }

    #[test]
    fn test_payment_denial_appeal() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("CLM-1")).unwrap();
        ledger.append(record("CLM-2")).unwrap();

        let paid = ledger
            .record_payment("CLM-1", Money::new(dec!(750), Currency::AED), "Finance")
            .unwrap();
        assert_eq!(paid.status(), SubmissionStatus::Paid);
        assert!(paid.comments().contains("AED 750.00"));

        ledger.record_denial("CLM-2", "Missing referral", "Payer").unwrap();
        let appealed = ledger.record_appeal("CLM-2", "Referral attached").unwrap();
        assert_eq!(appealed.status(), SubmissionStatus::InReview);
        assert_eq!(appealed.reviewer(), Some("Payer"));
    }

    #[test]
    fn test_appeal_requires_rejection() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("CLM-1")).unwrap();
        assert!(matches!(
            ledger.record_appeal("CLM-1", "why not"),
            Err(SubmissionError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let mut ledger = SubmissionLedger::new();
        let result = ledger.track("CLM-404", StatusUpdate::new(SubmissionStatus::Paid));
        assert!(matches!(result, Err(SubmissionError::RecordNotFound(_))));
    }

    #[test]
    fn test_status_counts() {
        let mut ledger = SubmissionLedger::new();
        ledger.append(record("CLM-1")).unwrap();
        ledger.append(record("CLM-2")).unwrap();
        ledger.track("CLM-2", StatusUpdate::new(SubmissionStatus::Approved)).unwrap();

        let counts = ledger.status_counts();
        assert_eq!(counts.get(&SubmissionStatus::Pending), Some(&1));
        assert_eq!(counts.get(&SubmissionStatus::Approved), Some(&1));
        assert_eq!(ledger.by_status(SubmissionStatus::Approved).count(), 1);
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&SubmissionStatus::AdditionalInfo).unwrap();
        assert_eq!(json, "\"additional-info\"");
    }
}

//! Integration tests for the submission service against in-memory adapters

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, SubmissionId};
use domain_submission::adapters::{ConnectivityFlag, MockBehavior, StaticComplianceValidator};
use domain_submission::ports::OfflineQueue;
use domain_submission::{
    ComplianceReport, GateCheck, GateOverrides, GateRejection, SubmissionError, SubmissionKind,
    SubmissionLedger, SubmissionRecord, SubmissionService, SubmissionStatus,
};
use test_utils::{
    assert_err_variant, ready_authorization, ready_claim, ClaimFormBuilder, LicenseFixtures,
    ServiceLineDraftBuilder, TestServiceHarness,
};

// ============================================================================
// Online Submission Tests
// ============================================================================

mod online_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_ready_claim() {
        let mut harness = TestServiceHarness::online();

        let receipt = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), Some("billing.clerk"))
            .await
            .unwrap();

        assert!(receipt.reference_number.starts_with("CLM-"));
        assert_eq!(receipt.status, SubmissionStatus::Pending);
        assert!(!receipt.queued_offline);
        assert!(receipt.clearance.overridden.is_empty());

        let received = harness.payer.received().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].documents.len(), 12);
        assert_eq!(
            received[0].total_amount,
            Some(Money::new(dec!(2100.00), Currency::AED))
        );

        let record = harness
            .service
            .ledger()
            .find_by_reference(&receipt.reference_number)
            .unwrap();
        assert_eq!(record.id(), receipt.submission_id);
        assert_eq!(record.kind(), SubmissionKind::Claim);
        assert!(!record.is_queued_offline());
    }

    #[tokio::test]
    async fn test_submit_authorization_uses_pa_prefix() {
        let mut harness = TestServiceHarness::online();

        let receipt = harness
            .service
            .submit(&ready_authorization(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert!(receipt.reference_number.starts_with("PA-"));
        let received = harness.payer.received().await;
        assert!(received[0].service_lines.is_empty());
        assert_eq!(received[0].total_amount, None);
    }

    #[tokio::test]
    async fn test_payer_status_recorded() {
        let mut harness =
            TestServiceHarness::with_behavior(true, MockBehavior::Accept(SubmissionStatus::InReview));

        let receipt = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert_eq!(receipt.status, SubmissionStatus::InReview);
        assert_eq!(
            harness.service.ledger().records()[0].status(),
            SubmissionStatus::InReview
        );
    }

    #[tokio::test]
    async fn test_sequential_references_are_unique() {
        let mut harness = TestServiceHarness::online();

        let first = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();
        let second = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert_ne!(first.reference_number, second.reference_number);
        assert_eq!(harness.service.ledger().len(), 2);
        assert!(first.recorded && second.recorded);
    }

    #[tokio::test]
    async fn test_accepted_submission_returned_when_ledger_refuses_it() {
        let TestServiceHarness { service, payer, .. } = TestServiceHarness::online();
        let today = Utc::now();
        let mut ledger = SubmissionLedger::new();
        for day in [today, today + Duration::days(1)] {
            let taken = format!("CLM-{}-0001", day.format("%Y%m%d"));
            ledger
                .append(SubmissionRecord::new(
                    SubmissionId::new(),
                    taken,
                    SubmissionKind::Claim,
                    today,
                    SubmissionStatus::Paid,
                ))
                .unwrap();
        }
        let mut service = service.with_ledger(ledger);

        let receipt = service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert!(!receipt.recorded);
        assert_eq!(payer.received().await.len(), 1);
        assert_eq!(service.ledger().len(), 2);
        assert!(service.ledger().get(receipt.submission_id).is_none());
    }
}

// ============================================================================
// Blocked Submission Tests
// ============================================================================

mod blocked_tests {
    use super::*;

    #[tokio::test]
    async fn test_incomplete_form_not_sent() {
        let mut harness = TestServiceHarness::online();
        let form = ClaimFormBuilder::new()
            .without_document("invoice")
            .with_line(ServiceLineDraftBuilder::new().build())
            .build();

        let result = harness.service.submit(&form, GateOverrides::none(), None).await;

        match result {
            Err(SubmissionError::Incomplete { percent, missing }) => {
                assert_eq!(percent, 92);
                assert_eq!(missing, vec!["Itemized Invoice".to_string()]);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
        assert!(harness.payer.received().await.is_empty());
        assert!(harness.service.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_unlicensed_provider_rejected_then_confirmed() {
        let mut harness = TestServiceHarness::online();
        let form = ClaimFormBuilder::new()
            .with_all_documents()
            .with_line(
                ServiceLineDraftBuilder::new()
                    .with_provider(LicenseFixtures::THERAPIST_ID, LicenseFixtures::THERAPIST_NAME)
                    .build(),
            )
            .build();

        let result = harness.service.submit(&form, GateOverrides::none(), None).await;
        let rejection = match result {
            Err(SubmissionError::Rejected(rejection)) => rejection,
            other => panic!("expected Rejected, got {other:?}"),
        };
        assert_eq!(rejection.check(), GateCheck::ProviderLicenses);
        assert!(harness.service.ledger().is_empty());

        let receipt = harness
            .service
            .submit(&form, GateOverrides::all(), None)
            .await
            .unwrap();
        assert_eq!(
            receipt.clearance.overridden_checks(),
            vec![GateCheck::ProviderLicenses, GateCheck::DocumentationCoverage]
        );
        let received = harness.payer.received().await;
        assert_eq!(
            received[0].overridden_checks,
            vec![GateCheck::ProviderLicenses, GateCheck::DocumentationCoverage]
        );
    }

    #[tokio::test]
    async fn test_claim_without_lines_rejected() {
        let mut harness = TestServiceHarness::online();
        let form = ClaimFormBuilder::new().with_all_documents().build();

        let result = harness.service.submit(&form, GateOverrides::all(), None).await;

        assert_err_variant!(result, SubmissionError::Rejected(GateRejection::NoServiceLines));
    }

    #[tokio::test]
    async fn test_payer_unavailable_records_nothing() {
        let mut harness = TestServiceHarness::with_behavior(true, MockBehavior::Unavailable);

        let result = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await;

        match result {
            Err(SubmissionError::Port(error)) => assert!(error.is_transient()),
            other => panic!("expected Port error, got {other:?}"),
        }
        assert!(harness.service.ledger().is_empty());
        assert_eq!(harness.queue.len().await, 0);
    }

    #[tokio::test]
    async fn test_payload_rejected_by_payer() {
        let mut harness = TestServiceHarness::with_behavior(
            true,
            MockBehavior::RejectPayload("member id unknown".to_string()),
        );

        let result = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await;

        assert_err_variant!(result, SubmissionError::Port(_));
    }
}

// ============================================================================
// Compliance Validator Tests
// ============================================================================

mod compliance_tests {
    use super::*;

    #[tokio::test]
    async fn test_compliance_issues_do_not_block() {
        let TestServiceHarness { service, payer, .. } = TestServiceHarness::online();
        let report = ComplianceReport::with_issues(vec!["Plan of care unsigned".to_string()]);
        let mut service =
            service.with_compliance(Arc::new(StaticComplianceValidator::new(report.clone())));

        let receipt = service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert_eq!(receipt.compliance, Some(report));
        assert_eq!(payer.received().await.len(), 1);
    }

    #[tokio::test]
    async fn test_compliant_report_attached() {
        let TestServiceHarness { service, .. } = TestServiceHarness::online();
        let mut service = service.with_compliance(Arc::new(StaticComplianceValidator::compliant()));

        let receipt = service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert_eq!(receipt.compliance, Some(ComplianceReport::compliant()));
    }
}

// ============================================================================
// Offline Queue Tests
// ============================================================================

mod offline_tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_submission_queued_locally() {
        let mut harness = TestServiceHarness::offline();

        let receipt = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        assert!(receipt.queued_offline);
        assert_eq!(
            receipt.reference_number,
            format!("OFF-{}", receipt.submission_id.short_code())
        );
        assert_eq!(receipt.status, SubmissionStatus::Pending);
        assert_eq!(harness.queue.len().await, 1);
        assert!(harness.payer.received().await.is_empty());
        assert!(harness.service.ledger().records()[0].is_queued_offline());
    }

    #[tokio::test]
    async fn test_flush_while_offline_does_nothing() {
        let mut harness = TestServiceHarness::offline();
        harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        let report = harness.service.flush_offline_queue().await.unwrap();

        assert_eq!(report.sent, 0);
        assert_eq!(harness.queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_flush_syncs_and_keeps_offline_reference() {
        let mut harness = TestServiceHarness::offline();
        let receipt = harness
            .service
            .submit(&ready_claim(), GateOverrides::none(), None)
            .await
            .unwrap();

        harness.connectivity.set_online(true);
        let report = harness.service.flush_offline_queue().await.unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(report.requeued, 0);
        assert!(harness.queue.is_empty().await);

        let record = harness.service.ledger().get(receipt.submission_id).unwrap();
        assert_eq!(record.reference_number(), receipt.reference_number);
        assert!(record.is_queued_offline());
        assert!(record.comments().starts_with("Synced as CLM-"));
    }

    #[tokio::test]
    async fn test_failed_flush_requeues_everything() {
        let mut harness = TestServiceHarness::offline();
        for _ in 0..2 {
            harness
                .service
                .submit(&ready_claim(), GateOverrides::none(), None)
                .await
                .unwrap();
        }

        harness.payer.set_behavior(MockBehavior::Unavailable).await;
        harness.connectivity.set_online(true);
        let result = harness.service.flush_offline_queue().await;

        assert_err_variant!(result, SubmissionError::Port(_));
        assert_eq!(harness.queue.len().await, 2);
        assert_eq!(
            harness.service.ledger().by_status(SubmissionStatus::Pending).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_flush_records_payloads_queued_by_another_service() {
        let mut queuing = TestServiceHarness::offline();
        let mut queued = Vec::new();
        for _ in 0..3 {
            let receipt = queuing
                .service
                .submit(&ready_claim(), GateOverrides::none(), None)
                .await
                .unwrap();
            queued.push(receipt);
        }

        let mut syncing = SubmissionService::new(
            queuing.payer.clone(),
            queuing.queue.clone(),
            Arc::new(ConnectivityFlag::online()),
        );
        let report = syncing.flush_offline_queue().await.unwrap();

        assert_eq!(report.sent, 3);
        assert_eq!(report.unrecorded, 0);
        assert!(queuing.queue.is_empty().await);
        assert_eq!(queuing.payer.received().await.len(), 3);
        for receipt in &queued {
            let record = syncing.ledger().get(receipt.submission_id).unwrap();
            assert_eq!(record.reference_number(), receipt.reference_number);
            assert!(record.is_queued_offline());
            assert!(record.comments().starts_with("Synced as CLM-"));
        }
    }

    #[tokio::test]
    async fn test_flush_keeps_sending_after_ledger_refuses_a_record() {
        let mut queuing = TestServiceHarness::offline();
        let mut queued = Vec::new();
        for _ in 0..3 {
            let receipt = queuing
                .service
                .submit(&ready_claim(), GateOverrides::none(), None)
                .await
                .unwrap();
            queued.push(receipt);
        }

        // Same OFF- reference already held by a different submission
        let clash = SubmissionRecord::new(
            SubmissionId::new(),
            queued[0].reference_number.clone(),
            SubmissionKind::Claim,
            Utc::now(),
            SubmissionStatus::Approved,
        );
        let mut syncing = SubmissionService::new(
            queuing.payer.clone(),
            queuing.queue.clone(),
            Arc::new(ConnectivityFlag::online()),
        )
        .with_ledger(SubmissionLedger::with_records(vec![clash]).unwrap());

        let report = syncing.flush_offline_queue().await.unwrap();

        assert_eq!(report.sent, 3);
        assert_eq!(report.unrecorded, 1);
        assert_eq!(report.requeued, 0);
        assert!(queuing.queue.is_empty().await);
        assert_eq!(queuing.payer.received().await.len(), 3);
        assert_eq!(syncing.ledger().len(), 3);
        assert!(syncing.ledger().get(queued[0].submission_id).is_none());
    }
}

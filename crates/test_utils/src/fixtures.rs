//! Pre-built Test Fixtures
//!
//! Document templates, licenses and dates shared by the test suite. These
//! stand in for the static lists a facility would configure.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, DateRange, LicenseId};
use domain_submission::{
    ComplianceStatus, DocumentTemplate, FileMeta, FormTemplate, License, LicenseStatus,
    SubmissionKind,
};

/// Fixture for document templates
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// The twelve required documents of a homecare claim
    pub fn claim_documents() -> Vec<DocumentTemplate> {
        vec![
            DocumentTemplate::required("claim-form", "Claim Form"),
            DocumentTemplate::required("emirates-id", "Emirates ID Copy"),
            DocumentTemplate::required("insurance-card", "Insurance Card Copy"),
            DocumentTemplate::required("physician-referral", "Physician Referral"),
            DocumentTemplate::required("prior-authorization", "Prior Authorization Approval"),
            DocumentTemplate::required("nursing-assessment", "Nursing Assessment"),
            DocumentTemplate::required("plan-of-care", "Plan of Care"),
            DocumentTemplate::required("visit-notes", "Visit Notes"),
            DocumentTemplate::required("medication-list", "Medication List"),
            DocumentTemplate::required("vital-signs", "Vital Signs Log"),
            DocumentTemplate::required("clinician-license", "Clinician License"),
            DocumentTemplate::required("invoice", "Itemized Invoice"),
        ]
    }

    /// Documents asked for by a prior-authorization request
    pub fn authorization_documents() -> Vec<DocumentTemplate> {
        vec![
            DocumentTemplate::required("physician-referral", "Physician Referral"),
            DocumentTemplate::required("medical-report", "Medical Report"),
            DocumentTemplate::required("face-to-face", "Face-to-Face Assessment"),
            DocumentTemplate::optional("lab-results", "Recent Lab Results"),
        ]
    }

    /// A PDF upload
    pub fn pdf(name: &str) -> FileMeta {
        FileMeta::new(format!("{name}.pdf"), "application/pdf", 120_000)
    }
}

/// Fixture for form templates
pub struct TemplateFixtures;

impl TemplateFixtures {
    /// Claim template with only documents required
    pub fn claim() -> FormTemplate {
        FormTemplate::new(SubmissionKind::Claim, DocumentFixtures::claim_documents())
            .with_currency(Currency::AED)
            .with_default_field("payer", "Daman")
    }

    /// Claim template that also requires header fields
    pub fn claim_with_fields() -> FormTemplate {
        Self::claim().with_required_fields(["patient_name", "member_id", "payer"])
    }

    /// Prior-authorization template
    pub fn authorization() -> FormTemplate {
        FormTemplate::new(SubmissionKind::Authorization, DocumentFixtures::authorization_documents())
            .with_required_fields(["patient_name", "diagnosis_code"])
            .with_default_field("urgency", "routine")
    }

    /// The claim template as a facility would configure it in JSON
    pub fn claim_json() -> String {
        serde_json::json!({
            "kind": "claim",
            "currency": "AED",
            "documents": DocumentFixtures::claim_documents()
                .iter()
                .map(|d| serde_json::json!({"id": d.id, "name": d.name}))
                .collect::<Vec<_>>(),
            "default_fields": {"payer": "Daman"}
        })
        .to_string()
    }
}

/// Fixture for calendar data
pub struct DateFixtures;

impl DateFixtures {
    /// Submission date used by gate tests
    pub fn submission_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    /// Instant at noon UTC on the submission date
    pub fn submission_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    /// The first week of June 2024
    pub fn service_week() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
        )
        .unwrap()
    }

    /// A date far enough out that fixture licenses never expire in tests
    pub fn far_future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()
    }
}

/// Fixture for clinician licenses
pub struct LicenseFixtures;

impl LicenseFixtures {
    pub const NURSE_ID: &'static str = "EMP-1001";
    pub const NURSE_NAME: &'static str = "Sara Ahmed";
    pub const THERAPIST_ID: &'static str = "EMP-2002";
    pub const THERAPIST_NAME: &'static str = "Omar Haddad";

    /// Active, compliant, non-expiring license for the fixture nurse
    pub fn active_nurse() -> License {
        License {
            id: LicenseId::new(),
            clinician_name: Self::NURSE_NAME.to_string(),
            employee_id: Self::NURSE_ID.to_string(),
            license_number: "DOH-RN-55102".to_string(),
            license_status: LicenseStatus::Active,
            expiry_date: DateFixtures::far_future(),
            compliance_status: ComplianceStatus::Compliant,
        }
    }

    /// License for the fixture therapist that expired before the submission date
    pub fn expired_therapist() -> License {
        License {
            id: LicenseId::new(),
            clinician_name: Self::THERAPIST_NAME.to_string(),
            employee_id: Self::THERAPIST_ID.to_string(),
            license_number: "DOH-PT-20411".to_string(),
            license_status: LicenseStatus::Active,
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            compliance_status: ComplianceStatus::Compliant,
        }
    }
}

//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use std::sync::Arc;

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{DateRange, LicenseId};
use domain_submission::adapters::{
    ConnectivityFlag, InMemoryOfflineQueue, MockBehavior, MockSubmissionAdapter,
};
use domain_submission::{
    AuthorizationForm, ClaimForm, ComplianceStatus, DocumentationLog, FormTemplate, License,
    LicenseRegistry, LicenseStatus, ServiceLineDraft, SubmissionForm, SubmissionService,
    SubmissionStatus,
};

use crate::fixtures::{DateFixtures, DocumentFixtures, LicenseFixtures, TemplateFixtures};

/// Builder for service line input
pub struct ServiceLineDraftBuilder {
    draft: ServiceLineDraft,
}

impl Default for ServiceLineDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLineDraftBuilder {
    /// A week of nursing visits by the fixture nurse
    pub fn new() -> Self {
        Self {
            draft: ServiceLineDraft {
                code: "17-26-1".to_string(),
                description: "Home nursing visit".to_string(),
                quantity: 7,
                unit_price: dec!(300.00),
                date_range: DateFixtures::service_week(),
                provider_id: LicenseFixtures::NURSE_ID.to_string(),
                provider_name: LicenseFixtures::NURSE_NAME.to_string(),
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.draft.code = code.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.draft.quantity = quantity;
        self
    }

    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.draft.unit_price = price;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.draft.date_range = range;
        self
    }

    pub fn with_provider(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.draft.provider_id = id.into();
        self.draft.provider_name = name.into();
        self
    }

    pub fn build(self) -> ServiceLineDraft {
        self.draft
    }
}

/// Builder for clinician licenses
pub struct LicenseBuilder {
    license: License,
}

impl Default for LicenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseBuilder {
    /// An active, compliant license for a random clinician
    pub fn new() -> Self {
        let employee_number: u32 = (3000..9999).fake();
        Self {
            license: License {
                id: LicenseId::new(),
                clinician_name: Name().fake(),
                employee_id: format!("EMP-{employee_number}"),
                license_number: format!("DOH-{employee_number}"),
                license_status: LicenseStatus::Active,
                expiry_date: DateFixtures::far_future(),
                compliance_status: ComplianceStatus::Compliant,
            },
        }
    }

    pub fn for_provider(mut self, employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.license.employee_id = employee_id.into();
        self.license.clinician_name = name.into();
        self
    }

    pub fn with_status(mut self, status: LicenseStatus) -> Self {
        self.license.license_status = status;
        self
    }

    pub fn with_compliance(mut self, status: ComplianceStatus) -> Self {
        self.license.compliance_status = status;
        self
    }

    pub fn expiring_on(mut self, date: NaiveDate) -> Self {
        self.license.expiry_date = date;
        self
    }

    pub fn build(self) -> License {
        self.license
    }
}

/// Builder for claim forms in a given state of completion
pub struct ClaimFormBuilder {
    template: FormTemplate,
    upload_all: bool,
    skip_documents: Vec<String>,
    lines: Vec<ServiceLineDraft>,
    fields: Vec<(String, String)>,
}

impl Default for ClaimFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimFormBuilder {
    pub fn new() -> Self {
        Self {
            template: TemplateFixtures::claim(),
            upload_all: false,
            skip_documents: Vec::new(),
            lines: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: FormTemplate) -> Self {
        self.template = template;
        self
    }

    /// Uploads every document on the template
    pub fn with_all_documents(mut self) -> Self {
        self.upload_all = true;
        self
    }

    /// Uploads every document except `id`
    pub fn without_document(mut self, id: impl Into<String>) -> Self {
        self.upload_all = true;
        self.skip_documents.push(id.into());
        self
    }

    pub fn with_line(mut self, line: ServiceLineDraft) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> ClaimForm {
        let mut form = ClaimForm::new(self.template).unwrap();
        if self.upload_all {
            let ids: Vec<String> = form
                .checklist()
                .documents()
                .iter()
                .map(|d| d.id.clone())
                .filter(|id| !self.skip_documents.contains(id))
                .collect();
            for id in ids {
                form.upload_document(&id, DocumentFixtures::pdf(&id), DateFixtures::submission_instant())
                    .unwrap();
            }
        }
        for line in self.lines {
            form.add_line(line).unwrap();
        }
        for (name, value) in self.fields {
            form.set_field(name, value);
        }
        form
    }
}

/// A claim ready to pass every gate check against [`GateFixturesBuilder`] data
pub fn ready_claim() -> ClaimForm {
    ClaimFormBuilder::new()
        .with_all_documents()
        .with_line(ServiceLineDraftBuilder::new().build())
        .build()
}

/// An authorization form with every required document and field filled
pub fn ready_authorization() -> AuthorizationForm {
    let mut form = AuthorizationForm::new(TemplateFixtures::authorization()).unwrap();
    for id in ["physician-referral", "medical-report", "face-to-face"] {
        form.upload_document(id, DocumentFixtures::pdf(id), DateFixtures::submission_instant())
            .unwrap();
    }
    form.set_field("patient_name", "Mariam Saleh");
    form.set_field("diagnosis_code", "I63.9");
    form
}

/// Builder for the license registry and visit notes the gate checks against
pub struct GateFixturesBuilder {
    licenses: Vec<License>,
    documentation: DocumentationLog,
}

impl Default for GateFixturesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GateFixturesBuilder {
    /// The fixture nurse licensed and documented for the whole service week
    pub fn new() -> Self {
        let mut documentation = DocumentationLog::new();
        documentation.record_range(LicenseFixtures::NURSE_ID, &DateFixtures::service_week());
        Self {
            licenses: vec![LicenseFixtures::active_nurse()],
            documentation,
        }
    }

    pub fn with_license(mut self, license: License) -> Self {
        self.licenses.push(license);
        self
    }

    pub fn without_licenses(mut self) -> Self {
        self.licenses.clear();
        self
    }

    pub fn with_documentation(mut self, documentation: DocumentationLog) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn build(self) -> (LicenseRegistry, DocumentationLog) {
        (LicenseRegistry::new(self.licenses), self.documentation)
    }
}

/// A submission service wired to in-memory adapters, with handles to them
pub struct TestServiceHarness {
    pub service: SubmissionService,
    pub payer: Arc<MockSubmissionAdapter>,
    pub queue: Arc<InMemoryOfflineQueue>,
    pub connectivity: Arc<ConnectivityFlag>,
}

impl TestServiceHarness {
    /// Online service whose payer accepts everything as `Pending`
    pub fn online() -> Self {
        Self::with_behavior(true, MockBehavior::Accept(SubmissionStatus::Pending))
    }

    /// Offline service
    pub fn offline() -> Self {
        Self::with_behavior(false, MockBehavior::Accept(SubmissionStatus::Pending))
    }

    pub fn with_behavior(online: bool, behavior: MockBehavior) -> Self {
        let payer = Arc::new(MockSubmissionAdapter::new(behavior));
        let queue = Arc::new(InMemoryOfflineQueue::new());
        let connectivity = Arc::new(ConnectivityFlag::new(online));
        let (licenses, documentation) = GateFixturesBuilder::new().build();

        let service = SubmissionService::new(payer.clone(), queue.clone(), connectivity.clone())
            .with_licenses(licenses)
            .with_documentation(documentation);

        Self {
            service,
            payer,
            queue,
            connectivity,
        }
    }
}

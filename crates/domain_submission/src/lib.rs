//! Submission Workflow Domain
//!
//! This crate implements the completeness tracking and submission workflow
//! shared by homecare claim and prior-authorization forms.
//!
//! # Submission Flow
//!
//! ```text
//! edit form -> progress recalculated -> 100% -> gate checks -> payer API / offline queue -> history
//! ```

pub mod checklist;
pub mod progress;
pub mod service_line;
pub mod license;
pub mod documentation;
pub mod form;
pub mod gate;
pub mod history;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod error;

pub use checklist::{DocumentChecklist, DocumentRequirement, DocumentTemplate, FileMeta};
pub use progress::Progress;
pub use service_line::{ServiceLine, ServiceLineDraft, ServiceLineEdit, ServiceLines};
pub use license::{License, LicenseRegistry, LicenseStatus, ComplianceStatus, LicenseProblem};
pub use documentation::DocumentationLog;
pub use form::{AuthorizationForm, ClaimForm, FormTemplate, SubmissionForm};
pub use gate::{GateCheck, GateClearance, GateOverrides, GateRejection, SubmissionGate};
pub use history::{
    StatusUpdate, SubmissionKind, SubmissionLedger, SubmissionRecord, SubmissionStatus,
};
pub use ports::{
    ComplianceReport, ComplianceValidator, Connectivity, OfflineQueue, SubmissionPayload,
    SubmissionPort, SubmissionResponse,
};
pub use service::{FlushReport, SubmissionReceipt, SubmissionService};
pub use error::SubmissionError;

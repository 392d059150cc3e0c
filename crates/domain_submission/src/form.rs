//! Claim and prior-authorization forms
//!
//! A form owns its local state: the document checklist, free-text field
//! values and, for claims, the service lines. Forms are built from an
//! injected [`FormTemplate`] and `reset()` restores them to it exactly.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, FormId, Money, ServiceLineId};
use crate::checklist::{DocumentChecklist, DocumentTemplate, FileMeta};
use crate::error::SubmissionError;
use crate::history::SubmissionKind;
use crate::progress::{self, Progress};
use crate::service_line::{ServiceLine, ServiceLineDraft, ServiceLineEdit, ServiceLines};

/// Fixture a form is seeded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub kind: SubmissionKind,
    pub documents: Vec<DocumentTemplate>,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub default_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub currency: Currency,
}

impl FormTemplate {
    pub fn new(kind: SubmissionKind, documents: Vec<DocumentTemplate>) -> Self {
        Self {
            kind,
            documents,
            required_fields: Vec::new(),
            default_fields: BTreeMap::new(),
            currency: Currency::default(),
        }
    }

    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_fields.insert(name.into(), value.into());
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Parses a template from JSON
    pub fn from_json(json: &str) -> Result<Self, SubmissionError> {
        serde_json::from_str(json).map_err(|e| SubmissionError::Template(e.to_string()))
    }
}

/// Behaviour shared by every form that can be submitted
pub trait SubmissionForm {
    fn id(&self) -> FormId;

    fn kind(&self) -> SubmissionKind;

    fn checklist(&self) -> &DocumentChecklist;

    fn fields(&self) -> &BTreeMap<String, String>;

    fn required_fields(&self) -> &[String];

    /// Service lines billed by the form, if it bills any
    fn service_lines(&self) -> Option<&ServiceLines> {
        None
    }

    fn progress(&self) -> Progress {
        progress::form_progress(self.checklist(), self.required_fields(), self.fields())
    }

    /// The submit action is enabled only at 100%
    fn can_submit(&self) -> bool {
        self.progress().is_complete()
    }

    /// Names of missing required documents followed by missing required fields
    fn missing_items(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .checklist()
            .missing_required()
            .into_iter()
            .map(|d| d.name.clone())
            .collect();
        missing.extend(
            progress::missing_fields(self.required_fields(), self.fields())
                .into_iter()
                .map(str::to_string),
        );
        missing
    }

    /// Amount being claimed, for forms that bill
    fn claimed_amount(&self) -> Result<Option<Money>, SubmissionError> {
        self.service_lines().map(ServiceLines::grand_total).transpose()
    }
}

/// State common to both form kinds
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormState {
    id: FormId,
    template: FormTemplate,
    checklist: DocumentChecklist,
    fields: BTreeMap<String, String>,
}

impl FormState {
    fn new(template: FormTemplate, expected: SubmissionKind) -> Result<Self, SubmissionError> {
        if template.kind != expected {
            return Err(SubmissionError::WrongFormKind {
                expected,
                found: template.kind,
            });
        }
        let checklist = DocumentChecklist::from_template(template.documents.clone())?;
        Ok(Self {
            id: FormId::new_v7(),
            fields: template.default_fields.clone(),
            checklist,
            template,
        })
    }

    fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    fn reset(&mut self) {
        self.checklist.reset();
        self.fields = self.template.default_fields.clone();
    }
}

/// A homecare claim being prepared for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimForm {
    state: FormState,
    lines: ServiceLines,
}

impl ClaimForm {
    /// Opens a claim form from a claim template
    pub fn new(template: FormTemplate) -> Result<Self, SubmissionError> {
        let lines = ServiceLines::new(template.currency);
        let state = FormState::new(template, SubmissionKind::Claim)?;
        Ok(Self { state, lines })
    }

    pub fn template(&self) -> &FormTemplate {
        &self.state.template
    }

    pub fn upload_document(&mut self, id: &str, file: FileMeta, at: DateTime<Utc>) -> Result<(), SubmissionError> {
        self.state.checklist.mark_uploaded(id, file, at)
    }

    pub fn clear_document(&mut self, id: &str) -> Result<(), SubmissionError> {
        self.state.checklist.clear_upload(id)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.state.set_field(name, value);
    }

    pub fn add_blank_line(&mut self, service_date: NaiveDate) -> ServiceLineId {
        self.lines.add_blank(service_date)
    }

    pub fn add_line(&mut self, draft: ServiceLineDraft) -> Result<ServiceLineId, SubmissionError> {
        self.lines.add_draft(draft)
    }

    pub fn edit_line(&mut self, id: ServiceLineId, edit: ServiceLineEdit) -> Result<&ServiceLine, SubmissionError> {
        self.lines.edit(id, edit)
    }

    pub fn remove_line(&mut self, id: ServiceLineId) -> Result<ServiceLine, SubmissionError> {
        self.lines.remove(id)
    }

    pub fn lines(&self) -> &ServiceLines {
        &self.lines
    }

    /// Restores documents and fields to the template and drops every line
    pub fn reset(&mut self) {
        self.state.reset();
        self.lines.clear();
    }
}

impl SubmissionForm for ClaimForm {
    fn id(&self) -> FormId {
        self.state.id
    }

    fn kind(&self) -> SubmissionKind {
        SubmissionKind::Claim
    }

    fn checklist(&self) -> &DocumentChecklist {
        &self.state.checklist
    }

    fn fields(&self) -> &BTreeMap<String, String> {
        &self.state.fields
    }

    fn required_fields(&self) -> &[String] {
        &self.state.template.required_fields
    }

    fn service_lines(&self) -> Option<&ServiceLines> {
        Some(&self.lines)
    }
}

/// A prior-authorization request being prepared for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationForm {
    state: FormState,
}

impl AuthorizationForm {
    /// Opens an authorization form from an authorization template
    pub fn new(template: FormTemplate) -> Result<Self, SubmissionError> {
        let state = FormState::new(template, SubmissionKind::Authorization)?;
        Ok(Self { state })
    }

    pub fn template(&self) -> &FormTemplate {
        &self.state.template
    }

    pub fn upload_document(&mut self, id: &str, file: FileMeta, at: DateTime<Utc>) -> Result<(), SubmissionError> {
        self.state.checklist.mark_uploaded(id, file, at)
    }

    pub fn clear_document(&mut self, id: &str) -> Result<(), SubmissionError> {
        self.state.checklist.clear_upload(id)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.state.set_field(name, value);
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl SubmissionForm for AuthorizationForm {
    fn id(&self) -> FormId {
        self.state.id
    }

    fn kind(&self) -> SubmissionKind {
        SubmissionKind::Authorization
    }

    fn checklist(&self) -> &DocumentChecklist {
        &self.state.checklist
    }

    fn fields(&self) -> &BTreeMap<String, String> {
        &self.state.fields
    }

    fn required_fields(&self) -> &[String] {
        &self.state.template.required_fields
    }
}

//! Draft files
//!
//! A draft is the JSON snapshot of a form being filled in, together with the
//! facility data the gate checks it against.

use std::collections::BTreeMap;

use serde::Deserialize;

use domain_submission::{
    AuthorizationForm, ClaimForm, DocumentationLog, FileMeta, FormTemplate, GateOverrides,
    LicenseRegistry, ServiceLineDraft, SubmissionError, SubmissionForm, SubmissionKind,
};

/// Contents of a draft JSON file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DraftFile {
    /// Uploaded documents keyed by checklist id
    pub documents: BTreeMap<String, FileMeta>,
    pub fields: BTreeMap<String, String>,
    pub service_lines: Vec<ServiceLineDraft>,
    pub licenses: LicenseRegistry,
    pub documentation: DocumentationLog,
    /// Confirmations already given by the user
    pub overrides: GateOverrides,
}

impl DraftFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Opens a form of the template's kind and applies the draft to it
    ///
    /// # Errors
    ///
    /// Fails on documents the template does not list, on service lines for
    /// an authorization, and on invalid service line input.
    pub fn build_form(
        &self,
        template: FormTemplate,
        uploaded_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Box<dyn SubmissionForm>, SubmissionError> {
        match template.kind {
            SubmissionKind::Claim => {
                let mut form = ClaimForm::new(template)?;
                for (id, file) in &self.documents {
                    form.upload_document(id, file.clone(), uploaded_at)?;
                }
                for (name, value) in &self.fields {
                    form.set_field(name.clone(), value.clone());
                }
                for line in &self.service_lines {
                    form.add_line(line.clone())?;
                }
                Ok(Box::new(form))
            }
            SubmissionKind::Authorization => {
                if !self.service_lines.is_empty() {
                    return Err(SubmissionError::validation(
                        "Authorization requests do not carry service lines",
                    ));
                }
                let mut form = AuthorizationForm::new(template)?;
                for (id, file) in &self.documents {
                    form.upload_document(id, file.clone(), uploaded_at)?;
                }
                for (name, value) in &self.fields {
                    form.set_field(name.clone(), value.clone());
                }
                Ok(Box::new(form))
            }
        }
    }
}

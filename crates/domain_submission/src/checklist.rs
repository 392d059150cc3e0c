//! Document checklist
//!
//! A checklist is seeded from a list of [`DocumentTemplate`]s when a form is
//! opened. Uploading a file flips the matching requirement to `uploaded`;
//! resetting the form restores the checklist exactly to its template.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;

fn default_required() -> bool {
    true
}

/// Static description of a document a form asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: String,
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl DocumentTemplate {
    pub fn required(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required: false,
        }
    }
}

/// Metadata of the file selected for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl FileMeta {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
        }
    }
}

/// A document on the checklist and its upload state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub id: String,
    pub name: String,
    pub required: bool,
    pub uploaded: bool,
    pub upload_date: Option<DateTime<Utc>>,
    pub file_meta: Option<FileMeta>,
}

impl DocumentRequirement {
    fn from_template(template: &DocumentTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            required: template.required,
            uploaded: false,
            upload_date: None,
            file_meta: None,
        }
    }

    /// True when this document no longer blocks submission
    pub fn is_satisfied(&self) -> bool {
        !self.required || self.uploaded
    }
}

/// The documents a form asks for, in template order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChecklist {
    template: Vec<DocumentTemplate>,
    documents: Vec<DocumentRequirement>,
}

impl DocumentChecklist {
    /// Seeds a checklist from its template
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDocument` if two templates share an id.
    pub fn from_template(template: Vec<DocumentTemplate>) -> Result<Self, SubmissionError> {
        let mut seen = HashSet::new();
        for doc in &template {
            if !seen.insert(doc.id.as_str()) {
                return Err(SubmissionError::DuplicateDocument(doc.id.clone()));
            }
        }

        let documents = template.iter().map(DocumentRequirement::from_template).collect();
        Ok(Self { template, documents })
    }

    pub fn documents(&self) -> &[DocumentRequirement] {
        &self.documents
    }

    pub fn template(&self) -> &[DocumentTemplate] {
        &self.template
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRequirement> {
        self.documents.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut DocumentRequirement, SubmissionError> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| SubmissionError::DocumentNotFound(id.to_string()))
    }

    /// Records a file selection against a document
    ///
    /// Re-uploading replaces the previous file metadata and date.
    pub fn mark_uploaded(
        &mut self,
        id: &str,
        file_meta: FileMeta,
        at: DateTime<Utc>,
    ) -> Result<(), SubmissionError> {
        let doc = self.get_mut(id)?;
        doc.uploaded = true;
        doc.upload_date = Some(at);
        doc.file_meta = Some(file_meta);
        tracing::debug!(document = %id, "document uploaded");
        Ok(())
    }

    /// Removes the upload from a single document
    pub fn clear_upload(&mut self, id: &str) -> Result<(), SubmissionError> {
        let doc = self.get_mut(id)?;
        doc.uploaded = false;
        doc.upload_date = None;
        doc.file_meta = None;
        Ok(())
    }

    /// Restores every document to its template state
    pub fn reset(&mut self) {
        self.documents = self.template.iter().map(DocumentRequirement::from_template).collect();
    }

    pub fn required_count(&self) -> usize {
        self.documents.iter().filter(|d| d.required).count()
    }

    pub fn uploaded_required_count(&self) -> usize {
        self.documents.iter().filter(|d| d.required && d.uploaded).count()
    }

    /// Required documents that have not been uploaded yet
    pub fn missing_required(&self) -> Vec<&DocumentRequirement> {
        self.documents.iter().filter(|d| !d.is_satisfied()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.documents.iter().all(DocumentRequirement::is_satisfied)
    }

    pub fn uploaded(&self) -> impl Iterator<Item = &DocumentRequirement> {
        self.documents.iter().filter(|d| d.uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checklist() -> DocumentChecklist {
        DocumentChecklist::from_template(vec![
            DocumentTemplate::required("referral", "Physician Referral"),
            DocumentTemplate::required("assessment", "Nursing Assessment"),
            DocumentTemplate::optional("photo-id", "Photo ID"),
        ])
        .unwrap()
    }

    fn pdf() -> FileMeta {
        FileMeta::new("scan.pdf", "application/pdf", 2048)
    }

    #[test]
    fn test_seeded_checklist_has_nothing_uploaded() {
        let list = checklist();
        assert_eq!(list.required_count(), 2);
        assert_eq!(list.uploaded_required_count(), 0);
        assert_eq!(list.missing_required().len(), 2);
        assert!(!list.is_complete());
    }

    #[test]
    fn test_optional_documents_do_not_block() {
        let mut list = checklist();
        list.mark_uploaded("referral", pdf(), Utc::now()).unwrap();
        list.mark_uploaded("assessment", pdf(), Utc::now()).unwrap();
        assert!(list.is_complete());
        assert!(!list.get("photo-id").unwrap().uploaded);
    }

    #[test]
    fn test_unknown_document_is_an_error() {
        let mut list = checklist();
        let result = list.mark_uploaded("passport", pdf(), Utc::now());
        assert!(matches!(result, Err(SubmissionError::DocumentNotFound(id)) if id == "passport"));
    }

    #[test]
    fn test_clear_upload_reverts_document() {
        let mut list = checklist();
        list.mark_uploaded("referral", pdf(), Utc::now()).unwrap();
        list.clear_upload("referral").unwrap();
        let doc = list.get("referral").unwrap();
        assert!(!doc.uploaded);
        assert!(doc.file_meta.is_none());
    }

    #[test]
    fn test_duplicate_template_ids_rejected() {
        let result = DocumentChecklist::from_template(vec![
            DocumentTemplate::required("referral", "Referral"),
            DocumentTemplate::required("referral", "Referral again"),
        ]);
        assert!(matches!(result, Err(SubmissionError::DuplicateDocument(_))));
    }

    #[test]
    fn test_reset_restores_template() {
        let mut list = checklist();
        let pristine = list.clone();
        list.mark_uploaded("referral", pdf(), Utc::now()).unwrap();
        list.reset();
        assert_eq!(list, pristine);
    }
}

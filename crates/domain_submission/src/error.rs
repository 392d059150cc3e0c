//! Submission domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError, TemporalError};
use crate::gate::GateRejection;
use crate::history::SubmissionKind;

/// Errors that can occur in the submission domain
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Duplicate document id in template: {0}")]
    DuplicateDocument(String),

    #[error("Service line not found: {0}")]
    ServiceLineNotFound(String),

    #[error("Submission record not found: {0}")]
    RecordNotFound(String),

    #[error("Reference number already recorded: {0}")]
    DuplicateReference(String),

    #[error("Form is {percent}% complete; missing: {}", .missing.join(", "))]
    Incomplete { percent: u8, missing: Vec<String> },

    #[error("Submission rejected: {0}")]
    Rejected(#[from] GateRejection),

    #[error("Expected a {expected:?} template, got {found:?}")]
    WrongFormKind {
        expected: SubmissionKind,
        found: SubmissionKind,
    },

    #[error("Invalid template: {0}")]
    Template(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),
}

impl SubmissionError {
    pub fn validation(message: impl Into<String>) -> Self {
        SubmissionError::Validation(message.into())
    }

    /// Message suitable for showing to the person filling in the form
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Port(e) if e.is_transient() => {
                format!("The submission service could not be reached ({e}). Please try again.")
            }
            SubmissionError::Port(e) => format!("The submission service returned an error: {e}"),
            SubmissionError::Rejected(rejection) => rejection.to_string(),
            other => other.to_string(),
        }
    }
}

//! Ports for external collaborators
//!
//! A submission leaves the process through a payer API, an offline queue and
//! an optional compliance validator. Their traits live in the submission
//! domain and extend [`DomainPort`]; every adapter reports failure as a
//! [`PortError`] so the service handles in-memory and remote adapters alike.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::identifiers::SubmissionId;

/// Failure reported by an adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The remote side has no record of what was asked for
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// The payer refused the payload as submitted
    #[error("Payload rejected: {reason}")]
    Rejected {
        reason: String,
        field: Option<String>,
    },

    /// The network call could not be completed
    #[error("Could not reach {service}: {message}")]
    Unreachable { service: String, message: String },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// The service answered but is not taking requests
    #[error("{service} is unavailable")]
    Unavailable { service: String },

    /// Local storage behind an adapter failed
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl PortError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        PortError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        PortError::Rejected {
            reason: reason.into(),
            field: None,
        }
    }

    /// Rejection pointing at a single payload field
    pub fn rejected_field(reason: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Rejected {
            reason: reason.into(),
            field: Some(field.into()),
        }
    }

    pub fn unreachable(service: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Unreachable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::Unavailable {
            service: service.into(),
        }
    }

    /// True when sending the same payload later may succeed
    ///
    /// Nothing in the workspace retries on its own; the offline queue is the
    /// only fallback.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Unreachable { .. } | PortError::Timeout { .. } | PortError::Unavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker for adapter traits shared across tasks
pub trait DomainPort: Send + Sync + 'static {}

/// Tracing context passed along with each port call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMetadata {
    pub correlation_id: Option<String>,
    /// User the call is made on behalf of
    pub initiated_by: Option<String>,
    pub context: BTreeMap<String, String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Self::default()
        }
    }

    /// Context correlated on the submission id
    pub fn for_submission(id: SubmissionId) -> Self {
        Self::with_correlation_id(id.to_string())
    }

    pub fn initiated_by(mut self, user: impl Into<String>) -> Self {
        self.initiated_by = Some(user.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let error = PortError::not_found("Submission", "CLM-20240615-0001");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "Submission CLM-20240615-0001 not found");
    }

    #[test]
    fn test_transient_failures() {
        let timeout = PortError::Timeout {
            operation: "submit".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());
        assert!(PortError::unavailable("claims-api").is_transient());
        assert!(PortError::unreachable("claims-api", "connection reset").is_transient());
        assert!(!PortError::rejected("member id unknown").is_transient());
        assert!(!PortError::Storage("disk full".to_string()).is_transient());
    }

    #[test]
    fn test_rejected_field() {
        let error = PortError::rejected_field("must be 15 digits", "member_id");
        assert_eq!(
            error,
            PortError::Rejected {
                reason: "must be 15 digits".to_string(),
                field: Some("member_id".to_string()),
            }
        );
    }

    #[test]
    fn test_metadata_for_submission() {
        let id = SubmissionId::new_v7();
        let metadata = OperationMetadata::for_submission(id)
            .initiated_by("billing.clerk")
            .with_context("kind", "CLM");

        assert_eq!(metadata.correlation_id, Some(id.to_string()));
        assert_eq!(metadata.initiated_by.as_deref(), Some("billing.clerk"));
        assert_eq!(metadata.context.get("kind").map(String::as_str), Some("CLM"));
    }
}

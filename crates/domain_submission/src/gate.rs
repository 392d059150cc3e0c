//! Submission gate
//!
//! Runs the pre-submission checks in a fixed order and stops at the first
//! failure:
//!
//! ```text
//! required documents -> service lines -> provider licenses -> daily documentation
//!      (block)             (block)          (overridable)         (overridable)
//! ```
//!
//! The last two checks only apply to forms that bill service lines. An
//! overridable rejection is returned to the caller, who may run the gate
//! again with the matching [`GateOverrides`] flag set once the user has
//! confirmed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::ServiceLineId;
use crate::documentation::DocumentationLog;
use crate::form::SubmissionForm;
use crate::license::{LicenseProblem, LicenseRegistry};

/// The individual checks run by the gate, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCheck {
    RequiredDocuments,
    ServiceLines,
    ProviderLicenses,
    DocumentationCoverage,
}

/// A service line that is not fully populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteLine {
    pub line_id: ServiceLineId,
    pub missing_fields: Vec<String>,
}

/// A provider license problem on a service line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseIssue {
    pub line_id: ServiceLineId,
    pub provider_id: String,
    pub provider_name: String,
    pub problems: Vec<LicenseProblem>,
}

/// Days in a service line's range with no visit note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationGap {
    pub line_id: ServiceLineId,
    pub provider_id: String,
    pub missing_dates: Vec<NaiveDate>,
}

/// Why the gate refused a submission
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateRejection {
    #[error("Missing required documents: {}", .missing.join(", "))]
    MissingDocuments { missing: Vec<String> },

    #[error("Add at least one service line before submitting")]
    NoServiceLines,

    #[error("{} service line(s) are incomplete", .lines.len())]
    IncompleteServiceLines { lines: Vec<IncompleteLine> },

    #[error("{} service line(s) have provider license issues", .issues.len())]
    LicenseIssues { issues: Vec<LicenseIssue> },

    #[error("{} service line(s) lack daily documentation", .gaps.len())]
    DocumentationGaps { gaps: Vec<DocumentationGap> },
}

impl GateRejection {
    pub fn check(&self) -> GateCheck {
        match self {
            GateRejection::MissingDocuments { .. } => GateCheck::RequiredDocuments,
            GateRejection::NoServiceLines | GateRejection::IncompleteServiceLines { .. } => {
                GateCheck::ServiceLines
            }
            GateRejection::LicenseIssues { .. } => GateCheck::ProviderLicenses,
            GateRejection::DocumentationGaps { .. } => GateCheck::DocumentationCoverage,
        }
    }

    /// True if the user may confirm past this rejection
    pub fn is_overridable(&self) -> bool {
        matches!(
            self,
            GateRejection::LicenseIssues { .. } | GateRejection::DocumentationGaps { .. }
        )
    }
}

/// Confirmations the user has given for overridable checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateOverrides {
    pub license: bool,
    pub documentation: bool,
}

impl GateOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            license: true,
            documentation: true,
        }
    }

    /// Adds the confirmation that clears `rejection`, if it can be cleared
    pub fn confirm(mut self, rejection: &GateRejection) -> Self {
        match rejection {
            GateRejection::LicenseIssues { .. } => self.license = true,
            GateRejection::DocumentationGaps { .. } => self.documentation = true,
            _ => {}
        }
        self
    }
}

/// Outcome of a passing gate run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateClearance {
    pub evaluated_on: NaiveDate,
    /// Checks that ran and passed outright
    pub passed: Vec<GateCheck>,
    /// Checks that failed but were confirmed by the user
    pub overridden: Vec<GateRejection>,
}

impl GateClearance {
    pub fn overridden_checks(&self) -> Vec<GateCheck> {
        self.overridden.iter().map(GateRejection::check).collect()
    }
}

/// Pre-submission checks against a facility's licenses and visit notes
#[derive(Debug, Clone, Copy)]
pub struct SubmissionGate<'a> {
    licenses: &'a LicenseRegistry,
    documentation: &'a DocumentationLog,
}

impl<'a> SubmissionGate<'a> {
    pub fn new(licenses: &'a LicenseRegistry, documentation: &'a DocumentationLog) -> Self {
        Self {
            licenses,
            documentation,
        }
    }

    /// Runs every check against `form` as of `submission_date`
    ///
    /// # Errors
    ///
    /// Returns the first failing check. License and documentation failures
    /// are skipped, and recorded on the clearance, when overridden.
    pub fn evaluate<F>(
        &self,
        form: &F,
        overrides: GateOverrides,
        submission_date: NaiveDate,
    ) -> Result<GateClearance, GateRejection>
    where
        F: SubmissionForm + ?Sized,
    {
        let mut clearance = GateClearance {
            evaluated_on: submission_date,
            passed: Vec::new(),
            overridden: Vec::new(),
        };

        Self::check_documents(form)?;
        clearance.passed.push(GateCheck::RequiredDocuments);

        let Some(lines) = form.service_lines() else {
            return Ok(clearance);
        };

        if lines.is_empty() {
            return Err(GateRejection::NoServiceLines);
        }
        let incomplete: Vec<IncompleteLine> = lines
            .iter()
            .filter_map(|line| {
                let missing_fields = line.missing_fields();
                (!missing_fields.is_empty()).then(|| IncompleteLine {
                    line_id: line.id(),
                    missing_fields,
                })
            })
            .collect();
        if !incomplete.is_empty() {
            return Err(GateRejection::IncompleteServiceLines { lines: incomplete });
        }
        clearance.passed.push(GateCheck::ServiceLines);

        let issues: Vec<LicenseIssue> = lines
            .iter()
            .filter_map(|line| {
                let problems = self.licenses.check_provider(
                    line.provider_id(),
                    line.provider_name(),
                    submission_date,
                );
                (!problems.is_empty()).then(|| LicenseIssue {
                    line_id: line.id(),
                    provider_id: line.provider_id().to_string(),
                    provider_name: line.provider_name().to_string(),
                    problems,
                })
            })
            .collect();
        Self::apply(
            &mut clearance,
            GateCheck::ProviderLicenses,
            (!issues.is_empty()).then_some(GateRejection::LicenseIssues { issues }),
            overrides.license,
        )?;

        let gaps: Vec<DocumentationGap> = lines
            .iter()
            .filter_map(|line| {
                let missing_dates = self
                    .documentation
                    .missing_days(line.provider_id(), line.date_range());
                (!missing_dates.is_empty()).then(|| DocumentationGap {
                    line_id: line.id(),
                    provider_id: line.provider_id().to_string(),
                    missing_dates,
                })
            })
            .collect();
        Self::apply(
            &mut clearance,
            GateCheck::DocumentationCoverage,
            (!gaps.is_empty()).then_some(GateRejection::DocumentationGaps { gaps }),
            overrides.documentation,
        )?;

        Ok(clearance)
    }

    fn check_documents<F>(form: &F) -> Result<(), GateRejection>
    where
        F: SubmissionForm + ?Sized,
    {
        let missing: Vec<String> = form
            .checklist()
            .missing_required()
            .into_iter()
            .map(|d| d.name.clone())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GateRejection::MissingDocuments { missing })
        }
    }

    fn apply(
        clearance: &mut GateClearance,
        check: GateCheck,
        failure: Option<GateRejection>,
        overridden: bool,
    ) -> Result<(), GateRejection> {
        match failure {
            None => {
                clearance.passed.push(check);
                Ok(())
            }
            Some(rejection) if overridden => {
                tracing::info!(check = ?check, "gate check overridden by user confirmation");
                clearance.overridden.push(rejection);
                Ok(())
            }
            Some(rejection) => Err(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_sets_matching_flag() {
        let rejection = GateRejection::DocumentationGaps { gaps: vec![] };
        let overrides = GateOverrides::none().confirm(&rejection);
        assert!(overrides.documentation);
        assert!(!overrides.license);
    }

    #[test]
    fn test_hard_blocks_cannot_be_confirmed() {
        let rejection = GateRejection::MissingDocuments {
            missing: vec!["Referral".to_string()],
        };
        assert!(!rejection.is_overridable());
        assert_eq!(GateOverrides::none().confirm(&rejection), GateOverrides::none());
        assert_eq!(rejection.to_string(), "Missing required documents: Referral");
    }

    #[test]
    fn test_rejection_maps_to_check() {
        assert_eq!(GateRejection::NoServiceLines.check(), GateCheck::ServiceLines);
        assert_eq!(
            GateRejection::LicenseIssues { issues: vec![] }.check(),
            GateCheck::ProviderLicenses
        );
    }
}

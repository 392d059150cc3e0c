//! Submission check CLI
//!
//! Runs a draft claim or prior-authorization through the submission
//! workflow with in-memory adapters and reports the outcome as JSON:
//!
//! ```text
//! template.json + draft.json -> form -> progress -> gate -> mock payer / offline queue -> report
//! ```

pub mod config;
pub mod draft;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use domain_submission::adapters::{ConnectivityFlag, InMemoryOfflineQueue, MockSubmissionAdapter};
use domain_submission::{
    FormTemplate, GateOverrides, GateRejection, Progress, SubmissionError, SubmissionKind,
    SubmissionReceipt, SubmissionService,
};

pub use crate::config::CliConfig;
pub use crate::draft::DraftFile;

/// Days ahead a license expiry is reported as a warning
pub const LICENSE_EXPIRY_WARNING_DAYS: i64 = 30;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid template: {0}")]
    Template(String),

    #[error("Invalid draft: {0}")]
    Draft(#[from] serde_json::Error),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// What happened to the draft
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    Submitted { receipt: SubmissionReceipt },
    Incomplete { missing: Vec<String> },
    Rejected { rejection: GateRejection, overridable: bool },
}

impl CheckOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, CheckOutcome::Submitted { .. })
    }
}

/// JSON report printed by the binary
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub kind: SubmissionKind,
    pub progress_percent: u8,
    pub progress: Progress,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// Notices that do not block submission
    pub warnings: Vec<String>,
}

/// Per-run options layered over [`CliConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    pub offline: bool,
    pub overrides: GateOverrides,
}

/// Evaluates and, when possible, submits a draft
///
/// Gate rejections and incomplete forms are reported in the outcome rather
/// than returned as errors.
pub async fn run_check(
    template_json: &str,
    draft_json: &str,
    config: &CliConfig,
    options: CheckOptions,
) -> Result<CheckReport, CliError> {
    let template = FormTemplate::from_json(template_json).map_err(|e| CliError::Template(e.to_string()))?;
    let draft = DraftFile::from_json(draft_json)?;
    let form = draft.build_form(template, Utc::now())?;

    let overrides = GateOverrides {
        license: draft.overrides.license || options.overrides.license,
        documentation: draft.overrides.documentation || options.overrides.documentation,
    };
    let online = !(config.offline || options.offline);

    let mut warnings = license_warnings(&draft, config);

    let mut service = SubmissionService::new(
        Arc::new(MockSubmissionAdapter::default()),
        Arc::new(InMemoryOfflineQueue::new()),
        Arc::new(ConnectivityFlag::new(online)),
    )
    .with_licenses(draft.licenses.clone())
    .with_documentation(draft.documentation.clone())
    .with_timezone(config.facility_timezone);

    let progress = form.progress();
    tracing::debug!(
        kind = ?form.kind(),
        percent = progress.percent(),
        online,
        "checking draft"
    );

    let outcome = match service
        .submit(form.as_ref(), overrides, config.reviewer.as_deref())
        .await
    {
        Ok(receipt) => {
            if let Some(report) = &receipt.compliance {
                warnings.extend(report.issues.iter().cloned());
            }
            CheckOutcome::Submitted { receipt }
        }
        Err(SubmissionError::Incomplete { missing, .. }) => CheckOutcome::Incomplete { missing },
        Err(SubmissionError::Rejected(rejection)) => CheckOutcome::Rejected {
            overridable: rejection.is_overridable(),
            rejection,
        },
        Err(other) => return Err(other.into()),
    };

    Ok(CheckReport {
        kind: form.kind(),
        progress_percent: progress.percent(),
        progress,
        outcome,
        warnings,
    })
}

fn license_warnings(draft: &DraftFile, config: &CliConfig) -> Vec<String> {
    let today = config.facility_timezone.today();
    let mut warnings: Vec<String> = draft
        .licenses
        .expiring_within(today, LICENSE_EXPIRY_WARNING_DAYS)
        .into_iter()
        .map(|l| {
            format!(
                "License {} for {} expires on {}",
                l.license_number, l.clinician_name, l.expiry_date
            )
        })
        .collect();
    warnings.extend(draft.licenses.invalid_records().into_iter().map(|l| {
        format!("License record for employee '{}' is incomplete", l.employee_id)
    }));
    warnings
}

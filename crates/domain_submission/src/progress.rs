//! Completion progress
//!
//! Progress counts uploaded required documents and, for forms that declare
//! them, filled required fields. The percentage is rounded half-up, except
//! that an unfinished form never rounds up to 100.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::checklist::DocumentChecklist;

/// Snapshot of how much of a form is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Required items that are satisfied
    pub satisfied: usize,
    /// Required items in total
    pub required: usize,
}

impl Progress {
    pub fn new(satisfied: usize, required: usize) -> Self {
        Self {
            satisfied: satisfied.min(required),
            required,
        }
    }

    /// Completion as an integer percentage in `0..=100`
    ///
    /// A form with nothing required is complete.
    pub fn percent(&self) -> u8 {
        if self.required == 0 {
            return 100;
        }
        if self.satisfied >= self.required {
            return 100;
        }
        let rounded = (200 * self.satisfied + self.required) / (2 * self.required);
        rounded.min(99) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.satisfied >= self.required
    }
}

/// True when a field value counts as filled in
pub fn is_filled(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Progress over the required documents of a checklist
pub fn document_progress(checklist: &DocumentChecklist) -> Progress {
    Progress::new(checklist.uploaded_required_count(), checklist.required_count())
}

/// Progress over required documents and required form fields together
pub fn form_progress(
    checklist: &DocumentChecklist,
    required_fields: &[String],
    values: &BTreeMap<String, String>,
) -> Progress {
    let filled = required_fields
        .iter()
        .filter(|name| is_filled(values.get(*name)))
        .count();

    Progress::new(
        checklist.uploaded_required_count() + filled,
        checklist.required_count() + required_fields.len(),
    )
}

/// Names of required fields that are still blank
pub fn missing_fields<'a>(
    required_fields: &'a [String],
    values: &BTreeMap<String, String>,
) -> Vec<&'a str> {
    required_fields
        .iter()
        .filter(|name| !is_filled(values.get(*name)))
        .map(String::as_str)
        .collect()
}

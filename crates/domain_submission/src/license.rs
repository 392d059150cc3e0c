//! Clinician licenses
//!
//! Claims may only bill services by clinicians whose license is active,
//! compliant and unexpired on the submission date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::LicenseId;

/// Regulator status of a license
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Expired,
    Suspended,
    Pending,
}

/// Internal compliance review outcome for a clinician
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    UnderReview,
}

/// A clinician's professional license
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct License {
    #[serde(default)]
    pub id: LicenseId,
    #[validate(length(min = 1))]
    pub clinician_name: String,
    #[validate(length(min = 1))]
    pub employee_id: String,
    #[validate(length(min = 1))]
    pub license_number: String,
    pub license_status: LicenseStatus,
    pub expiry_date: NaiveDate,
    pub compliance_status: ComplianceStatus,
}

/// Why a provider cannot bill on a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum LicenseProblem {
    /// No license on file for the provider
    NoLicense,
    /// License is not in `Active` status
    NotActive { status: LicenseStatus },
    /// License expired before the date checked
    Expired { expiry_date: NaiveDate },
    /// Clinician has not passed compliance review
    NotCompliant { status: ComplianceStatus },
}

impl std::fmt::Display for LicenseProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseProblem::NoLicense => write!(f, "no license on file"),
            LicenseProblem::NotActive { status } => write!(f, "license is {:?}", status),
            LicenseProblem::Expired { expiry_date } => write!(f, "license expired on {}", expiry_date),
            LicenseProblem::NotCompliant { status } => write!(f, "compliance status is {:?}", status),
        }
    }
}

impl License {
    /// Every reason this license cannot be used on `date`
    pub fn problems_on(&self, date: NaiveDate) -> Vec<LicenseProblem> {
        let mut problems = Vec::new();
        if self.license_status != LicenseStatus::Active {
            problems.push(LicenseProblem::NotActive {
                status: self.license_status,
            });
        }
        if self.expiry_date < date {
            problems.push(LicenseProblem::Expired {
                expiry_date: self.expiry_date,
            });
        }
        if self.compliance_status != ComplianceStatus::Compliant {
            problems.push(LicenseProblem::NotCompliant {
                status: self.compliance_status,
            });
        }
        problems
    }

    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.problems_on(date).is_empty()
    }

    /// True if this license is held by the employee with `provider_id`
    pub fn matches_employee(&self, provider_id: &str) -> bool {
        let provider_id = provider_id.trim();
        !provider_id.is_empty() && self.employee_id.trim() == provider_id
    }

    /// True if this license names the clinician, ignoring case
    pub fn matches_clinician(&self, provider_name: &str) -> bool {
        let provider_name = provider_name.trim();
        !provider_name.is_empty() && self.clinician_name.trim().eq_ignore_ascii_case(provider_name)
    }
}

/// The licenses known to a facility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseRegistry {
    licenses: Vec<License>,
}

impl LicenseRegistry {
    pub fn new(licenses: Vec<License>) -> Self {
        Self { licenses }
    }

    pub fn add(&mut self, license: License) {
        self.licenses.push(license);
    }

    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    /// License of the provider on a service line
    ///
    /// Employee ids are compared exactly across the whole registry before
    /// falling back to the clinician name.
    pub fn find_for_provider(&self, provider_id: &str, provider_name: &str) -> Option<&License> {
        self.licenses
            .iter()
            .find(|l| l.matches_employee(provider_id))
            .or_else(|| self.licenses.iter().find(|l| l.matches_clinician(provider_name)))
    }

    /// Problems preventing the provider from billing on `date`
    pub fn check_provider(
        &self,
        provider_id: &str,
        provider_name: &str,
        date: NaiveDate,
    ) -> Vec<LicenseProblem> {
        match self.find_for_provider(provider_id, provider_name) {
            Some(license) => license.problems_on(date),
            None => vec![LicenseProblem::NoLicense],
        }
    }

    /// Active licenses expiring within `days` of `today`, soonest first
    pub fn expiring_within(&self, today: NaiveDate, days: i64) -> Vec<&License> {
        let horizon = today + chrono::Duration::days(days);
        let mut expiring: Vec<&License> = self
            .licenses
            .iter()
            .filter(|l| l.license_status == LicenseStatus::Active)
            .filter(|l| l.expiry_date >= today && l.expiry_date <= horizon)
            .collect();
        expiring.sort_by_key(|l| l.expiry_date);
        expiring
    }

    /// Licenses whose record itself is incomplete
    pub fn invalid_records(&self) -> Vec<&License> {
        self.licenses.iter().filter(|l| l.validate().is_err()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn license(employee_id: &str, name: &str, expiry: NaiveDate) -> License {
        License {
            id: LicenseId::new(),
            clinician_name: name.to_string(),
            employee_id: employee_id.to_string(),
            license_number: format!("DOH-{employee_id}"),
            license_status: LicenseStatus::Active,
            expiry_date: expiry,
            compliance_status: ComplianceStatus::Compliant,
        }
    }

    #[test]
    fn test_valid_through_expiry_date() {
        let l = license("EMP-1", "Sara Ahmed", date(2024, 6, 30));
        assert!(l.is_valid_on(date(2024, 6, 30)));
        assert_eq!(
            l.problems_on(date(2024, 7, 1)),
            vec![LicenseProblem::Expired { expiry_date: date(2024, 6, 30) }]
        );
    }

    #[test]
    fn test_suspended_and_non_compliant_reported_together() {
        let mut l = license("EMP-1", "Sara Ahmed", date(2030, 1, 1));
        l.license_status = LicenseStatus::Suspended;
        l.compliance_status = ComplianceStatus::UnderReview;
        assert_eq!(l.problems_on(date(2024, 1, 1)).len(), 2);
    }

    #[test]
    fn test_match_by_id_then_name() {
        let registry = LicenseRegistry::new(vec![license("EMP-1", "Sara Ahmed", date(2030, 1, 1))]);
        assert!(registry.find_for_provider("EMP-1", "Someone Else").is_some());
        assert!(registry.find_for_provider("EMP-2", "Sara Ahmed").is_some());
        assert!(registry.find_for_provider("", "sara ahmed").is_some());
        assert!(registry.find_for_provider("EMP-2", "Someone Else").is_none());
    }

    #[test]
    fn test_employee_id_is_exact() {
        let registry = LicenseRegistry::new(vec![license("EMP-1", "Sara Ahmed", date(2030, 1, 1))]);
        assert!(registry.find_for_provider("emp-1", "Someone Else").is_none());
    }

    #[test]
    fn test_id_match_wins_over_earlier_name_match() {
        let registry = LicenseRegistry::new(vec![
            license("EMP-7", "Sara Ahmed", date(2020, 1, 1)),
            license("EMP-1", "Sara Ahmed", date(2030, 1, 1)),
        ]);
        let found = registry.find_for_provider("EMP-1", "Sara Ahmed").unwrap();
        assert_eq!(found.employee_id, "EMP-1");
    }

    #[test]
    fn test_mistyped_id_falls_back_to_name() {
        let registry = LicenseRegistry::new(vec![license("EMP-001", "Sara Ahmed", date(2030, 1, 1))]);
        assert!(registry
            .check_provider("EMP-999", "Sara Ahmed", date(2024, 1, 1))
            .is_empty());
    }

    #[test]
    fn test_unknown_provider_has_no_license() {
        let registry = LicenseRegistry::default();
        assert_eq!(
            registry.check_provider("EMP-9", "Nobody", date(2024, 1, 1)),
            vec![LicenseProblem::NoLicense]
        );
    }

    #[test]
    fn test_expiring_within_sorted() {
        let today = date(2024, 1, 1);
        let registry = LicenseRegistry::new(vec![
            license("EMP-1", "A", date(2024, 1, 20)),
            license("EMP-2", "B", date(2024, 1, 5)),
            license("EMP-3", "C", date(2024, 6, 1)),
        ]);
        let ids: Vec<_> = registry
            .expiring_within(today, 30)
            .iter()
            .map(|l| l.employee_id.as_str())
            .collect();
        assert_eq!(ids, vec!["EMP-2", "EMP-1"]);
    }

    #[test]
    fn test_invalid_records_flags_blank_license_number() {
        let mut l = license("EMP-1", "A", date(2030, 1, 1));
        l.license_number.clear();
        let registry = LicenseRegistry::new(vec![l]);
        assert_eq!(registry.invalid_records().len(), 1);
    }
}

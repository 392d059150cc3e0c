//! Custom Test Assertions
//!
//! Assertion helpers for forms, gate results and the ledger that print the
//! domain state on failure instead of a bare `assert!` message.

use core_kernel::Money;
use domain_submission::{
    GateCheck, GateClearance, GateRejection, ServiceLine, ServiceLines, SubmissionForm,
    SubmissionRecord,
};

/// Asserts the form's progress percentage and that submission availability matches it
pub fn assert_progress<F: SubmissionForm + ?Sized>(form: &F, expected_percent: u8) {
    let progress = form.progress();
    assert_eq!(
        progress.percent(),
        expected_percent,
        "Progress mismatch: {}/{} satisfied, missing {:?}",
        progress.satisfied,
        progress.required,
        form.missing_items()
    );
    assert_eq!(
        form.can_submit(),
        expected_percent == 100,
        "can_submit disagrees with progress {}%",
        expected_percent
    );
}

/// Asserts that a gate run was rejected by `check` and returns the rejection
pub fn assert_rejected_by(result: Result<GateClearance, GateRejection>, check: GateCheck) -> GateRejection {
    match result {
        Ok(clearance) => panic!("Expected rejection by {:?}, gate cleared: {:?}", check, clearance),
        Err(rejection) => {
            assert_eq!(
                rejection.check(),
                check,
                "Rejected by the wrong check: {}",
                rejection
            );
            rejection
        }
    }
}

/// Asserts that a gate run cleared with exactly the given checks overridden
pub fn assert_cleared_with(
    result: Result<GateClearance, GateRejection>,
    overridden: &[GateCheck],
) -> GateClearance {
    match result {
        Err(rejection) => panic!("Expected clearance, gate rejected: {}", rejection),
        Ok(clearance) => {
            assert_eq!(clearance.overridden_checks(), overridden);
            clearance
        }
    }
}

/// Asserts that an update left the record's identity untouched
pub fn assert_identity_preserved(before: &SubmissionRecord, after: &SubmissionRecord) {
    assert_eq!(before.id(), after.id(), "submission id changed");
    assert_eq!(
        before.reference_number(),
        after.reference_number(),
        "reference number changed"
    );
    assert_eq!(before.kind(), after.kind(), "submission kind changed");
    assert_eq!(
        before.submission_date(),
        after.submission_date(),
        "submission date changed"
    );
    assert_eq!(before.amount(), after.amount(), "claimed amount changed");
    assert_eq!(
        before.is_queued_offline(),
        after.is_queued_offline(),
        "offline flag changed"
    );
}

/// Asserts that a line's total is its quantity times its unit price
pub fn assert_line_total(line: &ServiceLine) {
    let expected = line.unit_price().amount() * rust_decimal::Decimal::from(line.quantity());
    assert_eq!(
        line.total_amount().amount(),
        expected,
        "Line {} total {} != {} x {}",
        line.id(),
        line.total_amount(),
        line.quantity(),
        line.unit_price()
    );
}

/// Asserts that the grand total equals the sum of line totals
pub fn assert_grand_total(lines: &ServiceLines, expected: &Money) {
    let total = lines.grand_total().unwrap_or_else(|e| panic!("grand total failed: {e}"));
    assert_eq!(&total, expected, "Grand total mismatch over {} lines", lines.len());
    for line in lines.iter() {
        assert_line_total(line);
    }
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{ready_claim, ClaimFormBuilder};

    #[test]
    fn test_assert_progress_on_ready_claim() {
        assert_progress(&ready_claim(), 100);
    }

    #[test]
    fn test_assert_progress_missing_one_document() {
        let form = ClaimFormBuilder::new().without_document("invoice").build();
        assert_progress(&form, 92);
    }

    #[test]
    #[should_panic(expected = "Progress mismatch")]
    fn test_assert_progress_reports_mismatch() {
        assert_progress(&ClaimFormBuilder::new().build(), 50);
    }

    #[test]
    fn test_assert_ok_macro() {
        let result: Result<i32, String> = Ok(42);
        assert_eq!(assert_ok!(result), 42);
    }

    #[test]
    fn test_assert_err_variant_macro() {
        let result: Result<(), GateRejection> = Err(GateRejection::NoServiceLines);
        assert_err_variant!(result, GateRejection::NoServiceLines);
    }
}

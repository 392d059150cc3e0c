//! Property-Based Test Generators
//!
//! Proptest strategies for service lines, document uploads and ledger
//! updates. Generated values respect the constructors' invariants unless the
//! strategy name says otherwise.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, DateRange, Money};
use domain_submission::{ServiceLineDraft, ServiceLineEdit, StatusUpdate, SubmissionStatus};

use crate::fixtures::LicenseFixtures;

/// Strategy for currencies the facility bills in
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::AED),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::SAR),
        Just(Currency::INR),
    ]
}

/// Strategy for unit prices with two decimal places, 0.01 to 9,999.99
pub fn unit_price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for non-negative money in a fixed currency
pub fn money_strategy(currency: Currency) -> impl Strategy<Value = Money> {
    (0i64..100_000_000i64).prop_map(move |minor| Money::from_minor(minor, currency))
}

/// Strategy for dates in 2024
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..366).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default() + Duration::days(offset)
    })
}

/// Strategy for inclusive ranges of one to thirty-one days
pub fn date_range_strategy() -> impl Strategy<Value = DateRange> {
    (date_strategy(), 0i64..31).prop_map(|(start, extra)| {
        DateRange::new(start, start + Duration::days(extra)).unwrap()
    })
}

/// Strategy for service codes like `17-26-3`
pub fn service_code_strategy() -> impl Strategy<Value = String> {
    "[0-9]{2}-[0-9]{2}-[0-9]"
}

/// Strategy for fully populated service line input
pub fn service_line_draft_strategy() -> impl Strategy<Value = ServiceLineDraft> {
    (
        service_code_strategy(),
        "[A-Z][a-z]{3,12}( [a-z]{3,10})?",
        1u32..60,
        unit_price_strategy(),
        date_range_strategy(),
        prop_oneof![
            Just((LicenseFixtures::NURSE_ID, LicenseFixtures::NURSE_NAME)),
            Just((LicenseFixtures::THERAPIST_ID, LicenseFixtures::THERAPIST_NAME)),
        ],
    )
        .prop_map(
            |(code, description, quantity, unit_price, date_range, (provider_id, provider_name))| {
                ServiceLineDraft {
                    code,
                    description,
                    quantity,
                    unit_price,
                    date_range,
                    provider_id: provider_id.to_string(),
                    provider_name: provider_name.to_string(),
                }
            },
        )
}

/// Strategy for single service line edits, including ones that blank a field
pub fn service_line_edit_strategy() -> impl Strategy<Value = ServiceLineEdit> {
    prop_oneof![
        prop_oneof![Just(String::new()), service_code_strategy()].prop_map(ServiceLineEdit::Code),
        "( |[a-z]{1,10})".prop_map(ServiceLineEdit::Description),
        (0u32..60).prop_map(ServiceLineEdit::Quantity),
        unit_price_strategy().prop_map(ServiceLineEdit::UnitPrice),
        date_range_strategy().prop_map(ServiceLineEdit::DateRange),
        ("(EMP-[0-9]{4})?", "[A-Z][a-z]{2,8}").prop_map(|(id, name)| ServiceLineEdit::Provider { id, name }),
    ]
}

/// Strategy for which documents of an `n`-item checklist get uploaded
pub fn upload_pattern_strategy(n: usize) -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), n)
}

/// Strategy for payer statuses
pub fn status_strategy() -> impl Strategy<Value = SubmissionStatus> {
    prop_oneof![
        Just(SubmissionStatus::Pending),
        Just(SubmissionStatus::InReview),
        Just(SubmissionStatus::Approved),
        Just(SubmissionStatus::Paid),
        Just(SubmissionStatus::Rejected),
        Just(SubmissionStatus::AdditionalInfo),
        Just(SubmissionStatus::Returned),
        Just(SubmissionStatus::Partial),
    ]
}

/// Strategy for status updates with optional comments and reviewer
pub fn status_update_strategy() -> impl Strategy<Value = StatusUpdate> {
    (
        status_strategy(),
        proptest::option::of("[A-Za-z ]{1,40}"),
        proptest::option::of("[A-Z][a-z]{2,10}"),
    )
        .prop_map(|(status, comments, reviewer)| {
            let mut update = StatusUpdate::new(status);
            if let Some(comments) = comments {
                update = update.with_comments(comments);
            }
            if let Some(reviewer) = reviewer {
                update = update.with_reviewer(reviewer);
            }
            update
        })
}

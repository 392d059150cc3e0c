//! Daily visit documentation
//!
//! A claim line billing a date range needs a visit note from its provider
//! for every day in that range.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::DateRange;

/// Dates with a visit note on file, per provider id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentationLog {
    entries: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl DocumentationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visit note for a provider on a date
    pub fn record(&mut self, provider_id: impl Into<String>, date: NaiveDate) {
        self.entries.entry(provider_id.into()).or_default().insert(date);
    }

    /// Records a visit note for every day of a range
    pub fn record_range(&mut self, provider_id: impl Into<String>, range: &DateRange) {
        let days = self.entries.entry(provider_id.into()).or_default();
        days.extend(range.iter_days());
    }

    pub fn has_entry(&self, provider_id: &str, date: NaiveDate) -> bool {
        self.entries
            .get(provider_id)
            .is_some_and(|days| days.contains(&date))
    }

    /// Days in `range` without a note from the provider, in order
    pub fn missing_days(&self, provider_id: &str, range: &DateRange) -> Vec<NaiveDate> {
        range
            .iter_days()
            .filter(|day| !self.has_entry(provider_id, *day))
            .collect()
    }

    pub fn covers(&self, provider_id: &str, range: &DateRange) -> bool {
        range.iter_days().all(|day| self.has_entry(provider_id, day))
    }

    /// Number of documented days for a provider
    pub fn documented_days(&self, provider_id: &str) -> usize {
        self.entries.get(provider_id).map_or(0, BTreeSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_missing_days_reported_in_order() {
        let mut log = DocumentationLog::new();
        log.record("EMP-1", date(1));
        log.record("EMP-1", date(3));

        let range = DateRange::new(date(1), date(4)).unwrap();
        assert_eq!(log.missing_days("EMP-1", &range), vec![date(2), date(4)]);
        assert!(!log.covers("EMP-1", &range));
    }

    #[test]
    fn test_record_range_covers_range() {
        let mut log = DocumentationLog::new();
        let range = DateRange::new(date(10), date(14)).unwrap();
        log.record_range("EMP-1", &range);

        assert!(log.covers("EMP-1", &range));
        assert_eq!(log.documented_days("EMP-1"), 5);
        assert!(!log.covers("EMP-2", &range));
    }

    #[test]
    fn test_deserializes_from_provider_map() {
        let json = r#"{"EMP-1":["2024-05-01","2024-05-02"]}"#;
        let log: DocumentationLog = serde_json::from_str(json).unwrap();
        assert!(log.has_entry("EMP-1", date(2)));
    }
}

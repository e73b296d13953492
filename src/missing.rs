//! Missing-translation tracking and telemetry reporting.
//!
//! The tracker is owned by the catalog store and fed exclusively from the
//! `get()` miss path. Counts only ever increase; the map is cleared by an
//! explicit `submit()`/`reset()`, never implicitly.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One missing key observation, keyed by `language:namespace:key`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MissingTranslationRecord {
    pub key: String,
    pub language: String,
    pub namespace: String,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// The batch shape accepted by the telemetry sink.
#[derive(Debug, Clone, Serialize)]
pub struct MissingReport {
    pub by_language: HashMap<String, u64>,
    pub by_namespace: HashMap<String, u64>,
    pub entries: Vec<MissingTranslationRecord>,
}

impl MissingReport {
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|record| record.count).sum()
    }
}

/// Tracker for translation keys requested but not found.
#[derive(Debug, Default)]
pub struct MissingTracker {
    records: Mutex<HashMap<String, MissingTranslationRecord>>,
}

impl MissingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one miss; repeat misses for the same key increment the count
    /// and refresh `last_seen`.
    pub fn record(&self, key: &str, language: &str, namespace: &str) {
        let map_key = format!("{language}:{namespace}:{key}");
        let now = Utc::now();
        let mut records = self.records.lock().unwrap();
        records
            .entry(map_key)
            .and_modify(|record| {
                record.count += 1;
                record.last_seen = now;
            })
            .or_insert_with(|| MissingTranslationRecord {
                key: key.to_string(),
                language: language.to_string(),
                namespace: namespace.to_string(),
                count: 1,
                first_seen: now,
                last_seen: now,
            });
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// Snapshot the current state as a telemetry batch without clearing.
    pub fn report(&self) -> MissingReport {
        let records = self.records.lock().unwrap();
        let mut by_language: HashMap<String, u64> = HashMap::new();
        let mut by_namespace: HashMap<String, u64> = HashMap::new();
        let mut entries: Vec<MissingTranslationRecord> = records.values().cloned().collect();
        entries.sort_by(|a, b| {
            (&a.language, &a.namespace, &a.key).cmp(&(&b.language, &b.namespace, &b.key))
        });
        for record in &entries {
            *by_language.entry(record.language.clone()).or_default() += record.count;
            *by_namespace.entry(record.namespace.clone()).or_default() += record.count;
        }
        MissingReport {
            by_language,
            by_namespace,
            entries,
        }
    }

    /// Produce the telemetry batch and clear the tracker in one step.
    pub fn submit(&self) -> MissingReport {
        let report = self.report();
        self.reset();
        report
    }

    pub fn reset(&self) {
        self.records.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creates_entry() {
        let tracker = MissingTracker::new();
        tracker.record("common.save", "tr", "common");
        assert_eq!(tracker.len(), 1);

        let report = tracker.report();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].key, "common.save");
        assert_eq!(report.entries[0].count, 1);
        assert_eq!(report.entries[0].first_seen, report.entries[0].last_seen);
    }

    #[test]
    fn test_repeat_miss_increments_monotonically() {
        let tracker = MissingTracker::new();
        for _ in 0..5 {
            tracker.record("title", "ar", "dashboard");
        }
        let report = tracker.report();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].count, 5);
        assert!(report.entries[0].last_seen >= report.entries[0].first_seen);
    }

    #[test]
    fn test_same_key_different_language_is_distinct() {
        let tracker = MissingTracker::new();
        tracker.record("save", "tr", "common");
        tracker.record("save", "ar", "common");
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_report_aggregates_by_language_and_namespace() {
        let tracker = MissingTracker::new();
        tracker.record("a", "tr", "common");
        tracker.record("a", "tr", "common");
        tracker.record("b", "tr", "errors");
        tracker.record("c", "ar", "common");

        let report = tracker.report();
        assert_eq!(report.by_language.get("tr"), Some(&3));
        assert_eq!(report.by_language.get("ar"), Some(&1));
        assert_eq!(report.by_namespace.get("common"), Some(&3));
        assert_eq!(report.by_namespace.get("errors"), Some(&1));
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn test_report_does_not_clear() {
        let tracker = MissingTracker::new();
        tracker.record("a", "tr", "common");
        tracker.report();
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_submit_clears() {
        let tracker = MissingTracker::new();
        tracker.record("a", "tr", "common");
        let report = tracker.submit();
        assert_eq!(report.entries.len(), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_reset() {
        let tracker = MissingTracker::new();
        tracker.record("a", "tr", "common");
        tracker.reset();
        assert!(tracker.is_empty());
        assert_eq!(tracker.report().total(), 0);
    }

    #[test]
    fn test_entries_sorted() {
        let tracker = MissingTracker::new();
        tracker.record("z", "tr", "common");
        tracker.record("a", "ar", "common");
        tracker.record("m", "tr", "common");
        let report = tracker.report();
        let keys: Vec<_> = report
            .entries
            .iter()
            .map(|r| (r.language.as_str(), r.key.as_str()))
            .collect();
        assert_eq!(keys, vec![("ar", "a"), ("tr", "m"), ("tr", "z")]);
    }

    #[test]
    fn test_report_serializes() {
        let tracker = MissingTracker::new();
        tracker.record("save", "tr", "common");
        let json = serde_json::to_value(tracker.report()).unwrap();
        assert!(json.get("by_language").is_some());
        assert!(json.get("entries").unwrap().as_array().unwrap().len() == 1);
    }
}

//! Daily request quota tracking
//!
//! Counts origin API requests per local calendar day in a small JSON file kept
//! next to the cache records. The counter only ever increases within a day; a
//! record from another day counts as zero, so a new day implicitly starts the
//! count over without an explicit reset.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One day's request count.
#[derive(Debug, Serialize, Deserialize)]
struct UsageRecord {
    date: NaiveDate,
    count: u32,
}

/// Tracks origin requests against a per-day ceiling.
///
/// Storage failures degrade gracefully: an unreadable record counts as zero
/// and a failed persist drops the increment. Quota enforcement is therefore
/// best-effort, matching the rest of the cache layer.
#[derive(Debug, Clone)]
pub struct QuotaGovernor {
    /// File holding today's usage record
    usage_path: PathBuf,
    /// Maximum origin requests per calendar day
    daily_limit: u32,
}

impl QuotaGovernor {
    /// Creates a governor persisting its counter at `usage_path`.
    pub fn new(usage_path: PathBuf, daily_limit: u32) -> Self {
        Self {
            usage_path,
            daily_limit,
        }
    }

    /// The configured ceiling on requests per day.
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Today's request count. Missing, unreadable, or stale-dated records
    /// count as zero.
    pub fn current_count(&self) -> u32 {
        let content = match fs::read_to_string(&self.usage_path) {
            Ok(content) => content,
            Err(_) => return 0,
        };

        match serde_json::from_str::<UsageRecord>(&content) {
            Ok(record) if record.date == today() => record.count,
            _ => 0,
        }
    }

    /// Records one more origin request for today.
    ///
    /// Persistence failures are dropped after a debug log; the caller never
    /// sees them.
    pub fn increment(&self) {
        let record = UsageRecord {
            date: today(),
            count: self.current_count() + 1,
        };

        if let Some(parent) = self.usage_path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                debug!(error = %err, "failed to create usage directory");
                return;
            }
        }

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(err) => {
                debug!(error = %err, "failed to serialize usage record");
                return;
            }
        };

        if let Err(err) = fs::write(&self.usage_path, json) {
            debug!(error = %err, "failed to persist usage record");
        }
    }

    /// Whether today's count has reached the ceiling.
    pub fn is_exceeded(&self) -> bool {
        self.current_count() >= self.daily_limit
    }
}

/// The local calendar date used as the counter key.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_governor(limit: u32) -> (QuotaGovernor, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let governor = QuotaGovernor::new(temp_dir.path().join("usage.json"), limit);
        (governor, temp_dir)
    }

    #[test]
    fn test_count_is_zero_without_record() {
        let (governor, _temp_dir) = create_test_governor(20);
        assert_eq!(governor.current_count(), 0);
        assert!(!governor.is_exceeded());
    }

    #[test]
    fn test_increment_advances_count() {
        let (governor, _temp_dir) = create_test_governor(20);

        governor.increment();
        assert_eq!(governor.current_count(), 1);

        governor.increment();
        governor.increment();
        assert_eq!(governor.current_count(), 3);
    }

    #[test]
    fn test_exceeded_exactly_at_limit() {
        let (governor, _temp_dir) = create_test_governor(3);

        governor.increment();
        governor.increment();
        assert!(!governor.is_exceeded());

        governor.increment();
        assert!(governor.is_exceeded());
    }

    #[test]
    fn test_record_from_previous_day_counts_as_zero() {
        let (governor, _temp_dir) = create_test_governor(20);

        let yesterday = UsageRecord {
            date: today() - chrono::Duration::days(1),
            count: 15,
        };
        fs::write(&governor.usage_path, serde_json::to_string(&yesterday).unwrap()).unwrap();

        assert_eq!(governor.current_count(), 0);
    }

    #[test]
    fn test_increment_after_day_rollover_restarts_at_one() {
        let (governor, _temp_dir) = create_test_governor(20);

        let yesterday = UsageRecord {
            date: today() - chrono::Duration::days(1),
            count: 15,
        };
        fs::write(&governor.usage_path, serde_json::to_string(&yesterday).unwrap()).unwrap();

        governor.increment();
        assert_eq!(governor.current_count(), 1);
    }

    #[test]
    fn test_corrupt_record_counts_as_zero() {
        let (governor, _temp_dir) = create_test_governor(20);

        fs::write(&governor.usage_path, "not json").unwrap();

        assert_eq!(governor.current_count(), 0);
        governor.increment();
        assert_eq!(governor.current_count(), 1);
    }

    #[test]
    fn test_increment_creates_missing_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let governor = QuotaGovernor::new(temp_dir.path().join("nested").join("usage.json"), 20);

        governor.increment();
        assert_eq!(governor.current_count(), 1);
    }

    #[test]
    fn test_zero_limit_is_always_exceeded() {
        let (governor, _temp_dir) = create_test_governor(0);
        assert!(governor.is_exceeded());
    }
}

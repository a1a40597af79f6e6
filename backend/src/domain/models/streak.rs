use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per (family, child, chore) record of consecutive-period completions.
///
/// `last_period` is the start of the most recent period that was either
/// counted or protected, so the next genuine completion still reads as
/// consecutive after an excused miss. Streaks are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub id: String,
    pub family_id: String,
    pub child_id: String,
    pub chore_id: String,
    pub current: u32,
    pub best: u32,
    pub last_period: Option<NaiveDate>,
    /// Consecutive evaluated misses; drives the penalty tier computation
    pub miss_run: u32,
    pub disrupted: bool,
    pub updated_at: DateTime<Utc>,
}

impl Streak {
    /// Generate a unique ID for a streak record.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("streak::{}::{}", timestamp_millis, super::id_suffix())
    }

    /// Fresh record with no completions counted yet.
    pub fn new(family_id: &str, child_id: &str, chore_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::generate_id(now.timestamp_millis() as u64),
            family_id: family_id.to_string(),
            child_id: child_id.to_string(),
            chore_id: chore_id.to_string(),
            current: 0,
            best: 0,
            last_period: None,
            miss_run: 0,
            disrupted: false,
            updated_at: now,
        }
    }
}

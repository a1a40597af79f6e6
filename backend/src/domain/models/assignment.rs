use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::chore::{Chore, Frequency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Open,
    Completed,
}

/// One instance of a chore expected within one period.
///
/// Invariant: at most one open assignment per (chore, child, period). Shared
/// competitive assignments carry `child_id = None` until a champion's
/// completion is approved; they count against the invariant per (chore,
/// period) family-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub chore_id: String,
    pub family_id: String,
    pub child_id: Option<String>,
    /// Period this assignment belongs to, e.g. "2026-08-05" or "2026-W32"
    pub period_key: String,
    /// First day of the period
    pub period_start: NaiveDate,
    /// Frequency snapshot taken from the chore at creation
    pub frequency: Frequency,
    /// Reward snapshot; chore edits never alter existing assignments
    pub base_reward_pence: i64,
    pub competitive: bool,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Generate a unique ID for an assignment.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("assignment::{}::{}", timestamp_millis, super::id_suffix())
    }

    /// Build a fresh open assignment for a chore in the given period,
    /// snapshotting the chore's reward and competitive flag.
    pub fn new_open(
        chore: &Chore,
        child_id: Option<String>,
        period_key: String,
        period_start: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::generate_id(now.timestamp_millis() as u64),
            chore_id: chore.id.clone(),
            family_id: chore.family_id.clone(),
            child_id,
            period_key,
            period_start,
            frequency: chore.frequency,
            base_reward_pence: chore.base_reward_pence,
            competitive: chore.competitive,
            status: AssignmentStatus::Open,
            created_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == AssignmentStatus::Open
    }
}

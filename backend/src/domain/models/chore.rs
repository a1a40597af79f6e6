use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often a chore recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Once,
}

/// Domain model for a chore a family's children can perform.
///
/// Assignments snapshot the reward and competitive flag at creation time, so
/// later edits never retroactively alter history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub frequency: Frequency,
    pub base_reward_pence: i64,
    /// Competitive chores generate one shared assignment per period that
    /// siblings claim through rivalry bidding
    pub competitive: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chore {
    /// Generate a unique ID for a chore.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("chore::{}::{}", timestamp_millis, super::id_suffix())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A child's offer to do a competitive chore for less than the base reward.
///
/// Bids are never deleted; a lower rival bid changes the champion
/// computation without deactivating history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub assignment_id: String,
    pub child_id: String,
    pub amount_pence: i64,
    pub active: bool,
    pub placed_at: DateTime<Utc>,
}

impl Bid {
    /// Generate a unique ID for a bid.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("bid::{}::{}", timestamp_millis, super::id_suffix())
    }
}

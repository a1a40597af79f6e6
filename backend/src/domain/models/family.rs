use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which reward channel penalties are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyMode {
    Money,
    Stars,
    Both,
}

/// Domain model for a family and its guardian-controlled settings.
///
/// Families are created at signup and mutated through the settings surface;
/// they are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    pub name: String,
    /// Family-wide holiday window, inclusive on both ends
    pub holiday_start: Option<NaiveDate>,
    pub holiday_end: Option<NaiveDate>,
    /// Missed periods forgiven before any penalty tier applies
    pub streak_protection_days: u32,
    pub penalties_enabled: bool,
    pub penalty_mode: PenaltyMode,
    pub first_miss_pence: i64,
    pub first_miss_stars: i64,
    pub second_miss_pence: i64,
    pub second_miss_stars: i64,
    pub third_miss_pence: i64,
    pub third_miss_stars: i64,
    /// Penalties never take a wallet below these floors
    pub min_balance_pence: i64,
    pub min_balance_stars: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Family {
    /// Generate a unique ID for a family.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("family::{}::{}", timestamp_millis, super::id_suffix())
    }

    /// Pence and stars configured for a penalty tier (1, 2, 3+).
    pub fn penalty_tier_amounts(&self, tier: u32) -> (i64, i64) {
        match tier {
            0 => (0, 0),
            1 => (self.first_miss_pence, self.first_miss_stars),
            2 => (self.second_miss_pence, self.second_miss_stars),
            _ => (self.third_miss_pence, self.third_miss_stars),
        }
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Domain model representing a child in a family.
///
/// Paused children are skipped by assignment generation and penalties; a
/// child-level holiday window excuses misses independently of the family's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub paused: bool,
    pub holiday_start: Option<NaiveDate>,
    pub holiday_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    /// Generate a unique ID for a child.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("child::{}::{}", timestamp_millis, super::id_suffix())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A child's claim that an assignment was done.
///
/// Created by the child on submission; transitions to approved or rejected
/// exactly once, by a guardian action, and is immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: String,
    pub assignment_id: String,
    pub child_id: String,
    pub status: CompletionStatus,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    /// Winning bid amount when the submission came from a rivalry champion
    pub bid_amount_pence: Option<i64>,
    /// Bid that made this child champion, for the ledger audit trail
    pub bid_id: Option<String>,
    pub note: Option<String>,
    pub rejection_reason: Option<String>,
    /// Streak milestone crossed by this submission; the bonus stars are
    /// credited when the completion is approved
    pub streak_milestone: Option<u32>,
}

impl Completion {
    /// Generate a unique ID for a completion.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("completion::{}::{}", timestamp_millis, super::id_suffix())
    }

    pub fn is_pending(&self) -> bool {
        self.status == CompletionStatus::Pending
    }

    /// A submission counts toward the period whether approved yet or not;
    /// only rejected completions do not.
    pub fn counts_as_submitted(&self) -> bool {
        self.status != CompletionStatus::Rejected
    }
}

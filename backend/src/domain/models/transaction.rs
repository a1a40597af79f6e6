//! Domain model for a ledger transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// Who initiated a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionSource {
    System,
    Guardian,
    Relative,
}

/// Why a ledger transaction exists.
///
/// Each reason carries exactly the fields it needs, so the audit trail stays
/// queryable without a free-form metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionReason {
    ChoreReward { assignment_id: String, chore_id: String },
    /// `period_key` identifies the missed period so re-runs of the
    /// generation cycle can detect an already-applied penalty
    StreakPenalty { chore_id: String, period_key: String, tier: u32, consecutive_misses: u32 },
    RivalryBonus { assignment_id: String, bid_id: String },
    StreakBonus { chore_id: String, milestone: u32 },
    ManualGift { note: Option<String> },
    Payout { note: Option<String> },
}

impl TransactionReason {
    /// Stable tag used in logs and the API representation.
    pub fn tag(&self) -> &'static str {
        match self {
            TransactionReason::ChoreReward { .. } => "chore_reward",
            TransactionReason::StreakPenalty { .. } => "streak_penalty",
            TransactionReason::RivalryBonus { .. } => "rivalry_bonus",
            TransactionReason::StreakBonus { .. } => "streak_bonus",
            TransactionReason::ManualGift { .. } => "manual_gift",
            TransactionReason::Payout { .. } => "payout",
        }
    }
}

/// One append-only row in a wallet's ledger.
///
/// `amount_pence` and `star_delta` are non-negative magnitudes; the sign is
/// carried by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    pub wallet_id: String,
    pub kind: TransactionKind,
    pub amount_pence: i64,
    pub star_delta: i64,
    pub source: TransactionSource,
    pub reason: TransactionReason,
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Generate a unique ID for a transaction.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("txn::{}::{}", timestamp_millis, super::id_suffix())
    }

    /// Pence delta with the sign applied.
    pub fn signed_pence(&self) -> i64 {
        match self.kind {
            TransactionKind::Credit => self.amount_pence,
            TransactionKind::Debit => -self.amount_pence,
        }
    }

    /// Star delta with the sign applied.
    pub fn signed_stars(&self) -> i64 {
        match self.kind {
            TransactionKind::Credit => self.star_delta,
            TransactionKind::Debit => -self.star_delta,
        }
    }
}

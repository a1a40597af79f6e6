//! Shared DTO types for the chore tracker API.
//!
//! These types cross the REST boundary between the backend and its clients.
//! The backend maps them to and from its internal domain models; nothing in
//! here carries business logic beyond small display helpers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How often a chore recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Once,
}

/// Which reward channel penalties are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMode {
    Money,
    Stars,
    Both,
}

/// A family and its guardian-controlled settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    pub name: String,
    /// Start of the family-wide holiday window (inclusive), if any
    pub holiday_start: Option<NaiveDate>,
    /// End of the family-wide holiday window (inclusive), if any
    pub holiday_end: Option<NaiveDate>,
    /// Missed periods forgiven before a penalty tier applies
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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub family_id: String,
    pub name: String,
    /// Paused children are skipped by generation and penalties
    pub paused: bool,
    pub holiday_start: Option<NaiveDate>,
    pub holiday_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub frequency: Frequency,
    pub base_reward_pence: i64,
    /// Competitive chores generate shared assignments open to rivalry bidding
    pub competitive: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Open,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub chore_id: String,
    pub family_id: String,
    /// None for shared competitive assignments that no child has claimed yet
    pub child_id: Option<String>,
    /// Period this assignment belongs to, e.g. "2026-08-05" or "2026-W32"
    pub period_key: String,
    pub frequency: Frequency,
    pub base_reward_pence: i64,
    pub competitive: bool,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Pending,
    Approved,
    Rejected,
}

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
    pub note: Option<String>,
    pub rejection_reason: Option<String>,
}

impl Completion {
    pub fn is_pending(&self) -> bool {
        self.status == CompletionStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub assignment_id: String,
    pub child_id: String,
    pub amount_pence: i64,
    pub active: bool,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub child_id: String,
    pub balance_pence: i64,
    pub stars: i64,
    /// Frozen wallets refuse all writes pending manual reconciliation
    pub frozen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    System,
    Guardian,
    Relative,
}

/// Why a ledger entry exists. Each reason carries only the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionReason {
    ChoreReward { assignment_id: String, chore_id: String },
    StreakPenalty { chore_id: String, period_key: String, tier: u32, consecutive_misses: u32 },
    RivalryBonus { assignment_id: String, bid_id: String },
    StreakBonus { chore_id: String, milestone: u32 },
    ManualGift { note: Option<String> },
    Payout { note: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub kind: TransactionKind,
    pub amount_pence: i64,
    pub star_delta: i64,
    pub source: TransactionSource,
    pub reason: TransactionReason,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

/// Full replacement of a family's guardian settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFamilySettingsRequest {
    pub holiday_start: Option<NaiveDate>,
    pub holiday_end: Option<NaiveDate>,
    pub streak_protection_days: u32,
    pub penalties_enabled: bool,
    pub penalty_mode: PenaltyMode,
    pub first_miss_pence: i64,
    pub first_miss_stars: i64,
    pub second_miss_pence: i64,
    pub second_miss_stars: i64,
    pub third_miss_pence: i64,
    pub third_miss_stars: i64,
    pub min_balance_pence: i64,
    pub min_balance_stars: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateChildRequest {
    pub paused: bool,
    pub holiday_start: Option<NaiveDate>,
    pub holiday_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChoreRequest {
    pub name: String,
    pub frequency: Frequency,
    pub base_reward_pence: i64,
    #[serde(default)]
    pub competitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitCompletionRequest {
    pub child_id: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceBidRequest {
    pub child_id: String,
    pub amount_pence: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectCompletionRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunGenerationRequest {
    /// Restrict the cycle to a single family (manual reprocessing)
    pub family_id: Option<String>,
    /// Defaults to today when absent
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftRequest {
    pub amount_pence: i64,
    pub stars: i64,
    pub from_relative: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub amount_pence: i64,
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Outcome of one generation cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub chores_generated: u32,
    pub streaks_updated: u32,
    pub penalties_applied: u32,
    pub bonuses_awarded: u32,
    pub dry_run: bool,
    /// Per-family failures; a failing family never aborts the others
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveCompletionResponse {
    pub completion: Completion,
    pub credited_pence: i64,
    pub credited_stars: i64,
    pub streak_bonus_stars: Option<i64>,
    pub rivalry_bonus_star: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletResponse {
    pub wallet: Wallet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidListResponse {
    pub bids: Vec<Bid>,
    /// Current champion, if any bids are active
    pub champion_bid_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_reason_serializes_with_tag() {
        let reason = TransactionReason::StreakPenalty {
            chore_id: "chore::1".to_string(),
            period_key: "2026-08-04".to_string(),
            tier: 2,
            consecutive_misses: 3,
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert!(json.contains("\"type\":\"streak_penalty\""));
        assert!(json.contains("\"tier\":2"));

        let back: TransactionReason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reason);
    }

    #[test]
    fn run_generation_request_defaults() {
        let req: RunGenerationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.family_id.is_none());
        assert!(req.as_of.is_none());
        assert!(!req.dry_run);
    }
}

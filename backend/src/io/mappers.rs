//! Mappers between domain models and the public DTOs in `shared`.

use crate::domain::commands::completion::ApprovalOutcome;
use crate::domain::commands::generation::GenerationReport;
use crate::domain::models::assignment::{Assignment, AssignmentStatus};
use crate::domain::models::bid::Bid;
use crate::domain::models::child::Child;
use crate::domain::models::chore::{Chore, Frequency};
use crate::domain::models::completion::{Completion, CompletionStatus};
use crate::domain::models::family::{Family, PenaltyMode};
use crate::domain::models::transaction::{
    LedgerTransaction, TransactionKind, TransactionReason, TransactionSource,
};
use crate::domain::models::wallet::Wallet;

pub struct FamilyMapper;

impl FamilyMapper {
    pub fn to_dto(family: Family) -> shared::Family {
        shared::Family {
            id: family.id,
            name: family.name,
            holiday_start: family.holiday_start,
            holiday_end: family.holiday_end,
            streak_protection_days: family.streak_protection_days,
            penalties_enabled: family.penalties_enabled,
            penalty_mode: Self::mode_to_dto(family.penalty_mode),
            first_miss_pence: family.first_miss_pence,
            first_miss_stars: family.first_miss_stars,
            second_miss_pence: family.second_miss_pence,
            second_miss_stars: family.second_miss_stars,
            third_miss_pence: family.third_miss_pence,
            third_miss_stars: family.third_miss_stars,
            min_balance_pence: family.min_balance_pence,
            min_balance_stars: family.min_balance_stars,
        }
    }

    pub fn mode_to_dto(mode: PenaltyMode) -> shared::PenaltyMode {
        match mode {
            PenaltyMode::Money => shared::PenaltyMode::Money,
            PenaltyMode::Stars => shared::PenaltyMode::Stars,
            PenaltyMode::Both => shared::PenaltyMode::Both,
        }
    }

    pub fn mode_from_dto(mode: shared::PenaltyMode) -> PenaltyMode {
        match mode {
            shared::PenaltyMode::Money => PenaltyMode::Money,
            shared::PenaltyMode::Stars => PenaltyMode::Stars,
            shared::PenaltyMode::Both => PenaltyMode::Both,
        }
    }
}

pub struct ChildMapper;

impl ChildMapper {
    pub fn to_dto(child: Child) -> shared::Child {
        shared::Child {
            id: child.id,
            family_id: child.family_id,
            name: child.name,
            paused: child.paused,
            holiday_start: child.holiday_start,
            holiday_end: child.holiday_end,
        }
    }
}

pub struct ChoreMapper;

impl ChoreMapper {
    pub fn to_dto(chore: Chore) -> shared::Chore {
        shared::Chore {
            id: chore.id,
            family_id: chore.family_id,
            name: chore.name,
            frequency: Self::frequency_to_dto(chore.frequency),
            base_reward_pence: chore.base_reward_pence,
            competitive: chore.competitive,
            active: chore.active,
        }
    }

    pub fn frequency_to_dto(frequency: Frequency) -> shared::Frequency {
        match frequency {
            Frequency::Daily => shared::Frequency::Daily,
            Frequency::Weekly => shared::Frequency::Weekly,
            Frequency::Once => shared::Frequency::Once,
        }
    }

    pub fn frequency_from_dto(frequency: shared::Frequency) -> Frequency {
        match frequency {
            shared::Frequency::Daily => Frequency::Daily,
            shared::Frequency::Weekly => Frequency::Weekly,
            shared::Frequency::Once => Frequency::Once,
        }
    }
}

pub struct AssignmentMapper;

impl AssignmentMapper {
    pub fn to_dto(assignment: Assignment) -> shared::Assignment {
        shared::Assignment {
            id: assignment.id,
            chore_id: assignment.chore_id,
            family_id: assignment.family_id,
            child_id: assignment.child_id,
            period_key: assignment.period_key,
            frequency: ChoreMapper::frequency_to_dto(assignment.frequency),
            base_reward_pence: assignment.base_reward_pence,
            competitive: assignment.competitive,
            status: match assignment.status {
                AssignmentStatus::Open => shared::AssignmentStatus::Open,
                AssignmentStatus::Completed => shared::AssignmentStatus::Completed,
            },
            created_at: assignment.created_at,
        }
    }
}

pub struct CompletionMapper;

impl CompletionMapper {
    pub fn to_dto(completion: Completion) -> shared::Completion {
        shared::Completion {
            id: completion.id,
            assignment_id: completion.assignment_id,
            child_id: completion.child_id,
            status: match completion.status {
                CompletionStatus::Pending => shared::CompletionStatus::Pending,
                CompletionStatus::Approved => shared::CompletionStatus::Approved,
                CompletionStatus::Rejected => shared::CompletionStatus::Rejected,
            },
            submitted_at: completion.submitted_at,
            decided_at: completion.decided_at,
            bid_amount_pence: completion.bid_amount_pence,
            note: completion.note,
            rejection_reason: completion.rejection_reason,
        }
    }
}

pub struct BidMapper;

impl BidMapper {
    pub fn to_dto(bid: Bid) -> shared::Bid {
        shared::Bid {
            id: bid.id,
            assignment_id: bid.assignment_id,
            child_id: bid.child_id,
            amount_pence: bid.amount_pence,
            active: bid.active,
            placed_at: bid.placed_at,
        }
    }
}

pub struct WalletMapper;

impl WalletMapper {
    pub fn to_dto(wallet: Wallet) -> shared::Wallet {
        shared::Wallet {
            child_id: wallet.child_id,
            balance_pence: wallet.balance_pence,
            stars: wallet.stars,
            frozen: wallet.frozen,
        }
    }

    /// Wallets are created lazily; a child without one reads as empty.
    pub fn empty(child_id: &str) -> shared::Wallet {
        shared::Wallet {
            child_id: child_id.to_string(),
            balance_pence: 0,
            stars: 0,
            frozen: false,
        }
    }
}

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(transaction: LedgerTransaction) -> shared::LedgerEntry {
        shared::LedgerEntry {
            id: transaction.id,
            kind: match transaction.kind {
                TransactionKind::Credit => shared::TransactionKind::Credit,
                TransactionKind::Debit => shared::TransactionKind::Debit,
            },
            amount_pence: transaction.amount_pence,
            star_delta: transaction.star_delta,
            source: match transaction.source {
                TransactionSource::System => shared::TransactionSource::System,
                TransactionSource::Guardian => shared::TransactionSource::Guardian,
                TransactionSource::Relative => shared::TransactionSource::Relative,
            },
            reason: Self::reason_to_dto(transaction.reason),
            created_at: transaction.created_at,
        }
    }

    fn reason_to_dto(reason: TransactionReason) -> shared::TransactionReason {
        match reason {
            TransactionReason::ChoreReward { assignment_id, chore_id } => {
                shared::TransactionReason::ChoreReward { assignment_id, chore_id }
            }
            TransactionReason::StreakPenalty { chore_id, period_key, tier, consecutive_misses } => {
                shared::TransactionReason::StreakPenalty {
                    chore_id,
                    period_key,
                    tier,
                    consecutive_misses,
                }
            }
            TransactionReason::RivalryBonus { assignment_id, bid_id } => {
                shared::TransactionReason::RivalryBonus { assignment_id, bid_id }
            }
            TransactionReason::StreakBonus { chore_id, milestone } => {
                shared::TransactionReason::StreakBonus { chore_id, milestone }
            }
            TransactionReason::ManualGift { note } => shared::TransactionReason::ManualGift { note },
            TransactionReason::Payout { note } => shared::TransactionReason::Payout { note },
        }
    }
}

pub struct ReportMapper;

impl ReportMapper {
    pub fn to_dto(report: GenerationReport) -> shared::GenerationReport {
        shared::GenerationReport {
            chores_generated: report.chores_generated,
            streaks_updated: report.streaks_updated,
            penalties_applied: report.penalties_applied,
            bonuses_awarded: report.bonuses_awarded,
            dry_run: report.dry_run,
            errors: report.errors,
        }
    }
}

pub struct ApprovalMapper;

impl ApprovalMapper {
    pub fn to_dto(outcome: ApprovalOutcome) -> shared::ApproveCompletionResponse {
        shared::ApproveCompletionResponse {
            completion: CompletionMapper::to_dto(outcome.completion),
            credited_pence: outcome.credited_pence,
            credited_stars: outcome.credited_stars,
            streak_bonus_stars: outcome.streak_bonus_stars,
            rivalry_bonus_star: outcome.rivalry_bonus_star,
        }
    }
}

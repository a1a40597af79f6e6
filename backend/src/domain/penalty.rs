//! Penalty policy: a pure mapping from consecutive misses and family
//! settings to a penalty amount.
//!
//! The policy never touches storage. Applying the assessed amount (with
//! floor clamping against the live balance) is the ledger's job.

use crate::domain::models::family::{Family, PenaltyMode};

/// Outcome of assessing a run of misses against a family's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyAssessment {
    /// 1 = first miss beyond protection, 2 = second, 3 = everything after
    pub tier: u32,
    pub pence: i64,
    pub stars: i64,
}

/// Assess `consecutive_misses` uninterrupted missed periods (including the
/// one being evaluated) against the family's protection days and tiers.
///
/// Returns `None` when no penalty applies: penalties disabled, or the miss
/// still falls inside the protection window (the caller protects the streak
/// instead).
pub fn assess(consecutive_misses: u32, family: &Family) -> Option<PenaltyAssessment> {
    if !family.penalties_enabled {
        return None;
    }

    let tier = consecutive_misses.saturating_sub(family.streak_protection_days);
    if tier == 0 {
        return None;
    }
    let tier = tier.min(3);

    let (pence, stars) = family.penalty_tier_amounts(tier);
    let (pence, stars) = match family.penalty_mode {
        PenaltyMode::Money => (pence, 0),
        PenaltyMode::Stars => (0, stars),
        PenaltyMode::Both => (pence, stars),
    };

    Some(PenaltyAssessment { tier, pence, stars })
}

/// Largest part of `amount` that can be debited without taking `balance`
/// below `floor`. Zero when the floor already blocks any debit.
pub fn clamp_to_floor(amount: i64, balance: i64, floor: i64) -> i64 {
    amount.min((balance - floor).max(0)).max(0)
}

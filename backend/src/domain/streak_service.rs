//! Streak tracking per (child, chore).
//!
//! Submission is the streak-qualifying event; approval only gates the
//! reward. `protect` keeps continuity across excused misses so the next
//! genuine completion still reads as consecutive, and `break_streak` is what
//! a penalized miss does to the record.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::domain::models::chore::Frequency;
use crate::domain::models::streak::Streak;
use crate::domain::period;
use crate::storage::traits::{Connection, StreakStorage};

/// Consecutive-period counts that award bonus stars, once per crossing.
pub const STREAK_MILESTONES: [(u32, i64); 5] = [(3, 1), (5, 2), (7, 3), (14, 5), (30, 10)];

/// Bonus stars for a milestone count, if it is one.
pub fn milestone_bonus_stars(milestone: u32) -> Option<i64> {
    STREAK_MILESTONES
        .iter()
        .find(|(count, _)| *count == milestone)
        .map(|(_, stars)| *stars)
}

#[derive(Clone)]
pub struct StreakService<C: Connection> {
    streak_repository: C::StreakRepository,
}

impl<C: Connection> StreakService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            streak_repository: connection.create_streak_repository(),
        }
    }

    pub async fn get(&self, child_id: &str, chore_id: &str) -> Result<Option<Streak>> {
        self.streak_repository.get_streak(child_id, chore_id).await
    }

    /// Count a submission toward the streak for the period starting at
    /// `period_start`. Returns the updated record and the milestone crossed
    /// by this increment, if any. Counting is idempotent per period: a
    /// resubmission after a rejection does not double-count.
    pub async fn record_completion(
        &self,
        family_id: &str,
        child_id: &str,
        chore_id: &str,
        frequency: Frequency,
        period_start: NaiveDate,
    ) -> Result<(Streak, Option<u32>)> {
        let mut streak = self.get_or_create(family_id, child_id, chore_id).await?;

        if streak.last_period == Some(period_start) && streak.current > 0 {
            debug!(
                "Streak for {} on {} already counted period {}",
                child_id, chore_id, period_start
            );
            return Ok((streak, None));
        }

        let consecutive = streak
            .last_period
            .map(|last| period::is_next_period(frequency, last, period_start))
            .unwrap_or(false);
        streak.current = if consecutive || streak.current == 0 {
            streak.current + 1
        } else {
            1
        };
        streak.best = streak.best.max(streak.current);
        streak.last_period = Some(period_start);
        streak.miss_run = 0;
        streak.disrupted = false;
        streak.updated_at = Utc::now();
        self.streak_repository.upsert_streak(&streak).await?;

        let milestone = milestone_bonus_stars(streak.current).map(|_| streak.current);
        if let Some(milestone) = milestone {
            info!(
                "Child {} reached a {}-period streak on {}",
                child_id, milestone, chore_id
            );
        }
        Ok((streak, milestone))
    }

    /// Excuse a missed period without counting it: `last_period` advances so
    /// the next genuine completion still reads as consecutive. Grace-window
    /// misses count toward the miss run (`count_miss`); holiday-exempt
    /// misses do not.
    pub async fn protect(
        &self,
        family_id: &str,
        child_id: &str,
        chore_id: &str,
        period_start: NaiveDate,
        count_miss: bool,
    ) -> Result<Streak> {
        let mut streak = self.get_or_create(family_id, child_id, chore_id).await?;
        if streak.last_period == Some(period_start) {
            // Already counted or protected through this period.
            return Ok(streak);
        }
        streak.last_period = Some(period_start);
        if count_miss {
            streak.miss_run += 1;
        }
        streak.updated_at = Utc::now();
        self.streak_repository.upsert_streak(&streak).await?;
        debug!(
            "Protected streak for {} on {} through {}",
            child_id, chore_id, period_start
        );
        Ok(streak)
    }

    /// A miss beyond the protection window: the streak is over.
    pub async fn break_streak(
        &self,
        family_id: &str,
        child_id: &str,
        chore_id: &str,
    ) -> Result<Streak> {
        let mut streak = self.get_or_create(family_id, child_id, chore_id).await?;
        streak.current = 0;
        streak.disrupted = true;
        streak.miss_run += 1;
        streak.updated_at = Utc::now();
        self.streak_repository.upsert_streak(&streak).await?;
        info!("Streak broken for {} on {}", child_id, chore_id);
        Ok(streak)
    }

    async fn get_or_create(
        &self,
        family_id: &str,
        child_id: &str,
        chore_id: &str,
    ) -> Result<Streak> {
        match self.streak_repository.get_streak(child_id, chore_id).await? {
            Some(streak) => Ok(streak),
            None => Ok(Streak::new(family_id, child_id, chore_id, Utc::now())),
        }
    }
}

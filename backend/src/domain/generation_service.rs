//! The generation cycle: one run per calendar day.
//!
//! For every non-paused child and active chore the cycle guarantees exactly
//! one open assignment per period, settling the previous period first:
//! a miss inside the protection window or under a holiday protects the
//! streak, a miss beyond it debits the penalty and breaks the streak.
//! Re-running a cycle is idempotent; dry runs evaluate everything and
//! persist nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::commands::generation::{GenerationCycleCommand, GenerationReport};
use crate::domain::errors::EngineError;
use crate::domain::exemption::is_exempt;
use crate::domain::ledger_service::LedgerService;
use crate::domain::models::assignment::Assignment;
use crate::domain::models::child::Child;
use crate::domain::models::chore::{Chore, Frequency};
use crate::domain::models::family::Family;
use crate::domain::models::transaction::TransactionReason;
use crate::domain::penalty;
use crate::domain::period;
use crate::domain::streak_service::StreakService;
use crate::storage::traits::{
    AssignmentStorage, ChildStorage, ChoreStorage, CompletionStorage, Connection, FamilyStorage,
    StreakStorage,
};

type FamilyLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

#[derive(Clone)]
pub struct GenerationService<C: Connection> {
    family_repository: C::FamilyRepository,
    child_repository: C::ChildRepository,
    chore_repository: C::ChoreRepository,
    assignment_repository: C::AssignmentRepository,
    completion_repository: C::CompletionRepository,
    streak_repository: C::StreakRepository,
    streak_service: StreakService<C>,
    ledger_service: LedgerService<C>,
    /// One family is processed by one cycle at a time; overlapping runs
    /// queue up instead of double-generating
    family_locks: FamilyLocks,
}

impl<C: Connection> GenerationService<C> {
    pub fn new(
        connection: Arc<C>,
        streak_service: StreakService<C>,
        ledger_service: LedgerService<C>,
    ) -> Self {
        Self {
            family_repository: connection.create_family_repository(),
            child_repository: connection.create_child_repository(),
            chore_repository: connection.create_chore_repository(),
            assignment_repository: connection.create_assignment_repository(),
            completion_repository: connection.create_completion_repository(),
            streak_repository: connection.create_streak_repository(),
            streak_service,
            ledger_service,
            family_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run the cycle for one family or all of them. Failures are isolated
    /// per family: they land in the report's error list and never abort the
    /// remaining families.
    pub async fn run_generation_cycle(
        &self,
        command: GenerationCycleCommand,
    ) -> Result<GenerationReport> {
        let families = match &command.family_id {
            Some(family_id) => {
                let family = self
                    .family_repository
                    .get_family(family_id)
                    .await?
                    .ok_or_else(|| EngineError::not_found("family", family_id))?;
                vec![family]
            }
            None => self.family_repository.list_families().await?,
        };

        let mut report = GenerationReport {
            dry_run: command.dry_run,
            ..Default::default()
        };
        info!(
            "Generation cycle for {} ({} families, dry_run={})",
            command.as_of,
            families.len(),
            command.dry_run
        );

        for family in &families {
            let lock = self.lock_for(&family.id);
            let _guard = lock.lock().await;
            if let Err(err) = self
                .process_family(family, command.as_of, command.dry_run, &mut report)
                .await
            {
                warn!("Generation failed for family {}: {:#}", family.id, err);
                report.errors.push(format!("family {}: {:#}", family.id, err));
            }
        }

        info!(
            "Generation cycle done: {} assignments, {} streak updates, {} penalties, {} errors",
            report.chores_generated,
            report.streaks_updated,
            report.penalties_applied,
            report.errors.len()
        );
        Ok(report)
    }

    async fn process_family(
        &self,
        family: &Family,
        as_of: NaiveDate,
        dry_run: bool,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let children: Vec<Child> = self
            .child_repository
            .list_children(&family.id)
            .await?
            .into_iter()
            .filter(|c| !c.paused)
            .collect();

        let chores: Vec<Chore> = self
            .chore_repository
            .list_chores(&family.id)
            .await?
            .into_iter()
            .filter(|c| c.active)
            .collect();

        for chore in &chores {
            match chore.frequency {
                Frequency::Once => {
                    self.generate_once(chore, &children, as_of, dry_run, report)
                        .await?
                }
                Frequency::Daily => {
                    self.generate_recurring(family, chore, &children, as_of, dry_run, report)
                        .await?
                }
                Frequency::Weekly => {
                    if period::is_weekly_trigger(as_of) {
                        self.generate_recurring(family, chore, &children, as_of, dry_run, report)
                            .await?
                    }
                }
            }
        }
        Ok(())
    }

    /// One-off chores get their single assignment on the first cycle after
    /// creation and are never regenerated.
    async fn generate_once(
        &self,
        chore: &Chore,
        children: &[Child],
        as_of: NaiveDate,
        dry_run: bool,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let owners: Vec<Option<String>> = if chore.competitive {
            vec![None]
        } else {
            children.iter().map(|c| Some(c.id.clone())).collect()
        };

        for owner in owners {
            if self
                .assignment_repository
                .has_any_for_chore(&chore.id, owner.as_deref())
                .await?
            {
                continue;
            }
            self.create_assignment(chore, owner, as_of, dry_run, report)
                .await?;
        }
        Ok(())
    }

    async fn generate_recurring(
        &self,
        family: &Family,
        chore: &Chore,
        children: &[Child],
        as_of: NaiveDate,
        dry_run: bool,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let period_key = period::period_key(chore.frequency, as_of);

        if chore.competitive {
            // Shared assignments have no owner, so there is nothing to
            // settle for the previous period; an unclaimed one just lapses.
            let existing = self
                .assignment_repository
                .list_for_period(&chore.id, None, &period_key)
                .await?;
            if existing.iter().any(|a| a.is_open()) {
                return Ok(());
            }
            return self
                .create_assignment(chore, None, as_of, dry_run, report)
                .await;
        }

        for child in children {
            let existing = self
                .assignment_repository
                .list_for_period(&chore.id, Some(&child.id), &period_key)
                .await?;
            if existing.iter().any(|a| a.is_open()) {
                continue;
            }

            self.settle_previous_period(family, chore, child, as_of, dry_run, report)
                .await?;
            self.create_assignment(chore, Some(child.id.clone()), as_of, dry_run, report)
                .await?;
        }
        Ok(())
    }

    /// Evaluate the period before `as_of` for one (chore, child): submission
    /// counts as done regardless of approval delay; a holiday protects the
    /// streak; anything else goes to the penalty policy.
    async fn settle_previous_period(
        &self,
        family: &Family,
        chore: &Chore,
        child: &Child,
        as_of: NaiveDate,
        dry_run: bool,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let Some(previous_start) = period::previous_period_start(chore.frequency, as_of) else {
            return Ok(());
        };
        let previous_key = period::period_key(chore.frequency, previous_start);

        let prior_assignments = self
            .assignment_repository
            .list_for_period(&chore.id, Some(&child.id), &previous_key)
            .await?;
        if prior_assignments.is_empty() {
            // Chore created mid-period: first occurrence, nothing to settle.
            return Ok(());
        }

        for assignment in &prior_assignments {
            let completions = self
                .completion_repository
                .list_by_assignment(&assignment.id)
                .await?;
            if completions.iter().any(|c| c.counts_as_submitted()) {
                return Ok(());
            }
        }

        let previous_end = period::period_end(chore.frequency, previous_start);
        if is_exempt(family, child, previous_start, previous_end) {
            if !dry_run {
                self.streak_service
                    .protect(&family.id, &child.id, &chore.id, previous_start, false)
                    .await?;
            }
            report.streaks_updated += 1;
            return Ok(());
        }

        let miss_run = self
            .streak_repository
            .get_streak(&child.id, &chore.id)
            .await?
            .map(|s| s.miss_run)
            .unwrap_or(0);
        // Weekly chores evaluate every missed week on its own rather than
        // accumulating a multi-week run.
        let consecutive_misses = match chore.frequency {
            Frequency::Weekly => 1,
            _ => miss_run + 1,
        };

        match penalty::assess(consecutive_misses, family) {
            None => {
                if !dry_run {
                    self.streak_service
                        .protect(&family.id, &child.id, &chore.id, previous_start, true)
                        .await?;
                }
                report.streaks_updated += 1;
            }
            Some(assessment) => {
                // The penalty transaction doubles as the idempotence marker:
                // a re-run that already debited this period skips it.
                let already_penalized = self
                    .ledger_service
                    .transactions(&child.id)
                    .await?
                    .iter()
                    .any(|t| {
                        matches!(
                            &t.reason,
                            TransactionReason::StreakPenalty { chore_id, period_key, .. }
                                if chore_id == &chore.id && period_key == &previous_key
                        )
                    });
                if already_penalized {
                    return Ok(());
                }

                let reason = TransactionReason::StreakPenalty {
                    chore_id: chore.id.clone(),
                    period_key: previous_key.clone(),
                    tier: assessment.tier,
                    consecutive_misses,
                };
                if dry_run {
                    let (pence, stars) = self
                        .ledger_service
                        .preview_clamped(family, &child.id, assessment.pence, assessment.stars)
                        .await?;
                    if pence > 0 || stars > 0 {
                        report.penalties_applied += 1;
                    }
                } else {
                    let applied = self
                        .ledger_service
                        .debit_clamped(family, &child.id, assessment.pence, assessment.stars, reason)
                        .await?;
                    if applied.is_some() {
                        report.penalties_applied += 1;
                    }
                    self.streak_service
                        .break_streak(&family.id, &child.id, &chore.id)
                        .await?;
                }
                report.streaks_updated += 1;
            }
        }
        Ok(())
    }

    async fn create_assignment(
        &self,
        chore: &Chore,
        child_id: Option<String>,
        as_of: NaiveDate,
        dry_run: bool,
        report: &mut GenerationReport,
    ) -> Result<()> {
        if !dry_run {
            let assignment = Assignment::new_open(
                chore,
                child_id,
                period::period_key(chore.frequency, as_of),
                period::period_start(chore.frequency, as_of),
                chrono::Utc::now(),
            );
            self.assignment_repository.store_assignment(&assignment).await?;
        }
        report.chores_generated += 1;
        Ok(())
    }

    fn lock_for(&self, family_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.family_locks.lock().unwrap();
        locks
            .entry(family_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::family::PenaltyMode;
    use crate::domain::models::transaction::TransactionSource;
    use crate::storage::memory::MemoryConnection;
    use crate::storage::traits::WalletStorage;
    use chrono::Utc;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        connection: Arc<MemoryConnection>,
        service: GenerationService<MemoryConnection>,
        ledger: LedgerService<MemoryConnection>,
        streaks: StreakService<MemoryConnection>,
        family: Family,
    }

    async fn setup() -> Fixture {
        let connection = Arc::new(MemoryConnection::new());
        let streaks = StreakService::new(Arc::clone(&connection));
        let ledger = LedgerService::new(Arc::clone(&connection));
        let service =
            GenerationService::new(Arc::clone(&connection), streaks.clone(), ledger.clone());

        let now = Utc::now();
        let family = Family {
            id: Family::generate_id(now.timestamp_millis() as u64),
            name: "The Tests".to_string(),
            holiday_start: None,
            holiday_end: None,
            streak_protection_days: 1,
            penalties_enabled: true,
            penalty_mode: PenaltyMode::Both,
            first_miss_pence: 5,
            first_miss_stars: 0,
            second_miss_pence: 10,
            second_miss_stars: 1,
            third_miss_pence: 20,
            third_miss_stars: 2,
            min_balance_pence: 0,
            min_balance_stars: 0,
            created_at: now,
            updated_at: now,
        };
        connection
            .create_family_repository()
            .store_family(&family)
            .await
            .unwrap();

        Fixture {
            connection,
            service,
            ledger,
            streaks,
            family,
        }
    }

    impl Fixture {
        async fn add_child(&self, name: &str) -> Child {
            let now = Utc::now();
            let child = Child {
                id: Child::generate_id(now.timestamp_millis() as u64),
                family_id: self.family.id.clone(),
                name: name.to_string(),
                paused: false,
                holiday_start: None,
                holiday_end: None,
                created_at: now,
                updated_at: now,
            };
            self.connection
                .create_child_repository()
                .store_child(&child)
                .await
                .unwrap();
            child
        }

        async fn add_chore(&self, name: &str, frequency: Frequency, competitive: bool) -> Chore {
            let now = Utc::now();
            let chore = Chore {
                id: Chore::generate_id(now.timestamp_millis() as u64),
                family_id: self.family.id.clone(),
                name: name.to_string(),
                frequency,
                base_reward_pence: 50,
                competitive,
                active: true,
                created_at: now,
                updated_at: now,
            };
            self.connection
                .create_chore_repository()
                .store_chore(&chore)
                .await
                .unwrap();
            chore
        }

        async fn run(&self, as_of: &str) -> GenerationReport {
            self.service
                .run_generation_cycle(GenerationCycleCommand {
                    family_id: Some(self.family.id.clone()),
                    as_of: d(as_of),
                    dry_run: false,
                })
                .await
                .unwrap()
        }

        async fn open_assignments(
            &self,
            chore: &Chore,
            child_id: Option<&str>,
            as_of: &str,
        ) -> Vec<Assignment> {
            self.connection
                .create_assignment_repository()
                .list_for_period(
                    &chore.id,
                    child_id,
                    &period::period_key(chore.frequency, d(as_of)),
                )
                .await
                .unwrap()
                .into_iter()
                .filter(|a| a.is_open())
                .collect()
        }
    }

    #[tokio::test]
    async fn rerunning_a_cycle_creates_no_duplicates() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture.add_chore("Feed the cat", Frequency::Daily, false).await;

        let first = fixture.run("2026-08-05").await;
        assert_eq!(first.chores_generated, 1);

        let second = fixture.run("2026-08-05").await;
        assert_eq!(second.chores_generated, 0);
        assert!(second.errors.is_empty());

        let open = fixture
            .open_assignments(&chore, Some(&child.id), "2026-08-05")
            .await;
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn first_miss_is_protected_second_is_penalized() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture.add_chore("Feed the cat", Frequency::Daily, false).await;
        fixture
            .ledger
            .credit(
                &fixture.family.id,
                &child.id,
                100,
                0,
                TransactionSource::Guardian,
                TransactionReason::ManualGift { note: None },
            )
            .await
            .unwrap();

        // Day 1: assignment generated, never done.
        fixture.run("2026-08-03").await;

        // Day 2: one miss, still inside the single protection day.
        let report = fixture.run("2026-08-04").await;
        assert_eq!(report.penalties_applied, 0);
        assert_eq!(report.streaks_updated, 1);
        let streak = fixture.streaks.get(&child.id, &chore.id).await.unwrap().unwrap();
        assert_eq!(streak.miss_run, 1);
        assert!(!streak.disrupted);

        // Day 3: second consecutive miss, first penalty tier.
        let report = fixture.run("2026-08-05").await;
        assert_eq!(report.penalties_applied, 1);

        let (balance, _) = fixture.ledger.balance(&child.id).await.unwrap();
        assert_eq!(balance, 95);
        let transactions = fixture.ledger.transactions(&child.id).await.unwrap();
        let penalty_transaction = transactions.last().unwrap();
        assert_eq!(penalty_transaction.reason.tag(), "streak_penalty");
        assert!(matches!(
            penalty_transaction.reason,
            TransactionReason::StreakPenalty { tier: 1, consecutive_misses: 2, .. }
        ));

        let streak = fixture.streaks.get(&child.id, &chore.id).await.unwrap().unwrap();
        assert!(streak.disrupted);
        assert_eq!(streak.current, 0);
    }

    #[tokio::test]
    async fn holiday_misses_are_protected_without_penalty() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture.add_chore("Feed the cat", Frequency::Daily, false).await;

        // A streak of four completions up to the 6th.
        for day in ["2026-08-03", "2026-08-04", "2026-08-05", "2026-08-06"] {
            fixture
                .streaks
                .record_completion(&fixture.family.id, &child.id, &chore.id, Frequency::Daily, d(day))
                .await
                .unwrap();
        }
        // Assignment for the 7th exists but is never submitted.
        fixture.run("2026-08-07").await;

        // Family goes on holiday covering the 7th.
        let mut family = fixture.family.clone();
        family.holiday_start = Some(d("2026-08-07"));
        family.holiday_end = Some(d("2026-08-07"));
        fixture
            .connection
            .create_family_repository()
            .update_family(&family)
            .await
            .unwrap();

        let report = fixture.run("2026-08-08").await;
        assert_eq!(report.penalties_applied, 0);
        assert_eq!(report.streaks_updated, 1);
        assert!(fixture.ledger.transactions(&child.id).await.unwrap().is_empty());

        // Completing the next day continues the streak: 4 -> 5.
        let (streak, _) = fixture
            .streaks
            .record_completion(
                &fixture.family.id,
                &child.id,
                &chore.id,
                Frequency::Daily,
                d("2026-08-08"),
            )
            .await
            .unwrap();
        assert_eq!(streak.current, 5);
        assert_eq!(streak.miss_run, 0);
    }

    #[tokio::test]
    async fn paused_children_are_skipped_entirely() {
        let fixture = setup().await;
        let mut child = fixture.add_child("Ada").await;
        fixture.add_chore("Feed the cat", Frequency::Daily, false).await;

        child.paused = true;
        fixture
            .connection
            .create_child_repository()
            .update_child(&child)
            .await
            .unwrap();

        let report = fixture.run("2026-08-05").await;
        assert_eq!(report.chores_generated, 0);
        assert_eq!(report.streaks_updated, 0);
    }

    #[tokio::test]
    async fn weekly_chores_generate_on_mondays_only() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture.add_chore("Wash the car", Frequency::Weekly, false).await;

        // Wednesday: nothing.
        let report = fixture.run("2026-08-05").await;
        assert_eq!(report.chores_generated, 0);

        // Monday: one assignment for the week.
        let report = fixture.run("2026-08-10").await;
        assert_eq!(report.chores_generated, 1);
        let open = fixture
            .open_assignments(&chore, Some(&child.id), "2026-08-12")
            .await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].period_key, "2026-W33");
    }

    #[tokio::test]
    async fn missed_weeks_are_each_evaluated_on_their_own() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture.add_chore("Wash the car", Frequency::Weekly, false).await;
        fixture
            .ledger
            .credit(
                &fixture.family.id,
                &child.id,
                100,
                0,
                TransactionSource::Guardian,
                TransactionReason::ManualGift { note: None },
            )
            .await
            .unwrap();

        // Three Mondays in a row, never doing the chore. Protection is one
        // day, and every missed week counts as a fresh first miss, so no
        // penalty ever lands.
        fixture.run("2026-08-03").await;
        let report = fixture.run("2026-08-10").await;
        assert_eq!(report.penalties_applied, 0);
        let report = fixture.run("2026-08-17").await;
        assert_eq!(report.penalties_applied, 0);

        let streak = fixture.streaks.get(&child.id, &chore.id).await.unwrap().unwrap();
        assert!(!streak.disrupted);
    }

    #[tokio::test]
    async fn competitive_chores_get_one_shared_assignment() {
        let fixture = setup().await;
        fixture.add_child("Ada").await;
        fixture.add_child("Ben").await;
        let chore = fixture.add_chore("Mow the lawn", Frequency::Daily, true).await;

        let report = fixture.run("2026-08-05").await;
        assert_eq!(report.chores_generated, 1);

        let shared = fixture.open_assignments(&chore, None, "2026-08-05").await;
        assert_eq!(shared.len(), 1);
        assert!(shared[0].competitive);
        assert_eq!(shared[0].child_id, None);

        // An unclaimed shared assignment lapses without penalties.
        let report = fixture.run("2026-08-06").await;
        assert_eq!(report.penalties_applied, 0);
        assert_eq!(report.chores_generated, 1);
    }

    #[tokio::test]
    async fn once_chores_are_generated_a_single_time() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture
            .add_chore("Clear out the shed", Frequency::Once, false)
            .await;

        let report = fixture.run("2026-08-05").await;
        assert_eq!(report.chores_generated, 1);

        // Later cycles never recreate it, and no penalties accrue.
        let report = fixture.run("2026-08-06").await;
        assert_eq!(report.chores_generated, 0);
        assert_eq!(report.penalties_applied, 0);

        let open = fixture.open_assignments(&chore, Some(&child.id), "2026-08-05").await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].period_key, "once");
    }

    #[tokio::test]
    async fn chore_created_mid_stream_has_no_prior_period_to_settle() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        fixture.add_chore("Feed the cat", Frequency::Daily, false).await;

        let report = fixture.run("2026-08-05").await;
        assert_eq!(report.chores_generated, 1);
        assert_eq!(report.penalties_applied, 0);
        assert_eq!(report.streaks_updated, 0);
        assert!(fixture.ledger.transactions(&child.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dry_run_reports_without_persisting() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        let chore = fixture.add_chore("Feed the cat", Frequency::Daily, false).await;
        fixture
            .ledger
            .credit(
                &fixture.family.id,
                &child.id,
                100,
                0,
                TransactionSource::Guardian,
                TransactionReason::ManualGift { note: None },
            )
            .await
            .unwrap();
        fixture.run("2026-08-03").await;
        fixture.run("2026-08-04").await;

        // Dry-run of day 3 would apply the first penalty tier.
        let report = fixture
            .service
            .run_generation_cycle(GenerationCycleCommand {
                family_id: Some(fixture.family.id.clone()),
                as_of: d("2026-08-05"),
                dry_run: true,
            })
            .await
            .unwrap();
        assert!(report.dry_run);
        assert_eq!(report.chores_generated, 1);
        assert_eq!(report.penalties_applied, 1);

        // Nothing moved: balance intact, no day-3 assignment, streak as it
        // was after day 2.
        assert_eq!(fixture.ledger.balance(&child.id).await.unwrap().0, 100);
        assert!(fixture
            .open_assignments(&chore, Some(&child.id), "2026-08-05")
            .await
            .is_empty());
        let streak = fixture.streaks.get(&child.id, &chore.id).await.unwrap().unwrap();
        assert_eq!(streak.miss_run, 1);
        assert!(!streak.disrupted);

        // The real run then matches the dry-run's numbers.
        let real = fixture.run("2026-08-05").await;
        assert_eq!(real.chores_generated, 1);
        assert_eq!(real.penalties_applied, 1);
        assert_eq!(fixture.ledger.balance(&child.id).await.unwrap().0, 95);
    }

    #[tokio::test]
    async fn a_failing_family_does_not_abort_the_others() {
        let fixture = setup().await;
        let child = fixture.add_child("Ada").await;
        fixture.add_chore("Feed the cat", Frequency::Daily, false).await;
        fixture.run("2026-08-03").await;
        fixture.run("2026-08-04").await;

        // Corrupt Ada's wallet so the day-3 penalty write fails.
        let wallet_repository = fixture.connection.create_wallet_repository();
        let now = Utc::now();
        let mut wallet = crate::domain::models::wallet::Wallet::new(
            &fixture.family.id,
            &child.id,
            now,
        );
        wallet.balance_pence = 999;
        wallet.version = 1;
        let bogus = crate::domain::models::transaction::LedgerTransaction {
            id: crate::domain::models::transaction::LedgerTransaction::generate_id(1),
            wallet_id: wallet.id.clone(),
            kind: crate::domain::models::transaction::TransactionKind::Credit,
            amount_pence: 1,
            star_delta: 0,
            source: TransactionSource::System,
            reason: TransactionReason::ManualGift { note: None },
            created_at: now,
        };
        wallet_repository.apply(&wallet, &bogus, 0).await.unwrap();

        // A healthy second family.
        let other_family = Family {
            id: Family::generate_id(now.timestamp_millis() as u64),
            name: "Zz Healthy".to_string(),
            ..fixture.family.clone()
        };
        fixture
            .connection
            .create_family_repository()
            .store_family(&other_family)
            .await
            .unwrap();
        let other_child = Child {
            id: Child::generate_id(now.timestamp_millis() as u64),
            family_id: other_family.id.clone(),
            name: "Cy".to_string(),
            paused: false,
            holiday_start: None,
            holiday_end: None,
            created_at: now,
            updated_at: now,
        };
        fixture
            .connection
            .create_child_repository()
            .store_child(&other_child)
            .await
            .unwrap();
        let other_chore = Chore {
            id: Chore::generate_id(now.timestamp_millis() as u64),
            family_id: other_family.id.clone(),
            name: "Sweep".to_string(),
            frequency: Frequency::Daily,
            base_reward_pence: 30,
            competitive: false,
            active: true,
            created_at: now,
            updated_at: now,
        };
        fixture
            .connection
            .create_chore_repository()
            .store_chore(&other_chore)
            .await
            .unwrap();

        let report = fixture
            .service
            .run_generation_cycle(GenerationCycleCommand {
                family_id: None,
                as_of: d("2026-08-05"),
                dry_run: false,
            })
            .await
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains(&fixture.family.id));
        // The healthy family still got its assignment.
        let open = fixture
            .open_assignments(&other_chore, Some(&other_child.id), "2026-08-05")
            .await;
        assert_eq!(open.len(), 1);
    }
}

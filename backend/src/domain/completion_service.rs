//! Child submissions and guardian decisions.
//!
//! Approval is the only path that credits rewards: the base reward for an
//! ordinary assignment, the champion's bid plus one bonus star for a
//! rivalry assignment, and any streak milestone bonus stamped on the
//! completion at submission time. Rejection has no ledger effect.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::domain::bidding_service::BiddingService;
use crate::domain::commands::completion::{ApprovalOutcome, SubmitCompletionCommand};
use crate::domain::errors::EngineError;
use crate::domain::ledger_service::LedgerService;
use crate::domain::models::assignment::{Assignment, AssignmentStatus};
use crate::domain::models::chore::Frequency;
use crate::domain::models::completion::{Completion, CompletionStatus};
use crate::domain::models::transaction::{
    LedgerTransaction, TransactionReason, TransactionSource,
};
use crate::domain::period;
use crate::domain::streak_service::{milestone_bonus_stars, StreakService};
use crate::storage::traits::{
    AssignmentStorage, ChildStorage, ChoreStorage, CompletionStorage, Connection,
};

/// Ledger writes lost to a concurrent writer are retried this many times.
const CREDIT_RETRIES: usize = 3;

#[derive(Clone)]
pub struct CompletionService<C: Connection> {
    assignment_repository: C::AssignmentRepository,
    completion_repository: C::CompletionRepository,
    chore_repository: C::ChoreRepository,
    child_repository: C::ChildRepository,
    bidding_service: BiddingService<C>,
    streak_service: StreakService<C>,
    ledger_service: LedgerService<C>,
}

impl<C: Connection> CompletionService<C> {
    pub fn new(
        connection: Arc<C>,
        bidding_service: BiddingService<C>,
        streak_service: StreakService<C>,
        ledger_service: LedgerService<C>,
    ) -> Self {
        Self {
            assignment_repository: connection.create_assignment_repository(),
            completion_repository: connection.create_completion_repository(),
            chore_repository: connection.create_chore_repository(),
            child_repository: connection.create_child_repository(),
            bidding_service,
            streak_service,
            ledger_service,
        }
    }

    /// A child submits an assignment as done. The streak counts from here;
    /// the reward waits for approval.
    pub async fn submit_completion(&self, command: SubmitCompletionCommand) -> Result<Completion> {
        let assignment = self
            .assignment_repository
            .get_assignment(&command.assignment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("assignment", &command.assignment_id))?;

        if !assignment.is_open() {
            return Err(EngineError::AlreadyProcessed {
                id: assignment.id.clone(),
            }
            .into());
        }
        let existing = self
            .completion_repository
            .list_by_assignment(&assignment.id)
            .await?;
        if let Some(open) = existing.iter().find(|c| c.counts_as_submitted()) {
            return Err(EngineError::AlreadyProcessed {
                id: open.id.clone(),
            }
            .into());
        }

        let child = self
            .child_repository
            .get_child(&command.child_id)
            .await?
            .ok_or_else(|| EngineError::not_found("child", &command.child_id))?;
        if child.family_id != assignment.family_id {
            return Err(anyhow!(
                "child {} does not belong to family {}",
                child.id,
                assignment.family_id
            ));
        }

        let champion_bid = if assignment.competitive {
            Some(self.bidding_service.ensure_champion(&assignment, &child.id).await?)
        } else {
            if assignment.child_id.as_deref() != Some(child.id.as_str()) {
                return Err(anyhow!(
                    "assignment {} is not assigned to child {}",
                    assignment.id,
                    child.id
                ));
            }
            None
        };

        let (_, milestone) = self
            .streak_service
            .record_completion(
                &assignment.family_id,
                &child.id,
                &assignment.chore_id,
                assignment.frequency,
                assignment.period_start,
            )
            .await?;

        let now = Utc::now();
        let completion = Completion {
            id: Completion::generate_id(now.timestamp_millis() as u64),
            assignment_id: assignment.id.clone(),
            child_id: child.id.clone(),
            status: CompletionStatus::Pending,
            submitted_at: now,
            decided_at: None,
            bid_amount_pence: champion_bid.as_ref().map(|b| b.amount_pence),
            bid_id: champion_bid.as_ref().map(|b| b.id.clone()),
            note: command.note,
            rejection_reason: None,
            streak_milestone: milestone,
        };
        self.completion_repository.store_completion(&completion).await?;
        info!(
            "Child {} submitted completion {} for assignment {}",
            child.id, completion.id, assignment.id
        );
        Ok(completion)
    }

    /// Guardian approval: credit the reward, advance the assignment, and
    /// make the chore available again.
    pub async fn approve_completion(&self, completion_id: &str) -> Result<ApprovalOutcome> {
        let completion = self
            .completion_repository
            .get_completion(completion_id)
            .await?
            .ok_or_else(|| EngineError::not_found("completion", completion_id))?;
        if !completion.is_pending() {
            return Err(EngineError::AlreadyProcessed {
                id: completion.id.clone(),
            }
            .into());
        }
        let mut assignment = self
            .assignment_repository
            .get_assignment(&completion.assignment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("assignment", &completion.assignment_id))?;

        let now = Utc::now();
        let mut approved = completion.clone();
        approved.status = CompletionStatus::Approved;
        approved.decided_at = Some(now);
        // The atomic transition is the exactly-once gate for crediting.
        self.completion_repository
            .transition(&completion.id, CompletionStatus::Pending, &approved)
            .await?;

        assignment.status = AssignmentStatus::Completed;
        if assignment.child_id.is_none() {
            assignment.child_id = Some(approved.child_id.clone());
        }
        self.assignment_repository.update_assignment(&assignment).await?;

        let (credited_pence, credited_stars, rivalry_bonus_star) =
            match (&approved.bid_amount_pence, &approved.bid_id) {
                (Some(bid_amount), Some(bid_id)) => {
                    self.credit_with_retry(
                        &assignment.family_id,
                        &approved.child_id,
                        *bid_amount,
                        1,
                        TransactionReason::RivalryBonus {
                            assignment_id: assignment.id.clone(),
                            bid_id: bid_id.clone(),
                        },
                    )
                    .await?;
                    (*bid_amount, 1, true)
                }
                _ => {
                    self.credit_with_retry(
                        &assignment.family_id,
                        &approved.child_id,
                        assignment.base_reward_pence,
                        0,
                        TransactionReason::ChoreReward {
                            assignment_id: assignment.id.clone(),
                            chore_id: assignment.chore_id.clone(),
                        },
                    )
                    .await?;
                    (assignment.base_reward_pence, 0, false)
                }
            };

        let streak_bonus_stars = match approved.streak_milestone {
            Some(milestone) => {
                let stars = milestone_bonus_stars(milestone).unwrap_or(0);
                if stars > 0 {
                    self.credit_with_retry(
                        &assignment.family_id,
                        &approved.child_id,
                        0,
                        stars,
                        TransactionReason::StreakBonus {
                            chore_id: assignment.chore_id.clone(),
                            milestone,
                        },
                    )
                    .await?;
                }
                Some(stars)
            }
            None => None,
        };

        self.regenerate_after_approval(&assignment).await?;

        info!(
            "Approved completion {}: {}p / {} stars to {}",
            approved.id,
            credited_pence,
            credited_stars + streak_bonus_stars.unwrap_or(0),
            approved.child_id
        );
        Ok(ApprovalOutcome {
            completion: approved,
            credited_pence,
            credited_stars,
            streak_bonus_stars,
            rivalry_bonus_star,
        })
    }

    /// Guardian rejection: the completion is closed, nothing is credited,
    /// and the assignment stays open for another attempt.
    pub async fn reject_completion(
        &self,
        completion_id: &str,
        reason: Option<String>,
    ) -> Result<Completion> {
        let completion = self
            .completion_repository
            .get_completion(completion_id)
            .await?
            .ok_or_else(|| EngineError::not_found("completion", completion_id))?;
        if !completion.is_pending() {
            return Err(EngineError::AlreadyProcessed {
                id: completion.id.clone(),
            }
            .into());
        }

        let mut rejected = completion.clone();
        rejected.status = CompletionStatus::Rejected;
        rejected.decided_at = Some(Utc::now());
        rejected.rejection_reason = reason;
        self.completion_repository
            .transition(&completion.id, CompletionStatus::Pending, &rejected)
            .await?;
        info!("Rejected completion {}", rejected.id);
        Ok(rejected)
    }

    pub async fn get_completion(&self, completion_id: &str) -> Result<Option<Completion>> {
        self.completion_repository.get_completion(completion_id).await
    }

    /// One-off chores are done for good; recurring chores become available
    /// again in the period the approval lands in, unless an open assignment
    /// already exists there.
    async fn regenerate_after_approval(&self, assignment: &Assignment) -> Result<()> {
        if assignment.frequency == Frequency::Once {
            return Ok(());
        }
        let chore = match self.chore_repository.get_chore(&assignment.chore_id).await? {
            Some(chore) if chore.active => chore,
            _ => {
                warn!(
                    "Not regenerating assignment for missing or inactive chore {}",
                    assignment.chore_id
                );
                return Ok(());
            }
        };

        let today = Utc::now().date_naive();
        let start = period::period_start(chore.frequency, today);
        let key = period::period_key(chore.frequency, today);
        let owner = if chore.competitive {
            None
        } else {
            assignment.child_id.clone()
        };

        let existing = self
            .assignment_repository
            .list_for_period(&chore.id, owner.as_deref(), &key)
            .await?;
        if existing.iter().any(|a| a.is_open()) {
            return Ok(());
        }

        let fresh = Assignment::new_open(&chore, owner, key, start, Utc::now());
        self.assignment_repository.store_assignment(&fresh).await?;
        info!(
            "Regenerated assignment {} for chore {} after approval",
            fresh.id, chore.id
        );
        Ok(())
    }

    async fn credit_with_retry(
        &self,
        family_id: &str,
        child_id: &str,
        pence: i64,
        stars: i64,
        reason: TransactionReason,
    ) -> Result<LedgerTransaction> {
        let mut attempt = 0;
        loop {
            match self
                .ledger_service
                .credit(
                    family_id,
                    child_id,
                    pence,
                    stars,
                    TransactionSource::System,
                    reason.clone(),
                )
                .await
            {
                Ok(transaction) => return Ok(transaction),
                Err(err) => {
                    attempt += 1;
                    let conflicted = matches!(
                        err.downcast_ref::<EngineError>(),
                        Some(EngineError::ConcurrencyConflict { .. })
                    );
                    if !conflicted || attempt >= CREDIT_RETRIES {
                        return Err(err);
                    }
                    warn!(
                        "Retrying credit for {} after write conflict (attempt {})",
                        child_id, attempt
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::bidding::PlaceBidCommand;
    use crate::domain::models::child::Child;
    use crate::domain::models::chore::Chore;
    use crate::storage::memory::MemoryConnection;
    use chrono::Duration;

    struct Fixture {
        connection: Arc<MemoryConnection>,
        service: CompletionService<MemoryConnection>,
        bidding: BiddingService<MemoryConnection>,
        streaks: StreakService<MemoryConnection>,
        ledger: LedgerService<MemoryConnection>,
        chore: Chore,
        child_a: Child,
        child_b: Child,
    }

    async fn setup(competitive: bool) -> Fixture {
        let connection = Arc::new(MemoryConnection::new());
        let bidding = BiddingService::new(Arc::clone(&connection));
        let streaks = StreakService::new(Arc::clone(&connection));
        let ledger = LedgerService::new(Arc::clone(&connection));
        let service = CompletionService::new(
            Arc::clone(&connection),
            bidding.clone(),
            streaks.clone(),
            ledger.clone(),
        );

        let now = Utc::now();
        let chore = Chore {
            id: Chore::generate_id(now.timestamp_millis() as u64),
            family_id: "family::approve".to_string(),
            name: "Hoover the stairs".to_string(),
            frequency: Frequency::Daily,
            base_reward_pence: 50,
            competitive,
            active: true,
            created_at: now,
            updated_at: now,
        };
        connection
            .create_chore_repository()
            .store_chore(&chore)
            .await
            .unwrap();

        let child_repository = connection.create_child_repository();
        let mut children = Vec::new();
        for name in ["Ada", "Ben"] {
            let child = Child {
                id: Child::generate_id(now.timestamp_millis() as u64),
                family_id: chore.family_id.clone(),
                name: name.to_string(),
                paused: false,
                holiday_start: None,
                holiday_end: None,
                created_at: now,
                updated_at: now,
            };
            child_repository.store_child(&child).await.unwrap();
            children.push(child);
        }
        let child_b = children.pop().unwrap();
        let child_a = children.pop().unwrap();

        Fixture {
            connection,
            service,
            bidding,
            streaks,
            ledger,
            chore,
            child_a,
            child_b,
        }
    }

    impl Fixture {
        /// Open assignment for today, owned by `child_id` (None = shared).
        async fn open_assignment(&self, child_id: Option<&str>) -> Assignment {
            let today = Utc::now().date_naive();
            let assignment = Assignment::new_open(
                &self.chore,
                child_id.map(|c| c.to_string()),
                period::period_key(self.chore.frequency, today),
                period::period_start(self.chore.frequency, today),
                Utc::now(),
            );
            self.connection
                .create_assignment_repository()
                .store_assignment(&assignment)
                .await
                .unwrap();
            assignment
        }

        fn submit(&self, assignment: &Assignment, child_id: &str) -> SubmitCompletionCommand {
            SubmitCompletionCommand {
                assignment_id: assignment.id.clone(),
                child_id: child_id.to_string(),
                note: None,
            }
        }
    }

    #[tokio::test]
    async fn approval_credits_the_base_reward() {
        let fixture = setup(false).await;
        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;

        let completion = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();
        assert!(completion.is_pending());

        let outcome = fixture
            .service
            .approve_completion(&completion.id)
            .await
            .unwrap();
        assert_eq!(outcome.credited_pence, 50);
        assert_eq!(outcome.credited_stars, 0);
        assert!(!outcome.rivalry_bonus_star);

        let (pence, stars) = fixture.ledger.balance(&fixture.child_a.id).await.unwrap();
        assert_eq!((pence, stars), (50, 0));

        let transactions = fixture.ledger.transactions(&fixture.child_a.id).await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].reason.tag(), "chore_reward");
    }

    #[tokio::test]
    async fn approval_regenerates_an_open_assignment() {
        let fixture = setup(false).await;
        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;
        let completion = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();
        fixture.service.approve_completion(&completion.id).await.unwrap();

        let today = Utc::now().date_naive();
        let assignments = fixture
            .connection
            .create_assignment_repository()
            .list_for_period(
                &fixture.chore.id,
                Some(&fixture.child_a.id),
                &period::period_key(Frequency::Daily, today),
            )
            .await
            .unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments.iter().filter(|a| a.is_open()).count(), 1);
    }

    #[tokio::test]
    async fn a_completion_is_decided_exactly_once() {
        let fixture = setup(false).await;
        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;
        let completion = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();
        fixture.service.approve_completion(&completion.id).await.unwrap();

        let err = fixture
            .service
            .approve_completion(&completion.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::AlreadyProcessed { .. })
        ));

        // Only the one reward landed.
        let transactions = fixture.ledger.transactions(&fixture.child_a.id).await.unwrap();
        assert_eq!(transactions.len(), 1);
    }

    #[tokio::test]
    async fn rejection_has_no_ledger_effect_and_allows_resubmission() {
        let fixture = setup(false).await;
        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;
        let completion = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();

        let rejected = fixture
            .service
            .reject_completion(&completion.id, Some("not actually hoovered".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.status, CompletionStatus::Rejected);
        assert!(fixture
            .ledger
            .transactions(&fixture.child_a.id)
            .await
            .unwrap()
            .is_empty());

        // The assignment is still open; a second attempt goes through and
        // the streak is not double-counted.
        let second = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();
        assert!(second.is_pending());
        let streak = fixture
            .streaks
            .get(&fixture.child_a.id, &fixture.chore.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(streak.current, 1);
    }

    #[tokio::test]
    async fn duplicate_submission_is_refused_while_one_is_pending() {
        let fixture = setup(false).await;
        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;
        fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();

        let err = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::AlreadyProcessed { .. })
        ));
    }

    #[tokio::test]
    async fn milestone_bonus_is_credited_once_at_approval() {
        let fixture = setup(false).await;
        let today = Utc::now().date_naive();

        // Two consecutive completions already on record.
        for days_back in [2, 1] {
            fixture
                .streaks
                .record_completion(
                    &fixture.chore.family_id,
                    &fixture.child_a.id,
                    &fixture.chore.id,
                    Frequency::Daily,
                    today - Duration::days(days_back),
                )
                .await
                .unwrap();
        }

        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;
        let completion = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap();
        assert_eq!(completion.streak_milestone, Some(3));

        let outcome = fixture
            .service
            .approve_completion(&completion.id)
            .await
            .unwrap();
        assert_eq!(outcome.streak_bonus_stars, Some(1));

        let transactions = fixture.ledger.transactions(&fixture.child_a.id).await.unwrap();
        let tags: Vec<&str> = transactions.iter().map(|t| t.reason.tag()).collect();
        assert_eq!(tags, vec!["chore_reward", "streak_bonus"]);
        let (_, stars) = fixture.ledger.balance(&fixture.child_a.id).await.unwrap();
        assert_eq!(stars, 1);
    }

    #[tokio::test]
    async fn rivalry_champion_earns_the_bid_plus_a_bonus_star() {
        let fixture = setup(true).await;
        let assignment = fixture.open_assignment(None).await;

        fixture
            .bidding
            .place_bid(PlaceBidCommand {
                assignment_id: assignment.id.clone(),
                child_id: fixture.child_a.id.clone(),
                amount_pence: 40,
            })
            .await
            .unwrap();
        fixture
            .bidding
            .place_bid(PlaceBidCommand {
                assignment_id: assignment.id.clone(),
                child_id: fixture.child_b.id.clone(),
                amount_pence: 35,
            })
            .await
            .unwrap();

        // The outbid child can no longer submit.
        let err = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_a.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NotChampion)
        ));

        let completion = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_b.id))
            .await
            .unwrap();
        assert_eq!(completion.bid_amount_pence, Some(35));

        let outcome = fixture
            .service
            .approve_completion(&completion.id)
            .await
            .unwrap();
        assert_eq!(outcome.credited_pence, 35);
        assert_eq!(outcome.credited_stars, 1);
        assert!(outcome.rivalry_bonus_star);

        let (pence, stars) = fixture.ledger.balance(&fixture.child_b.id).await.unwrap();
        assert_eq!((pence, stars), (35, 1));
        let transactions = fixture.ledger.transactions(&fixture.child_b.id).await.unwrap();
        assert_eq!(transactions[0].reason.tag(), "rivalry_bonus");

        // The shared assignment now records who did it.
        let stored = fixture
            .connection
            .create_assignment_repository()
            .get_assignment(&assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.child_id, Some(fixture.child_b.id.clone()));
        assert_eq!(stored.status, AssignmentStatus::Completed);
    }

    #[tokio::test]
    async fn submitting_anothers_assignment_fails() {
        let fixture = setup(false).await;
        let assignment = fixture.open_assignment(Some(&fixture.child_a.id)).await;
        let err = fixture
            .service
            .submit_completion(fixture.submit(&assignment, &fixture.child_b.id))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not assigned to"));
    }
}

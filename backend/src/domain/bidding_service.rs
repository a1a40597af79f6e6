//! Rivalry bidding on competitive assignments.
//!
//! Siblings underbid each other for the right to do a chore at a reduced
//! payout; the active bid with the lowest amount is the champion, ties going
//! to the earlier bid. Bids are append-only history: a losing bid is never
//! deactivated, the champion is simply recomputed.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;

use crate::domain::commands::bidding::PlaceBidCommand;
use crate::domain::errors::EngineError;
use crate::domain::models::assignment::Assignment;
use crate::domain::models::bid::Bid;
use crate::storage::traits::{
    AssignmentStorage, BidStorage, ChildStorage, CompletionStorage, Connection,
};

#[derive(Clone)]
pub struct BiddingService<C: Connection> {
    assignment_repository: C::AssignmentRepository,
    bid_repository: C::BidRepository,
    completion_repository: C::CompletionRepository,
    child_repository: C::ChildRepository,
}

impl<C: Connection> BiddingService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            assignment_repository: connection.create_assignment_repository(),
            bid_repository: connection.create_bid_repository(),
            completion_repository: connection.create_completion_repository(),
            child_repository: connection.create_child_repository(),
        }
    }

    /// Place a bid on a competitive assignment.
    ///
    /// With no champion yet the amount must be in `(0, base_reward]`; with a
    /// champion it must strictly undercut them. Everything else is an
    /// `InvalidBidAmount`.
    pub async fn place_bid(&self, command: PlaceBidCommand) -> Result<Bid> {
        let assignment = self
            .assignment_repository
            .get_assignment(&command.assignment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("assignment", &command.assignment_id))?;

        if !assignment.competitive {
            return Err(EngineError::invalid_bid("assignment is not open to bidding").into());
        }
        if !assignment.is_open() {
            return Err(EngineError::invalid_bid("assignment is no longer open").into());
        }
        let completions = self
            .completion_repository
            .list_by_assignment(&assignment.id)
            .await?;
        if completions.iter().any(|c| c.counts_as_submitted()) {
            return Err(
                EngineError::invalid_bid("assignment has already been submitted for completion")
                    .into(),
            );
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

        let bids = self.bid_repository.list_by_assignment(&assignment.id).await?;
        match Self::champion_of(&bids) {
            None => {
                if command.amount_pence <= 0 || command.amount_pence > assignment.base_reward_pence
                {
                    return Err(EngineError::invalid_bid(format!(
                        "opening bid must be between 1 and {} pence",
                        assignment.base_reward_pence
                    ))
                    .into());
                }
            }
            Some(champion) => {
                if command.amount_pence >= champion.amount_pence || command.amount_pence <= 0 {
                    return Err(EngineError::invalid_bid(format!(
                        "bid must undercut the current champion's {} pence",
                        champion.amount_pence
                    ))
                    .into());
                }
            }
        }

        let now = Utc::now();
        let bid = Bid {
            id: Bid::generate_id(now.timestamp_millis() as u64),
            assignment_id: assignment.id.clone(),
            child_id: child.id.clone(),
            amount_pence: command.amount_pence,
            active: true,
            placed_at: now,
        };
        self.bid_repository.store_bid(&bid).await?;
        info!(
            "Child {} bid {}p on assignment {}",
            child.id, bid.amount_pence, assignment.id
        );
        Ok(bid)
    }

    /// Current champion bid for an assignment, if any bids are active.
    pub async fn champion(&self, assignment_id: &str) -> Result<Option<Bid>> {
        let bids = self.bid_repository.list_by_assignment(assignment_id).await?;
        Ok(Self::champion_of(&bids).cloned())
    }

    /// All bids on an assignment in placement order.
    pub async fn list_bids(&self, assignment_id: &str) -> Result<Vec<Bid>> {
        self.bid_repository.list_by_assignment(assignment_id).await
    }

    /// Whether `child_id` may submit a completion for this assignment under
    /// the rivalry rules. Non-competitive assignments are unrestricted.
    pub async fn ensure_champion(&self, assignment: &Assignment, child_id: &str) -> Result<Bid> {
        let bids = self
            .bid_repository
            .list_by_assignment(&assignment.id)
            .await?;
        match Self::champion_of(&bids) {
            Some(champion) if champion.child_id == child_id => Ok(champion.clone()),
            _ => Err(EngineError::NotChampion.into()),
        }
    }

    /// Lowest active bid, ties broken by earliest placement.
    fn champion_of(bids: &[Bid]) -> Option<&Bid> {
        bids.iter()
            .filter(|b| b.active)
            .min_by(|a, b| {
                a.amount_pence
                    .cmp(&b.amount_pence)
                    .then(a.placed_at.cmp(&b.placed_at))
                    .then(a.id.cmp(&b.id))
            })
    }
}

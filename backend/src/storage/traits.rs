//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. The
//! domain only ever sees these traits; the reference implementation lives in
//! [`crate::storage::memory`].

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::assignment::Assignment;
use crate::domain::models::bid::Bid;
use crate::domain::models::child::Child;
use crate::domain::models::chore::Chore;
use crate::domain::models::completion::{Completion, CompletionStatus};
use crate::domain::models::family::Family;
use crate::domain::models::streak::Streak;
use crate::domain::models::transaction::LedgerTransaction;
use crate::domain::models::wallet::Wallet;

/// Trait defining the interface for family storage operations.
#[async_trait]
pub trait FamilyStorage: Send + Sync {
    /// Store a new family
    async fn store_family(&self, family: &Family) -> Result<()>;

    /// Retrieve a specific family by ID
    async fn get_family(&self, family_id: &str) -> Result<Option<Family>>;

    /// List all families ordered by name
    async fn list_families(&self) -> Result<Vec<Family>>;

    /// Update an existing family
    async fn update_family(&self, family: &Family) -> Result<()>;
}

/// Trait defining the interface for child storage operations.
#[async_trait]
pub trait ChildStorage: Send + Sync {
    /// Store a new child
    async fn store_child(&self, child: &Child) -> Result<()>;

    /// Retrieve a specific child by ID
    async fn get_child(&self, child_id: &str) -> Result<Option<Child>>;

    /// List a family's children ordered by name
    async fn list_children(&self, family_id: &str) -> Result<Vec<Child>>;

    /// Update an existing child
    async fn update_child(&self, child: &Child) -> Result<()>;
}

/// Trait defining the interface for chore storage operations.
#[async_trait]
pub trait ChoreStorage: Send + Sync {
    /// Store a new chore
    async fn store_chore(&self, chore: &Chore) -> Result<()>;

    /// Retrieve a specific chore by ID
    async fn get_chore(&self, chore_id: &str) -> Result<Option<Chore>>;

    /// List a family's chores ordered by name
    async fn list_chores(&self, family_id: &str) -> Result<Vec<Chore>>;

    /// Update an existing chore
    async fn update_chore(&self, chore: &Chore) -> Result<()>;
}

/// Trait defining the interface for assignment storage operations.
#[async_trait]
pub trait AssignmentStorage: Send + Sync {
    /// Store a new assignment
    async fn store_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Retrieve a specific assignment by ID
    async fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>>;

    /// Update an existing assignment
    async fn update_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// All assignments for a (chore, owner, period) triple, newest first.
    /// `child_id = None` addresses shared competitive assignments.
    async fn list_for_period(
        &self,
        chore_id: &str,
        child_id: Option<&str>,
        period_key: &str,
    ) -> Result<Vec<Assignment>>;

    /// Whether any assignment was ever generated for this (chore, owner),
    /// used to gate one-off chores
    async fn has_any_for_chore(&self, chore_id: &str, child_id: Option<&str>) -> Result<bool>;

    /// All open assignments of a family, newest first
    async fn list_open_for_family(&self, family_id: &str) -> Result<Vec<Assignment>>;
}

/// Trait defining the interface for completion storage operations.
#[async_trait]
pub trait CompletionStorage: Send + Sync {
    /// Store a new completion
    async fn store_completion(&self, completion: &Completion) -> Result<()>;

    /// Retrieve a specific completion by ID
    async fn get_completion(&self, completion_id: &str) -> Result<Option<Completion>>;

    /// List completions for an assignment ordered by submission time
    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Completion>>;

    /// Atomically transition a completion out of `from` into the state in
    /// `updated`. Fails when the stored status no longer matches `from`, so
    /// a completion is decided exactly once even under racing guardians.
    async fn transition(
        &self,
        completion_id: &str,
        from: CompletionStatus,
        updated: &Completion,
    ) -> Result<()>;
}

/// Trait defining the interface for bid storage operations.
#[async_trait]
pub trait BidStorage: Send + Sync {
    /// Store a new bid
    async fn store_bid(&self, bid: &Bid) -> Result<()>;

    /// Retrieve a specific bid by ID
    async fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>>;

    /// List all bids for an assignment ordered by placement time
    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Bid>>;
}

/// Trait defining the interface for streak storage operations.
#[async_trait]
pub trait StreakStorage: Send + Sync {
    /// Retrieve the streak record for a (child, chore) pair
    async fn get_streak(&self, child_id: &str, chore_id: &str) -> Result<Option<Streak>>;

    /// Insert or update a streak record
    async fn upsert_streak(&self, streak: &Streak) -> Result<()>;
}

/// Trait defining the interface for wallet and ledger storage operations.
///
/// The wallet row and its transaction log must move together: `apply` is a
/// single atomic unit, and a reader never observes a transaction without the
/// corresponding balance update or vice versa.
#[async_trait]
pub trait WalletStorage: Send + Sync {
    /// Retrieve a wallet by its ID
    async fn get_wallet(&self, wallet_id: &str) -> Result<Option<Wallet>>;

    /// List all wallets of a family
    async fn list_wallets(&self, family_id: &str) -> Result<Vec<Wallet>>;

    /// Atomically append `transaction` and store the updated wallet.
    ///
    /// `expected_version` is the version the caller read (0 for a wallet
    /// not yet persisted); a mismatch means a concurrent writer won and the
    /// call fails with [`crate::domain::errors::EngineError::ConcurrencyConflict`].
    async fn apply(
        &self,
        wallet: &Wallet,
        transaction: &LedgerTransaction,
        expected_version: u64,
    ) -> Result<()>;

    /// Mark a wallet frozen so no further writes are accepted
    async fn freeze_wallet(&self, wallet_id: &str) -> Result<()>;

    /// All transactions of a wallet in chronological order
    async fn list_transactions(&self, wallet_id: &str) -> Result<Vec<LedgerTransaction>>;
}

/// Trait defining the interface for storage connections.
///
/// This abstracts away the concrete backend and provides factory methods for
/// creating repositories, so the domain layer works with any storage backend
/// without knowing the implementation details.
pub trait Connection: Send + Sync + Clone + 'static {
    type FamilyRepository: FamilyStorage + Clone + 'static;
    type ChildRepository: ChildStorage + Clone + 'static;
    type ChoreRepository: ChoreStorage + Clone + 'static;
    type AssignmentRepository: AssignmentStorage + Clone + 'static;
    type CompletionRepository: CompletionStorage + Clone + 'static;
    type BidRepository: BidStorage + Clone + 'static;
    type StreakRepository: StreakStorage + Clone + 'static;
    type WalletRepository: WalletStorage + Clone + 'static;

    fn create_family_repository(&self) -> Self::FamilyRepository;
    fn create_child_repository(&self) -> Self::ChildRepository;
    fn create_chore_repository(&self) -> Self::ChoreRepository;
    fn create_assignment_repository(&self) -> Self::AssignmentRepository;
    fn create_completion_repository(&self) -> Self::CompletionRepository;
    fn create_bid_repository(&self) -> Self::BidRepository;
    fn create_streak_repository(&self) -> Self::StreakRepository;
    fn create_wallet_repository(&self) -> Self::WalletRepository;
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::models::assignment::Assignment;
use crate::domain::models::bid::Bid;
use crate::domain::models::child::Child;
use crate::domain::models::chore::Chore;
use crate::domain::models::completion::Completion;
use crate::domain::models::family::Family;
use crate::domain::models::streak::Streak;
use crate::domain::models::transaction::LedgerTransaction;
use crate::domain::models::wallet::Wallet;
use crate::storage::traits::Connection;

use super::assignment_repository::MemoryAssignmentRepository;
use super::bid_repository::MemoryBidRepository;
use super::child_repository::MemoryChildRepository;
use super::chore_repository::MemoryChoreRepository;
use super::completion_repository::MemoryCompletionRepository;
use super::family_repository::MemoryFamilyRepository;
use super::streak_repository::MemoryStreakRepository;
use super::wallet_repository::MemoryWalletRepository;

/// Wallets and their transaction logs live behind one lock: a wallet update
/// and its appended transaction are observed together or not at all.
#[derive(Default)]
pub(crate) struct LedgerTable {
    pub wallets: HashMap<String, Wallet>,
    pub transactions: HashMap<String, Vec<LedgerTransaction>>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    pub families: Mutex<HashMap<String, Family>>,
    pub children: Mutex<HashMap<String, Child>>,
    pub chores: Mutex<HashMap<String, Chore>>,
    pub assignments: Mutex<HashMap<String, Assignment>>,
    pub completions: Mutex<HashMap<String, Completion>>,
    pub bids: Mutex<HashMap<String, Bid>>,
    /// Keyed by (child, chore) composite
    pub streaks: Mutex<HashMap<String, Streak>>,
    pub ledger: Mutex<LedgerTable>,
}

impl MemoryStore {
    pub fn streak_key(child_id: &str, chore_id: &str) -> String {
        format!("{}|{}", child_id, chore_id)
    }
}

/// MemoryConnection hands out repositories backed by one shared store.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    store: Arc<MemoryStore>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }
}

impl Connection for MemoryConnection {
    type FamilyRepository = MemoryFamilyRepository;
    type ChildRepository = MemoryChildRepository;
    type ChoreRepository = MemoryChoreRepository;
    type AssignmentRepository = MemoryAssignmentRepository;
    type CompletionRepository = MemoryCompletionRepository;
    type BidRepository = MemoryBidRepository;
    type StreakRepository = MemoryStreakRepository;
    type WalletRepository = MemoryWalletRepository;

    fn create_family_repository(&self) -> Self::FamilyRepository {
        MemoryFamilyRepository::new(self.store())
    }

    fn create_child_repository(&self) -> Self::ChildRepository {
        MemoryChildRepository::new(self.store())
    }

    fn create_chore_repository(&self) -> Self::ChoreRepository {
        MemoryChoreRepository::new(self.store())
    }

    fn create_assignment_repository(&self) -> Self::AssignmentRepository {
        MemoryAssignmentRepository::new(self.store())
    }

    fn create_completion_repository(&self) -> Self::CompletionRepository {
        MemoryCompletionRepository::new(self.store())
    }

    fn create_bid_repository(&self) -> Self::BidRepository {
        MemoryBidRepository::new(self.store())
    }

    fn create_streak_repository(&self) -> Self::StreakRepository {
        MemoryStreakRepository::new(self.store())
    }

    fn create_wallet_repository(&self) -> Self::WalletRepository {
        MemoryWalletRepository::new(self.store())
    }
}

//! # Storage Module
//!
//! Data persistence for the chore tracker. The domain layer depends only on
//! the traits in [`traits`]; [`memory`] is the in-process reference store
//! used by the server binary and the test suite.

pub mod memory;
pub mod traits;

pub use memory::MemoryConnection;
pub use traits::{
    AssignmentStorage, BidStorage, ChildStorage, ChoreStorage, CompletionStorage, Connection,
    FamilyStorage, StreakStorage, WalletStorage,
};

//! # Domain Module
//!
//! Business logic for the chore tracker engine.
//!
//! ## Module Organization
//!
//! - **generation_service**: the daily cycle that (re)creates assignments
//!   and settles missed periods
//! - **streak_service**: consecutive-completion tracking with protection
//! - **penalty**: pure policy mapping miss runs to penalty amounts
//! - **bidding_service**: rivalry bidding on competitive assignments
//! - **completion_service**: child submissions and guardian decisions
//! - **ledger_service**: the only path that mutates wallet balances
//! - **family_service / child_service / chore_service**: supporting CRUD
//!   around the engine
//!
//! Streaks count from *submission* time while rewards are gated on
//! *approval*; slow guardians never cost a child their streak. That
//! asymmetry is intentional and relied on throughout.

pub mod bidding_service;
pub mod child_service;
pub mod chore_service;
pub mod commands;
pub mod completion_service;
pub mod errors;
pub mod exemption;
pub mod family_service;
pub mod generation_service;
pub mod ledger_service;
pub mod models;
pub mod penalty;
pub mod period;
pub mod streak_service;

pub use bidding_service::BiddingService;
pub use child_service::ChildService;
pub use chore_service::ChoreService;
pub use completion_service::CompletionService;
pub use errors::EngineError;
pub use family_service::FamilyService;
pub use generation_service::GenerationService;
pub use ledger_service::LedgerService;
pub use streak_service::StreakService;

//! Typed error taxonomy for the chore engine.
//!
//! Services return `anyhow::Result` and attach one of these variants when a
//! failure is part of the engine's contract; the REST layer and tests
//! recover them with `downcast_ref::<EngineError>()`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid bid: {reason}")]
    InvalidBidAmount { reason: String },

    #[error("only the champion bidder may submit a completion for this assignment")]
    NotChampion,

    #[error("{id} has already been processed")]
    AlreadyProcessed { id: String },

    #[error("debit of {requested_pence}p would breach the protected minimum balance")]
    InsufficientFloor { requested_pence: i64 },

    #[error("wallet {wallet_id} was modified concurrently; retry the operation")]
    ConcurrencyConflict { wallet_id: String },

    #[error("wallet {wallet_id} ledger is out of balance; writes are halted pending reconciliation")]
    LedgerCorrupted { wallet_id: String },
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_bid(reason: impl Into<String>) -> Self {
        EngineError::InvalidBidAmount {
            reason: reason.into(),
        }
    }
}

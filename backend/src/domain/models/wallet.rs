use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cached money and star balances for one child.
///
/// Balances are only ever mutated together with an appended
/// [`super::transaction::LedgerTransaction`]; the cached values must always
/// equal the signed sum of the wallet's transactions. `version` is the
/// optimistic-locking token the store checks on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub family_id: String,
    pub child_id: String,
    pub balance_pence: i64,
    pub stars: i64,
    /// Set when the ledger invariant is found violated; a frozen wallet
    /// refuses all further writes pending manual reconciliation
    pub frozen: bool,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Wallets are keyed by child, one per (family, child).
    pub fn id_for(child_id: &str) -> String {
        format!("wallet::{}", child_id)
    }

    /// Empty wallet, created lazily on first credit or debit.
    pub fn new(family_id: &str, child_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::id_for(child_id),
            family_id: family_id.to_string(),
            child_id: child_id.to_string(),
            balance_pence: 0,
            stars: 0,
            frozen: false,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

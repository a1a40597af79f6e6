//! Wallet ledger service.
//!
//! The only path that mutates balances. Every change appends one
//! transaction row and stores the updated wallet as a single atomic unit;
//! the cached balance must always equal the signed sum of the wallet's
//! transactions. A wallet found violating that invariant is frozen and
//! refuses all further writes pending manual reconciliation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{ensure, Result};
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::errors::EngineError;
use crate::domain::models::family::Family;
use crate::domain::models::transaction::{
    LedgerTransaction, TransactionKind, TransactionReason, TransactionSource,
};
use crate::domain::models::wallet::Wallet;
use crate::domain::penalty::clamp_to_floor;
use crate::storage::traits::{Connection, WalletStorage};

type WalletLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    wallet_repository: C::WalletRepository,
    /// Serializes in-process writers per wallet; the store's version check
    /// still guards against writers outside this process
    locks: WalletLocks,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            wallet_repository: connection.create_wallet_repository(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Credit money and/or stars to a child's wallet.
    pub async fn credit(
        &self,
        family_id: &str,
        child_id: &str,
        pence: i64,
        stars: i64,
        source: TransactionSource,
        reason: TransactionReason,
    ) -> Result<LedgerTransaction> {
        ensure!(pence >= 0 && stars >= 0, "credit amounts must be non-negative");
        let transaction = self
            .apply_with(family_id, child_id, TransactionKind::Credit, source, reason, |_| {
                Ok(Some((pence, stars)))
            })
            .await?;
        Ok(transaction.expect("credit never skips"))
    }

    /// Debit the full amount, failing when the wallet cannot cover it.
    pub async fn debit(
        &self,
        family_id: &str,
        child_id: &str,
        pence: i64,
        stars: i64,
        source: TransactionSource,
        reason: TransactionReason,
    ) -> Result<LedgerTransaction> {
        ensure!(pence >= 0 && stars >= 0, "debit amounts must be non-negative");
        let transaction = self
            .apply_with(family_id, child_id, TransactionKind::Debit, source, reason, |wallet| {
                if wallet.balance_pence < pence || wallet.stars < stars {
                    return Err(EngineError::InsufficientFloor {
                        requested_pence: pence,
                    }
                    .into());
                }
                Ok(Some((pence, stars)))
            })
            .await?;
        Ok(transaction.expect("strict debit never skips"))
    }

    /// Debit for a penalty, clamped so the balance never crosses the
    /// family's floors. Returns `None` (and logs) when the floors already
    /// block any debit; the miss still counts, the wallet is untouched.
    pub async fn debit_clamped(
        &self,
        family: &Family,
        child_id: &str,
        pence: i64,
        stars: i64,
        reason: TransactionReason,
    ) -> Result<Option<LedgerTransaction>> {
        ensure!(pence >= 0 && stars >= 0, "debit amounts must be non-negative");
        let floor_pence = family.min_balance_pence;
        let floor_stars = family.min_balance_stars;
        let family_id = family.id.clone();
        let tag = reason.tag();
        let child = child_id.to_string();
        self.apply_with(
            &family_id,
            child_id,
            TransactionKind::Debit,
            TransactionSource::System,
            reason,
            move |wallet| {
                let apply_pence = clamp_to_floor(pence, wallet.balance_pence, floor_pence);
                let apply_stars = clamp_to_floor(stars, wallet.stars, floor_stars);
                if apply_pence == 0 && apply_stars == 0 {
                    warn!(
                        "Skipping {} debit for child {}: balance already at floor",
                        tag, child
                    );
                    return Ok(None);
                }
                Ok(Some((apply_pence, apply_stars)))
            },
        )
        .await
    }

    /// What `debit_clamped` would apply right now, without writing.
    pub async fn preview_clamped(
        &self,
        family: &Family,
        child_id: &str,
        pence: i64,
        stars: i64,
    ) -> Result<(i64, i64)> {
        let (balance_pence, balance_stars) = self.balance(child_id).await?;
        Ok((
            clamp_to_floor(pence, balance_pence, family.min_balance_pence),
            clamp_to_floor(stars, balance_stars, family.min_balance_stars),
        ))
    }

    /// Cached balance of a child's wallet; zero for a wallet that does not
    /// exist yet.
    pub async fn balance(&self, child_id: &str) -> Result<(i64, i64)> {
        let wallet = self.wallet(child_id).await?;
        Ok(wallet
            .map(|w| (w.balance_pence, w.stars))
            .unwrap_or((0, 0)))
    }

    pub async fn wallet(&self, child_id: &str) -> Result<Option<Wallet>> {
        self.wallet_repository
            .get_wallet(&Wallet::id_for(child_id))
            .await
    }

    /// All wallets of a family that have seen at least one transaction.
    pub async fn family_wallets(&self, family_id: &str) -> Result<Vec<Wallet>> {
        self.wallet_repository.list_wallets(family_id).await
    }

    /// All transactions of a child's wallet in chronological order.
    pub async fn transactions(&self, child_id: &str) -> Result<Vec<LedgerTransaction>> {
        self.wallet_repository
            .list_transactions(&Wallet::id_for(child_id))
            .await
    }

    /// Recompute the signed transaction sum and compare it to the cached
    /// balance. On mismatch the wallet is frozen and the call fails; this
    /// is the one condition the engine never continues through silently.
    pub async fn verify(&self, child_id: &str) -> Result<()> {
        let wallet_id = Wallet::id_for(child_id);
        let lock = self.lock_for(&wallet_id);
        let _guard = lock.lock().await;

        match self.wallet_repository.get_wallet(&wallet_id).await? {
            Some(wallet) => self.check_integrity(&wallet).await,
            None => Ok(()),
        }
    }

    async fn apply_with<F>(
        &self,
        family_id: &str,
        child_id: &str,
        kind: TransactionKind,
        source: TransactionSource,
        reason: TransactionReason,
        decide: F,
    ) -> Result<Option<LedgerTransaction>>
    where
        F: FnOnce(&Wallet) -> Result<Option<(i64, i64)>>,
    {
        let wallet_id = Wallet::id_for(child_id);
        let lock = self.lock_for(&wallet_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let wallet = self
            .wallet_repository
            .get_wallet(&wallet_id)
            .await?
            .unwrap_or_else(|| Wallet::new(family_id, child_id, now));

        if wallet.frozen {
            return Err(EngineError::LedgerCorrupted { wallet_id }.into());
        }
        self.check_integrity(&wallet).await?;

        let Some((pence, stars)) = decide(&wallet)? else {
            return Ok(None);
        };

        let (delta_pence, delta_stars) = match kind {
            TransactionKind::Credit => (pence, stars),
            TransactionKind::Debit => (-pence, -stars),
        };
        let mut updated = wallet.clone();
        updated.balance_pence += delta_pence;
        updated.stars += delta_stars;
        ensure!(
            updated.balance_pence >= 0 && updated.stars >= 0,
            "ledger write would make wallet {} negative",
            wallet_id
        );
        updated.version = wallet.version + 1;
        updated.updated_at = now;

        let transaction = LedgerTransaction {
            id: LedgerTransaction::generate_id(now.timestamp_millis() as u64),
            wallet_id: wallet_id.clone(),
            kind,
            amount_pence: pence,
            star_delta: stars,
            source,
            reason,
            created_at: now,
        };

        self.wallet_repository
            .apply(&updated, &transaction, wallet.version)
            .await?;

        debug!(
            "Ledger {} for {}: {}p / {} stars ({})",
            match kind {
                TransactionKind::Credit => "credit",
                TransactionKind::Debit => "debit",
            },
            child_id,
            pence,
            stars,
            transaction.reason.tag()
        );
        Ok(Some(transaction))
    }

    /// Wallets with history must sum exactly to their cached balance.
    async fn check_integrity(&self, wallet: &Wallet) -> Result<()> {
        if wallet.version == 0 {
            return Ok(());
        }
        let transactions = self.wallet_repository.list_transactions(&wallet.id).await?;
        let sum_pence: i64 = transactions.iter().map(|t| t.signed_pence()).sum();
        let sum_stars: i64 = transactions.iter().map(|t| t.signed_stars()).sum();
        if sum_pence != wallet.balance_pence || sum_stars != wallet.stars {
            warn!(
                "Wallet {} out of balance: cached {}p/{}* vs ledger {}p/{}*; freezing",
                wallet.id, wallet.balance_pence, wallet.stars, sum_pence, sum_stars
            );
            self.wallet_repository.freeze_wallet(&wallet.id).await?;
            return Err(EngineError::LedgerCorrupted {
                wallet_id: wallet.id.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn lock_for(&self, wallet_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(wallet_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

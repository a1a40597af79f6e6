use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::errors::EngineError;
use crate::domain::models::transaction::LedgerTransaction;
use crate::domain::models::wallet::Wallet;
use crate::storage::traits::WalletStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryWalletRepository {
    store: Arc<MemoryStore>,
}

impl MemoryWalletRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WalletStorage for MemoryWalletRepository {
    async fn get_wallet(&self, wallet_id: &str) -> Result<Option<Wallet>> {
        let ledger = self.store.ledger.lock().unwrap();
        Ok(ledger.wallets.get(wallet_id).cloned())
    }

    async fn list_wallets(&self, family_id: &str) -> Result<Vec<Wallet>> {
        let ledger = self.store.ledger.lock().unwrap();
        let mut wallets: Vec<Wallet> = ledger
            .wallets
            .values()
            .filter(|w| w.family_id == family_id)
            .cloned()
            .collect();
        wallets.sort_by(|a, b| a.child_id.cmp(&b.child_id));
        Ok(wallets)
    }

    async fn apply(
        &self,
        wallet: &Wallet,
        transaction: &LedgerTransaction,
        expected_version: u64,
    ) -> Result<()> {
        let mut ledger = self.store.ledger.lock().unwrap();
        let current_version = ledger
            .wallets
            .get(&wallet.id)
            .map(|w| w.version)
            .unwrap_or(0);
        if current_version != expected_version {
            return Err(EngineError::ConcurrencyConflict {
                wallet_id: wallet.id.clone(),
            }
            .into());
        }
        ledger.wallets.insert(wallet.id.clone(), wallet.clone());
        ledger
            .transactions
            .entry(wallet.id.clone())
            .or_default()
            .push(transaction.clone());
        Ok(())
    }

    async fn freeze_wallet(&self, wallet_id: &str) -> Result<()> {
        let mut ledger = self.store.ledger.lock().unwrap();
        let wallet = ledger
            .wallets
            .get_mut(wallet_id)
            .ok_or_else(|| EngineError::not_found("wallet", wallet_id))?;
        wallet.frozen = true;
        wallet.version += 1;
        Ok(())
    }

    async fn list_transactions(&self, wallet_id: &str) -> Result<Vec<LedgerTransaction>> {
        let ledger = self.store.ledger.lock().unwrap();
        Ok(ledger
            .transactions
            .get(wallet_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::transaction::{TransactionKind, TransactionReason, TransactionSource};
    use chrono::Utc;

    fn wallet_and_transaction(version: u64) -> (Wallet, LedgerTransaction) {
        let now = Utc::now();
        let mut wallet = Wallet::new("family::t", "child::t", now);
        wallet.balance_pence = 50;
        wallet.version = version;
        let transaction = LedgerTransaction {
            id: LedgerTransaction::generate_id(now.timestamp_millis() as u64),
            wallet_id: wallet.id.clone(),
            kind: TransactionKind::Credit,
            amount_pence: 50,
            star_delta: 0,
            source: TransactionSource::System,
            reason: TransactionReason::ManualGift { note: None },
            created_at: now,
        };
        (wallet, transaction)
    }

    #[tokio::test]
    async fn apply_inserts_wallet_and_transaction_together() {
        let repository = MemoryWalletRepository::new(Arc::new(MemoryStore::default()));
        let (wallet, transaction) = wallet_and_transaction(1);

        repository.apply(&wallet, &transaction, 0).await.unwrap();

        let stored = repository.get_wallet(&wallet.id).await.unwrap().unwrap();
        assert_eq!(stored.balance_pence, 50);
        assert_eq!(stored.version, 1);
        let transactions = repository.list_transactions(&wallet.id).await.unwrap();
        assert_eq!(transactions.len(), 1);
    }

    #[tokio::test]
    async fn apply_rejects_a_stale_version() {
        let repository = MemoryWalletRepository::new(Arc::new(MemoryStore::default()));
        let (wallet, transaction) = wallet_and_transaction(1);
        repository.apply(&wallet, &transaction, 0).await.unwrap();

        // A second writer that read version 0 loses the race.
        let err = repository.apply(&wallet, &transaction, 0).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::ConcurrencyConflict { .. })
        ));
    }
}

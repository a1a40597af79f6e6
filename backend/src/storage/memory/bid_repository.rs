use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::bid::Bid;
use crate::storage::traits::BidStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryBidRepository {
    store: Arc<MemoryStore>,
}

impl MemoryBidRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BidStorage for MemoryBidRepository {
    async fn store_bid(&self, bid: &Bid) -> Result<()> {
        let mut bids = self.store.bids.lock().unwrap();
        bids.insert(bid.id.clone(), bid.clone());
        Ok(())
    }

    async fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>> {
        let bids = self.store.bids.lock().unwrap();
        Ok(bids.get(bid_id).cloned())
    }

    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Bid>> {
        let bids = self.store.bids.lock().unwrap();
        let mut matching: Vec<Bid> = bids
            .values()
            .filter(|b| b.assignment_id == assignment_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.placed_at.cmp(&b.placed_at));
        Ok(matching)
    }
}

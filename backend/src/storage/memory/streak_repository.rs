use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::streak::Streak;
use crate::storage::traits::StreakStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryStreakRepository {
    store: Arc<MemoryStore>,
}

impl MemoryStreakRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StreakStorage for MemoryStreakRepository {
    async fn get_streak(&self, child_id: &str, chore_id: &str) -> Result<Option<Streak>> {
        let streaks = self.store.streaks.lock().unwrap();
        Ok(streaks
            .get(&MemoryStore::streak_key(child_id, chore_id))
            .cloned())
    }

    async fn upsert_streak(&self, streak: &Streak) -> Result<()> {
        let mut streaks = self.store.streaks.lock().unwrap();
        streaks.insert(
            MemoryStore::streak_key(&streak.child_id, &streak.chore_id),
            streak.clone(),
        );
        Ok(())
    }
}

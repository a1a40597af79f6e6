use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::chore::Chore;
use crate::storage::traits::ChoreStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryChoreRepository {
    store: Arc<MemoryStore>,
}

impl MemoryChoreRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChoreStorage for MemoryChoreRepository {
    async fn store_chore(&self, chore: &Chore) -> Result<()> {
        let mut chores = self.store.chores.lock().unwrap();
        chores.insert(chore.id.clone(), chore.clone());
        Ok(())
    }

    async fn get_chore(&self, chore_id: &str) -> Result<Option<Chore>> {
        let chores = self.store.chores.lock().unwrap();
        Ok(chores.get(chore_id).cloned())
    }

    async fn list_chores(&self, family_id: &str) -> Result<Vec<Chore>> {
        let chores = self.store.chores.lock().unwrap();
        let mut family: Vec<Chore> = chores
            .values()
            .filter(|c| c.family_id == family_id)
            .cloned()
            .collect();
        family.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(family)
    }

    async fn update_chore(&self, chore: &Chore) -> Result<()> {
        let mut chores = self.store.chores.lock().unwrap();
        chores.insert(chore.id.clone(), chore.clone());
        Ok(())
    }
}

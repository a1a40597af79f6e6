use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::family::Family;
use crate::storage::traits::FamilyStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryFamilyRepository {
    store: Arc<MemoryStore>,
}

impl MemoryFamilyRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FamilyStorage for MemoryFamilyRepository {
    async fn store_family(&self, family: &Family) -> Result<()> {
        let mut families = self.store.families.lock().unwrap();
        families.insert(family.id.clone(), family.clone());
        Ok(())
    }

    async fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        let families = self.store.families.lock().unwrap();
        Ok(families.get(family_id).cloned())
    }

    async fn list_families(&self) -> Result<Vec<Family>> {
        let families = self.store.families.lock().unwrap();
        let mut all: Vec<Family> = families.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_family(&self, family: &Family) -> Result<()> {
        let mut families = self.store.families.lock().unwrap();
        families.insert(family.id.clone(), family.clone());
        Ok(())
    }
}

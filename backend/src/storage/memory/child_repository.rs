use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::child::Child;
use crate::storage::traits::ChildStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryChildRepository {
    store: Arc<MemoryStore>,
}

impl MemoryChildRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChildStorage for MemoryChildRepository {
    async fn store_child(&self, child: &Child) -> Result<()> {
        let mut children = self.store.children.lock().unwrap();
        children.insert(child.id.clone(), child.clone());
        Ok(())
    }

    async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        let children = self.store.children.lock().unwrap();
        Ok(children.get(child_id).cloned())
    }

    async fn list_children(&self, family_id: &str) -> Result<Vec<Child>> {
        let children = self.store.children.lock().unwrap();
        let mut family: Vec<Child> = children
            .values()
            .filter(|c| c.family_id == family_id)
            .cloned()
            .collect();
        family.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(family)
    }

    async fn update_child(&self, child: &Child) -> Result<()> {
        let mut children = self.store.children.lock().unwrap();
        children.insert(child.id.clone(), child.clone());
        Ok(())
    }
}

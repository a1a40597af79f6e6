use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::errors::EngineError;
use crate::domain::models::completion::{Completion, CompletionStatus};
use crate::storage::traits::CompletionStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryCompletionRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCompletionRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CompletionStorage for MemoryCompletionRepository {
    async fn store_completion(&self, completion: &Completion) -> Result<()> {
        let mut completions = self.store.completions.lock().unwrap();
        completions.insert(completion.id.clone(), completion.clone());
        Ok(())
    }

    async fn get_completion(&self, completion_id: &str) -> Result<Option<Completion>> {
        let completions = self.store.completions.lock().unwrap();
        Ok(completions.get(completion_id).cloned())
    }

    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Completion>> {
        let completions = self.store.completions.lock().unwrap();
        let mut matching: Vec<Completion> = completions
            .values()
            .filter(|c| c.assignment_id == assignment_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(matching)
    }

    async fn transition(
        &self,
        completion_id: &str,
        from: CompletionStatus,
        updated: &Completion,
    ) -> Result<()> {
        let mut completions = self.store.completions.lock().unwrap();
        let current = completions.get(completion_id).ok_or_else(|| {
            EngineError::not_found("completion", completion_id)
        })?;
        if current.status != from {
            return Err(EngineError::AlreadyProcessed {
                id: completion_id.to_string(),
            }
            .into());
        }
        completions.insert(completion_id.to_string(), updated.clone());
        Ok(())
    }
}

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::assignment::Assignment;
use crate::storage::traits::AssignmentStorage;

use super::connection::MemoryStore;

#[derive(Clone)]
pub struct MemoryAssignmentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryAssignmentRepository {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AssignmentStorage for MemoryAssignmentRepository {
    async fn store_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut assignments = self.store.assignments.lock().unwrap();
        assignments.insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    async fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        let assignments = self.store.assignments.lock().unwrap();
        Ok(assignments.get(assignment_id).cloned())
    }

    async fn update_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut assignments = self.store.assignments.lock().unwrap();
        assignments.insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    async fn list_for_period(
        &self,
        chore_id: &str,
        child_id: Option<&str>,
        period_key: &str,
    ) -> Result<Vec<Assignment>> {
        let assignments = self.store.assignments.lock().unwrap();
        let mut matching: Vec<Assignment> = assignments
            .values()
            .filter(|a| {
                a.chore_id == chore_id
                    && a.period_key == period_key
                    && a.child_id.as_deref() == child_id
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn has_any_for_chore(&self, chore_id: &str, child_id: Option<&str>) -> Result<bool> {
        let assignments = self.store.assignments.lock().unwrap();
        Ok(assignments
            .values()
            .any(|a| a.chore_id == chore_id && a.child_id.as_deref() == child_id))
    }

    async fn list_open_for_family(&self, family_id: &str) -> Result<Vec<Assignment>> {
        let assignments = self.store.assignments.lock().unwrap();
        let mut open: Vec<Assignment> = assignments
            .values()
            .filter(|a| a.family_id == family_id && a.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(open)
    }
}

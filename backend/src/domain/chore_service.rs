//! Chore management.
//!
//! Chores are family-wide; every non-paused child gets their own assignment
//! per period, or one shared assignment when the chore is competitive.
//! Edits only affect future assignments; history keeps its snapshots.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;

use crate::domain::commands::chore::CreateChoreCommand;
use crate::domain::errors::EngineError;
use crate::domain::models::assignment::Assignment;
use crate::domain::models::chore::Chore;
use crate::storage::traits::{AssignmentStorage, ChoreStorage, Connection, FamilyStorage};

#[derive(Clone)]
pub struct ChoreService<C: Connection> {
    chore_repository: C::ChoreRepository,
    assignment_repository: C::AssignmentRepository,
    family_repository: C::FamilyRepository,
}

impl<C: Connection> ChoreService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            chore_repository: connection.create_chore_repository(),
            assignment_repository: connection.create_assignment_repository(),
            family_repository: connection.create_family_repository(),
        }
    }

    pub async fn create_chore(&self, command: CreateChoreCommand) -> Result<Chore> {
        if command.name.trim().is_empty() {
            return Err(anyhow!("Chore name cannot be empty"));
        }
        if command.base_reward_pence <= 0 {
            return Err(anyhow!("Chore reward must be positive"));
        }
        if self
            .family_repository
            .get_family(&command.family_id)
            .await?
            .is_none()
        {
            return Err(EngineError::not_found("family", &command.family_id).into());
        }

        let now = Utc::now();
        let chore = Chore {
            id: Chore::generate_id(now.timestamp_millis() as u64),
            family_id: command.family_id,
            name: command.name.trim().to_string(),
            frequency: command.frequency,
            base_reward_pence: command.base_reward_pence,
            competitive: command.competitive,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.chore_repository.store_chore(&chore).await?;
        info!(
            "Created {:?} chore {} ({}p) in family {}",
            chore.frequency, chore.id, chore.base_reward_pence, chore.family_id
        );
        Ok(chore)
    }

    pub async fn get_chore(&self, chore_id: &str) -> Result<Option<Chore>> {
        self.chore_repository.get_chore(chore_id).await
    }

    pub async fn list_chores(&self, family_id: &str) -> Result<Vec<Chore>> {
        self.chore_repository.list_chores(family_id).await
    }

    /// The family's chore board: every assignment still waiting to be done.
    pub async fn list_open_assignments(&self, family_id: &str) -> Result<Vec<Assignment>> {
        self.assignment_repository.list_open_for_family(family_id).await
    }

    /// Retire a chore from generation; existing assignments are untouched.
    pub async fn deactivate_chore(&self, chore_id: &str) -> Result<Chore> {
        let mut chore = self
            .chore_repository
            .get_chore(chore_id)
            .await?
            .ok_or_else(|| EngineError::not_found("chore", chore_id))?;
        chore.active = false;
        chore.updated_at = Utc::now();
        self.chore_repository.update_chore(&chore).await?;
        info!("Deactivated chore {}", chore.id);
        Ok(chore)
    }
}

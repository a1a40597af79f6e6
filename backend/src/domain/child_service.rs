//! Child management: profile, pause state, and per-child holiday windows.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;

use crate::domain::commands::child::{CreateChildCommand, UpdateChildCommand};
use crate::domain::errors::EngineError;
use crate::domain::models::child::Child;
use crate::storage::traits::{ChildStorage, Connection, FamilyStorage};

#[derive(Clone)]
pub struct ChildService<C: Connection> {
    child_repository: C::ChildRepository,
    family_repository: C::FamilyRepository,
}

impl<C: Connection> ChildService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            child_repository: connection.create_child_repository(),
            family_repository: connection.create_family_repository(),
        }
    }

    pub async fn create_child(&self, command: CreateChildCommand) -> Result<Child> {
        if command.name.trim().is_empty() {
            return Err(anyhow!("Child name cannot be empty"));
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
        let child = Child {
            id: Child::generate_id(now.timestamp_millis() as u64),
            family_id: command.family_id,
            name: command.name.trim().to_string(),
            paused: false,
            holiday_start: None,
            holiday_end: None,
            created_at: now,
            updated_at: now,
        };
        self.child_repository.store_child(&child).await?;
        info!("Created child {} in family {}", child.id, child.family_id);
        Ok(child)
    }

    pub async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        self.child_repository.get_child(child_id).await
    }

    pub async fn list_children(&self, family_id: &str) -> Result<Vec<Child>> {
        self.child_repository.list_children(family_id).await
    }

    /// Update pause state and holiday window. A paused or holiday-covered
    /// child drops out of generation and penalties for the covered period.
    pub async fn update_child(&self, command: UpdateChildCommand) -> Result<Child> {
        if let (Some(start), Some(end)) = (command.holiday_start, command.holiday_end) {
            if start > end {
                return Err(anyhow!("Holiday window cannot end before it starts"));
            }
        }

        let mut child = self
            .child_repository
            .get_child(&command.child_id)
            .await?
            .ok_or_else(|| EngineError::not_found("child", &command.child_id))?;
        child.paused = command.paused;
        child.holiday_start = command.holiday_start;
        child.holiday_end = command.holiday_end;
        child.updated_at = Utc::now();
        self.child_repository.update_child(&child).await?;
        info!(
            "Updated child {} (paused={}, holiday={:?}..{:?})",
            child.id, child.paused, child.holiday_start, child.holiday_end
        );
        Ok(child)
    }
}

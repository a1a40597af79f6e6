//! Family management and guardian settings.
//!
//! The settings stored here are read-only inputs to the generation and
//! penalty machinery; this service is the only writer.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;

use crate::domain::commands::family::{CreateFamilyCommand, UpdateFamilySettingsCommand};
use crate::domain::errors::EngineError;
use crate::domain::models::family::{Family, PenaltyMode};
use crate::storage::traits::{Connection, FamilyStorage};

#[derive(Clone)]
pub struct FamilyService<C: Connection> {
    family_repository: C::FamilyRepository,
}

impl<C: Connection> FamilyService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            family_repository: connection.create_family_repository(),
        }
    }

    /// Create a family with conservative defaults: penalties are off until
    /// a guardian turns them on.
    pub async fn create_family(&self, command: CreateFamilyCommand) -> Result<Family> {
        if command.name.trim().is_empty() {
            return Err(anyhow!("Family name cannot be empty"));
        }

        let now = Utc::now();
        let family = Family {
            id: Family::generate_id(now.timestamp_millis() as u64),
            name: command.name.trim().to_string(),
            holiday_start: None,
            holiday_end: None,
            streak_protection_days: 1,
            penalties_enabled: false,
            penalty_mode: PenaltyMode::Both,
            first_miss_pence: 10,
            first_miss_stars: 1,
            second_miss_pence: 20,
            second_miss_stars: 1,
            third_miss_pence: 50,
            third_miss_stars: 2,
            min_balance_pence: 0,
            min_balance_stars: 0,
            created_at: now,
            updated_at: now,
        };
        self.family_repository.store_family(&family).await?;
        info!("Created family {} ({})", family.name, family.id);
        Ok(family)
    }

    pub async fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        self.family_repository.get_family(family_id).await
    }

    pub async fn list_families(&self) -> Result<Vec<Family>> {
        self.family_repository.list_families().await
    }

    /// Replace the guardian-controlled settings wholesale.
    pub async fn update_settings(&self, command: UpdateFamilySettingsCommand) -> Result<Family> {
        if let (Some(start), Some(end)) = (command.holiday_start, command.holiday_end) {
            if start > end {
                return Err(anyhow!("Holiday window cannot end before it starts"));
            }
        }
        for amount in [
            command.first_miss_pence,
            command.first_miss_stars,
            command.second_miss_pence,
            command.second_miss_stars,
            command.third_miss_pence,
            command.third_miss_stars,
        ] {
            if amount < 0 {
                return Err(anyhow!("Penalty amounts cannot be negative"));
            }
        }
        if command.min_balance_pence < 0 || command.min_balance_stars < 0 {
            return Err(anyhow!("Balance floors cannot be negative"));
        }

        let mut family = self
            .family_repository
            .get_family(&command.family_id)
            .await?
            .ok_or_else(|| EngineError::not_found("family", &command.family_id))?;

        family.holiday_start = command.holiday_start;
        family.holiday_end = command.holiday_end;
        family.streak_protection_days = command.streak_protection_days;
        family.penalties_enabled = command.penalties_enabled;
        family.penalty_mode = command.penalty_mode;
        family.first_miss_pence = command.first_miss_pence;
        family.first_miss_stars = command.first_miss_stars;
        family.second_miss_pence = command.second_miss_pence;
        family.second_miss_stars = command.second_miss_stars;
        family.third_miss_pence = command.third_miss_pence;
        family.third_miss_stars = command.third_miss_stars;
        family.min_balance_pence = command.min_balance_pence;
        family.min_balance_stars = command.min_balance_stars;
        family.updated_at = Utc::now();

        self.family_repository.update_family(&family).await?;
        info!("Updated settings for family {}", family.id);
        Ok(family)
    }
}

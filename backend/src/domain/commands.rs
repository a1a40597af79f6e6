//! Domain-level command and result types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API; the REST layer maps the DTOs in the `shared`
//! crate to and from these internal types.

pub mod family {
    use chrono::NaiveDate;

    use crate::domain::models::family::PenaltyMode;

    /// Input for creating a family with default settings.
    #[derive(Debug, Clone)]
    pub struct CreateFamilyCommand {
        pub name: String,
    }

    /// Full replacement of a family's guardian-controlled settings.
    #[derive(Debug, Clone)]
    pub struct UpdateFamilySettingsCommand {
        pub family_id: String,
        pub holiday_start: Option<NaiveDate>,
        pub holiday_end: Option<NaiveDate>,
        pub streak_protection_days: u32,
        pub penalties_enabled: bool,
        pub penalty_mode: PenaltyMode,
        pub first_miss_pence: i64,
        pub first_miss_stars: i64,
        pub second_miss_pence: i64,
        pub second_miss_stars: i64,
        pub third_miss_pence: i64,
        pub third_miss_stars: i64,
        pub min_balance_pence: i64,
        pub min_balance_stars: i64,
    }
}

pub mod child {
    use chrono::NaiveDate;

    /// Input for adding a child to a family.
    #[derive(Debug, Clone)]
    pub struct CreateChildCommand {
        pub family_id: String,
        pub name: String,
    }

    /// Pause state and holiday window update for a child.
    #[derive(Debug, Clone)]
    pub struct UpdateChildCommand {
        pub child_id: String,
        pub paused: bool,
        pub holiday_start: Option<NaiveDate>,
        pub holiday_end: Option<NaiveDate>,
    }
}

pub mod chore {
    use crate::domain::models::chore::Frequency;

    /// Input for creating a chore.
    #[derive(Debug, Clone)]
    pub struct CreateChoreCommand {
        pub family_id: String,
        pub name: String,
        pub frequency: Frequency,
        pub base_reward_pence: i64,
        pub competitive: bool,
    }
}

pub mod completion {
    use crate::domain::models::completion::Completion;

    /// A child submitting an assignment as done.
    #[derive(Debug, Clone)]
    pub struct SubmitCompletionCommand {
        pub assignment_id: String,
        pub child_id: String,
        pub note: Option<String>,
    }

    /// What a guardian's approval credited.
    #[derive(Debug, Clone)]
    pub struct ApprovalOutcome {
        pub completion: Completion,
        pub credited_pence: i64,
        pub credited_stars: i64,
        /// Stars credited for a streak milestone crossed by this completion
        pub streak_bonus_stars: Option<i64>,
        /// Whether the rivalry bonus star was part of the credit
        pub rivalry_bonus_star: bool,
    }
}

pub mod bidding {
    /// A child offering to do a competitive chore for a reduced payout.
    #[derive(Debug, Clone)]
    pub struct PlaceBidCommand {
        pub assignment_id: String,
        pub child_id: String,
        pub amount_pence: i64,
    }
}

pub mod generation {
    use chrono::NaiveDate;

    /// One invocation of the generation cycle.
    #[derive(Debug, Clone)]
    pub struct GenerationCycleCommand {
        /// Restrict the cycle to a single family (manual reprocessing)
        pub family_id: Option<String>,
        /// The calendar day the cycle runs for
        pub as_of: NaiveDate,
        /// Evaluate everything, persist nothing
        pub dry_run: bool,
    }

    /// Outcome of one generation cycle.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct GenerationReport {
        pub chores_generated: u32,
        pub streaks_updated: u32,
        pub penalties_applied: u32,
        /// Bonus stars credited by the cycle itself; approval-time bonuses
        /// are reported on the approval outcome instead
        pub bonuses_awarded: u32,
        pub dry_run: bool,
        /// Per-family failures; a failing family never aborts the others
        pub errors: Vec<String>,
    }
}

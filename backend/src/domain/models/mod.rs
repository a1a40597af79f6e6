//! Domain models for the chore tracker.

pub mod assignment;
pub mod bid;
pub mod child;
pub mod chore;
pub mod completion;
pub mod family;
pub mod streak;
pub mod transaction;
pub mod wallet;

/// Short random hex suffix so same-millisecond creations never collide.
pub(crate) fn id_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

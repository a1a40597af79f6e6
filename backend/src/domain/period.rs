//! Period math for daily and weekly chores.
//!
//! A period is a single day for daily chores or an ISO week starting Monday
//! for weekly ones. Periods are identified by their start date and by a
//! stable string key used on assignments.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::models::chore::Frequency;

/// First day of the period containing `date`.
pub fn period_start(frequency: Frequency, date: NaiveDate) -> NaiveDate {
    match frequency {
        Frequency::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Frequency::Daily | Frequency::Once => date,
    }
}

/// Last day of the period starting at `start`.
pub fn period_end(frequency: Frequency, start: NaiveDate) -> NaiveDate {
    match frequency {
        Frequency::Weekly => start + Duration::days(6),
        Frequency::Daily | Frequency::Once => start,
    }
}

/// Stable key for the period containing `date`, e.g. "2026-08-05" or
/// "2026-W32". One-off chores share the single key "once".
pub fn period_key(frequency: Frequency, date: NaiveDate) -> String {
    match frequency {
        Frequency::Daily => date.format("%Y-%m-%d").to_string(),
        Frequency::Weekly => {
            let iso = date.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        Frequency::Once => "once".to_string(),
    }
}

/// Start of the period immediately before the one containing `date`.
/// One-off chores have no previous period.
pub fn previous_period_start(frequency: Frequency, date: NaiveDate) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => Some(period_start(frequency, date) - Duration::days(1)),
        Frequency::Weekly => Some(period_start(frequency, date) - Duration::days(7)),
        Frequency::Once => None,
    }
}

/// Whether `later` starts the period immediately after the one starting at
/// `earlier`, the consecutiveness test for streaks.
pub fn is_next_period(frequency: Frequency, earlier: NaiveDate, later: NaiveDate) -> bool {
    previous_period_start(frequency, later) == Some(earlier)
}

/// Weekly chores are (re)generated on the first day of the ISO week.
pub fn is_weekly_trigger(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

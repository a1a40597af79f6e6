//! Holiday exemption checks.
//!
//! Family-level and child-level holiday windows are consulted in one place;
//! everywhere a miss could break a streak or incur a penalty goes through
//! [`is_exempt`].

use chrono::NaiveDate;

use crate::domain::models::{child::Child, family::Family};

/// True when the family's or the child's holiday window covers any part of
/// the period `[period_start, period_end]`.
pub fn is_exempt(
    family: &Family,
    child: &Child,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> bool {
    window_overlaps(family.holiday_start, family.holiday_end, period_start, period_end)
        || window_overlaps(child.holiday_start, child.holiday_end, period_start, period_end)
}

fn window_overlaps(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => start <= period_end && end >= period_start,
        _ => false,
    }
}

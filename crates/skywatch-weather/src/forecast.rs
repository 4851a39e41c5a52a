//! Day/night period aggregation.
//!
//! The NOAA forecast endpoint returns a flat sequence of half-day periods
//! (day, night, day, night, ...). This folds them into daily entries.

use crate::types::{DailyForecast, RawPeriod};

/// Fold an ordered period sequence into daily forecasts.
///
/// Scans left to right: a daytime period pairs with an immediately-following
/// non-daytime period; a daytime period with no such follower becomes a
/// day-only entry; a nighttime period at the cursor (sequence starting
/// mid-night, or malformed input) is skipped without emitting anything.
///
/// Every emitted entry starts from a daytime period, input order is
/// preserved, and the output is never longer than the input.
pub fn combine_day_night(periods: &[RawPeriod]) -> Vec<DailyForecast> {
    let mut daily = Vec::with_capacity(periods.len() / 2 + 1);
    let mut cursor = 0;

    while cursor < periods.len() {
        let period = &periods[cursor];
        if !period.is_daytime {
            cursor += 1;
            continue;
        }

        let night = periods
            .get(cursor + 1)
            .filter(|next| !next.is_daytime)
            .cloned();
        cursor += if night.is_some() { 2 } else { 1 };

        daily.push(DailyForecast {
            day: period.clone(),
            night,
        });
    }

    daily
}

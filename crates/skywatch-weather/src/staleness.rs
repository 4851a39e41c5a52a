//! Staleness evaluation and relative-time display text.
//!
//! Read-only views over the coordinator's last-updated timestamp; safe to
//! recompute on every render or poll.

use chrono::{DateTime, Duration, Utc};

/// Data older than this should be flagged to the viewer (but still shown).
pub const STALE_AFTER_SECS: i64 = 900;

/// True iff the data is older than the default freshness threshold.
pub fn is_stale(last_updated: DateTime<Utc>) -> bool {
    is_stale_after(last_updated, STALE_AFTER_SECS as u64)
}

/// True iff the data is older than a configured threshold in seconds.
pub fn is_stale_after(last_updated: DateTime<Utc>, threshold_secs: u64) -> bool {
    is_stale_at(last_updated, Utc::now(), threshold_secs)
}

fn is_stale_at(last_updated: DateTime<Utc>, now: DateTime<Utc>, threshold_secs: u64) -> bool {
    now.signed_duration_since(last_updated) > Duration::seconds(threshold_secs as i64)
}

/// Short relative-time phrase for the "last updated" marker.
pub fn last_updated_text(last_updated: Option<DateTime<Utc>>) -> String {
    last_updated_text_at(last_updated, Utc::now())
}

fn last_updated_text_at(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last_updated) = last_updated else {
        return "No data".to_string();
    };

    let elapsed = now.signed_duration_since(last_updated);
    if elapsed < Duration::seconds(60) {
        return "Updated just now".to_string();
    }

    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return match minutes {
            1 => "Updated 1 minute ago".to_string(),
            n => format!("Updated {} minutes ago", n),
        };
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return match hours {
            1 => "Updated 1 hour ago".to_string(),
            n => format!("Updated {} hours ago", n),
        };
    }

    match elapsed.num_days() {
        1 => "Updated 1 day ago".to_string(),
        n => format!("Updated {} days ago", n),
    }
}

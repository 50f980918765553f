//! Formatting helpers shared across UI panels.

use chrono::{DateTime, Utc};

/// Format a timestamp as relative time (e.g., "30m ago").
///
/// Matches the sidebar display: minutes under an hour, hours under a day,
/// whole days beyond that.
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        format!("{}d ago", duration.num_days())
    }
}

/// Pluralize a count noun for summary lines ("1 bookmark", "3 bookmarks").
pub fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now - Duration::minutes(30)), "30m ago");
        assert_eq!(format_relative_time(now - Duration::hours(2)), "2h ago");
        assert_eq!(format_relative_time(now - Duration::days(3)), "3d ago");
    }

    #[test]
    fn test_relative_time_future() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now + Duration::minutes(5)), "just now");
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(1, "conversation"), "1 conversation");
        assert_eq!(count_noun(4, "bookmark"), "4 bookmarks");
    }
}

use chrono::{DateTime, Utc};

/// Describe the time elapsed between `start` and `now`, e.g. `"1 day 2 hours 5 seconds"`.
///
/// Days, hours and minutes are omitted when zero; seconds are always present.
pub fn since(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = now.signed_duration_since(start).num_seconds().max(0);

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days} {}", pluralize(days, "day")));
    }
    if hours > 0 {
        parts.push(format!("{hours} {}", pluralize(hours, "hour")));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} {}", pluralize(minutes, "minute")));
    }
    parts.push(format!("{seconds} {}", pluralize(seconds, "second")));
    parts.join(" ")
}

fn pluralize(n: i64, singular: &str) -> String {
    if n == 1 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}

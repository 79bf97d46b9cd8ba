use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Fractional days elapsed between two unix timestamps
pub fn elapsed_days(start: i64, end: i64) -> f64 {
    end.saturating_sub(start) as f64 / SECONDS_PER_DAY
}

pub fn seconds_to_days(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_DAY
}

/// Convert a period expressed in days into a Duration.
///
/// Returns None for zero, negative or non-finite periods, and for periods
/// too small to be represented as a non-zero Duration.
pub fn days_to_duration(days: f64) -> Option<Duration> {
    if !days.is_finite() || days <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(days * SECONDS_PER_DAY)
        .ok()
        .filter(|period| !period.is_zero())
}

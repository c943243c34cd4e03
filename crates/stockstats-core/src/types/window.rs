//! Lookback window definitions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StatsError, StatsResult};

/// Smallest lookback accepted by the quote service.
pub const MIN_WINDOW_MINUTES: u32 = 1;
/// Largest lookback accepted by the quote service (one day).
pub const MAX_WINDOW_MINUTES: u32 = 1440;
/// Lookback used when the caller does not pick one.
pub const DEFAULT_WINDOW_MINUTES: u32 = 30;

/// A closed time span `[end - minutes, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    minutes: u32,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window of `minutes` ending at `end`.
    pub fn new(minutes: u32, end: DateTime<Utc>) -> StatsResult<Self> {
        validate_minutes(minutes)?;
        Ok(Self { minutes, end })
    }

    /// Length of the window in minutes.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Inclusive start of the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.end - self.duration()
    }

    /// Inclusive end of the window.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Window length as a duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }

    /// Check whether a timestamp falls inside the window (endpoints included).
    #[inline]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start() && timestamp <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}m [{} .. {}]",
            self.minutes,
            self.start().format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Check that a lookback length is one the quote service accepts.
pub fn validate_minutes(minutes: u32) -> StatsResult<()> {
    if !(MIN_WINDOW_MINUTES..=MAX_WINDOW_MINUTES).contains(&minutes) {
        return Err(StatsError::InvalidRequest(format!(
            "minutes must be between {} and {}, got {}",
            MIN_WINDOW_MINUTES, MAX_WINDOW_MINUTES, minutes
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_bounds_are_inclusive() {
        let end = Utc.with_ymd_and_hms(2025, 6, 21, 10, 30, 0).unwrap();
        let window = TimeWindow::new(30, end).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2025, 6, 21, 10, 0, 0).unwrap());
        assert!(window.contains(window.start()));
        assert!(window.contains(end));
        assert!(!window.contains(end + Duration::seconds(1)));
        assert!(!window.contains(window.start() - Duration::seconds(1)));
    }

    #[test]
    fn test_minutes_range() {
        let end = Utc::now();
        assert!(TimeWindow::new(0, end).is_err());
        assert!(TimeWindow::new(1, end).is_ok());
        assert!(TimeWindow::new(1440, end).is_ok());
        assert!(matches!(
            TimeWindow::new(1441, end),
            Err(StatsError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_window_display() {
        let end = Utc.with_ymd_and_hms(2025, 6, 21, 10, 30, 0).unwrap();
        let window = TimeWindow::new(15, end).unwrap();
        assert_eq!(
            window.to_string(),
            "15m [2025-06-21 10:15:00 .. 2025-06-21 10:30:00]"
        );
    }
}

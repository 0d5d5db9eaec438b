//! Usage analytics: lifetime and same-day completion counters.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Aggregated session counters.
///
/// The lifetime counters only ever grow. The today bucket is zeroed by
/// the day-rollover check, which compares against `last_reset_date` and
/// is a no-op within the same calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analytics {
    /// Sessions completed since the first launch.
    pub total_sessions: u64,
    /// Seconds of completed focus time since the first launch.
    pub total_focus_secs: u64,
    /// Sessions completed today.
    pub today_sessions: u32,
    /// Seconds of completed focus time today.
    pub today_focus_secs: u64,
    /// The local calendar date the today bucket belongs to.
    pub last_reset_date: NaiveDate,
}

impl Default for Analytics {
    fn default() -> Self {
        Self {
            total_sessions: 0,
            total_focus_secs: 0,
            today_sessions: 0,
            today_focus_secs: 0,
            last_reset_date: Local::now().date_naive(),
        }
    }
}

impl Analytics {
    #[cfg(test)]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            last_reset_date: date,
            ..Self::default()
        }
    }

    /// Credits one completed session of the given length to both the
    /// lifetime and today counters. Completions are never undone.
    pub fn record_completion(&mut self, duration_secs: u32) {
        self.total_sessions += 1;
        self.total_focus_secs += u64::from(duration_secs);
        self.today_sessions += 1;
        self.today_focus_secs += u64::from(duration_secs);
    }

    /// Zeroes the today bucket when the calendar day has advanced.
    /// Returns true if a reset happened. Safe to call on every tick.
    pub fn check_day_rollover(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.today_sessions = 0;
        self.today_focus_secs = 0;
        self.last_reset_date = today;
        true
    }

    /// Average completed session length in seconds, zero before the
    /// first completion.
    pub fn avg_session_secs(&self) -> u64 {
        if self.total_sessions == 0 {
            0
        } else {
            self.total_focus_secs / self.total_sessions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_is_zeroed_and_stamped_today() {
        let analytics = Analytics::default();
        assert_eq!(analytics.total_sessions, 0);
        assert_eq!(analytics.total_focus_secs, 0);
        assert_eq!(analytics.today_sessions, 0);
        assert_eq!(analytics.today_focus_secs, 0);
        assert_eq!(analytics.last_reset_date, Local::now().date_naive());
    }

    #[test]
    fn test_record_completion_increments_both_buckets() {
        let mut analytics = Analytics::new(date(2024, 1, 15));

        for _ in 0..3 {
            analytics.record_completion(1500);
        }

        assert_eq!(analytics.total_sessions, 3);
        assert_eq!(analytics.total_focus_secs, 4500);
        assert_eq!(analytics.today_sessions, 3);
        assert_eq!(analytics.today_focus_secs, 4500);
    }

    #[test]
    fn test_rollover_zeroes_today_only() {
        let mut analytics = Analytics::new(date(2024, 1, 15));
        analytics.record_completion(1500);
        analytics.record_completion(300);

        let reset = analytics.check_day_rollover(date(2024, 1, 16));
        assert!(reset);
        assert_eq!(analytics.today_sessions, 0);
        assert_eq!(analytics.today_focus_secs, 0);
        assert_eq!(analytics.total_sessions, 2);
        assert_eq!(analytics.total_focus_secs, 1800);
        assert_eq!(analytics.last_reset_date, date(2024, 1, 16));
    }

    #[test]
    fn test_rollover_is_idempotent_within_a_day() {
        let mut analytics = Analytics::new(date(2024, 1, 15));
        analytics.record_completion(1500);

        assert!(analytics.check_day_rollover(date(2024, 1, 16)));
        let after_first = analytics.clone();

        assert!(!analytics.check_day_rollover(date(2024, 1, 16)));
        assert_eq!(analytics, after_first);
    }

    #[test]
    fn test_same_day_rollover_is_a_noop() {
        let mut analytics = Analytics::new(date(2024, 1, 15));
        analytics.record_completion(600);

        assert!(!analytics.check_day_rollover(date(2024, 1, 15)));
        assert_eq!(analytics.today_sessions, 1);
        assert_eq!(analytics.today_focus_secs, 600);
    }

    #[test]
    fn test_today_never_exceeds_lifetime() {
        let mut analytics = Analytics::new(date(2024, 1, 15));
        analytics.record_completion(1500);
        analytics.check_day_rollover(date(2024, 1, 16));
        analytics.record_completion(300);

        assert!(u64::from(analytics.today_sessions) <= analytics.total_sessions);
        assert!(analytics.today_focus_secs <= analytics.total_focus_secs);
    }

    #[test]
    fn test_avg_session_secs() {
        let mut analytics = Analytics::new(date(2024, 1, 15));
        assert_eq!(analytics.avg_session_secs(), 0);

        analytics.record_completion(1500);
        analytics.record_completion(300);
        assert_eq!(analytics.avg_session_secs(), 900);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut analytics = Analytics::new(date(2024, 1, 15));
        analytics.record_completion(1500);

        let json = serde_json::to_string(&analytics).unwrap();
        let loaded: Analytics = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, analytics);
    }
}

//! Login streak over the trailing week.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest window the streak looks back over, in days.
pub const STREAK_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreakColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginStreak {
    /// Distinct login days inside the window
    pub active_days: u32,
    /// Window length: days since first login (inclusive), capped at 7
    pub denominator: u32,
    pub percent: f64,
    pub color: StreakColor,
}

/// Compute the login streak for `today`.
///
/// The window is the last `min(days since first login + 1, 7)` days ending
/// today. An empty history counts as a single login today.
pub fn login_streak(login_dates: &[NaiveDate], today: NaiveDate) -> LoginStreak {
    let dates: BTreeSet<NaiveDate> = if login_dates.is_empty() {
        BTreeSet::from([today])
    } else {
        login_dates.iter().copied().collect()
    };

    let first = dates.first().copied().unwrap_or(today);
    let days_since_first = (today - first).num_days() + 1;
    let denominator = days_since_first.clamp(0, STREAK_WINDOW_DAYS);

    let window_start = today - chrono::Duration::days(denominator - 1);
    let active_days = if denominator > 0 {
        dates.range(window_start..=today).count() as u32
    } else {
        0
    };

    let percent = if denominator > 0 {
        active_days as f64 / denominator as f64 * 100.0
    } else {
        100.0
    };

    let color = if percent >= 80.0 {
        StreakColor::Green
    } else if percent > 50.0 {
        StreakColor::Yellow
    } else {
        StreakColor::Red
    };

    LoginStreak {
        active_days,
        denominator: denominator as u32,
        percent,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_day_is_full_streak() {
        let today = date(2024, 6, 10);
        let streak = login_streak(&[], today);

        assert_eq!(streak.active_days, 1);
        assert_eq!(streak.denominator, 1);
        assert_eq!(streak.percent, 100.0);
        assert_eq!(streak.color, StreakColor::Green);
    }

    #[test]
    fn test_window_capped_at_seven_days() {
        let today = date(2024, 6, 30);
        let dates = vec![
            date(2024, 6, 1),
            date(2024, 6, 20),
            date(2024, 6, 25),
            date(2024, 6, 27),
            date(2024, 6, 28),
            date(2024, 6, 30),
        ];

        let streak = login_streak(&dates, today);
        assert_eq!(streak.denominator, 7);
        // 24th..30th window: 25, 27, 28, 30
        assert_eq!(streak.active_days, 4);
        assert_eq!(streak.color, StreakColor::Yellow);
    }

    #[test]
    fn test_short_history_uses_days_since_first() {
        let today = date(2024, 6, 3);
        let dates = vec![date(2024, 6, 1), date(2024, 6, 1)];

        let streak = login_streak(&dates, today);
        assert_eq!(streak.denominator, 3);
        assert_eq!(streak.active_days, 1);
        assert_eq!(streak.color, StreakColor::Red);
    }
}

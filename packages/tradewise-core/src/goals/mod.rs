//! Daily goal projection, goal tracking and login streak.

mod projection;
mod streak;
mod tracker;

pub use projection::{
    check_projection_days, compound_balance, project, projection_end_date, BalanceOverrides,
    GoalRow, Horizon, MAX_PROJECTION_DAYS,
};
pub use streak::{login_streak, LoginStreak, StreakColor, STREAK_WINDOW_DAYS};
pub use tracker::{
    DailyGoal, GoalSettings, GoalSettingsUpdate, GoalStatus, GoalTracker, GOALS_FILE_ENV,
};

//! Goal tracker: projection settings, balance overrides and daily results.

use super::projection::{project, projection_end_date, BalanceOverrides, GoalRow, Horizon};
use crate::journal::{daily_pnl, Trade};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the goal tracker file location.
pub const GOALS_FILE_ENV: &str = "TRADEWISE_GOALS_FILE";

/// Projection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalSettings {
    pub starting_balance: f64,
    pub daily_goal_percent: f64,
    pub horizon: Horizon,
    /// Locked the first time settings are saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_start_date: Option<NaiveDate>,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            starting_balance: 1000.0,
            daily_goal_percent: 1.0,
            horizon: Horizon::Days30,
            projection_start_date: None,
        }
    }
}

/// Partial settings change. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalSettingsUpdate {
    pub starting_balance: Option<f64>,
    pub daily_goal_percent: Option<f64>,
    pub horizon: Option<Horizon>,
    pub projection_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Pending,
    Beat,
    Missed,
}

/// A day's goal together with what was actually achieved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyGoal {
    #[serde(default)]
    pub user_id: String,
    pub date: NaiveDate,
    pub starting_balance: f64,
    pub expected_ending_balance: f64,
    pub daily_goal_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beat_goal_by: Option<f64>,
    pub status: GoalStatus,
}

/// Persisted state of the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct GoalBook {
    user_id: String,
    settings: GoalSettings,
    daily_goals: Vec<DailyGoal>,
    overrides: BalanceOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Goal tracker that persists to JSON.
///
/// The projection itself is recomputed from settings and overrides on
/// every call; only user inputs and recorded results are stored.
#[derive(Debug)]
pub struct GoalTracker {
    /// Path to the tracker JSON file (empty for in-memory)
    path: PathBuf,
    book: GoalBook,
    /// Set when the file exists but could not be read; blocks `save`
    load_failed: bool,
}

impl GoalTracker {
    /// Open the tracker at the default path.
    ///
    /// Default path: `~/.tradewise/goals.json`, overridable with
    /// `TRADEWISE_GOALS_FILE`.
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Open a tracker stored at `path`.
    pub fn with_path(path: PathBuf) -> Self {
        let (book, load_failed) = match Self::load_from_path(&path) {
            Ok(book) => (book, false),
            Err(e) => {
                tracing::warn!("Could not load goals from {}: {}", path.display(), e);
                (GoalBook::default(), true)
            }
        };
        Self {
            path,
            book,
            load_failed,
        }
    }

    /// Create an in-memory tracker (no persistence).
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            book: GoalBook::default(),
            load_failed: false,
        }
    }

    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(GOALS_FILE_ENV) {
            return PathBuf::from(path);
        }

        crate::config::data_dir().join("goals.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_path(path: &Path) -> Result<GoalBook> {
        if !path.exists() {
            return Ok(GoalBook::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Whether the tracker file exists but could not be read.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Save to disk. Fails without writing while the file is unreadable.
    pub fn save(&mut self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        if self.load_failed {
            return Err(Error::InvalidOperation(format!(
                "Goal tracker at {} could not be read, refusing to overwrite it",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        self.book.updated_at = Some(Utc::now());
        fs::write(&self.path, serde_json::to_string_pretty(&self.book)?)?;
        tracing::debug!("Saved goal tracker to {}", self.path.display());
        Ok(())
    }

    /// Save, logging instead of returning a failure.
    pub fn persist(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist goals to {}: {}", self.path.display(), e);
                false
            }
        }
    }

    pub fn reload(&mut self) -> Result<()> {
        self.book = Self::load_from_path(&self.path)?;
        self.load_failed = false;
        Ok(())
    }

    pub fn user_id(&self) -> &str {
        &self.book.user_id
    }

    /// Set the user recorded on new daily results.
    pub fn set_user(&mut self, user_id: impl Into<String>) {
        self.book.user_id = user_id.into();
    }

    pub fn settings(&self) -> &GoalSettings {
        &self.book.settings
    }

    /// Merge a settings change.
    ///
    /// The projection start date is locked the first time settings are
    /// saved: an existing start date always wins, then the one in the
    /// update, then `today`.
    pub fn update_settings(
        &mut self,
        update: GoalSettingsUpdate,
        today: NaiveDate,
    ) -> Result<&GoalSettings> {
        if let Some(balance) = update.starting_balance {
            if !balance.is_finite() || balance <= 0.0 {
                return Err(Error::InvalidInput(
                    "Starting balance must be a positive number".to_string(),
                ));
            }
        }
        if let Some(percent) = update.daily_goal_percent {
            if !percent.is_finite() {
                return Err(Error::InvalidInput(
                    "Daily goal percent must be a number".to_string(),
                ));
            }
        }

        let settings = &mut self.book.settings;
        let start = settings
            .projection_start_date
            .or(update.projection_start_date)
            .unwrap_or(today);

        if let Some(balance) = update.starting_balance {
            settings.starting_balance = balance;
        }
        if let Some(percent) = update.daily_goal_percent {
            settings.daily_goal_percent = percent;
        }
        if let Some(horizon) = update.horizon {
            settings.horizon = horizon;
        }
        settings.projection_start_date = Some(start);

        Ok(settings)
    }

    /// First day of the projection: the locked start date, or `today`.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        self.book.settings.projection_start_date.unwrap_or(today)
    }

    /// The projection table for the current settings and overrides.
    pub fn rows(&self, today: NaiveDate) -> Vec<GoalRow> {
        let settings = &self.book.settings;
        project(
            settings.starting_balance,
            settings.daily_goal_percent,
            settings.horizon.days(),
            &self.book.overrides,
            self.start_date(today),
        )
    }

    pub fn projection_end_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        projection_end_date(&self.rows(today))
    }

    /// The projection row for `date`, if it falls inside the projection.
    pub fn row_for(&self, date: NaiveDate, today: NaiveDate) -> Option<GoalRow> {
        self.rows(today).into_iter().find(|row| row.date == date)
    }

    pub fn overrides(&self) -> &BalanceOverrides {
        &self.book.overrides
    }

    /// Replace the starting balance of `date` and re-anchor compounding there.
    pub fn set_start_balance_override(&mut self, date: NaiveDate, balance: f64) -> Result<()> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(Error::InvalidInput(
                "Override balance must be a non-negative number".to_string(),
            ));
        }
        self.book.overrides.insert(date, balance);
        Ok(())
    }

    pub fn remove_override(&mut self, date: NaiveDate) -> Option<f64> {
        self.book.overrides.remove(&date)
    }

    pub fn daily_goals(&self) -> &[DailyGoal] {
        &self.book.daily_goals
    }

    pub fn daily_goal(&self, date: NaiveDate) -> Option<&DailyGoal> {
        self.book.daily_goals.iter().find(|g| g.date == date)
    }

    /// Record the realized P&L of a day against its goal.
    ///
    /// Returns `None` when `date` is outside the projection.
    pub fn record_daily_result(
        &mut self,
        date: NaiveDate,
        actual_pnl: f64,
        today: NaiveDate,
    ) -> Option<DailyGoal> {
        let row = self.row_for(date, today)?;

        let status = if actual_pnl >= row.daily_goal_amount {
            GoalStatus::Beat
        } else {
            GoalStatus::Missed
        };

        let goal = DailyGoal {
            user_id: self.book.user_id.clone(),
            date,
            starting_balance: row.starting_balance,
            expected_ending_balance: row.expected_ending_balance,
            daily_goal_amount: row.daily_goal_amount,
            actual_pnl: Some(actual_pnl),
            beat_goal_by: Some(actual_pnl - row.daily_goal_amount),
            status,
        };

        match self.book.daily_goals.iter_mut().find(|g| g.date == date) {
            Some(existing) => *existing = goal.clone(),
            None => self.book.daily_goals.push(goal.clone()),
        }

        Some(goal)
    }

    /// Record every day of realized journal P&L. Returns the days recorded.
    pub fn sync_journal(&mut self, trades: &[Trade], today: NaiveDate) -> Vec<DailyGoal> {
        daily_pnl(trades)
            .into_iter()
            .filter_map(|(date, pnl)| self.record_daily_result(date, pnl, today))
            .collect()
    }

    /// Progress towards today's goal in percent, capped at 100.
    pub fn progress(&self, today_pnl: f64, today: NaiveDate) -> f64 {
        match self.row_for(today, today) {
            Some(row) if row.daily_goal_amount > 0.0 => {
                (today_pnl / row.daily_goal_amount * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }

    /// Start over: unlock the start date and drop results and overrides.
    pub fn clear_projection(&mut self) {
        self.book.settings.projection_start_date = None;
        self.book.daily_goals.clear();
        self.book.overrides.clear();
    }
}

impl Default for GoalTracker {
    fn default() -> Self {
        Self::new()
    }
}

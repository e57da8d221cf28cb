//! Day-by-day compounding goal projection.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manual starting-balance corrections keyed by calendar date.
///
/// Serializes as a JSON object with `YYYY-MM-DD` keys.
pub type BalanceOverrides = BTreeMap<NaiveDate, f64>;

/// One day of the projection table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalRow {
    /// 1-based day index
    pub day: u32,
    pub date: NaiveDate,
    pub starting_balance: f64,
    pub daily_goal_amount: f64,
    pub expected_ending_balance: f64,
}

/// Longest projection accepted from user input, about ten years.
pub const MAX_PROJECTION_DAYS: u32 = 3650;

/// Supported projection lengths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum Horizon {
    #[default]
    Days30,
    Days60,
    Days90,
}

impl Horizon {
    pub fn days(self) -> u32 {
        match self {
            Horizon::Days30 => 30,
            Horizon::Days60 => 60,
            Horizon::Days90 => 90,
        }
    }
}

impl TryFrom<u32> for Horizon {
    type Error = Error;

    fn try_from(days: u32) -> Result<Self> {
        match days {
            30 => Ok(Horizon::Days30),
            60 => Ok(Horizon::Days60),
            90 => Ok(Horizon::Days90),
            other => Err(Error::InvalidInput(format!(
                "horizon must be 30, 60 or 90 days, got {other}"
            ))),
        }
    }
}

impl From<Horizon> for u32 {
    fn from(horizon: Horizon) -> Self {
        horizon.days()
    }
}

/// Validate a free-form projection length: 1 to `MAX_PROJECTION_DAYS` days.
pub fn check_projection_days(days: u32) -> Result<u32> {
    if (1..=MAX_PROJECTION_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(Error::InvalidInput(format!(
            "projection length must be 1 to {MAX_PROJECTION_DAYS} days, got {days}"
        )))
    }
}

/// Build the projection table.
///
/// Produces exactly `horizon_days` rows starting at `start_date`. Each day
/// starts from the previous day's expected ending balance, unless an
/// override exists for that date, in which case the override replaces the
/// running balance and compounding continues from it.
///
/// ```rust
/// use chrono::NaiveDate;
/// use tradewise_core::goals::{project, BalanceOverrides};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let rows = project(1000.0, 2.0, 3, &BalanceOverrides::new(), start);
///
/// assert_eq!(rows.len(), 3);
/// assert_eq!(rows[0].daily_goal_amount, 20.0);
/// assert_eq!(rows[1].starting_balance, 1020.0);
/// ```
pub fn project(
    starting_balance: f64,
    daily_goal_percent: f64,
    horizon_days: u32,
    overrides: &BalanceOverrides,
    start_date: NaiveDate,
) -> Vec<GoalRow> {
    let mut rows = Vec::with_capacity(horizon_days.min(MAX_PROJECTION_DAYS) as usize);
    let mut balance = starting_balance;

    for (day, date) in (1..=horizon_days).zip(start_date.iter_days()) {
        if let Some(&override_balance) = overrides.get(&date) {
            balance = override_balance;
        }

        let daily_goal_amount = balance * (daily_goal_percent / 100.0);
        let expected_ending_balance = balance + daily_goal_amount;

        rows.push(GoalRow {
            day,
            date,
            starting_balance: balance,
            daily_goal_amount,
            expected_ending_balance,
        });

        balance = expected_ending_balance;
    }

    rows
}

/// Balance after `days` steps of simple daily compounding.
pub fn compound_balance(starting_balance: f64, daily_goal_percent: f64, days: u32) -> f64 {
    let factor = 1.0 + daily_goal_percent / 100.0;
    starting_balance * factor.powf(f64::from(days))
}

/// Date of the last row, if any.
pub fn projection_end_date(rows: &[GoalRow]) -> Option<NaiveDate> {
    rows.last().map(|row| row.date)
}

//! Position sizing, risk and reward for a single planned trade.

use crate::format::parse_number;
use crate::types::{Direction, RiskMode, RiskReward};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Risk percentage above which a result is flagged as high risk.
pub const HIGH_RISK_PERCENT: f64 = 2.0;

/// Risk percentage used when the percent-mode risk value is missing or zero.
pub const DEFAULT_RISK_PERCENT: f64 = 1.0;

/// Typed calculator input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculatorInput {
    /// Account balance in account currency
    pub account_balance: f64,
    /// How `risk_value` is interpreted
    pub risk_mode: RiskMode,
    /// Percent of balance, or margin amount
    pub risk_value: f64,
    /// Leverage multiplier, floored at 1
    pub leverage: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    /// Take-profit price; when absent the preset decides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    pub direction: Direction,
    /// Preset used only when `take_profit` is absent
    #[serde(default)]
    pub risk_reward: RiskReward,
}

impl CalculatorInput {
    /// Create an input with 1% risk, no leverage, no take-profit and the 1:3 preset.
    pub fn new(account_balance: f64, entry_price: f64, stop_loss: f64, direction: Direction) -> Self {
        Self {
            account_balance,
            risk_mode: RiskMode::Percent,
            risk_value: DEFAULT_RISK_PERCENT,
            leverage: 1.0,
            entry_price,
            stop_loss,
            take_profit: None,
            direction,
            risk_reward: RiskReward::default(),
        }
    }

    pub fn with_risk(mut self, mode: RiskMode, value: f64) -> Self {
        self.risk_mode = mode;
        self.risk_value = value;
        self
    }

    pub fn with_leverage(mut self, leverage: f64) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_take_profit(mut self, take_profit: f64) -> Self {
        self.take_profit = Some(take_profit);
        self
    }

    pub fn with_risk_reward(mut self, risk_reward: RiskReward) -> Self {
        self.risk_reward = risk_reward;
        self
    }

    /// Leverage actually applied: at least 1, and 1 for non-finite input.
    pub fn effective_leverage(&self) -> f64 {
        if self.leverage.is_finite() {
            self.leverage.max(1.0)
        } else {
            1.0
        }
    }
}

/// Calculator input as raw form strings.
///
/// Mirrors what a form holds before validation: every numeric field is
/// free text, possibly with thousands separators.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalculatorForm {
    pub account_balance: String,
    pub risk_mode: RiskMode,
    pub risk_value: String,
    pub leverage: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub direction: Direction,
    pub risk_reward: String,
}

impl CalculatorForm {
    /// Parse the form into a typed input.
    ///
    /// Missing balance, entry or stop is an error. A missing or zero percent
    /// risk value falls back to 1%, missing leverage to 1, an unparseable
    /// preset to 1:3, and a blank take-profit to none.
    pub fn parse(&self) -> Result<CalculatorInput> {
        let required = |field: &str, raw: &str| {
            parse_number(raw)
                .ok_or_else(|| Error::InvalidInput(format!("{field} is missing or not a number")))
        };

        let account_balance = required("account balance", &self.account_balance)?;
        let entry_price = required("entry price", &self.entry_price)?;
        let stop_loss = required("stop loss", &self.stop_loss)?;

        let risk_value = match self.risk_mode {
            RiskMode::Percent => parse_number(&self.risk_value)
                .filter(|v| *v != 0.0)
                .unwrap_or(DEFAULT_RISK_PERCENT),
            RiskMode::Fixed => parse_number(&self.risk_value).unwrap_or(0.0),
        };

        Ok(CalculatorInput {
            account_balance,
            risk_mode: self.risk_mode,
            risk_value,
            leverage: parse_number(&self.leverage).unwrap_or(1.0),
            entry_price,
            stop_loss,
            take_profit: parse_number(&self.take_profit),
            direction: self.direction,
            risk_reward: self.risk_reward.parse().unwrap_or_default(),
        })
    }
}

/// Fully derived output of a calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculatorResult {
    /// Margin committed to the trade
    pub trade_size: f64,
    /// Margin times leverage (notional exposure)
    pub effective_position: f64,
    pub potential_profit: f64,
    pub potential_loss: f64,
    /// Margin as a percentage of the account balance
    pub risk_percent: f64,
    pub entry_price: f64,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
    /// |entry - stop|
    pub risk_distance: f64,
    /// |take_profit - entry|
    pub reward_distance: f64,
    /// reward_distance / risk_distance
    pub reward_multiple: f64,
    /// Realized ratio (`1:x.xx`), or the preset in normalized `risk:reward` form
    pub actual_risk_reward: String,
    pub new_balance_if_tp: f64,
    pub new_balance_if_sl: f64,
}

impl CalculatorResult {
    /// Whether the risk exceeds `threshold` percent of the account.
    pub fn exceeds_risk(&self, threshold: f64) -> bool {
        self.risk_percent > threshold
    }

    /// Whether the risk exceeds the default 2% threshold.
    pub fn is_high_risk(&self) -> bool {
        self.exceeds_risk(HIGH_RISK_PERCENT)
    }
}

/// Size a trade. Returns `None` for invalid input.
///
/// ```rust
/// use tradewise_core::calculator::{calculate, CalculatorInput};
/// use tradewise_core::Direction;
///
/// let input = CalculatorInput::new(10_000.0, 100.0, 95.0, Direction::Long);
/// let result = calculate(&input).unwrap();
///
/// assert_eq!(result.trade_size, 100.0);
/// assert_eq!(result.take_profit_price, 115.0);
/// assert_eq!(result.actual_risk_reward, "1:3");
/// ```
pub fn calculate(input: &CalculatorInput) -> Option<CalculatorResult> {
    match try_calculate(input) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::debug!("Rejected calculator input: {}", e);
            None
        }
    }
}

/// Parse a form and size the trade. Returns `None` for invalid input.
pub fn calculate_form(form: &CalculatorForm) -> Option<CalculatorResult> {
    form.parse().ok().and_then(|input| calculate(&input))
}

/// Size a trade, reporting why the input was rejected.
pub fn try_calculate(input: &CalculatorInput) -> Result<CalculatorResult> {
    let balance = positive("account balance", input.account_balance)?;
    let entry = positive("entry price", input.entry_price)?;
    let stop = positive("stop loss", input.stop_loss)?;

    if entry == stop {
        return Err(Error::InvalidInput(
            "Entry price and stop loss must differ".to_string(),
        ));
    }

    let (trade_size, risk_percent) = match input.risk_mode {
        RiskMode::Percent => {
            let percent = if input.risk_value.is_finite() && input.risk_value != 0.0 {
                input.risk_value
            } else {
                DEFAULT_RISK_PERCENT
            };
            (balance * (percent / 100.0), percent)
        }
        RiskMode::Fixed => {
            let margin = positive("risk amount", input.risk_value)?;
            (margin, (margin / balance) * 100.0)
        }
    };

    let effective_position = trade_size * input.effective_leverage();
    let risk_distance = (entry - stop).abs();

    let manual_tp = input
        .take_profit
        .filter(|tp| tp.is_finite() && *tp > 0.0 && *tp != entry);

    let (take_profit_price, reward_distance, actual_risk_reward) = match manual_tp {
        Some(tp) => {
            let reward_distance = (tp - entry).abs();
            let ratio = reward_distance / risk_distance;
            (tp, reward_distance, format!("1:{ratio:.2}"))
        }
        None => {
            let reward_distance = risk_distance * input.risk_reward.multiplier();
            let tp = entry + input.direction.sign() * reward_distance;
            (tp, reward_distance, input.risk_reward.to_string())
        }
    };

    let potential_profit = effective_position * (reward_distance / entry);
    let potential_loss = effective_position * (risk_distance / entry);

    Ok(CalculatorResult {
        trade_size,
        effective_position,
        potential_profit,
        potential_loss,
        risk_percent,
        entry_price: entry,
        take_profit_price,
        stop_loss_price: stop,
        risk_distance,
        reward_distance,
        reward_multiple: reward_distance / risk_distance,
        actual_risk_reward,
        new_balance_if_tp: balance + potential_profit,
        new_balance_if_sl: balance - potential_loss,
    })
}

fn positive(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{field} must be a positive number"
        )))
    }
}

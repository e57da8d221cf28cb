//! Journal trade record.

use crate::calculator::{evaluate, CalculatorInput, CalculatorResult, TradeResult};
use crate::types::{AssetCategory, Direction, Timeframe, TradeStatus, WinLoss};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trade as stored in the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub direction: Direction,
    /// Risk:reward as displayed when the trade was planned
    pub risk_reward: String,
    /// Margin committed, before leverage
    pub position_size: f64,
    /// Notional exposure (margin times leverage)
    pub value_traded: f64,
    /// Instrument symbol
    #[serde(default)]
    pub token: String,
    pub asset_category: AssetCategory,
    pub timeframe: Timeframe,
    pub leverage: f64,
    /// Free-text rationale
    #[serde(default)]
    pub cause: String,
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_loss: Option<WinLoss>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a trade is added to the journal.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewTrade {
    #[serde(default)]
    pub user_id: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub direction: Direction,
    #[serde(default)]
    pub risk_reward: String,
    pub position_size: f64,
    pub value_traded: f64,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub asset_category: AssetCategory,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub leverage: f64,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub status: TradeStatus,
}

impl NewTrade {
    /// Build a journal entry from a calculator result.
    ///
    /// The margin becomes the position size and the effective position the
    /// value traded, so the trade can later be evaluated with its leverage.
    pub fn from_calculation(
        input: &CalculatorInput,
        result: &CalculatorResult,
        status: TradeStatus,
    ) -> Self {
        Self {
            entry_price: result.entry_price,
            stop_loss: result.stop_loss_price,
            take_profit: result.take_profit_price,
            direction: input.direction,
            risk_reward: result.actual_risk_reward.clone(),
            position_size: result.trade_size,
            value_traded: result.effective_position,
            leverage: input.effective_leverage(),
            status,
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into().to_uppercase();
        self
    }
}

/// Partial update applied from the trade detail view.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TradeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TradeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Setting a close price re-evaluates the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_price: Option<f64>,
}

impl Trade {
    /// Materialize a new trade with a fresh id.
    pub fn new(new: NewTrade, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            entry_price: new.entry_price,
            stop_loss: new.stop_loss,
            take_profit: new.take_profit,
            direction: new.direction,
            risk_reward: new.risk_reward,
            position_size: new.position_size,
            value_traded: new.value_traded,
            token: new.token,
            asset_category: new.asset_category,
            timeframe: new.timeframe,
            leverage: new.leverage,
            cause: new.cause,
            status: new.status,
            close_price: None,
            closed_at: None,
            profit_loss: None,
            profit_loss_percent: None,
            win_loss: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Evaluate what closing at `close_price` would realize.
    pub fn evaluate_close(&self, close_price: f64) -> Option<TradeResult> {
        evaluate(
            self.direction,
            self.entry_price,
            close_price,
            self.position_size,
            self.leverage,
        )
    }

    /// Close the trade and merge the evaluated result into the record.
    pub fn close(
        &mut self,
        close_price: f64,
        status: TradeStatus,
        closed_on: NaiveDate,
    ) -> Result<TradeResult> {
        if !status.is_closed() {
            return Err(Error::InvalidOperation(format!(
                "Cannot close trade {} with status {:?}",
                self.id, status
            )));
        }

        let result = self.record_close_price(close_price)?;
        self.status = status;
        self.closed_at = Some(closed_on);
        Ok(result)
    }

    /// Apply a partial update.
    ///
    /// Only trades that end up in a closing status carry a result: a close
    /// price on a closed trade re-evaluates it, a close price on a planned
    /// or open trade is stored without P&L, and moving a trade back out of
    /// a closing status clears its result. A closing status without a
    /// recorded close date stamps `today`.
    pub fn apply(&mut self, update: TradeUpdate, today: NaiveDate) -> Result<()> {
        let status = update.status.unwrap_or(self.status);

        match update.close_price.or(self.close_price) {
            Some(close_price) if status.is_closed() => {
                if update.close_price.is_some() || self.profit_loss.is_none() {
                    self.record_close_price(close_price)?;
                }
            }
            Some(close_price) => {
                self.evaluate_close(close_price)
                    .ok_or_else(|| self.unevaluable(close_price))?;
                self.close_price = Some(close_price);
                self.closed_at = None;
                self.clear_result();
            }
            None => {}
        }
        self.status = status;
        if let Some(cause) = update.cause {
            self.cause = cause;
        }
        if let Some(token) = update.token {
            self.token = token.to_uppercase();
        }

        if self.status.is_closed() && self.closed_at.is_none() {
            self.closed_at = Some(today);
        }

        Ok(())
    }

    /// Date the trade counts towards in daily P&L.
    pub fn result_date(&self) -> NaiveDate {
        self.closed_at
            .unwrap_or_else(|| self.updated_at.date_naive())
    }

    fn unevaluable(&self, close_price: f64) -> Error {
        Error::InvalidInput(format!(
            "Cannot evaluate trade {} at close price {}",
            self.id, close_price
        ))
    }

    fn clear_result(&mut self) {
        self.profit_loss = None;
        self.profit_loss_percent = None;
        self.win_loss = None;
    }

    fn record_close_price(&mut self, close_price: f64) -> Result<TradeResult> {
        let result = self
            .evaluate_close(close_price)
            .ok_or_else(|| self.unevaluable(close_price))?;

        self.close_price = Some(close_price);
        self.profit_loss = Some(result.profit_loss);
        self.profit_loss_percent = Some(result.profit_loss_percent);
        self.win_loss = Some(result.win_loss);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate;
    use approx::assert_relative_eq;

    fn open_long() -> Trade {
        Trade::new(
            NewTrade {
                entry_price: 100.0,
                stop_loss: 95.0,
                take_profit: 115.0,
                position_size: 500.0,
                value_traded: 1000.0,
                leverage: 2.0,
                status: TradeStatus::Open,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_new_trade_has_unique_id() {
        let a = open_long();
        let b = open_long();
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert!(a.profit_loss.is_none());
    }

    #[test]
    fn test_from_calculation_keeps_margin_and_leverage() {
        let input = CalculatorInput::new(10_000.0, 100.0, 95.0, Direction::Long).with_leverage(5.0);
        let result = calculate(&input).unwrap();

        let new = NewTrade::from_calculation(&input, &result, TradeStatus::Planned).with_token("btc");
        assert_eq!(new.position_size, 100.0);
        assert_eq!(new.value_traded, 500.0);
        assert_eq!(new.leverage, 5.0);
        assert_eq!(new.take_profit, 115.0);
        assert_eq!(new.risk_reward, "1:3");
        assert_eq!(new.token, "BTC");
    }

    #[test]
    fn test_close_merges_result() {
        let mut trade = open_long();
        let result = trade.close(110.0, TradeStatus::TpReached, day(3)).unwrap();

        assert_relative_eq!(result.profit_loss, 100.0, epsilon = 1e-9);
        assert_eq!(trade.status, TradeStatus::TpReached);
        assert_eq!(trade.close_price, Some(110.0));
        assert_eq!(trade.closed_at, Some(day(3)));
        assert_eq!(trade.win_loss, Some(WinLoss::Win));
        assert_relative_eq!(trade.profit_loss_percent.unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_close_requires_closing_status() {
        let mut trade = open_long();
        let result = trade.close(110.0, TradeStatus::Open, day(3));
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
        assert!(trade.close_price.is_none());
    }

    #[test]
    fn test_apply_reevaluates_on_new_close_price() {
        let mut trade = open_long();
        trade.close(110.0, TradeStatus::Closed, day(3)).unwrap();

        let update = TradeUpdate {
            close_price: Some(90.0),
            cause: Some("Faked out".to_string()),
            ..Default::default()
        };
        trade.apply(update, day(4)).unwrap();

        assert_eq!(trade.win_loss, Some(WinLoss::Loss));
        assert_relative_eq!(trade.profit_loss.unwrap(), -100.0, epsilon = 1e-9);
        assert_eq!(trade.cause, "Faked out");
        // Original close date is kept
        assert_eq!(trade.closed_at, Some(day(3)));
    }

    #[test]
    fn test_apply_closing_status_stamps_date() {
        let mut trade = open_long();
        let update = TradeUpdate {
            status: Some(TradeStatus::SlHit),
            close_price: Some(95.0),
            ..Default::default()
        };
        trade.apply(update, day(7)).unwrap();

        assert_eq!(trade.closed_at, Some(day(7)));
        assert_eq!(trade.result_date(), day(7));
        assert_eq!(trade.win_loss, Some(WinLoss::Loss));
    }

    #[test]
    fn test_close_price_on_open_trade_has_no_result() {
        let mut trade = open_long();
        let update = TradeUpdate {
            close_price: Some(90.0),
            ..Default::default()
        };
        trade.apply(update, day(5)).unwrap();

        assert_eq!(trade.status, TradeStatus::Open);
        assert_eq!(trade.close_price, Some(90.0));
        assert!(trade.win_loss.is_none());
        assert!(trade.profit_loss.is_none());
        assert!(trade.closed_at.is_none());

        // Closing later evaluates the stored price
        let update = TradeUpdate {
            status: Some(TradeStatus::SlHit),
            ..Default::default()
        };
        trade.apply(update, day(6)).unwrap();
        assert_eq!(trade.win_loss, Some(WinLoss::Loss));
        assert_relative_eq!(trade.profit_loss.unwrap(), -100.0, epsilon = 1e-9);
        assert_eq!(trade.closed_at, Some(day(6)));
    }

    #[test]
    fn test_reopening_clears_result() {
        let mut trade = open_long();
        trade.close(110.0, TradeStatus::Closed, day(3)).unwrap();

        let update = TradeUpdate {
            status: Some(TradeStatus::Open),
            ..Default::default()
        };
        trade.apply(update, day(4)).unwrap();

        assert_eq!(trade.status, TradeStatus::Open);
        assert!(trade.win_loss.is_none());
        assert!(trade.profit_loss_percent.is_none());
        assert!(trade.closed_at.is_none());
        assert_eq!(trade.close_price, Some(110.0));
    }

    #[test]
    fn test_serde_round_trip_uses_wire_names() {
        let mut trade = open_long();
        trade.close(105.0, TradeStatus::SlHit, day(1)).unwrap();

        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["status"], "sl_hit");
        assert_eq!(json["timeframe"], "4hr");
        assert_eq!(json["closed_at"], "2024-05-01");

        let back: Trade = serde_json::from_value(json).unwrap();
        assert_eq!(back, trade);
    }
}

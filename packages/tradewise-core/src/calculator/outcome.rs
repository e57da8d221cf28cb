//! Realized result of a closed trade.

use crate::types::{Direction, WinLoss};
use serde::{Deserialize, Serialize};

/// Profit/loss of a closed trade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TradeResult {
    /// Favorable price move as a fraction of entry (positive = in our favor)
    pub price_move: f64,
    /// Realized P&L in account currency
    pub profit_loss: f64,
    /// Return on margin, in percent
    pub profit_loss_percent: f64,
    pub win_loss: WinLoss,
}

/// Evaluate a closed trade.
///
/// `margin` is the currency committed before leverage. Leverage below 1 is
/// treated as 1. Returns `None` when the entry price is not a positive
/// number or the close price is not finite.
///
/// ```rust
/// use tradewise_core::calculator::evaluate;
/// use tradewise_core::{Direction, WinLoss};
///
/// let result = evaluate(Direction::Long, 100.0, 110.0, 500.0, 2.0).unwrap();
/// assert!((result.profit_loss - 100.0).abs() < 1e-9);
/// assert!((result.profit_loss_percent - 20.0).abs() < 1e-9);
/// assert_eq!(result.win_loss, WinLoss::Win);
/// ```
pub fn evaluate(
    direction: Direction,
    entry_price: f64,
    close_price: f64,
    margin: f64,
    leverage: f64,
) -> Option<TradeResult> {
    if !entry_price.is_finite() || entry_price <= 0.0 || !close_price.is_finite() {
        return None;
    }

    let leverage = if leverage.is_finite() { leverage.max(1.0) } else { 1.0 };

    let price_move = match direction {
        Direction::Long => (close_price - entry_price) / entry_price,
        Direction::Short => (entry_price - close_price) / entry_price,
    };

    let profit_loss = price_move * margin * leverage;
    let profit_loss_percent = price_move * leverage * 100.0;

    // Breakeven is recorded as a win
    let win_loss = if profit_loss >= 0.0 {
        WinLoss::Win
    } else {
        WinLoss::Loss
    };

    Some(TradeResult {
        price_move,
        profit_loss,
        profit_loss_percent,
        win_loss,
    })
}

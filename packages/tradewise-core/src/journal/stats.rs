//! Journal summary statistics.

use super::trade::Trade;
use crate::types::{TradeStatus, WinLoss};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline numbers for the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalStats {
    /// Sum of realized P&L over trades that have one
    pub total_pnl: f64,
    pub wins: usize,
    pub losses: usize,
    /// Trades carrying a win/loss tag
    pub decided: usize,
    /// Win rate rounded to a whole percent
    pub win_rate_percent: u32,
    pub open_trades: usize,
    pub total_trades: usize,
}

impl JournalStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let total_pnl = trades.iter().filter_map(|t| t.profit_loss).sum();

        let wins = trades
            .iter()
            .filter(|t| t.win_loss == Some(WinLoss::Win))
            .count();
        let losses = trades
            .iter()
            .filter(|t| t.win_loss == Some(WinLoss::Loss))
            .count();
        let decided = wins + losses;

        let win_rate_percent = if decided > 0 {
            ((wins as f64 / decided as f64) * 100.0).round() as u32
        } else {
            0
        };

        let open_trades = trades
            .iter()
            .filter(|t| t.status == TradeStatus::Open)
            .count();

        Self {
            total_pnl,
            wins,
            losses,
            decided,
            win_rate_percent,
            open_trades,
            total_trades: trades.len(),
        }
    }
}

/// Realized P&L per day, over closed trades that carry a result.
pub fn daily_pnl(trades: &[Trade]) -> BTreeMap<NaiveDate, f64> {
    let mut by_date = BTreeMap::new();

    for trade in trades.iter().filter(|t| t.status.is_closed()) {
        if let Some(pnl) = trade.profit_loss {
            *by_date.entry(trade.result_date()).or_insert(0.0) += pnl;
        }
    }

    by_date
}

/// Realized P&L on a single day.
pub fn pnl_on(trades: &[Trade], date: NaiveDate) -> f64 {
    daily_pnl(trades).get(&date).copied().unwrap_or(0.0)
}

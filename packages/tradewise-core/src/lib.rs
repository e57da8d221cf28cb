//! Tradewise Core - Position sizing, journal and goal projection library.
//!
//! This crate provides the core functionality for the Tradewise trading
//! assistant:
//!
//! - **Trade calculator**: Position size from account risk and stop distance
//! - **Trade evaluation**: Realized P&L and win/loss of a closed trade
//! - **Trade journal**: Persisted trade records with filters and statistics
//! - **Goal projection**: Day-by-day compounding targets with overrides
//!
//! # Example
//!
//! ```rust
//! use tradewise_core::{calculate, CalculatorInput, Direction};
//!
//! let input = CalculatorInput::new(10_000.0, 100.0, 95.0, Direction::Long);
//! let result = calculate(&input).expect("valid input");
//!
//! assert_eq!(result.trade_size, 100.0);
//! assert_eq!(result.take_profit_price, 115.0);
//! ```

pub mod calculator;
pub mod config;
pub mod format;
pub mod goals;
pub mod journal;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, AssetCategory, Direction, RiskMode, RiskReward, Timeframe, TradeStatus, WinLoss,
};

// Re-export main functionality
pub use calculator::{
    calculate, calculate_form, evaluate, try_calculate, CalculatorForm, CalculatorInput,
    CalculatorResult, TradeResult,
};
pub use config::Config;
pub use goals::{
    login_streak, project, BalanceOverrides, DailyGoal, GoalRow, GoalSettings, GoalStatus,
    GoalTracker, Horizon, LoginStreak,
};
pub use journal::{JournalStats, NewTrade, Trade, TradeJournal, TradeUpdate};

/// Error types for tradewise-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for tradewise-core operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Trade journal module.
//!
//! Provides the trade record, the persisted journal and its statistics.

mod stats;
mod store;
mod trade;

pub use stats::{daily_pnl, pnl_on, JournalStats};
pub use store::{JournalFilter, SortOrder, TradeJournal, JOURNAL_FILE_ENV};
pub use trade::{NewTrade, Trade, TradeUpdate};

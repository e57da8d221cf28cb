//! Trade journal storage and persistence.

use super::stats::{daily_pnl, JournalStats};
use super::trade::{NewTrade, Trade, TradeUpdate};
use crate::types::{TradeStatus, WinLoss};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding the journal file location.
pub const JOURNAL_FILE_ENV: &str = "TRADEWISE_JOURNAL_FILE";

/// Which trades a journal listing shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalFilter {
    #[default]
    All,
    Open,
    Closed,
    Wins,
    Losses,
}

impl JournalFilter {
    pub fn matches(self, trade: &Trade) -> bool {
        match self {
            JournalFilter::All => true,
            JournalFilter::Open => trade.status == TradeStatus::Open,
            JournalFilter::Closed => trade.status.is_closed(),
            JournalFilter::Wins => trade.win_loss == Some(WinLoss::Win),
            JournalFilter::Losses => trade.win_loss == Some(WinLoss::Loss),
        }
    }
}

impl FromStr for JournalFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(JournalFilter::All),
            "open" => Ok(JournalFilter::Open),
            "closed" => Ok(JournalFilter::Closed),
            "wins" | "win" => Ok(JournalFilter::Wins),
            "losses" | "loss" => Ok(JournalFilter::Losses),
            other => Err(Error::InvalidInput(format!("unknown journal filter: {other}"))),
        }
    }
}

/// Ordering of a journal listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    /// Highest P&L first; trades without a result count as zero
    Best,
    Worst,
}

impl SortOrder {
    fn compare(self, a: &Trade, b: &Trade) -> Ordering {
        let pnl = |t: &Trade| t.profit_loss.unwrap_or(0.0);
        match self {
            SortOrder::Newest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
            SortOrder::Best => pnl(b).total_cmp(&pnl(a)),
            SortOrder::Worst => pnl(a).total_cmp(&pnl(b)),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "best" => Ok(SortOrder::Best),
            "worst" => Ok(SortOrder::Worst),
            other => Err(Error::InvalidInput(format!("unknown sort order: {other}"))),
        }
    }
}

/// On-disk layout of the journal file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct JournalFile {
    trades: Vec<Trade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Trade journal that keeps trades newest-first and persists to JSON.
#[derive(Debug)]
pub struct TradeJournal {
    /// Path to the journal JSON file (empty for in-memory)
    path: PathBuf,
    trades: Vec<Trade>,
    /// Set when the file exists but could not be read; blocks `save`
    load_failed: bool,
}

impl TradeJournal {
    /// Open the journal at the default path.
    ///
    /// Default path: `~/.tradewise/journal.json`, overridable with
    /// `TRADEWISE_JOURNAL_FILE`. A file that cannot be read yields an empty
    /// journal that refuses to save over it.
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Open a journal stored at `path`.
    pub fn with_path(path: PathBuf) -> Self {
        match Self::load_from_path(&path) {
            Ok(trades) => Self {
                path,
                trades,
                load_failed: false,
            },
            Err(e) => {
                tracing::warn!("Could not load journal from {}: {}", path.display(), e);
                Self {
                    path,
                    trades: Vec::new(),
                    load_failed: true,
                }
            }
        }
    }

    /// Create an in-memory journal (no persistence).
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            trades: Vec::new(),
            load_failed: false,
        }
    }

    /// Get the default journal file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(JOURNAL_FILE_ENV) {
            return PathBuf::from(path);
        }

        crate::config::data_dir().join("journal.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_path(path: &Path) -> Result<Vec<Trade>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        let data: serde_json::Value = serde_json::from_str(&content)?;

        // Older files hold a bare array of trades
        if data.is_array() {
            return Ok(serde_json::from_value(data)?);
        }

        let file: JournalFile = serde_json::from_value(data)?;
        tracing::debug!("Loaded {} trades from {}", file.trades.len(), path.display());
        Ok(file.trades)
    }

    /// Whether the journal file exists but could not be read.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Save the journal to disk.
    ///
    /// Fails without writing while the file on disk is unreadable.
    pub fn save(&mut self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        if self.load_failed {
            return Err(Error::InvalidOperation(format!(
                "Journal at {} could not be read, refusing to overwrite it",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = JournalFile {
            trades: self.trades.clone(),
            updated_at: Some(Utc::now()),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        tracing::debug!("Saved {} trades to {}", self.trades.len(), self.path.display());
        Ok(())
    }

    /// Save, logging instead of returning a failure.
    ///
    /// Returns whether the save succeeded.
    pub fn persist(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist journal to {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Reload the journal from disk. Clears a previous load failure.
    pub fn reload(&mut self) -> Result<()> {
        self.trades = Self::load_from_path(&self.path)?;
        self.load_failed = false;
        Ok(())
    }

    /// All trades, newest first.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn find(&self, id: &str) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Trade> {
        self.trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TradeNotFound(id.to_string()))
    }

    /// Add a trade to the top of the journal.
    pub fn add_trade(&mut self, new: NewTrade) -> Trade {
        self.add_trade_at(new, Utc::now())
    }

    /// Add a trade with an explicit creation time.
    pub fn add_trade_at(&mut self, new: NewTrade, now: DateTime<Utc>) -> Trade {
        let trade = Trade::new(new, now);
        self.trades.insert(0, trade.clone());
        trade
    }

    /// Apply a partial update to a trade.
    pub fn update_trade(&mut self, id: &str, update: TradeUpdate) -> Result<Trade> {
        let now = Utc::now();
        let trade = self.find_mut(id)?;
        trade.apply(update, now.date_naive())?;
        trade.updated_at = now;
        Ok(trade.clone())
    }

    /// Close a trade at `close_price`, merging the realized result.
    pub fn close_trade(
        &mut self,
        id: &str,
        close_price: f64,
        status: TradeStatus,
        closed_on: NaiveDate,
    ) -> Result<Trade> {
        let trade = self.find_mut(id)?;
        trade.close(close_price, status, closed_on)?;
        trade.updated_at = Utc::now();
        Ok(trade.clone())
    }

    /// Remove a trade from the journal.
    pub fn delete_trade(&mut self, id: &str) -> Result<Trade> {
        let idx = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TradeNotFound(id.to_string()))?;
        Ok(self.trades.remove(idx))
    }

    /// Trades matching `filter`, in journal order.
    pub fn filtered(&self, filter: JournalFilter) -> Vec<&Trade> {
        self.trades.iter().filter(|t| filter.matches(t)).collect()
    }

    /// All trades ordered by `order`.
    pub fn sorted(&self, order: SortOrder) -> Vec<&Trade> {
        self.listing(JournalFilter::All, order)
    }

    /// Trades matching `filter`, ordered by `order`.
    pub fn listing(&self, filter: JournalFilter, order: SortOrder) -> Vec<&Trade> {
        let mut trades = self.filtered(filter);
        trades.sort_by(|a, b| order.compare(a, b));
        trades
    }

    pub fn stats(&self) -> JournalStats {
        JournalStats::from_trades(&self.trades)
    }

    pub fn daily_pnl(&self) -> BTreeMap<NaiveDate, f64> {
        daily_pnl(&self.trades)
    }
}

impl Default for TradeJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn new_trade(entry: f64) -> NewTrade {
        NewTrade {
            entry_price: entry,
            stop_loss: entry * 0.95,
            take_profit: entry * 1.15,
            position_size: 100.0,
            value_traded: 100.0,
            leverage: 1.0,
            status: TradeStatus::Open,
            ..Default::default()
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_add_trade_is_newest_first() {
        let mut journal = TradeJournal::in_memory();
        let first = journal.add_trade(new_trade(100.0));
        let second = journal.add_trade(new_trade(200.0));

        assert_eq!(journal.trades().len(), 2);
        assert_eq!(journal.trades()[0].id, second.id);
        assert_eq!(journal.trades()[1].id, first.id);
    }

    #[test]
    fn test_close_trade() {
        let mut journal = TradeJournal::in_memory();
        let trade = journal.add_trade(new_trade(100.0));

        let closed = journal
            .close_trade(&trade.id, 110.0, TradeStatus::TpReached, day(2))
            .unwrap();

        assert_eq!(closed.win_loss, Some(WinLoss::Win));
        assert!((closed.profit_loss.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(journal.find(&trade.id).unwrap().status, TradeStatus::TpReached);
        assert!((journal.daily_pnl()[&day(2)] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_trade() {
        let mut journal = TradeJournal::in_memory();

        let result = journal.close_trade("missing", 1.0, TradeStatus::Closed, day(1));
        assert!(matches!(result, Err(Error::TradeNotFound(_))));

        let result = journal.delete_trade("missing");
        assert!(matches!(result, Err(Error::TradeNotFound(_))));

        let result = journal.update_trade("missing", TradeUpdate::default());
        assert!(matches!(result, Err(Error::TradeNotFound(_))));
    }

    #[test]
    fn test_update_trade_bumps_timestamp() {
        let mut journal = TradeJournal::in_memory();
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let trade = journal.add_trade_at(new_trade(100.0), created);

        let update = TradeUpdate {
            token: Some("eth".to_string()),
            ..Default::default()
        };
        let updated = journal.update_trade(&trade.id, update).unwrap();

        assert_eq!(updated.token, "ETH");
        assert!(updated.updated_at > created);
        assert_eq!(updated.created_at, created);
    }

    #[test]
    fn test_delete_trade() {
        let mut journal = TradeJournal::in_memory();
        let trade = journal.add_trade(new_trade(100.0));
        journal.add_trade(new_trade(50.0));

        let removed = journal.delete_trade(&trade.id).unwrap();
        assert_eq!(removed.id, trade.id);
        assert_eq!(journal.trades().len(), 1);
        assert!(journal.find(&trade.id).is_none());
    }

    #[test]
    fn test_filters_and_sorting() {
        let mut journal = TradeJournal::in_memory();
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();

        let winner = journal.add_trade_at(new_trade(100.0), base);
        let loser = journal.add_trade_at(new_trade(100.0), base + Duration::hours(1));
        let open = journal.add_trade_at(new_trade(100.0), base + Duration::hours(2));

        journal
            .close_trade(&winner.id, 120.0, TradeStatus::Closed, day(1))
            .unwrap();
        journal
            .close_trade(&loser.id, 95.0, TradeStatus::SlHit, day(1))
            .unwrap();

        let ids = |trades: Vec<&Trade>| trades.iter().map(|t| t.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(journal.filtered(JournalFilter::Open)), vec![open.id.clone()]);
        assert_eq!(journal.filtered(JournalFilter::Closed).len(), 2);
        assert_eq!(ids(journal.filtered(JournalFilter::Wins)), vec![winner.id.clone()]);
        assert_eq!(ids(journal.filtered(JournalFilter::Losses)), vec![loser.id.clone()]);

        assert_eq!(
            ids(journal.listing(JournalFilter::All, SortOrder::Oldest)),
            vec![winner.id.clone(), loser.id.clone(), open.id.clone()]
        );
        assert_eq!(
            ids(journal.sorted(SortOrder::Best)),
            vec![winner.id.clone(), open.id.clone(), loser.id.clone()]
        );
        assert_eq!(
            ids(journal.listing(JournalFilter::Closed, SortOrder::Worst)),
            vec![loser.id, winner.id]
        );
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.json");

        let id = {
            let mut journal = TradeJournal::with_path(path.clone());
            let trade = journal.add_trade(new_trade(100.0));
            journal
                .close_trade(&trade.id, 105.0, TradeStatus::Closed, day(3))
                .unwrap();
            journal.save().unwrap();
            trade.id
        };

        let journal = TradeJournal::with_path(path);
        assert_eq!(journal.trades().len(), 1);
        let trade = journal.find(&id).unwrap();
        assert_eq!(trade.closed_at, Some(day(3)));
        assert_eq!(trade.close_price, Some(105.0));
    }

    #[test]
    fn test_loads_bare_array_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");

        let trade = Trade::new(new_trade(10.0), Utc::now());
        fs::write(&path, serde_json::to_string(&vec![trade.clone()]).unwrap()).unwrap();

        let journal = TradeJournal::with_path(path);
        assert_eq!(journal.trades(), &[trade]);
    }

    #[test]
    fn test_persist_swallows_failures() {
        let dir = tempdir().unwrap();
        // A directory in place of the file makes the write fail
        let path = dir.path().join("journal.json");
        fs::create_dir_all(&path).unwrap();

        let mut journal = TradeJournal::in_memory();
        journal.path = path;
        journal.add_trade(new_trade(100.0));

        assert!(!journal.persist());
        assert_eq!(journal.trades().len(), 1);
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");
        let original = r#"[{"id":"keep-me" "#;
        fs::write(&path, original).unwrap();

        let mut journal = TradeJournal::with_path(path.clone());
        assert!(journal.load_failed());
        journal.add_trade(new_trade(100.0));

        assert!(matches!(journal.save(), Err(Error::InvalidOperation(_))));
        assert!(!journal.persist());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        // Once the file is repaired a reload re-enables saving
        fs::write(&path, "[]").unwrap();
        journal.reload().unwrap();
        assert!(!journal.load_failed());
        journal.add_trade(new_trade(100.0));
        journal.save().unwrap();
        assert_eq!(TradeJournal::with_path(path).trades().len(), 1);
    }

    #[test]
    fn test_parse_filter_and_order() {
        assert_eq!("Wins".parse::<JournalFilter>().unwrap(), JournalFilter::Wins);
        assert_eq!("worst".parse::<SortOrder>().unwrap(), SortOrder::Worst);
        assert!("sideways".parse::<JournalFilter>().is_err());
    }
}

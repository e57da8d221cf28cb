//! User configuration loaded from TOML.
//!
//! ```toml
//! user_id = "me"
//! data_dir = "/srv/tradewise"
//!
//! [calculator]
//! risk_reward = "1:5"
//! high_risk_percent = 2.0
//!
//! [goals]
//! starting_balance = 5000.0
//! daily_goal_percent = 1.0
//! horizon = 30
//! ```

use crate::calculator::HIGH_RISK_PERCENT;
use crate::goals::{GoalSettingsUpdate, Horizon, GOALS_FILE_ENV};
use crate::journal::JOURNAL_FILE_ENV;
use crate::types::RiskReward;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_FILE_ENV: &str = "TRADEWISE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub user_id: String,
    /// Directory holding the journal and goal files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub calculator: CalculatorConfig,
    pub goals: GoalsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalculatorConfig {
    pub risk_reward: RiskReward,
    /// Risk percent above which a calculation is flagged
    pub high_risk_percent: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            risk_reward: RiskReward::default(),
            high_risk_percent: HIGH_RISK_PERCENT,
        }
    }
}

/// Goal settings applied when the tracker has none saved yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GoalsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_goal_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon: Option<u32>,
}

impl GoalsConfig {
    pub fn is_empty(&self) -> bool {
        self.starting_balance.is_none()
            && self.daily_goal_percent.is_none()
            && self.horizon.is_none()
    }

    /// Settings update carrying the configured values.
    pub fn to_update(&self) -> Result<GoalSettingsUpdate> {
        Ok(GoalSettingsUpdate {
            starting_balance: self.starting_balance,
            daily_goal_percent: self.daily_goal_percent,
            horizon: self.horizon.map(Horizon::try_from).transpose()?,
            projection_start_date: None,
        })
    }
}

/// Default data directory: `~/.tradewise`.
pub fn data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".tradewise"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load from `TRADEWISE_CONFIG` or `~/.tradewise/config.toml`.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_FILE_ENV) {
            return PathBuf::from(path);
        }

        data_dir().join("config.toml")
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(data_dir)
    }

    /// Journal file: `TRADEWISE_JOURNAL_FILE`, then `data_dir`, then home.
    pub fn journal_path(&self) -> PathBuf {
        Self::resolve(JOURNAL_FILE_ENV, self.resolved_data_dir(), "journal.json")
    }

    /// Goal tracker file: `TRADEWISE_GOALS_FILE`, then `data_dir`, then home.
    pub fn goals_path(&self) -> PathBuf {
        Self::resolve(GOALS_FILE_ENV, self.resolved_data_dir(), "goals.json")
    }

    fn resolve(var: &str, dir: PathBuf, file: &str) -> PathBuf {
        match env::var(var) {
            Ok(path) => PathBuf::from(path),
            Err(_) => dir.join(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.calculator.high_risk_percent, 2.0);
        assert_eq!(config.calculator.risk_reward, RiskReward::new(1.0, 3.0));
        assert!(config.goals.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
user_id = "trader-7"
data_dir = "/tmp/tw-data"

[calculator]
risk_reward = "1:5"

[goals]
daily_goal_percent = 1.5
horizon = 60
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.user_id, "trader-7");
        assert_eq!(config.calculator.risk_reward, RiskReward::new(1.0, 5.0));
        assert_eq!(config.calculator.high_risk_percent, 2.0);
        assert_eq!(config.goals.starting_balance, None);

        let update = config.goals.to_update().unwrap();
        assert_eq!(update.daily_goal_percent, Some(1.5));
        assert_eq!(update.horizon, Some(Horizon::Days60));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "user_id = [").unwrap();

        assert!(matches!(
            Config::load_from_path(&path),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_bad_horizon_rejected() {
        let goals = GoalsConfig {
            horizon: Some(45),
            ..Default::default()
        };
        assert!(matches!(goals.to_update(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_data_dir_from_config() {
        let config = Config {
            data_dir: Some(PathBuf::from("/var/lib/tradewise")),
            ..Default::default()
        };

        if env::var(GOALS_FILE_ENV).is_err() {
            assert_eq!(
                config.goals_path(),
                PathBuf::from("/var/lib/tradewise/goals.json")
            );
        }
        if env::var(JOURNAL_FILE_ENV).is_err() {
            assert_eq!(
                config.journal_path(),
                PathBuf::from("/var/lib/tradewise/journal.json")
            );
        }
    }
}

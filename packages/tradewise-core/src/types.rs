//! Core data types shared across the calculator, journal and goal tracker.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short. Used to place a synthesized take-profit.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(Error::InvalidInput(format!("unknown direction: {other}"))),
        }
    }
}

/// How the risk value of a calculation is interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    /// Risk value is a percentage of the account balance.
    #[default]
    Percent,
    /// Risk value is the margin committed, in account currency.
    #[serde(rename = "dollar", alias = "fixed")]
    Fixed,
}

impl FromStr for RiskMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "%" => Ok(RiskMode::Percent),
            "fixed" | "dollar" | "$" => Ok(RiskMode::Fixed),
            other => Err(Error::InvalidInput(format!("unknown risk mode: {other}"))),
        }
    }
}

/// A risk:reward preset such as `1:3`.
///
/// Serialized as its string form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct RiskReward {
    pub risk: f64,
    pub reward: f64,
}

impl RiskReward {
    /// Presets offered by the calculator.
    pub const PRESETS: [RiskReward; 3] = [
        RiskReward::new(1.0, 3.0),
        RiskReward::new(1.0, 5.0),
        RiskReward::new(1.0, 10.0),
    ];

    pub const fn new(risk: f64, reward: f64) -> Self {
        Self { risk, reward }
    }

    /// Reward distance per unit of risk distance.
    pub fn multiplier(&self) -> f64 {
        self.reward / self.risk
    }
}

impl Default for RiskReward {
    fn default() -> Self {
        Self::new(1.0, 3.0)
    }
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.risk, self.reward)
    }
}

impl FromStr for RiskReward {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("invalid risk:reward preset: {s}"));

        let (risk, reward) = s.trim().split_once(':').ok_or_else(invalid)?;
        let risk: f64 = risk.trim().parse().map_err(|_| invalid())?;
        let reward: f64 = reward.trim().parse().map_err(|_| invalid())?;

        if !risk.is_finite() || !reward.is_finite() || risk <= 0.0 || reward <= 0.0 {
            return Err(invalid());
        }

        Ok(Self::new(risk, reward))
    }
}

impl TryFrom<String> for RiskReward {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RiskReward> for String {
    fn from(value: RiskReward) -> Self {
        value.to_string()
    }
}

/// Lifecycle status of a journal trade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    #[default]
    Planned,
    Open,
    Closed,
    TpReached,
    SlHit,
}

impl TradeStatus {
    /// Whether the trade has been exited (any of the three closing statuses).
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            TradeStatus::Closed | TradeStatus::TpReached | TradeStatus::SlHit
        )
    }
}

impl FromStr for TradeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "planned" => Ok(TradeStatus::Planned),
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            "tp_reached" | "tp" => Ok(TradeStatus::TpReached),
            "sl_hit" | "sl" => Ok(TradeStatus::SlHit),
            other => Err(Error::InvalidInput(format!("unknown trade status: {other}"))),
        }
    }
}

/// Outcome tag of a closed trade. Breakeven counts as a win.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WinLoss {
    Win,
    Loss,
}

/// Market the traded instrument belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    #[default]
    Crypto,
    Stocks,
    Commodities,
    Forex,
}

impl FromStr for AssetCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "crypto" => Ok(AssetCategory::Crypto),
            "stocks" => Ok(AssetCategory::Stocks),
            "commodities" => Ok(AssetCategory::Commodities),
            "forex" => Ok(AssetCategory::Forex),
            other => Err(Error::InvalidInput(format!("unknown asset category: {other}"))),
        }
    }
}

/// Chart timeframe the trade was taken on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Timeframe {
    #[serde(rename = "1hr")]
    OneHour,
    #[default]
    #[serde(rename = "4hr")]
    FourHour,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1hr" | "1h" => Ok(Timeframe::OneHour),
            "4hr" | "4h" => Ok(Timeframe::FourHour),
            "daily" | "1d" => Ok(Timeframe::Daily),
            "weekly" | "1w" => Ok(Timeframe::Weekly),
            other => Err(Error::InvalidInput(format!("unknown timeframe: {other}"))),
        }
    }
}

/// Response envelope printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_reward_parse() {
        let rr: RiskReward = "1:3".parse().unwrap();
        assert_eq!(rr.risk, 1.0);
        assert_eq!(rr.reward, 3.0);
        assert_eq!(rr.multiplier(), 3.0);
        assert_eq!(rr.to_string(), "1:3");

        let rr: RiskReward = " 2 : 5 ".parse().unwrap();
        assert_eq!(rr.multiplier(), 2.5);
    }

    #[test]
    fn test_risk_reward_rejects_garbage() {
        assert!("3".parse::<RiskReward>().is_err());
        assert!("1:x".parse::<RiskReward>().is_err());
        assert!("0:3".parse::<RiskReward>().is_err());
        assert!("1:2:3".parse::<RiskReward>().is_err());
    }

    #[test]
    fn test_risk_reward_serde_as_string() {
        let json = serde_json::to_string(&RiskReward::new(1.0, 5.0)).unwrap();
        assert_eq!(json, "\"1:5\"");

        let back: RiskReward = serde_json::from_str("\"1:10\"").unwrap();
        assert_eq!(back.multiplier(), 10.0);
    }

    #[test]
    fn test_trade_status_serde() {
        let json = serde_json::to_string(&TradeStatus::TpReached).unwrap();
        assert_eq!(json, "\"tp_reached\"");
        assert!(TradeStatus::SlHit.is_closed());
        assert!(!TradeStatus::Open.is_closed());
        assert_eq!("sl_hit".parse::<TradeStatus>().unwrap(), TradeStatus::SlHit);
    }

    #[test]
    fn test_risk_mode_wire_names() {
        assert_eq!(serde_json::to_string(&RiskMode::Fixed).unwrap(), "\"dollar\"");
        let mode: RiskMode = serde_json::from_str("\"fixed\"").unwrap();
        assert_eq!(mode, RiskMode::Fixed);
    }

    #[test]
    fn test_timeframe_serde() {
        assert_eq!(serde_json::to_string(&Timeframe::OneHour).unwrap(), "\"1hr\"");
        assert_eq!("1d".parse::<Timeframe>().unwrap(), Timeframe::Daily);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("SHORT".parse::<Direction>().unwrap(), Direction::Short);
        assert_eq!(Direction::Short.sign(), -1.0);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}

//! Tradewise CLI - Command line interface for Tradewise operations.
//!
//! Every command prints a JSON envelope on stdout. Logs go to stderr and
//! are controlled with `RUST_LOG`.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tradewise_core::{
    calculator::try_calculate,
    evaluate,
    goals::{check_projection_days, compound_balance, projection_end_date, GoalSettingsUpdate},
    journal::{pnl_on, JournalFilter, SortOrder},
    login_streak, project, ApiResponse, AssetCategory, BalanceOverrides, CalculatorInput, Config,
    Direction, Error, GoalTracker, Horizon, NewTrade, Result, RiskMode, RiskReward, Timeframe,
    TradeJournal, TradeStatus,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tradewise")]
#[command(about = "Tradewise CLI - position sizing, trade journal and daily goals")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a trade from account risk and stop distance
    Calc {
        /// Account balance
        #[arg(short, long)]
        balance: f64,
        /// Risk amount (percent of balance or dollars, see --risk-mode)
        #[arg(short, long, default_value = "1")]
        risk: f64,
        /// percent or dollar
        #[arg(long, default_value = "percent")]
        risk_mode: RiskMode,
        #[arg(short, long, default_value = "1")]
        leverage: f64,
        #[arg(short, long)]
        entry: f64,
        #[arg(short, long)]
        stop: f64,
        /// Explicit take profit (derived from --rr otherwise)
        #[arg(long)]
        tp: Option<f64>,
        #[arg(short, long, default_value = "long")]
        direction: Direction,
        /// Risk:reward preset such as 1:3 (config default otherwise)
        #[arg(long)]
        rr: Option<RiskReward>,
        /// Save the sized trade to the journal as planned or open
        #[arg(long)]
        save: Option<TradeStatus>,
        /// Instrument symbol for the saved trade
        #[arg(long, default_value = "")]
        token: String,
        #[arg(long, default_value = "crypto")]
        category: AssetCategory,
        #[arg(long, default_value = "4hr")]
        timeframe: Timeframe,
        /// Rationale for the saved trade
        #[arg(long, default_value = "")]
        cause: String,
    },
    /// Print the day-by-day goal projection
    Project {
        #[arg(short, long)]
        balance: f64,
        /// Daily goal percent
        #[arg(short, long)]
        percent: f64,
        #[arg(short, long, default_value = "30")]
        days: u32,
        /// First day (today otherwise)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Starting balance override, DATE=BALANCE (repeatable)
        #[arg(long = "override", value_parser = parse_override)]
        overrides: Vec<(NaiveDate, f64)>,
    },
    /// Evaluate the result of closing a trade
    Evaluate {
        #[arg(short, long, default_value = "long")]
        direction: Direction,
        #[arg(short, long)]
        entry: f64,
        #[arg(short, long)]
        close: f64,
        /// Margin committed
        #[arg(short, long)]
        size: f64,
        #[arg(short, long, default_value = "1")]
        leverage: f64,
    },
    /// Trade journal commands
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
    /// Daily goal tracker commands
    Goals {
        #[command(subcommand)]
        action: GoalsAction,
    },
    /// Login streak over the trailing week
    Streak {
        /// Login dates, comma-separated YYYY-MM-DD
        #[arg(long, value_delimiter = ',')]
        dates: Vec<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum JournalAction {
    /// List trades
    List {
        /// all, open, closed, wins or losses
        #[arg(short, long, default_value = "all")]
        filter: JournalFilter,
        /// newest, oldest, best or worst
        #[arg(short, long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Summary statistics
    Stats,
    /// Close a trade at a price
    Close {
        #[arg(long)]
        id: String,
        #[arg(short, long)]
        price: f64,
        /// closed, tp_reached or sl_hit
        #[arg(short, long, default_value = "closed")]
        status: TradeStatus,
    },
    /// Delete a trade
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum GoalsAction {
    /// Settings, today's goal and the projection table
    Status,
    /// Update goal settings
    Set {
        #[arg(short, long)]
        balance: Option<f64>,
        #[arg(short, long)]
        percent: Option<f64>,
        /// 30, 60 or 90 days
        #[arg(long)]
        horizon: Option<u32>,
    },
    /// Override the starting balance of a day
    Override {
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(short, long)]
        balance: f64,
    },
    /// Record the realized P&L of a day
    Record {
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(short, long)]
        pnl: f64,
    },
    /// Record daily P&L from the trade journal
    Sync,
    /// Clear the projection, its overrides and recorded results
    Clear,
}

fn main() {
    // Initialize logging (stderr, stdout carries the JSON response)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = Config::load().and_then(|config| {
        let today = Local::now().date_naive();
        match cli.command {
            Commands::Calc {
                balance,
                risk,
                risk_mode,
                leverage,
                entry,
                stop,
                tp,
                direction,
                rr,
                save,
                token,
                category,
                timeframe,
                cause,
            } => {
                let mut input = CalculatorInput::new(balance, entry, stop, direction)
                    .with_risk(risk_mode, risk)
                    .with_leverage(leverage)
                    .with_risk_reward(rr.unwrap_or(config.calculator.risk_reward));
                if let Some(tp) = tp {
                    input = input.with_take_profit(tp);
                }
                let details = SaveDetails {
                    status: save,
                    token,
                    category,
                    timeframe,
                    cause,
                };
                handle_calc(&config, &input, details)
            }
            Commands::Project {
                balance,
                percent,
                days,
                start,
                overrides,
            } => handle_project(balance, percent, days, start.unwrap_or(today), overrides),
            Commands::Evaluate {
                direction,
                entry,
                close,
                size,
                leverage,
            } => handle_evaluate(direction, entry, close, size, leverage),
            Commands::Journal { action } => handle_journal(&config, action, today),
            Commands::Goals { action } => handle_goals(&config, action, today),
            Commands::Streak { dates } => to_value(login_streak(&dates, today)),
        }
    });

    let response = match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiResponse::err(e.to_string()),
    };

    match serde_json::to_string_pretty(&response) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("Failed to render response: {}", e);
            std::process::exit(1);
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_override(raw: &str) -> std::result::Result<(NaiveDate, f64), String> {
    let (date, balance) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DATE=BALANCE, got {raw}"))?;
    let date = date
        .trim()
        .parse::<NaiveDate>()
        .map_err(|e| format!("invalid date {date}: {e}"))?;
    let balance = balance
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid balance {balance}: {e}"))?;
    Ok((date, balance))
}

/// Journal fields used when `calc --save` is given.
struct SaveDetails {
    status: Option<TradeStatus>,
    token: String,
    category: AssetCategory,
    timeframe: Timeframe,
    cause: String,
}

fn handle_calc(config: &Config, input: &CalculatorInput, details: SaveDetails) -> Result<Value> {
    let result = try_calculate(input)?;
    let high_risk = result.exceeds_risk(config.calculator.high_risk_percent);

    let saved = match details.status {
        None => None,
        Some(status @ (TradeStatus::Planned | TradeStatus::Open)) => {
            let mut new = NewTrade::from_calculation(input, &result, status)
                .with_user(config.user_id.clone())
                .with_token(details.token);
            new.asset_category = details.category;
            new.timeframe = details.timeframe;
            new.cause = details.cause;

            let mut journal = TradeJournal::with_path(config.journal_path());
            let trade = journal.add_trade(new);
            journal.save()?;
            Some(trade)
        }
        Some(other) => {
            return Err(Error::InvalidInput(format!(
                "a new trade can only be saved as planned or open, not {other:?}"
            )))
        }
    };

    Ok(json!({
        "result": result,
        "high_risk": high_risk,
        "saved": saved,
    }))
}

fn handle_project(
    balance: f64,
    percent: f64,
    days: u32,
    start: NaiveDate,
    overrides: Vec<(NaiveDate, f64)>,
) -> Result<Value> {
    let days = check_projection_days(days)?;
    let overrides: BalanceOverrides = overrides.into_iter().collect();
    let rows = project(balance, percent, days, &overrides, start);

    Ok(json!({
        "start_date": start,
        "end_date": projection_end_date(&rows),
        "target_balance": compound_balance(balance, percent, days),
        "rows": rows,
    }))
}

fn handle_evaluate(
    direction: Direction,
    entry: f64,
    close: f64,
    size: f64,
    leverage: f64,
) -> Result<Value> {
    let result = evaluate(direction, entry, close, size, leverage).ok_or_else(|| {
        Error::InvalidInput("entry must be positive and close a finite price".to_string())
    })?;
    to_value(result)
}

fn handle_journal(config: &Config, action: JournalAction, today: NaiveDate) -> Result<Value> {
    let mut journal = TradeJournal::with_path(config.journal_path());

    match action {
        JournalAction::List { filter, sort } => {
            let trades = journal.listing(filter, sort);
            Ok(json!({
                "count": trades.len(),
                "trades": trades,
            }))
        }
        JournalAction::Stats => Ok(json!({
            "stats": journal.stats(),
            "today_pnl": pnl_on(journal.trades(), today),
        })),
        JournalAction::Close { id, price, status } => {
            let trade = journal.close_trade(&id, price, status, today)?;
            journal.save()?;
            Ok(json!({ "trade": trade }))
        }
        JournalAction::Delete { id } => {
            let removed = journal.delete_trade(&id)?;
            journal.save()?;
            Ok(json!({ "removed": removed }))
        }
    }
}

fn open_goal_tracker(config: &Config, today: NaiveDate) -> Result<GoalTracker> {
    let mut tracker = GoalTracker::with_path(config.goals_path());
    if !config.user_id.is_empty() {
        tracker.set_user(config.user_id.clone());
    }

    // Configured goals seed a tracker that has never been saved
    if tracker.settings().projection_start_date.is_none() && !config.goals.is_empty() {
        tracker.update_settings(config.goals.to_update()?, today)?;
    }

    Ok(tracker)
}

fn goal_status(tracker: &GoalTracker, today_pnl: f64, today: NaiveDate) -> Value {
    let rows = tracker.rows(today);
    let target = rows.last().map(|row| row.expected_ending_balance);

    json!({
        "settings": tracker.settings(),
        "start_date": tracker.start_date(today),
        "end_date": tracker.projection_end_date(today),
        "target_balance": target,
        "today": tracker.row_for(today, today),
        "today_pnl": today_pnl,
        "progress_percent": tracker.progress(today_pnl, today),
        "daily_goals": tracker.daily_goals(),
        "overrides": tracker.overrides(),
        "rows": rows,
    })
}

fn handle_goals(config: &Config, action: GoalsAction, today: NaiveDate) -> Result<Value> {
    let mut tracker = open_goal_tracker(config, today)?;

    match action {
        GoalsAction::Status => {
            let journal = TradeJournal::with_path(config.journal_path());
            let today_pnl = pnl_on(journal.trades(), today);
            Ok(goal_status(&tracker, today_pnl, today))
        }
        GoalsAction::Set {
            balance,
            percent,
            horizon,
        } => {
            let update = GoalSettingsUpdate {
                starting_balance: balance,
                daily_goal_percent: percent,
                horizon: horizon.map(Horizon::try_from).transpose()?,
                projection_start_date: None,
            };
            let settings = tracker.update_settings(update, today)?.clone();
            tracker.save()?;
            Ok(json!({
                "settings": settings,
                "end_date": tracker.projection_end_date(today),
            }))
        }
        GoalsAction::Override { date, balance } => {
            tracker.set_start_balance_override(date, balance)?;
            tracker.save()?;
            Ok(json!({
                "overrides": tracker.overrides(),
                "rows": tracker.rows(today),
            }))
        }
        GoalsAction::Record { date, pnl } => {
            let goal = tracker.record_daily_result(date, pnl, today).ok_or_else(|| {
                Error::InvalidInput(format!("{date} is outside the goal projection"))
            })?;
            tracker.save()?;
            Ok(json!({ "daily_goal": goal }))
        }
        GoalsAction::Sync => {
            let journal = TradeJournal::with_path(config.journal_path());
            let recorded = tracker.sync_journal(journal.trades(), today);
            tracker.save()?;
            Ok(json!({
                "recorded": recorded.len(),
                "daily_goals": recorded,
            }))
        }
        GoalsAction::Clear => {
            tracker.clear_projection();
            tracker.save()?;
            Ok(json!({ "message": "Goal projection cleared" }))
        }
    }
}

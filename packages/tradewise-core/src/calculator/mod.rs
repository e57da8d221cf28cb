//! Trade calculator module.
//!
//! Position sizing for a planned trade and evaluation of a closed one.

mod outcome;
mod sizing;

pub use outcome::{evaluate, TradeResult};
pub use sizing::{
    calculate, calculate_form, try_calculate, CalculatorForm, CalculatorInput, CalculatorResult,
    DEFAULT_RISK_PERCENT, HIGH_RISK_PERCENT,
};

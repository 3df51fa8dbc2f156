#![warn(clippy::uninlined_format_args)]

pub mod currency;
pub mod error;
pub mod model;
pub mod services;

pub use currency::{ExchangeRate, ExchangeRateError};
pub use error::{InvalidExpenseReason, SettlementError};
pub use model::{
    Expense, Money, ParticipantBalances, ParticipantId, ParticipantSummary, SettlementReport,
    Transfer,
};
pub use services::{
    BalanceAccumulator, BalanceSheet, RemainderPolicy, RoundingMode, SettlementCalculator,
    SettlementContext, SettlementEngine, SettlementRoundingError, compute_settlement,
    quantize_balances,
};

pub mod balance_calculator;
pub mod settlement_calculator;
pub mod settlement_engine;
pub mod settlement_rounding;

pub use balance_calculator::{BalanceAccumulator, BalanceSheet};
pub use settlement_calculator::SettlementCalculator;
pub use settlement_engine::{SettlementEngine, compute_settlement};
pub use settlement_rounding::{
    RemainderPolicy, RoundingMode, SettlementContext, SettlementRoundingError, quantize_balances,
};

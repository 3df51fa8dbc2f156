use crate::{
    model::{Money, ParticipantId},
    services::SettlementRoundingError,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("expense at index {index} is invalid: {reason}")]
    InvalidExpense {
        index: usize,
        reason: InvalidExpenseReason,
    },
    #[error("participant '{0}' is listed more than once")]
    DuplicateParticipant(ParticipantId),
    #[error(transparent)]
    Rounding(#[from] SettlementRoundingError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidExpenseReason {
    #[error("amount {0} is negative")]
    NegativeAmount(Money),
    #[error("nobody shares the cost")]
    EmptySplit,
    #[error("amount {0} pushes the running totals out of range")]
    AmountOverflow(Money),
}

use seoulmate_domain::{InvalidExpenseReason, SettlementError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerParseError {
    MissingMembersDeclaration,
    SyntaxError { line: usize, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerEvaluationError {
    #[error("expense at line {line} is invalid: {reason}")]
    InvalidExpense {
        line: usize,
        reason: InvalidExpenseReason,
    },
    #[error(transparent)]
    Settlement(SettlementError),
}

#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_processor;
pub mod model;
pub mod ports;

pub use error::{LedgerEvaluationError, LedgerParseError};
pub use ledger_processor::{LedgerProcessor, ProcessingOutcome};
pub use model::{
    Command, CommandOutput, CommandResult, Conversion, ExpenseEntry, Ledger, LedgerReport,
    LedgerStatement, LedgerStatementWithLine, SplitSpec,
};
pub use ports::LedgerParser;

use seoulmate_domain::{ExchangeRate, Expense, Money, ParticipantId, SettlementReport};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SplitSpec<'a> {
    /// Everyone on the roster when the expense is recorded.
    #[default]
    Default,
    Everyone {
        except: Vec<&'a str>,
    },
    /// Taken as written, so names that have left stay in the divisor.
    Listed(Vec<&'a str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry<'a> {
    pub payer: &'a str,
    pub amount: Money,
    pub split: SplitSpec<'a>,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Settle,
    Balances,
    Expenses,
    Convert(Money),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerStatement<'a> {
    Expense(ExpenseEntry<'a>),
    Join(&'a str),
    Leave(&'a str),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStatementWithLine<'a> {
    pub line: usize,
    pub statement: LedgerStatement<'a>,
}

/// A parsed ledger: the initial roster followed by everything after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<'a> {
    members: Vec<&'a str>,
    members_line: usize,
    statements: Vec<LedgerStatementWithLine<'a>>,
}

impl<'a> Ledger<'a> {
    pub fn new(
        members: Vec<&'a str>,
        members_line: usize,
        statements: Vec<LedgerStatementWithLine<'a>>,
    ) -> Self {
        Self {
            members,
            members_line,
            statements,
        }
    }

    pub fn members(&self) -> &[&'a str] {
        &self.members
    }

    pub fn members_line(&self) -> usize {
        self.members_line
    }

    pub fn statements(&self) -> &[LedgerStatementWithLine<'a>] {
        &self.statements
    }

    pub fn has_commands(&self) -> bool {
        self.statements
            .iter()
            .any(|stmt| matches!(stmt.statement, LedgerStatement::Command(_)))
    }
}

/// Settlement of a ledger prefix together with the roster it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReport {
    pub members: Vec<ParticipantId>,
    /// Expenses as resolved for the engine, in ledger order.
    pub expenses: Vec<Expense>,
    pub settlement: SettlementReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: Money,
    pub converted: Money,
    pub rate: ExchangeRate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Settlement(LedgerReport),
    Balances(LedgerReport),
    Expenses(LedgerReport),
    Conversion(Conversion),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub line: usize,
    pub output: CommandOutput,
}

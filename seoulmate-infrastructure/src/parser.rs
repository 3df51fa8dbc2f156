use seoulmate_application::{
    Command, ExpenseEntry, Ledger, LedgerParseError, LedgerParser, LedgerStatement,
    LedgerStatementWithLine, SplitSpec,
};
use seoulmate_domain::Money;
use seoulmate_parser::{
    Command as ParserCommand, ParseError, SplitClause, Statement as ParserStatement,
    StatementWithLine, parse_program,
};

#[derive(Default)]
pub struct SeoulmateLedgerParser;

impl LedgerParser for SeoulmateLedgerParser {
    fn parse<'a>(&self, content: &'a str) -> Result<Ledger<'a>, LedgerParseError> {
        let program = parse_program(content).map_err(|err| match err {
            ParseError::SyntaxError { line, detail } => {
                LedgerParseError::SyntaxError { line, detail }
            }
        })?;

        let mut statements = program.statements.into_iter();
        let Some(StatementWithLine {
            line: members_line,
            statement: ParserStatement::Members(members),
        }) = statements.next()
        else {
            return Err(LedgerParseError::MissingMembersDeclaration);
        };

        let statements = statements
            .map(to_ledger_statement)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ledger::new(members, members_line, statements))
    }
}

fn to_ledger_statement(
    stmt: StatementWithLine<'_>,
) -> Result<LedgerStatementWithLine<'_>, LedgerParseError> {
    let StatementWithLine { line, statement } = stmt;
    let statement = match statement {
        ParserStatement::Members(_) => {
            return Err(LedgerParseError::SyntaxError {
                line,
                detail: seoulmate_i18n::MEMBERS_REDECLARED.to_string(),
            });
        }
        ParserStatement::Expense(expense) => LedgerStatement::Expense(ExpenseEntry {
            payer: expense.payer,
            amount: Money::from_decimal(expense.amount),
            split: to_split_spec(expense.split),
            description: expense.description,
        }),
        ParserStatement::Join(name) => LedgerStatement::Join(name),
        ParserStatement::Leave(name) => LedgerStatement::Leave(name),
        ParserStatement::Command(command) => LedgerStatement::Command(match command {
            ParserCommand::Settle => Command::Settle,
            ParserCommand::Balances => Command::Balances,
            ParserCommand::Expenses => Command::Expenses,
            ParserCommand::Convert(amount) => Command::Convert(Money::from_decimal(amount)),
        }),
    };
    Ok(LedgerStatementWithLine { line, statement })
}

fn to_split_spec(split: SplitClause<'_>) -> SplitSpec<'_> {
    match split {
        SplitClause::Unspecified => SplitSpec::Default,
        SplitClause::Everyone { except } => SplitSpec::Everyone { except },
        SplitClause::Listed(names) => SplitSpec::Listed(names),
    }
}

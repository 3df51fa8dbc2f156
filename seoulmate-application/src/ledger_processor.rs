use crate::{
    error::{LedgerEvaluationError, LedgerParseError},
    model::{
        Command, CommandOutput, CommandResult, Conversion, ExpenseEntry, Ledger, LedgerReport,
        LedgerStatement, SplitSpec,
    },
    ports::LedgerParser,
};
use indexmap::IndexSet;
use seoulmate_domain::{
    ExchangeRate, Expense, Money, ParticipantId, SettlementContext, SettlementEngine,
    SettlementError,
};

// Converted amounts are shown in whole units of the quote currency.
const CONVERSION_SCALE: u32 = 0;

pub enum ProcessingOutcome<'a> {
    Success(Ledger<'a>),
    MissingMembersDeclaration,
    SyntaxError { line: usize, detail: String },
    UnknownMember { name: &'a str, line: usize },
    DuplicateMember { name: &'a str, line: usize },
}

#[derive(Clone)]
pub struct LedgerProcessor<'a> {
    parser: &'a dyn LedgerParser,
    engine: SettlementEngine,
    exchange_rate: ExchangeRate,
}

impl<'a> LedgerProcessor<'a> {
    pub fn new(parser: &'a dyn LedgerParser, context: SettlementContext) -> Self {
        Self {
            parser,
            engine: SettlementEngine::new(context),
            exchange_rate: ExchangeRate::krw_to_twd(),
        }
    }

    pub fn with_exchange_rate(mut self, exchange_rate: ExchangeRate) -> Self {
        self.exchange_rate = exchange_rate;
        self
    }

    pub fn context(&self) -> SettlementContext {
        self.engine.context()
    }

    pub fn exchange_rate(&self) -> &ExchangeRate {
        &self.exchange_rate
    }

    /// Parses `content` and checks that roster changes make sense.
    pub fn parse_ledger<'b>(&self, content: &'b str) -> ProcessingOutcome<'b> {
        let ledger = match self.parser.parse(content) {
            Ok(ledger) => ledger,
            Err(LedgerParseError::MissingMembersDeclaration) => {
                return ProcessingOutcome::MissingMembersDeclaration;
            }
            Err(LedgerParseError::SyntaxError { line, detail }) => {
                return ProcessingOutcome::SyntaxError { line, detail };
            }
        };

        match check_roster(&ledger) {
            Ok(()) => ProcessingOutcome::Success(ledger),
            Err(outcome) => outcome,
        }
    }

    /// Settles the first `end` statements.
    ///
    /// Statements are replayed in order so each expense sees the roster as it
    /// was on its line. The settlement itself runs over the roster left at
    /// `end`; anyone who left earlier is no longer a participant.
    pub fn settle_prefix(
        &self,
        ledger: &Ledger<'_>,
        end: usize,
    ) -> Result<LedgerReport, LedgerEvaluationError> {
        let end = end.min(ledger.statements().len());
        let mut roster: IndexSet<&str> = ledger.members().iter().copied().collect();
        let mut expenses = Vec::new();
        let mut expense_lines = Vec::new();

        for stmt in &ledger.statements()[..end] {
            match &stmt.statement {
                LedgerStatement::Expense(entry) => {
                    expenses.push(resolve_expense(entry, &roster));
                    expense_lines.push(stmt.line);
                }
                LedgerStatement::Join(name) => {
                    roster.insert(*name);
                }
                LedgerStatement::Leave(name) => {
                    roster.shift_remove(*name);
                }
                LedgerStatement::Command(_) => {}
            }
        }

        let members: Vec<ParticipantId> = roster.iter().copied().map(ParticipantId::from).collect();
        let settlement = self
            .engine
            .compute(&members, &expenses)
            .map_err(|err| match err {
                SettlementError::InvalidExpense { index, reason } => {
                    LedgerEvaluationError::InvalidExpense {
                        line: expense_lines[index],
                        reason,
                    }
                }
                other => LedgerEvaluationError::Settlement(other),
            })?;

        tracing::debug!(
            statement_count = end,
            expense_count = expenses.len(),
            member_count = members.len(),
            "Ledger prefix settled"
        );

        Ok(LedgerReport {
            members,
            expenses,
            settlement,
        })
    }

    pub fn settle(&self, ledger: &Ledger<'_>) -> Result<LedgerReport, LedgerEvaluationError> {
        self.settle_prefix(ledger, ledger.statements().len())
    }

    pub fn convert(&self, amount: Money) -> Conversion {
        Conversion {
            amount,
            converted: self.exchange_rate.convert(amount, CONVERSION_SCALE),
            rate: self.exchange_rate.clone(),
        }
    }

    /// Evaluates every command in ledger order.
    ///
    /// The whole ledger is settled first, so an invalid expense anywhere
    /// fails the run before any output is produced. A ledger without
    /// commands yields its final settlement.
    pub fn run_commands(
        &self,
        ledger: &Ledger<'_>,
    ) -> Result<Vec<CommandResult>, LedgerEvaluationError> {
        let final_report = self.settle(ledger)?;

        if !ledger.has_commands() {
            let line = ledger
                .statements()
                .last()
                .map_or(ledger.members_line(), |stmt| stmt.line);
            return Ok(vec![CommandResult {
                line,
                output: CommandOutput::Settlement(final_report),
            }]);
        }

        let mut results = Vec::new();
        for (idx, stmt) in ledger.statements().iter().enumerate() {
            let LedgerStatement::Command(command) = &stmt.statement else {
                continue;
            };
            let output = match command {
                Command::Settle => CommandOutput::Settlement(self.settle_prefix(ledger, idx)?),
                Command::Balances => CommandOutput::Balances(self.settle_prefix(ledger, idx)?),
                Command::Expenses => CommandOutput::Expenses(self.settle_prefix(ledger, idx)?),
                Command::Convert(amount) => CommandOutput::Conversion(self.convert(*amount)),
            };
            results.push(CommandResult {
                line: stmt.line,
                output,
            });
        }
        Ok(results)
    }
}

fn check_roster<'b>(ledger: &Ledger<'b>) -> Result<(), ProcessingOutcome<'b>> {
    let mut roster: IndexSet<&'b str> = IndexSet::with_capacity(ledger.members().len());
    for &name in ledger.members() {
        if !roster.insert(name) {
            return Err(ProcessingOutcome::DuplicateMember {
                name,
                line: ledger.members_line(),
            });
        }
    }

    for stmt in ledger.statements() {
        match stmt.statement {
            LedgerStatement::Join(name) => {
                if !roster.insert(name) {
                    return Err(ProcessingOutcome::DuplicateMember {
                        name,
                        line: stmt.line,
                    });
                }
            }
            LedgerStatement::Leave(name) => {
                if !roster.shift_remove(name) {
                    return Err(ProcessingOutcome::UnknownMember {
                        name,
                        line: stmt.line,
                    });
                }
            }
            LedgerStatement::Expense(_) | LedgerStatement::Command(_) => {}
        }
    }
    Ok(())
}

fn resolve_expense(entry: &ExpenseEntry<'_>, roster: &IndexSet<&str>) -> Expense {
    let split: Vec<ParticipantId> = match &entry.split {
        SplitSpec::Default => roster.iter().copied().map(ParticipantId::from).collect(),
        SplitSpec::Everyone { except } => roster
            .iter()
            .copied()
            .filter(|name| !except.contains(name))
            .map(ParticipantId::from)
            .collect(),
        SplitSpec::Listed(names) => names.iter().copied().map(ParticipantId::from).collect(),
    };

    let expense = Expense::new(entry.amount, entry.payer, split);
    match entry.description {
        Some(description) => expense.with_description(description),
        None => expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerStatementWithLine;
    use rstest::{fixture, rstest};
    use seoulmate_domain::{InvalidExpenseReason, Transfer};

    struct StubParser(Result<Ledger<'static>, LedgerParseError>);

    impl LedgerParser for StubParser {
        fn parse<'a>(&self, _content: &'a str) -> Result<Ledger<'a>, LedgerParseError> {
            self.0.clone()
        }
    }

    static UNUSED_PARSER: StubParser = StubParser(Err(LedgerParseError::MissingMembersDeclaration));

    #[fixture]
    fn processor() -> LedgerProcessor<'static> {
        LedgerProcessor::new(&UNUSED_PARSER, SettlementContext::krw_default())
    }

    fn expense(
        line: usize,
        payer: &'static str,
        amount: i64,
        split: SplitSpec<'static>,
    ) -> LedgerStatementWithLine<'static> {
        LedgerStatementWithLine {
            line,
            statement: LedgerStatement::Expense(ExpenseEntry {
                payer,
                amount: Money::from_i64(amount),
                split,
                description: None,
            }),
        }
    }

    fn at(line: usize, statement: LedgerStatement<'static>) -> LedgerStatementWithLine<'static> {
        LedgerStatementWithLine { line, statement }
    }

    fn ledger(
        members: &[&'static str],
        statements: Vec<LedgerStatementWithLine<'static>>,
    ) -> Ledger<'static> {
        Ledger::new(members.to_vec(), 1, statements)
    }

    fn balance(report: &LedgerReport, name: &str) -> Money {
        report.settlement.balances[&ParticipantId::from(name)]
    }

    fn transfer(from: &str, to: &str, amount: i64) -> Transfer {
        Transfer {
            from: ParticipantId::from(from),
            to: ParticipantId::from(to),
            amount: Money::from_i64(amount),
        }
    }

    #[test]
    fn parse_ledger_maps_parser_errors() {
        let missing = StubParser(Err(LedgerParseError::MissingMembersDeclaration));
        let processor = LedgerProcessor::new(&missing, SettlementContext::krw_default());
        assert!(matches!(
            processor.parse_ledger("A paid 100"),
            ProcessingOutcome::MissingMembersDeclaration
        ));

        let syntax = StubParser(Err(LedgerParseError::SyntaxError {
            line: 3,
            detail: "stub".to_string(),
        }));
        let processor = LedgerProcessor::new(&syntax, SettlementContext::krw_default());
        let ProcessingOutcome::SyntaxError { line, detail } = processor.parse_ledger("unused")
        else {
            panic!("unexpected parse outcome");
        };
        assert_eq!(line, 3);
        assert_eq!(detail, "stub");
    }

    #[rstest]
    #[case::duplicate_in_members(ledger(&["A", "B", "A"], vec![]), "A", 1)]
    #[case::join_existing(
        ledger(&["A", "B"], vec![at(2, LedgerStatement::Join("B"))]),
        "B",
        2
    )]
    fn parse_ledger_rejects_duplicate_members(
        #[case] parsed: Ledger<'static>,
        #[case] expected_name: &str,
        #[case] expected_line: usize,
    ) {
        let parser = StubParser(Ok(parsed));
        let processor = LedgerProcessor::new(&parser, SettlementContext::krw_default());
        let ProcessingOutcome::DuplicateMember { name, line } = processor.parse_ledger("unused")
        else {
            panic!("unexpected parse outcome");
        };
        assert_eq!((name, line), (expected_name, expected_line));
    }

    #[rstest]
    #[case::never_member(ledger(&["A"], vec![at(2, LedgerStatement::Leave("Z"))]), 2)]
    #[case::left_twice(
        ledger(
            &["A", "B"],
            vec![
                at(2, LedgerStatement::Leave("B")),
                at(3, LedgerStatement::Leave("B")),
            ]
        ),
        3
    )]
    fn parse_ledger_rejects_unknown_leavers(
        #[case] parsed: Ledger<'static>,
        #[case] expected_line: usize,
    ) {
        let parser = StubParser(Ok(parsed));
        let processor = LedgerProcessor::new(&parser, SettlementContext::krw_default());
        assert!(matches!(
            processor.parse_ledger("unused"),
            ProcessingOutcome::UnknownMember { line, .. } if line == expected_line
        ));
    }

    #[test]
    fn parse_ledger_accepts_rejoining_member() {
        let parser = StubParser(Ok(ledger(
            &["A", "B"],
            vec![
                at(2, LedgerStatement::Leave("B")),
                at(3, LedgerStatement::Join("B")),
            ],
        )));
        let processor = LedgerProcessor::new(&parser, SettlementContext::krw_default());
        assert!(matches!(
            processor.parse_ledger("unused"),
            ProcessingOutcome::Success(_)
        ));
    }

    #[rstest]
    fn default_split_uses_current_roster(processor: LedgerProcessor<'static>) {
        let ledger = ledger(
            &["A", "B", "C"],
            vec![
                expense(2, "A", 90, SplitSpec::Default),
                expense(3, "B", 30, SplitSpec::Everyone { except: vec![] }),
            ],
        );

        let report = processor.settle(&ledger).expect("valid ledger");

        assert_eq!(balance(&report, "A"), Money::from_i64(50));
        assert_eq!(balance(&report, "B"), Money::from_i64(-10));
        assert_eq!(balance(&report, "C"), Money::from_i64(-40));
        assert_eq!(
            report.settlement.transfers,
            vec![transfer("C", "A", 40), transfer("B", "A", 10)]
        );
        assert_eq!(report.expenses.len(), 2);
    }

    #[rstest]
    fn everyone_except_removes_named_members(processor: LedgerProcessor<'static>) {
        let ledger = ledger(
            &["A", "B", "C"],
            vec![expense(
                2,
                "A",
                100,
                SplitSpec::Everyone { except: vec!["C"] },
            )],
        );

        let report = processor.settle(&ledger).expect("valid ledger");

        assert_eq!(balance(&report, "A"), Money::from_i64(50));
        assert_eq!(balance(&report, "B"), Money::from_i64(-50));
        assert_eq!(balance(&report, "C"), Money::ZERO);
    }

    #[rstest]
    fn joined_member_shares_only_later_expenses(processor: LedgerProcessor<'static>) {
        let ledger = ledger(
            &["A", "B"],
            vec![
                expense(2, "A", 100, SplitSpec::Default),
                at(3, LedgerStatement::Join("C")),
                expense(4, "C", 30, SplitSpec::Default),
            ],
        );

        let report = processor.settle(&ledger).expect("valid ledger");

        assert_eq!(balance(&report, "A"), Money::from_i64(40));
        assert_eq!(balance(&report, "B"), Money::from_i64(-60));
        assert_eq!(balance(&report, "C"), Money::from_i64(20));
        assert_eq!(
            report.settlement.transfers,
            vec![transfer("B", "A", 40), transfer("B", "C", 20)]
        );
    }

    #[rstest]
    fn departed_member_share_is_dropped(processor: LedgerProcessor<'static>) {
        let ledger = ledger(
            &["A", "B", "C"],
            vec![
                expense(2, "A", 90, SplitSpec::Default),
                at(3, LedgerStatement::Leave("C")),
            ],
        );

        let report = processor.settle(&ledger).expect("leniency is not an error");

        assert_eq!(report.members, vec![ParticipantId::from("A"), ParticipantId::from("B")]);
        assert_eq!(balance(&report, "A"), Money::from_i64(60));
        assert_eq!(balance(&report, "B"), Money::from_i64(-30));
        assert_eq!(report.settlement.unattributed(), Money::from_i64(30));
        assert_eq!(report.settlement.transfers, vec![transfer("B", "A", 30)]);
    }

    #[rstest]
    fn prefix_ignores_later_statements(processor: LedgerProcessor<'static>) {
        let ledger = ledger(
            &["A", "B"],
            vec![
                expense(2, "A", 100, SplitSpec::Default),
                expense(3, "B", 100, SplitSpec::Default),
            ],
        );

        let report = processor.settle_prefix(&ledger, 1).expect("valid ledger");
        assert_eq!(report.settlement.transfers, vec![transfer("B", "A", 50)]);

        let report = processor.settle(&ledger).expect("valid ledger");
        assert!(report.settlement.is_settled());
    }

    #[rstest]
    #[case::negative(
        expense(4, "A", -100, SplitSpec::Default),
        InvalidExpenseReason::NegativeAmount(Money::from_i64(-100))
    )]
    #[case::everyone_excluded(
        expense(4, "A", 100, SplitSpec::Everyone { except: vec!["A", "B"] }),
        InvalidExpenseReason::EmptySplit
    )]
    fn invalid_expense_reports_its_line(
        processor: LedgerProcessor<'static>,
        #[case] bad: LedgerStatementWithLine<'static>,
        #[case] expected_reason: InvalidExpenseReason,
    ) {
        let ledger = ledger(
            &["A", "B"],
            vec![
                expense(2, "A", 100, SplitSpec::Default),
                at(3, LedgerStatement::Command(Command::Settle)),
                bad,
            ],
        );

        assert_eq!(
            processor.run_commands(&ledger),
            Err(LedgerEvaluationError::InvalidExpense {
                line: 4,
                reason: expected_reason,
            })
        );
    }

    #[rstest]
    fn commands_see_the_ledger_up_to_their_line(processor: LedgerProcessor<'static>) {
        let ledger = ledger(
            &["A", "B"],
            vec![
                expense(2, "A", 100, SplitSpec::Default),
                at(3, LedgerStatement::Command(Command::Settle)),
                expense(4, "B", 40, SplitSpec::Default),
                at(5, LedgerStatement::Command(Command::Balances)),
                at(
                    6,
                    LedgerStatement::Command(Command::Convert(Money::from_i64(50_000))),
                ),
            ],
        );

        let results = processor.run_commands(&ledger).expect("valid ledger");
        let lines: Vec<usize> = results.iter().map(|result| result.line).collect();
        assert_eq!(lines, vec![3, 5, 6]);

        let CommandOutput::Settlement(first) = &results[0].output else {
            panic!("expected a settlement");
        };
        assert_eq!(first.settlement.transfers, vec![transfer("B", "A", 50)]);

        let CommandOutput::Balances(second) = &results[1].output else {
            panic!("expected balances");
        };
        assert_eq!(balance(second, "A"), Money::from_i64(30));

        let CommandOutput::Conversion(conversion) = &results[2].output else {
            panic!("expected a conversion");
        };
        assert_eq!(conversion.converted, Money::from_i64(1200));
    }

    #[rstest]
    fn ledger_without_commands_yields_final_settlement(processor: LedgerProcessor<'static>) {
        let ledger = ledger(&["A", "B"], vec![expense(2, "A", 100, SplitSpec::Default)]);

        let results = processor.run_commands(&ledger).expect("valid ledger");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].line, 2);
        assert!(matches!(
            &results[0].output,
            CommandOutput::Settlement(report) if report.settlement.transfers == vec![transfer("B", "A", 50)]
        ));
    }

    #[test]
    fn convert_uses_configured_rate() {
        let rate = ExchangeRate::try_new("KRW", "JPY", Money::new(11, 2).as_decimal())
            .expect("valid rate");
        let processor = LedgerProcessor::new(&UNUSED_PARSER, SettlementContext::krw_default())
            .with_exchange_rate(rate);

        let conversion = processor.convert(Money::from_i64(1000));

        assert_eq!(conversion.rate.quote(), "JPY");
        assert_eq!(conversion.converted, Money::from_i64(110));
    }
}

#![warn(clippy::uninlined_format_args)]

mod i18n;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_until, take_while1},
    character::complete::{char, digit1, multispace1, satisfy},
    combinator::{map_res, not, opt, recognize, verify},
    multi::{many0, separated_list1},
    sequence::{delimited, terminated},
};
use rust_decimal::Decimal;

/// Who an expense is split among, as written.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SplitClause<'a> {
    /// No `for ...` clause.
    #[default]
    Unspecified,
    Everyone {
        except: Vec<&'a str>,
    },
    Listed(Vec<&'a str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseStatement<'a> {
    pub payer: &'a str,
    pub amount: Decimal,
    pub split: SplitClause<'a>,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Settle,
    Balances,
    Expenses,
    Convert(Decimal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    Members(Vec<&'a str>),
    Expense(ExpenseStatement<'a>),
    Join(&'a str),
    Leave(&'a str),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program<'a> {
    pub statements: Vec<StatementWithLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

// Letters of any script, so Hangul names work as-is.
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| terminated(tag_no_case(word), not(satisfy(is_name_char))).parse(input)
}

fn sp(input: &str) -> IResult<&str, &str> {
    fn comment(input: &str) -> IResult<&str, &str> {
        delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
    }

    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    recognize(many0(alt((multispace1, comment, line_comment)))).parse(input)
}

fn list_separator(input: &str) -> IResult<&str, &str> {
    (sp, alt((tag(","), tag("，"))), sp)
        .map(|(_, sep, _)| sep)
        .parse(input)
}

fn name_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(list_separator, identifier).parse(input)
}

// ₩1,234.5원
fn amount(input: &str) -> IResult<&str, Decimal> {
    let number = map_res(
        recognize((
            opt(char('-')),
            digit1,
            many0((char(','), digit1)),
            opt((char('.'), digit1)),
        )),
        |text: &str| text.replace(',', "").parse::<Decimal>(),
    );
    (
        opt(char('₩')),
        number,
        opt((sp, alt((tag("원"), keyword("won"), keyword("krw"))))),
    )
        .map(|(_, amount, _)| amount)
        .parse(input)
}

fn split_clause(input: &str) -> IResult<&str, SplitClause<'_>> {
    let everyone = (
        keyword("everyone"),
        opt((sp, keyword("except"), sp, name_list)),
    )
        .map(|(_, except)| SplitClause::Everyone {
            except: except.map(|(_, _, _, names)| names).unwrap_or_default(),
        });

    (
        keyword("for"),
        sp,
        alt((everyone, name_list.map(SplitClause::Listed))),
    )
        .map(|(_, _, split)| split)
        .parse(input)
}

// MEMBERS := A, B, C
fn members(input: &str) -> IResult<&str, Vec<&str>> {
    (keyword("members"), sp, tag(":="), sp, name_list)
        .map(|(_, _, _, _, names)| names)
        .parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"'), char('"')).parse(input)
}

// {payer} paid {amount} [for ...] ["memo"]
fn expense(input: &str) -> IResult<&str, ExpenseStatement<'_>> {
    (
        identifier,
        sp,
        keyword("paid"),
        sp,
        amount,
        opt((sp, split_clause)),
        opt((sp, quoted)),
    )
        .map(
            |(payer, _, _, _, amount, split, description)| ExpenseStatement {
                payer,
                amount,
                split: split.map(|(_, split)| split).unwrap_or_default(),
                description: description.map(|(_, text)| text.trim()),
            },
        )
        .parse(input)
}

fn roster_change(input: &str) -> IResult<&str, Statement<'_>> {
    alt((
        (keyword("!join"), sp, identifier).map(|(_, _, name)| Statement::Join(name)),
        (keyword("!leave"), sp, identifier).map(|(_, _, name)| Statement::Leave(name)),
    ))
    .parse(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        alt((keyword("!settle"), keyword("!정산"))).map(|_| Command::Settle),
        alt((keyword("!balances"), keyword("!잔액"))).map(|_| Command::Balances),
        alt((keyword("!expenses"), keyword("!지출"))).map(|_| Command::Expenses),
        (
            alt((keyword("!convert"), keyword("!환전"))),
            sp,
            verify(amount, |amount: &Decimal| !amount.is_sign_negative()),
        )
            .map(|(_, _, amount)| Command::Convert(amount)),
    ))
    .parse(input)
}

fn statement(input: &str) -> IResult<&str, Statement<'_>> {
    alt((
        members.map(Statement::Members),
        expense.map(Statement::Expense),
        roster_change,
        command.map(Statement::Command),
    ))
    .parse(input)
}

fn statement_with_sp(input: &str) -> IResult<&str, Statement<'_>> {
    (sp, statement, sp).map(|(_, stmt, _)| stmt).parse(input)
}

/// Parses a ledger script, one statement per line.
///
/// Ordering rules (members first, roster changes) are not checked here.
pub fn parse_program(input: &str) -> Result<Program<'_>, ParseError> {
    let mut statements = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let (rest, _) = sp(line).map_err(|e| ParseError::SyntaxError {
            line: idx + 1,
            detail: i18n::syntax_error_detail(e),
        })?;
        if rest.trim().is_empty() {
            continue;
        }
        match statement_with_sp(rest) {
            Ok((rest, stmt)) => {
                if !rest.trim().is_empty() {
                    return Err(ParseError::SyntaxError {
                        line: idx + 1,
                        detail: i18n::syntax_error_unparsed_detail(rest.trim()),
                    });
                }
                statements.push(StatementWithLine {
                    line: idx + 1,
                    statement: stmt,
                });
            }
            Err(e) => {
                return Err(ParseError::SyntaxError {
                    line: idx + 1,
                    detail: i18n::syntax_error_detail(e),
                });
            }
        }
    }

    Ok(Program { statements })
}

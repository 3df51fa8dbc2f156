#[cfg(all(feature = "ko", feature = "en"))]
compile_error!("Cannot enable both 'ko' and 'en' features at the same time");

#[cfg(feature = "ko")]
pub mod strings {
    pub const MEMBER: &str = "멤버";
    pub const PAID: &str = "결제";
    pub const SHARE: &str = "부담";
    pub const BALANCE: &str = "잔액";
    pub const FROM: &str = "보내는 사람";
    pub const TO: &str = "받는 사람";
    pub const AMOUNT: &str = "금액";
    pub const MEMO: &str = "메모";
    pub const PAYER: &str = "결제자";
    pub const NO_EXPENSES: &str = "기록된 지출이 없습니다.";
    pub const TOTAL_SPENT: &str = "총 지출";
    pub const UNATTRIBUTED: &str = "귀속되지 않은 금액";
    pub const ALL_SETTLED: &str = "정산할 금액이 없습니다.";
    pub const SETTLEMENT_CALCULATION_FAILED: &str = "정산 계산에 실패했습니다";
    pub const MISSING_MEMBERS_DECLARATION: &str =
        "첫 문장에 `MEMBERS := ...` 선언이 필요합니다.";
    pub const MEMBERS_REDECLARED: &str = "`MEMBERS := ...` 선언은 한 번만 할 수 있습니다";
}

#[cfg(not(feature = "ko"))]
pub mod strings {
    pub const MEMBER: &str = "Member";
    pub const PAID: &str = "Paid";
    pub const SHARE: &str = "Share";
    pub const BALANCE: &str = "Balance";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const MEMO: &str = "Memo";
    pub const PAYER: &str = "Paid by";
    pub const NO_EXPENSES: &str = "No expenses recorded.";
    pub const TOTAL_SPENT: &str = "Total spent";
    pub const UNATTRIBUTED: &str = "Unattributed";
    pub const ALL_SETTLED: &str = "Nobody owes anything.";
    pub const SETTLEMENT_CALCULATION_FAILED: &str = "Settlement calculation failed";
    pub const MISSING_MEMBERS_DECLARATION: &str =
        "The ledger must start with a `MEMBERS := ...` declaration.";
    pub const MEMBERS_REDECLARED: &str = "`MEMBERS := ...` may only be declared once";
}

pub use strings::*;

pub struct SyntaxErrorMessage {
    line: usize,
    detail: String,
}

pub struct MemberMessage<'a> {
    kind: MemberMessageKind,
    name: &'a str,
    line: usize,
}

enum MemberMessageKind {
    Unknown,
    Duplicate,
}

pub struct InvalidExpenseMessage<'a> {
    line: usize,
    reason: &'a dyn std::fmt::Display,
}

pub struct HeadingMessage {
    kind: HeadingKind,
    line: usize,
}

enum HeadingKind {
    Settlement,
    Balances,
    Expenses,
    Conversion,
}

pub struct ConversionMessage<'a> {
    amount: &'a dyn std::fmt::Display,
    base: &'a str,
    converted: &'a dyn std::fmt::Display,
    quote: &'a str,
    rate: &'a dyn std::fmt::Display,
}

pub fn syntax_error(line: usize, detail: String) -> SyntaxErrorMessage {
    SyntaxErrorMessage { line, detail }
}

pub fn unknown_member(name: &str, line: usize) -> MemberMessage<'_> {
    MemberMessage {
        kind: MemberMessageKind::Unknown,
        name,
        line,
    }
}

pub fn duplicate_member(name: &str, line: usize) -> MemberMessage<'_> {
    MemberMessage {
        kind: MemberMessageKind::Duplicate,
        name,
        line,
    }
}

pub fn invalid_expense(line: usize, reason: &dyn std::fmt::Display) -> InvalidExpenseMessage<'_> {
    InvalidExpenseMessage { line, reason }
}

pub fn settlement_heading(line: usize) -> HeadingMessage {
    HeadingMessage {
        kind: HeadingKind::Settlement,
        line,
    }
}

pub fn balances_heading(line: usize) -> HeadingMessage {
    HeadingMessage {
        kind: HeadingKind::Balances,
        line,
    }
}

pub fn expenses_heading(line: usize) -> HeadingMessage {
    HeadingMessage {
        kind: HeadingKind::Expenses,
        line,
    }
}

pub fn conversion_heading(line: usize) -> HeadingMessage {
    HeadingMessage {
        kind: HeadingKind::Conversion,
        line,
    }
}

pub fn conversion<'a>(
    amount: &'a dyn std::fmt::Display,
    base: &'a str,
    converted: &'a dyn std::fmt::Display,
    quote: &'a str,
    rate: &'a dyn std::fmt::Display,
) -> ConversionMessage<'a> {
    ConversionMessage {
        amount,
        base,
        converted,
        quote,
        rate,
    }
}

#[cfg(feature = "ko")]
impl std::fmt::Display for SyntaxErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "구문 오류 ({}행): {}", self.line, self.detail)
    }
}

#[cfg(feature = "ko")]
impl std::fmt::Display for MemberMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MemberMessageKind::Unknown => {
                write!(f, "{}행: '{}'은(는) 멤버가 아닙니다", self.line, self.name)
            }
            MemberMessageKind::Duplicate => {
                write!(f, "{}행: '{}'은(는) 이미 멤버입니다", self.line, self.name)
            }
        }
    }
}

#[cfg(feature = "ko")]
impl std::fmt::Display for InvalidExpenseMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}행의 지출이 올바르지 않습니다: {}", self.line, self.reason)
    }
}

#[cfg(feature = "ko")]
impl std::fmt::Display for HeadingMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            HeadingKind::Settlement => write!(f, "== 정산 ({}행) ==", self.line),
            HeadingKind::Balances => write!(f, "== 잔액 ({}행) ==", self.line),
            HeadingKind::Expenses => write!(f, "== 지출 내역 ({}행) ==", self.line),
            HeadingKind::Conversion => write!(f, "== 환전 ({}행) ==", self.line),
        }
    }
}

#[cfg(feature = "ko")]
impl std::fmt::Display for ConversionMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ≈ {} {} (1 {} ≈ {} {})",
            self.amount, self.base, self.converted, self.quote, self.base, self.rate, self.quote
        )
    }
}

#[cfg(not(feature = "ko"))]
impl std::fmt::Display for SyntaxErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Syntax error at line {}: {}", self.line, self.detail)
    }
}

#[cfg(not(feature = "ko"))]
impl std::fmt::Display for MemberMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MemberMessageKind::Unknown => {
                write!(f, "'{}' is not a member (line {})", self.name, self.line)
            }
            MemberMessageKind::Duplicate => {
                write!(f, "'{}' is already a member (line {})", self.name, self.line)
            }
        }
    }
}

#[cfg(not(feature = "ko"))]
impl std::fmt::Display for InvalidExpenseMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid expense at line {}: {}", self.line, self.reason)
    }
}

#[cfg(not(feature = "ko"))]
impl std::fmt::Display for HeadingMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            HeadingKind::Settlement => write!(f, "== Settlement (line {}) ==", self.line),
            HeadingKind::Balances => write!(f, "== Balances (line {}) ==", self.line),
            HeadingKind::Expenses => write!(f, "== Expenses (line {}) ==", self.line),
            HeadingKind::Conversion => write!(f, "== Conversion (line {}) ==", self.line),
        }
    }
}

#[cfg(not(feature = "ko"))]
impl std::fmt::Display for ConversionMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ≈ {} {} (1 {} ≈ {} {})",
            self.amount, self.base, self.converted, self.quote, self.base, self.rate, self.quote
        )
    }
}

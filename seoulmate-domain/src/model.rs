use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use arcstr::ArcStr;
use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};

/// Trip member identifier. Display names double as ids, so two members
/// with the same name are the same participant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(ArcStr);

impl ParticipantId {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&ParticipantId> for ParticipantId {
    fn from(value: &ParticipantId) -> Self {
        value.clone()
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed monetary amount in the trip currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// `Money::new(1250, 2)` is `12.50`.
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// `None` when the sum leaves the representable range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// One equal part of `self` split `parts` ways. `parts` must be non-zero.
    pub fn split_evenly(self, parts: usize) -> Self {
        debug_assert!(parts > 0);
        Self(self.0 / Decimal::from(parts as u64))
    }

    pub fn round_dp_with_strategy(self, scale: u32, strategy: RoundingStrategy) -> Self {
        Self(self.0.round_dp_with_strategy(scale, strategy))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Per-participant amounts, iterated in roster order.
pub type ParticipantBalances = IndexMap<ParticipantId, Money>;

/// A shared cost fronted by `payer` and divided equally among `split_among`.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub amount: Money,
    pub payer: ParticipantId,
    pub split_among: Vec<ParticipantId>,
    pub description: Option<String>,
}

impl Expense {
    pub fn new<P, I, S>(amount: Money, payer: P, split_among: I) -> Self
    where
        P: Into<ParticipantId>,
        I: IntoIterator<Item = S>,
        S: Into<ParticipantId>,
    {
        Self {
            amount,
            payer: payer.into(),
            split_among: split_among.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantSummary<'a> {
    pub id: &'a ParticipantId,
    pub paid: Money,
    pub share: Money,
    pub balance: Money,
}

/// Result of one settlement computation.
///
/// `balances`, `total_paid` and `total_share` share the roster's key order.
/// `balances[p] == total_paid[p] - total_share[p]` holds exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementReport {
    pub balances: ParticipantBalances,
    pub total_paid: ParticipantBalances,
    pub total_share: ParticipantBalances,
    pub transfers: Vec<Transfer>,
    pub total_spent: Money,
}

impl SettlementReport {
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.balances.keys()
    }

    pub fn summary(&self, id: &ParticipantId) -> Option<ParticipantSummary<'_>> {
        let (id, balance) = self.balances.get_key_value(id)?;
        Some(ParticipantSummary {
            id,
            paid: self.total_paid.get(id).copied().unwrap_or(Money::ZERO),
            share: self.total_share.get(id).copied().unwrap_or(Money::ZERO),
            balance: *balance,
        })
    }

    pub fn summaries(&self) -> impl Iterator<Item = ParticipantSummary<'_>> + '_ {
        self.balances.keys().filter_map(|id| self.summary(id))
    }

    /// Net amount that could not be attributed to a roster member.
    ///
    /// Non-zero only when an expense references someone outside the roster:
    /// a known payer is credited in full while unknown split members are not
    /// charged.
    pub fn unattributed(&self) -> Money {
        self.balances.values().sum()
    }

    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Balances left over once every transfer has been paid.
    pub fn balances_after_transfers(&self) -> ParticipantBalances {
        let mut remaining = self.balances.clone();
        for transfer in &self.transfers {
            if let Some(balance) = remaining.get_mut(&transfer.from) {
                *balance += transfer.amount;
            }
            if let Some(balance) = remaining.get_mut(&transfer.to) {
                *balance -= transfer.amount;
            }
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whole("100", "100")]
    #[case::trailing_zeros("12.500", "12.5")]
    #[case::negative("-40", "-40")]
    #[case::negative_zero("-0.00", "0")]
    fn money_displays_normalized(#[case] input: &str, #[case] expected: &str) {
        let money: Money = input.parse().expect("valid decimal");
        assert_eq!(money.to_string(), expected);
    }

    #[test]
    fn split_evenly_keeps_fraction() {
        let share = Money::from_i64(100).split_evenly(3);
        assert!(share > Money::new(3333, 2));
        assert!(share < Money::new(3334, 2));
    }

    #[test]
    fn balances_after_transfers_debits_and_credits() {
        let a = ParticipantId::from("A");
        let b = ParticipantId::from("B");
        let report = SettlementReport {
            balances: ParticipantBalances::from_iter([
                (a.clone(), Money::from_i64(50)),
                (b.clone(), Money::from_i64(-50)),
            ]),
            total_paid: ParticipantBalances::from_iter([
                (a.clone(), Money::from_i64(100)),
                (b.clone(), Money::ZERO),
            ]),
            total_share: ParticipantBalances::from_iter([
                (a.clone(), Money::from_i64(50)),
                (b.clone(), Money::from_i64(50)),
            ]),
            transfers: vec![Transfer {
                from: b.clone(),
                to: a.clone(),
                amount: Money::from_i64(50),
            }],
            total_spent: Money::from_i64(100),
        };

        let remaining = report.balances_after_transfers();
        assert!(remaining.values().all(|balance| balance.is_zero()));
        assert_eq!(report.unattributed(), Money::ZERO);

        let summary = report.summary(&b).expect("B is on the roster");
        assert_eq!(summary.paid, Money::ZERO);
        assert_eq!(summary.share, Money::from_i64(50));
        assert_eq!(summary.balance, Money::from_i64(-50));
    }
}

use crate::{
    error::{InvalidExpenseReason, SettlementError},
    model::{Expense, Money, ParticipantBalances, ParticipantId},
};
use fxhash::FxHashSet;

/// Paid/share totals per roster member, accumulated expense by expense.
pub struct BalanceAccumulator {
    total_paid: ParticipantBalances,
    total_share: ParticipantBalances,
    total_spent: Money,
}

/// Final per-participant figures of a roster snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceSheet {
    pub balances: ParticipantBalances,
    pub total_paid: ParticipantBalances,
    pub total_share: ParticipantBalances,
    pub total_spent: Money,
}

impl BalanceAccumulator {
    /// Seeds a zero entry for every participant, keeping roster order.
    pub fn new(participants: &[ParticipantId]) -> Result<Self, SettlementError> {
        let mut total_paid = ParticipantBalances::with_capacity(participants.len());
        for participant in participants {
            if total_paid
                .insert(participant.clone(), Money::ZERO)
                .is_some()
            {
                return Err(SettlementError::DuplicateParticipant(participant.clone()));
            }
        }
        let total_share = total_paid.clone();

        Ok(Self {
            total_paid,
            total_share,
            total_spent: Money::ZERO,
        })
    }

    /// Credits the payer and charges each split member an equal share.
    ///
    /// Names missing from the roster are skipped: an unknown payer is not
    /// credited and an unknown split member is not charged, but still counts
    /// towards the divisor. On error nothing is applied.
    pub fn apply(&mut self, index: usize, expense: &Expense) -> Result<(), SettlementError> {
        validate_expense(index, expense)?;

        let overflow = || SettlementError::InvalidExpense {
            index,
            reason: InvalidExpenseReason::AmountOverflow(expense.amount),
        };

        let mut seen = FxHashSet::default();
        let sharers: Vec<&ParticipantId> = expense
            .split_among
            .iter()
            .filter(|member| seen.insert(*member))
            .collect();
        let share = expense.amount.split_evenly(sharers.len());

        let total_spent = self
            .total_spent
            .checked_add(expense.amount)
            .ok_or_else(overflow)?;

        let paid_update = match self.total_paid.get_full(&expense.payer) {
            Some((slot, _, paid)) => {
                Some((slot, paid.checked_add(expense.amount).ok_or_else(overflow)?))
            }
            None => {
                tracing::warn!(
                    expense_index = index,
                    payer = %expense.payer,
                    amount = %expense.amount,
                    "Payer is not on the roster; amount is not credited"
                );
                None
            }
        };

        let mut share_updates = Vec::with_capacity(sharers.len());
        for member in sharers {
            match self.total_share.get_full(member) {
                Some((slot, _, total)) => {
                    share_updates.push((slot, total.checked_add(share).ok_or_else(overflow)?));
                }
                None => tracing::warn!(
                    expense_index = index,
                    member = %member,
                    share = %share,
                    "Split member is not on the roster; share is dropped"
                ),
            }
        }

        self.total_spent = total_spent;
        if let Some((slot, paid)) = paid_update {
            self.total_paid[slot] = paid;
        }
        for (slot, total) in share_updates {
            self.total_share[slot] = total;
        }

        Ok(())
    }

    pub fn total_paid(&self) -> &ParticipantBalances {
        &self.total_paid
    }

    pub fn total_share(&self) -> &ParticipantBalances {
        &self.total_share
    }

    pub fn total_spent(&self) -> Money {
        self.total_spent
    }

    pub fn balances(&self) -> ParticipantBalances {
        self.total_paid
            .iter()
            .map(|(id, paid)| {
                let share = self.total_share.get(id).copied().unwrap_or(Money::ZERO);
                (id.clone(), *paid - share)
            })
            .collect()
    }

    pub fn finish(self) -> BalanceSheet {
        BalanceSheet {
            balances: self.balances(),
            total_paid: self.total_paid,
            total_share: self.total_share,
            total_spent: self.total_spent,
        }
    }
}

fn validate_expense(index: usize, expense: &Expense) -> Result<(), SettlementError> {
    if expense.amount.is_negative() {
        return Err(SettlementError::InvalidExpense {
            index,
            reason: InvalidExpenseReason::NegativeAmount(expense.amount),
        });
    }
    if expense.split_among.is_empty() {
        return Err(SettlementError::InvalidExpense {
            index,
            reason: InvalidExpenseReason::EmptySplit,
        });
    }
    Ok(())
}

use std::borrow::Cow;

use crate::{
    error::SettlementError,
    model::{Expense, ParticipantId, SettlementReport},
    services::{
        BalanceAccumulator, RemainderPolicy, SettlementCalculator, SettlementContext,
        SettlementRoundingError, quantize_balances,
    },
};

/// Computes settlement reports from a roster snapshot and its expenses.
///
/// Stateless apart from its [`SettlementContext`]; inputs are never mutated,
/// so one engine can serve any number of callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementEngine {
    context: SettlementContext,
}

impl SettlementEngine {
    pub fn new(context: SettlementContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> SettlementContext {
        self.context
    }

    /// Balances, paid/share breakdown and the transfers that settle them.
    ///
    /// Fails without a partial result when the roster has duplicates or an
    /// expense has a negative amount or an empty split. References to names
    /// outside `participants` are ignored (see [`BalanceAccumulator::apply`]).
    pub fn compute(
        &self,
        participants: &[ParticipantId],
        expenses: &[Expense],
    ) -> Result<SettlementReport, SettlementError> {
        self.context.validate()?;

        let mut accumulator = BalanceAccumulator::new(participants)?;
        for (index, expense) in expenses.iter().enumerate() {
            accumulator.apply(index, expense)?;
        }
        let sheet = accumulator.finish();

        let netting_balances = match self.context.remainder_policy {
            RemainderPolicy::AcceptSlack => Cow::Borrowed(&sheet.balances),
            RemainderPolicy::ZeroSumCarry => match quantize_balances(&sheet.balances, self.context)
            {
                Ok(quantized) => Cow::Owned(quantized),
                Err(SettlementRoundingError::ImbalancedTotal(total)) => {
                    tracing::warn!(
                        unattributed = %total,
                        "Balances do not net to zero; settling without remainder carry"
                    );
                    Cow::Borrowed(&sheet.balances)
                }
                Err(err) => return Err(err.into()),
            },
        };

        let transfers = SettlementCalculator.calculate(&netting_balances, self.context);

        tracing::debug!(
            participant_count = participants.len(),
            expense_count = expenses.len(),
            transfer_count = transfers.len(),
            total_spent = %sheet.total_spent,
            remainder_policy = ?self.context.remainder_policy,
            "Settlement computed"
        );

        Ok(SettlementReport {
            balances: sheet.balances,
            total_paid: sheet.total_paid,
            total_share: sheet.total_share,
            transfers,
            total_spent: sheet.total_spent,
        })
    }
}

/// [`SettlementEngine::compute`] with the default whole-won context.
pub fn compute_settlement(
    participants: &[ParticipantId],
    expenses: &[Expense],
) -> Result<SettlementReport, SettlementError> {
    SettlementEngine::default().compute(participants, expenses)
}

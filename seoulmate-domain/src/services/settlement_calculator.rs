use crate::{
    model::{Money, ParticipantBalances, ParticipantId, Transfer},
    services::SettlementContext,
};
use rust_decimal::Decimal;

/// Greedy debt netting.
pub struct SettlementCalculator;

impl SettlementCalculator {
    /// Builds the transfer list that settles `balances`.
    ///
    /// Debtors are visited most-negative first and creditors largest first;
    /// equal balances keep roster order. Each step moves as much as the
    /// current pair allows, so every step retires at least one side. Amounts
    /// are rounded to the atomic unit only when a transfer is emitted, and a
    /// step that rounds to nothing is not emitted.
    ///
    /// The result is minimal for this strategy, not globally minimal.
    pub fn calculate(
        &self,
        balances: &ParticipantBalances,
        context: SettlementContext,
    ) -> Vec<Transfer> {
        let epsilon = context.epsilon();

        let mut debtors: Vec<(&ParticipantId, Decimal)> = balances
            .iter()
            .map(|(id, balance)| (id, balance.as_decimal()))
            .filter(|(_, balance)| *balance < -epsilon)
            .collect();
        let mut creditors: Vec<(&ParticipantId, Decimal)> = balances
            .iter()
            .map(|(id, balance)| (id, balance.as_decimal()))
            .filter(|(_, balance)| *balance > epsilon)
            .collect();

        // Stable sorts: ties stay in roster order.
        debtors.sort_by(|(_, a), (_, b)| a.cmp(b));
        creditors.sort_by(|(_, a), (_, b)| b.cmp(a));

        let mut transfers = Vec::with_capacity(debtors.len() + creditors.len());
        let (mut i, mut j) = (0, 0);

        while i < debtors.len() && j < creditors.len() {
            let (debtor, owed) = debtors[i];
            let (creditor, credit) = creditors[j];
            let amount = (-owed).min(credit);

            let rounded = context.round(Money::from_decimal(amount));
            if rounded.is_positive() {
                transfers.push(Transfer {
                    from: debtor.clone(),
                    to: creditor.clone(),
                    amount: rounded,
                });
            } else {
                tracing::debug!(
                    from = %debtor,
                    to = %creditor,
                    amount = %amount,
                    "Skipping transfer that rounds to zero"
                );
            }

            debtors[i].1 += amount;
            creditors[j].1 -= amount;

            if debtors[i].1.abs() < epsilon {
                i += 1;
            }
            if creditors[j].1 < epsilon {
                j += 1;
            }
        }

        transfers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn calculator() -> SettlementCalculator {
        SettlementCalculator
    }

    fn balances(entries: &[(&str, i64)]) -> ParticipantBalances {
        entries
            .iter()
            .map(|(name, amount)| (ParticipantId::from(*name), Money::from_i64(*amount)))
            .collect()
    }

    fn transfers(entries: &[(&str, &str, i64)]) -> Vec<Transfer> {
        entries
            .iter()
            .map(|(from, to, amount)| Transfer {
                from: ParticipantId::from(*from),
                to: ParticipantId::from(*to),
                amount: Money::from_i64(*amount),
            })
            .collect()
    }

    #[rstest]
    #[case::simple_pair(&[("A", 50), ("B", -50)], &[("B", "A", 50)])]
    #[case::all_zero(&[("A", 0), ("B", 0)], &[])]
    #[case::empty(&[], &[])]
    #[case::most_negative_first(
        &[("A", 50), ("B", -10), ("C", -40)],
        &[("C", "A", 40), ("B", "A", 10)]
    )]
    #[case::largest_creditor_first(
        &[("A", -100), ("B", 30), ("C", 70)],
        &[("A", "C", 70), ("A", "B", 30)]
    )]
    #[case::debtor_spans_creditors(
        &[("A", 60), ("B", 40), ("C", -70), ("D", -30)],
        &[("C", "A", 60), ("C", "B", 10), ("D", "B", 30)]
    )]
    #[case::ties_keep_roster_order(
        &[("A", -20), ("B", -20), ("C", 20), ("D", 20)],
        &[("A", "C", 20), ("B", "D", 20)]
    )]
    fn greedy_netting_cases(
        calculator: SettlementCalculator,
        #[case] input: &[(&str, i64)],
        #[case] expected: &[(&str, &str, i64)],
    ) {
        let result = calculator.calculate(&balances(input), SettlementContext::krw_default());
        assert_eq!(result, transfers(expected));
    }

    #[rstest]
    fn near_zero_balances_are_treated_as_settled(calculator: SettlementCalculator) {
        let input: ParticipantBalances = [
            (ParticipantId::from("A"), Money::new(5, 3)),
            (ParticipantId::from("B"), Money::new(-5, 3)),
        ]
        .into_iter()
        .collect();

        assert!(
            calculator
                .calculate(&input, SettlementContext::krw_default())
                .is_empty()
        );
    }

    #[rstest]
    fn sub_unit_steps_are_not_emitted(calculator: SettlementCalculator) {
        let input: ParticipantBalances = [
            (ParticipantId::from("A"), Money::new(30, 2)),
            (ParticipantId::from("B"), Money::new(-30, 2)),
        ]
        .into_iter()
        .collect();

        assert!(
            calculator
                .calculate(&input, SettlementContext::krw_default())
                .is_empty()
        );
    }

    #[rstest]
    fn fractional_amounts_round_at_emission(calculator: SettlementCalculator) {
        let input: ParticipantBalances = [
            (ParticipantId::from("A"), Money::new(6667, 2)),
            (ParticipantId::from("B"), Money::new(-3333, 2)),
            (ParticipantId::from("C"), Money::new(-3334, 2)),
        ]
        .into_iter()
        .collect();

        let result = calculator.calculate(&input, SettlementContext::krw_default());
        assert_eq!(result, transfers(&[("C", "A", 33), ("B", "A", 33)]));
    }
}

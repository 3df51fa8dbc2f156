use crate::text_table::{Alignment, TextTableBuilder, combine_sections_vertically};
use seoulmate_domain::{Expense, Money, SettlementContext, SettlementReport, Transfer};
use seoulmate_i18n as i18n;
use std::borrow::Cow;

pub struct SettlementPresenter;

pub struct SettlementView {
    pub balance_table: String,
    pub transfer_table: Option<String>,
    pub summary: String,
}

impl SettlementView {
    pub fn to_text(&self) -> String {
        let transfers = self.transfer_table.as_deref().unwrap_or(i18n::ALL_SETTLED);
        combine_sections_vertically(&[self.balance_table.as_str(), transfers, self.summary.as_str()])
            .unwrap_or_default()
    }
}

impl SettlementPresenter {
    pub fn render(report: &SettlementReport) -> SettlementView {
        Self::render_with_context(report, SettlementContext::krw_default())
    }

    /// Amounts are shown rounded to `context`; the report itself stays exact.
    pub fn render_with_context(
        report: &SettlementReport,
        context: SettlementContext,
    ) -> SettlementView {
        let transfer_table = if report.transfers.is_empty() {
            None
        } else {
            Some(Self::build_transfer_table(&report.transfers, context))
        };

        SettlementView {
            balance_table: Self::build_balance_table(report, context),
            transfer_table,
            summary: Self::build_summary(report, context),
        }
    }

    pub fn build_balance_table(report: &SettlementReport, context: SettlementContext) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::MEMBER),
                Cow::Borrowed(i18n::PAID),
                Cow::Borrowed(i18n::SHARE),
                Cow::Borrowed(i18n::BALANCE),
            ]);

        for summary in report.summaries() {
            builder = builder.row([
                Cow::Borrowed(summary.id.as_str()),
                Cow::Owned(format_amount(summary.paid, context)),
                Cow::Owned(format_amount(summary.share, context)),
                Cow::Owned(format_signed_amount(summary.balance, context)),
            ]);
        }

        builder.build()
    }

    pub fn build_transfer_table(transfers: &[Transfer], context: SettlementContext) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::FROM),
                Cow::Borrowed(i18n::TO),
                Cow::Borrowed(i18n::AMOUNT),
            ]);

        for transfer in transfers {
            builder = builder.row([
                Cow::Borrowed(transfer.from.as_str()),
                Cow::Borrowed(transfer.to.as_str()),
                Cow::Owned(format_amount(transfer.amount, context)),
            ]);
        }

        builder.build()
    }

    /// Memo, payer and amount per expense, `None` when nothing was spent.
    pub fn build_expense_table(expenses: &[Expense], context: SettlementContext) -> Option<String> {
        if expenses.is_empty() {
            return None;
        }

        let builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::MEMO),
                Cow::Borrowed(i18n::PAYER),
                Cow::Borrowed(i18n::AMOUNT),
            ])
            .rows(expenses.iter().map(|expense| {
                [
                    Cow::Borrowed(expense.description.as_deref().unwrap_or("-")),
                    Cow::Borrowed(expense.payer.as_str()),
                    Cow::Owned(format_amount(expense.amount, context)),
                ]
            }));

        Some(builder.build())
    }

    pub fn build_summary(report: &SettlementReport, context: SettlementContext) -> String {
        let mut summary = format!(
            "{}: {}",
            i18n::TOTAL_SPENT,
            format_amount(report.total_spent, context)
        );

        let unattributed = context.round(report.unattributed());
        if !unattributed.is_zero() {
            summary.push('\n');
            summary.push_str(&format!(
                "{}: {}",
                i18n::UNATTRIBUTED,
                format_amount(unattributed, context)
            ));
        }
        summary
    }
}

pub(crate) fn format_amount(amount: Money, context: SettlementContext) -> String {
    group_thousands(&context.round(amount).to_string())
}

fn format_signed_amount(amount: Money, context: SettlementContext) -> String {
    let rounded = context.round(amount);
    let sign = if rounded.is_positive() { "+" } else { "" };
    format!("{sign}{}", group_thousands(&rounded.to_string()))
}

fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(number.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use seoulmate_domain::{Expense, ParticipantId, compute_settlement};

    fn sample_report() -> SettlementReport {
        let roster: Vec<ParticipantId> = ["Minji", "Jisoo", "Tom"]
            .into_iter()
            .map(ParticipantId::from)
            .collect();
        compute_settlement(
            &roster,
            &[
                Expense::new(Money::from_i64(90_000), "Minji", ["Minji", "Jisoo", "Tom"]),
                Expense::new(Money::from_i64(30_000), "Jisoo", ["Minji", "Jisoo", "Tom"]),
            ],
        )
        .expect("valid input")
    }

    #[rstest]
    #[case::small("7", "7")]
    #[case::thousands("90000", "90,000")]
    #[case::millions("1234567", "1,234,567")]
    #[case::negative("-40000", "-40,000")]
    #[case::fraction("1234.56", "1,234.56")]
    #[case::exact_group("100", "100")]
    fn test_group_thousands(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(group_thousands(input), expected);
    }

    #[test]
    fn render_lists_every_member_and_transfer() {
        let view = SettlementPresenter::render(&sample_report());

        let balance_lines: Vec<&str> = view.balance_table.lines().collect();
        assert_eq!(balance_lines.len(), 5);
        assert!(balance_lines[2].starts_with("Minji"));
        assert!(balance_lines[2].ends_with("+50,000"));
        assert!(balance_lines[4].ends_with("-40,000"));

        let transfers = view.transfer_table.expect("transfer table");
        let transfer_lines: Vec<&str> = transfers.lines().collect();
        assert_eq!(transfer_lines.len(), 4);
        assert!(transfer_lines[2].starts_with("Tom"));
        assert!(transfer_lines[3].starts_with("Jisoo"));

        assert!(view.summary.contains("120,000"));
        assert_eq!(view.summary.lines().count(), 1);
    }

    #[test]
    fn zero_balance_has_no_sign() {
        let context = SettlementContext::krw_default();
        assert_eq!(format_signed_amount(Money::ZERO, context), "0");
        assert_eq!(format_signed_amount(Money::new(-4, 1), context), "0");
        assert_eq!(format_signed_amount(Money::from_i64(1_500), context), "+1,500");
    }

    #[test]
    fn expense_table_lists_memo_payer_and_amount() {
        let expenses = [
            Expense::new(Money::from_i64(90_000), "Minji", ["Minji", "Tom"])
                .with_description("삼겹살"),
            Expense::new(Money::from_i64(12_000), "Tom", ["Tom"]),
        ];

        let table =
            SettlementPresenter::build_expense_table(&expenses, SettlementContext::krw_default())
                .expect("expense table");

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(i18n::MEMO));
        assert!(lines[2].starts_with("삼겹살"));
        assert!(lines[2].contains("Minji"));
        assert!(lines[2].ends_with("90,000"));
        assert!(lines[3].starts_with('-'));
        assert!(lines[3].contains("Tom"));
        assert!(lines[3].ends_with("12,000"));
    }

    #[test]
    fn no_expenses_means_no_expense_table() {
        assert!(
            SettlementPresenter::build_expense_table(&[], SettlementContext::krw_default())
                .is_none()
        );
    }

    #[test]
    fn settled_report_has_no_transfer_table() {
        let roster = [ParticipantId::from("A")];
        let report = compute_settlement(&roster, &[Expense::new(Money::from_i64(10), "A", ["A"])])
            .expect("valid input");

        let view = SettlementPresenter::render(&report);

        assert!(view.transfer_table.is_none());
        assert!(view.to_text().contains(i18n::ALL_SETTLED));
    }

    #[test]
    fn unattributed_amount_is_reported() {
        let roster = [ParticipantId::from("A")];
        let report = compute_settlement(
            &roster,
            &[Expense::new(Money::from_i64(100), "A", ["A", "Gone"])],
        )
        .expect("leniency is not an error");

        let view = SettlementPresenter::render(&report);

        assert!(view.summary.contains(i18n::UNATTRIBUTED));
        assert!(view.summary.ends_with("50"));
    }

    #[test]
    fn fractional_shares_are_rounded_for_display() {
        let roster: Vec<ParticipantId> =
            ["A", "B", "C"].into_iter().map(ParticipantId::from).collect();
        let report = compute_settlement(
            &roster,
            &[Expense::new(Money::from_i64(100), "A", ["A", "B", "C"])],
        )
        .expect("valid input");

        let table = SettlementPresenter::build_balance_table(&report, SettlementContext::krw_default());

        assert!(table.lines().nth(3).is_some_and(|line| line.ends_with("-33")));
        assert!(!table.contains("33.3"));
    }
}

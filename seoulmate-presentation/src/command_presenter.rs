use crate::settlement_presenter::{SettlementPresenter, format_amount};
use seoulmate_application::{CommandOutput, CommandResult, Conversion};
use seoulmate_domain::SettlementContext;
use seoulmate_i18n as i18n;

pub struct CommandPresenter;

impl CommandPresenter {
    /// Heading line followed by the command's body.
    pub fn render(result: &CommandResult, context: SettlementContext) -> String {
        match &result.output {
            CommandOutput::Settlement(report) => {
                let view = SettlementPresenter::render_with_context(&report.settlement, context);
                format!("{}\n{}", i18n::settlement_heading(result.line), view.to_text())
            }
            CommandOutput::Balances(report) => {
                let view = SettlementPresenter::render_with_context(&report.settlement, context);
                format!(
                    "{}\n{}\n\n{}",
                    i18n::balances_heading(result.line),
                    view.balance_table,
                    view.summary
                )
            }
            CommandOutput::Expenses(report) => {
                let table = SettlementPresenter::build_expense_table(&report.expenses, context)
                    .unwrap_or_else(|| i18n::NO_EXPENSES.to_string());
                format!(
                    "{}\n{table}\n\n{}",
                    i18n::expenses_heading(result.line),
                    SettlementPresenter::build_summary(&report.settlement, context)
                )
            }
            CommandOutput::Conversion(conversion) => format!(
                "{}\n{}",
                i18n::conversion_heading(result.line),
                Self::render_conversion(conversion, context)
            ),
        }
    }

    pub fn render_conversion(conversion: &Conversion, context: SettlementContext) -> String {
        let amount = format_amount(conversion.amount, context);
        let converted = format_amount(conversion.converted, SettlementContext {
            scale: conversion.converted.as_decimal().scale(),
            ..context
        });
        let rate = conversion.rate.rate().normalize();
        i18n::conversion(
            &amount,
            conversion.rate.base(),
            &converted,
            conversion.rate.quote(),
            &rate,
        )
        .to_string()
    }
}

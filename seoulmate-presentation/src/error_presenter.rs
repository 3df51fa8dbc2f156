use seoulmate_application::{LedgerEvaluationError, ProcessingOutcome};
use seoulmate_i18n as i18n;

/// Message for a failed parse, `None` on success.
pub fn format_processing_error(outcome: &ProcessingOutcome<'_>) -> Option<String> {
    match outcome {
        ProcessingOutcome::Success(_) => None,
        ProcessingOutcome::MissingMembersDeclaration => {
            Some(i18n::MISSING_MEMBERS_DECLARATION.to_string())
        }
        ProcessingOutcome::SyntaxError { line, detail } => {
            Some(i18n::syntax_error(*line, detail.clone()).to_string())
        }
        ProcessingOutcome::UnknownMember { name, line } => {
            Some(i18n::unknown_member(name, *line).to_string())
        }
        ProcessingOutcome::DuplicateMember { name, line } => {
            Some(i18n::duplicate_member(name, *line).to_string())
        }
    }
}

pub fn format_evaluation_error(error: &LedgerEvaluationError) -> String {
    match error {
        LedgerEvaluationError::InvalidExpense { line, reason } => {
            i18n::invalid_expense(*line, reason).to_string()
        }
        LedgerEvaluationError::Settlement(err) => {
            format!("{}: {err}", i18n::SETTLEMENT_CALCULATION_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use seoulmate_application::Ledger;
    use seoulmate_domain::{
        InvalidExpenseReason, Money, ParticipantId, SettlementError, SettlementRoundingError,
    };

    #[rstest]
    #[case::syntax(ProcessingOutcome::SyntaxError { line: 4, detail: "oops".to_string() }, "4")]
    #[case::unknown(ProcessingOutcome::UnknownMember { name: "Tom", line: 6 }, "Tom")]
    #[case::duplicate(ProcessingOutcome::DuplicateMember { name: "Hana", line: 2 }, "Hana")]
    #[case::missing(
        ProcessingOutcome::MissingMembersDeclaration,
        "MEMBERS"
    )]
    fn processing_errors_name_the_problem(
        #[case] outcome: ProcessingOutcome<'static>,
        #[case] expected_fragment: &str,
    ) {
        let message = format_processing_error(&outcome).expect("error message");
        assert!(message.contains(expected_fragment), "{message}");
    }

    #[test]
    fn success_has_no_message() {
        let outcome = ProcessingOutcome::Success(Ledger::new(vec!["A"], 1, vec![]));
        assert!(format_processing_error(&outcome).is_none());
    }

    #[rstest]
    #[case::invalid_expense(
        LedgerEvaluationError::InvalidExpense {
            line: 12,
            reason: InvalidExpenseReason::NegativeAmount(Money::from_i64(-5)),
        },
        "12"
    )]
    #[case::duplicate_participant(
        LedgerEvaluationError::Settlement(SettlementError::DuplicateParticipant(
            ParticipantId::from("A")
        )),
        "'A'"
    )]
    #[case::rounding(
        LedgerEvaluationError::Settlement(SettlementError::Rounding(
            SettlementRoundingError::InvalidAdjustmentCount
        )),
        i18n::SETTLEMENT_CALCULATION_FAILED
    )]
    fn evaluation_errors_are_formatted(
        #[case] error: LedgerEvaluationError,
        #[case] expected_fragment: &str,
    ) {
        let message = format_evaluation_error(&error);
        assert!(message.contains(expected_fragment), "{message}");
    }
}

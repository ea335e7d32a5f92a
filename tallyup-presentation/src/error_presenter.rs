use tallyup_application::{SettlementOptimizationError, SheetParseError};
use tallyup_i18n as i18n;

pub fn format_sheet_parse_error(error: &SheetParseError<'_>) -> String {
    match error {
        SheetParseError::MissingParticipants => i18n::MISSING_PARTICIPANTS.to_string(),
        SheetParseError::DuplicateParticipant { name } => i18n::duplicate_participant(name),
        SheetParseError::ReservedParticipantName { name } => {
            i18n::reserved_participant_name(name)
        }
        SheetParseError::ParticipantsRedeclared { line } => {
            i18n::at_line(*line, i18n::participants_redeclared()).to_string()
        }
        SheetParseError::UndefinedName { name, line } => {
            i18n::at_line(*line, i18n::undefined_name(name)).to_string()
        }
        SheetParseError::PayerNotParticipant { name, line } => {
            i18n::at_line(*line, i18n::payer_not_participant(name)).to_string()
        }
        SheetParseError::NameAlreadyDefined { name, line } => {
            i18n::at_line(*line, i18n::name_already_defined(name)).to_string()
        }
        SheetParseError::FailedToEvaluateGroup { name, line } => {
            i18n::at_line(*line, i18n::failed_to_evaluate_group(name)).to_string()
        }
        SheetParseError::NonPositiveAmount { amount, line } => {
            i18n::at_line(*line, i18n::non_positive_amount(amount)).to_string()
        }
        SheetParseError::EmptySplit { line } => {
            i18n::at_line(*line, i18n::empty_split()).to_string()
        }
        SheetParseError::AmountOverflow { line } => {
            i18n::at_line(*line, i18n::amount_overflow()).to_string()
        }
        SheetParseError::SyntaxError { line, detail } => {
            i18n::syntax_error(*line, detail.clone()).to_string()
        }
    }
}

pub fn format_settlement_error(err: &SettlementOptimizationError) -> String {
    match err {
        SettlementOptimizationError::ImbalancedTotal(total) => {
            format!("{} (total: {total})", i18n::SETTLEMENT_CALCULATION_FAILED)
        }
        SettlementOptimizationError::Unsettled => format!(
            "{}: {}",
            i18n::SETTLEMENT_CALCULATION_FAILED,
            i18n::SETTLEMENT_INCOMPLETE
        ),
        SettlementOptimizationError::QuantizationImbalancedTotal { total } => {
            i18n::settlement_quantization_imbalanced(total)
        }
        SettlementOptimizationError::QuantizationInvalidAdjustmentCount => {
            i18n::SETTLEMENT_QUANTIZATION_INVALID_ADJUSTMENT.to_string()
        }
        SettlementOptimizationError::QuantizationZeroSumInvariantViolation => {
            i18n::SETTLEMENT_QUANTIZATION_ZERO_SUM_INVARIANT.to_string()
        }
        SettlementOptimizationError::QuantizationNonIntegral => {
            i18n::SETTLEMENT_QUANTIZATION_NON_INTEGRAL.to_string()
        }
        SettlementOptimizationError::QuantizationOutOfRange => {
            i18n::SETTLEMENT_QUANTIZATION_FAILED.to_string()
        }
        SettlementOptimizationError::QuantizationUnsupportedScale {
            scale,
            max_supported,
        } => i18n::settlement_quantization_unsupported_scale(*scale, *max_supported),
    }
}

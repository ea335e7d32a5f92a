use tallyup_domain::{LedgerBuildError, Money, SettlementRoundingError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetParseError<'a> {
    #[error("no participants declared")]
    MissingParticipants,
    #[error("participant '{name}' is declared more than once")]
    DuplicateParticipant { name: &'a str },
    #[error("'{name}' is reserved and cannot be a participant")]
    ReservedParticipantName { name: &'a str },
    #[error("participants are declared again at line {line}")]
    ParticipantsRedeclared { line: usize },
    #[error("undefined name '{name}' at line {line}")]
    UndefinedName { name: &'a str, line: usize },
    #[error("'{name}' at line {line} is not a participant")]
    PayerNotParticipant { name: &'a str, line: usize },
    #[error("'{name}' at line {line} is already defined")]
    NameAlreadyDefined { name: &'a str, line: usize },
    #[error("failed to evaluate group '{name}' at line {line}")]
    FailedToEvaluateGroup { name: &'a str, line: usize },
    #[error("amount at line {line} must be positive (found {amount})")]
    NonPositiveAmount { amount: Money, line: usize },
    #[error("expense at line {line} is split between nobody")]
    EmptySplit { line: usize },
    #[error("expenses up to line {line} exceed the representable total")]
    AmountOverflow { line: usize },
    #[error("syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

impl SheetParseError<'_> {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingParticipants
            | Self::DuplicateParticipant { .. }
            | Self::ReservedParticipantName { .. } => None,
            Self::ParticipantsRedeclared { line }
            | Self::UndefinedName { line, .. }
            | Self::PayerNotParticipant { line, .. }
            | Self::NameAlreadyDefined { line, .. }
            | Self::FailedToEvaluateGroup { line, .. }
            | Self::NonPositiveAmount { line, .. }
            | Self::EmptySplit { line }
            | Self::AmountOverflow { line }
            | Self::SyntaxError { line, .. } => Some(*line),
        }
    }
}

impl<'a> From<LedgerBuildError<'a>> for SheetParseError<'a> {
    fn from(err: LedgerBuildError<'a>) -> Self {
        match err {
            LedgerBuildError::MissingParticipants => Self::MissingParticipants,
            LedgerBuildError::DuplicateParticipant { name } => Self::DuplicateParticipant { name },
            LedgerBuildError::ReservedParticipantName { name } => {
                Self::ReservedParticipantName { name }
            }
            LedgerBuildError::UndefinedName { name, line } => Self::UndefinedName { name, line },
            LedgerBuildError::PayerNotParticipant { name, line } => {
                Self::PayerNotParticipant { name, line }
            }
            LedgerBuildError::NameAlreadyDefined { name, line } => {
                Self::NameAlreadyDefined { name, line }
            }
            LedgerBuildError::FailedToEvaluateGroup { name, line } => {
                Self::FailedToEvaluateGroup { name, line }
            }
            LedgerBuildError::NonPositiveAmount { amount, line } => {
                Self::NonPositiveAmount { amount, line }
            }
            LedgerBuildError::EmptySplit { line } => Self::EmptySplit { line },
            LedgerBuildError::AmountOverflow { line } => Self::AmountOverflow { line },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementOptimizationError {
    #[error("balances do not sum to zero (total {0} minor units)")]
    ImbalancedTotal(i128),
    #[error("transfers leave balances outstanding")]
    Unsettled,
    #[error("balances do not sum to zero before rounding (total {total})")]
    QuantizationImbalancedTotal { total: Money },
    #[error("rounding drift cannot be repaired")]
    QuantizationInvalidAdjustmentCount,
    #[error("rounded balances do not sum to zero")]
    QuantizationZeroSumInvariantViolation,
    #[error("rounded balance is not a whole number of minor units")]
    QuantizationNonIntegral,
    #[error("balance does not fit in 64-bit minor units")]
    QuantizationOutOfRange,
    #[error("scale {scale} is not supported (max {max_supported})")]
    QuantizationUnsupportedScale { scale: u32, max_supported: u32 },
}

impl From<SettlementRoundingError> for SettlementOptimizationError {
    fn from(err: SettlementRoundingError) -> Self {
        match err {
            SettlementRoundingError::ImbalancedTotal(total) => {
                Self::QuantizationImbalancedTotal { total }
            }
            SettlementRoundingError::InvalidAdjustmentCount => {
                Self::QuantizationInvalidAdjustmentCount
            }
            SettlementRoundingError::ZeroSumInvariantViolation => {
                Self::QuantizationZeroSumInvariantViolation
            }
            SettlementRoundingError::NonIntegral => Self::QuantizationNonIntegral,
            SettlementRoundingError::UnsupportedScale {
                scale,
                max_supported,
            } => Self::QuantizationUnsupportedScale {
                scale,
                max_supported,
            },
        }
    }
}

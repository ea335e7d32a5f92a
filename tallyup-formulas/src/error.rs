use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("{field} must not be zero")]
    DivisionByZero { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("{field} is out of range ({detail})")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("arrival must be after departure")]
    NonPositiveDuration,
    #[error("local time does not exist at the given offset")]
    InvalidLocalTime,
    #[error("trial count {0} is outside 1..=1000000")]
    TrialCount(u32),
    #[error("step count {0} is outside 1..=10000")]
    StepCount(u32),
    #[error("{trials} trials of {steps} steps exceed the simulation budget")]
    SimulationTooLarge { trials: u32, steps: u32 },
    #[error("result does not fit in a decimal")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, FormulaError>;

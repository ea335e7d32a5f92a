//! Single-formula calculators: percentages, travel times, trip costs,
//! personal finance, and a Monte Carlo exposure simulator.
//!
//! Money and percentages are `Decimal` and rounded to two places only when
//! a result is produced. The simulator works in `f64`.

mod cost;
mod error;
mod exposure;
mod finance;
mod percentage;
mod travel;

pub use cost::{
    CommuteComparison, CommuteInput, CommuteMode, CommuteModeCost, ModeBreakdown, RentalCarCost,
    RentalCarInput, compare_commute, rental_car_cost,
};
pub use error::{FormulaError, Result};
pub use exposure::{
    DEFAULT_CONFIDENCE, ExposurePoint, ExposureProfile, ExposureSimulation, MAX_PATH_STEPS,
    MAX_STEPS, MAX_TRIALS, simulate_exposure,
};
pub use finance::{
    FutureValue, FutureValueInput, HealthGrade, HealthInput, HealthScore, financial_health_score,
    future_value,
};
pub use percentage::{
    decimal_to_percent, percent_error, percentage_point_difference, relative_change,
};
pub use travel::{
    BufferStatus, BufferTime, FlightDuration, TIGHT_CONNECTION_MINUTES, TimezoneDifference,
    at_offset, buffer_time, flight_duration, timezone_difference,
};

use rust_decimal::{Decimal, RoundingStrategy};

pub(crate) const RESULT_SCALE: u32 = 2;

pub(crate) fn round_result(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn ensure_non_negative(value: Decimal, field: &'static str) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(FormulaError::Negative { field });
    }
    Ok(value)
}

pub(crate) fn ensure_positive(value: Decimal, field: &'static str) -> Result<Decimal> {
    if value <= Decimal::ZERO {
        return Err(FormulaError::NonPositive { field });
    }
    Ok(value)
}

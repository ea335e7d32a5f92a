use crate::{FormulaError, Result, round_result};
use rust_decimal::Decimal;

/// `|observed - true| / |true| * 100`.
pub fn percent_error(observed: Decimal, true_value: Decimal) -> Result<Decimal> {
    if true_value.is_zero() {
        return Err(FormulaError::DivisionByZero { field: "true value" });
    }
    let error = observed
        .checked_sub(true_value)
        .and_then(|diff| diff.abs().checked_div(true_value.abs()))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(FormulaError::Overflow)?;
    Ok(round_result(error))
}

/// Signed change from `old` to `new` relative to `|old|`, in percent.
pub fn relative_change(old: Decimal, new: Decimal) -> Result<Decimal> {
    if old.is_zero() {
        return Err(FormulaError::DivisionByZero { field: "original value" });
    }
    let change = new
        .checked_sub(old)
        .and_then(|diff| diff.checked_div(old.abs()))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(FormulaError::Overflow)?;
    Ok(round_result(change))
}

pub fn percentage_point_difference(old_percent: Decimal, new_percent: Decimal) -> Result<Decimal> {
    new_percent
        .checked_sub(old_percent)
        .map(round_result)
        .ok_or(FormulaError::Overflow)
}

pub fn decimal_to_percent(value: Decimal) -> Result<Decimal> {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(round_result)
        .ok_or(FormulaError::Overflow)
}

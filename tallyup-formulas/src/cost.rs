use crate::{FormulaError, Result, ensure_non_negative, round_result};
use rust_decimal::Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RentalCarInput {
    pub daily_rate: Decimal,
    pub days: u32,
    pub insurance_per_day: Decimal,
    pub included_miles_per_day: Decimal,
    pub miles_driven: Decimal,
    pub per_mile_overage: Decimal,
    pub fees: Decimal,
    pub tax_rate_percent: Decimal,
}

impl RentalCarInput {
    fn validate(&self) -> Result<()> {
        if self.days == 0 {
            return Err(FormulaError::NonPositive { field: "days" });
        }
        ensure_non_negative(self.daily_rate, "daily rate")?;
        ensure_non_negative(self.insurance_per_day, "insurance per day")?;
        ensure_non_negative(self.included_miles_per_day, "included miles per day")?;
        ensure_non_negative(self.miles_driven, "miles driven")?;
        ensure_non_negative(self.per_mile_overage, "per-mile overage")?;
        ensure_non_negative(self.fees, "fees")?;
        ensure_non_negative(self.tax_rate_percent, "tax rate")?;
        if self.tax_rate_percent > Decimal::ONE_HUNDRED {
            return Err(FormulaError::OutOfRange {
                field: "tax rate",
                detail: "at most 100%",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RentalCarCost {
    pub base: Decimal,
    pub insurance: Decimal,
    pub overage_miles: Decimal,
    pub mileage: Decimal,
    pub fees: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

pub fn rental_car_cost(input: &RentalCarInput) -> Result<RentalCarCost> {
    input.validate()?;

    let days = Decimal::from(input.days);
    let base = checked_mul(input.daily_rate, days)?;
    let insurance = checked_mul(input.insurance_per_day, days)?;
    let allowance = checked_mul(input.included_miles_per_day, days)?;
    // Non-negative operands; the difference cannot overflow.
    let overage_miles = (input.miles_driven - allowance).max(Decimal::ZERO);
    let mileage = checked_mul(overage_miles, input.per_mile_overage)?;
    let subtotal = checked_sum(&[base, insurance, mileage, input.fees])?;
    let tax = checked_mul(subtotal, input.tax_rate_percent)? / Decimal::ONE_HUNDRED;

    let subtotal = round_result(subtotal);
    let tax = round_result(tax);
    Ok(RentalCarCost {
        base: round_result(base),
        insurance: round_result(insurance),
        overage_miles,
        mileage: round_result(mileage),
        fees: round_result(input.fees),
        subtotal,
        tax,
        total: subtotal.checked_add(tax).ok_or(FormulaError::Overflow)?,
    })
}

fn checked_mul(lhs: Decimal, rhs: Decimal) -> Result<Decimal> {
    lhs.checked_mul(rhs).ok_or(FormulaError::Overflow)
}

fn checked_sum(values: &[Decimal]) -> Result<Decimal> {
    values.iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(*value).ok_or(FormulaError::Overflow)
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommuteMode {
    Bus,
    Train,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommuteModeCost {
    pub fare_per_traveler: Decimal,
    pub luggage_fee: Decimal,
    pub hours: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommuteInput {
    pub bus: CommuteModeCost,
    pub train: CommuteModeCost,
    pub travelers: u32,
    /// Value of one traveler-hour; zero compares tickets only.
    pub value_of_time_per_hour: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeBreakdown {
    pub ticket_total: Decimal,
    pub time_cost: Decimal,
    pub generalized_cost: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommuteComparison {
    pub bus: ModeBreakdown,
    pub train: ModeBreakdown,
    /// `None` when both modes cost the same.
    pub cheaper: Option<CommuteMode>,
    pub savings: Decimal,
}

fn mode_breakdown(
    mode: &CommuteModeCost,
    travelers: Decimal,
    value_of_time: Decimal,
) -> Result<ModeBreakdown> {
    ensure_non_negative(mode.fare_per_traveler, "fare")?;
    ensure_non_negative(mode.luggage_fee, "luggage fee")?;
    ensure_non_negative(mode.hours, "travel hours")?;

    let fares = checked_mul(mode.fare_per_traveler, travelers)?;
    let ticket_total = round_result(checked_sum(&[fares, mode.luggage_fee])?);
    let time_cost = round_result(checked_mul(
        checked_mul(mode.hours, value_of_time)?,
        travelers,
    )?);
    Ok(ModeBreakdown {
        ticket_total,
        time_cost,
        generalized_cost: checked_sum(&[ticket_total, time_cost])?,
    })
}

pub fn compare_commute(input: &CommuteInput) -> Result<CommuteComparison> {
    if input.travelers == 0 {
        return Err(FormulaError::NonPositive { field: "travelers" });
    }
    let value_of_time = ensure_non_negative(input.value_of_time_per_hour, "value of time")?;
    let travelers = Decimal::from(input.travelers);

    let bus = mode_breakdown(&input.bus, travelers, value_of_time)?;
    let train = mode_breakdown(&input.train, travelers, value_of_time)?;

    let cheaper = match bus.generalized_cost.cmp(&train.generalized_cost) {
        std::cmp::Ordering::Less => Some(CommuteMode::Bus),
        std::cmp::Ordering::Greater => Some(CommuteMode::Train),
        std::cmp::Ordering::Equal => None,
    };

    Ok(CommuteComparison {
        bus,
        train,
        cheaper,
        savings: (bus.generalized_cost - train.generalized_cost).abs(),
    })
}

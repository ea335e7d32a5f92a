use crate::CliResult;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use clap::Subcommand;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use tallyup_formulas::{
    BufferStatus, CommuteInput, CommuteMode, CommuteModeCost, ExposureSimulation,
    FutureValueInput, HealthInput, RentalCarInput,
};

#[derive(Debug, Subcommand)]
pub enum CalcCommand {
    /// |observed - true| / |true| as a percentage.
    #[command(allow_negative_numbers = true)]
    PercentError {
        #[arg(long)]
        observed: Decimal,
        #[arg(long = "true")]
        true_value: Decimal,
    },
    /// Change from an original value, relative to its magnitude.
    #[command(allow_negative_numbers = true)]
    RelativeChange {
        #[arg(long)]
        old: Decimal,
        #[arg(long)]
        new: Decimal,
    },
    /// Difference between two percentages, in points.
    #[command(allow_negative_numbers = true)]
    PointDifference {
        #[arg(long)]
        old: Decimal,
        #[arg(long)]
        new: Decimal,
    },
    #[command(allow_negative_numbers = true)]
    ToPercent { value: Decimal },
    /// Flight time between two RFC 3339 timestamps with offsets.
    Flight {
        #[arg(long)]
        departure: DateTime<FixedOffset>,
        #[arg(long)]
        arrival: DateTime<FixedOffset>,
    },
    /// Converts a wall-clock time between two UTC offsets.
    Timezone {
        #[arg(long)]
        time: NaiveDateTime,
        #[arg(long, allow_hyphen_values = true)]
        from: FixedOffset,
        #[arg(long, allow_hyphen_values = true)]
        to: FixedOffset,
    },
    /// Slack in a connection after the minimum connection time.
    Buffer {
        #[arg(long)]
        arrival: DateTime<FixedOffset>,
        #[arg(long)]
        departure: DateTime<FixedOffset>,
        #[arg(long, default_value_t = 60)]
        minimum_minutes: i64,
    },
    Rental {
        #[arg(long)]
        daily_rate: Decimal,
        #[arg(long)]
        days: u32,
        #[arg(long, default_value = "0")]
        insurance_per_day: Decimal,
        #[arg(long, default_value = "0")]
        included_miles_per_day: Decimal,
        #[arg(long, default_value = "0")]
        miles: Decimal,
        #[arg(long, default_value = "0")]
        per_mile: Decimal,
        #[arg(long, default_value = "0")]
        fees: Decimal,
        #[arg(long, default_value = "0")]
        tax_percent: Decimal,
    },
    /// Bus against train, tickets plus the value of travel time.
    Commute {
        #[arg(long)]
        bus_fare: Decimal,
        #[arg(long)]
        bus_hours: Decimal,
        #[arg(long, default_value = "0")]
        bus_luggage: Decimal,
        #[arg(long)]
        train_fare: Decimal,
        #[arg(long)]
        train_hours: Decimal,
        #[arg(long, default_value = "0")]
        train_luggage: Decimal,
        #[arg(long, default_value_t = 1)]
        travelers: u32,
        #[arg(long, default_value = "0")]
        value_of_time: Decimal,
    },
    /// 0-100 score from monthly figures.
    Health {
        #[arg(long)]
        income: Decimal,
        #[arg(long, default_value = "0")]
        savings: Decimal,
        #[arg(long, default_value = "0")]
        debt: Decimal,
        #[arg(long)]
        expenses: Decimal,
        #[arg(long, default_value = "0")]
        housing: Decimal,
        #[arg(long, default_value = "0")]
        emergency_fund: Decimal,
    },
    FutureValue {
        #[arg(long, default_value = "0")]
        principal: Decimal,
        #[arg(long, default_value = "0")]
        contribution: Decimal,
        #[arg(long)]
        rate_percent: Decimal,
        #[arg(long, default_value_t = 12)]
        periods_per_year: u32,
        #[arg(long)]
        years: u32,
    },
    /// Monte Carlo expected and potential future exposure of a forward.
    #[command(allow_negative_numbers = true)]
    Exposure {
        #[arg(long)]
        spot: Option<f64>,
        #[arg(long)]
        strike: Option<f64>,
        #[arg(long)]
        notional: Option<f64>,
        #[arg(long)]
        drift: Option<f64>,
        #[arg(long)]
        volatility: Option<f64>,
        #[arg(long)]
        horizon_years: Option<f64>,
        #[arg(long)]
        steps: Option<u32>,
        #[arg(long)]
        trials: Option<u32>,
        #[arg(long)]
        confidence: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl CalcCommand {
    pub fn run(self) -> CliResult<String> {
        let mut out = String::new();
        match self {
            Self::PercentError {
                observed,
                true_value,
            } => {
                let error = tallyup_formulas::percent_error(observed, true_value)
                    .map_err(|err| err.to_string())?;
                let _ = writeln!(out, "Percent error: {error:.2}%");
            }
            Self::RelativeChange { old, new } => {
                let change = tallyup_formulas::relative_change(old, new)
                    .map_err(|err| err.to_string())?;
                let _ = writeln!(out, "Relative change: {change:+.2}%");
            }
            Self::PointDifference { old, new } => {
                let points = tallyup_formulas::percentage_point_difference(old, new)
                    .map_err(|err| err.to_string())?;
                let _ = writeln!(out, "Difference: {points:+.2} percentage points");
            }
            Self::ToPercent { value } => {
                let percent =
                    tallyup_formulas::decimal_to_percent(value).map_err(|err| err.to_string())?;
                let _ = writeln!(out, "{percent:.2}%");
            }
            Self::Flight { departure, arrival } => {
                let duration = tallyup_formulas::flight_duration(departure, arrival)
                    .map_err(|err| err.to_string())?;
                let _ = writeln!(
                    out,
                    "Flight time: {}h {:02}m",
                    duration.hours(),
                    duration.minutes()
                );
            }
            Self::Timezone { time, from, to } => {
                let diff = tallyup_formulas::timezone_difference(time, from, to)
                    .map_err(|err| err.to_string())?;
                let sign = if diff.offset_minutes < 0 { '-' } else { '+' };
                let minutes = diff.offset_minutes.abs();
                let _ = writeln!(
                    out,
                    "Offset difference: {sign}{}h {:02}m",
                    minutes / 60,
                    minutes % 60
                );
                let _ = writeln!(out, "Local time at destination: {}", diff.converted);
            }
            Self::Buffer {
                arrival,
                departure,
                minimum_minutes,
            } => {
                let minimum = TimeDelta::try_minutes(minimum_minutes)
                    .ok_or("minimum connection time is out of range")?;
                let buffer = tallyup_formulas::buffer_time(arrival, departure, minimum)
                    .map_err(|err| err.to_string())?;
                let status = match buffer.status {
                    BufferStatus::Insufficient => "insufficient",
                    BufferStatus::Tight => "tight",
                    BufferStatus::Comfortable => "comfortable",
                };
                let _ = writeln!(out, "Layover: {} min", buffer.layover.num_minutes());
                let _ = writeln!(out, "Buffer: {} min ({status})", buffer.buffer.num_minutes());
            }
            Self::Rental {
                daily_rate,
                days,
                insurance_per_day,
                included_miles_per_day,
                miles,
                per_mile,
                fees,
                tax_percent,
            } => {
                let cost = tallyup_formulas::rental_car_cost(&RentalCarInput {
                    daily_rate,
                    days,
                    insurance_per_day,
                    included_miles_per_day,
                    miles_driven: miles,
                    per_mile_overage: per_mile,
                    fees,
                    tax_rate_percent: tax_percent,
                })
                .map_err(|err| err.to_string())?;
                for (label, amount) in [
                    ("Base", cost.base),
                    ("Insurance", cost.insurance),
                    ("Mileage", cost.mileage),
                    ("Fees", cost.fees),
                    ("Subtotal", cost.subtotal),
                    ("Tax", cost.tax),
                    ("Total", cost.total),
                ] {
                    let _ = writeln!(out, "{label}: {amount}");
                }
            }
            Self::Commute {
                bus_fare,
                bus_hours,
                bus_luggage,
                train_fare,
                train_hours,
                train_luggage,
                travelers,
                value_of_time,
            } => {
                let comparison = tallyup_formulas::compare_commute(&CommuteInput {
                    bus: CommuteModeCost {
                        fare_per_traveler: bus_fare,
                        luggage_fee: bus_luggage,
                        hours: bus_hours,
                    },
                    train: CommuteModeCost {
                        fare_per_traveler: train_fare,
                        luggage_fee: train_luggage,
                        hours: train_hours,
                    },
                    travelers,
                    value_of_time_per_hour: value_of_time,
                })
                .map_err(|err| err.to_string())?;
                for (label, mode) in [("Bus", comparison.bus), ("Train", comparison.train)] {
                    let _ = writeln!(
                        out,
                        "{label}: tickets {} + time {} = {}",
                        mode.ticket_total, mode.time_cost, mode.generalized_cost
                    );
                }
                match comparison.cheaper {
                    Some(CommuteMode::Bus) => {
                        let _ = writeln!(out, "Bus is cheaper by {}", comparison.savings);
                    }
                    Some(CommuteMode::Train) => {
                        let _ = writeln!(out, "Train is cheaper by {}", comparison.savings);
                    }
                    None => {
                        let _ = writeln!(out, "Both cost the same");
                    }
                }
            }
            Self::Health {
                income,
                savings,
                debt,
                expenses,
                housing,
                emergency_fund,
            } => {
                let score = tallyup_formulas::financial_health_score(&HealthInput {
                    monthly_income: income,
                    monthly_savings: savings,
                    monthly_debt_payments: debt,
                    monthly_expenses: expenses,
                    monthly_housing: housing,
                    emergency_fund,
                })
                .map_err(|err| err.to_string())?;
                let _ = writeln!(
                    out,
                    "Savings rate: {}% ({} pts)",
                    score.savings_rate, score.savings_points
                );
                let _ = writeln!(
                    out,
                    "Debt-to-income: {}% ({} pts)",
                    score.debt_to_income, score.debt_points
                );
                let _ = writeln!(
                    out,
                    "Emergency fund: {} months ({} pts)",
                    score.emergency_months, score.emergency_points
                );
                let _ = writeln!(
                    out,
                    "Non-housing expenses: {}% ({} pts)",
                    score.expense_ratio, score.expense_points
                );
                let _ = writeln!(out, "Score: {} ({:?})", score.total, score.grade);
            }
            Self::FutureValue {
                principal,
                contribution,
                rate_percent,
                periods_per_year,
                years,
            } => {
                let result = tallyup_formulas::future_value(&FutureValueInput {
                    principal,
                    contribution_per_period: contribution,
                    annual_rate_percent: rate_percent,
                    periods_per_year,
                    years,
                })
                .map_err(|err| err.to_string())?;
                let _ = writeln!(out, "Future value: {}", result.future_value);
                let _ = writeln!(out, "Contributions: {}", result.total_contributions);
                let _ = writeln!(out, "Interest: {}", result.total_interest);
            }
            Self::Exposure {
                spot,
                strike,
                notional,
                drift,
                volatility,
                horizon_years,
                steps,
                trials,
                confidence,
                seed,
            } => {
                let defaults = ExposureSimulation::default();
                let params = ExposureSimulation {
                    spot: spot.unwrap_or(defaults.spot),
                    strike: strike.unwrap_or(defaults.strike),
                    notional: notional.unwrap_or(defaults.notional),
                    drift: drift.unwrap_or(defaults.drift),
                    volatility: volatility.unwrap_or(defaults.volatility),
                    horizon_years: horizon_years.unwrap_or(defaults.horizon_years),
                    steps: steps.unwrap_or(defaults.steps),
                    trials: trials.unwrap_or(defaults.trials),
                    confidence: confidence.unwrap_or(defaults.confidence),
                    seed: seed.unwrap_or(defaults.seed),
                };
                let profile =
                    tallyup_formulas::simulate_exposure(&params).map_err(|err| err.to_string())?;
                let _ = writeln!(out, "{:>8}  {:>12}  {:>12}", "t", "EE", "PFE");
                for point in &profile.points {
                    let _ = writeln!(
                        out,
                        "{:>8.4}  {:>12.4}  {:>12.4}",
                        point.time_years, point.expected_exposure, point.potential_future_exposure
                    );
                }
                let _ = writeln!(
                    out,
                    "Peak EE: {:.4}, peak PFE: {:.4}",
                    profile.peak_expected_exposure, profile.peak_potential_future_exposure
                );
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tallyup_formulas::FormulaError;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    #[rstest]
    #[case::percent_error(
        CalcCommand::PercentError { observed: dec("9.8"), true_value: dec("10") },
        "Percent error: 2.00%"
    )]
    #[case::relative_change(
        CalcCommand::RelativeChange { old: dec("100"), new: dec("125") },
        "Relative change: +25.00%"
    )]
    #[case::to_percent(CalcCommand::ToPercent { value: dec("0.75") }, "75.00%")]
    fn prints_formula_results(#[case] command: CalcCommand, #[case] expected: &str) {
        let output = command.run().expect("run");
        assert_eq!(output.trim_end(), expected);
    }

    #[test]
    fn formula_errors_become_messages() {
        let err = CalcCommand::RelativeChange {
            old: Decimal::ZERO,
            new: dec("1"),
        }
        .run()
        .expect_err("zero original");
        assert!(err.contains("original value"));
    }

    #[rstest]
    #[case::to_percent(CalcCommand::ToPercent { value: Decimal::MAX })]
    #[case::point_difference(CalcCommand::PointDifference {
        old: Decimal::MIN,
        new: Decimal::MAX,
    })]
    fn overflowing_inputs_are_reported(#[case] command: CalcCommand) {
        let err = command.run().expect_err("overflow");
        assert_eq!(err, FormulaError::Overflow.to_string());
    }
}

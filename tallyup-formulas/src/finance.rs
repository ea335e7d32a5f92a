use crate::{FormulaError, Result, ensure_non_negative, ensure_positive, round_result};
use rust_decimal::Decimal;

const SAVINGS_POINTS: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
const DEBT_POINTS: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
const EMERGENCY_POINTS: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
const EXPENSE_POINTS: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

const TARGET_SAVINGS_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
const HEALTHY_DEBT_RATIO: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const FAILING_DEBT_RATIO: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const TARGET_EMERGENCY_MONTHS: Decimal = Decimal::from_parts(6, 0, 0, false, 0);
const HEALTHY_EXPENSE_RATIO: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthInput {
    pub monthly_income: Decimal,
    pub monthly_savings: Decimal,
    pub monthly_debt_payments: Decimal,
    /// Total monthly spending, housing included.
    pub monthly_expenses: Decimal,
    pub monthly_housing: Decimal,
    pub emergency_fund: Decimal,
}

impl HealthInput {
    fn validate(&self) -> Result<()> {
        ensure_positive(self.monthly_income, "monthly income")?;
        ensure_non_negative(self.monthly_savings, "monthly savings")?;
        ensure_non_negative(self.monthly_debt_payments, "monthly debt payments")?;
        ensure_non_negative(self.monthly_housing, "monthly housing")?;
        ensure_non_negative(self.emergency_fund, "emergency fund")?;
        if self.monthly_expenses.is_zero() {
            return Err(FormulaError::DivisionByZero {
                field: "monthly expenses",
            });
        }
        ensure_positive(self.monthly_expenses, "monthly expenses")?;
        if self.monthly_housing > self.monthly_expenses {
            return Err(FormulaError::OutOfRange {
                field: "monthly housing",
                detail: "cannot exceed monthly expenses",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthGrade {
    A,
    B,
    C,
    D,
    F,
}

impl From<Decimal> for HealthGrade {
    fn from(score: Decimal) -> Self {
        match score {
            s if s >= Decimal::from(80) => Self::A,
            s if s >= Decimal::from(65) => Self::B,
            s if s >= Decimal::from(50) => Self::C,
            s if s >= Decimal::from(35) => Self::D,
            _ => Self::F,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthScore {
    pub savings_rate: Decimal,
    pub debt_to_income: Decimal,
    pub emergency_months: Decimal,
    /// Non-housing spending as a percent of income.
    pub expense_ratio: Decimal,
    pub savings_points: Decimal,
    pub debt_points: Decimal,
    pub emergency_points: Decimal,
    pub expense_points: Decimal,
    pub total: Decimal,
    pub grade: HealthGrade,
}

/// Linear score that is full at or below `full_at` and zero at or above `zero_at`.
fn descending_points(value: Decimal, full_at: Decimal, zero_at: Decimal, max: Decimal) -> Decimal {
    if value <= full_at {
        max
    } else if value >= zero_at {
        Decimal::ZERO
    } else {
        max * (zero_at - value) / (zero_at - full_at)
    }
}

/// Linear score that is zero at zero and full at or above `full_at`.
fn ascending_points(value: Decimal, full_at: Decimal, max: Decimal) -> Decimal {
    max * (value / full_at).clamp(Decimal::ZERO, Decimal::ONE)
}

pub fn financial_health_score(input: &HealthInput) -> Result<HealthScore> {
    input.validate()?;

    let percent_of_income = |amount: Decimal| {
        amount
            .checked_div(input.monthly_income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(FormulaError::Overflow)
    };
    let savings_rate = percent_of_income(input.monthly_savings)?;
    let debt_to_income = percent_of_income(input.monthly_debt_payments)?;
    let expense_ratio = percent_of_income(input.monthly_expenses - input.monthly_housing)?;
    let emergency_months = input
        .emergency_fund
        .checked_div(input.monthly_expenses)
        .ok_or(FormulaError::Overflow)?;

    let savings_points = ascending_points(savings_rate, TARGET_SAVINGS_RATE, SAVINGS_POINTS);
    let debt_points = descending_points(
        debt_to_income,
        HEALTHY_DEBT_RATIO,
        FAILING_DEBT_RATIO,
        DEBT_POINTS,
    );
    let emergency_points =
        ascending_points(emergency_months, TARGET_EMERGENCY_MONTHS, EMERGENCY_POINTS);
    let expense_points = descending_points(
        expense_ratio,
        HEALTHY_EXPENSE_RATIO,
        Decimal::ONE_HUNDRED,
        EXPENSE_POINTS,
    );

    let total = round_result(savings_points + debt_points + emergency_points + expense_points);
    let grade = HealthGrade::from(total);
    tracing::debug!(%total, ?grade, "Financial health scored");

    Ok(HealthScore {
        savings_rate: round_result(savings_rate),
        debt_to_income: round_result(debt_to_income),
        emergency_months: round_result(emergency_months),
        expense_ratio: round_result(expense_ratio),
        savings_points: round_result(savings_points),
        debt_points: round_result(debt_points),
        emergency_points: round_result(emergency_points),
        expense_points: round_result(expense_points),
        total,
        grade,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FutureValueInput {
    pub principal: Decimal,
    /// Paid at the end of every compounding period.
    pub contribution_per_period: Decimal,
    pub annual_rate_percent: Decimal,
    pub periods_per_year: u32,
    pub years: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FutureValue {
    pub future_value: Decimal,
    pub total_contributions: Decimal,
    pub total_interest: Decimal,
}

fn checked_powu(base: Decimal, mut exp: u64) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut base = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(base)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(result)
}

pub fn future_value(input: &FutureValueInput) -> Result<FutureValue> {
    ensure_non_negative(input.principal, "principal")?;
    ensure_non_negative(input.contribution_per_period, "contribution")?;
    ensure_non_negative(input.annual_rate_percent, "annual rate")?;
    if input.periods_per_year == 0 {
        return Err(FormulaError::NonPositive {
            field: "compounding periods per year",
        });
    }

    let periods = u64::from(input.periods_per_year) * u64::from(input.years);
    let contributions = input
        .contribution_per_period
        .checked_mul(Decimal::from(periods))
        .and_then(|paid| paid.checked_add(input.principal))
        .ok_or(FormulaError::Overflow)?;

    let rate_per_period =
        input.annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(input.periods_per_year);
    let value = if rate_per_period.is_zero() {
        contributions
    } else {
        let growth =
            checked_powu(Decimal::ONE + rate_per_period, periods).ok_or(FormulaError::Overflow)?;
        let annuity = input
            .contribution_per_period
            .checked_mul(growth - Decimal::ONE)
            .and_then(|v| v.checked_div(rate_per_period));
        input
            .principal
            .checked_mul(growth)
            .zip(annuity)
            .and_then(|(lump, annuity)| lump.checked_add(annuity))
            .ok_or(FormulaError::Overflow)?
    };

    let future_value = round_result(value);
    let total_contributions = round_result(contributions);
    Ok(FutureValue {
        future_value,
        total_contributions,
        total_interest: future_value - total_contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    fn health(
        income: &str,
        savings: &str,
        debt: &str,
        expenses: &str,
        housing: &str,
        fund: &str,
    ) -> HealthInput {
        HealthInput {
            monthly_income: dec(income),
            monthly_savings: dec(savings),
            monthly_debt_payments: dec(debt),
            monthly_expenses: dec(expenses),
            monthly_housing: dec(housing),
            emergency_fund: dec(fund),
        }
    }

    #[test]
    fn perfect_finances_score_full_marks() {
        let score = financial_health_score(&health("5000", "1000", "500", "3000", "1000", "18000"))
            .expect("score");

        assert_eq!(score.total, dec("100"));
        assert_eq!(score.grade, HealthGrade::A);
    }

    #[test]
    fn partial_scores_interpolate() {
        let score = financial_health_score(&health("4000", "400", "1200", "3000", "1200", "6000"))
            .expect("score");

        assert_eq!(score.savings_rate, dec("10"));
        assert_eq!(score.savings_points, dec("15"));
        assert_eq!(score.debt_to_income, dec("30"));
        assert_eq!(score.debt_points, dec("15"));
        assert_eq!(score.emergency_months, dec("2"));
        assert_eq!(score.emergency_points, dec("8.33"));
        assert_eq!(score.expense_ratio, dec("45"));
        assert_eq!(score.expense_points, dec("15"));
        assert_eq!(score.total, dec("53.33"));
        assert_eq!(score.grade, HealthGrade::C);
    }

    #[test]
    fn heavy_debt_scores_nothing_for_debt() {
        let score = financial_health_score(&health("3000", "0", "1800", "2900", "0", "0"))
            .expect("score");

        assert_eq!(score.debt_points, Decimal::ZERO);
        assert_eq!(score.grade, HealthGrade::F);
    }

    #[rstest]
    #[case::no_income(health("0", "0", "0", "100", "0", "0"))]
    #[case::no_expenses(health("100", "0", "0", "0", "0", "0"))]
    #[case::housing_over_expenses(health("100", "0", "0", "50", "60", "0"))]
    #[case::negative_savings(health("100", "-1", "0", "50", "0", "0"))]
    fn invalid_health_inputs_are_rejected(#[case] input: HealthInput) {
        assert!(financial_health_score(&input).is_err());
    }

    #[rstest]
    #[case::savings_rate(health("0.01", "79228162514264337593543950335", "0", "1", "0", "0"))]
    #[case::emergency_months(health("1000", "0", "0", "0.5", "0", "79228162514264337593543950335"))]
    fn huge_health_inputs_report_overflow(#[case] input: HealthInput) {
        assert_eq!(financial_health_score(&input), Err(FormulaError::Overflow));
    }

    #[rstest]
    #[case::score_80("80", HealthGrade::A)]
    #[case::score_79("79.99", HealthGrade::B)]
    #[case::score_50("50", HealthGrade::C)]
    #[case::score_35("35", HealthGrade::D)]
    #[case::score_0("0", HealthGrade::F)]
    fn grade_bands(#[case] score: &str, #[case] grade: HealthGrade) {
        assert_eq!(HealthGrade::from(dec(score)), grade);
    }

    fn fv_input(
        principal: &str,
        contribution: &str,
        rate: &str,
        periods: u32,
        years: u32,
    ) -> FutureValueInput {
        FutureValueInput {
            principal: dec(principal),
            contribution_per_period: dec(contribution),
            annual_rate_percent: dec(rate),
            periods_per_year: periods,
            years,
        }
    }

    #[rstest]
    #[case::lump_sum(fv_input("1000", "0", "5", 1, 10), "1628.89", "1000")]
    #[case::monthly_savings(fv_input("0", "100", "12", 12, 1), "1268.25", "1200")]
    #[case::zero_rate(fv_input("1000", "50", "0", 12, 2), "2200", "2200")]
    #[case::no_time(fv_input("750", "20", "7", 4, 0), "750", "750")]
    fn future_value_cases(
        #[case] input: FutureValueInput,
        #[case] value: &str,
        #[case] contributions: &str,
    ) {
        let result = future_value(&input).expect("future value");

        assert_eq!(result.future_value, dec(value));
        assert_eq!(result.total_contributions, dec(contributions));
        assert_eq!(
            result.total_interest,
            result.future_value - result.total_contributions
        );
    }

    #[test]
    fn compounding_periods_must_be_positive() {
        assert!(matches!(
            future_value(&fv_input("1", "0", "5", 0, 1)),
            Err(FormulaError::NonPositive { .. })
        ));
    }

    proptest! {
        #[test]
        fn interest_is_never_negative(
            principal in 0i64..1_000_000,
            contribution in 0i64..10_000,
            rate_bp in 0i64..2_000,
            periods in 1u32..=12,
            years in 0u32..=40,
        ) {
            let input = FutureValueInput {
                principal: Decimal::from(principal),
                contribution_per_period: Decimal::from(contribution),
                annual_rate_percent: Decimal::new(rate_bp, 2),
                periods_per_year: periods,
                years,
            };
            let result = future_value(&input).expect("future value");
            prop_assert!(result.total_interest >= Decimal::ZERO);
        }
    }
}

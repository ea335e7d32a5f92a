use crate::{FormulaError, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f64::consts::PI;

pub const MAX_TRIALS: u32 = 1_000_000;
pub const MAX_STEPS: u32 = 10_000;
/// Upper bound on `trials * steps`, the number of simulated path increments.
pub const MAX_PATH_STEPS: u64 = 50_000_000;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Forward contract on an asset following geometric Brownian motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExposureSimulation {
    pub spot: f64,
    pub strike: f64,
    pub notional: f64,
    /// Annualized drift `μ`.
    pub drift: f64,
    /// Annualized volatility `σ`.
    pub volatility: f64,
    pub horizon_years: f64,
    pub steps: u32,
    pub trials: u32,
    /// Quantile used for potential future exposure, in `(0, 1)`.
    pub confidence: f64,
    pub seed: u64,
}

impl Default for ExposureSimulation {
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            notional: 1.0,
            drift: 0.0,
            volatility: 0.2,
            horizon_years: 1.0,
            steps: 12,
            trials: 10_000,
            confidence: DEFAULT_CONFIDENCE,
            seed: 42,
        }
    }
}

impl ExposureSimulation {
    fn validate(&self) -> Result<()> {
        for (value, field) in [
            (self.spot, "spot"),
            (self.strike, "strike"),
            (self.notional, "notional"),
            (self.drift, "drift"),
            (self.volatility, "volatility"),
            (self.horizon_years, "horizon"),
            (self.confidence, "confidence"),
        ] {
            if !value.is_finite() {
                return Err(FormulaError::NotFinite { field });
            }
        }
        if self.spot <= 0.0 {
            return Err(FormulaError::NonPositive { field: "spot" });
        }
        if self.strike < 0.0 {
            return Err(FormulaError::Negative { field: "strike" });
        }
        if self.notional < 0.0 {
            return Err(FormulaError::Negative { field: "notional" });
        }
        if self.volatility < 0.0 {
            return Err(FormulaError::Negative {
                field: "volatility",
            });
        }
        if self.horizon_years <= 0.0 {
            return Err(FormulaError::NonPositive { field: "horizon" });
        }
        if !(1..=MAX_STEPS).contains(&self.steps) {
            return Err(FormulaError::StepCount(self.steps));
        }
        if !(1..=MAX_TRIALS).contains(&self.trials) {
            return Err(FormulaError::TrialCount(self.trials));
        }
        let path_steps = u64::from(self.trials) * u64::from(self.steps);
        if path_steps > MAX_PATH_STEPS {
            return Err(FormulaError::SimulationTooLarge {
                trials: self.trials,
                steps: self.steps,
            });
        }
        if self.confidence <= 0.0 || self.confidence >= 1.0 {
            return Err(FormulaError::OutOfRange {
                field: "confidence",
                detail: "must be strictly between 0 and 1",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExposurePoint {
    pub time_years: f64,
    pub expected_exposure: f64,
    pub potential_future_exposure: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExposureProfile {
    pub points: Vec<ExposurePoint>,
    pub peak_expected_exposure: f64,
    pub peak_potential_future_exposure: f64,
}

/// Box-Muller sampler that keeps the second variate of each pair.
struct NormalSampler {
    rng: StdRng,
    cached: Option<f64>,
}

impl NormalSampler {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cached: None,
        }
    }

    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.cached.take() {
            return z;
        }

        let u1 = self.rng.r#gen::<f64>().max(1e-12);
        let u2 = self.rng.r#gen::<f64>();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        self.cached = Some(r * theta.sin());
        r * theta.cos()
    }
}

/// Interpolated quantile, `q` in `[0, 1]`. Sorts `values` in place.
fn quantile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(f64::total_cmp);

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = q * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

/// Runs every path forward one step at a time and summarizes the exposure
/// `max(notional * (S_t - K), 0)` at each step.
pub fn simulate_exposure(params: &ExposureSimulation) -> Result<ExposureProfile> {
    params.validate()?;

    let dt = params.horizon_years / f64::from(params.steps);
    let drift_term = (params.drift - 0.5 * params.volatility * params.volatility) * dt;
    let diffusion = params.volatility * dt.sqrt();

    let trials = params.trials as usize;
    let mut sampler = NormalSampler::new(params.seed);
    let mut prices = vec![params.spot; trials];
    let mut exposures = vec![0.0; trials];
    let mut points = Vec::with_capacity(params.steps as usize);

    for step in 1..=params.steps {
        let mut total = 0.0;
        for (price, exposure) in prices.iter_mut().zip(exposures.iter_mut()) {
            *price *= (drift_term + diffusion * sampler.standard_normal()).exp();
            *exposure = (params.notional * (*price - params.strike)).max(0.0);
            total += *exposure;
        }

        points.push(ExposurePoint {
            time_years: dt * f64::from(step),
            expected_exposure: total / trials as f64,
            potential_future_exposure: quantile(&mut exposures, params.confidence),
        });
    }

    let peak_expected_exposure = points
        .iter()
        .map(|p| p.expected_exposure)
        .fold(0.0, f64::max);
    let peak_potential_future_exposure = points
        .iter()
        .map(|p| p.potential_future_exposure)
        .fold(0.0, f64::max);

    tracing::info!(
        trials = params.trials,
        steps = params.steps,
        seed = params.seed,
        peak_expected_exposure,
        peak_potential_future_exposure,
        "Exposure simulation finished"
    );

    Ok(ExposureProfile {
        points,
        peak_expected_exposure,
        peak_potential_future_exposure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn assert_approx(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn quantile_interpolates_between_points() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_approx(quantile(&mut values, 0.25), 1.75, 1e-12);
        assert_approx(quantile(&mut values, 1.0), 4.0, 1e-12);
    }

    #[test]
    fn same_seed_gives_same_profile() {
        let params = ExposureSimulation {
            trials: 2_000,
            ..ExposureSimulation::default()
        };

        let first = simulate_exposure(&params).expect("simulation");
        let second = simulate_exposure(&params).expect("simulation");

        assert_eq!(first, second);
        assert_eq!(first.points.len(), 12);
    }

    #[test]
    fn zero_volatility_is_deterministic_growth() {
        let params = ExposureSimulation {
            drift: 0.05,
            volatility: 0.0,
            steps: 4,
            trials: 10,
            ..ExposureSimulation::default()
        };

        let profile = simulate_exposure(&params).expect("simulation");

        for point in &profile.points {
            let expected = 100.0 * (0.05 * point.time_years).exp() - 100.0;
            assert_approx(point.expected_exposure, expected, 1e-9);
            assert_approx(point.potential_future_exposure, expected, 1e-9);
        }
    }

    #[test]
    fn at_the_money_forward_matches_closed_form() {
        // E[max(S_T - K, 0)] for a driftless forward is the Black-Scholes call
        // value with r = 0, about 7.97 for S = K = 100, σ = 0.2, T = 1.
        let params = ExposureSimulation {
            steps: 1,
            trials: 200_000,
            ..ExposureSimulation::default()
        };

        let profile = simulate_exposure(&params).expect("simulation");

        assert_approx(profile.peak_expected_exposure, 7.97, 0.15);
        assert!(profile.peak_potential_future_exposure > profile.peak_expected_exposure);
    }

    #[rstest]
    #[case::no_trials(ExposureSimulation { trials: 0, ..ExposureSimulation::default() })]
    #[case::too_many_trials(ExposureSimulation { trials: MAX_TRIALS + 1, ..ExposureSimulation::default() })]
    #[case::no_steps(ExposureSimulation { steps: 0, ..ExposureSimulation::default() })]
    #[case::zero_spot(ExposureSimulation { spot: 0.0, ..ExposureSimulation::default() })]
    #[case::negative_volatility(ExposureSimulation { volatility: -0.1, ..ExposureSimulation::default() })]
    #[case::nan_drift(ExposureSimulation { drift: f64::NAN, ..ExposureSimulation::default() })]
    #[case::certain_confidence(ExposureSimulation { confidence: 1.0, ..ExposureSimulation::default() })]
    fn invalid_simulations_are_rejected(#[case] params: ExposureSimulation) {
        assert!(simulate_exposure(&params).is_err());
    }

    #[rstest]
    #[case::no_steps(0, 10, FormulaError::StepCount(0))]
    #[case::too_many_steps(MAX_STEPS + 1, 10, FormulaError::StepCount(MAX_STEPS + 1))]
    #[case::max_trials_and_steps(
        MAX_STEPS,
        MAX_TRIALS,
        FormulaError::SimulationTooLarge { trials: MAX_TRIALS, steps: MAX_STEPS }
    )]
    #[case::just_over_budget(
        5_001,
        10_000,
        FormulaError::SimulationTooLarge { trials: 10_000, steps: 5_001 }
    )]
    fn oversized_simulations_are_rejected_before_running(
        #[case] steps: u32,
        #[case] trials: u32,
        #[case] expected: FormulaError,
    ) {
        let params = ExposureSimulation {
            steps,
            trials,
            ..ExposureSimulation::default()
        };
        assert_eq!(simulate_exposure(&params), Err(expected));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn exposures_are_never_negative(seed in any::<u64>(), strike in 50.0f64..150.0) {
            let params = ExposureSimulation {
                strike,
                trials: 500,
                steps: 3,
                seed,
                ..ExposureSimulation::default()
            };
            let profile = simulate_exposure(&params).expect("simulation");
            for point in &profile.points {
                prop_assert!(point.expected_exposure >= 0.0);
                prop_assert!(point.potential_future_exposure >= 0.0);
            }
        }
    }
}

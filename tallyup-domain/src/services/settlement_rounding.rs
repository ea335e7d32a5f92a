//! Settlement rounding with zero-sum minimal adjustment.
//!
//! Balances are accumulated at share precision and only rounded here, once,
//! to the currency's atomic unit. Independent rounding can leave the total a
//! few units away from zero; those units are taken back from (or given to)
//! the participants whose rounding moved them furthest in the offending
//! direction, so that:
//! 1. every balance is a whole number of atomic units,
//! 2. the rounded balances sum to exactly zero,
//! 3. no participant moves by more than one atomic unit beyond plain rounding,
//! 4. ties are broken deterministically by larger magnitude, then roster order.

use crate::model::{Money, ParticipantBalances, ParticipantId};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Rounding mode for settlement quantization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RoundingMode {
    /// Round half away from zero (e.g., 0.005 -> 0.01, -0.005 -> -0.01).
    #[default]
    HalfUp,
    /// Round half to nearest even number (banker's rounding).
    HalfEven,
}

/// Currency precision and rounding rule for a settlement.
///
/// # Example
/// ```
/// use tallyup_domain::services::{RoundingMode, SettlementContext};
///
/// let ctx = SettlementContext {
///     scale: 2, // cents
///     rounding_mode: RoundingMode::HalfUp,
/// };
/// assert_eq!(ctx, SettlementContext::usd_default());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementContext {
    /// Number of decimal places for the atomic unit (e.g., 2 for USD, 0 for JPY).
    pub scale: u32,
    pub rounding_mode: RoundingMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AtomicUnitConversionError {
    #[error("amount is not a whole number of atomic units")]
    NonIntegral,
    #[error("amount does not fit in 64-bit atomic units")]
    OutOfRange,
    #[error("scale {scale} is not supported (max {max_supported})")]
    UnsupportedScale { scale: u32, max_supported: u32 },
}

impl SettlementContext {
    pub fn usd_default() -> Self {
        Self {
            scale: 2,
            rounding_mode: RoundingMode::HalfUp,
        }
    }

    pub fn jpy_default() -> Self {
        Self {
            scale: 0,
            rounding_mode: RoundingMode::HalfUp,
        }
    }

    pub fn atomic_unit(self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    /// Converts a money amount to integer atomic units under this context scale.
    pub fn to_atomic_units_i64(self, amount: Money) -> Result<i64, AtomicUnitConversionError> {
        if self.scale > MAX_SETTLEMENT_SCALE {
            return Err(AtomicUnitConversionError::UnsupportedScale {
                scale: self.scale,
                max_supported: MAX_SETTLEMENT_SCALE,
            });
        }
        let factor = Decimal::from_i128_with_scale(10_i128.pow(self.scale), 0);
        let units = amount
            .as_decimal()
            .checked_mul(factor)
            .ok_or(AtomicUnitConversionError::OutOfRange)?;
        if units.fract() != Decimal::ZERO {
            return Err(AtomicUnitConversionError::NonIntegral);
        }
        units.to_i64().ok_or(AtomicUnitConversionError::OutOfRange)
    }

    pub fn from_atomic_units(self, units: i64) -> Money {
        Money::new(units, self.scale)
    }
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self::usd_default()
    }
}

/// Errors that can occur during settlement quantization.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettlementRoundingError {
    /// The input balances do not sum to zero within epsilon.
    #[error("balances do not sum to zero (found {0})")]
    ImbalancedTotal(Money),
    #[error("rounding drift cannot be repaired")]
    InvalidAdjustmentCount,
    #[error("rounded balances failed the zero-sum check")]
    ZeroSumInvariantViolation,
    #[error("rounded balance is not a whole number of atomic units")]
    NonIntegral,
    #[error("scale {scale} is not supported (max {max_supported})")]
    UnsupportedScale { scale: u32, max_supported: u32 },
}

const EPSILON_OP_COUNT_BUDGET: i64 = 1_000_000;
const EPSILON_SAFETY_FACTOR: i64 = 100;
pub const MAX_SETTLEMENT_SCALE: u32 = 22;

struct Entry {
    id: ParticipantId,
    original: Decimal,
    rounded: Decimal,
    diff: Decimal,
}

/// Quantizes balances to the atomic unit with a zero-sum constraint.
///
/// # Example
/// ```
/// use tallyup_domain::{Money, ParticipantBalances, ParticipantId};
/// use tallyup_domain::services::{quantize_balances, SettlementContext};
///
/// let mut balances = ParticipantBalances::new();
/// balances.insert(ParticipantId(0), Money::from_decimal("66.666666666666".parse().unwrap()));
/// balances.insert(ParticipantId(1), Money::from_decimal("-33.333333333333".parse().unwrap()));
/// balances.insert(ParticipantId(2), Money::from_decimal("-33.333333333333".parse().unwrap()));
///
/// let rounded = quantize_balances(&balances, SettlementContext::usd_default()).unwrap();
/// assert!(rounded.values().copied().sum::<Money>().is_zero());
/// ```
pub fn quantize_balances(
    balances: &ParticipantBalances,
    context: SettlementContext,
) -> Result<ParticipantBalances, SettlementRoundingError> {
    validate_scale(context.scale)?;

    let atomic_unit = context.atomic_unit();
    let epsilon = settlement_epsilon(context.scale);
    let original_sum: Money = balances.values().sum();
    if original_sum.abs().as_decimal() > epsilon {
        tracing::error!(
            reject_reason = "input_imbalance",
            participant_count = balances.len(),
            atomic_unit = %atomic_unit,
            epsilon = %epsilon,
            sum_original = %original_sum,
            "Settlement quantization rejected due to input imbalance"
        );
        return Err(SettlementRoundingError::ImbalancedTotal(original_sum));
    }

    let rounding_strategy = match context.rounding_mode {
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
    };

    tracing::debug!(
        atomic_unit = %atomic_unit,
        epsilon = %epsilon,
        rounding_mode = ?context.rounding_mode,
        participant_count = balances.len(),
        sum_original = %original_sum,
        "Settlement quantization started"
    );

    let mut entries: Vec<Entry> = balances
        .iter()
        .map(|(id, money)| {
            let original = money.as_decimal();
            let units = quantize_to_int(original, atomic_unit, rounding_strategy)?;
            let rounded = Decimal::from(units) * atomic_unit;
            Ok(Entry {
                id: *id,
                original,
                rounded,
                diff: rounded - original,
            })
        })
        .collect::<Result<Vec<_>, SettlementRoundingError>>()?;

    let v_int = sum_units(&entries, atomic_unit)?;

    if v_int != 0 {
        let adjustment_count = usize::try_from(v_int.unsigned_abs())
            .map_err(|_| SettlementRoundingError::InvalidAdjustmentCount)?;

        if adjustment_count > entries.len() {
            tracing::error!(
                reject_reason = "k_gt_n",
                v_int,
                adjustment_count,
                participant_count = entries.len(),
                "Adjustment count exceeds participant count during settlement quantization"
            );
            return Err(SettlementRoundingError::InvalidAdjustmentCount);
        }

        // Positive drift: take a unit back from whoever rounding pushed up the most.
        let score_sign = if v_int > 0 {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        };

        let mut ranked: Vec<usize> = (0..entries.len()).collect();
        ranked.sort_by(|&a, &b| {
            let (lhs, rhs) = (&entries[a], &entries[b]);
            (rhs.diff * score_sign)
                .cmp(&(lhs.diff * score_sign))
                .then_with(|| rhs.original.abs().cmp(&lhs.original.abs()))
                .then_with(|| lhs.id.cmp(&rhs.id))
        });

        let adjustment = if v_int > 0 { -atomic_unit } else { atomic_unit };
        let selected: Vec<usize> = ranked.into_iter().take(adjustment_count).collect();

        let opposite_sign_selected = selected
            .iter()
            .filter(|idx| {
                let diff = entries[**idx].diff;
                (v_int > 0 && diff < Decimal::ZERO) || (v_int < 0 && diff > Decimal::ZERO)
            })
            .count();
        if opposite_sign_selected > 0 {
            tracing::warn!(
                opposite_sign_selected,
                adjustment_count,
                participant_count = entries.len(),
                "Opposite-sign adjustment candidates were selected during zero-sum repair"
            );
        }

        tracing::debug!(
            v_int,
            adjustment_count,
            selected_ids = ?selected.iter().map(|idx| entries[*idx].id.0).collect::<Vec<_>>(),
            "Settlement quantization diagnostics"
        );

        for idx in &selected {
            entries[*idx].rounded += adjustment;
        }

        let repaired = sum_units(&entries, atomic_unit)?;
        if repaired != 0 {
            tracing::error!(
                reject_reason = "zero_sum_invariant_violation",
                participant_count = entries.len(),
                v_int = repaired,
                "Settlement quantization failed zero-sum invariant check"
            );
            return Err(SettlementRoundingError::ZeroSumInvariantViolation);
        }
    }

    Ok(entries
        .into_iter()
        .map(|entry| {
            let mut rounded = entry.rounded;
            rounded.rescale(context.scale);
            (entry.id, Money::from_decimal(rounded))
        })
        .collect())
}

fn sum_units(entries: &[Entry], atomic_unit: Decimal) -> Result<i128, SettlementRoundingError> {
    entries.iter().try_fold(0_i128, |acc, entry| {
        let units = entry.rounded / atomic_unit;
        let whole = units.to_i128().ok_or(SettlementRoundingError::NonIntegral)?;
        if Decimal::from(whole) != units {
            return Err(SettlementRoundingError::NonIntegral);
        }
        acc.checked_add(whole)
            .ok_or(SettlementRoundingError::InvalidAdjustmentCount)
    })
}

fn settlement_epsilon(scale: u32) -> Decimal {
    let baseline = Decimal::new(1, scale + 6);
    let epsilon_min = Decimal::from(EPSILON_SAFETY_FACTOR * EPSILON_OP_COUNT_BUDGET)
        * Decimal::from_i128_with_scale(1, 28);
    baseline.max(epsilon_min)
}

fn validate_scale(scale: u32) -> Result<(), SettlementRoundingError> {
    if scale <= MAX_SETTLEMENT_SCALE {
        return Ok(());
    }
    Err(SettlementRoundingError::UnsupportedScale {
        scale,
        max_supported: MAX_SETTLEMENT_SCALE,
    })
}

fn quantize_to_int(
    original: Decimal,
    atomic_unit: Decimal,
    rounding_strategy: RoundingStrategy,
) -> Result<i128, SettlementRoundingError> {
    let Some(q_decimal) = original
        .checked_div(atomic_unit)
        .map(|units| units.round_dp_with_strategy(0, rounding_strategy))
    else {
        tracing::warn!(
            reject_reason = "quantize_overflow",
            original = %original,
            atomic_unit = %atomic_unit,
            "Balance has no representation in atomic units"
        );
        return Err(SettlementRoundingError::NonIntegral);
    };
    let Some(q_i) = q_decimal.to_i128() else {
        tracing::warn!(
            reject_reason = "quantize_failure",
            original = %original,
            atomic_unit = %atomic_unit,
            rounded_units = %q_decimal,
            "Quantization unit conversion failed"
        );
        return Err(SettlementRoundingError::NonIntegral);
    };
    Ok(q_i)
}

use tallyup_application::{ParticipantBalance, SettlementOptimizationError, SettlementOptimizer};
use tallyup_calc::{PersonBalance as CalcBalance, SettlementError, minimize_transactions};
use tallyup_domain::{AtomicUnitConversionError, SettlementContext, Transfer};

/// Largest debtor pays largest creditor, on integer minor units.
#[derive(Default)]
pub struct GreedySettlementOptimizer;

fn map_calc_settlement_error(err: SettlementError) -> SettlementOptimizationError {
    match err {
        SettlementError::ImbalancedTotal(total) => {
            SettlementOptimizationError::ImbalancedTotal(total)
        }
    }
}

fn map_atomic_unit_error(err: AtomicUnitConversionError) -> SettlementOptimizationError {
    match err {
        AtomicUnitConversionError::NonIntegral => {
            SettlementOptimizationError::QuantizationNonIntegral
        }
        AtomicUnitConversionError::OutOfRange => {
            SettlementOptimizationError::QuantizationOutOfRange
        }
        AtomicUnitConversionError::UnsupportedScale {
            scale,
            max_supported,
        } => SettlementOptimizationError::QuantizationUnsupportedScale {
            scale,
            max_supported,
        },
    }
}

impl SettlementOptimizer for GreedySettlementOptimizer {
    fn optimize(
        &self,
        balances: &[ParticipantBalance],
        context: SettlementContext,
    ) -> Result<Vec<Transfer>, SettlementOptimizationError> {
        let calc_balances = balances
            .iter()
            .map(|balance| {
                context
                    .to_atomic_units_i64(balance.balance)
                    .map(|units| CalcBalance {
                        id: balance.id,
                        balance: units,
                    })
                    .map_err(map_atomic_unit_error)
            })
            .collect::<Result<Vec<_>, SettlementOptimizationError>>()?;

        let payments = minimize_transactions(calc_balances).map_err(map_calc_settlement_error)?;
        tracing::debug!(
            participant_count = balances.len(),
            transfer_count = payments.len(),
            scale = context.scale,
            "Greedy settlement computed"
        );

        Ok(payments
            .iter()
            .map(|payment| Transfer {
                from: payment.from,
                to: payment.to,
                amount: context.from_atomic_units(payment.amount),
            })
            .collect())
    }
}

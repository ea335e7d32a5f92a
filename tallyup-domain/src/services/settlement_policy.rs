use crate::model::{Money, ParticipantBalances, Settlement, Transfer};

pub struct SettlementPolicy;

impl SettlementPolicy {
    /// Applies each transfer: the payer's debt and the receiver's claim both shrink by its amount.
    pub fn apply(balances: ParticipantBalances, transfers: Vec<Transfer>) -> Settlement {
        let mut new_balances = balances;
        for transfer in &transfers {
            *new_balances.entry(transfer.from).or_insert(Money::ZERO) += transfer.amount;
            *new_balances.entry(transfer.to).or_insert(Money::ZERO) -= transfer.amount;
        }

        Settlement {
            new_balances,
            transfers,
        }
    }

    pub fn is_settled(settlement: &Settlement) -> bool {
        settlement.new_balances.values().all(|balance| balance.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParticipantId;
    use rstest::rstest;

    #[rstest]
    #[case::debtor_pays_creditor(
        &[(0, 60), (1, -30), (2, -30)],
        &[(1, 0, 30), (2, 0, 30)],
        &[(0, 0), (1, 0), (2, 0)],
        true
    )]
    #[case::partial_payment(
        &[(0, 50), (1, -50)],
        &[(1, 0, 20)],
        &[(0, 30), (1, -30)],
        false
    )]
    #[case::no_transfers(&[(0, 0), (1, 0)], &[], &[(0, 0), (1, 0)], true)]
    fn apply_moves_money_along_transfers(
        #[case] balances: &[(u32, i64)],
        #[case] transfers: &[(u32, u32, i64)],
        #[case] expected: &[(u32, i64)],
        #[case] settled: bool,
    ) {
        let balances: ParticipantBalances = balances
            .iter()
            .map(|(id, amount)| (ParticipantId(*id), Money::from_i64(*amount)))
            .collect();
        let transfers: Vec<Transfer> = transfers
            .iter()
            .map(|(from, to, amount)| Transfer {
                from: ParticipantId(*from),
                to: ParticipantId(*to),
                amount: Money::from_i64(*amount),
            })
            .collect();
        let expected: ParticipantBalances = expected
            .iter()
            .map(|(id, amount)| (ParticipantId(*id), Money::from_i64(*amount)))
            .collect();

        let settlement = SettlementPolicy::apply(balances, transfers);

        assert_eq!(settlement.new_balances, expected);
        assert_eq!(SettlementPolicy::is_settled(&settlement), settled);
    }
}

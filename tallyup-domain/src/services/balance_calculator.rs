use crate::model::{BalanceAccumulator, Ledger, ParticipantBalances, Roster, Statement};

/// Net balance per participant: paid minus owed shares, at full share precision.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Every roster participant appears in the result, untouched ones at zero.
    pub fn calculate(&self, ledger: &Ledger<'_>) -> ParticipantBalances {
        self.calculate_statements(
            ledger.roster(),
            ledger.statements().iter().map(|stmt| &stmt.statement),
        )
    }

    /// Balances over statements that already passed `Ledger::try_new`, such as
    /// a prefix of a validated sheet.
    pub fn calculate_statements<'s, 'a: 's, I>(
        &self,
        roster: &Roster<'a>,
        statements: I,
    ) -> ParticipantBalances
    where
        I: IntoIterator<Item = &'s Statement<'a>>,
    {
        let mut accumulator = BalanceAccumulator::new(roster);
        let mut statement_count = 0_usize;
        for statement in statements {
            accumulator.apply(statement);
            statement_count += 1;
        }
        tracing::debug!(
            participant_count = roster.len(),
            statement_count,
            "Balances calculated"
        );
        accumulator.into_balances()
    }
}

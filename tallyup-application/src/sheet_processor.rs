use crate::{
    error::{SettlementOptimizationError, SheetParseError},
    model::{GroupMembers, ParticipantBalance, Sheet, SheetStatement},
    ports::{SettlementOptimizer, SheetParser},
};
use tallyup_domain::{
    BalanceCalculator, MemberSetResolver, ParticipantBalances, SettlementContext,
    SettlementPolicy, Statement, Transfer, quantize_balances,
};

#[derive(Debug)]
pub struct SettlementResult {
    /// Balances rounded to the context scale, in roster order.
    pub balances: Vec<ParticipantBalance>,
    pub transfers: Vec<Transfer>,
}

#[derive(Debug)]
pub enum ProcessingOutcome<'a> {
    Success(Sheet<'a>),
    Rejected(SheetParseError<'a>),
}

#[derive(Clone, Copy)]
pub struct SheetProcessor<'a> {
    parser: &'a dyn SheetParser,
    optimizer: &'a dyn SettlementOptimizer,
    context: SettlementContext,
}

impl<'a> SheetProcessor<'a> {
    pub fn new(
        parser: &'a dyn SheetParser,
        optimizer: &'a dyn SettlementOptimizer,
        context: SettlementContext,
    ) -> Self {
        Self {
            parser,
            optimizer,
            context,
        }
    }

    pub fn context(&self) -> SettlementContext {
        self.context
    }

    pub fn parse_sheet<'b>(&self, content: &'b str) -> ProcessingOutcome<'b>
    where
        'a: 'b,
    {
        match self.parser.parse(content) {
            Ok(sheet) => {
                tracing::debug!(
                    participant_count = sheet.roster().len(),
                    statement_count = sheet.statements().len(),
                    "Sheet parsed"
                );
                ProcessingOutcome::Success(sheet)
            }
            Err(err) => {
                tracing::warn!(error = %err, line = ?err.line(), "Sheet rejected");
                ProcessingOutcome::Rejected(err)
            }
        }
    }

    /// Balances at full share precision after every expense in the sheet.
    pub fn calculate_balances(&self, sheet: &Sheet<'_>) -> ParticipantBalances {
        self.calculate_balances_for_prefix(sheet, sheet.statements().len())
    }

    /// Balances after the first `prefix_len` statements; commands are skipped.
    pub fn calculate_balances_for_prefix(
        &self,
        sheet: &Sheet<'_>,
        prefix_len: usize,
    ) -> ParticipantBalances {
        let statements = sheet.statements();
        let end = prefix_len.min(statements.len());

        let domain_statements = statements[..end].iter().filter_map(|stmt| match &stmt.statement {
            SheetStatement::Domain(statement) => Some(statement),
            SheetStatement::Command(_) => None,
        });
        BalanceCalculator.calculate_statements(sheet.roster(), domain_statements)
    }

    pub fn build_settlement_result(
        &self,
        sheet: &Sheet<'_>,
    ) -> Result<SettlementResult, SettlementOptimizationError> {
        self.build_settlement_result_for_prefix(sheet, sheet.statements().len())
    }

    /// Rounds the prefix balances to the context scale and asks the optimizer
    /// for transfers that bring everyone to zero.
    pub fn build_settlement_result_for_prefix(
        &self,
        sheet: &Sheet<'_>,
        prefix_len: usize,
    ) -> Result<SettlementResult, SettlementOptimizationError> {
        let balances = self.calculate_balances_for_prefix(sheet, prefix_len);
        let quantized = quantize_balances(&balances, self.context)?;

        let person_balances: Vec<ParticipantBalance> = quantized
            .iter()
            .map(|(id, balance)| ParticipantBalance {
                id: *id,
                balance: *balance,
            })
            .collect();

        let transfers = self.optimizer.optimize(&person_balances, self.context)?;

        let settlement = SettlementPolicy::apply(quantized, transfers);
        if !SettlementPolicy::is_settled(&settlement) {
            tracing::error!(
                transfer_count = settlement.transfers.len(),
                "Optimizer transfers leave balances outstanding"
            );
            return Err(SettlementOptimizationError::Unsettled);
        }

        tracing::info!(
            participant_count = person_balances.len(),
            transfer_count = settlement.transfers.len(),
            "Settlement built"
        );

        Ok(SettlementResult {
            balances: person_balances,
            transfers: settlement.transfers,
        })
    }

    /// Groups declared in the first `prefix_len` statements, with their members
    /// as of that point.
    pub fn groups_for_prefix<'b>(
        &self,
        sheet: &Sheet<'b>,
        prefix_len: usize,
    ) -> Vec<GroupMembers<'b>> {
        let statements = sheet.statements();
        let end = prefix_len.min(statements.len());

        let mut resolver = MemberSetResolver::new(sheet.roster());
        let mut groups: Vec<GroupMembers<'b>> = Vec::new();

        for stmt in &statements[..end] {
            let SheetStatement::Domain(Statement::Declaration(decl)) = &stmt.statement else {
                continue;
            };
            if let Some(members) = resolver.evaluate_and_register_group(decl.name, &decl.expression)
            {
                groups.push(GroupMembers {
                    name: decl.name,
                    members: members.members().to_vec(),
                });
            }
        }

        groups
    }
}

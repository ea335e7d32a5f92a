use crate::{
    Sheet,
    error::{SettlementOptimizationError, SheetParseError},
    model::ParticipantBalance,
};
use std::collections::HashMap;
use tallyup_domain::{ParticipantId, Roster, SettlementContext, Transfer};

pub trait SheetParser: Send + Sync {
    fn parse<'a>(&self, content: &'a str) -> Result<Sheet<'a>, SheetParseError<'a>>;
}

pub trait SettlementOptimizer: Send + Sync {
    /// `balances` are already quantized to `context.scale` and sum to zero.
    fn optimize(
        &self,
        balances: &[ParticipantBalance],
        context: SettlementContext,
    ) -> Result<Vec<Transfer>, SettlementOptimizationError>;
}

pub trait ParticipantDirectory {
    fn display_name(&self, id: ParticipantId) -> Option<&str>;
}

impl ParticipantDirectory for Roster<'_> {
    fn display_name(&self, id: ParticipantId) -> Option<&str> {
        self.name_of(id)
    }
}

impl ParticipantDirectory for HashMap<ParticipantId, String> {
    fn display_name(&self, id: ParticipantId) -> Option<&str> {
        self.get(&id).map(String::as_str)
    }
}

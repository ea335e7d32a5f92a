use tallyup_domain::{Money, ParticipantId, Roster, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Balances,
    Groups,
    Settle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetStatement<'a> {
    Domain(Statement<'a>),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetStatementWithLine<'a> {
    pub line: usize,
    pub statement: SheetStatement<'a>,
}

/// A validated expense sheet: the roster plus its statements in source order.
#[derive(Debug, Clone)]
pub struct Sheet<'a> {
    roster: Roster<'a>,
    statements: Vec<SheetStatementWithLine<'a>>,
}

impl<'a> Sheet<'a> {
    pub fn new(roster: Roster<'a>, statements: Vec<SheetStatementWithLine<'a>>) -> Self {
        Self { roster, statements }
    }

    pub fn roster(&self) -> &Roster<'a> {
        &self.roster
    }

    pub fn statements(&self) -> &[SheetStatementWithLine<'a>] {
        &self.statements
    }

    pub fn has_commands(&self) -> bool {
        self.statements
            .iter()
            .any(|stmt| matches!(stmt.statement, SheetStatement::Command(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantBalance {
    pub id: ParticipantId,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembers<'a> {
    pub name: &'a str,
    pub members: Vec<ParticipantId>,
}

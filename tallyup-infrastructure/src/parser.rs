use tallyup_application::{
    Command, Sheet, SheetParseError, SheetParser, SheetStatement, SheetStatementWithLine,
};
use tallyup_domain::{
    Declaration, Expense, Ledger, MemberSetExpr, MemberSetOp, Money, Roster,
    Statement as DomainStatement, StatementWithLine as DomainStatementWithLine,
};
use tallyup_parser::{
    Command as ParserCommand, ParseError, SetExpr, SetOp, Statement as ParserStatement,
    parse_sheet,
};

#[derive(Default)]
pub struct TallyupSheetParser;

impl SheetParser for TallyupSheetParser {
    fn parse<'a>(&self, content: &'a str) -> Result<Sheet<'a>, SheetParseError<'a>> {
        let parsed = parse_sheet(content).map_err(map_parse_error)?;
        let roster = Roster::try_new(parsed.participants)?;

        let mut sheet_statements = Vec::with_capacity(parsed.statements.len());
        let mut domain_statements = Vec::with_capacity(parsed.statements.len());

        for tallyup_parser::StatementWithLine { line, statement } in parsed.statements {
            let statement = match statement {
                ParserStatement::Declaration(decl) => {
                    SheetStatement::Domain(DomainStatement::Declaration(Declaration {
                        name: decl.name,
                        expression: to_member_set_expr(&decl.expression),
                    }))
                }
                ParserStatement::Expense(expense) => {
                    SheetStatement::Domain(DomainStatement::Expense(Expense {
                        name: expense.label,
                        amount: Money::from_decimal(expense.amount),
                        paid_by: expense.payer,
                        split_between: to_member_set_expr(&expense.split),
                    }))
                }
                ParserStatement::Command(command) => SheetStatement::Command(match command {
                    ParserCommand::Balances => Command::Balances,
                    ParserCommand::Groups => Command::Groups,
                    ParserCommand::Settle => Command::Settle,
                }),
            };

            if let SheetStatement::Domain(domain) = &statement {
                domain_statements.push(DomainStatementWithLine {
                    line,
                    statement: domain.clone(),
                });
            }
            sheet_statements.push(SheetStatementWithLine { line, statement });
        }

        Ledger::try_new(roster.clone(), domain_statements)?;
        Ok(Sheet::new(roster, sheet_statements))
    }
}

fn map_parse_error<'a>(err: ParseError) -> SheetParseError<'a> {
    match err {
        ParseError::MissingParticipantsDeclaration => SheetParseError::MissingParticipants,
        ParseError::ParticipantsRedeclared { line } => {
            SheetParseError::ParticipantsRedeclared { line }
        }
        ParseError::SyntaxError { line, detail } => SheetParseError::SyntaxError { line, detail },
    }
}

fn to_member_set_expr<'a>(expr: &SetExpr<'a>) -> MemberSetExpr<'a> {
    let ops = expr
        .ops()
        .iter()
        .map(|op| match op {
            SetOp::Push(name) => MemberSetOp::Push(*name),
            SetOp::Union => MemberSetOp::Union,
            SetOp::Intersection => MemberSetOp::Intersection,
            SetOp::Difference => MemberSetOp::Difference,
        })
        .collect();
    MemberSetExpr::new(ops)
}

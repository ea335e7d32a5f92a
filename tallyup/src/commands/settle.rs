use crate::CliResult;
use std::{fs, path::Path};
use tallyup_application::{
    Command, ProcessingOutcome, SettlementResult, Sheet, SheetProcessor, SheetStatement,
};
use tallyup_domain::SettlementContext;
use tallyup_i18n as i18n;
use tallyup_infrastructure::{GreedySettlementOptimizer, TallyupSheetParser};
use tallyup_presentation::{
    GroupsPresenter, SettlementPresenter, format_settlement_error, format_sheet_parse_error,
    text_table::section,
};

pub fn run(path: &Path, context: SettlementContext) -> CliResult<()> {
    let source = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;

    let output = evaluate(&source, context)?;
    print!("{output}");
    Ok(())
}

/// Renders the output of every command in the sheet, or a full settlement
/// when the sheet has none.
pub fn evaluate(source: &str, context: SettlementContext) -> CliResult<String> {
    let processor = SheetProcessor::new(&TallyupSheetParser, &GreedySettlementOptimizer, context);

    let sheet = match processor.parse_sheet(source) {
        ProcessingOutcome::Success(sheet) => sheet,
        ProcessingOutcome::Rejected(err) => return Err(format_sheet_parse_error(&err).into()),
    };

    if !sheet.has_commands() {
        return render_settlement(&processor, &sheet, sheet.statements().len());
    }

    let mut output = String::new();
    for (index, stmt) in sheet.statements().iter().enumerate() {
        let SheetStatement::Command(command) = stmt.statement else {
            continue;
        };
        let rendered = match command {
            Command::Balances => render_balances(&processor, &sheet, index)?,
            Command::Groups => render_groups(&processor, &sheet, index),
            Command::Settle => render_settlement(&processor, &sheet, index)?,
        };
        output.push_str(&rendered);
    }
    Ok(output)
}

fn settle_prefix(
    processor: &SheetProcessor<'_>,
    sheet: &Sheet<'_>,
    prefix_len: usize,
) -> CliResult<SettlementResult> {
    processor
        .build_settlement_result_for_prefix(sheet, prefix_len)
        .map_err(|err| format_settlement_error(&err).into())
}

fn render_balances(
    processor: &SheetProcessor<'_>,
    sheet: &Sheet<'_>,
    prefix_len: usize,
) -> CliResult<String> {
    let result = settle_prefix(processor, sheet, prefix_len)?;
    let table = SettlementPresenter::build_balance_table(
        &result.balances,
        sheet.roster(),
        processor.context().scale,
    );
    Ok(section(i18n::BALANCES_HEADING, &table))
}

fn render_groups(processor: &SheetProcessor<'_>, sheet: &Sheet<'_>, prefix_len: usize) -> String {
    let groups = processor.groups_for_prefix(sheet, prefix_len);
    section(
        i18n::GROUPS_HEADING,
        &GroupsPresenter::render(&groups, sheet.roster()),
    )
}

fn render_settlement(
    processor: &SheetProcessor<'_>,
    sheet: &Sheet<'_>,
    prefix_len: usize,
) -> CliResult<String> {
    let result = settle_prefix(processor, sheet, prefix_len)?;
    let view = SettlementPresenter::render_with_participants(
        &result,
        sheet.roster(),
        processor.context().scale,
    );

    let transfers = view
        .transfer_table
        .unwrap_or_else(|| format!("{}\n", i18n::ALL_SETTLED));
    let mut output = section(i18n::BALANCES_HEADING, &view.balance_table);
    output.push_str(&section(i18n::SETTLEMENT_HEADING, &transfers));
    Ok(output)
}

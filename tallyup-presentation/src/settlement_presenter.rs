use crate::text_table::{Alignment, TextTableBuilder};
use std::borrow::Cow;
use tallyup_application::{ParticipantBalance, ParticipantDirectory, SettlementResult};
use tallyup_domain::{Money, ParticipantId, Transfer};
use tallyup_i18n as i18n;

pub struct SettlementPresenter;

#[derive(Debug)]
pub struct SettlementView {
    pub balance_table: String,
    /// `None` when nobody owes anything.
    pub transfer_table: Option<String>,
}

impl SettlementPresenter {
    pub fn render(result: &SettlementResult, scale: u32) -> SettlementView {
        Self::render_with_participants(result, &EmptyDirectory, scale)
    }

    pub fn render_with_participants(
        result: &SettlementResult,
        directory: &dyn ParticipantDirectory,
        scale: u32,
    ) -> SettlementView {
        let balance_table = Self::build_balance_table(&result.balances, directory, scale);
        let transfer_table = if result.transfers.is_empty() {
            None
        } else {
            Some(Self::build_transfer_table(
                &result.transfers,
                directory,
                scale,
            ))
        };

        SettlementView {
            balance_table,
            transfer_table,
        }
    }

    pub fn build_balance_table(
        balances: &[ParticipantBalance],
        directory: &dyn ParticipantDirectory,
        scale: u32,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::PARTICIPANT),
                Cow::Borrowed(i18n::BALANCE),
            ]);

        for person in balances {
            builder = builder.row([
                format_participant_label(person.id, directory),
                Cow::Owned(format_signed(person.balance, scale)),
            ]);
        }

        builder.build()
    }

    pub fn build_transfer_table(
        transfers: &[Transfer],
        directory: &dyn ParticipantDirectory,
        scale: u32,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::FROM),
                Cow::Borrowed(i18n::TO),
                Cow::Borrowed(i18n::AMOUNT),
            ]);

        for transfer in transfers {
            builder = builder.row([
                format_participant_label(transfer.from, directory),
                format_participant_label(transfer.to, directory),
                Cow::Owned(transfer.amount.round_to(scale).to_string()),
            ]);
        }

        builder.build()
    }
}

struct EmptyDirectory;

impl ParticipantDirectory for EmptyDirectory {
    fn display_name(&self, _id: ParticipantId) -> Option<&str> {
        None
    }
}

/// Non-negative balances carry an explicit `+`.
pub fn format_signed(amount: Money, scale: u32) -> String {
    let sign = if amount.is_negative() { "" } else { "+" };
    format!("{sign}{}", amount.round_to(scale))
}

pub(crate) fn format_participant_label<'a>(
    id: ParticipantId,
    directory: &'a dyn ParticipantDirectory,
) -> Cow<'a, str> {
    match directory.display_name(id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("#{}", id.0)),
    }
}

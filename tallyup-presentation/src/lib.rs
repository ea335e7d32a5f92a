#![warn(clippy::uninlined_format_args)]

pub mod error_presenter;
pub mod groups_presenter;
pub mod settlement_presenter;
pub mod text_table;

pub use error_presenter::{format_settlement_error, format_sheet_parse_error};
pub use groups_presenter::GroupsPresenter;
pub use settlement_presenter::{SettlementPresenter, SettlementView};

#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod sheet_processor;

pub use error::{SettlementOptimizationError, SheetParseError};
pub use model::{
    Command, GroupMembers, ParticipantBalance, Sheet, SheetStatement, SheetStatementWithLine,
};
pub use ports::{ParticipantDirectory, SettlementOptimizer, SheetParser};
pub use sheet_processor::{ProcessingOutcome, SettlementResult, SheetProcessor};

#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    ALL_PARTICIPANTS, Declaration, Expense, Ledger, LedgerBuildError, MemberSet, MemberSetExpr,
    MemberSetOp, Money, ParticipantBalances, ParticipantId, RemainderPolicy, Roster, Settlement,
    Statement, StatementWithLine, Transfer,
};
pub use services::{
    AtomicUnitConversionError, BalanceCalculator, MAX_SETTLEMENT_SCALE, MemberSetResolver,
    RoundingMode, SettlementContext, SettlementPolicy, SettlementRoundingError, quantize_balances,
};

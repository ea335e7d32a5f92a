pub mod balance_calculator;
pub mod member_set_resolver;
pub mod settlement_policy;
pub mod settlement_rounding;

pub use balance_calculator::BalanceCalculator;
pub use member_set_resolver::MemberSetResolver;
pub use settlement_policy::SettlementPolicy;
pub use settlement_rounding::{
    AtomicUnitConversionError, MAX_SETTLEMENT_SCALE, RoundingMode, SettlementContext,
    SettlementRoundingError, quantize_balances,
};

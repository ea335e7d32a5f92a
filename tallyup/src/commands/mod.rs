pub mod calc;
pub mod settle;

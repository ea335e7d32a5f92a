#[cfg(all(feature = "ja", feature = "en"))]
compile_error!("Cannot enable both 'ja' and 'en' features at the same time");

use std::fmt;

#[cfg(feature = "ja")]
pub mod strings {
    pub const PARTICIPANT: &str = "参加者";
    pub const BALANCE: &str = "収支";
    pub const FROM: &str = "支払人";
    pub const TO: &str = "受取人";
    pub const AMOUNT: &str = "金額";
    pub const GROUP: &str = "グループ";
    pub const MEMBERS: &str = "メンバー";
    pub const BALANCES_HEADING: &str = "収支";
    pub const SETTLEMENT_HEADING: &str = "清算";
    pub const GROUPS_HEADING: &str = "グループ";
    pub const ALL_SETTLED: &str = "全員の清算が完了しています。";
    pub const NO_GROUPS: &str = "グループは定義されていません。";
    pub const MISSING_PARTICIPANTS: &str =
        "最初の行に `PARTICIPANTS := ...` の宣言が見つかりません。";
    pub const SETTLEMENT_CALCULATION_FAILED: &str = "清算の計算に失敗しました";
    pub const SETTLEMENT_INCOMPLETE: &str = "清算後も残高が残っています";
    pub const SETTLEMENT_QUANTIZATION_INVALID_ADJUSTMENT: &str =
        "端数調整の件数が不正です";
    pub const SETTLEMENT_QUANTIZATION_ZERO_SUM_INVARIANT: &str =
        "端数処理後の合計がゼロになりません";
    pub const SETTLEMENT_QUANTIZATION_NON_INTEGRAL: &str =
        "端数処理後の金額が最小単位の整数倍ではありません";
    pub const SETTLEMENT_QUANTIZATION_FAILED: &str = "端数処理に失敗しました";
}

#[cfg(not(feature = "ja"))]
pub mod strings {
    pub const PARTICIPANT: &str = "Participant";
    pub const BALANCE: &str = "Balance";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const GROUP: &str = "Group";
    pub const MEMBERS: &str = "Members";
    pub const BALANCES_HEADING: &str = "Balances";
    pub const SETTLEMENT_HEADING: &str = "Settlement";
    pub const GROUPS_HEADING: &str = "Groups";
    pub const ALL_SETTLED: &str = "Everyone is settled up.";
    pub const NO_GROUPS: &str = "No groups declared.";
    pub const MISSING_PARTICIPANTS: &str =
        "The sheet must start with a `PARTICIPANTS := ...` declaration.";
    pub const SETTLEMENT_CALCULATION_FAILED: &str = "Settlement calculation failed";
    pub const SETTLEMENT_INCOMPLETE: &str = "Balances remain after settlement";
    pub const SETTLEMENT_QUANTIZATION_INVALID_ADJUSTMENT: &str =
        "Rounding drift exceeds the number of participants";
    pub const SETTLEMENT_QUANTIZATION_ZERO_SUM_INVARIANT: &str =
        "Rounded balances do not sum to zero";
    pub const SETTLEMENT_QUANTIZATION_NON_INTEGRAL: &str =
        "Rounded balance is not a whole number of minor units";
    pub const SETTLEMENT_QUANTIZATION_FAILED: &str = "Rounding balances failed";
}

pub use strings::*;

#[cfg(feature = "ja")]
pub fn duplicate_participant(name: impl fmt::Display) -> String {
    format!("参加者 '{name}' が重複しています")
}

#[cfg(feature = "ja")]
pub fn reserved_participant_name(name: impl fmt::Display) -> String {
    format!("'{name}' は予約済みの名前のため参加者にできません")
}

#[cfg(feature = "ja")]
pub fn participants_redeclared() -> &'static str {
    "参加者が再度宣言されています"
}

#[cfg(feature = "ja")]
pub fn undefined_name(name: impl fmt::Display) -> String {
    format!("未定義の名前 '{name}' です")
}

#[cfg(feature = "ja")]
pub fn payer_not_participant(name: impl fmt::Display) -> String {
    format!("'{name}' は参加者ではないため支払人になれません")
}

#[cfg(feature = "ja")]
pub fn name_already_defined(name: impl fmt::Display) -> String {
    format!("'{name}' は既に定義されています")
}

#[cfg(feature = "ja")]
pub fn failed_to_evaluate_group(name: impl fmt::Display) -> String {
    format!("グループ '{name}' の評価に失敗しました")
}

#[cfg(feature = "ja")]
pub fn non_positive_amount(amount: impl fmt::Display) -> String {
    format!("金額は正の数である必要があります ({amount})")
}

#[cfg(feature = "ja")]
pub fn empty_split() -> &'static str {
    "割り勘の対象者がいません"
}

#[cfg(feature = "ja")]
pub fn amount_overflow() -> &'static str {
    "金額の合計が扱える範囲を超えています"
}

#[cfg(feature = "ja")]
pub fn settlement_quantization_imbalanced(total: impl fmt::Display) -> String {
    format!("収支の合計がゼロになりません (合計: {total})")
}

#[cfg(feature = "ja")]
pub fn settlement_quantization_unsupported_scale(scale: u32, max_supported: u32) -> String {
    format!("小数点以下 {scale} 桁には対応していません (最大 {max_supported})")
}

#[cfg(not(feature = "ja"))]
pub fn duplicate_participant(name: impl fmt::Display) -> String {
    format!("Participant '{name}' is declared more than once")
}

#[cfg(not(feature = "ja"))]
pub fn reserved_participant_name(name: impl fmt::Display) -> String {
    format!("'{name}' is reserved and cannot be a participant")
}

#[cfg(not(feature = "ja"))]
pub fn participants_redeclared() -> &'static str {
    "Participants are declared again"
}

#[cfg(not(feature = "ja"))]
pub fn undefined_name(name: impl fmt::Display) -> String {
    format!("Undefined name '{name}'")
}

#[cfg(not(feature = "ja"))]
pub fn payer_not_participant(name: impl fmt::Display) -> String {
    format!("'{name}' is not a participant and cannot pay")
}

#[cfg(not(feature = "ja"))]
pub fn name_already_defined(name: impl fmt::Display) -> String {
    format!("'{name}' is already defined")
}

#[cfg(not(feature = "ja"))]
pub fn failed_to_evaluate_group(name: impl fmt::Display) -> String {
    format!("Failed to evaluate group '{name}'")
}

#[cfg(not(feature = "ja"))]
pub fn non_positive_amount(amount: impl fmt::Display) -> String {
    format!("Amount must be positive (found {amount})")
}

#[cfg(not(feature = "ja"))]
pub fn empty_split() -> &'static str {
    "Expense is split between nobody"
}

#[cfg(not(feature = "ja"))]
pub fn amount_overflow() -> &'static str {
    "Expense amounts add up to more than can be represented"
}

#[cfg(not(feature = "ja"))]
pub fn settlement_quantization_imbalanced(total: impl fmt::Display) -> String {
    format!("Balances do not sum to zero (total: {total})")
}

#[cfg(not(feature = "ja"))]
pub fn settlement_quantization_unsupported_scale(scale: u32, max_supported: u32) -> String {
    format!("Scale {scale} is not supported (max {max_supported})")
}

pub struct SyntaxErrorMessage {
    line: usize,
    detail: String,
}

pub struct LineMessage<M> {
    line: usize,
    message: M,
}

pub fn syntax_error(line: usize, detail: String) -> SyntaxErrorMessage {
    SyntaxErrorMessage { line, detail }
}

/// Attaches a line number to any message.
pub fn at_line<M: fmt::Display>(line: usize, message: M) -> LineMessage<M> {
    LineMessage { line, message }
}

#[cfg(feature = "ja")]
impl fmt::Display for SyntaxErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "構文エラー (行 {}): {}", self.line, self.detail)
    }
}

#[cfg(feature = "ja")]
impl<M: fmt::Display> fmt::Display for LineMessage<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (行 {})", self.message, self.line)
    }
}

#[cfg(not(feature = "ja"))]
impl fmt::Display for SyntaxErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Syntax error at line {}: {}", self.line, self.detail)
    }
}

#[cfg(not(feature = "ja"))]
impl<M: fmt::Display> fmt::Display for LineMessage<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

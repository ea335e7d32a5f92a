/// Balance of each person in integer atomic units (e.g., cents).
/// Positive: is owed money, negative: owes money.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersonBalance<Id> {
    pub id: Id,
    pub balance: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payment<Id> {
    pub from: Id,
    pub to: Id,
    pub amount: i64,
}

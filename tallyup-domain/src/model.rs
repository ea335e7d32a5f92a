use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use fxhash::FxHashSet;
use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::services::MemberSetResolver;

/// Name of the built-in group that always holds every participant.
pub const ALL_PARTICIPANTS: &str = "PARTICIPANTS";

/// Decimal places kept for a single share before any currency rounding.
pub const SHARE_SCALE: u32 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u32);

/// Net position per participant, iterated in roster order.
pub type ParticipantBalances = BTreeMap<ParticipantId, Money>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// The division residual goes to the first share.
    FrontLoad,
}

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// `units` expressed at `scale` decimal places, e.g. `Money::new(1250, 2)` is 12.50.
    pub fn new(units: i64, scale: u32) -> Self {
        Self(Decimal::new(units, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Rounds half away from zero to `scale` places and pins the scale for display.
    pub fn round_to(self, scale: u32) -> Self {
        let mut rounded = self
            .0
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(scale);
        Self(rounded)
    }

    /// Splits into `parts` shares of [`SHARE_SCALE`] precision whose sum is exactly `self`.
    pub fn split_even(self, parts: usize, policy: RemainderPolicy) -> impl Iterator<Item = Money> {
        let divisor = Decimal::from(parts.max(1) as u64);
        let base = (self.0 / divisor).round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero);
        let residual = self.0 - base * divisor;

        (0..parts).map(move |idx| {
            let takes_residual = match policy {
                RemainderPolicy::FrontLoad => idx == 0,
            };
            if takes_residual {
                Money(base + residual)
            } else {
                Money(base)
            }
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerBuildError<'a> {
    #[error("no participants declared")]
    MissingParticipants,
    #[error("participant '{name}' is declared more than once")]
    DuplicateParticipant { name: &'a str },
    #[error("'{name}' is reserved and cannot be a participant")]
    ReservedParticipantName { name: &'a str },
    #[error("undefined name '{name}' at line {line}")]
    UndefinedName { name: &'a str, line: usize },
    #[error("'{name}' at line {line} is not a participant")]
    PayerNotParticipant { name: &'a str, line: usize },
    #[error("'{name}' at line {line} is already defined")]
    NameAlreadyDefined { name: &'a str, line: usize },
    #[error("failed to evaluate group '{name}' at line {line}")]
    FailedToEvaluateGroup { name: &'a str, line: usize },
    #[error("expense amount at line {line} must be positive (found {amount})")]
    NonPositiveAmount { amount: Money, line: usize },
    #[error("expense at line {line} is split between nobody")]
    EmptySplit { line: usize },
    #[error("expenses up to line {line} exceed the representable total")]
    AmountOverflow { line: usize },
}

/// Participants in declaration order. Names are the only identity, so a
/// repeated name is rejected instead of being merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster<'a> {
    names: IndexMap<&'a str, ParticipantId>,
}

impl<'a> Roster<'a> {
    pub fn try_new<I>(names: I) -> Result<Self, LedgerBuildError<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map: IndexMap<&'a str, ParticipantId> = IndexMap::new();
        for name in names {
            if name == ALL_PARTICIPANTS {
                return Err(LedgerBuildError::ReservedParticipantName { name });
            }
            if map.contains_key(name) {
                return Err(LedgerBuildError::DuplicateParticipant { name });
            }
            let id = ParticipantId(map.len() as u32);
            map.insert(name, id);
        }

        if map.is_empty() {
            return Err(LedgerBuildError::MissingParticipants);
        }

        Ok(Self { names: map })
    }

    pub fn id_of(&self, name: &str) -> Option<ParticipantId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: ParticipantId) -> Option<&'a str> {
        self.names
            .get_index(id.0 as usize)
            .map(|(name, _)| *name)
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.names.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, ParticipantId)> + '_ {
        self.names.iter().map(|(name, id)| (*name, *id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MemberSetOp<'a> {
    /// A participant or group name.
    Push(&'a str),
    Union,
    Intersection,
    Difference,
}

/// Set expression in postfix form.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MemberSetExpr<'a> {
    ops: Vec<MemberSetOp<'a>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSet {
    members: Vec<ParticipantId>,
}

impl MemberSet {
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> MemberSetExpr<'a> {
    pub fn new(ops: Vec<MemberSetOp<'a>>) -> Self {
        Self { ops }
    }

    pub fn single(name: &'a str) -> Self {
        Self::new(vec![MemberSetOp::Push(name)])
    }

    pub fn ops(&self) -> &[MemberSetOp<'a>] {
        &self.ops
    }

    pub fn evaluate<F>(&self, resolve: F) -> Option<FxHashSet<ParticipantId>>
    where
        F: Fn(&str) -> Option<FxHashSet<ParticipantId>>,
    {
        let mut stack: Vec<FxHashSet<ParticipantId>> = Vec::with_capacity(self.ops.len());

        for op in &self.ops {
            match op {
                MemberSetOp::Push(name) => stack.push(resolve(*name)?),
                MemberSetOp::Union => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a.union(&b).copied().collect());
                }
                MemberSetOp::Intersection => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a.intersection(&b).copied().collect());
                }
                MemberSetOp::Difference => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a.difference(&b).copied().collect());
                }
            }
        }

        if stack.len() == 1 { stack.pop() } else { None }
    }

    pub fn referenced_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            MemberSetOp::Push(name) => Some(*name),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub expression: MemberSetExpr<'a>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expense<'a> {
    pub name: Option<&'a str>,
    pub amount: Money,
    pub paid_by: &'a str,
    pub split_between: MemberSetExpr<'a>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement<'a> {
    Declaration(Declaration<'a>),
    Expense(Expense<'a>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

/// A validated list of expenses over a fixed roster.
#[derive(Debug)]
pub struct Ledger<'a> {
    roster: Roster<'a>,
    statements: Vec<StatementWithLine<'a>>,
}

impl<'a> Ledger<'a> {
    /// Validates every statement up front; one bad expense rejects the whole ledger.
    ///
    /// The sum of all amounts must fit in a `Decimal`. Every balance and
    /// every partial sum of balances is bounded by that total.
    pub fn try_new(
        roster: Roster<'a>,
        statements: Vec<StatementWithLine<'a>>,
    ) -> Result<Self, LedgerBuildError<'a>> {
        if roster.is_empty() {
            return Err(LedgerBuildError::MissingParticipants);
        }

        let mut resolver = MemberSetResolver::new(&roster);
        let mut total = Money::ZERO;

        for StatementWithLine { line, statement } in &statements {
            let line = *line;
            match statement {
                Statement::Declaration(decl) => {
                    // Participants, PARTICIPANTS and earlier groups are all taken.
                    if resolver.is_defined(decl.name) {
                        return Err(LedgerBuildError::NameAlreadyDefined {
                            name: decl.name,
                            line,
                        });
                    }
                    ensure_defined(&resolver, &decl.expression, line)?;
                    resolver
                        .evaluate_and_register_group(decl.name, &decl.expression)
                        .ok_or(LedgerBuildError::FailedToEvaluateGroup {
                            name: decl.name,
                            line,
                        })?;
                }
                Statement::Expense(expense) => {
                    if !expense.amount.is_positive() {
                        return Err(LedgerBuildError::NonPositiveAmount {
                            amount: expense.amount,
                            line,
                        });
                    }
                    if resolver.participant_id(expense.paid_by).is_none() {
                        return Err(if resolver.is_defined(expense.paid_by) {
                            LedgerBuildError::PayerNotParticipant {
                                name: expense.paid_by,
                                line,
                            }
                        } else {
                            LedgerBuildError::UndefinedName {
                                name: expense.paid_by,
                                line,
                            }
                        });
                    }
                    ensure_defined(&resolver, &expense.split_between, line)?;
                    let split = resolver
                        .evaluate_members(&expense.split_between)
                        .ok_or(LedgerBuildError::EmptySplit { line })?;
                    if split.is_empty() {
                        return Err(LedgerBuildError::EmptySplit { line });
                    }
                    total = total
                        .checked_add(expense.amount)
                        .ok_or(LedgerBuildError::AmountOverflow { line })?;
                }
            }
        }

        Ok(Self { roster, statements })
    }

    pub fn roster(&self) -> &Roster<'a> {
        &self.roster
    }

    pub fn statements(&self) -> &[StatementWithLine<'a>] {
        &self.statements
    }
}

fn ensure_defined<'a>(
    resolver: &MemberSetResolver<'a>,
    expr: &MemberSetExpr<'a>,
    line: usize,
) -> Result<(), LedgerBuildError<'a>> {
    match expr.referenced_names().find(|name| !resolver.is_defined(name)) {
        Some(name) => Err(LedgerBuildError::UndefinedName { name, line }),
        None => Ok(()),
    }
}

pub(crate) struct BalanceAccumulator<'a> {
    balances: ParticipantBalances,
    resolver: MemberSetResolver<'a>,
}

impl<'a> BalanceAccumulator<'a> {
    pub fn new(roster: &Roster<'a>) -> Self {
        let balances = roster.ids().map(|id| (id, Money::ZERO)).collect();
        let resolver = MemberSetResolver::new(roster);

        Self { balances, resolver }
    }

    /// Statements that do not resolve are skipped; `Ledger::try_new` rejects them earlier.
    pub fn apply(&mut self, statement: &Statement<'a>) {
        match statement {
            Statement::Declaration(decl) => {
                let _ = self
                    .resolver
                    .evaluate_and_register_group(decl.name, &decl.expression);
            }
            Statement::Expense(expense) => {
                let Some(payer) = self.resolver.participant_id(expense.paid_by) else {
                    return;
                };
                let Some(split) = self.resolver.evaluate_members(&expense.split_between) else {
                    return;
                };
                if split.is_empty() {
                    return;
                }

                *self.balances.entry(payer).or_insert(Money::ZERO) += expense.amount;
                distribute_shares(&mut self.balances, &split, expense.amount);
            }
        }
    }

    pub fn into_balances(self) -> ParticipantBalances {
        self.balances
    }
}

/// Debits each member of `members` with an even share of `amount`.
fn distribute_shares(balances: &mut ParticipantBalances, members: &MemberSet, amount: Money) {
    if members.is_empty() {
        return;
    }

    let shares = amount.split_even(members.len(), RemainderPolicy::FrontLoad);
    for (member, share) in members.iter().zip(shares) {
        *balances.entry(member).or_insert(Money::ZERO) -= share;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

#[derive(Debug, PartialEq)]
pub struct Settlement {
    pub new_balances: ParticipantBalances,
    pub transfers: Vec<Transfer>,
}

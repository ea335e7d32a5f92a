#![warn(clippy::uninlined_format_args)]

mod model;

use thiserror::Error;

pub use model::{Payment, PersonBalance};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Sum of balances must be zero (found {0})")]
    ImbalancedTotal(i128),
}

/// Greedy settlement: the largest debtor pays the largest creditor until
/// everyone is even.
///
/// Ties go to the person that comes first in `people`. The result has at
/// most `n - 1` payments for `n` people with a non-zero balance, but it is
/// not guaranteed to be the smallest possible set of payments.
pub fn minimize_transactions<Id: Copy>(
    people: impl IntoIterator<Item = PersonBalance<Id>>,
) -> Result<Vec<Payment<Id>>, SettlementError> {
    let people: Vec<PersonBalance<Id>> = people.into_iter().collect();
    let total: i128 = people.iter().map(|p| i128::from(p.balance)).sum();
    if total != 0 {
        return Err(SettlementError::ImbalancedTotal(total));
    }

    // (index into `people`, outstanding magnitude), kept in input order.
    let mut debtors: Vec<(usize, i128)> = Vec::new();
    let mut creditors: Vec<(usize, i128)> = Vec::new();
    for (idx, person) in people.iter().enumerate() {
        if person.balance < 0 {
            debtors.push((idx, -i128::from(person.balance)));
        } else if person.balance > 0 {
            creditors.push((idx, i128::from(person.balance)));
        }
    }

    let mut payments = Vec::with_capacity((debtors.len() + creditors.len()).saturating_sub(1));

    while let (Some(d), Some(c)) = (largest(&debtors), largest(&creditors)) {
        let amount = debtors[d].1.min(creditors[c].1);
        // Bounded by a creditor's original i64 balance.
        payments.push(Payment {
            from: people[debtors[d].0].id,
            to: people[creditors[c].0].id,
            amount: amount as i64,
        });

        debtors[d].1 -= amount;
        creditors[c].1 -= amount;
        if debtors[d].1 == 0 {
            debtors.remove(d);
        }
        if creditors[c].1 == 0 {
            creditors.remove(c);
        }
    }

    debug_assert!(debtors.is_empty() && creditors.is_empty());
    Ok(payments)
}

/// Position of the largest outstanding amount; the earliest entry wins ties.
fn largest(entries: &[(usize, i128)]) -> Option<usize> {
    let mut best: Option<(usize, i128)> = None;
    for (pos, &(_, amount)) in entries.iter().enumerate() {
        match best {
            Some((_, best_amount)) if best_amount >= amount => {}
            _ => best = Some((pos, amount)),
        }
    }
    best.map(|(pos, _)| pos)
}

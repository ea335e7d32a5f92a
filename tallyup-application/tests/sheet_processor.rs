use proptest::prelude::*;
use rstest::{fixture, rstest};
use std::fmt::Write as _;
use tallyup_application::{
    GroupMembers, ProcessingOutcome, Sheet, SheetParseError, SheetProcessor,
};
use tallyup_domain::{Money, ParticipantId, SettlementContext, Transfer};
use tallyup_infrastructure::{GreedySettlementOptimizer, TallyupSheetParser};

static TEST_PARSER: TallyupSheetParser = TallyupSheetParser;
static TEST_OPTIMIZER: GreedySettlementOptimizer = GreedySettlementOptimizer;

const NAMES: [&str; 6] = ["Ann", "Ben", "Cid", "Dee", "Eve", "Fay"];

#[fixture]
fn processor() -> SheetProcessor<'static> {
    SheetProcessor::new(
        &TEST_PARSER,
        &TEST_OPTIMIZER,
        SettlementContext::usd_default(),
    )
}

fn parse_sheet<'a>(processor: &SheetProcessor<'static>, content: &'a str) -> Sheet<'a> {
    match processor.parse_sheet(content) {
        ProcessingOutcome::Success(sheet) => sheet,
        ProcessingOutcome::Rejected(err) => panic!("parse failed: {err}"),
    }
}

fn transfer(from: u32, to: u32, cents: i64) -> Transfer {
    Transfer {
        from: ParticipantId(from),
        to: ParticipantId(to),
        amount: Money::new(cents, 2),
    }
}

#[rstest]
fn three_way_dinner(processor: SheetProcessor<'static>) {
    let sheet = parse_sheet(
        &processor,
        "PARTICIPANTS := Alice, Bob, Carol\nDinner: Alice paid 90 for PARTICIPANTS",
    );

    let result = processor
        .build_settlement_result(&sheet)
        .expect("settlement should succeed");

    let balances: Vec<Money> = result.balances.iter().map(|b| b.balance).collect();
    assert_eq!(
        balances,
        vec![Money::new(6000, 2), Money::new(-3000, 2), Money::new(-3000, 2)]
    );
    assert_eq!(
        result.transfers,
        vec![transfer(1, 0, 3000), transfer(2, 0, 3000)]
    );
}

#[rstest]
fn partial_split_leaves_bystander_out_of_settlement(processor: SheetProcessor<'static>) {
    let sheet = parse_sheet(
        &processor,
        "PARTICIPANTS := Alice, Bob, Carol\nBob paid 100 for Alice, Bob",
    );

    let result = processor
        .build_settlement_result(&sheet)
        .expect("settlement should succeed");

    let balances: Vec<Money> = result.balances.iter().map(|b| b.balance).collect();
    assert_eq!(
        balances,
        vec![Money::new(-5000, 2), Money::new(5000, 2), Money::new(0, 2)]
    );
    assert_eq!(result.transfers, vec![transfer(0, 1, 5000)]);
}

#[rstest]
fn uneven_split_is_repaired_to_the_cent(processor: SheetProcessor<'static>) {
    let sheet = parse_sheet(
        &processor,
        "PARTICIPANTS := Alice, Bob, Carol\nAlice paid 100 for Alice, Bob, Carol",
    );

    let result = processor
        .build_settlement_result(&sheet)
        .expect("settlement should succeed");

    let balances: Vec<Money> = result.balances.iter().map(|b| b.balance).collect();
    assert_eq!(
        balances,
        vec![Money::new(6666, 2), Money::new(-3333, 2), Money::new(-3333, 2)]
    );
    let paid: Money = result.transfers.iter().map(|t| t.amount).sum();
    assert_eq!(paid, Money::new(6666, 2));
}

#[rstest]
fn mixed_sheet_with_groups(processor: SheetProcessor<'static>) {
    let content = "\
PARTICIPANTS := Alice, Bob, Carol, Dave
friends := Alice Bob Carol
Alice paid 120 for friends
Bob paid $40 for PARTICIPANTS - Alice
!groups
Dave paid 20 for Dave ∪ Carol
!settle";
    let sheet = parse_sheet(&processor, content);

    let groups = processor.groups_for_prefix(&sheet, 4);
    assert_eq!(
        groups,
        vec![GroupMembers {
            name: "friends",
            members: vec![ParticipantId(0), ParticipantId(1), ParticipantId(2)],
        }]
    );

    let result = processor
        .build_settlement_result(&sheet)
        .expect("settlement should succeed");
    let total: Money = result.balances.iter().map(|b| b.balance).sum();
    assert_eq!(total, Money::ZERO);
    assert_eq!(result.balances[0].balance, Money::new(8000, 2));
    assert_eq!(result.transfers.len(), 3);
    assert!(result.transfers.iter().all(|t| t.to == ParticipantId(0)));
}

#[rstest]
fn empty_sheet_has_zero_balances_and_no_transfers(processor: SheetProcessor<'static>) {
    let sheet = parse_sheet(&processor, "PARTICIPANTS := Alice, Bob");

    let balances = processor.calculate_balances(&sheet);
    assert!(balances.values().all(|b| b.is_zero()));

    let result = processor
        .build_settlement_result(&sheet)
        .expect("settlement should succeed");
    assert!(result.transfers.is_empty());
}

#[rstest]
#[case::unknown_payer(
    "PARTICIPANTS := Alice, Bob\nZed paid 10 for Alice",
    SheetParseError::UndefinedName { name: "Zed", line: 2 }
)]
#[case::duplicate_name(
    "PARTICIPANTS := Alice, Alice",
    SheetParseError::DuplicateParticipant { name: "Alice" }
)]
#[case::one_bad_expense_rejects_all(
    "PARTICIPANTS := Alice, Bob\nAlice paid 10 for Bob\nBob paid 0 for Alice",
    SheetParseError::NonPositiveAmount { amount: Money::ZERO, line: 3 }
)]
#[case::amounts_past_decimal_range(
    "PARTICIPANTS := Alice, Bob\n\
     Alice paid 79228162514264337593543950335 for Bob\n\
     Bob paid 79228162514264337593543950335 for Alice",
    SheetParseError::AmountOverflow { line: 3 }
)]
fn invalid_sheets_are_rejected(
    processor: SheetProcessor<'static>,
    #[case] content: &str,
    #[case] expected: SheetParseError<'_>,
) {
    match processor.parse_sheet(content) {
        ProcessingOutcome::Rejected(err) => assert_eq!(err, expected),
        ProcessingOutcome::Success(_) => panic!("sheet should be rejected"),
    }
}

fn random_sheet(
    member_count: usize,
    amounts: &[i64],
    payer_indexes: &[usize],
    split_masks: &[usize],
) -> String {
    let mut content = format!("PARTICIPANTS := {}\n", NAMES[..member_count].join(", "));
    for (idx, cents) in amounts.iter().enumerate() {
        let payer = NAMES[payer_indexes.get(idx).copied().unwrap_or(0) % member_count];
        let mask = split_masks.get(idx).copied().unwrap_or(0) % (1 << member_count);
        let split: Vec<&str> = NAMES[..member_count]
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << *bit) != 0)
            .map(|(_, name)| *name)
            .collect();
        let split = if split.is_empty() {
            "PARTICIPANTS".to_string()
        } else {
            split.join(" ")
        };
        let _ = writeln!(
            content,
            "{payer} paid {}.{:02} for {split}",
            cents / 100,
            cents % 100
        );
    }
    content
}

proptest! {
    #[test]
    fn settlement_clears_every_balance(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1i64..=500_000, 0..=20),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=20),
        split_masks in prop::collection::vec(0usize..=63, 0..=20),
    ) {
        let processor = SheetProcessor::new(
            &TEST_PARSER,
            &TEST_OPTIMIZER,
            SettlementContext::usd_default(),
        );
        let content = random_sheet(member_count, &amounts, &payer_indexes, &split_masks);
        let sheet = parse_sheet(&processor, &content);

        let raw_total: Money = processor.calculate_balances(&sheet).values().sum();
        prop_assert_eq!(raw_total, Money::ZERO);

        let result = processor
            .build_settlement_result(&sheet)
            .expect("settlement should succeed");

        let non_zero = result.balances.iter().filter(|b| !b.balance.is_zero()).count();
        prop_assert!(result.transfers.len() <= non_zero.saturating_sub(1));

        let mut remaining: Vec<Money> = result.balances.iter().map(|b| b.balance).collect();
        for t in &result.transfers {
            prop_assert!(t.amount.is_positive());
            remaining[t.from.0 as usize] += t.amount;
            remaining[t.to.0 as usize] -= t.amount;
        }
        prop_assert!(remaining.iter().all(|m| m.is_zero()));
    }
}

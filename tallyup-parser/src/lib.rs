#![warn(clippy::uninlined_format_args)]

mod i18n;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1, satisfy},
    combinator::{map_res, not, opt, recognize},
    multi::{many0, many1, separated_list1},
    sequence::delimited,
};
use rust_decimal::Decimal;

/// Reserved name of the roster declaration and of the group holding everyone.
pub const PARTICIPANTS_KEYWORD: &str = "PARTICIPANTS";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetOp<'a> {
    Push(&'a str), // participant or group name
    Union,
    Intersection,
    Difference,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetExpr<'a> {
    ops: Vec<SetOp<'a>>,
}

impl<'a> SetExpr<'a> {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    fn single(name: &'a str) -> Self {
        Self {
            ops: vec![SetOp::Push(name)],
        }
    }

    fn push(&mut self, op: SetOp<'a>) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[SetOp<'a>] {
        &self.ops
    }

    pub fn referenced_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            SetOp::Push(name) => Some(*name),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub expression: SetExpr<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense<'a> {
    pub label: Option<&'a str>,
    pub payer: &'a str,
    pub amount: Decimal,
    pub split: SetExpr<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Balances,
    Groups,
    Settle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    Declaration(Declaration<'a>),
    Expense(Expense<'a>),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

/// A parsed sheet. `statements` never contains the roster declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet<'a> {
    pub participants: Vec<&'a str>,
    pub statements: Vec<StatementWithLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("The sheet must start with `PARTICIPANTS := ...`.")]
    MissingParticipantsDeclaration,
    #[error("Participants are declared again at line {line}.")]
    ParticipantsRedeclared { line: usize },
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

enum Line<'a> {
    Participants(Vec<&'a str>),
    Statement(Statement<'a>),
}

fn is_name_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_japanese_char(c)
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c == '-' || c == '\''
}

fn is_japanese_char(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}' | // Hiragana
        '\u{30A0}'..='\u{30FF}' | // Katakana
        '\u{4E00}'..='\u{9FFF}' | // Kanji
        '\u{3400}'..='\u{4DBF}'   // Kanji extension
    )
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize((satisfy(is_name_start), take_while(is_name_char))).parse(input)
}

fn blank(input: &str) -> IResult<&str, &str> {
    fn fullwidth_space(input: &str) -> IResult<&str, &str> {
        take_while1(|c: char| c == '\u{3000}')(input)
    }

    fn comment(input: &str) -> IResult<&str, &str> {
        delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
    }

    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    alt((multispace1, fullwidth_space, comment, line_comment)).parse(input)
}

fn sp(input: &str) -> IResult<&str, &str> {
    recognize(many0(blank)).parse(input)
}

fn sp1(input: &str) -> IResult<&str, &str> {
    recognize(many1(blank)).parse(input)
}

fn union_token(input: &str) -> IResult<&str, &str> {
    alt((tag("∪"), tag(","), tag("，"))).parse(input)
}

// `A ∪ B`, `A, B` and `A B` all mean union.
fn union_separator(input: &str) -> IResult<&str, &str> {
    alt((recognize((sp, union_token, sp)), sp1)).parse(input)
}

fn set_primary(input: &str) -> IResult<&str, SetExpr<'_>> {
    alt((
        (char('('), sp, set_expr, sp, char(')')).map(|(_, _, expr, _, _)| expr),
        identifier.map(SetExpr::single),
    ))
    .parse(input)
}

fn set_difference(input: &str) -> IResult<&str, SetExpr<'_>> {
    (set_primary, many0((sp, tag("-"), sp, set_primary)))
        .map(|(first, ops)| {
            ops.into_iter().fold(first, |mut acc, (_, _, _, right)| {
                acc.ops.extend(right.ops);
                acc.push(SetOp::Difference);
                acc
            })
        })
        .parse(input)
}

fn set_intersection(input: &str) -> IResult<&str, SetExpr<'_>> {
    (set_difference, many0((sp, tag("∩"), sp, set_difference)))
        .map(|(first, ops)| {
            ops.into_iter().fold(first, |mut acc, (_, _, _, right)| {
                acc.ops.extend(right.ops);
                acc.push(SetOp::Intersection);
                acc
            })
        })
        .parse(input)
}

// Union binds loosest.
fn set_expr(input: &str) -> IResult<&str, SetExpr<'_>> {
    (set_intersection, many0((union_separator, set_intersection)))
        .map(|(first, ops)| {
            ops.into_iter().fold(first, |mut acc, (_, right)| {
                acc.ops.extend(right.ops);
                acc.push(SetOp::Union);
                acc
            })
        })
        .parse(input)
}

// PARTICIPANTS := Alice, Bob, Carol
fn participants(input: &str) -> IResult<&str, Vec<&str>> {
    (
        tag(PARTICIPANTS_KEYWORD),
        sp,
        tag(":="),
        sp,
        separated_list1(union_separator, identifier),
    )
        .map(|(_, _, _, _, names)| names)
        .parse(input)
}

// name := expression (e.g., name := (A ∪ B) ∩ C)
fn declaration(input: &str) -> IResult<&str, Declaration<'_>> {
    (identifier, sp, tag(":="), sp, set_expr)
        .map(|(name, _, _, _, expression)| Declaration { name, expression })
        .parse(input)
}

fn amount(input: &str) -> IResult<&str, Decimal> {
    (
        opt(char('$')),
        map_res(recognize((digit1, opt((char('.'), digit1)))), |s: &str| {
            s.parse::<Decimal>()
        }),
    )
        .map(|(_, amount)| amount)
        .parse(input)
}

fn label(input: &str) -> IResult<&str, &str> {
    (
        take_while1(|c: char| c != ':' && c != '\n'),
        char(':'),
        not(char('=')),
    )
        .map(|(label, _, _): (&str, _, _)| label.trim_end())
        .parse(input)
}

// {payer} paid {amount} for {split}
fn expense_body(input: &str) -> IResult<&str, Expense<'_>> {
    (
        identifier, // payer
        sp,
        tag_no_case("paid"),
        sp,
        amount,
        sp,
        tag_no_case("for"),
        sp,
        set_expr, // split
    )
        .map(|(payer, _, _, _, amount, _, _, _, split)| Expense {
            label: None,
            payer,
            amount,
            split,
        })
        .parse(input)
}

fn expense(input: &str) -> IResult<&str, Expense<'_>> {
    alt((
        (label, sp, expense_body).map(|(label, _, expense)| Expense {
            label: Some(label),
            ..expense
        }),
        expense_body,
    ))
    .parse(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        tag_no_case("!balances").map(|_| Command::Balances),
        tag_no_case("!groups").map(|_| Command::Groups),
        tag_no_case("!settle").map(|_| Command::Settle),
    ))
    .parse(input)
}

fn line(input: &str) -> IResult<&str, Line<'_>> {
    (
        sp,
        alt((
            participants.map(Line::Participants),
            declaration.map(|decl| Line::Statement(Statement::Declaration(decl))),
            expense.map(|expense| Line::Statement(Statement::Expense(expense))),
            command.map(|command| Line::Statement(Statement::Command(command))),
        )),
        sp,
    )
        .map(|(_, line, _)| line)
        .parse(input)
}

/// Splits `input` into numbered lines, joining lines while a `/* */`
/// comment is open so the comment can span them.
fn logical_lines(input: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for raw in input.split_inclusive('\n') {
        let content = raw
            .strip_suffix('\n')
            .map_or(raw, |s| s.strip_suffix('\r').unwrap_or(s));
        spans.push((offset, offset + content.len()));
        offset += raw.len();
    }

    let mut lines = Vec::with_capacity(spans.len());
    let mut idx = 0;
    while idx < spans.len() {
        let first = idx;
        let mut open = block_comment_open_after(&input[spans[idx].0..spans[idx].1], false);
        while open && idx + 1 < spans.len() {
            idx += 1;
            open = block_comment_open_after(&input[spans[idx].0..spans[idx].1], true);
        }
        lines.push((first + 1, &input[spans[first].0..spans[idx].1]));
        idx += 1;
    }
    lines
}

/// Whether a block comment is still open at the end of `text`.
fn block_comment_open_after(text: &str, mut open: bool) -> bool {
    let mut rest = text;
    loop {
        if open {
            let Some(end) = rest.find("*/") else {
                return true;
            };
            rest = &rest[end + 2..];
            open = false;
        } else {
            match (rest.find("/*"), rest.find("//")) {
                (Some(start), Some(line)) if line < start => return false,
                (Some(start), _) => {
                    rest = &rest[start + 2..];
                    open = true;
                }
                (None, _) => return false,
            }
        }
    }
}

/// Parses a whole sheet, one statement per line. The first statement must
/// declare the participants.
pub fn parse_sheet(input: &str) -> Result<Sheet<'_>, ParseError> {
    let mut participants: Option<Vec<&str>> = None;
    let mut statements = Vec::new();

    for (first_line, text) in logical_lines(input) {
        let (rest, skipped) = sp(text).map_err(|e| ParseError::SyntaxError {
            line: first_line,
            detail: i18n::syntax_error_detail(e),
        })?;
        if rest.trim().is_empty() {
            continue;
        }
        // A statement after a multi-line comment sits on the line the comment closes.
        let line_no = first_line + skipped.matches('\n').count();

        let parsed = match line(rest) {
            Ok((rest, parsed)) => {
                if !rest.trim().is_empty() {
                    return Err(ParseError::SyntaxError {
                        line: line_no,
                        detail: i18n::syntax_error_unparsed_detail(rest.trim()),
                    });
                }
                parsed
            }
            Err(e) => {
                return Err(ParseError::SyntaxError {
                    line: line_no,
                    detail: i18n::syntax_error_detail(e),
                });
            }
        };

        match parsed {
            Line::Participants(names) => {
                if participants.is_some() {
                    return Err(ParseError::ParticipantsRedeclared { line: line_no });
                }
                participants = Some(names);
            }
            Line::Statement(statement) => {
                if participants.is_none() {
                    return Err(ParseError::MissingParticipantsDeclaration);
                }
                statements.push(StatementWithLine {
                    line: line_no,
                    statement,
                });
            }
        }
    }

    let participants = participants.ok_or(ParseError::MissingParticipantsDeclaration)?;
    Ok(Sheet {
        participants,
        statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    #[rstest]
    #[case::single("Alice", &[SetOp::Push("Alice")])]
    #[case::union_symbol(
        "Alice ∪ Bob",
        &[SetOp::Push("Alice"), SetOp::Push("Bob"), SetOp::Union]
    )]
    #[case::union_comma(
        "Alice, Bob",
        &[SetOp::Push("Alice"), SetOp::Push("Bob"), SetOp::Union]
    )]
    #[case::union_space(
        "Alice Bob Carol",
        &[
            SetOp::Push("Alice"),
            SetOp::Push("Bob"),
            SetOp::Union,
            SetOp::Push("Carol"),
            SetOp::Union
        ]
    )]
    #[case::intersection(
        "friends ∩ Bob",
        &[SetOp::Push("friends"), SetOp::Push("Bob"), SetOp::Intersection]
    )]
    #[case::difference(
        "PARTICIPANTS - Bob",
        &[SetOp::Push("PARTICIPANTS"), SetOp::Push("Bob"), SetOp::Difference]
    )]
    #[case::difference_binds_tighter_than_union(
        "Alice - Bob ∪ Carol",
        &[
            SetOp::Push("Alice"),
            SetOp::Push("Bob"),
            SetOp::Difference,
            SetOp::Push("Carol"),
            SetOp::Union
        ]
    )]
    #[case::nested(
        "(Alice ∪ Bob) ∩ Carol",
        &[
            SetOp::Push("Alice"),
            SetOp::Push("Bob"),
            SetOp::Union,
            SetOp::Push("Carol"),
            SetOp::Intersection
        ]
    )]
    fn test_set_expr_ops(#[case] input: &str, #[case] expected: &'static [SetOp]) {
        let (rest, expr) = set_expr(input).unwrap();
        assert_eq!(rest, "");
        assert_eq!(expr.ops(), expected);
    }

    #[rstest]
    #[case::comma("PARTICIPANTS := Alice, Bob, Carol")]
    #[case::space("PARTICIPANTS := Alice Bob Carol")]
    #[case::union("PARTICIPANTS := Alice ∪ Bob ∪ Carol")]
    #[case::trailing_comment("PARTICIPANTS := Alice, Bob, Carol // trip")]
    fn test_participants_header(#[case] input: &str) {
        let sheet = parse_sheet(input).expect("header should parse");
        assert_eq!(sheet.participants, vec!["Alice", "Bob", "Carol"]);
        assert!(sheet.statements.is_empty());
    }

    #[rstest]
    #[case::plain(
        "Alice paid 90 for PARTICIPANTS",
        Expense {
            label: None,
            payer: "Alice",
            amount: dec("90"),
            split: SetExpr::single("PARTICIPANTS"),
        }
    )]
    #[case::labelled_dollars(
        "Dinner: Alice paid $12.50 for Bob",
        Expense {
            label: Some("Dinner"),
            payer: "Alice",
            amount: dec("12.50"),
            split: SetExpr::single("Bob"),
        }
    )]
    #[case::label_with_spaces(
        "Train tickets: Bob PAID 30 FOR Carol",
        Expense {
            label: Some("Train tickets"),
            payer: "Bob",
            amount: dec("30"),
            split: SetExpr::single("Carol"),
        }
    )]
    #[case::colon_in_trailing_comment(
        "Alice paid 5 for Bob // note: coffee",
        Expense {
            label: None,
            payer: "Alice",
            amount: dec("5"),
            split: SetExpr::single("Bob"),
        }
    )]
    fn test_expense(#[case] input: &str, #[case] expected: Expense<'_>) {
        let content = format!("PARTICIPANTS := Alice, Bob, Carol\n{input}");
        let sheet = parse_sheet(&content).expect("expense should parse");
        assert_eq!(sheet.statements.len(), 1);
        assert_eq!(sheet.statements[0].line, 2);
        assert_eq!(sheet.statements[0].statement, Statement::Expense(expected));
    }

    #[test]
    fn test_expense_split_set_algebra() {
        let (_, expense) = expense("Bob paid 12.50 for friends - Bob").unwrap();
        assert_eq!(
            expense.split.ops(),
            &[
                SetOp::Push("friends"),
                SetOp::Push("Bob"),
                SetOp::Difference
            ]
        );
    }

    #[rstest]
    #[case::balances("!balances", Command::Balances)]
    #[case::groups("!groups", Command::Groups)]
    #[case::settle("!settle", Command::Settle)]
    #[case::case_insensitive("!SETTLE", Command::Settle)]
    fn test_commands(#[case] input: &str, #[case] expected: Command) {
        let content = format!("PARTICIPANTS := Alice\n{input}");
        let sheet = parse_sheet(&content).expect("command should parse");
        assert_eq!(
            sheet.statements[0].statement,
            Statement::Command(expected)
        );
    }

    #[test]
    fn test_declaration() {
        let sheet = parse_sheet("PARTICIPANTS := Alice, Bob\nfriends := Alice /* both */ Bob")
            .expect("declaration should parse");
        assert_eq!(
            sheet.statements[0].statement,
            Statement::Declaration(Declaration {
                name: "friends",
                expression: SetExpr {
                    ops: vec![SetOp::Push("Alice"), SetOp::Push("Bob"), SetOp::Union],
                },
            })
        );
    }

    #[rstest]
    #[case::blank_lines("PARTICIPANTS := Alice\n\n   \n")]
    #[case::comment_lines("// trip\nPARTICIPANTS := Alice\n/* nothing */")]
    #[case::block_comment_spans_lines("PARTICIPANTS := Alice\n/* trip\n notes\n */")]
    #[case::crlf_block_comment("PARTICIPANTS := Alice\r\n/* trip\r\n notes */\r\n")]
    fn test_ignores_blank_and_comment_lines(#[case] input: &str) {
        let sheet = parse_sheet(input).expect("should parse");
        assert_eq!(sheet.participants, vec!["Alice"]);
        assert!(sheet.statements.is_empty());
    }

    #[test]
    fn test_multi_line_block_comment_keeps_line_numbers() {
        let input = "PARTICIPANTS := Alice, Bob\n\
                     /* trip\n\
                     notes */\n\
                     Alice paid 10 for Bob /* taxi\n\
                     back */\n\
                     /* late\n\
                     */ Bob paid 4 for Alice\n\
                     // a /* inside a line comment\n\
                     !settle";
        let sheet = parse_sheet(input).expect("should parse");

        let lines: Vec<usize> = sheet.statements.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![4, 7, 9]);
        assert!(matches!(
            &sheet.statements[1].statement,
            Statement::Expense(Expense { payer: "Bob", .. })
        ));
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_comments("// nothing here")]
    #[case::expense_first("Alice paid 10 for Bob\nPARTICIPANTS := Alice, Bob")]
    fn test_missing_participants(#[case] input: &str) {
        assert_eq!(
            parse_sheet(input),
            Err(ParseError::MissingParticipantsDeclaration)
        );
    }

    #[test]
    fn test_participants_redeclared() {
        assert_eq!(
            parse_sheet("PARTICIPANTS := Alice\nPARTICIPANTS := Bob"),
            Err(ParseError::ParticipantsRedeclared { line: 2 })
        );
    }

    #[rstest]
    #[case::unparsed_tail("PARTICIPANTS := Alice\nAlice paid 10 for Alice )", 2)]
    #[case::negative_amount("PARTICIPANTS := Alice\nAlice paid -10 for Alice", 2)]
    #[case::missing_for("PARTICIPANTS := Alice\nAlice paid 10 Alice", 2)]
    #[case::unknown_command("PARTICIPANTS := Alice\n!explode", 2)]
    #[case::unterminated_comment("PARTICIPANTS := Alice /* trip", 1)]
    fn test_syntax_errors(#[case] input: &str, #[case] expected_line: usize) {
        match parse_sheet(input) {
            Err(ParseError::SyntaxError { line, .. }) => assert_eq!(line, expected_line),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}

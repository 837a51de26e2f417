#![warn(clippy::uninlined_format_args)]

use std::str::FromStr;

use indexmap::IndexMap;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till1, take_until, take_while, take_while1},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, opt, rest},
    multi::separated_list1,
    sequence::preceded,
};
use rust_decimal::Decimal;
use tally_domain::Expense;

const EXPENSE_SYNTAX: &str = "expected `<payer> paid <amount> for <name>, <name>, ...` or `... for *`";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Bad line {line}: '{content}'. Expected 'name: amount'")]
    BadLine { line: usize, content: String },
    #[error("Invalid amount '{value}' at line {line}")]
    InvalidAmount { line: usize, value: String },
    #[error("No valid entries found.")]
    NoEntries,
    #[error("First line must be a `MEMBERS := name, name, ...` declaration")]
    MissingMembersDeclaration,
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

/// Members and expenses of an itemized ledger, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemizedLedger {
    pub members: Vec<String>,
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaidEntry<'a> {
    name: &'a str,
    amount: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sharers<'a> {
    Everyone,
    Named(Vec<&'a str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExpenseLine<'a> {
    payer: &'a str,
    amount: &'a str,
    sharers: Sharers<'a>,
    description: &'a str,
}

// name: amount
fn colon_entry(input: &str) -> IResult<&str, PaidEntry<'_>> {
    (take_until(":"), char::<&str, nom::error::Error<&str>>(':'), rest)
        .map(|(name, _, amount)| PaidEntry {
            name: name.trim(),
            amount: amount.trim(),
        })
        .parse(input)
}

// name, amount
fn comma_entry(input: &str) -> IResult<&str, PaidEntry<'_>> {
    (take_until(","), char::<&str, nom::error::Error<&str>>(','), rest)
        .map(|(name, _, amount)| PaidEntry {
            name: name.trim(),
            amount: amount.trim(),
        })
        .parse(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

// name amount (exactly two tokens)
fn spaced_entry(input: &str) -> IResult<&str, PaidEntry<'_>> {
    all_consuming((
        token,
        take_while1(|c: char| c.is_whitespace()),
        token,
        take_while(|c: char| c.is_whitespace()),
    ))
    .map(|(name, _, amount, _)| PaidEntry { name, amount })
    .parse(input)
}

fn paid_entry(input: &str) -> IResult<&str, PaidEntry<'_>> {
    alt((colon_entry, comma_entry, spaced_entry)).parse(input)
}

fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.strip_prefix('$').unwrap_or(value);
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Parses `name: amount` lines into a paid-totals table.
///
/// `name, amount` and `name amount` are accepted too. Blank lines are
/// skipped; a name given more than once has its amounts added up.
pub fn parse_paid_ledger(input: &str) -> Result<IndexMap<String, Decimal>, ParseError> {
    let mut ledger: IndexMap<String, Decimal> = IndexMap::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Ok((_, entry)) = paid_entry(line) else {
            return Err(ParseError::BadLine {
                line: idx + 1,
                content: line.to_owned(),
            });
        };
        let invalid_amount = || ParseError::InvalidAmount {
            line: idx + 1,
            value: entry.amount.to_owned(),
        };

        let amount = parse_amount(entry.amount).ok_or_else(invalid_amount)?;
        let total = ledger
            .entry(entry.name.to_owned())
            .or_insert(Decimal::ZERO);
        *total = total.checked_add(amount).ok_or_else(invalid_amount)?;
    }

    if ledger.is_empty() {
        return Err(ParseError::NoEntries);
    }
    Ok(ledger)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))(input)
}

fn list_separator(input: &str) -> IResult<&str, char> {
    (space0, char(','), space0)
        .map(|(_, separator, _)| separator)
        .parse(input)
}

// MEMBERS := alice, bob, carol
fn members_declaration(input: &str) -> IResult<&str, Vec<&str>> {
    (
        tag("MEMBERS"),
        space0,
        tag(":="),
        space0,
        separated_list1(list_separator, identifier),
        space0,
    )
        .map(|(_, _, _, _, members, _)| members)
        .parse(input)
}

fn amount_literal(input: &str) -> IResult<&str, &str> {
    preceded(
        opt(char('$')),
        take_while1(|c: char| c.is_ascii_digit() || c == '.'),
    )
    .parse(input)
}

fn sharers(input: &str) -> IResult<&str, Sharers<'_>> {
    alt((
        char('*').map(|_| Sharers::Everyone),
        separated_list1(list_separator, identifier).map(Sharers::Named),
    ))
    .parse(input)
}

fn description(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), rest).map(str::trim).parse(input)
}

// {payer} paid {amount} for {sharers} [# description]
fn expense_line(input: &str) -> IResult<&str, ExpenseLine<'_>> {
    (
        identifier,
        space1,
        tag_no_case("paid"),
        space1,
        amount_literal,
        space1,
        tag_no_case("for"),
        space1,
        sharers,
        space0,
        opt(description),
    )
        .map(
            |(payer, _, _, _, amount, _, _, _, sharers, _, description)| ExpenseLine {
                payer,
                amount,
                sharers,
                description: description.unwrap_or_default(),
            },
        )
        .parse(input)
}

/// Parses an itemized ledger: a `MEMBERS := ...` line followed by one
/// expense per line.
pub fn parse_itemized_ledger(input: &str) -> Result<ItemizedLedger, ParseError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, raw.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, first)) = lines.next() else {
        return Err(ParseError::MissingMembersDeclaration);
    };
    let Ok((_, members)) = all_consuming(members_declaration).parse(first) else {
        return Err(ParseError::MissingMembersDeclaration);
    };
    let members: Vec<String> = members.into_iter().map(str::to_owned).collect();

    let mut expenses = Vec::new();
    for (line, content) in lines {
        let (_, parsed) =
            all_consuming(expense_line)
                .parse(content)
                .map_err(|_| ParseError::SyntaxError {
                    line,
                    detail: EXPENSE_SYNTAX.to_owned(),
                })?;
        let amount = parse_amount(parsed.amount).ok_or_else(|| ParseError::InvalidAmount {
            line,
            value: parsed.amount.to_owned(),
        })?;
        let participants: Vec<String> = match parsed.sharers {
            Sharers::Everyone => members.clone(),
            Sharers::Named(names) => names.into_iter().map(str::to_owned).collect(),
        };

        expenses.push(
            Expense::new(parsed.payer, amount, participants).with_description(parsed.description),
        );
    }

    Ok(ItemizedLedger { members, expenses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case::colon("person 1: 1000", "person 1", "1000")]
    #[case::comma("Bob, 12.50", "Bob", "12.50")]
    #[case::spaces("Cara   650", "Cara", "650")]
    #[case::no_break_space("Dan\u{a0}5", "Dan", "5")]
    #[case::tab_and_ideographic_space("Eve\t\u{3000}7", "Eve", "7")]
    #[case::colon_wins_over_comma("a, b: 5", "a, b", "5")]
    #[case::only_first_colon("x: 1: 2", "x", "1: 2")]
    fn splits_paid_entries(#[case] input: &str, #[case] name: &str, #[case] amount: &str) {
        let (_, entry) = paid_entry(input).expect("entry should parse");
        assert_eq!(entry, PaidEntry { name, amount });
    }

    #[test]
    fn parses_default_text_area() {
        let ledger = parse_paid_ledger("person 1: 1000\nperson 2: 100\nperson 3: 650\n")
            .expect("ledger should parse");

        let entries: Vec<(&str, Decimal)> = ledger
            .iter()
            .map(|(name, amount)| (name.as_str(), *amount))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("person 1", dec!(1000)),
                ("person 2", dec!(100)),
                ("person 3", dec!(650)),
            ]
        );
    }

    #[test]
    fn repeated_names_accumulate_and_blank_lines_are_skipped() {
        let ledger = parse_paid_ledger("\n  A: 10\n\nB 5\nA, 2.5\n").expect("ledger should parse");

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger["A"], dec!(12.5));
        assert_eq!(ledger["B"], dec!(5));
    }

    #[test]
    fn unicode_whitespace_separates_name_and_amount() {
        let ledger = parse_paid_ledger("A\u{a0}5\nB\u{2003}10").expect("ledger should parse");

        assert_eq!(ledger["A"], dec!(5));
        assert_eq!(ledger["B"], dec!(10));
    }

    #[test]
    fn negative_amounts_are_left_for_validation() {
        let ledger = parse_paid_ledger("A: -5\nB: 10").expect("ledger should parse");
        assert_eq!(ledger["A"], dec!(-5));
    }

    #[rstest]
    #[case::three_tokens("a b c", ParseError::BadLine { line: 1, content: "a b c".to_owned() })]
    #[case::single_token("\nlonely", ParseError::BadLine { line: 2, content: "lonely".to_owned() })]
    #[case::not_a_number("A: lots", ParseError::InvalidAmount { line: 1, value: "lots".to_owned() })]
    #[case::missing_amount("A:", ParseError::InvalidAmount { line: 1, value: String::new() })]
    #[case::empty("", ParseError::NoEntries)]
    #[case::blank_only("  \n\t\n", ParseError::NoEntries)]
    fn rejects_bad_paid_ledgers(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse_paid_ledger(input), Err(expected));
    }

    #[test]
    fn accepts_currency_sign_and_scientific_amounts() {
        let ledger = parse_paid_ledger("A: $12.34\nB: 1e3").expect("ledger should parse");
        assert_eq!(ledger["A"], dec!(12.34));
        assert_eq!(ledger["B"], dec!(1000));
    }

    #[test]
    fn parses_itemized_ledger() {
        let source = "MEMBERS := alice, bob, carol\n\
                      alice paid 30 for alice, bob # dinner\n\
                      \n\
                      bob PAID $12.50 for *\n";

        let ledger = parse_itemized_ledger(source).expect("ledger should parse");

        assert_eq!(ledger.members, vec!["alice", "bob", "carol"]);
        assert_eq!(
            ledger.expenses,
            vec![
                Expense::new("alice", dec!(30), ["alice", "bob"]).with_description("dinner"),
                Expense::new("bob", dec!(12.50), ["alice", "bob", "carol"]),
            ]
        );
    }

    #[rstest]
    #[case::no_members("alice paid 3 for bob", ParseError::MissingMembersDeclaration)]
    #[case::empty_input("", ParseError::MissingMembersDeclaration)]
    #[case::empty_members("MEMBERS :=", ParseError::MissingMembersDeclaration)]
    #[case::missing_for(
        "MEMBERS := a, b\na paid 3 b",
        ParseError::SyntaxError { line: 2, detail: EXPENSE_SYNTAX.to_owned() }
    )]
    #[case::bad_amount(
        "MEMBERS := a, b\n\na paid 1.2.3 for b",
        ParseError::InvalidAmount { line: 3, value: "1.2.3".to_owned() }
    )]
    fn rejects_bad_itemized_ledgers(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse_itemized_ledger(input), Err(expected));
    }

    #[test]
    fn unknown_names_are_left_for_validation() {
        let ledger =
            parse_itemized_ledger("MEMBERS := a\nz paid 1 for q").expect("syntax is valid");
        assert_eq!(ledger.expenses[0].payer, "z");
        assert_eq!(ledger.expenses[0].participants, vec!["q"]);
    }
}

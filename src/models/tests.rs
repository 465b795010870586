#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use super::*;

fn make_line(direction: TransactionDirection) -> ParsedTransactionLine {
    ParsedTransactionLine {
        direction,
        amount: dec!(50.25),
        action: "paid from".into(),
        account_type: "Premier".into(),
        account_number: "123456".into(),
        partial_card_number: String::new(),
        method: "Eft".into(),
        available: Some(dec!(1000)),
        reference: "Rent".into(),
        date: "23Jun".into(),
        time: "02:44".into(),
    }
}

// ── TransactionDirection ──────────────────────────────────────

#[test]
fn test_direction_parse_canonical() {
    assert_eq!(TransactionDirection::parse("Income"), Some(TransactionDirection::Income));
    assert_eq!(TransactionDirection::parse("Expense"), Some(TransactionDirection::Expense));
}

#[test]
fn test_direction_parse_case_and_whitespace() {
    assert_eq!(TransactionDirection::parse(" income "), Some(TransactionDirection::Income));
    assert_eq!(TransactionDirection::parse("EXPENSE"), Some(TransactionDirection::Expense));
}

#[test]
fn test_direction_parse_unknown() {
    assert_eq!(TransactionDirection::parse(""), None);
    assert_eq!(TransactionDirection::parse("Unknown"), None);
    assert_eq!(TransactionDirection::parse("RegexPattern"), None);
}

#[test]
fn test_direction_display_matches_as_str() {
    assert_eq!(TransactionDirection::Income.to_string(), "Income");
    assert_eq!(TransactionDirection::Expense.to_string(), "Expense");
}

// ── TransactionDirection ──────────────────────────────────────

#[test]
fn test_direction_apply_sign() {
    assert_eq!(TransactionDirection::Income.apply(dec!(50.25)), dec!(50.25));
    assert_eq!(TransactionDirection::Expense.apply(dec!(50.25)), dec!(-50.25));
}

// ── ParsedLineRecord ──────────────────────────────────────────

#[test]
fn test_record_new_sets_partition_and_unique_keys() {
    let line = make_line(TransactionDirection::Expense);
    let a = ParsedLineRecord::new(&line);
    let b = ParsedLineRecord::new(&line);
    assert_eq!(a.partition_key, PARTITION_KEY);
    assert_ne!(a.row_key, b.row_key);
    assert_eq!(a.direction, "Expense");
    assert_eq!(a.direction(), Some(TransactionDirection::Expense));
}

#[test]
fn test_record_unrecognised_direction() {
    let mut record = ParsedLineRecord::new(&make_line(TransactionDirection::Income));
    record.direction = "Sideways".into();
    assert_eq!(record.direction(), None);

    record.direction = "  ".into();
    assert_eq!(record.direction(), None);
}

#[test]
fn test_record_to_line_round_trips_fields() {
    let line = make_line(TransactionDirection::Expense);
    let at = Utc.with_ymd_and_hms(2024, 6, 23, 2, 44, 0).unwrap();
    let record = ParsedLineRecord::with_key(&line, "row-1".into(), at);
    assert_eq!(record.created_at, at);
    assert_eq!(record.to_line(TransactionDirection::Expense), line);
}

#[test]
fn test_record_summary_text() {
    let record = ParsedLineRecord::new(&make_line(TransactionDirection::Expense));
    assert_eq!(record.summary_text(), "R 50.25 paid from Rent (23Jun 02:44)");
}

// ── UnparsedLine ──────────────────────────────────────────────

#[test]
fn test_unparsed_line_keeps_text_verbatim() {
    let line = UnparsedLine::new("  Hello   there ");
    assert_eq!(line.text_line, "  Hello   there ");
    assert_eq!(line.partition_key, PARTITION_KEY);
    assert!(!line.row_key.is_empty());
}

// ── CategoryRule ──────────────────────────────────────────────

#[test]
fn test_rule_key_and_default_type() {
    let rule = CategoryRule::new_regex("(?i)merchant", "Shopping");
    assert_eq!(rule.rule_type, DEFAULT_RULE_TYPE);
    assert_eq!(rule.key(), ("RegexPattern", "(?i)merchant"));
    assert_eq!(rule.legacy_direction(), None);
}

#[test]
fn test_rule_legacy_direction() {
    let rule = CategoryRule::new("Expense", "shop", "Shopping");
    assert_eq!(rule.legacy_direction(), Some(TransactionDirection::Expense));
}

#[test]
fn test_rule_json_is_camel_case() {
    let json = r#"{"ruleType":"Income","matchPattern":"salary","categoryName":"Salary"}"#;
    let rule: CategoryRule = serde_json::from_str(json).unwrap();
    assert_eq!(rule, CategoryRule::new("Income", "salary", "Salary"));
}

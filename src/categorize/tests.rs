#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{CategoryRule, ParsedLineRecord};

fn make_record(row_key: &str, direction: &str, amount: Decimal, action: &str, reference: &str) -> ParsedLineRecord {
    ParsedLineRecord {
        partition_key: "InContactText".into(),
        row_key: row_key.into(),
        created_at: chrono::Utc::now(),
        direction: direction.into(),
        amount,
        action: action.into(),
        account_type: "Premier".into(),
        account_number: "123456".into(),
        partial_card_number: String::new(),
        method: "Eft".into(),
        available: None,
        reference: reference.into(),
        date: "23Jun".into(),
        time: "02:44".into(),
    }
}

fn rule_set(rules: &[(&str, &str, &str)]) -> CategoryRuleSet {
    let mut set = CategoryRuleSet::new();
    for (t, p, c) in rules {
        assert_eq!(set.insert(CategoryRule::new(*t, *p, *c), InsertMode::Reject), RuleOutcome::Inserted);
    }
    set
}

fn find<'a>(summaries: &'a [CategorySummary], name: &str) -> &'a CategorySummary {
    summaries.iter().find(|s| s.category_name == name).unwrap()
}

// ── Rule validation ───────────────────────────────────────────

#[test]
fn test_validate_rule_accepts_reasonable_rule() {
    assert!(validate_rule(&CategoryRule::new_regex("(?i)merchant", "Shopping")).is_ok());
}

#[test]
fn test_validate_rule_requires_type() {
    assert!(validate_rule(&CategoryRule::new(" ", "merchant", "Shopping")).is_err());
}

#[test]
fn test_validate_rule_min_lengths() {
    assert!(validate_rule(&CategoryRule::new_regex("m", "Shopping")).is_err());
    assert!(validate_rule(&CategoryRule::new_regex("merchant", "S")).is_err());
    assert!(validate_rule(&CategoryRule::new_regex("ab", "Sh")).is_ok());
}

#[test]
fn test_validate_rule_rejects_bad_regex() {
    let err = validate_rule(&CategoryRule::new_regex("(unclosed", "Shopping")).unwrap_err();
    assert!(err.to_string().contains("bad pattern"));
}

// ── CategoryRuleSet ───────────────────────────────────────────

#[test]
fn test_insert_same_rule_twice_reports_duplicate() {
    let mut set = CategoryRuleSet::new();
    let rule = CategoryRule::new("Expense", "(?i)merchant", "Shopping");
    let report = set.insert_batch(vec![rule.clone(), rule], InsertMode::Reject);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.duplicates, 1);
    assert!(report.failures.is_empty());
    assert_eq!(set.len(), 1);
}

#[test]
fn test_insert_replace_overwrites_category() {
    let mut set = rule_set(&[("RegexPattern", "coffee", "Eating Out")]);
    let outcome = set.insert(CategoryRule::new_regex("coffee", "Groceries"), InsertMode::Replace);
    assert_eq!(outcome, RuleOutcome::Inserted);
    assert_eq!(set.len(), 1);
    assert_eq!(set.by_category()[0].0, "Groceries");
}

#[test]
fn test_same_pattern_different_type_is_distinct() {
    let set = rule_set(&[("Expense", "coffee", "Eating Out"), ("RegexPattern", "coffee", "Eating Out")]);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_insert_batch_counts_failures() {
    let mut set = CategoryRuleSet::new();
    let report = set.insert_batch(
        vec![
            CategoryRule::new_regex("salary", "Salary"),
            CategoryRule::new_regex("x", "Salary"),
            CategoryRule::new_regex("[bad", "Salary"),
        ],
        InsertMode::Reject,
    );
    assert_eq!(report.inserted, 1);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.failures.len(), 2);
}

#[test]
fn test_from_rules_drops_later_duplicates() {
    let set = CategoryRuleSet::from_rules(vec![
        CategoryRule::new_regex("coffee", "Eating Out"),
        CategoryRule::new_regex("coffee", "Groceries"),
    ]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.by_category()[0].0, "Eating Out");
}

#[test]
fn test_by_category_is_alphabetical() {
    let set = rule_set(&[
        ("RegexPattern", "uber", "Transport"),
        ("RegexPattern", "coffee", "Eating Out"),
        ("RegexPattern", "bolt", "Transport"),
    ]);
    let groups = set.by_category();
    let names: Vec<&str> = groups.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["Eating Out", "Transport"]);
    assert_eq!(groups[1].1.len(), 2);
}

#[test]
fn test_by_category_ignores_case() {
    let set = rule_set(&[
        ("RegexPattern", "rent", "Rent"),
        ("RegexPattern", "spar", "groceries"),
        ("RegexPattern", "pnp", "Groceries"),
    ]);
    let names: Vec<&str> = set.by_category().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["Groceries", "groceries", "Rent"]);
}

// ── Aggregation ───────────────────────────────────────────────

#[test]
fn test_summarize_merchant_expense() {
    let set = rule_set(&[("Expense", "(?i)merchant", "Shopping")]);
    let records = vec![make_record("a", "Expense", dec!(50), "paid from", "Some Merchant")];
    let summaries = summarize(&set, &records);

    assert_eq!(summaries.len(), 2);
    let shopping = find(&summaries, "Shopping");
    assert_eq!(shopping.total, dec!(-50));
    assert_eq!(shopping.records.len(), 1);
    assert!(!shopping.is_unknown);

    let unknown = summaries.last().unwrap();
    assert!(unknown.is_unknown);
    assert_eq!(unknown.category_name, UNKNOWN_CATEGORY);
    assert!(unknown.records.is_empty());
    assert_eq!(unknown.total, Decimal::ZERO);
}

#[test]
fn test_summarize_matching_is_case_insensitive() {
    let set = rule_set(&[("RegexPattern", "MERCHANT", "Shopping")]);
    let records = vec![make_record("a", "Expense", dec!(10), "paid from", "some merchant")];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Shopping").total, dec!(-10));
}

#[test]
fn test_summarize_matches_action_as_well_as_reference() {
    let set = rule_set(&[("RegexPattern", "withdrawn", "Cash")]);
    let records = vec![make_record("a", "Expense", dec!(200), "withdrawn from", "Some ATM")];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Cash").total, dec!(-200));
}

#[test]
fn test_summarize_income_keeps_sign() {
    let set = rule_set(&[("RegexPattern", "salary", "Salary")]);
    let records = vec![make_record("a", "Income", dec!(1000), "paid to", "ACME SALARY")];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Salary").total, dec!(1000));
}

#[test]
fn test_summarize_signs_by_record_not_rule_type() {
    // Rule is typed Income but the record is an expense.
    let set = rule_set(&[("Income", "refund", "Refunds")]);
    let records = vec![make_record("a", "Expense", dec!(30), "paid from", "refund fee")];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Refunds").total, dec!(-30));
}

#[test]
fn test_summarize_unknown_direction_counts_positive() {
    let set = rule_set(&[("RegexPattern", "shop", "Shopping")]);
    let records = vec![make_record("a", "Sideways", dec!(25), "paid from", "shop")];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Shopping").total, dec!(25));
}

#[test]
fn test_summarize_skips_empty_categories_and_orders_alphabetically() {
    let set = rule_set(&[
        ("RegexPattern", "uber", "Transport"),
        ("RegexPattern", "coffee", "Eating Out"),
        ("RegexPattern", "gym", "Fitness"),
    ]);
    let records = vec![
        make_record("a", "Expense", dec!(80), "paid from", "UBER TRIP"),
        make_record("b", "Expense", dec!(35), "paid from", "Coffee Co"),
        make_record("c", "Expense", dec!(12), "paid from", "Mystery"),
    ];
    let summaries = summarize(&set, &records);
    let names: Vec<&str> = summaries.iter().map(|s| s.category_name.as_str()).collect();
    assert_eq!(names, vec!["Eating Out", "Transport", "Unknown"]);
    assert_eq!(summaries[2].records[0].row_key, "c");
}

#[test]
fn test_summarize_orders_categories_ignoring_case() {
    let set = rule_set(&[
        ("RegexPattern", "landlord", "Rent"),
        ("RegexPattern", "spar", "groceries"),
    ]);
    let records = vec![
        make_record("a", "Expense", dec!(9000), "paid from", "Landlord"),
        make_record("b", "Expense", dec!(450), "paid from", "Spar Rondebosch"),
    ];
    let summaries = summarize(&set, &records);
    let names: Vec<&str> = summaries.iter().map(|s| s.category_name.as_str()).collect();
    assert_eq!(names, vec!["groceries", "Rent", "Unknown"]);
}

#[test]
fn test_summarize_record_can_count_in_two_categories() {
    let set = rule_set(&[("RegexPattern", "coffee", "Eating Out"), ("RegexPattern", "co", "Companies")]);
    let records = vec![make_record("a", "Expense", dec!(35), "paid from", "Coffee Co")];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Eating Out").total, dec!(-35));
    assert_eq!(find(&summaries, "Companies").total, dec!(-35));
    assert!(summaries.last().unwrap().records.is_empty());
}

#[test]
fn test_summarize_totals_add_up_without_overlap() {
    let set = rule_set(&[
        ("RegexPattern", "salary", "Salary"),
        ("RegexPattern", "grocer", "Groceries"),
    ]);
    let records = vec![
        make_record("a", "Income", dec!(15000), "paid to", "ACME SALARY"),
        make_record("b", "Expense", dec!(845.10), "paid from", "Local Grocer"),
        make_record("c", "Expense", dec!(99.99), "reserved for purchase", "Online Store"),
        make_record("d", "Income", dec!(20), "REVERSAL of", "Online Store"),
    ];
    let summaries = summarize(&set, &records);

    let category_total: Decimal = summaries.iter().map(|s| s.total).sum();
    let record_total: Decimal = records.iter().map(signed_amount).sum();
    assert_eq!(category_total, record_total);
    assert_eq!(summaries.last().unwrap().total, dec!(-79.99));
}

#[test]
fn test_summarize_skips_invalid_patterns() {
    let set = CategoryRuleSet::from_rules(vec![
        CategoryRule::new_regex("[broken", "Broken"),
        CategoryRule::new_regex("shop", "Shopping"),
    ]);
    let records = vec![make_record("a", "Expense", dec!(5), "paid from", "shop")];
    let summaries = summarize(&set, &records);
    let names: Vec<&str> = summaries.iter().map(|s| s.category_name.as_str()).collect();
    assert_eq!(names, vec!["Shopping", "Unknown"]);
}

#[test]
fn test_summarize_inconsistent_rule_types_still_aggregates() {
    let set = rule_set(&[("Income", "transfer", "Transfers"), ("Expense", "t/fer", "Transfers")]);
    let records = vec![
        make_record("a", "Expense", dec!(100), "t/fer from", "Savings"),
        make_record("b", "Income", dec!(40), "paid to", "transfer in"),
    ];
    let summaries = summarize(&set, &records);
    assert_eq!(find(&summaries, "Transfers").total, dec!(-60));
}

#[test]
fn test_summarize_no_rules_puts_everything_in_unknown() {
    let records = vec![
        make_record("a", "Expense", dec!(10), "paid from", "A"),
        make_record("b", "Income", dec!(4), "paid to", "B"),
    ];
    let summaries = summarize(&CategoryRuleSet::new(), &records);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total, dec!(-6));
}

#[test]
fn test_record_summary_text() {
    let set = rule_set(&[("RegexPattern", "rent", "Housing")]);
    let records = vec![make_record("a", "Expense", dec!(876.32), "paid from", "Rent")];
    let summaries = summarize(&set, &records);
    assert_eq!(
        find(&summaries, "Housing").records[0].text,
        "R 876.32 paid from Rent (23Jun 02:44)"
    );
}

// ── suggest_pattern ───────────────────────────────────────────

#[test]
fn test_suggest_pattern_strips_digits() {
    assert_eq!(suggest_pattern("WOOLWORTHS 1234 CAPE TOWN"), "WOOLWORTHS CAPE");
}

#[test]
fn test_suggest_pattern_escapes_regex() {
    assert_eq!(suggest_pattern("Steamgames.com 4259522"), r"Steamgames\.com");
}

#[test]
fn test_suggest_pattern_all_digits_falls_back() {
    assert_eq!(suggest_pattern(" 12345 "), "12345");
}

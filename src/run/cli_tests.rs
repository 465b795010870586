#![allow(clippy::unwrap_used)]

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_positionals_skip_flags_and_values() {
    let a = args(&["out.csv", "--from", "2024-06-01", "--json", "extra"]);
    assert_eq!(positionals(&a), vec!["out.csv", "extra"]);
    assert_eq!(flag_value(&a, "--from"), Some("2024-06-01"));
    assert_eq!(flag_value(&a, "--to"), None);
    assert!(has_flag(&a, "--json"));
}

#[test]
fn test_date_range_explicit() {
    let a = args(&["--from", "2024-06-17", "--to", "2024-06-24"]);
    let (from, to) = date_range(&a).unwrap();
    assert_eq!(from, NaiveDate::from_ymd_opt(2024, 6, 17).unwrap());
    assert_eq!(to, NaiveDate::from_ymd_opt(2024, 6, 24).unwrap());
}

#[test]
fn test_date_range_defaults_to_last_week() {
    let a = args(&["--to", "2024-06-24"]);
    let (from, _) = date_range(&a).unwrap();
    assert_eq!(from, NaiveDate::from_ymd_opt(2024, 6, 17).unwrap());
}

#[test]
fn test_date_range_rejects_inverted_and_bad_dates() {
    assert!(date_range(&args(&["--from", "2024-06-25", "--to", "2024-06-24"])).is_err());
    assert!(date_range(&args(&["--from", "24/06/2024"])).is_err());
}

#[test]
fn test_day_bounds_include_whole_end_day() {
    let day = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();
    let (start, end) = day_bounds(day, day);
    assert_eq!(start.to_rfc3339(), "2024-06-24T00:00:00+00:00");
    assert_eq!(end.to_rfc3339(), "2024-06-25T00:00:00+00:00");
}

#[test]
fn test_shellexpand_leaves_plain_paths() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    assert!(!shellexpand("~/out.csv").starts_with('~'));
}

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::CategoryRuleSet;
use crate::models::{ParsedLineRecord, TransactionDirection};

pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub row_key: String,
    pub signed_amount: Decimal,
    pub reference: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category_name: String,
    pub total: Decimal,
    pub records: Vec<RecordSummary>,
    pub is_unknown: bool,
}

impl CategorySummary {
    fn build(category_name: &str, records: &[&ParsedLineRecord], is_unknown: bool) -> Self {
        let records: Vec<RecordSummary> = records
            .iter()
            .map(|r| RecordSummary {
                row_key: r.row_key.clone(),
                signed_amount: signed_amount(r),
                reference: r.reference.clone(),
                text: r.summary_text(),
            })
            .collect();
        Self {
            category_name: category_name.to_string(),
            total: records.iter().map(|r| r.signed_amount).sum(),
            records,
            is_unknown,
        }
    }
}

/// Sign by the record's own stored direction. Unrecognised labels count as
/// positive.
pub fn signed_amount(record: &ParsedLineRecord) -> Decimal {
    match record.direction() {
        Some(direction) => direction.apply(record.amount),
        None => {
            warn!(
                row_key = %record.row_key,
                direction = %record.direction,
                "Unrecognised direction, counting amount as positive"
            );
            record.amount
        }
    }
}

fn compile(patterns: &[&str], category: &str) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| {
            match RegexBuilder::new(p).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(category, pattern = %p, error = %e, "Skipping invalid rule pattern");
                    None
                }
            }
        })
        .collect()
}

/// Bucket records by category.
///
/// A record is selected by every category with a pattern matching its
/// reference or action, so it can contribute to more than one total.
/// Records no category selected end up in the trailing `Unknown` bucket,
/// which is always present.
pub fn summarize(rules: &CategoryRuleSet, records: &[ParsedLineRecord]) -> Vec<CategorySummary> {
    let mut summaries = Vec::new();
    let mut claimed: HashSet<&str> = HashSet::new();

    for (category, category_rules) in rules.by_category() {
        let directions: HashSet<TransactionDirection> = category_rules
            .iter()
            .filter_map(|r| r.legacy_direction())
            .collect();
        if directions.len() > 1 {
            warn!(category, "InconsistentDirection: rules for category disagree on direction");
        }

        let patterns: Vec<&str> = category_rules
            .iter()
            .map(|r| r.match_pattern.as_str())
            .collect();
        let regexes = compile(&patterns, category);

        let matched: Vec<&ParsedLineRecord> = records
            .iter()
            .filter(|r| {
                regexes
                    .iter()
                    .any(|re| re.is_match(&r.reference) || re.is_match(&r.action))
            })
            .collect();

        if matched.is_empty() {
            debug!(category, "No records for category");
            continue;
        }

        claimed.extend(matched.iter().copied().map(|r| r.row_key.as_str()));
        summaries.push(CategorySummary::build(category, &matched, false));
    }

    let unknown: Vec<&ParsedLineRecord> = records
        .iter()
        .filter(|r| !claimed.contains(r.row_key.as_str()))
        .collect();
    summaries.push(CategorySummary::build(UNKNOWN_CATEGORY, &unknown, true));

    summaries
}

use chrono::NaiveDate;
use serde::Serialize;

use crate::categorize::CategorySummary;
use crate::models::{ParsedLineRecord, UnparsedLine};

/// A headed table of display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(headings: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            columns: headings.iter().map(|h| (*h).to_string()).collect(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub summary_items: Vec<CategorySummary>,
    pub parsed_entries: ReportTable,
    pub non_parsed_entries: ReportTable,
}

const PARSED_HEADINGS: &[&str] = &[
    "Amount",
    "Action",
    "Reference",
    "Method",
    "DateTime",
    "Available",
    "Account/Card",
];

const NON_PARSED_HEADINGS: &[&str] = &["Text Line"];

fn parsed_row(r: &ParsedLineRecord) -> Vec<String> {
    vec![
        r.amount.to_string(),
        r.action.clone(),
        r.reference.clone(),
        r.method.clone(),
        format!("{} {}", r.date, r.time),
        r.available.map_or_else(|| "null".to_string(), |a| a.to_string()),
        format!("{}, {}, {}", r.account_type, r.account_number, r.partial_card_number),
    ]
}

/// Put aggregation output and both line tables together. Table rows are
/// ordered by creation time regardless of input order.
pub fn assemble(
    summaries: Vec<CategorySummary>,
    parsed: &[ParsedLineRecord],
    unparsed: &[UnparsedLine],
) -> ReportData {
    let mut parsed: Vec<&ParsedLineRecord> = parsed.iter().collect();
    parsed.sort_by_key(|r| r.created_at);
    let mut unparsed: Vec<&UnparsedLine> = unparsed.iter().collect();
    unparsed.sort_by_key(|l| l.created_at);

    ReportData {
        summary_items: summaries,
        parsed_entries: ReportTable::new(
            PARSED_HEADINGS,
            parsed.into_iter().map(parsed_row).collect(),
        ),
        non_parsed_entries: ReportTable::new(
            NON_PARSED_HEADINGS,
            unparsed.into_iter().map(|l| vec![l.text_line.clone()]).collect(),
        ),
    }
}

pub fn subject(parsed: usize, unparsed: usize, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "FNB InContact Parser: Parsed {parsed} ({unparsed} non-parsable) entries between {} and {}",
        start.format("%d %b"),
        end.format("%d %b")
    )
}

/// Heading line for one summary bucket, e.g. `Groceries R -845.10`.
pub fn summary_heading(summary: &CategorySummary) -> String {
    format!("{} R {:.2}", summary.category_name, summary.total)
}

impl ReportData {
    /// Distinct references nothing categorized, in first-seen order.
    pub fn unknown_references(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        let unknown = self.summary_items.iter().filter(|s| s.is_unknown);
        for record in unknown.flat_map(|s| &s.records) {
            if !seen.contains(&record.reference) {
                seen.push(record.reference.clone());
            }
        }
        seen
    }
}

use std::collections::BTreeMap;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::is_ignorable;
use crate::models::ParsedTransactionLine;
use crate::parse::LineParser;

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Parsed {
        line: String,
        record: ParsedTransactionLine,
    },
    Unparsed {
        line: String,
    },
    Ignored {
        line: String,
    },
}

impl LineOutcome {
    pub fn line(&self) -> &str {
        match self {
            Self::Parsed { line, .. } | Self::Unparsed { line } | Self::Ignored { line } => line,
        }
    }
}

/// One outcome per input line, in input order. Ignorable patterns are only
/// consulted for lines no catalog pattern recognised.
pub fn process_lines(parser: &LineParser, lines: &[String], ignorable: &[Regex]) -> Vec<LineOutcome> {
    let outcomes: Vec<LineOutcome> = lines
        .iter()
        .map(|line| match parser.parse(line) {
            Ok(record) => LineOutcome::Parsed {
                line: line.clone(),
                record,
            },
            Err(_) if is_ignorable(line, ignorable) => {
                warn!(line = %line, "Line could not be parsed but is ignorable, dropping it");
                LineOutcome::Ignored { line: line.clone() }
            }
            Err(e) => {
                info!("{e}");
                LineOutcome::Unparsed { line: line.clone() }
            }
        })
        .collect();

    let parsed = outcomes
        .iter()
        .filter(|o| matches!(o, LineOutcome::Parsed { .. }))
        .count();
    let unparsed = outcomes
        .iter()
        .filter(|o| matches!(o, LineOutcome::Unparsed { .. }))
        .count();
    info!(parsed, "Parsed text lines");
    if unparsed > 0 {
        warn!(unparsed, "Failed to parse text lines");
    }

    outcomes
}

/// Counts from persisting a batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub parsed: usize,
    pub unparsed: usize,
    pub ignored: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowFundsAlert {
    pub account_number: String,
    pub partial_card_number: String,
    pub lowest_available: Decimal,
}

impl LowFundsAlert {
    pub fn subject(&self) -> String {
        format!(
            "Low available funds in FNB account {} (card {})",
            self.account_number, self.partial_card_number
        )
    }

    pub fn message(&self) -> String {
        format!(
            "Only R {} available in {} (card {})",
            self.lowest_available, self.account_number, self.partial_card_number
        )
    }
}

/// Accounts whose reported balance dipped below `threshold`, one alert per
/// (account, card) with the lowest balance seen.
pub fn low_funds_alerts<'a, I>(records: I, threshold: Decimal) -> Vec<LowFundsAlert>
where
    I: IntoIterator<Item = &'a ParsedTransactionLine>,
{
    let mut lowest: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    for record in records {
        let Some(available) = record.available else {
            continue;
        };
        if available >= threshold {
            continue;
        }
        lowest
            .entry((record.account_number.clone(), record.partial_card_number.clone()))
            .and_modify(|v| *v = (*v).min(available))
            .or_insert(available);
    }

    lowest
        .into_iter()
        .map(|((account_number, partial_card_number), lowest_available)| LowFundsAlert {
            account_number,
            partial_card_number,
            lowest_available,
        })
        .collect()
}

mod catalog;
mod rebuild;

pub use catalog::{fnb_catalog_file, CatalogFile, CatalogPattern, DirectionMarkers, PatternCatalog};
pub use rebuild::LineReconstructor;

use std::str::FromStr;

use regex::Captures;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::error::ParseError;
use crate::models::ParsedTransactionLine;

/// Result of trying a single catalog pattern against a line.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternMatch {
    Matched(ParsedTransactionLine),
    NoMatch,
    MalformedAmount(String),
    UnknownDirection(String),
}

pub struct LineParser {
    catalog: PatternCatalog,
}

impl LineParser {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Try each pattern in catalog order; the first usable match wins.
    pub fn parse(&self, line: &str) -> Result<ParsedTransactionLine, ParseError> {
        for pattern in self.catalog.patterns() {
            match self.try_pattern(pattern, line) {
                PatternMatch::Matched(parsed) => return Ok(parsed),
                PatternMatch::NoMatch => {}
                PatternMatch::MalformedAmount(raw) => {
                    error!(
                        action_kind = %pattern.action_kind,
                        amount = %raw,
                        "Could not parse amount, trying next pattern"
                    );
                }
                PatternMatch::UnknownDirection(action) => {
                    debug!(
                        action_kind = %pattern.action_kind,
                        action = %action,
                        "No direction for action, trying next pattern"
                    );
                }
            }
        }

        Err(ParseError { line: line.to_string() })
    }

    pub fn try_pattern(&self, pattern: &CatalogPattern, line: &str) -> PatternMatch {
        let Some(caps) = pattern.regex.captures(line) else {
            return PatternMatch::NoMatch;
        };

        let raw_amount = group(&caps, "Amount");
        let Ok(amount) = Decimal::from_str(raw_amount) else {
            return PatternMatch::MalformedAmount(raw_amount.to_string());
        };

        let action = group(&caps, "Action");
        let Some(direction) = self.catalog.markers().infer(action) else {
            return PatternMatch::UnknownDirection(action.to_string());
        };

        // An empty balance is what the rebuilder writes for a missing one.
        let available = caps.name("Available").filter(|m| !m.as_str().is_empty()).and_then(|m| {
            match Decimal::from_str(m.as_str()) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(available = %m.as_str(), "Could not parse available balance");
                    None
                }
            }
        });

        PatternMatch::Matched(ParsedTransactionLine {
            direction,
            amount,
            action: action.to_string(),
            account_type: group(&caps, "AccountType").to_string(),
            account_number: group(&caps, "AccountNumber").to_string(),
            partial_card_number: group(&caps, "PartialCardNumber").to_string(),
            method: group(&caps, "Method").to_string(),
            available,
            reference: group(&caps, "Reference").to_string(),
            date: group(&caps, "Date").to_string(),
            time: group(&caps, "Time").to_string(),
        })
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ParsedTransactionLine, TransactionDirection};

/// Coarse partition tag shared by every stored line.
pub const PARTITION_KEY: &str = "InContactText";

/// A parsed line as it sits in the store.
///
/// `direction` is kept as the raw stored label: rows written before direction
/// inference existed have it empty, and nothing stops a hand-edited store from
/// holding something else entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLineRecord {
    pub partition_key: String,
    pub row_key: String,
    pub created_at: DateTime<Utc>,
    pub direction: String,
    pub amount: Decimal,
    pub action: String,
    pub account_type: String,
    pub account_number: String,
    pub partial_card_number: String,
    pub method: String,
    pub available: Option<Decimal>,
    pub reference: String,
    pub date: String,
    pub time: String,
}

impl ParsedLineRecord {
    pub fn new(line: &ParsedTransactionLine) -> Self {
        Self::with_key(line, Uuid::new_v4().to_string(), Utc::now())
    }

    pub fn with_key(line: &ParsedTransactionLine, row_key: String, created_at: DateTime<Utc>) -> Self {
        Self {
            partition_key: PARTITION_KEY.into(),
            row_key,
            created_at,
            direction: line.direction.as_str().into(),
            amount: line.amount,
            action: line.action.clone(),
            account_type: line.account_type.clone(),
            account_number: line.account_number.clone(),
            partial_card_number: line.partial_card_number.clone(),
            method: line.method.clone(),
            available: line.available,
            reference: line.reference.clone(),
            date: line.date.clone(),
            time: line.time.clone(),
        }
    }

    /// The stored direction, if it is one of the canonical values.
    pub fn direction(&self) -> Option<TransactionDirection> {
        TransactionDirection::parse(&self.direction)
    }

    /// Rebuild the in-memory line using the given direction.
    pub fn to_line(&self, direction: TransactionDirection) -> ParsedTransactionLine {
        ParsedTransactionLine {
            direction,
            amount: self.amount,
            action: self.action.clone(),
            account_type: self.account_type.clone(),
            account_number: self.account_number.clone(),
            partial_card_number: self.partial_card_number.clone(),
            method: self.method.clone(),
            available: self.available,
            reference: self.reference.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
        }
    }

    pub fn summary_text(&self) -> String {
        format!(
            "R {:.2} {} {} ({} {})",
            self.amount, self.action, self.reference, self.date, self.time
        )
    }
}

/// A line no pattern recognised, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnparsedLine {
    pub partition_key: String,
    pub row_key: String,
    pub created_at: DateTime<Utc>,
    pub text_line: String,
}

impl UnparsedLine {
    pub fn new(text_line: impl Into<String>) -> Self {
        Self {
            partition_key: PARTITION_KEY.into(),
            row_key: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            text_line: text_line.into(),
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TransactionDirection;

/// One notification line broken into its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransactionLine {
    pub direction: TransactionDirection,
    pub amount: Decimal,
    pub action: String,
    pub account_type: String,
    pub account_number: String,
    /// Empty when the template carries no card number.
    pub partial_card_number: String,
    pub method: String,
    pub available: Option<Decimal>,
    pub reference: String,
    pub date: String,
    pub time: String,
}

use serde::{Deserialize, Serialize};

use super::TransactionDirection;

/// Rule type written by current tooling. Older rules used a direction name.
pub const DEFAULT_RULE_TYPE: &str = "RegexPattern";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub rule_type: String,
    pub match_pattern: String,
    pub category_name: String,
}

impl CategoryRule {
    pub fn new(
        rule_type: impl Into<String>,
        match_pattern: impl Into<String>,
        category_name: impl Into<String>,
    ) -> Self {
        Self {
            rule_type: rule_type.into(),
            match_pattern: match_pattern.into(),
            category_name: category_name.into(),
        }
    }

    pub fn new_regex(match_pattern: impl Into<String>, category_name: impl Into<String>) -> Self {
        Self::new(DEFAULT_RULE_TYPE, match_pattern, category_name)
    }

    /// Natural key: (rule type, pattern).
    pub fn key(&self) -> (&str, &str) {
        (&self.rule_type, &self.match_pattern)
    }

    /// The direction a legacy rule was typed with, if it was typed by one.
    pub fn legacy_direction(&self) -> Option<TransactionDirection> {
        TransactionDirection::parse(&self.rule_type)
    }
}

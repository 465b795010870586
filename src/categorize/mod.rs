mod aggregate;
mod rule_set;

pub use aggregate::{signed_amount, summarize, CategorySummary, UNKNOWN_CATEGORY};
pub use rule_set::{
    validate_rule, CategoryRuleSet, InsertMode, RuleBatchReport, RuleOutcome,
};

/// Suggest a rule pattern for a bank reference nobody has categorized yet.
pub fn suggest_pattern(reference: &str) -> String {
    // Card references carry store numbers and terminal ids after the name
    let cleaned: String = reference
        .chars()
        .map(|c| if c.is_ascii_digit() || c == '*' || c == '#' { ' ' } else { c })
        .collect();

    let words: Vec<&str> = cleaned.split_whitespace().take(2).collect();
    if words.is_empty() {
        return regex::escape(reference.trim());
    }
    regex::escape(&words.join(" "))
}

#[cfg(test)]
mod tests;

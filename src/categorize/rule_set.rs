use std::collections::BTreeMap;

use regex::RegexBuilder;
use tracing::debug;

use crate::error::RuleError;
use crate::models::CategoryRule;

const MIN_PATTERN_LEN: usize = 2;
const MIN_CATEGORY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    #[default]
    Reject,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Inserted,
    Duplicate,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBatchReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub failures: Vec<String>,
}

impl RuleBatchReport {
    pub fn record(&mut self, outcome: RuleOutcome) {
        match outcome {
            RuleOutcome::Inserted => self.inserted += 1,
            RuleOutcome::Duplicate => self.duplicates += 1,
            RuleOutcome::Failed(reason) => self.failures.push(reason),
        }
    }
}

/// Check a rule before it is stored.
pub fn validate_rule(rule: &CategoryRule) -> Result<(), RuleError> {
    if rule.rule_type.trim().is_empty() {
        return Err(RuleError::Invalid("rule type is required".into()));
    }
    if rule.match_pattern.chars().count() < MIN_PATTERN_LEN {
        return Err(RuleError::Invalid(format!(
            "pattern must be at least {MIN_PATTERN_LEN} characters"
        )));
    }
    if rule.category_name.trim().chars().count() < MIN_CATEGORY_LEN {
        return Err(RuleError::Invalid(format!(
            "category name must be at least {MIN_CATEGORY_LEN} characters"
        )));
    }
    RegexBuilder::new(&rule.match_pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleError::Invalid(format!("bad pattern {}: {e}", rule.match_pattern)))?;
    Ok(())
}

/// Rules in insertion order, unique on (rule type, pattern).
#[derive(Debug, Clone, Default)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
}

impl CategoryRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap rules already accepted by the store. Later duplicates are dropped.
    pub fn from_rules(rules: Vec<CategoryRule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            if set.position(&rule).is_none() {
                set.rules.push(rule);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn position(&self, rule: &CategoryRule) -> Option<usize> {
        self.rules.iter().position(|r| r.key() == rule.key())
    }

    pub fn insert(&mut self, rule: CategoryRule, mode: InsertMode) -> RuleOutcome {
        if let Err(e) = validate_rule(&rule) {
            return RuleOutcome::Failed(e.to_string());
        }

        match (self.position(&rule), mode) {
            (None, _) => {
                self.rules.push(rule);
                RuleOutcome::Inserted
            }
            (Some(i), InsertMode::Replace) => {
                self.rules[i].category_name = rule.category_name;
                RuleOutcome::Inserted
            }
            (Some(_), InsertMode::Reject) => {
                let err = RuleError::Duplicate {
                    rule_type: rule.rule_type,
                    match_pattern: rule.match_pattern,
                };
                debug!("{err}");
                RuleOutcome::Duplicate
            }
        }
    }

    pub fn insert_batch(&mut self, rules: Vec<CategoryRule>, mode: InsertMode) -> RuleBatchReport {
        let mut report = RuleBatchReport::default();
        for rule in rules {
            report.record(self.insert(rule, mode));
        }
        report
    }

    /// Rules grouped by category name. Categories sort alphabetically
    /// ignoring case, with the exact name breaking ties.
    pub fn by_category(&self) -> Vec<(&str, Vec<&CategoryRule>)> {
        let mut groups: BTreeMap<(String, &str), Vec<&CategoryRule>> = BTreeMap::new();
        for rule in &self.rules {
            let name = rule.category_name.as_str();
            groups.entry((name.to_lowercase(), name)).or_default().push(rule);
        }
        groups
            .into_iter()
            .map(|((_, name), rules)| (name, rules))
            .collect()
    }
}

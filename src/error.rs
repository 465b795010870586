use thiserror::Error;

/// No catalog pattern produced a usable record for the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No pattern matched line: {line}")]
pub struct ParseError {
    pub line: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebuildError {
    #[error("No template for action: {0}")]
    UnsupportedAction(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Rule already exists: {rule_type} / {match_pattern}")]
    Duplicate {
        rule_type: String,
        match_pattern: String,
    },

    #[error("Invalid rule: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog has no patterns")]
    Empty,

    #[error("Bad pattern for {action_kind}: {source}")]
    BadPattern {
        action_kind: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern for {action_kind} is missing capture group {group}")]
    MissingGroup { action_kind: String, group: String },

    #[error("Duplicate action kind: {0}")]
    DuplicateAction(String),

    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

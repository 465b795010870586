use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::models::TransactionDirection;

/// Capture groups every pattern must define.
pub const REQUIRED_GROUPS: &[&str] = &[
    "Amount",
    "Action",
    "AccountType",
    "AccountNumber",
    "Method",
    "Reference",
    "Date",
    "Time",
];

const PREFIX: &str = r"FNB\s?:-?\) ";

/// One catalog entry as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSpec {
    pub action_kind: String,
    pub pattern: String,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    pub patterns: Vec<PatternSpec>,
    #[serde(default = "default_income_markers")]
    pub income_markers: Vec<String>,
    #[serde(default = "default_expense_markers")]
    pub expense_markers: Vec<String>,
}

fn default_income_markers() -> Vec<String> {
    ["paid to", "reversal of"].map(String::from).to_vec()
}

fn default_expense_markers() -> Vec<String> {
    [
        "paid from",
        "reserved for purchase",
        "withdrawn from",
        "t/fer from",
        "transfer from",
    ]
    .map(String::from)
    .to_vec()
}

/// Action phrases that decide a line's direction.
#[derive(Debug, Clone)]
pub struct DirectionMarkers {
    income: Vec<String>,
    expense: Vec<String>,
}

impl DirectionMarkers {
    pub fn new(income: &[String], expense: &[String]) -> Self {
        let lower = |v: &[String]| -> Vec<String> {
            v.iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect()
        };
        Self {
            income: lower(income),
            expense: lower(expense),
        }
    }

    /// Case-insensitive substring match. Income markers are checked first;
    /// `None` means the phrase is not one we know how to sign.
    pub fn infer(&self, action: &str) -> Option<TransactionDirection> {
        let action = action.to_lowercase();
        if self.income.iter().any(|m| action.contains(m.as_str())) {
            Some(TransactionDirection::Income)
        } else if self.expense.iter().any(|m| action.contains(m.as_str())) {
            Some(TransactionDirection::Expense)
        } else {
            None
        }
    }
}

impl Default for DirectionMarkers {
    fn default() -> Self {
        Self::new(&default_income_markers(), &default_expense_markers())
    }
}

#[derive(Debug, Clone)]
pub struct CatalogPattern {
    pub action_kind: String,
    pub regex: Regex,
    pub template: String,
}

/// Ordered, validated pattern set. Earlier patterns win.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<CatalogPattern>,
    markers: DirectionMarkers,
}

impl PatternCatalog {
    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        if file.patterns.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut patterns: Vec<CatalogPattern> = Vec::with_capacity(file.patterns.len());
        for spec in file.patterns {
            if patterns
                .iter()
                .any(|p| p.action_kind.eq_ignore_ascii_case(&spec.action_kind))
            {
                return Err(CatalogError::DuplicateAction(spec.action_kind));
            }

            let regex = Regex::new(&spec.pattern).map_err(|source| CatalogError::BadPattern {
                action_kind: spec.action_kind.clone(),
                source,
            })?;

            let names: Vec<&str> = regex.capture_names().flatten().collect();
            if let Some(missing) = REQUIRED_GROUPS.iter().find(|g| !names.contains(g)) {
                return Err(CatalogError::MissingGroup {
                    action_kind: spec.action_kind,
                    group: (*missing).to_string(),
                });
            }

            patterns.push(CatalogPattern {
                action_kind: spec.action_kind,
                regex,
                template: spec.template,
            });
        }

        Ok(Self {
            patterns,
            markers: DirectionMarkers::new(&file.income_markers, &file.expense_markers),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The FNB InContact notification formats.
    pub fn fnb() -> Result<Self, CatalogError> {
        Self::from_file(fnb_catalog_file())
    }

    pub fn patterns(&self) -> &[CatalogPattern] {
        &self.patterns
    }

    pub fn markers(&self) -> &DirectionMarkers {
        &self.markers
    }

    /// Rebuild template for an action kind, matched case-insensitively.
    pub fn template_for(&self, action_kind: &str) -> Option<&str> {
        let wanted = action_kind.trim();
        self.patterns
            .iter()
            .find(|p| p.action_kind.eq_ignore_ascii_case(wanted))
            .map(|p| p.template.as_str())
    }
}

pub fn fnb_catalog_file() -> CatalogFile {
    let spec = |action_kind: &str, body: &str, template: &str| PatternSpec {
        action_kind: action_kind.into(),
        pattern: format!("{PREFIX}{body}"),
        template: template.into(),
    };

    CatalogFile {
        patterns: vec![
            spec(
                "paid from",
                r"R(?P<Amount>[\d.]+) (?P<Action>paid from) (?P<AccountType>.+) a/c\.\.(?P<AccountNumber>.+) @ (?P<Method>.+)\. Avail R(?P<Available>[\d.]*)\. Ref\.(?P<Reference>[^.]+)\. (?P<Date>.+) (?P<Time>.+)",
                "FNB:-) R{Amount} {Action} {AccountType} a/c..{AccountNumber} @ {Method}. Avail R{Available}. Ref.{Reference}. {Date} {Time}",
            ),
            spec(
                "paid to",
                r"R(?P<Amount>[\d.]+) (?P<Action>paid to) (?P<AccountType>.+) a/c\.\.(?P<AccountNumber>.+) @ (?P<Method>.+)\. Ref\.(?P<Reference>[^.]+)\. (?P<Date>.+) (?P<Time>.+)",
                "FNB:-) R{Amount} {Action} {AccountType} a/c..{AccountNumber} @ {Method}. Ref.{Reference}. {Date} {Time}",
            ),
            // Merchant names may contain periods or " from "; the account type never does.
            spec(
                "reserved for purchase",
                r"R(?P<Amount>[\d.]+) (?P<Action>reserved for purchase) @ (?P<Reference>.+) from (?P<AccountType>[^.]+) a/c\.\.(?P<AccountNumber>.+) using (?P<Method>.+)\.\.(?P<PartialCardNumber>.+)\. Avail R(?P<Available>[\d.]*)\. (?P<Date>.+) (?P<Time>.+)",
                "FNB :-) R{Amount} {Action} @ {Reference} from {AccountType} a/c..{AccountNumber} using {Method}..{PartialCardNumber}. Avail R{Available}. {Date} {Time}",
            ),
            spec(
                "REVERSAL of",
                r"(?P<Action>REVERSAL of) R(?P<Amount>[\d.]+) for (?P<Reference>[^.]+) from (?P<AccountType>[^.]+) a/c\.\.(?P<AccountNumber>.+) using (?P<Method>.+)\.\.(?P<PartialCardNumber>.+)\. (?P<Date>.+) (?P<Time>.+)",
                "FNB :-) {Action} R{Amount} for {Reference} from {AccountType} a/c..{AccountNumber} using {Method}..{PartialCardNumber}. {Date} {Time}",
            ),
            spec(
                "withdrawn from",
                r"R(?P<Amount>[\d.]+) (?P<Action>withdrawn from) (?P<AccountType>[^.]+) a/c\.\.(?P<AccountNumber>.+) using (?P<Method>.+)\.\.(?P<PartialCardNumber>.+) @ (?P<Reference>[^.]+)\. Avail R(?P<Available>[\d.]*)\. (?P<Date>.+) (?P<Time>.+)",
                "FNB:-) R{Amount} {Action} {AccountType} a/c..{AccountNumber} using {Method}..{PartialCardNumber} @ {Reference}. Avail R{Available}. {Date} {Time}",
            ),
            spec(
                "t/fer from",
                r"R(?P<Amount>[\d.]+) (?P<Action>t/fer from) (?P<AccountType>.+) a/c\.\.(?P<AccountNumber>.+) to (?P<Reference>.+) @ (?P<Method>.+)\. Avail R(?P<Available>[\d.]*)\. (?P<Date>.+) (?P<Time>.+)",
                "FNB:-) R{Amount} {Action} {AccountType} a/c..{AccountNumber} to {Reference} @ {Method}. Avail R{Available}. {Date} {Time}",
            ),
        ],
        income_markers: default_income_markers(),
        expense_markers: default_expense_markers(),
    }
}

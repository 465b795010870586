use crate::error::RebuildError;
use crate::models::ParsedTransactionLine;

use super::PatternCatalog;

/// Regenerates notification text from parsed fields using the catalog's
/// per-action templates.
pub struct LineReconstructor<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> LineReconstructor<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn rebuild(
        &self,
        action_kind: &str,
        line: &ParsedTransactionLine,
    ) -> Result<String, RebuildError> {
        let template = self
            .catalog
            .template_for(action_kind)
            .ok_or_else(|| RebuildError::UnsupportedAction(action_kind.to_string()))?;
        Ok(render(template, line))
    }
}

fn field(line: &ParsedTransactionLine, name: &str) -> Option<String> {
    let value = match name {
        "Amount" => format!("{:.2}", line.amount),
        // Stored balances only ever carried whole rands.
        "Available" => line
            .available
            .map(|a| a.trunc().to_string())
            .unwrap_or_default(),
        "Action" => line.action.clone(),
        "AccountType" => line.account_type.clone(),
        "AccountNumber" => line.account_number.clone(),
        "PartialCardNumber" => line.partial_card_number.clone(),
        "Method" => line.method.clone(),
        "Reference" => line.reference.clone(),
        "Date" => line.date.clone(),
        "Time" => line.time.clone(),
        _ => return None,
    };
    Some(value)
}

/// Single pass over the template so field values are never re-expanded.
/// Unknown `{...}` tokens are copied through as-is.
fn render(template: &str, line: &ParsedTransactionLine) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match field(line, name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

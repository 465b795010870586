mod category_rule;
mod direction;
mod parsed_line;
mod record;

pub use category_rule::{CategoryRule, DEFAULT_RULE_TYPE};
pub use direction::TransactionDirection;
pub use parsed_line::ParsedTransactionLine;
pub use record::{ParsedLineRecord, UnparsedLine, PARTITION_KEY};

#[cfg(test)]
mod tests;

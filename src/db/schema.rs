pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS parsed_lines (
    partition_key       TEXT NOT NULL,
    row_key             TEXT NOT NULL,
    created_at          TEXT NOT NULL,
    direction           TEXT NOT NULL DEFAULT '',
    amount              TEXT NOT NULL,
    action              TEXT NOT NULL,
    account_type        TEXT NOT NULL DEFAULT '',
    account_number      TEXT NOT NULL DEFAULT '',
    partial_card_number TEXT NOT NULL DEFAULT '',
    method              TEXT NOT NULL DEFAULT '',
    available           TEXT,
    reference           TEXT NOT NULL DEFAULT '',
    date                TEXT NOT NULL DEFAULT '',
    time                TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (partition_key, row_key)
);

CREATE INDEX IF NOT EXISTS idx_parsed_lines_created ON parsed_lines(created_at);

CREATE TABLE IF NOT EXISTS raw_text_of_parsed_lines (
    partition_key TEXT NOT NULL,
    row_key       TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    text_line     TEXT NOT NULL,
    PRIMARY KEY (partition_key, row_key)
);

CREATE TABLE IF NOT EXISTS unparsed_lines (
    partition_key TEXT NOT NULL,
    row_key       TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    text_line     TEXT NOT NULL,
    PRIMARY KEY (partition_key, row_key)
);

CREATE INDEX IF NOT EXISTS idx_unparsed_lines_created ON unparsed_lines(created_at);

CREATE TABLE IF NOT EXISTS category_rules (
    rule_type     TEXT NOT NULL,
    match_pattern TEXT NOT NULL,
    category_name TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    UNIQUE(rule_type, match_pattern)
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Upgrade steps as (from_version, sql), applied in order.
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];

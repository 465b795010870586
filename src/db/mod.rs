mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error};

use crate::categorize::{CategoryRuleSet, InsertMode, RuleBatchReport, RuleOutcome};
use crate::ingest::{IngestSummary, LineOutcome};
use crate::models::*;

const PARSED_COLUMNS: &str = "partition_key, row_key, created_at, direction, amount, action, \
     account_type, account_number, partial_card_number, method, available, reference, date, time";

pub(crate) struct Database {
    conn: Connection,
}

/// Timestamps are stored as fixed-width RFC 3339 so text comparison orders them.
fn to_db_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn time_from_row(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row) -> rusqlite::Result<ParsedLineRecord> {
    let amount_str: String = row.get(4)?;
    let available_str: Option<String> = row.get(10)?;
    Ok(ParsedLineRecord {
        partition_key: row.get(0)?,
        row_key: row.get(1)?,
        created_at: time_from_row(row, 2)?,
        direction: row.get(3)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        action: row.get(5)?,
        account_type: row.get(6)?,
        account_number: row.get(7)?,
        partial_card_number: row.get(8)?,
        method: row.get(9)?,
        available: available_str.and_then(|s| Decimal::from_str(&s).ok()),
        reference: row.get(11)?,
        date: row.get(12)?,
        time: row.get(13)?,
    })
}

fn unparsed_from_row(row: &Row) -> rusqlite::Result<UnparsedLine> {
    Ok(UnparsedLine {
        partition_key: row.get(0)?,
        row_key: row.get(1)?,
        created_at: time_from_row(row, 2)?,
        text_line: row.get(3)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Parsed lines ──────────────────────────────────────────

    /// Upsert a parsed record together with the text it was parsed from.
    pub(crate) fn insert_parsed_line(&mut self, record: &ParsedLineRecord, raw_text: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO parsed_lines ({PARSED_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                record.partition_key,
                record.row_key,
                to_db_time(&record.created_at),
                record.direction,
                record.amount.to_string(),
                record.action,
                record.account_type,
                record.account_number,
                record.partial_card_number,
                record.method,
                record.available.map(|a| a.to_string()),
                record.reference,
                record.date,
                record.time,
            ],
        )?;
        upsert_raw_text(&tx, record, raw_text)?;
        tx.commit()?;
        Ok(())
    }

    /// Parsed records created in `[from, to)`, oldest first.
    pub(crate) fn get_parsed_lines(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ParsedLineRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PARSED_COLUMNS} FROM parsed_lines
             WHERE created_at >= ?1 AND created_at < ?2
             ORDER BY created_at, row_key"
        ))?;
        let rows = stmt.query_map(params![to_db_time(&from), to_db_time(&to)], record_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Legacy rows stored before directions were recorded.
    pub(crate) fn get_parsed_lines_missing_direction(&self) -> Result<Vec<ParsedLineRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PARSED_COLUMNS} FROM parsed_lines
             WHERE TRIM(direction) = ''
             ORDER BY created_at, row_key"
        ))?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    #[cfg(test)]
    pub(crate) fn get_raw_text(&self, partition_key: &str, row_key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT text_line FROM raw_text_of_parsed_lines WHERE partition_key = ?1 AND row_key = ?2",
        )?;
        let mut rows = stmt.query_map(params![partition_key, row_key], |row| row.get(0))?;
        match rows.next() {
            Some(r) => Ok(Some(r?)),
            None => Ok(None),
        }
    }

    /// Write an inferred direction and the rebuilt raw text for a legacy row.
    pub(crate) fn save_backfill(&mut self, record: &ParsedLineRecord, raw_text: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE parsed_lines SET direction = ?1 WHERE partition_key = ?2 AND row_key = ?3",
            params![record.direction, record.partition_key, record.row_key],
        )?;
        if changed == 0 {
            anyhow::bail!("No stored record {}", record.row_key);
        }
        upsert_raw_text(&tx, record, raw_text)?;
        tx.commit()?;
        Ok(())
    }

    // ── Unparsed lines ────────────────────────────────────────

    pub(crate) fn insert_unparsed_line(&self, line: &UnparsedLine) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO unparsed_lines (partition_key, row_key, created_at, text_line)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                line.partition_key,
                line.row_key,
                to_db_time(&line.created_at),
                line.text_line
            ],
        )?;
        Ok(())
    }

    pub(crate) fn get_unparsed_lines(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UnparsedLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT partition_key, row_key, created_at, text_line FROM unparsed_lines
             WHERE created_at >= ?1 AND created_at < ?2
             ORDER BY created_at, row_key",
        )?;
        let rows = stmt.query_map(params![to_db_time(&from), to_db_time(&to)], unparsed_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Ingest ────────────────────────────────────────────────

    /// Persist each outcome on its own; one failed write does not stop the rest.
    pub(crate) fn store_outcomes(&mut self, outcomes: &[LineOutcome]) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for outcome in outcomes {
            let stored = match outcome {
                LineOutcome::Parsed { line, record } => {
                    let row = ParsedLineRecord::new(record);
                    self.insert_parsed_line(&row, line).map(|()| summary.parsed += 1)
                }
                LineOutcome::Unparsed { line } => self
                    .insert_unparsed_line(&UnparsedLine::new(line.as_str()))
                    .map(|()| summary.unparsed += 1),
                LineOutcome::Ignored { .. } => {
                    summary.ignored += 1;
                    Ok(())
                }
            };
            if let Err(e) = stored {
                error!(line = %outcome.line(), "Failed to store line: {e:#}");
                summary.failed += 1;
            }
        }
        summary
    }

    // ── Category rules ────────────────────────────────────────

    pub(crate) fn get_rules(&self) -> Result<Vec<CategoryRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT rule_type, match_pattern, category_name FROM category_rules ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryRule {
                rule_type: row.get(0)?,
                match_pattern: row.get(1)?,
                category_name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_rule_set(&self) -> Result<CategoryRuleSet> {
        Ok(CategoryRuleSet::from_rules(self.get_rules()?))
    }

    /// Validate and store rules, counting each as inserted, duplicate or failed.
    pub(crate) fn insert_rules(&mut self, rules: &[CategoryRule], mode: InsertMode) -> Result<RuleBatchReport> {
        let mut existing = self.get_rule_set()?;
        let now = to_db_time(&Utc::now());
        let sql = match mode {
            InsertMode::Reject => {
                "INSERT INTO category_rules (rule_type, match_pattern, category_name, created_at)
                 VALUES (?1, ?2, ?3, ?4)"
            }
            InsertMode::Replace => {
                "INSERT INTO category_rules (rule_type, match_pattern, category_name, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(rule_type, match_pattern) DO UPDATE SET category_name = excluded.category_name"
            }
        };

        let tx = self.conn.transaction()?;
        let mut report = RuleBatchReport::default();
        for rule in rules {
            let outcome = match existing.insert(rule.clone(), mode) {
                RuleOutcome::Inserted => {
                    match tx.execute(
                        sql,
                        params![rule.rule_type, rule.match_pattern, rule.category_name, now],
                    ) {
                        Ok(_) => RuleOutcome::Inserted,
                        Err(e) if is_constraint_violation(&e) => RuleOutcome::Duplicate,
                        Err(e) => RuleOutcome::Failed(e.to_string()),
                    }
                }
                other => other,
            };
            debug!(pattern = %rule.match_pattern, ?outcome, "Rule processed");
            report.record(outcome);
        }
        tx.commit()?;
        Ok(report)
    }

    /// Move a rule to a new type: insert the copy first, then drop the original.
    pub(crate) fn rekey_rule(&mut self, rule: &CategoryRule, new_type: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO category_rules (rule_type, match_pattern, category_name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![new_type, rule.match_pattern, rule.category_name, to_db_time(&Utc::now())],
        )
        .with_context(|| format!("Failed to insert {new_type} / {}", rule.match_pattern))?;
        tx.execute(
            "DELETE FROM category_rules WHERE rule_type = ?1 AND match_pattern = ?2",
            params![rule.rule_type, rule.match_pattern],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ── Export ────────────────────────────────────────────────

    pub(crate) fn export_to_csv(
        &self,
        path: &Path,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize> {
        let records = self.get_parsed_lines(from, to)?;
        if records.is_empty() {
            return Ok(0);
        }

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        wtr.write_record([
            "Created", "Direction", "Amount", "Action", "Reference", "Method", "Account Type",
            "Account Number", "Card", "Available", "Date", "Time",
        ])?;
        for r in &records {
            wtr.write_record([
                to_db_time(&r.created_at),
                r.direction.clone(),
                format!("{:.2}", r.amount),
                r.action.clone(),
                r.reference.clone(),
                r.method.clone(),
                r.account_type.clone(),
                r.account_number.clone(),
                r.partial_card_number.clone(),
                r.available.map(|a| a.to_string()).unwrap_or_default(),
                r.date.clone(),
                r.time.clone(),
            ])?;
        }
        wtr.flush()?;
        Ok(records.len())
    }
}

fn upsert_raw_text(conn: &Connection, record: &ParsedLineRecord, raw_text: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO raw_text_of_parsed_lines (partition_key, row_key, created_at, text_line)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            record.partition_key,
            record.row_key,
            to_db_time(&record.created_at),
            raw_text
        ],
    )?;
    Ok(())
}

//! One-off data migrations for stores written by older versions.

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info};

use crate::db::Database;
use crate::models::DEFAULT_RULE_TYPE;
use crate::parse::{LineReconstructor, PatternCatalog};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MigrationReport {
    pub total: usize,
    pub migrated: usize,
    pub failed: usize,
    pub failed_keys: Vec<String>,
}

impl MigrationReport {
    fn fail(&mut self, key: String, reason: &str) {
        error!(key = %key, "Migration failed: {reason}");
        self.failed += 1;
        self.failed_keys.push(key);
    }
}

/// Fill in direction and raw text for records stored before either existed.
pub(crate) fn backfill_directions(db: &mut Database, catalog: &PatternCatalog) -> Result<MigrationReport> {
    let records = db.get_parsed_lines_missing_direction()?;
    let rebuilder = LineReconstructor::new(catalog);
    let mut report = MigrationReport {
        total: records.len(),
        ..MigrationReport::default()
    };
    info!(total = report.total, "Records without a direction");

    for mut record in records {
        let Some(direction) = catalog.markers().infer(&record.action) else {
            report.fail(record.row_key, &format!("no direction for action '{}'", record.action));
            continue;
        };

        let raw_text = match rebuilder.rebuild(&record.action, &record.to_line(direction)) {
            Ok(text) => text,
            Err(e) => {
                report.fail(record.row_key, &e.to_string());
                continue;
            }
        };

        record.direction = direction.as_str().to_string();
        match db.save_backfill(&record, &raw_text) {
            Ok(()) => report.migrated += 1,
            Err(e) => report.fail(record.row_key, &format!("{e:#}")),
        }
    }

    Ok(report)
}

/// Move direction-typed rules (`Income`/`Expense`) to the generic rule type.
pub(crate) fn rekey_rule_types(db: &mut Database) -> Result<MigrationReport> {
    let legacy: Vec<_> = db
        .get_rules()?
        .into_iter()
        .filter(|r| r.legacy_direction().is_some())
        .collect();
    let mut report = MigrationReport {
        total: legacy.len(),
        ..MigrationReport::default()
    };
    info!(total = report.total, "Rules typed by direction");

    for rule in &legacy {
        match db.rekey_rule(rule, DEFAULT_RULE_TYPE) {
            Ok(()) => report.migrated += 1,
            Err(e) => report.fail(
                format!("{} {}", rule.rule_type, rule.match_pattern),
                &format!("{e:#}"),
            ),
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "migrate_tests.rs"]
mod tests;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use std::path::Path;

use crate::categorize::{self, CategoryRuleSet, InsertMode, RuleBatchReport};
use crate::config::Config;
use crate::db::Database;
use crate::ingest;
use crate::migrate::{self, MigrationReport};
use crate::models::CategoryRule;
use crate::parse::LineParser;
use crate::report::{self, ReportTable};

const DEFAULT_REPORT_DAYS: i64 = 7;

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "ingest" => cli_ingest(&args[2..], db, config),
        "parse" => cli_parse(&args[2..], config),
        "report" | "r" => cli_report(&args[2..], db),
        "rules" => cli_rules(&args[2..], db),
        "migrate" => cli_migrate(&args[2..], db, config),
        "export" => cli_export(&args[2..], db),
        "config" => cli_config(&args[2..], config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("incontact {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("incontact - turn bank notification lines into categorized reports");
    println!();
    println!("Usage: incontact <command>");
    println!();
    println!("Commands:");
    println!("  ingest <file>                 Parse and store every line of a notification body");
    println!("  parse <line>                  Parse a single line and print its fields");
    println!("  report                        Summarize stored lines by category");
    println!("    --from <YYYY-MM-DD>         Start date (default: 7 days ago)");
    println!("    --to <YYYY-MM-DD>           End date, inclusive (default: today)");
    println!("    --json                      Print the report as JSON");
    println!("  rules list                    List category rules");
    println!("  rules add [type] <pattern> <category> [--replace]");
    println!("  rules import <file.json> [--replace] [--dry-run]");
    println!("  migrate backfill              Infer missing directions and rebuild raw text");
    println!("  migrate rule-types            Move Income/Expense rules to RegexPattern");
    println!("  export [path]                 Export parsed lines to CSV");
    println!("    --from / --to               Date range, as for report");
    println!("  config show|init              Show or write the config file");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Positional arguments, skipping flags and the values of flags that take one.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--from" | "--to" => {
                iter.next();
            }
            a if a.starts_with("--") => {}
            a => out.push(a),
        }
    }
    out
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{value}', expected YYYY-MM-DD"))
}

/// Inclusive date range from `--from`/`--to`, defaulting to the last week.
fn date_range(args: &[String]) -> Result<(NaiveDate, NaiveDate)> {
    let to = match flag_value(args, "--to") {
        Some(v) => parse_date(v)?,
        None => Utc::now().date_naive(),
    };
    let from = match flag_value(args, "--from") {
        Some(v) => parse_date(v)?,
        None => to - Duration::days(DEFAULT_REPORT_DAYS),
    };
    if from > to {
        anyhow::bail!("--from {from} is after --to {to}");
    }
    Ok((from, to))
}

fn day_bounds(from: NaiveDate, to: NaiveDate) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let start = from.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = (to + Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc();
    (start, end)
}

// ── ingest / parse ───────────────────────────────────────────

fn cli_ingest(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let Some(file_path) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: incontact ingest <file>");
    };
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let lines = ingest::sanitize_lines(&body);
    let parser = LineParser::new(config.catalog()?);
    let outcomes = ingest::process_lines(&parser, &lines, &config.ignorable_regexes()?);
    let summary = db.store_outcomes(&outcomes);

    println!(
        "Read {} lines: {} parsed, {} not parsed, {} ignored",
        lines.len(),
        summary.parsed,
        summary.unparsed,
        summary.ignored
    );
    if summary.failed > 0 {
        eprintln!("Warning: {} lines could not be stored", summary.failed);
    }

    let parsed = outcomes.iter().filter_map(|o| match o {
        ingest::LineOutcome::Parsed { record, .. } => Some(record),
        _ => None,
    });
    for alert in ingest::low_funds_alerts(parsed, config.low_funds_threshold) {
        println!("{}: {}", alert.subject(), alert.message());
    }
    Ok(())
}

fn cli_parse(args: &[String], config: &Config) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: incontact parse <line>");
    }
    let line = args.join(" ");
    let parser = LineParser::new(config.catalog()?);
    let parsed = parser.parse(line.trim())?;

    println!("{:<16} {}", "Direction", parsed.direction);
    println!("{:<16} {:.2}", "Amount", parsed.amount);
    println!("{:<16} {}", "Action", parsed.action);
    println!("{:<16} {}", "Account type", parsed.account_type);
    println!("{:<16} {}", "Account number", parsed.account_number);
    println!("{:<16} {}", "Card", parsed.partial_card_number);
    println!("{:<16} {}", "Method", parsed.method);
    println!(
        "{:<16} {}",
        "Available",
        parsed.available.map(|a| a.to_string()).unwrap_or_default()
    );
    println!("{:<16} {}", "Reference", parsed.reference);
    println!("{:<16} {} {}", "When", parsed.date, parsed.time);
    Ok(())
}

// ── report ───────────────────────────────────────────────────

fn cli_report(args: &[String], db: &mut Database) -> Result<()> {
    let (from, to) = date_range(args)?;
    let (start, end) = day_bounds(from, to);

    let parsed = db.get_parsed_lines(start, end)?;
    let unparsed = db.get_unparsed_lines(start, end)?;
    let rules = db.get_rule_set()?;

    let subject = report::subject(parsed.len(), unparsed.len(), from, to);
    let data = report::assemble(categorize::summarize(&rules, &parsed), &parsed, &unparsed);

    if has_flag(args, "--json") {
        let json = serde_json::json!({ "subject": subject, "report": data });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("{subject}");
    println!("{}", "─".repeat(60));
    for item in &data.summary_items {
        println!("{}", report::summary_heading(item));
        for record in &item.records {
            println!("    {}", record.text);
        }
    }

    println!();
    println!("Parsed entries ({})", data.parsed_entries.rows.len());
    print_table(&data.parsed_entries);

    if !data.non_parsed_entries.rows.is_empty() {
        println!();
        println!("Non-parsed entries ({})", data.non_parsed_entries.rows.len());
        print_table(&data.non_parsed_entries);
    }

    let unknown = data.unknown_references();
    if !unknown.is_empty() {
        println!();
        println!("Uncategorized references:");
        for reference in &unknown {
            println!(
                "  {reference:<32} rules add RegexPattern \"{}\" <category>",
                categorize::suggest_pattern(reference)
            );
        }
    }
    Ok(())
}

fn print_table(table: &ReportTable) {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("  {}", render(&table.columns));
    println!("  {}", "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in &table.rows {
        println!("  {}", render(row));
    }
}

// ── rules ────────────────────────────────────────────────────

fn cli_rules(args: &[String], db: &mut Database) -> Result<()> {
    let mode = if has_flag(args, "--replace") {
        InsertMode::Replace
    } else {
        InsertMode::Reject
    };
    let pos = positionals(args);

    match pos.first().copied() {
        None | Some("list") => {
            let rules = db.get_rule_set()?;
            if rules.is_empty() {
                println!("No rules");
                return Ok(());
            }
            println!("{} rules", rules.len());
            for (category, category_rules) in rules.by_category() {
                println!();
                println!("{category}");
                println!("{}", "─".repeat(40));
                for rule in category_rules {
                    println!("  {:<14} {}", rule.rule_type, rule.match_pattern);
                }
            }
            Ok(())
        }
        Some("add") => {
            let rule = match pos[1..] {
                [pattern, category] => CategoryRule::new_regex(pattern, category),
                [rule_type, pattern, category] => CategoryRule::new(rule_type, pattern, category),
                _ => anyhow::bail!(
                    "Usage: incontact rules add [type] <pattern> <category> [--replace]"
                ),
            };
            let report = db.insert_rules(&[rule], mode)?;
            print_rule_report(&report);
            Ok(())
        }
        Some("import") => {
            let Some(file_path) = pos.get(1) else {
                anyhow::bail!("Usage: incontact rules import <file.json> [--replace] [--dry-run]");
            };
            let content = std::fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read {file_path}"))?;
            let rules: Vec<CategoryRule> = serde_json::from_str(&content)
                .with_context(|| format!("Invalid rules file: {file_path}"))?;

            let report = if has_flag(args, "--dry-run") {
                let mut set = CategoryRuleSet::from_rules(db.get_rules()?);
                set.insert_batch(rules, mode)
            } else {
                db.insert_rules(&rules, mode)?
            };
            print_rule_report(&report);
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown rules command: {other}"),
    }
}

fn print_rule_report(report: &RuleBatchReport) {
    println!(
        "Inserted {}, duplicates {}, failed {}",
        report.inserted,
        report.duplicates,
        report.failures.len()
    );
    for reason in &report.failures {
        eprintln!("  {reason}");
    }
}

// ── migrate ──────────────────────────────────────────────────

fn cli_migrate(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let report = match positionals(args).first().copied() {
        Some("backfill") => migrate::backfill_directions(db, &config.catalog()?)?,
        Some("rule-types") => migrate::rekey_rule_types(db)?,
        _ => anyhow::bail!("Usage: incontact migrate backfill|rule-types"),
    };
    print_migration_report(&report);
    Ok(())
}

fn print_migration_report(report: &MigrationReport) {
    println!(
        "To migrate: {}, migrated: {}, failed: {}",
        report.total, report.migrated, report.failed
    );
    for key in &report.failed_keys {
        println!("  failed: {key}");
    }
}

// ── export / config ──────────────────────────────────────────

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let (from, to) = date_range(args)?;
    let (start, end) = day_bounds(from, to);

    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/incontact-export-{from}-{to}.csv")
        });

    let count = db.export_to_csv(Path::new(&output_path), start, end)?;
    if count == 0 {
        println!("No parsed lines between {from} and {to}");
    } else {
        println!("Exported {count} lines to {output_path}");
    }
    Ok(())
}

fn cli_config(args: &[String], config: &Config) -> Result<()> {
    let path = Config::path()?;
    match positionals(args).first().copied() {
        None | Some("show") => {
            println!("# {}", path.display());
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
        Some("init") => {
            if path.exists() {
                anyhow::bail!("Config already exists: {}", path.display());
            }
            Config::default().save(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown config command: {other}"),
    }
}

fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

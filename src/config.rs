use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parse::PatternCatalog;

pub const CONFIG_ENV: &str = "INCONTACT_CONFIG";
pub const DB_ENV: &str = "INCONTACT_DB";

const CSS_RULE_PATTERN: &str = r"\.[a-zA-Z]+\s*\{\s*color";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_low_funds_threshold")]
    pub low_funds_threshold: Decimal,
    /// JSON catalog replacing the built-in FNB patterns.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_ignorable_patterns")]
    pub ignorable_patterns: Vec<String>,
}

fn default_low_funds_threshold() -> Decimal {
    Decimal::from(1000)
}

fn default_ignorable_patterns() -> Vec<String> {
    vec![CSS_RULE_PATTERN.to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            low_funds_threshold: default_low_funds_threshold(),
            catalog_path: None,
            ignorable_patterns: default_ignorable_patterns(),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "incontact", "InContact")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// `INCONTACT_CONFIG` if set, else `config.json` in the platform config dir.
    pub fn path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(project_dirs()?.config_dir().join("config.json"))
    }

    /// Missing file means defaults; a file that exists must parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn db_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_ENV) {
            return Ok(PathBuf::from(path));
        }
        let proj_dirs = project_dirs()?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(data_dir.join("incontact.db"))
    }

    pub fn catalog(&self) -> Result<PatternCatalog> {
        match &self.catalog_path {
            Some(path) => PatternCatalog::load(path)
                .with_context(|| format!("Failed to load catalog: {}", path.display())),
            None => PatternCatalog::fnb().context("Built-in catalog is invalid"),
        }
    }

    pub fn ignorable_regexes(&self) -> Result<Vec<Regex>> {
        self.ignorable_patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid ignorable pattern: {p}")))
            .collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

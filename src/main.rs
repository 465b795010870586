mod categorize;
mod config;
mod db;
mod error;
mod ingest;
mod migrate;
mod models;
mod parse;
mod report;
mod run;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "INCONTACT_LOG";

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load(&config::Config::path()?)?;
    let mut db = db::Database::open(&config::Config::db_path()?)?;

    run::as_cli(&args, &mut db, &config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

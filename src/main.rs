//! Grocery Ledger
//!
//! Command-line front end: logs purchases, imports legacy exports and prints
//! the dashboard as JSON.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use grocery_ledger::analytics::AnalyticsCache;
use grocery_ledger::build_info;
use grocery_ledger::config::Config;
use grocery_ledger::db::{self, Database, SqliteStore};
use grocery_ledger::ledger::Ledger;
use grocery_ledger::lookup::{
    CatalogLookup, DebouncedSearch, FoodLookup, HttpFoodLookup, DEFAULT_LOOKUP_TIMEOUT,
};
use grocery_ledger::models::{PurchaseInput, PurchaseRecord};
use grocery_ledger::tools;

const RECENT_LIMIT: usize = 10;

const USAGE: &str = "usage: grocery-ledger [summary | list | import <file> | search <query> \
                     | log <query> <unit> <quantity> <cost> [category] | delete <id>]";

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn food_source(config: &Config) -> CliResult<Arc<dyn FoodLookup>> {
    match &config.lookup {
        Some(lookup) => {
            eprintln!("Food database: {}", lookup.base_url);
            Ok(Arc::new(HttpFoodLookup::new(lookup.clone())?))
        }
        None => {
            eprintln!("Food database: built-in catalog");
            Ok(Arc::new(CatalogLookup::builtin()))
        }
    }
}

/// Run one debounced search and wait for its outcome
async fn search_once(
    config: &Config,
    lookup: Arc<dyn FoodLookup>,
    query: &str,
) -> CliResult<grocery_ledger::lookup::SearchOutcome> {
    let timeout = config
        .lookup
        .as_ref()
        .map(|l| l.timeout)
        .unwrap_or(DEFAULT_LOOKUP_TIMEOUT);
    let (mut search, mut outcomes) = DebouncedSearch::new(lookup, config.search_debounce, timeout);

    search.schedule(query);
    outcomes
        .recv()
        .await
        .ok_or_else(|| "search ended without a result".into())
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, name: &str) -> CliResult<T> {
    let raw = args
        .get(index)
        .ok_or_else(|| format!("missing {}\n{}", name, USAGE))?;
    raw.parse()
        .map_err(|_| format!("invalid {} '{}'", name, raw).into())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("grocery_ledger=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("summary");

    let config = Config::load();
    eprintln!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let mut ledger = Ledger::open(SqliteStore::new(database))?;
    eprintln!("Loaded {} purchases", ledger.len());

    match command {
        "summary" => {
            let mut cache = AnalyticsCache::new();
            print_json(&tools::dashboard_summary(&ledger, &mut cache, RECENT_LIMIT))?;
        }
        "list" => {
            print_json(&ledger.list())?;
        }
        "import" => {
            let path = args.get(1).ok_or(USAGE)?;
            let raw = std::fs::read_to_string(path)?;
            let records: Vec<PurchaseRecord> = serde_json::from_str(&raw)?;
            let offered = records.len();
            let added = ledger.import(records);
            eprintln!("Imported {} of {} purchases from {}", added, offered, path);
            ledger.close()?;
        }
        "search" => {
            let query = args[1..].join(" ");
            let outcome = search_once(&config, food_source(&config)?, &query).await?;
            match &outcome.warning {
                Some(warning) if outcome.lookup_failed => {
                    eprintln!("Warning: food database unavailable: {}", warning)
                }
                Some(warning) => eprintln!("Warning: {}", warning),
                None => {}
            }
            print_json(&outcome.results)?;
        }
        "log" => {
            let query: String = parse_arg(&args, 1, "query")?;
            let unit: String = parse_arg(&args, 2, "unit")?;
            let quantity: f64 = parse_arg(&args, 3, "quantity")?;
            let cost: f64 = parse_arg(&args, 4, "cost")?;

            let lookup = food_source(&config)?;
            let outcome = search_once(&config, Arc::clone(&lookup), &query).await?;
            if let Some(warning) = outcome.warning {
                if outcome.lookup_failed {
                    return Err(format!("food database unavailable, nothing was logged: {}", warning).into());
                }
                return Err(warning.into());
            }
            let first = outcome
                .results
                .first()
                .ok_or_else(|| format!("no food found for '{}'", query))?;
            let food = lookup.get_details(first).await.map_err(|e| {
                if e.is_lookup_failure() {
                    format!("food database unavailable, nothing was logged: {}", e)
                } else {
                    format!("'{}' is no longer available: {}", first.display_name(), e)
                }
            })?;

            let mut input = PurchaseInput::new(food, unit, quantity, cost);
            input.category = args.get(5).cloned();
            print_json(&tools::add_expense(&mut ledger, &input)?)?;
        }
        "delete" => {
            let id: u64 = parse_arg(&args, 1, "id")?;
            print_json(&tools::delete_expense(&mut ledger, id)?)?;
        }
        other => {
            return Err(format!("unknown command '{}'\n{}", other, USAGE).into());
        }
    }

    Ok(())
}

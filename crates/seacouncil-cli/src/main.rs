use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use seacouncil::config::ScrapeConfig;
use seacouncil::jurisdiction::Jurisdiction;
use seacouncil::sync::{SyncModel, sync_events, sync_people};
use seacouncil::db;
use seacouncil::types::ScrapeTarget;

#[derive(Parser)]
#[command(name = "seacouncil")]
#[command(about = "Seattle City Council scraper and councilmatic sync", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape councilmembers and meeting events into canonical form
    Scrape {
        #[arg(
            long,
            default_value = "all",
            value_parser = parse_target,
            help = "Which scraper to run: people, events, or all"
        )]
        target: ScrapeTarget,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(
            long,
            value_name = "PATH",
            help = "Also persist scraped entities into this SQLite database"
        )]
        db: Option<String>,
    },
    /// Project canonical rows into the councilmatic tables
    Sync {
        #[arg(
            long,
            default_value = "all",
            value_parser = parse_model,
            help = "Which model to sync: people, events, organizations, or all"
        )]
        model: SyncModel,

        #[arg(
            long,
            value_name = "PATH",
            help = "SQLite database holding the canonical and councilmatic tables"
        )]
        db: String,
    },
}

fn parse_target(s: &str) -> Result<ScrapeTarget, String> {
    ScrapeTarget::from_str(s).map_err(|e| e.to_string())
}

fn parse_model(s: &str) -> Result<SyncModel, String> {
    SyncModel::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Scrape { target, format, db } => run_scrape(target, format, db).await,
        Commands::Sync { model, db } => run_sync(model, &db),
    }
}

async fn run_scrape(target: ScrapeTarget, format: OutputFormat, db_path: Option<String>) {
    let jurisdiction = Jurisdiction::new(ScrapeConfig::default()).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    let conn = db_path.map(|path| {
        db::open(&path).unwrap_or_else(|e| {
            log::error!("Error opening database: {}", e);
            process::exit(1);
        })
    });

    if matches!(target, ScrapeTarget::People | ScrapeTarget::All) {
        let people = jurisdiction.scrape_people().await;

        if let Some(conn) = &conn {
            // The organization is emitted alongside people, as the
            // memberships reference it.
            let org = jurisdiction.organization();
            db::upsert_organization(conn, &org).unwrap_or_else(|e| {
                log::error!("Error saving organization: {}", e);
                process::exit(1);
            });
            for person in &people {
                db::upsert_person(conn, person).unwrap_or_else(|e| {
                    log::error!("Error saving person {}: {}", person.name, e);
                    process::exit(1);
                });
            }
        }

        match format {
            OutputFormat::Json => serialize_json(&people),
            OutputFormat::Text => {
                for person in &people {
                    println!("{}", person);
                }
                println!("Scraped {} councilmember(s)", people.len());
            }
        }
    }

    if matches!(target, ScrapeTarget::Events | ScrapeTarget::All) {
        let events = jurisdiction.scrape_events().await;

        if let Some(conn) = &conn {
            for event in &events {
                db::upsert_event(conn, event).unwrap_or_else(|e| {
                    log::error!("Error saving event {}: {}", event.external_id, e);
                    process::exit(1);
                });
            }
        }

        match format {
            OutputFormat::Json => serialize_json(&events),
            OutputFormat::Text => {
                for event in &events {
                    println!("{}", event);
                }
                println!("Scraped {} event(s)", events.len());
            }
        }
    }
}

fn run_sync(model: SyncModel, db_path: &str) {
    let conn = db::open(db_path).unwrap_or_else(|e| {
        log::error!("Error opening database: {}", e);
        process::exit(1);
    });

    if model.includes(SyncModel::People) {
        println!("Syncing people...");
        match sync_people(&conn) {
            Ok(report) => println!("  ✓ People: {}", report),
            Err(e) => {
                log::error!("Error syncing people: {}", e);
                process::exit(1);
            }
        }
    }

    if model.includes(SyncModel::Events) {
        println!("Syncing events...");
        match sync_events(&conn) {
            Ok(report) => println!("  ✓ Events: {}", report),
            Err(e) => {
                log::error!("Error syncing events: {}", e);
                process::exit(1);
            }
        }
    }

    if model.includes(SyncModel::Organizations) {
        println!("Organization sync not yet implemented");
    }

    println!("\n✓ Sync complete!");
}
